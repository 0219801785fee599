use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, Set,
};

use crate::db::entities::{project, project_tag, tag};

// --- Project Service Functions ---

/// Retrieves a single live project by its id.
pub async fn find_live_project<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
) -> Result<Option<project::Model>, DbErr> {
    project::Entity::find_by_id(project_id)
        .filter(project::Column::DeletedAt.is_null())
        .one(db)
        .await
}

/// Retrieves all live projects together with their associated tags,
/// in storage order.
pub async fn find_live_projects_with_tags<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<(project::Model, Vec<tag::Model>)>, DbErr> {
    project::Entity::find()
        .filter(project::Column::DeletedAt.is_null())
        .find_with_related(tag::Entity)
        .all(db)
        .await
}

/// Retrieves the tags associated with a project.
pub async fn find_project_tags<C: ConnectionTrait>(
    db: &C,
    project_model: &project::Model,
) -> Result<Vec<tag::Model>, DbErr> {
    project_model.find_related(tag::Entity).all(db).await
}

/// Inserts a new project with the default "active" status.
pub async fn insert_project<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: &str,
) -> Result<project::Model, DbErr> {
    let now = Utc::now();
    project::ActiveModel {
        name: Set(name.to_owned()),
        description: Set(description.to_owned()),
        status: Set("active".to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Applies the provided field changes to a project. `None` fields are
/// left untouched.
pub async fn update_project_fields<C: ConnectionTrait>(
    db: &C,
    project_model: project::Model,
    name: Option<&str>,
    description: Option<&str>,
    status: Option<&str>,
) -> Result<project::Model, DbErr> {
    let mut active_project = project_model.into_active_model();
    if let Some(name) = name {
        active_project.name = Set(name.to_owned());
    }
    if let Some(description) = description {
        active_project.description = Set(description.to_owned());
    }
    if let Some(status) = status {
        active_project.status = Set(status.to_owned());
    }
    active_project.updated_at = Set(Utc::now());
    active_project.update(db).await
}

/// Marks a project as deleted. The row is retained as a tombstone.
pub async fn soft_delete_project<C: ConnectionTrait>(
    db: &C,
    project_model: project::Model,
) -> Result<(), DbErr> {
    let now = Utc::now();
    let mut active_project = project_model.into_active_model();
    active_project.deleted_at = Set(Some(now));
    active_project.updated_at = Set(now);
    active_project.update(db).await?;
    Ok(())
}

/// Associates the given tags with a project. Existing associations are
/// left as-is (conflict-ignore), so re-adding a tag neither errors nor
/// duplicates the join row.
pub async fn attach_tags<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    let rows = tag_ids.iter().map(|tag_id| project_tag::ActiveModel {
        project_id: Set(project_id),
        tag_id: Set(*tag_id),
        created_at: Set(now),
    });
    let result = project_tag::Entity::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                project_tag::Column::ProjectId,
                project_tag::Column::TagId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await;
    match result {
        Ok(_) => Ok(()),
        // Every row already existed; the association set is unchanged.
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Removes the given tags from a project's association set. Ids that
/// were never associated are a no-op.
pub async fn detach_tags<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    project_tag::Entity::delete_many()
        .filter(project_tag::Column::ProjectId.eq(project_id))
        .filter(project_tag::Column::TagId.is_in(tag_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(())
}

/// Removes every association row for a project.
pub async fn clear_tags<C: ConnectionTrait>(db: &C, project_id: i32) -> Result<(), DbErr> {
    project_tag::Entity::delete_many()
        .filter(project_tag::Column::ProjectId.eq(project_id))
        .exec(db)
        .await?;
    Ok(())
}
