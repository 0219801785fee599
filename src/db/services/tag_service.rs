use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};

use crate::db::entities::{project_tag, tag};

// --- Tag Service Functions ---

/// Retrieves all tags that have not been soft-deleted.
pub async fn find_live_tags<C: ConnectionTrait>(db: &C) -> Result<Vec<tag::Model>, DbErr> {
    tag::Entity::find()
        .filter(tag::Column::DeletedAt.is_null())
        .all(db)
        .await
}

/// Retrieves a single live tag by its id.
pub async fn find_live_tag<C: ConnectionTrait>(
    db: &C,
    tag_id: i32,
) -> Result<Option<tag::Model>, DbErr> {
    tag::Entity::find_by_id(tag_id)
        .filter(tag::Column::DeletedAt.is_null())
        .one(db)
        .await
}

/// Looks up a live tag by exact (case-sensitive) name.
pub async fn find_live_tag_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<tag::Model>, DbErr> {
    tag::Entity::find()
        .filter(tag::Column::Name.eq(name))
        .filter(tag::Column::DeletedAt.is_null())
        .one(db)
        .await
}

/// Retrieves the live tags matching the given ids. Ids that do not
/// resolve to a live tag are simply absent from the result; callers
/// compare lengths to detect unknown references.
pub async fn find_live_tags_by_ids<C: ConnectionTrait>(
    db: &C,
    tag_ids: &[i32],
) -> Result<Vec<tag::Model>, DbErr> {
    if tag_ids.is_empty() {
        return Ok(Vec::new());
    }
    tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids.iter().copied()))
        .filter(tag::Column::DeletedAt.is_null())
        .all(db)
        .await
}

/// Inserts a new tag.
pub async fn insert_tag<C: ConnectionTrait>(db: &C, name: &str) -> Result<tag::Model, DbErr> {
    let now = Utc::now();
    tag::ActiveModel {
        name: Set(name.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Renames an existing tag.
pub async fn rename_tag<C: ConnectionTrait>(
    db: &C,
    tag_model: tag::Model,
    name: &str,
) -> Result<tag::Model, DbErr> {
    let mut active_tag = tag_model.into_active_model();
    active_tag.name = Set(name.to_owned());
    active_tag.updated_at = Set(Utc::now());
    active_tag.update(db).await
}

/// Marks a tag as deleted. The row is retained as a tombstone.
pub async fn soft_delete_tag<C: ConnectionTrait>(db: &C, tag_model: tag::Model) -> Result<(), DbErr> {
    let now = Utc::now();
    let mut active_tag = tag_model.into_active_model();
    active_tag.deleted_at = Set(Some(now));
    active_tag.updated_at = Set(now);
    active_tag.update(db).await?;
    Ok(())
}

/// Counts how many projects currently reference the tag.
pub async fn association_count<C: ConnectionTrait>(db: &C, tag_id: i32) -> Result<u64, DbErr> {
    project_tag::Entity::find()
        .filter(project_tag::Column::TagId.eq(tag_id))
        .count(db)
        .await
}
