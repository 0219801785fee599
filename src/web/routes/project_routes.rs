use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::services::{project_service, tag_service};
use crate::web::models::{
    CreateProjectRequest, ProjectResponse, TagIdsRequest, UpdateProjectRequest,
};
use crate::web::{AppError, AppState};

/// Dedupes the requested tag ids and verifies that every one resolves
/// to a live tag. Returns the deduped ids, or a validation error naming
/// the problem before anything gets associated.
async fn verify_tag_ids<C: ConnectionTrait>(db: &C, tag_ids: &[i32]) -> Result<Vec<i32>, AppError> {
    let mut seen = HashSet::new();
    let unique: Vec<i32> = tag_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();
    let live_tags = tag_service::find_live_tags_by_ids(db, &unique).await?;
    if live_tags.len() != unique.len() {
        warn!(
            requested = unique.len(),
            found = live_tags.len(),
            "Tag verification failed: unknown tag ids in request"
        );
        return Err(AppError::InvalidInput(
            "One or more tags do not exist".to_string(),
        ));
    }
    Ok(unique)
}

// --- Route Handlers ---

async fn create_project_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Project name is required".to_string(),
        ));
    }

    let txn = app_state.db.begin().await?;
    let project = project_service::insert_project(
        &txn,
        &payload.name,
        payload.description.as_deref().unwrap_or_default(),
    )
    .await?;

    // Dropping the transaction on a verification failure rolls the
    // project row back, so an unknown tag id persists nothing.
    let tag_ids = payload.tag_ids.unwrap_or_default();
    let tags = if tag_ids.is_empty() {
        Vec::new()
    } else {
        let tag_ids = verify_tag_ids(&txn, &tag_ids).await?;
        project_service::attach_tags(&txn, project.id, &tag_ids).await?;
        project_service::find_project_tags(&txn, &project).await?
    };
    txn.commit().await?;

    info!(project_id = project.id, "Created project");
    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse::from_parts(project, tags)),
    ))
}

async fn get_project_handler(
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = project_service::find_live_project(&app_state.db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    let tags = project_service::find_project_tags(&app_state.db, &project).await?;
    Ok(Json(ProjectResponse::from_parts(project, tags)))
}

async fn update_project_handler(
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::InvalidInput(
            "Project name must not be empty".to_string(),
        ));
    }

    let txn = app_state.db.begin().await?;
    let mut project = project_service::find_live_project(&txn, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    if payload.name.is_some() || payload.description.is_some() || payload.status.is_some() {
        project = project_service::update_project_fields(
            &txn,
            project,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.status.as_deref(),
        )
        .await?;
    }

    // A present tag list replaces the association set wholesale; an
    // absent one leaves it untouched.
    let tags = match payload.tag_ids {
        Some(tag_ids) => {
            let tag_ids = verify_tag_ids(&txn, &tag_ids).await?;
            project_service::clear_tags(&txn, project_id).await?;
            project_service::attach_tags(&txn, project_id, &tag_ids).await?;
            project_service::find_project_tags(&txn, &project).await?
        }
        None => project_service::find_project_tags(&txn, &project).await?,
    };
    txn.commit().await?;

    info!(project_id, "Updated project");
    Ok(Json(ProjectResponse::from_parts(project, tags)))
}

async fn delete_project_handler(
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let txn = app_state.db.begin().await?;
    let project = project_service::find_live_project(&txn, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    // Association rows go with the project so the tags it referenced
    // stay deletable under the in-use guard.
    project_service::clear_tags(&txn, project_id).await?;
    project_service::soft_delete_project(&txn, project).await?;
    txn.commit().await?;

    info!(project_id, "Deleted project");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_projects_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let projects = project_service::find_live_projects_with_tags(&app_state.db).await?;
    let response: Vec<ProjectResponse> = projects
        .into_iter()
        .map(|(project, tags)| ProjectResponse::from_parts(project, tags))
        .collect();
    Ok(Json(response))
}

async fn add_project_tags_handler(
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Json(payload): Json<TagIdsRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let txn = app_state.db.begin().await?;
    let project = project_service::find_live_project(&txn, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    let tag_ids = verify_tag_ids(&txn, &payload.tag_ids).await?;
    project_service::attach_tags(&txn, project_id, &tag_ids).await?;
    let tags = project_service::find_project_tags(&txn, &project).await?;
    txn.commit().await?;

    info!(project_id, added = tag_ids.len(), "Added tags to project");
    Ok(Json(ProjectResponse::from_parts(project, tags)))
}

async fn remove_project_tags_handler(
    State(app_state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Json(payload): Json<TagIdsRequest>,
) -> Result<StatusCode, AppError> {
    project_service::find_live_project(&app_state.db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    // Removing a tag that was never associated is a no-op, not an error.
    project_service::detach_tags(&app_state.db, project_id, &payload.tag_ids).await?;

    info!(project_id, "Removed tags from project");
    Ok(StatusCode::NO_CONTENT)
}

// --- Router ---

pub fn create_projects_router() -> Router<Arc<AppState>> {
    // The collection endpoint is registered under both slash forms:
    // axum matches paths exactly, and the wire contract uses the
    // trailing-slash form.
    let collection = get(list_projects_handler).post(create_project_handler);
    Router::new()
        .route("/projects", collection.clone())
        .route("/projects/", collection)
        .route(
            "/projects/{project_id}",
            get(get_project_handler)
                .put(update_project_handler)
                .delete(delete_project_handler),
        )
        .route(
            "/projects/{project_id}/tags",
            post(add_project_tags_handler).delete(remove_project_tags_handler),
        )
}
