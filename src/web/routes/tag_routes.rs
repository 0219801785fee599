use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use sea_orm::TransactionTrait;
use std::sync::Arc;
use tracing::info;

use crate::db::services::tag_service;
use crate::web::models::{CreateTagRequest, TagResponse, UpdateTagRequest};
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn create_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Tag name is required".to_string()));
    }

    // Uniqueness among live tags is checked here rather than via a DB
    // index: tombstoned tags keep their name and must not block reuse.
    let txn = app_state.db.begin().await?;
    if tag_service::find_live_tag_by_name(&txn, &payload.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "A tag with this name already exists".to_string(),
        ));
    }
    let tag = tag_service::insert_tag(&txn, &payload.name).await?;
    txn.commit().await?;

    info!(tag_id = tag.id, "Created tag");
    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

async fn get_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<Json<TagResponse>, AppError> {
    let tag = tag_service::find_live_tag(&app_state.db, tag_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;
    Ok(Json(TagResponse::from(tag)))
}

async fn update_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
    Json(payload): Json<UpdateTagRequest>,
) -> Result<Json<TagResponse>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Tag name is required".to_string()));
    }

    let txn = app_state.db.begin().await?;
    let tag = tag_service::find_live_tag(&txn, tag_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;

    let existing = tag_service::find_live_tag_by_name(&txn, &payload.name).await?;
    if existing.is_some_and(|existing| existing.id != tag.id) {
        return Err(AppError::Conflict(
            "A tag with this name already exists".to_string(),
        ));
    }
    let tag = tag_service::rename_tag(&txn, tag, &payload.name).await?;
    txn.commit().await?;

    info!(tag_id, "Renamed tag");
    Ok(Json(TagResponse::from(tag)))
}

async fn delete_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let txn = app_state.db.begin().await?;
    let tag = tag_service::find_live_tag(&txn, tag_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;

    // Referential guard: a tag attached to any project stays.
    if tag_service::association_count(&txn, tag_id).await? > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a tag that is still in use".to_string(),
        ));
    }
    tag_service::soft_delete_tag(&txn, tag).await?;
    txn.commit().await?;

    info!(tag_id, "Deleted tag");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_tags_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = tag_service::find_live_tags(&app_state.db).await?;
    let response: Vec<TagResponse> = tags.into_iter().map(TagResponse::from).collect();
    Ok(Json(response))
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    // Collection endpoint under both slash forms, as for projects.
    let collection = get(list_tags_handler).post(create_tag_handler);
    Router::new()
        .route("/tags", collection.clone())
        .route("/tags/", collection)
        .route(
            "/tags/{tag_id}",
            get(get_tag_handler)
                .put(update_tag_handler)
                .delete(delete_tag_handler),
        )
}
