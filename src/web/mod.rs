use axum::{Router, http::Method, routing::get};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub mod error;
pub mod models;
pub mod routes;

pub use error::AppError;

use routes::{project_routes, tag_routes};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_router(db: DatabaseConnection) -> Router {
    let app_state = Arc::new(AppState { db });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check_handler))
        .merge(project_routes::create_projects_router())
        .merge(tag_routes::create_tags_router())
        .with_state(app_state)
        .layer(cors)
}
