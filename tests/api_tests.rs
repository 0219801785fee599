//! End-to-end tests for the project/tag HTTP API.
//!
//! Each test builds the real router on top of an in-memory SQLite
//! database and drives it in-process, so the full stack (routing,
//! extractors, transactions, soft-delete filters) is exercised.

use std::collections::HashSet;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;

use projectboard::{db, web};

async fn test_app() -> Router {
    // A single pooled connection keeps every request on the same
    // in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let conn = Database::connect(options).await.unwrap();
    db::setup_schema(&conn).await.unwrap();
    web::create_router(conn)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_tag(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, "POST", "/tags/", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_project(app: &Router, payload: Value) -> Value {
    let (status, body) = send(app, "POST", "/projects/", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

fn tag_id_set(project: &Value) -> HashSet<i64> {
    project["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn collection_paths_match_with_and_without_trailing_slash() {
    let app = test_app().await;
    for uri in ["/projects", "/projects/", "/tags", "/tags/"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "GET {uri}");
        assert_eq!(body.as_array().unwrap().len(), 0, "GET {uri}");
    }

    let (status, _) = send(
        &app,
        "POST",
        "/tags",
        Some(json!({ "name": "slashless" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "GET", "/tags/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_project_round_trips_through_get() {
    let app = test_app().await;
    let created = create_project(
        &app,
        json!({ "name": "Ship it", "description": "release prep" }),
    )
    .await;
    assert_eq!(created["status"], "active");
    assert_eq!(created["tags"].as_array().unwrap().len(), 0);

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/projects/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Ship it");
    assert_eq!(fetched["description"], "release prep");
    assert_eq!(fetched["status"], "active");
    assert_eq!(fetched["tags"].as_array().unwrap().len(), 0);
    assert_eq!(fetched["created_at"], created["created_at"]);
}

#[tokio::test]
async fn create_project_with_unknown_tag_persists_nothing() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/projects/",
        Some(json!({ "name": "Doomed", "tag_ids": [999] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The project row must have been rolled back with the failed tags.
    let (status, body) = send(&app, "GET", "/projects/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn empty_project_name_is_rejected() {
    let app = test_app().await;
    let (status, _) = send(&app, "POST", "/projects/", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_tag_name_is_rejected_and_persists_no_row() {
    let app = test_app().await;
    create_tag(&app, "urgent").await;

    let (status, _) = send(&app, "POST", "/tags/", Some(json!({ "name": "urgent" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Case-sensitive exact match only: a differently-cased name is fine.
    let (status, _) = send(&app, "POST", "/tags/", Some(json!({ "name": "Urgent" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, tags) = send(&app, "GET", "/tags/", None).await;
    assert_eq!(tags.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn tag_rename_checks_uniqueness() {
    let app = test_app().await;
    let t1 = create_tag(&app, "one").await;
    create_tag(&app, "two").await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/tags/{t1}"),
        Some(json!({ "name": "two" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/tags/{t1}"),
        Some(json!({ "name": "three" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "three");
}

#[tokio::test]
async fn tag_set_matches_regardless_of_input_order() {
    let app = test_app().await;
    let t1 = create_tag(&app, "alpha").await;
    let t2 = create_tag(&app, "beta").await;

    let created = create_project(&app, json!({ "name": "P", "tag_ids": [t2, t1] })).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(tag_id_set(&created), HashSet::from([t1, t2]));

    let (_, fetched) = send(&app, "GET", &format!("/projects/{id}"), None).await;
    assert_eq!(tag_id_set(&fetched), HashSet::from([t1, t2]));
}

#[tokio::test]
async fn empty_tag_list_clears_associations() {
    let app = test_app().await;
    let t1 = create_tag(&app, "a").await;
    let t2 = create_tag(&app, "b").await;
    let created = create_project(&app, json!({ "name": "P", "tag_ids": [t1, t2] })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/projects/{id}"),
        Some(json!({ "tag_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["tags"].as_array().unwrap().len(), 0);

    let (_, fetched) = send(&app, "GET", &format!("/projects/{id}"), None).await;
    assert_eq!(fetched["tags"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn absent_tag_field_leaves_associations_untouched() {
    let app = test_app().await;
    let t1 = create_tag(&app, "keep").await;
    let created = create_project(&app, json!({ "name": "P", "tag_ids": [t1] })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/projects/{id}"),
        Some(json!({ "name": "P2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "P2");
    assert_eq!(tag_id_set(&updated), HashSet::from([t1]));
}

#[tokio::test]
async fn partial_update_only_touches_present_fields() {
    let app = test_app().await;
    let created = create_project(&app, json!({ "name": "P", "description": "d" })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/projects/{id}"),
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "P");
    assert_eq!(updated["description"], "d");
    assert_eq!(updated["status"], "done");
}

#[tokio::test]
async fn update_with_unknown_tag_rolls_back_everything() {
    let app = test_app().await;
    let t1 = create_tag(&app, "real").await;
    let created = create_project(&app, json!({ "name": "P", "tag_ids": [t1] })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/projects/{id}"),
        Some(json!({ "name": "renamed", "tag_ids": [t1, 999] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The field update rolled back along with the tag replacement.
    let (_, fetched) = send(&app, "GET", &format!("/projects/{id}"), None).await;
    assert_eq!(fetched["name"], "P");
    assert_eq!(tag_id_set(&fetched), HashSet::from([t1]));
}

#[tokio::test]
async fn deleting_tag_in_use_returns_conflict() {
    let app = test_app().await;
    let t1 = create_tag(&app, "busy").await;
    let created = create_project(&app, json!({ "name": "P", "tag_ids": [t1] })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/tags/{t1}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Tag and association are intact.
    let (status, _) = send(&app, "GET", &format!("/tags/{t1}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, fetched) = send(&app, "GET", &format!("/projects/{id}"), None).await;
    assert_eq!(tag_id_set(&fetched), HashSet::from([t1]));
}

#[tokio::test]
async fn adding_same_tag_twice_is_idempotent() {
    let app = test_app().await;
    let t1 = create_tag(&app, "once").await;
    let created = create_project(&app, json!({ "name": "P" })).await;
    let id = created["id"].as_i64().unwrap();

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/projects/{id}/tags"),
            Some(json!({ "tag_ids": [t1] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tags"].as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn removing_unassociated_tag_is_a_noop() {
    let app = test_app().await;
    let t1 = create_tag(&app, "elsewhere").await;
    let created = create_project(&app, json!({ "name": "P" })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/projects/{id}/tags"),
        Some(json!({ "tag_ids": [t1, 999] })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn deleted_project_is_hidden_and_frees_its_tags() {
    let app = test_app().await;
    let t1 = create_tag(&app, "freed").await;
    let created = create_project(&app, json!({ "name": "P", "tag_ids": [t1] })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/projects/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/projects/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = send(&app, "GET", "/projects/", None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Association rows went with the project, so the tag is deletable.
    let (status, _) = send(&app, "DELETE", &format!("/tags/{t1}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/tags/{t1}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_tag_name_can_be_reused() {
    let app = test_app().await;
    let t1 = create_tag(&app, "phoenix").await;
    let (status, _) = send(&app, "DELETE", &format!("/tags/{t1}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let t2 = create_tag(&app, "phoenix").await;
    assert_ne!(t1, t2);
}

#[tokio::test]
async fn unknown_ids_and_malformed_paths() {
    let app = test_app().await;

    let (status, _) = send(&app, "GET", "/projects/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/tags/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Non-numeric id fails the typed path extractor.
    let (status, _) = send(&app, "GET", "/projects/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unrouted method.
    let (status, _) = send(&app, "PATCH", "/tags/", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
