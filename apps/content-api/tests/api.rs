//! Integration tests for content-api endpoints
//!
//! Requests are driven through the router with `oneshot` against an
//! in-memory database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use content_api::{build_router, AppState};
use lingua_db::{Database, DbConfig};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a fresh in-memory database
async fn setup_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    build_router(AppState::new(db))
}

/// Test helper: sends one request and returns status and JSON body
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, title: &str) -> i64 {
    let (status, body) = send(app, "POST", "/modules", Some(json!({ "title": title }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

// =============================================================================
// Create / List / Get
// =============================================================================

#[tokio::test]
async fn test_create_and_list() {
    let app = setup_app().await;

    let id = create(&app, "Greetings").await;

    let (status, body) = send(&app, "GET", "/modules", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], id);
    assert_eq!(body[0]["title"], "Greetings");
    assert_eq!(body[0]["level"], "A1");
    assert_eq!(body[0]["revision"], 0);
}

#[tokio::test]
async fn test_create_rejects_blank_title() {
    let app = setup_app().await;

    let (status, body) = send(&app, "POST", "/modules", Some(json!({ "title": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_unknown_module_is_404() {
    let app = setup_app().await;

    let (status, body) = send(&app, "GET", "/modules/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_id_is_400() {
    let app = setup_app().await;

    for uri in ["/modules/abc", "/modules/0", "/modules/-3"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

// =============================================================================
// Synchronize
// =============================================================================

#[tokio::test]
async fn test_patch_then_get_round_trip() {
    let app = setup_app().await;
    let id = create(&app, "Café").await;

    let document = json!({
        "titleRu": "Кафе",
        "vocabulary": [
            { "word": "кофе", "translation": "coffee" },
            { "word": "чай", "translation": "tea" }
        ],
        "grammar": { "title": "Cases", "rules": ["rule A", "rule B"] },
        "quiz": [
            { "question": "кофе?", "options": [
                { "text": "coffee", "isCorrect": true },
                { "text": "tea" }
            ]}
        ]
    });

    let (status, body) = send(&app, "PATCH", &format!("/modules/{id}"), Some(document)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revision"], 1);
    assert_eq!(body["titleRu"], "Кафе");

    let (status, view) = send(&app, "GET", &format!("/modules/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["title"], "Café");
    assert_eq!(view["vocabulary"][1]["word"], "чай");
    assert_eq!(view["grammar"]["rules"][0]["text"], "rule A");
    assert_eq!(view["grammar"]["examples"], json!([]));
    assert_eq!(view["quiz"][0]["options"][0]["isCorrect"], true);
    assert!(view["grammar"]["id"].is_i64());
}

#[tokio::test]
async fn test_patch_malformed_body_is_400() {
    let app = setup_app().await;
    let id = create(&app, "Unit").await;

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/modules/{id}"))
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/modules/{id}"),
        Some(json!({ "vocabulary": [{ "translation": "no word" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_null_clears_block_field() {
    let app = setup_app().await;
    let id = create(&app, "Traditions").await;
    let uri = format!("/modules/{id}");

    let document = json!({ "cultural": { "title": "Maslenitsa", "videoUrl": "http://v" } });
    let (status, _) = send(&app, "PATCH", &uri, Some(document)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "cultural": { "videoUrl": null } }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, view) = send(&app, "GET", &uri, None).await;
    assert_eq!(view["cultural"]["title"], "Maslenitsa");
    assert_eq!(view["cultural"]["videoUrl"], Value::Null);

    // The module title is NOT NULL and cannot be cleared
    let (status, body) = send(&app, "PATCH", &uri, Some(json!({ "title": null }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_patch_unknown_module_is_404() {
    let app = setup_app().await;

    let (status, body) = send(&app, "PATCH", "/modules/41", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_stale_revision_is_409() {
    let app = setup_app().await;
    let id = create(&app, "Unit").await;
    let uri = format!("/modules/{id}");

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "title": "first" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "expectedRevision": 0, "title": "stale" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, view) = send(&app, "GET", &uri, None).await;
    assert_eq!(view["title"], "first");
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_module() {
    let app = setup_app().await;
    let id = create(&app, "Unit").await;
    let uri = format!("/modules/{id}");

    send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "vocabulary": [{ "word": "да" }, { "word": "нет" }] })),
    )
    .await;

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["rowsRemoved"], 3);

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
