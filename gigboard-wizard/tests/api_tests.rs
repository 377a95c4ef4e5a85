//! Integration tests for gigboard-wizard API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Draft view, field updates and validation errors
//! - Step navigation over HTTP
//! - Advice retrieval and application
//! - Publish status codes and draft retention
//! - Media serving from the local media root

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gigboard_common::events::EventBus;
use gigboard_wizard::api::actor::{ACTOR_ID_HEADER, ACTOR_NAME_HEADER};
use gigboard_wizard::listing_store::SqliteListingCreator;
use gigboard_wizard::publish::ListingCreator;
use gigboard_wizard::store::DraftStore;
use gigboard_wizard::wizard::ListingWizard;
use gigboard_wizard::{build_router, AppState};
use helpers::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over `drafts` with the given creator
async fn setup_app(drafts: DraftStore, creator: Arc<dyn ListingCreator>) -> Router {
    let bus = EventBus::new(64);
    let coordinator = coordinator(RecordingUploader::new(), creator, drafts.clone(), &bus);
    let wizard = ListingWizard::open(drafts)
        .await
        .unwrap()
        .with_event_bus(bus.clone());
    build_router(AppState::new(wizard, coordinator, bus))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authenticated(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_ID_HEADER, "user-42")
        .header(ACTOR_NAME_HEADER, "Jamie Organizer")
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_backend, drafts) = memory_drafts();
    let app = setup_app(drafts, RecordingCreator::returning("evt_1")).await;

    let (status, body) = send(&app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "gigboard-wizard");
    assert!(body["version"].is_string());
}

// =============================================================================
// Draft view and edits
// =============================================================================

#[tokio::test]
async fn test_get_fresh_draft() {
    let (_backend, drafts) = memory_drafts();
    let app = setup_app(drafts, RecordingCreator::returning("evt_1")).await;

    let (status, body) = send(&app, test_request("GET", "/api/draft")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], 1);
    assert_eq!(body["canAdvance"], false);
    assert_eq!(body["validity"]["details"], false);
    assert_eq!(body["validity"]["review"], true);
    assert_eq!(body["status"]["status"], "editing");
    assert_eq!(body["record"]["title"], "");
    assert_eq!(body["advice"]["severity"], "default");
}

#[tokio::test]
async fn test_patch_field_persists_and_recomputes() {
    let (_backend, drafts) = memory_drafts();
    let app = setup_app(drafts.clone(), RecordingCreator::returning("evt_1")).await;

    for update in [
        json!({"field": "title", "value": "Gig"}),
        json!({"field": "type", "value": "residency"}),
        json!({"field": "date", "value": "2026-12-01"}),
        json!({"field": "startTime", "value": "19:45"}),
        json!({"field": "location", "value": "The Roxy"}),
    ] {
        let (status, _) = send(&app, json_request("PATCH", "/api/draft", update)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, test_request("GET", "/api/draft")).await;
    assert_eq!(body["canAdvance"], true);
    assert_eq!(body["record"]["startTime"], "19:45");
    assert_eq!(body["scheduledAt"], "2026-12-01T19:45:00");
    // "Gig" is short
    assert_eq!(body["advice"]["severity"], "warning");

    let stored = drafts.load().await.unwrap().unwrap();
    assert_eq!(stored.title, "Gig");
    assert_eq!(stored.location, "The Roxy");
}

#[tokio::test]
async fn test_patch_invalid_value_is_bad_request() {
    let (_backend, drafts) = memory_drafts();
    let app = setup_app(drafts, RecordingCreator::returning("evt_1")).await;

    let (status, body) = send(
        &app,
        json_request("PATCH", "/api/draft", json!({"field": "budget", "value": -10})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_patch_unknown_field_rejected() {
    let (_backend, drafts) = memory_drafts();
    let app = setup_app(drafts, RecordingCreator::returning("evt_1")).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/draft",
            json!({"field": "venueCapacity", "value": 300}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Navigation
// =============================================================================

#[tokio::test]
async fn test_next_blocked_then_back_exits() {
    let (_backend, drafts) = memory_drafts();
    let app = setup_app(drafts, RecordingCreator::returning("evt_1")).await;

    let (status, body) = send(&app, test_request("POST", "/api/draft/next")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transition"]["outcome"], "blocked");
    assert_eq!(body["transition"]["step"], 1);
    assert_eq!(body["draft"]["step"], 1);

    let (status, body) = send(&app, test_request("POST", "/api/draft/back")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transition"]["outcome"], "exited");
    assert_eq!(body["draft"]["status"]["status"], "exited");
}

#[tokio::test]
async fn test_navigation_over_stored_draft() {
    let (_backend, drafts) = memory_drafts();
    let mut record = complete_record();
    record.step = gigboard_wizard::models::WizardStep::Details;
    drafts.save(&record).await.unwrap();
    let app = setup_app(drafts, RecordingCreator::returning("evt_1")).await;

    let (_, body) = send(&app, test_request("POST", "/api/draft/next")).await;
    assert_eq!(body["transition"], json!({"outcome": "advanced", "step": 2}));

    let (_, body) = send(&app, test_request("POST", "/api/draft/next")).await;
    assert_eq!(body["transition"], json!({"outcome": "advanced", "step": 3}));

    let (_, body) = send(&app, test_request("POST", "/api/draft/next")).await;
    assert_eq!(body["transition"]["outcome"], "unchanged");

    let (_, body) = send(&app, test_request("POST", "/api/draft/back")).await;
    assert_eq!(body["transition"], json!({"outcome": "retreated", "step": 2}));
}

// =============================================================================
// Advice
// =============================================================================

#[tokio::test]
async fn test_advice_apply_on_review() {
    let (_backend, drafts) = memory_drafts();
    drafts.save(&complete_record()).await.unwrap();
    let app = setup_app(drafts, RecordingCreator::returning("evt_1")).await;

    let (status, hint) = send(&app, test_request("GET", "/api/draft/advice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hint["severity"], "suggestion");
    assert_eq!(hint["action"]["value"], "✨ Friday Jazz Night (optimized)");

    let (_, body) = send(&app, test_request("POST", "/api/draft/advice/apply")).await;
    assert_eq!(body["applied"], true);
    assert_eq!(body["draft"]["record"]["title"], "✨ Friday Jazz Night (optimized)");

    let (_, body) = send(&app, test_request("POST", "/api/draft/advice/apply")).await;
    assert_eq!(body["applied"], false);
}

// =============================================================================
// Publish
// =============================================================================

#[tokio::test]
async fn test_publish_requires_actor() {
    let (_backend, drafts) = memory_drafts();
    drafts.save(&complete_record()).await.unwrap();
    let creator = RecordingCreator::returning("evt_1");
    let app = setup_app(drafts.clone(), creator.clone()).await;

    let (status, body) = send(&app, test_request("POST", "/api/draft/publish")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    assert_eq!(creator.calls(), 0);
    assert!(drafts.load().await.unwrap().is_some());

    // The wizard is editable again
    let (_, body) = send(&app, test_request("GET", "/api/draft")).await;
    assert_eq!(body["status"]["status"], "editing");
}

#[tokio::test]
async fn test_publish_before_review_unprocessable() {
    let (_backend, drafts) = memory_drafts();
    let app = setup_app(drafts, RecordingCreator::returning("evt_1")).await;

    let (status, body) = send(&app, authenticated("POST", "/api/draft/publish")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "NOT_ON_REVIEW");
}

#[tokio::test]
async fn test_publish_success() {
    let (_backend, drafts) = memory_drafts();
    drafts.save(&complete_record()).await.unwrap();
    let app = setup_app(drafts.clone(), RecordingCreator::returning("evt_99")).await;

    let (status, body) = send(&app, authenticated("POST", "/api/draft/publish")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["listingId"], "evt_99");
    assert_eq!(body["imageUrl"], PLACEHOLDER_URL);
    assert!(body.get("imageDegraded").is_none());
    assert!(drafts.load().await.unwrap().is_none());

    let (_, body) = send(&app, test_request("GET", "/api/draft")).await;
    assert_eq!(body["status"], json!({"status": "published", "listingId": "evt_99"}));
    assert_eq!(body["step"], 1);
}

#[tokio::test]
async fn test_publish_creation_failure_is_bad_gateway() {
    let (_backend, drafts) = memory_drafts();
    drafts.save(&complete_record()).await.unwrap();
    let app = setup_app(drafts.clone(), RecordingCreator::failing()).await;

    let (status, body) = send(&app, authenticated("POST", "/api/draft/publish")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "CREATION_FAILED");
    assert_eq!(drafts.load().await.unwrap(), Some(complete_record()));

    let (_, body) = send(&app, test_request("GET", "/api/draft")).await;
    assert_eq!(body["step"], 3);
    assert_eq!(body["status"]["status"], "editing");
}

#[tokio::test]
async fn test_publish_into_sqlite() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let (_backend, drafts) = memory_drafts();
    drafts.save(&complete_record()).await.unwrap();
    let creator = Arc::new(SqliteListingCreator::new(pool));
    let app = setup_app(drafts, creator.clone()).await;

    let (status, body) = send(&app, authenticated("POST", "/api/draft/publish")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["listingId"].as_str().unwrap().starts_with("evt_"));
    assert_eq!(creator.count().await.unwrap(), 1);
}

/// Poll the draft view until the wizard reports `status`
async fn wait_for_status(app: &Router, status: &str) -> Value {
    for _ in 0..200 {
        let (_, body) = send(app, test_request("GET", "/api/draft")).await;
        if body["status"]["status"] == status {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("wizard never reached status {}", status);
}

#[tokio::test]
async fn test_dropped_publish_request_still_completes() {
    let (_backend, drafts) = memory_drafts();
    drafts.save(&complete_record()).await.unwrap();
    let creator = GatedCreator::returning("evt_99");
    let app = setup_app(drafts.clone(), creator.clone()).await;

    // Client gives up while the listing is being created
    let request = app.clone().oneshot(authenticated("POST", "/api/draft/publish"));
    let timed_out = tokio::time::timeout(Duration::from_millis(50), request).await;
    assert!(timed_out.is_err());

    creator.wait_entered().await;
    let (_, body) = send(&app, test_request("GET", "/api/draft")).await;
    assert_eq!(body["status"]["status"], "publishing");

    let (status, body) = send(&app, authenticated("POST", "/api/draft/publish")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PUBLISH_IN_FLIGHT");

    creator.release();
    let body = wait_for_status(&app, "published").await;
    assert_eq!(body["status"]["listingId"], "evt_99");
    assert!(drafts.load().await.unwrap().is_none());
    assert_eq!(creator.calls(), 1);

    // The next publish is judged on the reset draft, not refused as in flight
    let (status, body) = send(&app, authenticated("POST", "/api/draft/publish")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "NOT_ON_REVIEW");
}

#[tokio::test]
async fn test_edits_and_back_during_publish() {
    let (_backend, drafts) = memory_drafts();
    drafts.save(&complete_record()).await.unwrap();
    let creator = GatedCreator::returning("evt_99");
    let app = setup_app(drafts.clone(), creator.clone()).await;

    let publish = tokio::spawn(
        app.clone()
            .oneshot(authenticated("POST", "/api/draft/publish")),
    );
    creator.wait_entered().await;

    let (status, body) = send(
        &app,
        json_request("PATCH", "/api/draft", json!({"field": "title", "value": "late edit"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["title"], "late edit");
    assert_eq!(body["status"]["status"], "publishing");

    let (status, body) = send(&app, test_request("POST", "/api/draft/back")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transition"], json!({"outcome": "retreated", "step": 2}));

    creator.release();
    let response = publish.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["listingId"], "evt_99");

    let (_, body) = send(&app, test_request("GET", "/api/draft")).await;
    assert_eq!(body["status"], json!({"status": "published", "listingId": "evt_99"}));
    assert_eq!(body["step"], 1);
    assert_eq!(body["record"]["title"], "");
    assert!(drafts.load().await.unwrap().is_none());
}

// =============================================================================
// Media
// =============================================================================

#[tokio::test]
async fn test_media_served_from_media_root() {
    let media_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(media_dir.path().join("listings/user-42")).unwrap();
    std::fs::write(media_dir.path().join("listings/user-42/cover.png"), b"hello").unwrap();

    let (_backend, drafts) = memory_drafts();
    let bus = EventBus::new(16);
    let coordinator = coordinator(
        RecordingUploader::new(),
        RecordingCreator::returning("evt_1"),
        drafts.clone(),
        &bus,
    );
    let wizard = ListingWizard::open(drafts).await.unwrap();
    let state = AppState::new(wizard, coordinator, bus).with_media_root(media_dir.path().to_path_buf());
    let app = build_router(state);

    let response = app
        .oneshot(test_request("GET", "/media/listings/user-42/cover.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"hello");
}

#[tokio::test]
async fn test_event_stream_content_type() {
    let (_backend, drafts) = memory_drafts();
    let app = setup_app(drafts, RecordingCreator::returning("evt_1")).await;

    let response = app.oneshot(test_request("GET", "/events")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
}
