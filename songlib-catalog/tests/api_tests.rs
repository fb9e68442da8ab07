//! Integration tests for songlib-catalog HTTP endpoints
//!
//! Drives the full router with `oneshot` against a temp SQLite database and
//! the in-process fixture provider.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use songlib_catalog::enrichment::FixtureEnrichmentClient;
use songlib_catalog::store::SqliteCatalogStore;
use songlib_catalog::{build_router, AppState, CatalogService};
use songlib_common::db::init_database;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt; // for `oneshot` method

struct TestApp {
    _temp_dir: TempDir,
    shutdown: CancellationToken,
    router: axum::Router,
}

impl TestApp {
    async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("api_test.db"))
            .await
            .expect("Should initialize test database");

        let service = CatalogService::new(
            Arc::new(SqliteCatalogStore::new(pool)),
            Arc::new(FixtureEnrichmentClient::new()),
        );
        let shutdown = CancellationToken::new();
        let router = build_router(AppState::new(service, shutdown.clone()));

        Self {
            _temp_dir: temp_dir,
            shutdown,
            router,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }

    async fn create(&self, group: &str, song: &str) -> String {
        let (status, body) = self
            .send(json_request("POST", "/songs", json!({ "group": group, "song": song })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["song_id"].as_str().unwrap().to_string()
    }
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

/// Extract JSON body from response (Null for an empty or non-JSON body)
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;

    let (status, body) = app.send(test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "songlib-catalog");
    assert!(body["version"].is_string());
}

// =============================================================================
// POST /songs
// =============================================================================

#[tokio::test]
async fn test_create_song_returns_id() {
    let app = TestApp::new().await;

    let id = app.create("Muse", "Supermassive Black Hole").await;

    assert!(uuid::Uuid::parse_str(&id).is_ok());
}

#[tokio::test]
async fn test_create_unknown_song_is_bad_gateway() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(json_request("POST", "/songs", json!({ "group": "Nobody", "song": "Nothing" })))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "ENRICHMENT_ERROR");

    let (_, listed) = app.send(test_request("GET", "/songs")).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    let app = TestApp::new().await;
    app.create("Enigma", "Sadeness").await;

    let (status, body) = app
        .send(json_request("POST", "/songs", json!({ "group": "Enigma", "song": "Sadeness" })))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_create_requires_group() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(json_request("POST", "/songs", json!({ "group": "", "song": "Sadeness" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(json_request("POST", "/songs", json!({ "group": "Enigma" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("song"));

    let request = Request::builder()
        .method("POST")
        .uri("/songs")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

// =============================================================================
// GET /songs
// =============================================================================

#[tokio::test]
async fn test_list_with_filter_and_wire_names() {
    let app = TestApp::new().await;
    app.create("Muse", "Supermassive Black Hole").await;
    let id = app.create("Enigma", "Sadeness").await;

    let (status, body) = app.send(test_request("GET", "/songs?group=Enigma")).await;

    assert_eq!(status, StatusCode::OK);
    let songs = body.as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["id"], id.as_str());
    assert_eq!(songs[0]["song"], "Sadeness");
    assert_eq!(songs[0]["release_date"], "1990-10-01");
    assert_eq!(
        songs[0]["link"],
        "https://www.youtube.com/watch?v=4F9DxYhqmKw&ab_channel=EnigmaVEVO"
    );
}

#[tokio::test]
async fn test_list_by_title_and_date() {
    let app = TestApp::new().await;
    app.create("Muse", "Supermassive Black Hole").await;
    app.create("Axel F", "Crazy Frog").await;

    let (status, body) = app
        .send(test_request("GET", "/songs?song=Crazy%20Frog&release_date=2005-05-17"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app
        .send(test_request("GET", "/songs?song=Crazy%20Frog&release_date=2006-07-16"))
        .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_limit_and_offset() {
    let app = TestApp::new().await;
    for (group, song) in FixtureEnrichmentClient::known_songs() {
        app.create(group, song).await;
    }

    let (_, all) = app.send(test_request("GET", "/songs")).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, limited) = app.send(test_request("GET", "/songs?limit=2")).await;
    assert_eq!(limited.as_array().unwrap().len(), 2);

    let (_, offset) = app.send(test_request("GET", "/songs?limit=2&offset=2")).await;
    assert_eq!(offset.as_array().unwrap().len(), 1);
}

// =============================================================================
// PUT /songs/:id
// =============================================================================

#[tokio::test]
async fn test_update_title_only() {
    let app = TestApp::new().await;
    let id = app.create("Muse", "Supermassive Black Hole").await;

    let (status, body) = app
        .send(json_request("PUT", &format!("/songs/{}", id), json!({ "song": "Uprising" })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["song"], "Uprising");
    assert_eq!(body["group"], "Muse");
    assert_eq!(body["release_date"], "2006-07-16");
    assert_eq!(body["link"], "https://www.youtube.com/watch?v=Xsp3_a-PMTw");
}

#[tokio::test]
async fn test_update_cannot_change_id() {
    let app = TestApp::new().await;
    let id = app.create("Muse", "Supermassive Black Hole").await;

    let (status, body) = app
        .send(json_request(
            "PUT",
            &format!("/songs/{}", id),
            json!({ "id": uuid::Uuid::new_v4() }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let (_, listed) = app.send(test_request("GET", "/songs")).await;
    assert_eq!(listed[0]["id"], id.as_str());
}

#[tokio::test]
async fn test_update_missing_song_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(json_request(
            "PUT",
            &format!("/songs/{}", uuid::Uuid::new_v4()),
            json!({ "song": "Ghost" }),
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// DELETE /songs/:id
// =============================================================================

#[tokio::test]
async fn test_delete_then_delete_again() {
    let app = TestApp::new().await;
    let id = app.create("Axel F", "Crazy Frog").await;
    let uri = format!("/songs/{}", id);

    let (status, body) = app.send(test_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Song deleted successfully");

    let (status, body) = app.send(test_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app.send(test_request("DELETE", "/songs/not-a-uuid")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_malformed_query_is_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(test_request("GET", "/songs?release_date=16.07.2006"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let (status, body) = app.send(test_request("GET", "/songs?limit=-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

// =============================================================================
// GET /songs/:id/verses
// =============================================================================

#[tokio::test]
async fn test_verses_first_page_of_one() {
    let app = TestApp::new().await;
    let id = app.create("Enigma", "Sadeness").await;

    let (status, body) = app
        .send(test_request("GET", &format!("/songs/{}/verses?page=1&page_size=1", id)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            "Procedamus in pace",
            "In nomine Christi, amen",
            "Cum angelis et pueris",
            "Fideles inveniamur"
        ])
    );
}

#[tokio::test]
async fn test_verses_default_paging() {
    let app = TestApp::new().await;
    let id = app.create("Enigma", "Sadeness").await;
    let uri = format!("/songs/{}/verses", id);

    // 8 verses at 5 per page: the second page holds the last three
    let (status, body) = app.send(test_request("GET", &format!("{}?page=2", uri))).await;
    assert_eq!(status, StatusCode::OK);
    let lines = body.as_array().unwrap();
    assert_eq!(lines.first().unwrap(), "Sade, dis-moi");
    assert_eq!(lines.last().unwrap(), "In nomine Christi, amen");

    let (status, body) = app.send(test_request("GET", &format!("{}?page=3", uri))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PAGE");
}

#[tokio::test]
async fn test_verses_zero_page_size_rejected() {
    let app = TestApp::new().await;
    let id = app.create("Enigma", "Sadeness").await;

    let (status, body) = app
        .send(test_request("GET", &format!("/songs/{}/verses?page_size=0", id)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Shutdown
// =============================================================================

#[tokio::test]
async fn test_requests_after_shutdown_are_cancelled() {
    let app = TestApp::new().await;
    app.shutdown.cancel();

    let (status, body) = app.send(test_request("GET", "/songs")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "CANCELLED");

    let (status, _) = app.send(test_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
}
