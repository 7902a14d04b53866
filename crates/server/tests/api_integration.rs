//! API integration tests.
//!
//! These tests drive the full router in-process:
//! - Channel messages pushed over HTTP become searchable catalog entries
//! - Search ranking, paging and the "show more" page
//! - Catalog lookups, stats and recent entries
//! - User profile, premium flag and search history

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{fixtures, TestFixture, CHANNEL};
use filmzi_core::{CatalogStore, SearchConfig, UserRegistry};

fn titles(body: &Value) -> Vec<String> {
    body["entries"]
        .as_array()
        .expect("entries array")
        .iter()
        .map(|e| e["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

async fn seed_inception(fixture: &TestFixture) {
    for (id, file_ref, caption) in [
        (1, "a", "The Inception Files 2020 720p 800 MB"),
        (2, "b", "Inception 2 2022 1080p 2.0 GB"),
        (3, "c", "Inception 2010 1080p 2.5 GB"),
        (4, "d", "Inception 2010 720p 1.1 GB"),
    ] {
        let response = fixture
            .ingest(fixtures::document_message(CHANNEL, id, file_ref, caption))
            .await;
        assert_status!(response, StatusCode::ACCEPTED);
    }
}

// ============================================================================
// Metrics
// ============================================================================

#[tokio::test]
async fn test_metrics_endpoint_exposes_catalog_gauge() {
    let fixture = TestFixture::new().await;
    seed_inception(&fixture).await;

    let (status, body) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("filmzi_catalog_entries"));
    assert!(body.contains("filmzi_ingest_messages_total"));
    assert!(body.contains("filmzi_http_requests_total"));
}

// ============================================================================
// Ingestion
// ============================================================================

#[tokio::test]
async fn test_pushed_message_is_indexed() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .ingest(fixtures::document_message(
            CHANNEL,
            7,
            "doc-7",
            "Cars (2006) 480p BluRay x264 ESubs 1.45GB",
        ))
        .await;
    assert_status!(response, StatusCode::ACCEPTED);

    let entry = fixture.catalog.get_by_file_ref("doc-7").unwrap();
    assert_eq!(entry.title, "Cars");
    assert_eq!(entry.year, Some(2006));
    assert_eq!(entry.quality.as_deref(), Some("480p"));
    assert_eq!(entry.size_label, "1.45 GB");
    assert_eq!(entry.source_message_ref.to_string(), format!("{}/7", CHANNEL));
}

#[tokio::test]
async fn test_message_without_file_or_from_other_chat_is_ignored() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .ingest(fixtures::text_message(CHANNEL, 1, "Welcome to the channel"))
        .await;
    assert_status!(response, StatusCode::ACCEPTED);

    let response = fixture
        .ingest(fixtures::document_message(-42, 2, "elsewhere", "Heat 1995 1080p 2.1 GB"))
        .await;
    assert_status!(response, StatusCode::ACCEPTED);

    // A marker pushed last proves the earlier messages were processed.
    fixture
        .ingest(fixtures::document_message(CHANNEL, 3, "marker", "Up 2009 720p 650 MB"))
        .await;

    assert_eq!(fixture.catalog.count().unwrap(), 1);
    assert!(fixture.catalog.get_by_file_ref("elsewhere").is_err());
}

#[tokio::test]
async fn test_replayed_message_keeps_single_row() {
    let fixture = TestFixture::new().await;
    let message = fixtures::document_message(CHANNEL, 5, "dup", "Heat 1995 1080p 2.1 GB");

    fixture.ingest(message.clone()).await;
    let first = fixture.catalog.get_by_file_ref("dup").unwrap();
    fixture.ingest(message).await;
    fixture
        .ingest(fixtures::document_message(CHANNEL, 6, "marker", "Up 2009 720p 650 MB"))
        .await;

    assert_eq!(fixture.catalog.count().unwrap(), 2);
    let second = fixture.catalog.get_by_file_ref("dup").unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn test_text_alias_is_accepted_for_caption() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/messages",
            json!({
                "chat_id": CHANNEL,
                "message_id": 11,
                "text": "Joker 2019 1080p 2.4 GB",
                "media": { "kind": "video", "file_ref": "vid-11", "size_bytes": 2576980378u64 }
            }),
        )
        .await;
    assert_status!(response, StatusCode::ACCEPTED);

    fixture.wait_for_file("vid-11").await;
    let entry = fixture.catalog.get_by_file_ref("vid-11").unwrap();
    assert_eq!(entry.title, "Joker");
    assert_eq!(entry.size_label, "2.4 GB");
}

#[tokio::test]
async fn test_malformed_message_is_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_raw("/api/v1/messages", "{not json").await;
    assert!(response.status.is_client_error());

    let response = fixture
        .post("/api/v1/messages", json!({ "caption": "missing ids" }))
        .await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_push_after_shutdown_is_unavailable() {
    let fixture = TestFixture::new().await;
    fixture.stop_ingest().await;

    let response = fixture
        .post(
            "/api/v1/messages",
            serde_json::to_value(fixtures::document_message(CHANNEL, 1, "late", "Up 2009 720p 650 MB"))
                .unwrap(),
        )
        .await;
    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body["error"].is_string());
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_ranks_exact_then_prefix_then_substring() {
    let fixture = TestFixture::new().await;
    seed_inception(&fixture).await;

    let response = fixture.get("/api/v1/search?q=inception").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["query"], "inception");
    assert_eq!(
        titles(&response.body),
        vec!["Inception", "Inception", "Inception 2", "The Inception Files"]
    );
    assert_eq!(response.body["has_more"], false);
}

#[tokio::test]
async fn test_short_query_returns_empty_page() {
    let fixture = TestFixture::new().await;
    seed_inception(&fixture).await;

    let response = fixture.get("/api/v1/search?q=i").await;
    assert_status!(response, StatusCode::OK);
    assert!(titles(&response.body).is_empty());
    assert_eq!(response.body["has_more"], false);

    let response = fixture.get("/api/v1/search").await;
    assert_status!(response, StatusCode::OK);
    assert!(titles(&response.body).is_empty());
}

#[tokio::test]
async fn test_search_limit_and_more_page() {
    let fixture = TestFixture::with_search(SearchConfig {
        page_size: 2,
        more_page_size: 3,
        min_query_len: 2,
    })
    .await;
    seed_inception(&fixture).await;

    let first = fixture.get("/api/v1/search?q=inception").await;
    assert_eq!(titles(&first.body).len(), 2);
    assert_eq!(first.body["has_more"], true);

    let more = fixture.get("/api/v1/search/more?q=inception").await;
    assert_eq!(titles(&more.body).len(), 3);
    assert_eq!(more.body["has_more"], true);
    assert_eq!(titles(&more.body)[..2], titles(&first.body)[..]);

    let limited = fixture.get("/api/v1/search?q=inception&limit=10").await;
    assert_eq!(titles(&limited.body).len(), 4);
    assert_eq!(limited.body["has_more"], false);
}

#[tokio::test]
async fn test_multi_word_query_falls_back_to_all_terms() {
    let fixture = TestFixture::new().await;
    fixture
        .ingest(fixtures::document_message(
            CHANNEL,
            1,
            "mi",
            "Mission Impossible Fallout 2018 1080p 2.2 GB",
        ))
        .await;

    let response = fixture.get("/api/v1/search?q=fallout%20mission").await;
    assert_eq!(titles(&response.body), vec!["Mission Impossible Fallout"]);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_get_entry_and_not_found() {
    let fixture = TestFixture::new().await;
    seed_inception(&fixture).await;
    let id = fixture.catalog.get_by_file_ref("c").unwrap().id;

    let response = fixture.get(&format!("/api/v1/catalog/{}", id)).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["file_ref"], "c");
    assert_eq!(response.body["title"], "Inception");
    assert_eq!(response.body["year"], 2010);

    let response = fixture.get("/api/v1/catalog/999999").await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert!(response.body["error"].as_str().unwrap().contains("999999"));
}

#[tokio::test]
async fn test_all_qualities_of_title() {
    let fixture = TestFixture::new().await;
    seed_inception(&fixture).await;

    let response = fixture.get("/api/v1/catalog/titles/inception").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
    let qualities: Vec<_> = response.body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["quality"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(qualities, vec!["720p", "1080p"]);

    let response = fixture.get("/api/v1/catalog/titles/Nothing%20Here").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 0);
}

#[tokio::test]
async fn test_stats_and_recent() {
    let fixture = TestFixture::new().await;
    seed_inception(&fixture).await;
    fixture
        .put("/api/v1/users/100", json!({ "display_name": "Alice" }))
        .await;
    assert!(
        fixture
            .eventually(|f| f.users.count().unwrap_or(0) == 1)
            .await
    );

    let response = fixture.get("/api/v1/catalog/stats").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total_entries"], 4);
    assert_eq!(response.body["total_users"], 1);
    assert!(response.body["newest_entry"].is_string());

    let response = fixture.get("/api/v1/catalog/recent?limit=2").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_user_profile_lifecycle() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/users/100").await;
    assert_status!(response, StatusCode::NOT_FOUND);

    let response = fixture
        .put(
            "/api/v1/users/100",
            json!({ "display_name": "Alice", "handle": "alice" }),
        )
        .await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert!(fixture.eventually(|f| f.users.get(100).is_ok()).await);

    let response = fixture.get("/api/v1/users/100").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["display_name"], "Alice");
    assert_eq!(response.body["handle"], "alice");
    assert_eq!(response.body["is_premium"], false);

    // Refresh keeps first_seen_at and updates the name.
    let first_seen = response.body["first_seen_at"].clone();
    fixture
        .put("/api/v1/users/100", json!({ "display_name": "Alice B" }))
        .await;
    assert!(
        fixture
            .eventually(|f| f
                .users
                .get(100)
                .map(|u| u.display_name == "Alice B")
                .unwrap_or(false))
            .await
    );
    let response = fixture.get("/api/v1/users/100").await;
    assert_eq!(response.body["first_seen_at"], first_seen);
}

#[tokio::test]
async fn test_premium_flag() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .put("/api/v1/users/7/premium", json!({ "is_premium": true }))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);

    fixture
        .put("/api/v1/users/7", json!({ "display_name": "Bob" }))
        .await;
    assert!(fixture.eventually(|f| f.users.get(7).is_ok()).await);

    let response = fixture
        .put("/api/v1/users/7/premium", json!({ "is_premium": true }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["is_premium"], true);

    // A later profile refresh does not clear the flag.
    fixture
        .put("/api/v1/users/7", json!({ "display_name": "Bobby" }))
        .await;
    assert!(
        fixture
            .eventually(|f| f
                .users
                .get(7)
                .map(|u| u.display_name == "Bobby")
                .unwrap_or(false))
            .await
    );
    assert!(fixture.users.get(7).unwrap().is_premium);
}

#[tokio::test]
async fn test_search_history() {
    let fixture = TestFixture::new().await;

    for query in ["inception", "heat", "up"] {
        let response = fixture
            .post("/api/v1/users/9/searches", json!({ "query": query }))
            .await;
        assert_status!(response, StatusCode::ACCEPTED);
    }
    assert!(
        fixture
            .eventually(|f| f.users.recent_searches(9, 10).map(|s| s.len()).unwrap_or(0) == 3)
            .await
    );

    let response = fixture.get("/api/v1/users/9/searches?limit=2").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["user_id"], 9);
    let queries: Vec<_> = response.body["searches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["query"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(queries, vec!["up", "heat"]);

    let response = fixture
        .post("/api/v1/users/9/searches", json!({ "query": "   " }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}
