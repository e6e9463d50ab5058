#![allow(clippy::unwrap_used)]
// `SearchSession` driven through the real `BreachClient` against wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use breachwatch_core::{
    BreachClient, ResultSource, SearchConfig, SearchSession, SearchSnapshot, SearchStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn search_against(response: ResponseTemplate) -> SearchSnapshot {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "globex"))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;

    let config = SearchConfig::new(Url::parse(&server.uri()).unwrap());
    let client: BreachClient = config.build_client().unwrap();
    let session = SearchSession::new(client, &config).unwrap();
    session.set_query("globex");
    session.search_now().await
}

fn ids(snap: &SearchSnapshot) -> Vec<i64> {
    snap.results.iter().map(|r| r.id).collect()
}

/// Only the public-address `vpn.globex.io` sample record matches "globex".
fn assert_fallback(snap: &SearchSnapshot) {
    assert_eq!(snap.status, SearchStatus::ErrorWithFallback);
    assert_eq!(snap.source, ResultSource::Fallback);
    assert!(snap.using_fallback());
    assert!(snap.error.is_some());
    assert_eq!(snap.pages, Some(1));
    assert_eq!(snap.total, Some(1));
    assert_eq!(ids(snap), vec![5]);
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_success_uses_backend_rows() {
    let snap = search_against(ResponseTemplate::new(200).set_body_json(json!({
        "total": 1,
        "pages": 1,
        "results": [{
            "id": 77,
            "uri": "https://shop.example.net/login",
            "domain": "shop.example.net",
            "created_at": "2024-02-01T00:00:00Z"
        }]
    })))
    .await;

    assert_eq!(snap.status, SearchStatus::Success);
    assert_eq!(snap.source, ResultSource::Backend);
    assert!(snap.error.is_none());
    assert_eq!(ids(&snap), vec![77]);
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let snap =
        search_against(ResponseTemplate::new(500).set_body_string("database offline")).await;
    assert_fallback(&snap);
}

#[tokio::test]
async fn test_missing_results_field_falls_back() {
    let snap = search_against(ResponseTemplate::new(200).set_body_json(json!({ "total": 3 }))).await;
    assert_fallback(&snap);
}

#[tokio::test]
async fn test_invalid_json_falls_back() {
    let snap = search_against(
        ResponseTemplate::new(200)
            .insert_header("content-type", "application/json")
            .set_body_string("{\"results\": [oops"),
    )
    .await;
    assert_fallback(&snap);
}
