use super::common::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::SearchConfig;
use crate::search::{search_router, SearchService};
use crate::storage::Collection;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn universal_route_wraps_results_in_envelope() {
    let router = search_router(service_over(hiring_fixture()));
    let response = router
        .oneshot(get("/api/v1/search?search=react&types=job,candidate&limit=10"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["results"][0]["record"]["kind"], "job");
    assert_eq!(body["data"]["results"][1]["record"]["kind"], "candidate");
    assert!(body["data"]["searchTimeMs"].is_u64());
}

#[tokio::test]
async fn universal_route_accepts_q_alias_and_unknown_types() {
    let router = search_router(service_over(hiring_fixture()));
    let response = router
        .oneshot(get("/api/v1/search?q=react&types=company,widgets"))
        .await
        .expect("router responds");

    let body = json_body(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["results"][0]["record"]["id"], "co-reactive");
}

#[tokio::test]
async fn jobs_route_normalizes_bad_paging() {
    let router = search_router(service_over(engineering_jobs()));
    let response = router
        .oneshot(get("/api/v1/search/jobs?search=engineer&page=-3&limit=5000"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["limit"], 100);
    assert_eq!(body["data"]["total"], 5);
    assert_eq!(body["data"]["kind"], "job");
}

#[tokio::test]
async fn storage_failure_maps_to_service_unavailable() {
    let store = FailingStore::new(hiring_fixture(), Collection::Companies);
    let service = Arc::new(SearchService::new(Arc::new(store), &SearchConfig::default()));
    let response = search_router(service)
        .oneshot(get("/api/v1/search/companies?search=labs"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(false));
    assert!(body["message"]
        .as_str()
        .expect("message present")
        .contains("company search failed"));
}

#[tokio::test]
async fn suggestions_route_returns_strings() {
    let router = search_router(service_over(hiring_fixture()));
    let response = router
        .oneshot(get("/api/v1/search/suggestions?q=rea&limit=2"))
        .await
        .expect("router responds");

    let body = json_body(response).await;
    assert_eq!(body["data"], serde_json::json!(["React", "Reactive Labs"]));
}

#[tokio::test]
async fn only_unknown_types_match_nothing() {
    let router = search_router(service_over(hiring_fixture()));
    let response = router
        .oneshot(get("/api/v1/search?q=react&types=widgets"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["results"], serde_json::json!([]));
    assert_eq!(body["data"]["kinds"], serde_json::json!([]));
}

#[tokio::test]
async fn unparsable_suggestion_limit_falls_back_to_default() {
    let router = search_router(service_over(hiring_fixture()));
    let response = router
        .oneshot(get("/api/v1/search/suggestions?q=rea&limit=abc"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(
        body["data"],
        serde_json::json!(["React", "Reactive Labs", "Senior React Developer"])
    );
}
