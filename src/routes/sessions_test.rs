use super::*;
use crate::routes;
use crate::state::test_helpers::test_app_state;
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn get(state: AppState, uri: &str) -> axum::response::Response {
    let app = routes::app(state);
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn list_returns_all_demo_sessions_in_start_order() {
    let response = get(test_app_state(), "/api/sessions").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let summaries = body.as_array().unwrap();
    assert_eq!(summaries.len(), 4);
    let ids: Vec<&str> = summaries
        .iter()
        .filter_map(|s| s.get("sessionId").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(ids, vec!["demo-1", "demo-2", "demo-3", "demo-4"]);
}

#[tokio::test]
async fn list_titles_come_from_first_user_turn() {
    let response = get(test_app_state(), "/api/sessions").await;
    let body = body_json(response).await;
    let first = &body.as_array().unwrap()[0];
    assert_eq!(first.get("title").and_then(|v| v.as_str()), Some("What can you help me with?"));
    assert_eq!(first.get("messageCount").and_then(|v| v.as_u64()), Some(2));
}

#[tokio::test]
async fn get_known_session_returns_full_transcript() {
    let response = get(test_app_state(), "/api/sessions/demo-3").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.get("sessionId").and_then(|v| v.as_str()), Some("demo-3"));
    let messages = body.get("messages").and_then(|v| v.as_array()).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].get("role").and_then(|v| v.as_str()), Some("user"));
}

#[tokio::test]
async fn get_unknown_session_is_not_found() {
    let response = get(test_app_state(), "/api/sessions/ghost").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body.get("error").and_then(|v| v.as_str()), Some("Session not found"));
}

#[tokio::test]
async fn healthz_is_ok() {
    let response = get(test_app_state(), "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
}
