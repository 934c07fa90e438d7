use super::*;
use crate::routes;
use crate::services::chat::{FALLBACK_GENERIC, FALLBACK_MODEL_CONFIG, FALLBACK_RATE_LIMIT};
use crate::state::test_helpers::{MockBehavior, test_app_state, test_app_state_with_llm};
use axum::http::Request;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn post_chat_raw(state: AppState, body: String) -> axum::response::Response {
    let app = routes::app(state);
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn post_chat(state: AppState, body: serde_json::Value) -> axum::response::Response {
    post_chat_raw(state, body.to_string()).await
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =========================================================================
// validation
// =========================================================================

#[tokio::test]
async fn missing_message_is_bad_request() {
    let response = post_chat(test_app_state(), json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body.get("error").and_then(|v| v.as_str()), Some("Message is required"));
}

#[tokio::test]
async fn empty_message_is_bad_request() {
    let response = post_chat(test_app_state(), json!({ "message": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn whitespace_message_still_reaches_generation() {
    // A non-empty message passes validation even when it is all whitespace.
    let state = test_app_state_with_llm(MockBehavior::Chunks(vec!["sure"]));
    let response = post_chat(state, json!({ "message": "   " })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body.get("response").and_then(|v| v.as_str()), Some("sure"));
}

#[tokio::test]
async fn malformed_body_is_ok_with_fallback() {
    let response = post_chat_raw(test_app_state(), "{not json".to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body.get("response").and_then(|v| v.as_str()), Some(FALLBACK_GENERIC));
}

#[tokio::test]
async fn history_entry_without_timestamp_is_accepted() {
    let state = test_app_state_with_llm(MockBehavior::Chunks(vec!["ok"]));
    let body = json!({
        "message": "and then?",
        "chatHistory": [{ "role": "user", "content": "hello" }]
    });
    let response = post_chat(state, body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body.get("response").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn unparseable_history_is_ok_with_fallback() {
    // A history entry with a bad role fails deserialization; the endpoint
    // still answers 200 with the canned apology.
    let body = json!({
        "message": "hi",
        "chatHistory": [{ "role": "system", "content": "oops" }]
    });
    let response = post_chat(test_app_state(), body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body.get("response").and_then(|v| v.as_str()), Some(FALLBACK_GENERIC));
}

// =========================================================================
// non-streaming replies
// =========================================================================

#[tokio::test]
async fn reply_round_trip() {
    let state = test_app_state_with_llm(MockBehavior::Chunks(vec!["Hello!"]));
    let response = post_chat(state, json!({ "message": "hi" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body.get("response").and_then(|v| v.as_str()), Some("Hello!"));
    assert!(body.get("timestamp").is_some());
}

#[tokio::test]
async fn chat_history_is_accepted_in_wire_form() {
    let state = test_app_state_with_llm(MockBehavior::Chunks(vec!["ok"]));
    let body = json!({
        "message": "and then?",
        "chatHistory": [
            { "role": "user", "content": "hello", "timestamp": "2024-01-15T10:00:00Z" },
            { "role": "assistant", "content": "hi!", "timestamp": "2024-01-15T10:01:00Z" }
        ]
    });
    let response = post_chat(state, body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn provider_failure_is_still_ok_with_fallback_body() {
    let state = test_app_state_with_llm(MockBehavior::FailStatus(429));
    let response = post_chat(state, json!({ "message": "hi" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body.get("response").and_then(|v| v.as_str()), Some(FALLBACK_RATE_LIMIT));
}

#[tokio::test]
async fn unconfigured_provider_is_still_ok_with_fallback_body() {
    let response = post_chat(test_app_state(), json!({ "message": "hi" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body.get("response").and_then(|v| v.as_str()), Some(FALLBACK_GENERIC));
}

// =========================================================================
// streaming replies
// =========================================================================

#[tokio::test]
async fn streaming_relays_chunks_as_plain_text() {
    let state = test_app_state_with_llm(MockBehavior::Chunks(vec!["a", "b", "c"]));
    let response = post_chat(state, json!({ "message": "hi", "stream": true })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body_text(response).await, "abc");
}

#[tokio::test]
async fn streaming_failure_matches_non_streaming_fallback() {
    let state = test_app_state_with_llm(MockBehavior::FailStatus(404));
    let response = post_chat(state, json!({ "message": "hi", "stream": true })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, FALLBACK_MODEL_CONFIG);
}

#[tokio::test]
async fn streaming_without_provider_sends_generic_fallback() {
    let response = post_chat(test_app_state(), json!({ "message": "hi", "stream": true })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, FALLBACK_GENERIC);
}

// =========================================================================
// session append
// =========================================================================

#[tokio::test]
async fn known_session_id_records_the_exchange() {
    let state = test_app_state_with_llm(MockBehavior::Chunks(vec!["noted"]));
    let before = state.sessions.read().await.get("demo-1").unwrap().messages.len();

    let response = post_chat(state.clone(), json!({ "message": "remember this", "sessionId": "demo-1" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sessions = state.sessions.read().await;
    let messages = &sessions.get("demo-1").unwrap().messages;
    assert_eq!(messages.len(), before + 2);
    assert_eq!(messages[before].content, "remember this");
    assert_eq!(messages[before + 1].content, "noted");
}

#[tokio::test]
async fn unknown_session_id_is_ignored() {
    let state = test_app_state_with_llm(MockBehavior::Chunks(vec!["ok"]));
    let response = post_chat(state.clone(), json!({ "message": "hi", "sessionId": "ghost" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!state.sessions.read().await.contains_key("ghost"));
}
