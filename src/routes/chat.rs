//! Chat endpoint — proxy one user message to the provider.
//!
//! DESIGN
//! ======
//! `POST /api/chat` takes `{message, chatHistory, stream, sessionId}`. The
//! only non-200 outcome is a missing or empty message; every other failure —
//! provider errors included, and even a body that fails to parse — comes
//! back as a 200 whose body is canned apology text, so the UI can render it
//! as a normal assistant turn. Streaming mode relays provider chunks as a
//! plain byte stream in arrival order.

use std::convert::Infallible;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::services::chat;
use crate::services::session::{self, ChatMessage, Role};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    // An unreadable body still gets a 200 with the canned apology, so the UI
    // can display it as a normal assistant turn.
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection, "chat: unreadable request body, substituting fallback");
            return Json(ChatReply { response: chat::FALLBACK_GENERIC.to_string(), timestamp: Utc::now() })
                .into_response();
        }
    };

    if req.message.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Message is required" }))).into_response();
    }

    let Some(llm) = state.llm.clone() else {
        warn!("chat: no provider configured, substituting fallback");
        if req.stream {
            return text_stream_response(Box::pin(stream::iter(vec![chat::FALLBACK_GENERIC.to_string()])));
        }
        return Json(ChatReply { response: chat::FALLBACK_GENERIC.to_string(), timestamp: Utc::now() })
            .into_response();
    };

    if req.stream {
        let chunks = chat::reply_stream(&llm, &req.message, &req.chat_history).await;
        return text_stream_response(chunks);
    }

    let response = chat::reply(&llm, &req.message, &req.chat_history).await;
    let timestamp = Utc::now();

    // Record the exchange on the live session, when the caller named one.
    if let Some(session_id) = &req.session_id {
        let user = ChatMessage { role: Role::User, content: req.message.clone(), timestamp };
        let assistant = ChatMessage { role: Role::Assistant, content: response.clone(), timestamp };
        if !session::append_exchange(&state, session_id, user, assistant).await {
            debug!(%session_id, "chat: unknown session id, exchange not recorded");
        }
    }

    Json(ChatReply { response, timestamp }).into_response()
}

/// Wrap a text-chunk stream as a 200 plain-text streaming body.
fn text_stream_response(chunks: BoxStream<'static, String>) -> Response {
    let body = Body::from_stream(chunks.map(|text| Ok::<_, Infallible>(Bytes::from(text))));
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
