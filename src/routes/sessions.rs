//! Session routes — list and fetch in-memory sessions.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::services::session::{ChatSession, Role};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    /// Sidebar label: the first user turn of the session.
    pub title: String,
    pub message_count: usize,
    pub started_at: DateTime<Utc>,
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    let sessions = state.sessions.read().await;
    let mut summaries: Vec<SessionSummary> = sessions.values().map(summarize).collect();
    summaries.sort_by(|a, b| {
        a.started_at
            .cmp(&b.started_at)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
    Json(summaries)
}

pub async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let sessions = state.sessions.read().await;
    match sessions.get(&id) {
        Some(session) => Json(session.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Session not found" }))).into_response(),
    }
}

fn summarize(session: &ChatSession) -> SessionSummary {
    let title = session
        .messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.clone())
        .unwrap_or_else(|| "New conversation".into());
    let started_at = session
        .messages
        .first()
        .map(|m| m.timestamp)
        .unwrap_or_default();
    SessionSummary { session_id: session.session_id.clone(), title, message_count: session.messages.len(), started_at }
}

#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;
