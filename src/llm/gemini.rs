//! Google Generative Language API client.
//!
//! DESIGN
//! ======
//! One-shot replies go through `models/{model}:generateContent`; streaming
//! replies through `models/{model}:streamGenerateContent?alt=sse`, whose
//! SSE `data:` events carry the same response shape as the one-shot call.
//! The SSE relay runs on a spawned task and forwards decoded text chunks
//! over a bounded channel in arrival order.

use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::config::LlmTimeouts;
use super::types::{LlmError, ReplyStream};

const RELAY_CHANNEL_CAPACITY: usize = 16;

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client for the Generative Language API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    /// One-shot generation: send the prompt, return the full reply text.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }
        parse_generate_response(&text)
    }

    /// Streaming generation: open the SSE endpoint and relay decoded text
    /// chunks in arrival order.
    pub async fn generate_stream(&self, model: &str, prompt: &str) -> Result<ReplyStream, LlmError> {
        let url = format!("{}/models/{}:streamGenerateContent", self.base_url, model);
        let response = self
            .http
            .post(url)
            .query(&[("alt", "sse"), ("key", self.api_key.as_str())])
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiResponse { status, body });
        }

        let (tx, rx) = mpsc::channel(RELAY_CHANNEL_CAPACITY);
        tokio::spawn(relay_sse(response, tx));
        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Forward decoded SSE text chunks to the channel. Sends at most one `Err`
/// and stops, so the receiver side sees a terminated stream after a failure.
async fn relay_sse(response: reqwest::Response, tx: mpsc::Sender<Result<String, LlmError>>) {
    let mut bytes = response.bytes_stream();
    let mut pending = String::new();

    while let Some(chunk) = bytes.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let _ = tx.send(Err(LlmError::ApiRequest(e.to_string()))).await;
                return;
            }
        };
        pending.push_str(&String::from_utf8_lossy(&chunk));

        // Only complete lines are parsed; the tail stays buffered until the
        // next network chunk arrives.
        while let Some(newline) = pending.find('\n') {
            let line = pending[..newline].trim_end_matches('\r').to_string();
            pending.drain(..=newline);

            let Some(data) = sse_data(&line) else { continue };
            match parse_stream_chunk(data) {
                Ok(Some(text)) => {
                    if tx.send(Ok(text)).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }
        }
    }
}

/// Extract the value of an SSE `data:` line. Comments, blank separators, and
/// other fields yield `None`.
fn sse_data(line: &str) -> Option<&str> {
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let (field, value) = line.split_once(':')?;
    if field.trim() != "data" {
        return None;
    }
    Some(value.trim_start())
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self { contents: vec![RequestContent { parts: vec![RequestPart { text: prompt }] }] }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Concatenated text of the first candidate's parts.
fn candidate_text(response: GenerateResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let parts = candidate.content?.parts;
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() { None } else { Some(text) }
}

fn parse_generate_response(body: &str) -> Result<String, LlmError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    candidate_text(response).ok_or_else(|| LlmError::ApiParse("response contained no candidate text".into()))
}

/// One SSE event's text, or `None` for events with no text parts (e.g. the
/// trailing usage-metadata event).
fn parse_stream_chunk(data: &str) -> Result<Option<String>, LlmError> {
    let response: GenerateResponse =
        serde_json::from_str(data).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    Ok(candidate_text(response))
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
