//! Provider-neutral generation types and errors.

use futures::stream::BoxStream;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by provider client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl LlmError {
    /// Provider HTTP status, when this error carries one. Drives the canned
    /// fallback selection in the chat service.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// GENERATION TRAIT
// =============================================================================

/// Generated text chunks in provider arrival order. The stream terminates
/// after yielding an `Err`.
pub type ReplyStream = BoxStream<'static, Result<String, LlmError>>;

/// Provider-neutral async trait for text generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait GenerateReply: Send + Sync {
    /// Generate a complete reply for the assembled prompt.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the response is
    /// malformed, or the provider rejects the call.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Generate a reply as a stream of text chunks.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] when the stream cannot be opened. Failures
    /// after the first chunk surface as an `Err` item on the stream itself.
    async fn generate_stream(&self, prompt: &str) -> Result<ReplyStream, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
