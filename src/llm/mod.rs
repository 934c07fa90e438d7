//! LLM — Gemini-backed text generation for the chat proxy.
//!
//! DESIGN
//! ======
//! `LlmClient` pairs the configured model name with the HTTP client and
//! implements the provider-neutral [`GenerateReply`] trait so handlers and
//! tests can swap in mocks. Configuration comes from environment variables
//! via [`config::LlmConfig`].

pub mod config;
pub mod gemini;
pub mod types;

use config::LlmConfig;
pub use types::{GenerateReply, LlmError, ReplyStream};

/// Concrete generation client over the Generative Language API.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: gemini::GeminiClient,
    model: String,
}

impl LlmClient {
    /// Build a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is missing or the HTTP client
    /// fails to build.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = gemini::GeminiClient::new(config.api_key, config.base_url, config.timeouts)?;
        Ok(Self { inner, model: config.model })
    }

    /// Return the configured model name (e.g. `"gemini-2.0-flash"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl GenerateReply for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.inner.generate(&self.model, prompt).await
    }

    async fn generate_stream(&self, prompt: &str) -> Result<ReplyStream, LlmError> {
        self.inner.generate_stream(&self.model, prompt).await
    }
}
