//! Chat service — prompt assembly and canned-fallback generation.
//!
//! DESIGN
//! ======
//! The provider sees one flat prompt string: Nova's system prompt, then the
//! last [`HISTORY_CONTEXT_TURNS`] turns of history rendered as `User:` /
//! `Nova:` lines, then the new message. Every provider failure is swallowed
//! here and replaced by one of three canned apology strings, so callers
//! always have displayable text. No retries, no backoff.

use std::fmt::Write;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tracing::warn;

use crate::llm::{GenerateReply, LlmError};
use crate::services::session::{ChatMessage, Role};

/// At most this many prior turns are included in the prompt, to keep the
/// provider context window bounded.
pub const HISTORY_CONTEXT_TURNS: usize = 10;

pub(crate) const NOVA_SYSTEM_PROMPT: &str = "You are Nova, a versatile and helpful general-purpose AI assistant. \
You're designed to be friendly, knowledgeable, and helpful across a wide range of topics.\n\n\
Your capabilities include:\n\
- Answering questions on a variety of subjects including science, history, technology, arts, and more\n\
- Providing explanations on complex topics in simple terms\n\
- Offering creative ideas and suggestions\n\
- Helping with planning and organization\n\
- Assisting with writing and communication\n\
- Providing thoughtful perspectives on various issues\n\n\
Guidelines for Nova:\n\
1. **Tone & Personality**: Friendly, conversational, and approachable. Aim to be helpful without being \
overly technical unless requested.\n\
2. **Knowledge Sharing**: Provide accurate, balanced information. When uncertain, acknowledge limitations.\n\
3. **Helpfulness**: Focus on being genuinely useful to the user's needs, adapting your responses to their \
level of understanding.\n\
4. **Creativity**: Feel free to suggest novel ideas or approaches when appropriate.\n\
5. **Explanations**: Break down complex concepts into understandable parts, using analogies and examples \
when helpful.\n\n\
Remember: You do NOT have persistent memory. Only retain context during the chat session. Be warm, \
conversational, and focused on providing value.";

// Canned fallback strings. These are the entire error surface of the chat
// endpoint: provider failures never reach the wire as error statuses.
pub const FALLBACK_RATE_LIMIT: &str =
    "I'm sorry, but we've hit the API rate limit. Please try again in a few moments.";
pub const FALLBACK_MODEL_CONFIG: &str =
    "I'm having trouble connecting to my AI capabilities. This could be due to an invalid model configuration.";
pub const FALLBACK_GENERIC: &str =
    "I apologize, but I'm experiencing technical difficulties at the moment. Please try again later.";
pub const FALLBACK_MID_STREAM: &str =
    "\n\nI'm sorry, but I encountered an error while generating a response. Please try again later.";

// =============================================================================
// PROMPT ASSEMBLY
// =============================================================================

/// Build the provider prompt: system prompt + truncated history + new message.
#[must_use]
pub fn build_prompt(message: &str, history: &[ChatMessage]) -> String {
    let mut prompt = String::from(NOVA_SYSTEM_PROMPT);
    prompt.push_str("\n\n");

    let start = history.len().saturating_sub(HISTORY_CONTEXT_TURNS);
    let recent = &history[start..];
    if !recent.is_empty() {
        prompt.push_str("Recent conversation:\n");
        for turn in recent {
            let speaker = match turn.role {
                Role::User => "User",
                Role::Assistant => "Nova",
            };
            let _ = writeln!(prompt, "{speaker}: {}", turn.content);
        }
        prompt.push('\n');
    }

    let _ = write!(prompt, "User: {message}\nNova:");
    prompt
}

// =============================================================================
// FALLBACK MAPPING
// =============================================================================

/// Map a provider error to its canned reply. Shared by streaming and
/// non-streaming paths so both modes produce identical fallback text.
#[must_use]
pub fn fallback_reply(err: &LlmError) -> &'static str {
    match err.status() {
        Some(429) => FALLBACK_RATE_LIMIT,
        Some(404) => FALLBACK_MODEL_CONFIG,
        _ => FALLBACK_GENERIC,
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// Generate a complete reply, substituting canned text on any failure.
pub async fn reply(llm: &Arc<dyn GenerateReply>, message: &str, history: &[ChatMessage]) -> String {
    let prompt = build_prompt(message, history);
    match llm.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "chat: generation failed, substituting fallback");
            fallback_reply(&e).to_string()
        }
    }
}

/// Generate a reply as an infallible text-chunk stream.
///
/// A failure to open the stream yields a single chunk carrying the same
/// canned text the non-streaming path would return. A failure after the
/// stream opened appends the mid-stream apology and ends the stream (the
/// underlying relay terminates after its first error).
pub async fn reply_stream(
    llm: &Arc<dyn GenerateReply>,
    message: &str,
    history: &[ChatMessage],
) -> BoxStream<'static, String> {
    let prompt = build_prompt(message, history);
    match llm.generate_stream(&prompt).await {
        Ok(chunks) => Box::pin(chunks.map(|chunk| match chunk {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "chat: stream interrupted, substituting fallback");
                FALLBACK_MID_STREAM.to_string()
            }
        })),
        Err(e) => {
            warn!(error = %e, "chat: stream open failed, substituting fallback");
            Box::pin(stream::iter(vec![fallback_reply(&e).to_string()]))
        }
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
