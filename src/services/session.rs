//! Session service — in-memory chat sessions and demo fixtures.
//!
//! DESIGN
//! ======
//! Sessions live only in the shared state map: seeded from static demo
//! fixtures at startup, appended to during a live exchange, gone on process
//! exit. There is deliberately no persistence layer behind them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

/// Who produced a turn. Exactly two values by contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat turn. Immutable once created; ordered by arrival within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Tolerates absent timestamps on the wire: history entries without one
    /// deserialize to the epoch instead of rejecting the whole request.
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

/// A named, ordered list of chat turns held only in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

// =============================================================================
// LIVE APPEND
// =============================================================================

/// Append a user/assistant exchange to a live session. Returns `false` when
/// the session id is unknown (the exchange is dropped, not an error — the
/// caller already has the reply).
pub async fn append_exchange(
    state: &AppState,
    session_id: &str,
    user: ChatMessage,
    assistant: ChatMessage,
) -> bool {
    let mut sessions = state.sessions.write().await;
    match sessions.get_mut(session_id) {
        Some(session) => {
            session.messages.push(user);
            session.messages.push(assistant);
            true
        }
        None => false,
    }
}

// =============================================================================
// DEMO FIXTURES
// =============================================================================

fn fixture_time(rfc3339: &str) -> DateTime<Utc> {
    rfc3339.parse().unwrap_or_default()
}

fn fixture(session_id: &str, turns: &[(Role, &str, &str)]) -> ChatSession {
    ChatSession {
        session_id: session_id.to_string(),
        messages: turns
            .iter()
            .map(|(role, content, ts)| ChatMessage {
                role: *role,
                content: (*content).to_string(),
                timestamp: fixture_time(ts),
            })
            .collect(),
    }
}

/// The static demo conversations shown before any live exchange happens.
#[must_use]
pub fn demo_sessions() -> Vec<ChatSession> {
    vec![
        fixture(
            "demo-1",
            &[
                (Role::User, "What can you help me with?", "2024-01-15T10:00:00Z"),
                (
                    Role::Assistant,
                    "I'm Nova, your AI assistant! I can help you with a wide range of tasks:\n\n\
                     1. **Answer questions** on topics like science, history, technology, arts, and more\n\
                     2. **Explain complex concepts** in simple, understandable terms\n\
                     3. **Assist with writing** including emails, essays, creative content, or professional documents\n\
                     4. **Generate ideas** for projects, gifts, activities, or creative endeavors\n\
                     5. **Help with planning** for events, schedules, or processes\n\n\
                     Just let me know what you need assistance with, and I'll do my best to help! \
                     What would you like to know about today?",
                    "2024-01-15T10:01:00Z",
                ),
            ],
        ),
        fixture(
            "demo-2",
            &[
                (Role::User, "Tell me something interesting about space.", "2024-01-15T14:30:00Z"),
                (
                    Role::Assistant,
                    "Here's something fascinating about space that you might not know:\n\n\
                     The largest known structure in the observable universe is the Hercules-Corona \
                     Borealis Great Wall, a supercluster of galaxies spanning approximately 10 billion \
                     light-years. The entire observable universe is about 93 billion light-years across, \
                     so this single structure spans more than 10% of it.\n\n\
                     Would you like to hear more space facts, or perhaps learn about something specific \
                     like black holes, exoplanets, or space exploration?",
                    "2024-01-15T14:31:00Z",
                ),
            ],
        ),
        fixture(
            "demo-3",
            &[
                (Role::User, "I need some creative ideas for a mystery-themed party.", "2024-01-16T09:15:00Z"),
                (
                    Role::Assistant,
                    "# Mystery Party Ideas\n\n\
                     ## Theme Options\n\
                     - **Murder Mystery Mansion**: classic whodunit set in a Victorian mansion\n\
                     - **Film Noir Mystery**: black and white dress code with jazzy background music\n\
                     - **Haunted Carnival**: creepy circus vibes with fortune tellers\n\n\
                     ## Interactive Activities\n\
                     - **The Locked Box Challenge**: multiple puzzles leading to a locked treasure\n\
                     - **Invisible Ink Messages**: UV flashlights reveal hidden clues on the walls\n\
                     - **Suspect Interrogation**: guests take turns questioning \"suspects\"\n\n\
                     Would you like me to expand on any of these ideas or suggest decorations and food \
                     to match the theme?",
                    "2024-01-16T09:17:00Z",
                ),
            ],
        ),
        fixture(
            "demo-4",
            &[
                (Role::User, "What are some mind-blowing facts about the universe?", "2024-01-17T18:22:00Z"),
                (
                    Role::Assistant,
                    "# Mind-Blowing Universe Facts\n\n\
                     - If the Sun were the size of a white blood cell, the Milky Way would be the size \
                     of the continental United States\n\
                     - Time passes faster at your head than at your feet due to Earth's gravity\n\
                     - We're made of star stuff: nearly all elements heavier than hydrogen and helium \
                     were forged inside stars\n\
                     - Some diamonds in space are larger than Earth\n\n\
                     Which of these would you like to learn more about? I can explain any of these \
                     phenomena in more detail!",
                    "2024-01-17T18:24:00Z",
                ),
            ],
        ),
    ]
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
