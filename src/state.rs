//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the optional provider client and the in-memory session map. The
//! map is seeded with demo fixtures at startup and lives only as long as
//! the process — there is no durable store behind it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::llm::GenerateReply;
use crate::services::session::{self, ChatSession};

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    /// Optional provider client. `None` when `GEMINI_API_KEY` is unset; the
    /// chat endpoint then degrades to canned fallback text.
    pub llm: Option<Arc<dyn GenerateReply>>,
    /// Live sessions keyed by session id, seeded from demo fixtures.
    pub sessions: Arc<RwLock<HashMap<String, ChatSession>>>,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn GenerateReply>>) -> Self {
        let sessions = session::demo_sessions()
            .into_iter()
            .map(|s| (s.session_id.clone(), s))
            .collect();
        Self { llm, sessions: Arc::new(RwLock::new(sessions)) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
