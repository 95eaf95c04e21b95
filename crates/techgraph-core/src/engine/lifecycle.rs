//! Request lifecycle tracking.
//!
//! Each query owns a [`RequestLifecycle`]; nothing about it is shared or
//! visible outside [`Engine::process_query`](super::Engine::process_query).

use serde::Serialize;
use tracing::{trace, warn};

/// Where a request is in its processing.
///
/// Requests move forward only:
/// Received → Classified → Executing → Assembled | Failed,
/// or straight from Received to Failed when the query is not recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    #[default]
    Received,
    Classified,
    Executing,
    /// Terminal: a result was assembled from executed fetches.
    Assembled,
    /// Terminal: the request ended without an assembled answer.
    Failed,
}

impl RequestState {
    pub fn can_transition_to(&self, next: RequestState) -> bool {
        matches!(
            (self, next),
            (RequestState::Received, RequestState::Classified)
                | (RequestState::Received, RequestState::Failed)
                | (RequestState::Classified, RequestState::Executing)
                | (RequestState::Executing, RequestState::Assembled)
                | (RequestState::Executing, RequestState::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Assembled | RequestState::Failed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RequestState::Received => "Received",
            RequestState::Classified => "Classified",
            RequestState::Executing => "Executing",
            RequestState::Assembled => "Assembled",
            RequestState::Failed => "Failed",
        }
    }
}

/// Tracks the state of one request. Never shared between requests.
#[derive(Debug, Default)]
pub struct RequestLifecycle {
    state: RequestState,
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Move to `next`. Returns false and stays put on an illegal move.
    pub fn advance(&mut self, next: RequestState) -> bool {
        if !self.state.can_transition_to(next) {
            warn!(
                from = self.state.display_name(),
                to = next.display_name(),
                "Illegal request state transition"
            );
            return false;
        }
        trace!(from = self.state.display_name(), to = next.display_name(), "Request state");
        self.state = next;
        true
    }
}
