//! Per-request lifecycle: `Idle → Dispatched → Settled`.

use tracing::debug;
use transparent_core::outcome::Outcome;
use transparent_core::request::Modality;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Dispatched,
    Settled,
}

/// Tracks one request. Transitions only move forward; a settled request
/// holds exactly one outcome.
#[derive(Debug)]
pub struct RequestLifecycle {
    id: String,
    phase: RequestPhase,
    modality: Option<Modality>,
}

impl RequestLifecycle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phase: RequestPhase::Idle,
            modality: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn dispatch(&mut self, modality: Modality) {
        debug_assert_eq!(self.phase, RequestPhase::Idle);
        self.phase = RequestPhase::Dispatched;
        self.modality = Some(modality);
        debug!(request_id = %self.id, modality = %modality, "Request dispatched");
    }

    /// Consumes the lifecycle; the outcome is passed through.
    pub fn settle(mut self, outcome: Outcome) -> Outcome {
        self.phase = RequestPhase::Settled;
        debug!(
            request_id = %self.id,
            modality = ?self.modality,
            error_kind = ?outcome.error_kind,
            phase = ?self.phase,
            "Request settled"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_move_forward() {
        let mut lifecycle = RequestLifecycle::new("req-1");
        assert_eq!(lifecycle.phase(), RequestPhase::Idle);

        lifecycle.dispatch(Modality::Text);
        assert_eq!(lifecycle.phase(), RequestPhase::Dispatched);

        let outcome = lifecycle.settle(Outcome::success("done"));
        assert_eq!(outcome.text, "done");
    }

    #[test]
    fn test_capture_failures_settle_without_dispatch() {
        let lifecycle = RequestLifecycle::new("req-2");
        assert_eq!(lifecycle.id(), "req-2");
        let outcome = lifecycle.settle(Outcome::success(""));
        assert!(outcome.is_success());
    }
}
