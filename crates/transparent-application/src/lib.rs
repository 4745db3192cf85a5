//! Application layer for Transparent.
//!
//! Coordinates the capture adapters, the backend gateway and the overlay
//! window for each request coming through the control channel.

pub mod conversation_log;
pub mod lifecycle;
pub mod orchestrator;
pub mod window;

pub use conversation_log::ConversationLog;
pub use lifecycle::{RequestLifecycle, RequestPhase};
pub use orchestrator::{CaptureAdapters, Orchestrator, OrchestratorRequest};
pub use window::WindowStateMachine;
