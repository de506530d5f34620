//! Application layer for padlink-host.
//!
//! # Responsibilities
//!
//! - Tracking connected phone sessions
//! - Feeding each raw message through the codec and into the shared
//!   controller state machine
//! - Logging every outcome (the protocol has no reply channel)
//!
//! # What does NOT belong here?
//!
//! - Sockets, WebSocket framing, task spawning (infrastructure)
//! - Device driver calls (infrastructure backends behind `ControllerBackend`)

pub mod session_manager;

pub use session_manager::{
    MessageOutcome, SessionId, SessionInfo, SessionManager, SharedController,
};
