//! Virtual-controller domain: device profiles, the backend seam, and the
//! single-writer state machine that drives it.
//!
//! # How a command reaches the device
//!
//! ```text
//! Command ──► ControllerStateMachine::apply ──► ControllerBackend::{press,release,set_axis}
//!                     │
//!                     └─ ControllerState (pressed set, axis values, backend status)
//! ```
//!
//! The state machine is the only owner of [`ControllerState`] and the only
//! caller of the backend.  Callers that share it across tasks wrap it in a
//! mutex; every `apply`, `attach`, and `detach` then runs exclusively.
//!
//! [`ControllerState`]: state_machine::ControllerState

pub mod backend;
pub mod mock;
pub mod profile;
pub mod state_machine;

pub use backend::{BackendError, ControllerBackend};
pub use profile::ControllerProfile;
pub use state_machine::{ApplyResult, BackendStatus, ControllerState, ControllerStateMachine};
