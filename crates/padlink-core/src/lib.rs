//! # padlink-core
//!
//! Shared library for Padlink containing the input command codec, the
//! controller device profiles, and the virtual-controller state machine.
//!
//! It has no dependencies on sockets, async runtimes, or OS device APIs.
//! The host application plugs a concrete [`ControllerBackend`] in and feeds
//! decoded commands through the state machine.
//!
//! # Architecture overview
//!
//! Padlink turns a phone into a remote game controller.  The phone sends one
//! small JSON object per input change (button press, stick movement, trigger
//! pull) and the host applies it to an emulated controller device.
//!
//! - **`protocol`** – How an input change travels over the wire, and how a raw
//!   message is validated into a typed [`Command`].
//!
//! - **`controller`** – The authoritative state of every button and axis, the
//!   device profile vocabulary, and the [`ControllerBackend`] seam through
//!   which the state reaches a real (or recorded) device.

pub mod controller;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `padlink_core::Command` instead of `padlink_core::protocol::command::Command`.
pub use controller::backend::{BackendError, ControllerBackend};
pub use controller::profile::ControllerProfile;
pub use controller::state_machine::{
    ApplyResult, BackendStatus, ControllerState, ControllerStateMachine,
};
pub use protocol::codec::{decode, encode, DecodeError};
pub use protocol::command::{Command, ControlKind};
