//! padlink-host library crate.
//!
//! The host accepts WebSocket connections from phones, decodes each input
//! message, and drives a single emulated game controller.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Phone (JSON over WebSocket)
//!         ↓
//! [padlink-host]
//!   ├── domain/           HostConfig, backend selection
//!   ├── application/      SessionManager: per-connection lifecycle → state machine
//!   └── infrastructure/
//!         ├── ws_server/  WebSocket accept loop (tokio-tungstenite)
//!         ├── discovery/  Connection URL for the phone
//!         └── backend/    uinput virtual gamepad, dry-run backend
//!         ↓
//! [padlink-core] ControllerStateMachine → ControllerBackend
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O besides reading the config file on request.
//! - `application` depends on `domain` and `padlink-core` only.
//! - `infrastructure` depends on all other layers plus `tokio`, `tungstenite`,
//!   and the OS device APIs.

/// Domain layer: configuration types.
pub mod domain;

/// Application layer: session handling.
pub mod application;

/// Infrastructure layer: WebSocket server, discovery, controller backends.
pub mod infrastructure;
