//! Infrastructure layer for padlink-host.
//!
//! # Responsibilities
//!
//! - Binding the WebSocket listener and upgrading phone connections
//! - Spawning one Tokio task per connection
//! - Working out the connection URL to show the user
//! - Talking to the OS device driver that emulates the controller
//!
//! # What does NOT belong here?
//!
//! - Command validation (padlink-core codec)
//! - Controller state and idempotence rules (padlink-core state machine)
//! - Session bookkeeping (application layer)

pub mod backend;
pub mod discovery;
pub mod ws_server;

pub use backend::build_backend;
pub use discovery::{discovery_for, DiscoveryProvider};
pub use ws_server::{run_host, run_server, serve};
