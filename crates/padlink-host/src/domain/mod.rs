//! Domain layer for padlink-host.
//!
//! Plain configuration types with no networking or device dependencies.  The
//! binary builds a [`HostConfig`] from defaults, an optional TOML file, and
//! CLI flags, then hands it to the infrastructure layer.

pub mod config;

pub use config::{BackendKind, ConfigError, FileConfig, HostConfig};
