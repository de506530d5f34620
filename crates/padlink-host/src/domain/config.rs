//! Host configuration types.
//!
//! [`HostConfig`] is the single source of truth for runtime settings.  It is
//! assembled in three layers, later layers winning:
//!
//! 1. [`HostConfig::default`]
//! 2. an optional TOML file ([`FileConfig`])
//! 3. explicit CLI flags / environment variables (applied in `main.rs`)
//!
//! # Config file example
//!
//! ```toml
//! bind = "0.0.0.0"
//! port = 3000
//! profile = "xbox360"
//! backend = "uinput"
//! public_url = "https://example.github.io/pad/"
//! log_level = "debug"
//! ```
//!
//! Every key is optional; missing keys keep the value from the layer below.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use padlink_core::ControllerProfile;
use serde::Deserialize;
use thiserror::Error;

/// Default WebSocket port phones connect to.
pub const DEFAULT_PORT: u16 = 3000;

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`FileConfig`].
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured profile is not a built-in profile.
    #[error("unknown controller profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    /// The configured backend name is not recognised.
    #[error("unknown backend '{0}' (expected 'uinput' or 'dry-run')")]
    UnknownBackend(String),
}

/// Which controller backend drives the emulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Linux `/dev/uinput` virtual gamepad.
    Uinput,
    /// Logs every device operation instead of emulating a device.
    DryRun,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uinput" => Ok(Self::Uinput),
            "dry-run" => Ok(Self::DryRun),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uinput => "uinput",
            Self::DryRun => "dry-run",
        })
    }
}

/// All runtime configuration for the host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Address the WebSocket listener binds to.
    ///
    /// `0.0.0.0` accepts phones on the LAN; `127.0.0.1` only local clients.
    pub bind_addr: SocketAddr,

    /// Name of the built-in controller profile to emulate.
    pub profile: String,

    /// Controller backend implementation.
    pub backend: BackendKind,

    /// URL shown to the user instead of the auto-detected LAN address, e.g.
    /// a hosted phone UI page.
    pub public_url: Option<String>,

    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for HostConfig {
    /// | Field      | Default        |
    /// |------------|----------------|
    /// | bind_addr  | `0.0.0.0:3000` |
    /// | profile    | `xbox360`      |
    /// | backend    | `uinput`       |
    /// | public_url | none           |
    /// | log_level  | `info`         |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            profile: padlink_core::controller::profile::XBOX360.to_string(),
            backend: BackendKind::Uinput,
            public_url: None,
            log_level: "info".to_string(),
        }
    }
}

impl HostConfig {
    /// Resolves [`HostConfig::profile`] to a built-in profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProfile`] when no built-in profile has
    /// that name.
    pub fn controller_profile(&self) -> Result<ControllerProfile, ConfigError> {
        ControllerProfile::builtin(&self.profile).ok_or_else(|| ConfigError::UnknownProfile {
            name: self.profile.clone(),
            available: ControllerProfile::builtin_names().join(", "),
        })
    }

    /// Overlays every key present in `file`.
    pub fn merge_file(&mut self, file: FileConfig) {
        if let Some(ip) = file.bind {
            self.bind_addr.set_ip(ip);
        }
        if let Some(port) = file.port {
            self.bind_addr.set_port(port);
        }
        if let Some(profile) = file.profile {
            self.profile = profile;
        }
        if let Some(backend) = file.backend {
            self.backend = backend;
        }
        if file.public_url.is_some() {
            self.public_url = file.public_url;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
    }
}

/// On-disk configuration.  Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub bind: Option<IpAddr>,
    pub port: Option<u16>,
    pub profile: Option<String>,
    pub backend: Option<BackendKind>,
    pub public_url: Option<String>,
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses TOML text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
