//! Padlink host: entry point.
//!
//! Accepts WebSocket connections from phones and turns their JSON input
//! messages into a virtual game controller on this machine.
//!
//! # Usage
//!
//! ```text
//! padlink-host [OPTIONS]
//!
//! Options:
//!   --bind       <IP>      Listener address            [default: 0.0.0.0]
//!   --port       <PORT>    Listener port               [default: 3000]
//!   --profile    <NAME>    Controller profile          [default: xbox360]
//!   --backend    <KIND>    uinput | dry-run            [default: uinput]
//!   --public-url <URL>     URL to show instead of the LAN address
//!   --config     <PATH>    TOML config file
//!   --log-level  <FILTER>  Log filter when RUST_LOG is unset [default: info]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable             | Flag           |
//! |----------------------|----------------|
//! | `PADLINK_BIND`       | `--bind`       |
//! | `PADLINK_PORT`       | `--port`       |
//! | `PADLINK_PROFILE`    | `--profile`    |
//! | `PADLINK_BACKEND`    | `--backend`    |
//! | `PADLINK_PUBLIC_URL` | `--public-url` |
//! | `PADLINK_CONFIG`     | `--config`     |
//!
//! Flags (and their variables) win over the config file, which wins over the
//! built-in defaults.
//!
//! # Startup
//!
//! 1. Build [`HostConfig`] and initialise logging.
//! 2. Create the controller state machine and attach it once.  If the backend
//!    cannot be acquired the host keeps running; every command is then
//!    recorded but not emitted.
//! 3. Log the URL a phone should open.
//! 4. Serve until Ctrl+C, then detach the controller.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use padlink_core::ControllerStateMachine;
use padlink_host::domain::{BackendKind, FileConfig, HostConfig};
use padlink_host::infrastructure::{build_backend, discovery_for, run_host};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Phone-as-gamepad host.
///
/// Every option is optional so that an unset flag never masks a value from
/// the config file.
#[derive(Debug, Default, Parser)]
#[command(
    name = "padlink-host",
    about = "Turns phone input over WebSocket into a virtual game controller",
    version
)]
struct Cli {
    /// IP address to bind the WebSocket listener to.
    #[arg(long, env = "PADLINK_BIND")]
    bind: Option<IpAddr>,

    /// TCP port phones connect to.
    #[arg(long, env = "PADLINK_PORT")]
    port: Option<u16>,

    /// Built-in controller profile to emulate.
    #[arg(long, env = "PADLINK_PROFILE")]
    profile: Option<String>,

    /// Controller backend: `uinput` or `dry-run`.
    #[arg(long, env = "PADLINK_BACKEND")]
    backend: Option<BackendKind>,

    /// URL to display instead of the auto-detected `ws://<lan-ip>:<port>`.
    #[arg(long, env = "PADLINK_PUBLIC_URL")]
    public_url: Option<String>,

    /// Path to a TOML config file.
    #[arg(long, env = "PADLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set (e.g. `debug`).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Layers defaults, the config file, and explicit flags into a
    /// [`HostConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--config` names a file that cannot be read or
    /// parsed.
    fn into_host_config(self) -> anyhow::Result<HostConfig> {
        let mut config = HostConfig::default();

        if let Some(path) = &self.config {
            let file = FileConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            config.merge_file(file);
        }

        if let Some(ip) = self.bind {
            config.bind_addr.set_ip(ip);
        }
        if let Some(port) = self.port {
            config.bind_addr.set_port(port);
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if self.public_url.is_some() {
            config.public_url = self.public_url;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_host_config()?;

    // `RUST_LOG` wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let profile = config.controller_profile()?;
    info!(
        "padlink host starting: bind={}, profile={}, backend={}",
        config.bind_addr,
        profile.name(),
        config.backend
    );

    // ── Controller ────────────────────────────────────────────────────────────
    let mut controller = ControllerStateMachine::new(build_backend(config.backend), profile);
    match controller.attach() {
        Ok(()) => info!("virtual {} controller attached", controller.profile().name()),
        Err(e) => {
            error!("could not attach the virtual controller: {e}");
            if config.backend == BackendKind::Uinput {
                warn!("check that the uinput module is loaded (modprobe uinput) and /dev/uinput is writable");
            }
            warn!("continuing without a device; input will be recorded but not emitted");
        }
    }
    let controller = Arc::new(Mutex::new(controller));

    info!(
        "connect your phone to {}",
        discovery_for(&config).current_connection_url()
    );

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    run_host(config.bind_addr, controller, running).await?;

    info!("padlink host stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
