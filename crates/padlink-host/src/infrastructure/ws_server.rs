//! WebSocket transport listener: accept loop and per-connection tasks.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Upgrading each accepted connection to a WebSocket session.
//! 3. Delivering `on_open`, one `on_message` per data frame (in receipt
//!    order), `on_error`, and exactly one `on_close` to the
//!    [`SessionManager`].
//! 4. Stopping the accept loop when the `running` flag is cleared.
//! 5. Releasing the controller device once the loop has stopped
//!    ([`run_host`]).
//!
//! The protocol is one-directional: nothing is ever written back to the
//! phone apart from the transport's own control frames.
//!
//! Each connection runs in its own Tokio task, so one slow or misbehaving
//! phone never blocks another.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};

use crate::application::{SessionId, SessionManager, SharedController};

/// How long `accept()` may block before the loop re-checks `running`.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `bind_addr` and serves connections until `running` becomes `false`.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound (port in use, no
/// permission).
pub async fn run_server(
    bind_addr: SocketAddr,
    manager: Arc<SessionManager>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind WebSocket listener on {bind_addr}"))?;

    info!("WebSocket listener on {bind_addr}");
    serve(listener, manager, running).await
}

/// Serves phones on `bind_addr` until `running` is cleared, then detaches the
/// controller.
///
/// The device is released even when the listener fails to bind.
///
/// # Errors
///
/// Returns the [`run_server`] error, after detaching.
pub async fn run_host(
    bind_addr: SocketAddr,
    controller: SharedController,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let manager = Arc::new(SessionManager::new(Arc::clone(&controller)));
    let served = run_server(bind_addr, manager, running).await;

    controller.lock().await.detach();
    info!("controller released");
    served
}

/// Runs the accept loop on an already-bound listener.
///
/// Split from [`run_server`] so tests can bind port 0 and learn the address.
pub async fn serve(
    listener: TcpListener,
    manager: Arc<SessionManager>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                debug!("TCP connection from {peer_addr}");
                let mgr = Arc::clone(&manager);
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, mgr).await;
                });
            }
            Ok(Err(e)) => {
                // Transient (e.g. out of file descriptors); keep serving.
                error!("accept error: {e}");
            }
            Err(_) => {}
        }
    }

    Ok(())
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Completes the handshake and pumps frames into the session manager.
async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, manager: Arc<SessionManager>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {peer_addr} failed: {e}");
            return;
        }
    };

    let id = manager.on_open(peer_addr).await;
    let mut ws_rx = ws_stream;

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(msg) => {
                if !dispatch_frame(&manager, id, msg).await {
                    break;
                }
            }
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                debug!("session {id}: connection closed");
                break;
            }
            Err(e) => {
                manager.on_error(id, &e.to_string()).await;
                break;
            }
        }
    }

    manager.on_close(id).await;
}

/// Routes one frame.  Returns `false` when the session should end.
async fn dispatch_frame(manager: &SessionManager, id: SessionId, msg: WsMessage) -> bool {
    match msg {
        WsMessage::Text(text) => {
            manager.on_message(id, text.as_bytes()).await;
        }
        WsMessage::Binary(bytes) => {
            manager.on_message(id, &bytes).await;
        }
        WsMessage::Ping(_) | WsMessage::Pong(_) => {
            debug!("session {id}: keepalive frame");
        }
        WsMessage::Close(reason) => {
            debug!("session {id}: close frame {reason:?}");
            return false;
        }
        WsMessage::Frame(_) => {}
    }
    true
}
