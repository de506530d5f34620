//! SessionManager: per-connection lifecycle on top of the shared controller.
//!
//! Every phone connection is a session.  Sessions carry no protocol state
//! (there is no handshake and no per-session ownership of buttons); the
//! registry only exists for logging and statistics.
//!
//! # Connection lifecycle
//!
//! ```text
//! on_open ──► on_message* ──► on_close
//!                 │
//!              on_error ──► on_close
//! ```
//!
//! - `on_message` decodes and applies one message.  A decode error is logged
//!   and the message dropped; the session stays open.
//! - `on_close` removes the session but leaves the controller alone: buttons
//!   a phone pressed before disconnecting stay pressed until some client
//!   releases them.
//!
//! # Concurrency
//!
//! All sessions share one [`SharedController`].  Its mutex serializes every
//! `apply`, so two phones racing on the same axis see last-write-wins with no
//! torn values.  A session awaits each `apply` before reading its next frame,
//! which keeps per-session receipt order.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use padlink_core::{decode, ApplyResult, ControllerState, ControllerStateMachine, DecodeError};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The single controller every session writes to.
pub type SharedController = Arc<Mutex<ControllerStateMachine>>;

/// Unique identifier of one connection.
pub type SessionId = Uuid;

/// Registry entry for a connected session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: SessionId,
    pub peer_addr: SocketAddr,
    pub connected_at: Instant,
    /// Messages that decoded successfully (whatever the apply result).
    pub accepted: u64,
    /// Messages dropped by the codec.
    pub rejected: u64,
}

/// What happened to one inbound message.  Returned for logging and tests;
/// never sent to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    /// The message decoded and was handed to the state machine.
    Applied(ApplyResult),
    /// The codec rejected the message.
    Rejected(DecodeError),
}

/// Tracks sessions and routes their messages into the controller.
pub struct SessionManager {
    controller: SharedController,
    sessions: Mutex<HashMap<SessionId, SessionInfo>>,
}

impl SessionManager {
    /// Creates a manager with no sessions that routes into `controller`.
    pub fn new(controller: SharedController) -> Self {
        Self {
            controller,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The shared controller handle, for startup attach and shutdown detach.
    pub fn controller(&self) -> &SharedController {
        &self.controller
    }

    /// Registers a new connection.  The client may send immediately.
    pub async fn on_open(&self, peer_addr: SocketAddr) -> SessionId {
        let id = Uuid::new_v4();
        let info = SessionInfo {
            id,
            peer_addr,
            connected_at: Instant::now(),
            accepted: 0,
            rejected: 0,
        };
        let count = {
            let mut sessions = self.sessions.lock().await;
            sessions.insert(id, info);
            sessions.len()
        };
        info!("session {id} opened from {peer_addr} ({count} connected)");
        id
    }

    /// Decodes one raw message and applies it to the controller.
    pub async fn on_message(&self, id: SessionId, raw: &[u8]) -> MessageOutcome {
        let outcome = match decode(raw) {
            Ok(cmd) => {
                let result = self.controller.lock().await.apply(&cmd);
                match &result {
                    ApplyResult::Applied | ApplyResult::Unchanged => {
                        debug!("session {id}: {cmd} -> {result:?}")
                    }
                    ApplyResult::Skipped => {
                        debug!("session {id}: {cmd} skipped (controller not attached)")
                    }
                    ApplyResult::UnknownTarget => {
                        warn!("session {id}: unknown {} target '{}'", cmd.kind(), cmd.target())
                    }
                    ApplyResult::BackendError(e) => {
                        warn!("session {id}: {cmd} failed at the backend: {e}")
                    }
                }
                MessageOutcome::Applied(result)
            }
            Err(e) => {
                warn!("session {id}: dropping invalid message: {e}");
                MessageOutcome::Rejected(e)
            }
        };

        if let Some(info) = self.sessions.lock().await.get_mut(&id) {
            match outcome {
                MessageOutcome::Applied(_) => info.accepted += 1,
                MessageOutcome::Rejected(_) => info.rejected += 1,
            }
        }
        outcome
    }

    /// Deregisters a session.  Controller state is deliberately untouched.
    pub async fn on_close(&self, id: SessionId) -> Option<SessionInfo> {
        let (info, remaining) = {
            let mut sessions = self.sessions.lock().await;
            let info = sessions.remove(&id);
            (info, sessions.len())
        };
        match &info {
            Some(s) => info!(
                "session {id} from {} closed after {:.1?}: {} accepted, {} rejected ({remaining} connected)",
                s.peer_addr,
                s.connected_at.elapsed(),
                s.accepted,
                s.rejected
            ),
            None => debug!("session {id} closed twice or never opened"),
        }
        info
    }

    /// Logs a transport error.  The caller closes the session next.
    pub async fn on_error(&self, id: SessionId, err: &(dyn fmt::Display + Sync)) {
        warn!("session {id}: transport error: {err}");
    }

    /// Number of currently open sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Snapshot of one session's registry entry.
    pub async fn session(&self, id: SessionId) -> Option<SessionInfo> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Snapshot of the controller's bookkeeping state.
    pub async fn controller_state(&self) -> ControllerState {
        self.controller.lock().await.state().clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
