//! ControllerStateMachine: the authoritative state of the emulated controller.
//!
//! The state machine owns two things no other component may touch:
//!
//! - the [`ControllerState`] bookkeeping (pressed buttons, last axis values,
//!   backend status), and
//! - the boxed [`ControllerBackend`] that turns state changes into device
//!   events.
//!
//! # Backend status lifecycle
//!
//! ```text
//! Unattached ──attach ok──►  Attached ──detach──► Unattached
//!     │                         │
//!     └──attach err──► Failed ◄─┘ backend op err
//! ```
//!
//! `Failed` is terminal for the life of the process.  While the status is not
//! `Attached`, commands still update bookkeeping but never reach the backend.
//!
//! # Idempotence
//!
//! Buttons are deduplicated: pressing an already-pressed button (or releasing
//! a released one) is a no-op at the backend.  Axes are not: every joystick
//! and trigger command is forwarded, because analog input legitimately repeats
//! values (a stick returning to centre must still be reported).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, info, warn};

use crate::controller::backend::{BackendError, ControllerBackend};
use crate::controller::profile::ControllerProfile;
use crate::protocol::command::Command;

/// Availability of the controller backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    /// No device acquired yet (or released by `detach`).
    Unattached,
    /// Device acquired; commands reach the backend.
    Attached,
    /// Acquisition or a device operation failed; commands are dropped.
    Failed,
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unattached => "unattached",
            Self::Attached => "attached",
            Self::Failed => "failed",
        })
    }
}

/// Outcome of applying one command.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyResult {
    /// The backend accepted the state change.
    Applied,
    /// The button was already in the requested state; no backend call.
    Unchanged,
    /// The backend is not attached; bookkeeping updated, no backend call.
    Skipped,
    /// The target is not part of the profile (or is a different kind).
    /// Only reported while attached; otherwise the command is `Skipped`.
    UnknownTarget,
    /// The backend call failed; the status is now [`BackendStatus::Failed`].
    BackendError(BackendError),
}

/// Process-lifetime record of the controller's logical state.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pressed: BTreeSet<String>,
    axis_values: BTreeMap<String, f64>,
    backend_status: BackendStatus,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            pressed: BTreeSet::new(),
            axis_values: BTreeMap::new(),
            backend_status: BackendStatus::Unattached,
        }
    }
}

impl ControllerState {
    /// Buttons currently held down.
    pub fn pressed(&self) -> &BTreeSet<String> {
        &self.pressed
    }

    /// Whether `target` is currently held down.
    pub fn is_pressed(&self, target: &str) -> bool {
        self.pressed.contains(target)
    }

    /// Last applied value of every axis that has been touched.
    pub fn axis_values(&self) -> &BTreeMap<String, f64> {
        &self.axis_values
    }

    /// Last applied value of `target`, if it has ever been set.
    pub fn axis_value(&self, target: &str) -> Option<f64> {
        self.axis_values.get(target).copied()
    }

    /// Availability of the device backend.
    pub fn backend_status(&self) -> BackendStatus {
        self.backend_status
    }
}

/// Applies validated commands to a controller backend.
///
/// Not internally synchronized: share it behind a mutex so that every
/// `apply`, `attach`, and `detach` is mutually exclusive.
pub struct ControllerStateMachine {
    backend: Box<dyn ControllerBackend>,
    profile: ControllerProfile,
    state: ControllerState,
    failure: Option<BackendError>,
}

impl ControllerStateMachine {
    /// Creates a state machine in [`BackendStatus::Unattached`].
    pub fn new(backend: Box<dyn ControllerBackend>, profile: ControllerProfile) -> Self {
        Self {
            backend,
            profile,
            state: ControllerState::default(),
            failure: None,
        }
    }

    /// The device profile this controller emulates.
    pub fn profile(&self) -> &ControllerProfile {
        &self.profile
    }

    /// Read-only view of the bookkeeping state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Shorthand for `state().backend_status()`.
    pub fn status(&self) -> BackendStatus {
        self.state.backend_status
    }

    /// The error that moved the backend to `Failed`, if any.
    pub fn failure(&self) -> Option<&BackendError> {
        self.failure.as_ref()
    }

    /// Acquires the backend device.
    ///
    /// Called once at startup.  A no-op when already attached.  When
    /// bookkeeping already holds pressed buttons or axis values they are
    /// pushed to the new device so it matches the logical state.
    ///
    /// # Errors
    ///
    /// Returns the acquisition failure (status becomes `Failed`), or the
    /// original failure when the backend has already failed.  Never retries.
    pub fn attach(&mut self) -> Result<(), BackendError> {
        match self.state.backend_status {
            BackendStatus::Attached => return Ok(()),
            BackendStatus::Failed => {
                return Err(self
                    .failure
                    .clone()
                    .unwrap_or_else(|| BackendError::AcquireFailed("backend failed".into())))
            }
            BackendStatus::Unattached => {}
        }

        if let Err(e) = self.backend.acquire(&self.profile) {
            warn!("controller acquisition failed: {e}");
            self.state.backend_status = BackendStatus::Failed;
            self.failure = Some(e.clone());
            return Err(e);
        }

        self.state.backend_status = BackendStatus::Attached;
        info!("controller attached (profile {})", self.profile.name());

        if let Err(e) = self.resync() {
            self.fail(e.clone());
            return Err(e);
        }
        Ok(())
    }

    /// Releases the backend device.
    ///
    /// Idempotent: safe to call repeatedly or when never attached.  Bookkeeping
    /// is kept so a later `attach` restores it.
    pub fn detach(&mut self) {
        if self.state.backend_status == BackendStatus::Attached {
            self.backend.disconnect();
            self.state.backend_status = BackendStatus::Unattached;
            info!("controller detached");
        }
    }

    /// Applies one validated command.
    ///
    /// Bookkeeping is always updated for known targets; the backend is only
    /// called when attached and the command changes something it must hear.
    pub fn apply(&mut self, cmd: &Command) -> ApplyResult {
        if !self.profile.accepts(cmd.kind(), cmd.target()) {
            debug!(
                "{} target '{}' not in profile {}",
                cmd.kind(),
                cmd.target(),
                self.profile.name()
            );
            // With no device there is nothing to reject against.
            return if self.is_attached() {
                ApplyResult::UnknownTarget
            } else {
                ApplyResult::Skipped
            };
        }

        match cmd {
            Command::Button { target, pressed } => self.apply_button(target, *pressed),
            Command::Joystick { target, value } | Command::Trigger { target, value } => {
                // Decoded commands are already in range; clamp anyway so a
                // hand-built command can never push an illegal value.
                let value = cmd.kind().clamp(*value);
                self.apply_axis(target, value)
            }
        }
    }

    fn apply_button(&mut self, target: &str, pressed: bool) -> ApplyResult {
        let changed = if pressed {
            self.state.pressed.insert(target.to_string())
        } else {
            self.state.pressed.remove(target)
        };

        if !self.is_attached() {
            return ApplyResult::Skipped;
        }
        if !changed {
            return ApplyResult::Unchanged;
        }

        let result = if pressed {
            self.backend.press(target)
        } else {
            self.backend.release(target)
        };
        self.settle(result)
    }

    fn apply_axis(&mut self, target: &str, value: f64) -> ApplyResult {
        self.state.axis_values.insert(target.to_string(), value);

        if !self.is_attached() {
            return ApplyResult::Skipped;
        }
        let result = self.backend.set_axis(target, value);
        self.settle(result)
    }

    fn settle(&mut self, result: Result<(), BackendError>) -> ApplyResult {
        match result {
            Ok(()) => ApplyResult::Applied,
            Err(e) => {
                self.fail(e.clone());
                ApplyResult::BackendError(e)
            }
        }
    }

    /// Moves to `Failed` and releases whatever is left of the device.
    fn fail(&mut self, e: BackendError) {
        warn!("controller backend failed, further input will be dropped: {e}");
        self.backend.disconnect();
        self.state.backend_status = BackendStatus::Failed;
        self.failure = Some(e);
    }

    fn resync(&mut self) -> Result<(), BackendError> {
        for target in &self.state.pressed {
            self.backend.press(target)?;
        }
        for (target, value) in &self.state.axis_values {
            self.backend.set_axis(target, *value)?;
        }
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.state.backend_status == BackendStatus::Attached
    }
}

impl Drop for ControllerStateMachine {
    fn drop(&mut self) {
        self.detach();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
