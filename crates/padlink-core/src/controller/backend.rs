//! The Controller Backend seam.
//!
//! A backend owns one emulated device handle.  Concrete implementations live
//! in the host crate (Linux `uinput`, dry-run logging); [`RecordingBackend`]
//! is provided here for tests.
//!
//! Every operation is fallible.  A backend must report failures as
//! [`BackendError`] values and never panic on a missing or vanished driver.
//!
//! [`RecordingBackend`]: crate::controller::mock::RecordingBackend

use thiserror::Error;

use crate::controller::profile::ControllerProfile;

/// Error type for controller backend operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// The device could not be acquired (driver absent, permission denied, ...).
    #[error("failed to acquire controller: {0}")]
    AcquireFailed(String),

    /// A press, release, or axis update was rejected by the driver.
    #[error("{op} {target} failed: {reason}")]
    OperationFailed {
        op: &'static str,
        target: String,
        reason: String,
    },

    /// An operation was attempted without a live device handle.
    #[error("controller not acquired")]
    NotAcquired,
}

impl BackendError {
    /// Shorthand for building an [`BackendError::OperationFailed`].
    pub fn operation(op: &'static str, target: &str, reason: impl ToString) -> Self {
        Self::OperationFailed {
            op,
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Primitive operations of an emulated controller device.
///
/// Calls are treated as fast and synchronous.  The state machine guarantees
/// that no two calls on the same backend ever overlap.
#[cfg_attr(test, mockall::automock)]
pub trait ControllerBackend: Send {
    /// Acquires (plugs in) a device emulating `profile`.
    fn acquire(&mut self, profile: &ControllerProfile) -> Result<(), BackendError>;

    /// Presses the named button.
    fn press(&mut self, target: &str) -> Result<(), BackendError>;

    /// Releases the named button.
    fn release(&mut self, target: &str) -> Result<(), BackendError>;

    /// Sets the named axis to a normalized value.
    ///
    /// Joysticks receive `[-1, 1]`, triggers `[0, 1]`.
    fn set_axis(&mut self, target: &str, value: f64) -> Result<(), BackendError>;

    /// Releases (unplugs) the device.  Must be safe to call when nothing is
    /// acquired.
    fn disconnect(&mut self);
}
