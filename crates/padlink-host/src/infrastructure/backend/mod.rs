//! Concrete controller backends.
//!
//! The correct implementation is selected from [`BackendKind`] at startup.
//! `uinput` is compiled only on Linux; on other platforms selecting it yields
//! a backend whose acquisition always fails, which leaves the host running in
//! degraded mode rather than refusing to start.

pub mod dry_run;

#[cfg(target_os = "linux")]
pub mod uinput;

use padlink_core::{BackendError, ControllerBackend, ControllerProfile};

use crate::domain::BackendKind;

/// Builds the backend for `kind`.
pub fn build_backend(kind: BackendKind) -> Box<dyn ControllerBackend> {
    match kind {
        BackendKind::DryRun => Box::new(dry_run::DryRunBackend::new()),
        #[cfg(target_os = "linux")]
        BackendKind::Uinput => Box::new(uinput::UinputBackend::new()),
        #[cfg(not(target_os = "linux"))]
        BackendKind::Uinput => Box::new(UnavailableBackend::new(
            "the uinput backend is only available on Linux",
        )),
    }
}

/// A backend that can never be acquired.
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ControllerBackend for UnavailableBackend {
    fn acquire(&mut self, _profile: &ControllerProfile) -> Result<(), BackendError> {
        Err(BackendError::AcquireFailed(self.reason.clone()))
    }

    fn press(&mut self, _target: &str) -> Result<(), BackendError> {
        Err(BackendError::NotAcquired)
    }

    fn release(&mut self, _target: &str) -> Result<(), BackendError> {
        Err(BackendError::NotAcquired)
    }

    fn set_axis(&mut self, _target: &str, _value: f64) -> Result<(), BackendError> {
        Err(BackendError::NotAcquired)
    }

    fn disconnect(&mut self) {}
}
