//! Recording controller backend for tests and benches.
//!
//! # Why a recording backend?
//!
//! The real backends talk to kernel drivers that:
//!
//! - Need special permissions (`/dev/uinput`) or a Windows bus driver.
//! - Create a device every other program on the machine can see.
//! - Cannot be observed directly from Rust test code.
//!
//! [`RecordingBackend`] replaces all driver calls with in-memory recording.
//! Every call is pushed into a shared log so assertions can inspect exactly
//! what reached the "device" and in what order.
//!
//! # Usage in tests
//!
//! ```rust
//! use padlink_core::controller::mock::RecordingBackend;
//! use padlink_core::{Command, ControllerProfile, ControllerStateMachine};
//!
//! let backend = RecordingBackend::new();
//! let log = backend.log();
//! let mut sm = ControllerStateMachine::new(Box::new(backend), ControllerProfile::xbox360());
//! sm.attach().unwrap();
//! sm.apply(&Command::press("A"));
//!
//! assert_eq!(log.presses(), vec!["A".to_string()]);
//! ```
//!
//! # Failure injection
//!
//! [`RecordingBackend::failing_acquire`] simulates a missing driver, and
//! [`RecordingLog::fail_operations`] makes every later press/release/axis
//! call fail, even after the backend has been moved into a state machine.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use crate::controller::backend::{BackendError, ControllerBackend};
use crate::controller::profile::ControllerProfile;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Acquire(String),
    Press(String),
    Release(String),
    SetAxis(String, f64),
    Disconnect,
}

/// Shared, cloneable view of what a [`RecordingBackend`] has seen.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    calls: Arc<Mutex<Vec<BackendCall>>>,
    fail_operations: Arc<AtomicBool>,
}

impl RecordingLog {
    /// Every call in order, including failed ones.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Targets of every press call, in order.
    pub fn presses(&self) -> Vec<String> {
        self.filter(|c| match c {
            BackendCall::Press(t) => Some(t.clone()),
            _ => None,
        })
    }

    /// Targets of every button release call, in order.
    pub fn releases(&self) -> Vec<String> {
        self.filter(|c| match c {
            BackendCall::Release(t) => Some(t.clone()),
            _ => None,
        })
    }

    /// Every axis update, in order.
    pub fn axis_updates(&self) -> Vec<(String, f64)> {
        self.filter(|c| match c {
            BackendCall::SetAxis(t, v) => Some((t.clone(), *v)),
            _ => None,
        })
    }

    /// Number of press, release, and axis calls (acquire/disconnect excluded).
    pub fn operation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    BackendCall::Press(_) | BackendCall::Release(_) | BackendCall::SetAxis(..)
                )
            })
            .count()
    }

    /// When `true`, every later press/release/axis call returns an error.
    pub fn fail_operations(&self, fail: bool) {
        self.fail_operations.store(fail, Ordering::SeqCst);
    }

    fn filter<T>(&self, f: impl Fn(&BackendCall) -> Option<T>) -> Vec<T> {
        self.calls().iter().filter_map(f).collect()
    }

    fn push(&self, call: BackendCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn operations_fail(&self) -> bool {
        self.fail_operations.load(Ordering::SeqCst)
    }
}

/// A backend that records all calls without touching any driver.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: RecordingLog,
    acquire_error: Option<String>,
    acquired: bool,
}

impl RecordingBackend {
    /// Creates a backend that acquires successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose `acquire` always fails with `reason`.
    pub fn failing_acquire(reason: impl Into<String>) -> Self {
        Self {
            acquire_error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Returns a handle to the call log that stays valid after the backend is
    /// boxed and handed to a state machine.
    pub fn log(&self) -> RecordingLog {
        self.log.clone()
    }

    fn operation(&mut self, op: &'static str, target: &str, call: BackendCall) -> Result<(), BackendError> {
        self.log.push(call);
        if !self.acquired {
            return Err(BackendError::NotAcquired);
        }
        if self.log.operations_fail() {
            return Err(BackendError::operation(op, target, "injected failure"));
        }
        Ok(())
    }
}

impl ControllerBackend for RecordingBackend {
    fn acquire(&mut self, profile: &ControllerProfile) -> Result<(), BackendError> {
        self.log.push(BackendCall::Acquire(profile.name().to_string()));
        if let Some(reason) = &self.acquire_error {
            return Err(BackendError::AcquireFailed(reason.clone()));
        }
        self.acquired = true;
        Ok(())
    }

    fn press(&mut self, target: &str) -> Result<(), BackendError> {
        self.operation("press", target, BackendCall::Press(target.to_string()))
    }

    fn release(&mut self, target: &str) -> Result<(), BackendError> {
        self.operation("release", target, BackendCall::Release(target.to_string()))
    }

    fn set_axis(&mut self, target: &str, value: f64) -> Result<(), BackendError> {
        self.operation(
            "set_axis",
            target,
            BackendCall::SetAxis(target.to_string(), value),
        )
    }

    fn disconnect(&mut self) {
        self.log.push(BackendCall::Disconnect);
        self.acquired = false;
    }
}
