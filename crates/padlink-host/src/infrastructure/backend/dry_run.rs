//! Dry-run backend: logs every device operation instead of emulating one.
//!
//! Useful for trying a phone layout on a machine without uinput access.

use padlink_core::{BackendError, ControllerBackend, ControllerProfile};
use tracing::info;

/// Backend that only logs; acquisition always succeeds.
#[derive(Debug, Default)]
pub struct DryRunBackend {
    profile: Option<String>,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_acquired(&self) -> Result<&str, BackendError> {
        self.profile.as_deref().ok_or(BackendError::NotAcquired)
    }
}

impl ControllerBackend for DryRunBackend {
    fn acquire(&mut self, profile: &ControllerProfile) -> Result<(), BackendError> {
        info!("[dry-run] acquired virtual {} controller", profile.name());
        self.profile = Some(profile.name().to_string());
        Ok(())
    }

    fn press(&mut self, target: &str) -> Result<(), BackendError> {
        let profile = self.check_acquired()?;
        info!("[dry-run] {profile}: press {target}");
        Ok(())
    }

    fn release(&mut self, target: &str) -> Result<(), BackendError> {
        let profile = self.check_acquired()?;
        info!("[dry-run] {profile}: release {target}");
        Ok(())
    }

    fn set_axis(&mut self, target: &str, value: f64) -> Result<(), BackendError> {
        let profile = self.check_acquired()?;
        info!("[dry-run] {profile}: {target} = {value:.3}");
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(profile) = self.profile.take() {
            info!("[dry-run] released virtual {profile} controller");
        }
    }
}
