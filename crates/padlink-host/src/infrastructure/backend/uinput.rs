//! Linux uinput virtual gamepad.
//!
//! Creates a virtual device through `/dev/uinput` that identifies itself as
//! a wired Xbox 360 pad (vendor `045e`, product `028e`), so games and SDL
//! pick up the same mapping they use for the physical controller.
//!
//! # Requirements
//!
//! - The `uinput` kernel module must be loaded (`modprobe uinput`).
//! - The user needs write access to `/dev/uinput` (usually via the `input`
//!   group or a udev rule).
//!
//! Without either, `acquire` fails and the host keeps running with the
//! controller in the `Failed` state.
//!
//! # Value scaling
//!
//! | Target kind | Command range | Device range        |
//! |-------------|---------------|---------------------|
//! | joystick    | `[-1, 1]`     | `[-32768, 32767]`   |
//! | trigger     | `[0, 1]`      | `[0, 255]`          |

use std::collections::HashMap;

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, BusType, EventType, InputEvent, InputId, Key,
    UinputAbsSetup,
};
use padlink_core::{BackendError, ControlKind, ControllerBackend, ControllerProfile};
use tracing::{debug, info};

const DEVICE_NAME: &str = "Padlink Virtual Xbox 360 Controller";
const VENDOR_MICROSOFT: u16 = 0x045e;
const PRODUCT_XBOX360: u16 = 0x028e;
const DEVICE_VERSION: u16 = 0x0110;

const STICK_MIN: i32 = -32768;
const STICK_MAX: i32 = 32767;
const TRIGGER_MAX: i32 = 255;

/// One absolute axis and the device range it is scaled into.
#[derive(Debug, Clone, Copy)]
struct AxisMapping {
    axis: AbsoluteAxisType,
    kind: ControlKind,
    min: i32,
    max: i32,
}

impl AxisMapping {
    fn stick(axis: AbsoluteAxisType) -> Self {
        Self {
            axis,
            kind: ControlKind::Joystick,
            min: STICK_MIN,
            max: STICK_MAX,
        }
    }

    fn trigger(axis: AbsoluteAxisType) -> Self {
        Self {
            axis,
            kind: ControlKind::Trigger,
            min: 0,
            max: TRIGGER_MAX,
        }
    }

    /// Maps a normalized command value onto the device range.
    fn scale(&self, value: f64) -> i32 {
        let (lo, hi) = self.kind.range();
        let t = (self.kind.clamp(value) - lo) / (hi - lo);
        let scaled = f64::from(self.min) + t * f64::from(self.max - self.min);
        (scaled.round() as i32).clamp(self.min, self.max)
    }

    fn setup(&self) -> UinputAbsSetup {
        let flat = if self.kind == ControlKind::Joystick { 128 } else { 0 };
        UinputAbsSetup::new(self.axis, AbsInfo::new(0, self.min, self.max, 16, flat, 0))
    }
}

fn xbox360_buttons() -> HashMap<&'static str, Key> {
    HashMap::from([
        ("A", Key::BTN_SOUTH),
        ("B", Key::BTN_EAST),
        ("X", Key::BTN_NORTH),
        ("Y", Key::BTN_WEST),
        ("LB", Key::BTN_TL),
        ("RB", Key::BTN_TR),
        ("BACK", Key::BTN_SELECT),
        ("START", Key::BTN_START),
        ("GUIDE", Key::BTN_MODE),
        ("LS", Key::BTN_THUMBL),
        ("RS", Key::BTN_THUMBR),
        ("DPAD_UP", Key::BTN_DPAD_UP),
        ("DPAD_DOWN", Key::BTN_DPAD_DOWN),
        ("DPAD_LEFT", Key::BTN_DPAD_LEFT),
        ("DPAD_RIGHT", Key::BTN_DPAD_RIGHT),
    ])
}

fn xbox360_axes() -> HashMap<&'static str, AxisMapping> {
    HashMap::from([
        ("LX", AxisMapping::stick(AbsoluteAxisType::ABS_X)),
        ("LY", AxisMapping::stick(AbsoluteAxisType::ABS_Y)),
        ("RX", AxisMapping::stick(AbsoluteAxisType::ABS_RX)),
        ("RY", AxisMapping::stick(AbsoluteAxisType::ABS_RY)),
        ("LT", AxisMapping::trigger(AbsoluteAxisType::ABS_Z)),
        ("RT", AxisMapping::trigger(AbsoluteAxisType::ABS_RZ)),
    ])
}

/// Controller backend backed by a uinput virtual device.
pub struct UinputBackend {
    device: Option<VirtualDevice>,
    buttons: HashMap<&'static str, Key>,
    axes: HashMap<&'static str, AxisMapping>,
}

impl Default for UinputBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl UinputBackend {
    /// Creates a backend with the Xbox 360 mapping; no device until `acquire`.
    pub fn new() -> Self {
        Self {
            device: None,
            buttons: xbox360_buttons(),
            axes: xbox360_axes(),
        }
    }

    fn emit(&mut self, op: &'static str, target: &str, event: InputEvent) -> Result<(), BackendError> {
        let device = self.device.as_mut().ok_or(BackendError::NotAcquired)?;
        // `emit` terminates the batch with SYN_REPORT.
        device
            .emit(&[event])
            .map_err(|e| BackendError::operation(op, target, e))
    }

    fn button(&mut self, op: &'static str, target: &str, value: i32) -> Result<(), BackendError> {
        let key = *self
            .buttons
            .get(target)
            .ok_or_else(|| BackendError::operation(op, target, "no uinput button mapping"))?;
        self.emit(op, target, InputEvent::new(EventType::KEY, key.code(), value))
    }
}

impl ControllerBackend for UinputBackend {
    fn acquire(&mut self, profile: &ControllerProfile) -> Result<(), BackendError> {
        if self.device.is_some() {
            return Ok(());
        }

        let mut keys = AttributeSet::<Key>::new();
        let mut axes = Vec::new();
        for (target, kind) in profile.controls() {
            let mapped = match kind {
                ControlKind::Button => self.buttons.get(target).map(|k| keys.insert(*k)).is_some(),
                ControlKind::Joystick | ControlKind::Trigger => {
                    self.axes.get(target).map(|spec| axes.push(spec.setup())).is_some()
                }
            };
            if !mapped {
                return Err(BackendError::AcquireFailed(format!(
                    "profile {} control {target} has no uinput mapping",
                    profile.name()
                )));
            }
        }

        let acquire_err =
            |e: std::io::Error| BackendError::AcquireFailed(format!("/dev/uinput: {e}"));

        let mut builder = VirtualDeviceBuilder::new()
            .map_err(acquire_err)?
            .name(DEVICE_NAME)
            .input_id(InputId::new(
                BusType::BUS_USB,
                VENDOR_MICROSOFT,
                PRODUCT_XBOX360,
                DEVICE_VERSION,
            ))
            .with_keys(&keys)
            .map_err(acquire_err)?;
        for setup in &axes {
            builder = builder.with_absolute_axis(setup).map_err(acquire_err)?;
        }
        let device = builder.build().map_err(acquire_err)?;

        info!("uinput device '{DEVICE_NAME}' created");
        self.device = Some(device);
        Ok(())
    }

    fn press(&mut self, target: &str) -> Result<(), BackendError> {
        self.button("press", target, 1)
    }

    fn release(&mut self, target: &str) -> Result<(), BackendError> {
        self.button("release", target, 0)
    }

    fn set_axis(&mut self, target: &str, value: f64) -> Result<(), BackendError> {
        let spec = *self
            .axes
            .get(target)
            .ok_or_else(|| BackendError::operation("set_axis", target, "no uinput axis mapping"))?;
        let raw = spec.scale(value);
        self.emit(
            "set_axis",
            target,
            InputEvent::new(EventType::ABSOLUTE, spec.axis.0, raw),
        )
    }

    fn disconnect(&mut self) {
        // Dropping the VirtualDevice destroys it (UI_DEV_DESTROY).
        if self.device.take().is_some() {
            debug!("uinput device destroyed");
        }
    }
}
