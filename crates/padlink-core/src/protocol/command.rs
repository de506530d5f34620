//! Typed input commands.
//!
//! A [`Command`] is what survives decoding: the kind of control, the target it
//! names, and a value that is already inside the legal range for that kind.
//! No component downstream of the codec ever looks at an untyped payload.

use std::fmt;

/// The closed set of control kinds the protocol understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// A digital button: pressed or released.
    Button,
    /// One axis of an analog stick, in `[-1, 1]`.
    Joystick,
    /// An analog trigger, in `[0, 1]`.
    Trigger,
}

impl ControlKind {
    /// Parses the wire discriminator (`"button"`, `"joystick"`, `"trigger"`).
    ///
    /// Matching is case-sensitive; `"Button"` is not a known kind.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "button" => Some(Self::Button),
            "joystick" => Some(Self::Joystick),
            "trigger" => Some(Self::Trigger),
            _ => None,
        }
    }

    /// Returns the wire discriminator for this kind.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Joystick => "joystick",
            Self::Trigger => "trigger",
        }
    }

    /// Inclusive `(min, max)` range of legal values for this kind.
    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Button => (0.0, 1.0),
            Self::Joystick => (-1.0, 1.0),
            Self::Trigger => (0.0, 1.0),
        }
    }

    /// Clamps `value` into this kind's legal range.
    ///
    /// NaN collapses to the neutral value (the lower bound for triggers and
    /// buttons, zero for joysticks).
    pub fn clamp(self, value: f64) -> f64 {
        let (min, max) = self.range();
        if value.is_nan() {
            return min.max(0.0);
        }
        value.clamp(min, max)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A decoded, range-validated instruction to change one input's state.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Press (`pressed = true`) or release a button.
    Button { target: String, pressed: bool },
    /// Move one stick axis to `value` in `[-1, 1]`.
    Joystick { target: String, value: f64 },
    /// Pull a trigger to `value` in `[0, 1]`.
    Trigger { target: String, value: f64 },
}

impl Command {
    /// Convenience constructor for a button press.
    pub fn press(target: impl Into<String>) -> Self {
        Self::Button {
            target: target.into(),
            pressed: true,
        }
    }

    /// Convenience constructor for a button release.
    pub fn release(target: impl Into<String>) -> Self {
        Self::Button {
            target: target.into(),
            pressed: false,
        }
    }

    /// The kind of control this command addresses.
    pub fn kind(&self) -> ControlKind {
        match self {
            Self::Button { .. } => ControlKind::Button,
            Self::Joystick { .. } => ControlKind::Joystick,
            Self::Trigger { .. } => ControlKind::Trigger,
        }
    }

    /// The targeted control, e.g. `"A"` or `"LX"`.
    pub fn target(&self) -> &str {
        match self {
            Self::Button { target, .. }
            | Self::Joystick { target, .. }
            | Self::Trigger { target, .. } => target,
        }
    }

    /// The numeric wire value: `0`/`1` for buttons, the axis value otherwise.
    pub fn value(&self) -> f64 {
        match self {
            Self::Button { pressed, .. } => {
                if *pressed {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Joystick { value, .. } | Self::Trigger { value, .. } => *value,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}={}", self.kind(), self.target(), self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_accepts_lowercase_names() {
        assert_eq!(ControlKind::from_wire("button"), Some(ControlKind::Button));
        assert_eq!(ControlKind::from_wire("joystick"), Some(ControlKind::Joystick));
        assert_eq!(ControlKind::from_wire("trigger"), Some(ControlKind::Trigger));
    }

    #[test]
    fn test_from_wire_is_case_sensitive() {
        assert_eq!(ControlKind::from_wire("Button"), None);
        assert_eq!(ControlKind::from_wire("JOYSTICK"), None);
        assert_eq!(ControlKind::from_wire("dpad"), None);
    }

    #[test]
    fn test_wire_name_matches_from_wire() {
        for kind in [ControlKind::Button, ControlKind::Joystick, ControlKind::Trigger] {
            assert_eq!(ControlKind::from_wire(kind.wire_name()), Some(kind));
        }
    }

    #[test]
    fn test_clamp_joystick_limits_to_unit_interval() {
        assert_eq!(ControlKind::Joystick.clamp(1.5), 1.0);
        assert_eq!(ControlKind::Joystick.clamp(-3.0), -1.0);
        assert_eq!(ControlKind::Joystick.clamp(0.25), 0.25);
    }

    #[test]
    fn test_clamp_trigger_rejects_negative_values() {
        assert_eq!(ControlKind::Trigger.clamp(-0.2), 0.0);
        assert_eq!(ControlKind::Trigger.clamp(2.0), 1.0);
    }

    #[test]
    fn test_clamp_nan_collapses_to_neutral() {
        assert_eq!(ControlKind::Joystick.clamp(f64::NAN), 0.0);
        assert_eq!(ControlKind::Trigger.clamp(f64::NAN), 0.0);
    }

    #[test]
    fn test_command_accessors() {
        let cmd = Command::Trigger {
            target: "LT".to_string(),
            value: 0.75,
        };
        assert_eq!(cmd.kind(), ControlKind::Trigger);
        assert_eq!(cmd.target(), "LT");
        assert_eq!(cmd.value(), 0.75);
    }

    #[test]
    fn test_button_value_is_zero_or_one() {
        assert_eq!(Command::press("A").value(), 1.0);
        assert_eq!(Command::release("A").value(), 0.0);
    }

    #[test]
    fn test_display_includes_kind_target_and_value() {
        assert_eq!(Command::press("START").to_string(), "button START=1");
    }
}
