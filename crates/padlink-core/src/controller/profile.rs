//! Controller profiles and their target vocabulary.
//!
//! A profile names the device the backend should emulate and lists every
//! target a command may address, together with the kind of control it is.
//! The codec does not know this vocabulary; targets are checked against it
//! when a command is applied.

use std::collections::BTreeMap;

use crate::protocol::command::ControlKind;

/// Name of the built-in Xbox 360 profile.
pub const XBOX360: &str = "xbox360";

const XBOX360_BUTTONS: &[&str] = &[
    "A", "B", "X", "Y", "LB", "RB", "BACK", "START", "GUIDE", "LS", "RS", "DPAD_UP",
    "DPAD_DOWN", "DPAD_LEFT", "DPAD_RIGHT",
];
const XBOX360_JOYSTICKS: &[&str] = &["LX", "LY", "RX", "RY"];
const XBOX360_TRIGGERS: &[&str] = &["LT", "RT"];

/// A named controller profile and the controls it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerProfile {
    name: String,
    controls: BTreeMap<String, ControlKind>,
}

impl ControllerProfile {
    /// Creates an empty profile.  Use [`ControllerProfile::with_control`] to
    /// populate it.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controls: BTreeMap::new(),
        }
    }

    /// Adds (or re-kinds) one control.
    pub fn with_control(mut self, target: impl Into<String>, kind: ControlKind) -> Self {
        self.controls.insert(target.into(), kind);
        self
    }

    /// The standard Xbox 360 pad: 15 buttons, two sticks, two triggers.
    pub fn xbox360() -> Self {
        let mut profile = Self::new(XBOX360);
        for (targets, kind) in [
            (XBOX360_BUTTONS, ControlKind::Button),
            (XBOX360_JOYSTICKS, ControlKind::Joystick),
            (XBOX360_TRIGGERS, ControlKind::Trigger),
        ] {
            for target in targets {
                profile.controls.insert((*target).to_string(), kind);
            }
        }
        profile
    }

    /// Looks up a built-in profile by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            XBOX360 => Some(Self::xbox360()),
            _ => None,
        }
    }

    /// Names of every built-in profile, for help text and error messages.
    pub fn builtin_names() -> &'static [&'static str] {
        &[XBOX360]
    }

    /// Profile name, e.g. `xbox360`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of control `target` is, if the profile has it.
    pub fn kind_of(&self, target: &str) -> Option<ControlKind> {
        self.controls.get(target).copied()
    }

    /// `true` when `target` exists and is a control of `kind`.
    pub fn accepts(&self, kind: ControlKind, target: &str) -> bool {
        self.kind_of(target) == Some(kind)
    }

    /// Iterates `(target, kind)` pairs in name order.
    pub fn controls(&self) -> impl Iterator<Item = (&str, ControlKind)> {
        self.controls.iter().map(|(t, k)| (t.as_str(), *k))
    }

    /// Targets of one kind, in name order.
    pub fn targets_of(&self, kind: ControlKind) -> impl Iterator<Item = &str> {
        self.controls()
            .filter(move |(_, k)| *k == kind)
            .map(|(t, _)| t)
    }
}
