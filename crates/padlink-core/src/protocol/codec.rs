//! JSON codec for inbound input commands.
//!
//! Wire format (one object per WebSocket frame):
//! ```text
//! { "type": "button"|"joystick"|"trigger", "key": <non-empty string>, "value": <number> }
//! ```
//!
//! | type       | legal value      |
//! |------------|------------------|
//! | `button`   | `0` or `1`       |
//! | `joystick` | `[-1, 1]`        |
//! | `trigger`  | `[0, 1]`         |
//!
//! Extra fields are ignored.  Decoding is pure and deterministic; a rejected
//! message is the caller's to log and drop.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::protocol::command::{Command, ControlKind};

/// Field carrying the kind discriminator.
pub const FIELD_TYPE: &str = "type";
/// Field carrying the target identifier.
pub const FIELD_KEY: &str = "key";
/// Field carrying the numeric value.
pub const FIELD_VALUE: &str = "value";

/// Reasons a raw message cannot become a [`Command`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecodeError {
    /// The bytes are not a JSON object.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// One of `type`, `key`, `value` is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The `type` field is not one of the known kinds.
    #[error("unknown kind: {0}")]
    UnknownKind(String),

    /// The `key` field is not a non-empty string.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The `value` field is not a number.
    #[error("{kind} value must be a number, got {found}")]
    WrongValueType { kind: ControlKind, found: String },

    /// The `value` field is a number outside the kind's legal range.
    #[error("{kind} value {value} is out of range")]
    OutOfRange { kind: ControlKind, value: f64 },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one raw message into a validated [`Command`].
///
/// Accepts anything byte-like so both WebSocket text and binary frames can be
/// passed straight in.
///
/// # Errors
///
/// Returns [`DecodeError`] describing the first problem found.  Fields are
/// checked for presence first, then `type`, `key`, and `value` in that order.
///
/// # Examples
///
/// ```rust
/// use padlink_core::protocol::{decode, Command};
///
/// let cmd = decode(r#"{"type":"button","key":"A","value":1}"#).unwrap();
/// assert_eq!(cmd, Command::press("A"));
/// ```
pub fn decode(raw: impl AsRef<[u8]>) -> Result<Command, DecodeError> {
    let parsed: Value =
        serde_json::from_slice(raw.as_ref()).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let fields = match parsed {
        Value::Object(fields) => fields,
        other => {
            return Err(DecodeError::Malformed(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            )))
        }
    };

    let kind_field = required(&fields, FIELD_TYPE)?;
    let key_field = required(&fields, FIELD_KEY)?;
    let value_field = required(&fields, FIELD_VALUE)?;

    let kind = decode_kind(kind_field)?;
    let target = decode_target(key_field)?;
    let value = decode_value(kind, value_field)?;

    Ok(match kind {
        ControlKind::Button => Command::Button {
            target,
            pressed: value == 1.0,
        },
        ControlKind::Joystick => Command::Joystick { target, value },
        ControlKind::Trigger => Command::Trigger { target, value },
    })
}

/// Encodes a [`Command`] into its wire form.
///
/// Buttons are written with integer values (`0`/`1`) the way phone clients
/// send them.
pub fn encode(cmd: &Command) -> String {
    let value = match cmd {
        Command::Button { pressed, .. } => WireValue::Flag(u8::from(*pressed)),
        Command::Joystick { value, .. } | Command::Trigger { value, .. } => {
            WireValue::Level(*value)
        }
    };
    let wire = WireCommand {
        kind: cmd.kind().wire_name(),
        key: cmd.target(),
        value,
    };
    // Plain strings and numbers only; serialization cannot fail.
    serde_json::to_string(&wire).unwrap_or_default()
}

/// Outbound wire form.  Field names match `FIELD_TYPE`, `FIELD_KEY`, and
/// `FIELD_VALUE`.
#[derive(Serialize)]
struct WireCommand<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    key: &'a str,
    value: WireValue,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireValue {
    Flag(u8),
    Level(f64),
}

// ── Field decoders ────────────────────────────────────────────────────────────

fn required<'a>(fields: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, DecodeError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(name)),
        Some(v) => Ok(v),
    }
}

fn decode_kind(field: &Value) -> Result<ControlKind, DecodeError> {
    match field {
        Value::String(s) => {
            ControlKind::from_wire(s).ok_or_else(|| DecodeError::UnknownKind(s.clone()))
        }
        other => Err(DecodeError::UnknownKind(other.to_string())),
    }
}

fn decode_target(field: &Value) -> Result<String, DecodeError> {
    match field {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::String(_) => Err(DecodeError::InvalidTarget("empty key".to_string())),
        other => Err(DecodeError::InvalidTarget(format!(
            "key must be a string, got {}",
            json_type_name(other)
        ))),
    }
}

fn decode_value(kind: ControlKind, field: &Value) -> Result<f64, DecodeError> {
    let value = field.as_f64().ok_or_else(|| DecodeError::WrongValueType {
        kind,
        found: json_type_name(field).to_string(),
    })?;

    let legal = match kind {
        ControlKind::Button => value == 0.0 || value == 1.0,
        ControlKind::Joystick | ControlKind::Trigger => {
            let (min, max) = kind.range();
            (min..=max).contains(&value)
        }
    };

    if legal {
        Ok(value)
    } else {
        Err(DecodeError::OutOfRange { kind, value })
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
