//! Integration tests: raw wire messages through the codec and into the state
//! machine, the way the host's session layer drives them.
//!
//! # What is covered
//!
//! - Range rejection happens at the codec, so out-of-range values never reach
//!   `apply` (and therefore never reach the backend).
//! - Button idempotence holds for any button in the profile.
//! - A failed backend turns every valid command into a zero-call `Skipped`.

use padlink_core::controller::mock::{RecordingBackend, RecordingLog};
use padlink_core::{
    decode, encode, ApplyResult, BackendStatus, Command, ControlKind, ControllerProfile,
    ControllerStateMachine,
};

fn attached() -> (ControllerStateMachine, RecordingLog) {
    let backend = RecordingBackend::new();
    let log = backend.log();
    let mut sm = ControllerStateMachine::new(Box::new(backend), ControllerProfile::xbox360());
    sm.attach().expect("recording backend always attaches");
    (sm, log)
}

/// Decodes then applies, mirroring the session layer: rejects never reach
/// the state machine.
fn feed(sm: &mut ControllerStateMachine, raw: &str) -> Option<ApplyResult> {
    decode(raw).ok().map(|cmd| sm.apply(&cmd))
}

#[test]
fn test_round_trip_button_message_yields_expected_command() {
    let cmd = decode(r#"{"type":"button","key":"A","value":1}"#).unwrap();

    assert_eq!(cmd.kind(), ControlKind::Button);
    assert_eq!(cmd.target(), "A");
    assert_eq!(cmd.value(), 1.0);
}

#[test]
fn test_every_profile_button_is_idempotent() {
    let (mut sm, log) = attached();
    let profile = ControllerProfile::xbox360();
    let buttons: Vec<String> = profile
        .targets_of(ControlKind::Button)
        .map(str::to_string)
        .collect();

    for button in &buttons {
        sm.apply(&Command::press(button.as_str()));
        sm.apply(&Command::press(button.as_str()));
        sm.apply(&Command::release(button.as_str()));
        sm.apply(&Command::release(button.as_str()));
    }

    assert_eq!(log.presses(), buttons);
    assert_eq!(log.releases(), buttons);
}

#[test]
fn test_out_of_range_joystick_values_never_reach_backend() {
    let (mut sm, log) = attached();

    for v in [-1.0001, 1.0001, -2.0, 5.0, 100.0] {
        let raw = format!(r#"{{"type":"joystick","key":"LX","value":{v}}}"#);
        assert_eq!(feed(&mut sm, &raw), None, "value {v} must be rejected");
    }

    assert!(log.axis_updates().is_empty());
    assert_eq!(sm.state().axis_value("LX"), None);
}

#[test]
fn test_out_of_range_trigger_values_never_reach_backend() {
    let (mut sm, log) = attached();

    for v in [-0.0001, -1.0, 1.0001, 3.0] {
        let raw = format!(r#"{{"type":"trigger","key":"RT","value":{v}}}"#);
        assert_eq!(feed(&mut sm, &raw), None, "value {v} must be rejected");
    }

    assert!(log.axis_updates().is_empty());
}

#[test]
fn test_joystick_bounds_are_inclusive_end_to_end() {
    let (mut sm, log) = attached();

    assert_eq!(
        feed(&mut sm, r#"{"type":"joystick","key":"LY","value":-1}"#),
        Some(ApplyResult::Applied)
    );
    assert_eq!(
        feed(&mut sm, r#"{"type":"joystick","key":"LY","value":1}"#),
        Some(ApplyResult::Applied)
    );
    assert_eq!(
        log.axis_updates(),
        vec![("LY".to_string(), -1.0), ("LY".to_string(), 1.0)]
    );
}

#[test]
fn test_failed_backend_skips_all_valid_commands_with_zero_calls() {
    // Arrange
    let backend = RecordingBackend::failing_acquire("driver absent");
    let log = backend.log();
    let mut sm = ControllerStateMachine::new(Box::new(backend), ControllerProfile::xbox360());
    assert!(sm.attach().is_err());
    assert_eq!(sm.status(), BackendStatus::Failed);

    let commands = [
        Command::press("A"),
        Command::release("A"),
        Command::Joystick {
            target: "RX".into(),
            value: -0.25,
        },
        Command::Trigger {
            target: "LT".into(),
            value: 0.5,
        },
    ];

    // Act + Assert
    for cmd in &commands {
        let raw = encode(cmd);
        assert_eq!(feed(&mut sm, &raw), Some(ApplyResult::Skipped));
    }
    assert_eq!(log.operation_count(), 0);
}

#[test]
fn test_last_axis_write_wins() {
    let (mut sm, _log) = attached();

    feed(&mut sm, r#"{"type":"joystick","key":"LX","value":0.5}"#);
    feed(&mut sm, r#"{"type":"joystick","key":"LX","value":-0.5}"#);

    assert_eq!(sm.state().axis_value("LX"), Some(-0.5));
}
