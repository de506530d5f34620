//! End-to-end tests: real WebSocket clients against the accept loop.
//!
//! Each test binds the listener on `127.0.0.1:0`, runs [`serve`] in a
//! background task, and drives it with `tokio_tungstenite` clients.  The
//! controller sits on a recording backend so the tests can see exactly what
//! reached the "device".
//!
//! Message handling is asynchronous with respect to the client's `send`, so
//! assertions poll the shared state until it settles (or a deadline passes).

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::SinkExt;
use padlink_core::controller::mock::{BackendCall, RecordingBackend, RecordingLog};
use padlink_core::{BackendStatus, ControllerProfile, ControllerStateMachine};
use padlink_host::application::{SessionManager, SharedController};
use padlink_host::infrastructure::{run_host, serve};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

const DEADLINE: Duration = Duration::from_secs(3);

struct Harness {
    addr: SocketAddr,
    manager: Arc<SessionManager>,
    log: RecordingLog,
    running: Arc<AtomicBool>,
    server: JoinHandle<anyhow::Result<()>>,
}

fn attached_controller() -> (SharedController, RecordingLog) {
    let backend = RecordingBackend::new();
    let log = backend.log();
    let mut controller =
        ControllerStateMachine::new(Box::new(backend), ControllerProfile::xbox360());
    controller.attach().unwrap();
    (Arc::new(Mutex::new(controller)), log)
}

async fn start_host() -> Harness {
    let (controller, log) = attached_controller();
    let manager = Arc::new(SessionManager::new(controller));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let server = tokio::spawn(serve(listener, Arc::clone(&manager), Arc::clone(&running)));

    Harness {
        addr,
        manager,
        log,
        running,
        server,
    }
}

/// Polls `check` every 10 ms until it returns `true` or the deadline passes.
async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = tokio::time::Instant::now();
    while start.elapsed() < DEADLINE {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

fn text(json: &str) -> WsMessage {
    WsMessage::Text(json.to_string())
}

#[tokio::test]
async fn test_button_press_survives_disconnect() {
    // Arrange
    let host = start_host().await;
    let (mut ws, _) = connect_async(format!("ws://{}", host.addr)).await.unwrap();

    // Act
    ws.send(text(r#"{"type":"button","key":"A","value":1}"#))
        .await
        .unwrap();
    let mgr = Arc::clone(&host.manager);
    assert!(
        eventually(|| {
            let m = Arc::clone(&mgr);
            async move { m.controller_state().await.is_pressed("A") }
        })
        .await
    );
    ws.close(None).await.unwrap();

    // Assert: the session is gone but A is still held down
    assert!(
        eventually(|| {
            let m = Arc::clone(&mgr);
            async move { m.session_count().await == 0 }
        })
        .await
    );
    assert!(host.manager.controller_state().await.is_pressed("A"));
    assert!(host.log.releases().is_empty());
}

#[tokio::test]
async fn test_invalid_message_does_not_end_the_session() {
    let host = start_host().await;
    let (mut ws, _) = connect_async(format!("ws://{}", host.addr)).await.unwrap();

    ws.send(text("not json")).await.unwrap();
    ws.send(text(r#"{"type":"dpad","key":"UP","value":1}"#))
        .await
        .unwrap();
    ws.send(text(r#"{"type":"trigger","key":"RT","value":0.75}"#))
        .await
        .unwrap();

    let mgr = Arc::clone(&host.manager);
    assert!(
        eventually(|| {
            let m = Arc::clone(&mgr);
            async move { m.controller_state().await.axis_value("RT") == Some(0.75) }
        })
        .await
    );
    assert_eq!(host.manager.session_count().await, 1);
    assert_eq!(host.log.axis_updates(), vec![("RT".to_string(), 0.75)]);
}

#[tokio::test]
async fn test_binary_frames_are_decoded_like_text() {
    let host = start_host().await;
    let (mut ws, _) = connect_async(format!("ws://{}", host.addr)).await.unwrap();

    ws.send(WsMessage::Binary(
        br#"{"type":"button","key":"START","value":1}"#.to_vec(),
    ))
    .await
    .unwrap();

    let mgr = Arc::clone(&host.manager);
    assert!(
        eventually(|| {
            let m = Arc::clone(&mgr);
            async move { m.controller_state().await.is_pressed("START") }
        })
        .await
    );
    assert_eq!(host.log.presses(), vec!["START".to_string()]);
}

#[tokio::test]
async fn test_messages_from_one_client_apply_in_order() {
    let host = start_host().await;
    let (mut ws, _) = connect_async(format!("ws://{}", host.addr)).await.unwrap();

    for value in ["-1", "-0.5", "0", "0.5", "1"] {
        let msg = format!(r#"{{"type":"joystick","key":"LY","value":{value}}}"#);
        ws.send(text(&msg)).await.unwrap();
    }

    let log = host.log.clone();
    assert!(
        eventually(|| {
            let l = log.clone();
            async move { l.axis_updates().len() == 5 }
        })
        .await
    );
    let values: Vec<f64> = host.log.axis_updates().into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
}

#[tokio::test]
async fn test_two_clients_share_one_controller() {
    // Arrange
    let host = start_host().await;
    let (mut a, _) = connect_async(format!("ws://{}", host.addr)).await.unwrap();
    let (mut b, _) = connect_async(format!("ws://{}", host.addr)).await.unwrap();

    let mgr = Arc::clone(&host.manager);

    // Act
    a.send(text(r#"{"type":"button","key":"X","value":1}"#))
        .await
        .unwrap();
    assert!(
        eventually(|| {
            let m = Arc::clone(&mgr);
            async move { m.controller_state().await.is_pressed("X") }
        })
        .await
    );
    b.send(text(r#"{"type":"button","key":"X","value":1}"#))
        .await
        .unwrap();
    b.send(text(r#"{"type":"joystick","key":"RX","value":0.5}"#))
        .await
        .unwrap();

    // Assert: the duplicate press from the second phone was absorbed
    assert!(
        eventually(|| {
            let m = Arc::clone(&mgr);
            async move { m.controller_state().await.axis_value("RX") == Some(0.5) }
        })
        .await
    );
    assert_eq!(host.manager.session_count().await, 2);
    assert_eq!(host.log.presses(), vec!["X".to_string()]);
}

#[tokio::test]
async fn test_clearing_running_flag_stops_accept_loop() {
    let host = start_host().await;

    host.running.store(false, Ordering::Relaxed);

    let result = tokio::time::timeout(DEADLINE, host.server).await;
    assert!(matches!(result, Ok(Ok(Ok(())))));
}

#[tokio::test]
async fn test_shutdown_stops_serving_then_releases_device() {
    // Arrange
    let (controller, log) = attached_controller();
    let running = Arc::new(AtomicBool::new(true));
    let host = tokio::spawn(run_host(
        "127.0.0.1:0".parse().unwrap(),
        Arc::clone(&controller),
        Arc::clone(&running),
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.lock().await.status(), BackendStatus::Attached);

    // Act
    running.store(false, Ordering::Relaxed);
    let result = tokio::time::timeout(DEADLINE, host).await;

    // Assert
    assert!(matches!(result, Ok(Ok(Ok(())))));
    assert_eq!(log.calls().last(), Some(&BackendCall::Disconnect));
    assert_eq!(controller.lock().await.status(), BackendStatus::Unattached);
}

#[tokio::test]
async fn test_bind_failure_still_releases_device() {
    // Arrange: occupy a port so the host cannot bind it
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap();
    let (controller, log) = attached_controller();
    let running = Arc::new(AtomicBool::new(true));

    // Act
    let result = run_host(addr, Arc::clone(&controller), running).await;

    // Assert
    assert!(result.is_err());
    assert_eq!(log.calls().last(), Some(&BackendCall::Disconnect));
    assert_eq!(controller.lock().await.status(), BackendStatus::Unattached);
}
