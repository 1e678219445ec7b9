//! Integration tests for server lifecycle: startup, bind failures,
//! cancellation, and the control surface.
//!
//! # Purpose
//!
//! These tests exercise the lifecycle guarantees through the public API:
//!
//! - Bind failures surface synchronously from `start`, before any
//!   background work begins.
//! - `stop` cancels the accept loop *and* every session blocked on a read,
//!   even a session that never sent a byte.
//! - A cleanly stopped server releases its port for immediate reuse.
//! - `RelayControl` is idempotent in both directions and produces the
//!   distinct log lines a control panel renders
//!   ("Server already running!" vs "Server stopped" vs "Server not
//!   running").

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use relay_server::domain::{ChannelLogSink, ServerConfig, ServerEvent};
use relay_server::infrastructure::pointer::mock::MockPointerSink;
use relay_server::infrastructure::{start, RelayControl, StartError};

const WAIT: Duration = Duration::from_secs(5);

async fn next_event(events: &mut UnboundedReceiver<ServerEvent>) -> ServerEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("event timed out")
        .expect("event channel must stay open")
}

// ── Startup and bind errors ───────────────────────────────────────────────────

#[tokio::test]
async fn test_start_returns_before_any_client_connects() {
    // Arrange / Act: start must complete without any client activity —
    // it is non-blocking for the caller.
    let sink = Arc::new(MockPointerSink::new());
    let (log, mut events) = ChannelLogSink::new();
    let handle = start(ServerConfig::new("127.0.0.1", 0), sink, Arc::new(log))
        .await
        .expect("start must succeed");

    // Assert: the started event is already observable.
    let event = next_event(&mut events).await;
    assert_eq!(
        event.to_string(),
        format!("Server started on ws://127.0.0.1:{}", handle.local_addr().port())
    );

    handle.stop().await;
}

#[tokio::test]
async fn test_bind_conflict_is_a_synchronous_start_error() {
    // Arrange: occupy a port with a plain TCP listener
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let sink = Arc::new(MockPointerSink::new());
    let (log, mut events) = ChannelLogSink::new();

    // Act
    let result = start(ServerConfig::new("127.0.0.1", port), sink, Arc::new(log)).await;

    // Assert: the error names the address, and no started event fired.
    match result {
        Err(StartError::Bind { addr, .. }) => assert_eq!(addr, format!("127.0.0.1:{port}")),
        Ok(_) => panic!("bind on an occupied port must fail"),
    }
    assert!(events.try_recv().is_err(), "no event may fire on a failed start");
}

#[tokio::test]
async fn test_stopped_server_releases_its_port() {
    // Arrange: start and cleanly stop a server that never saw a client.
    let sink = Arc::new(MockPointerSink::new());
    let (log, _events) = ChannelLogSink::new();
    let pointer: Arc<dyn relay_server::application::pointer::PointerSink> = sink.clone();
    let handle = start(
        ServerConfig::new("127.0.0.1", 0),
        pointer,
        Arc::new(log),
    )
    .await
    .expect("first start must succeed");
    let port = handle.local_addr().port();
    handle.stop().await;

    // Act / Assert: the same port binds again immediately.
    let (log, _events) = ChannelLogSink::new();
    let second = start(ServerConfig::new("127.0.0.1", port), sink, Arc::new(log))
        .await
        .expect("port must be reusable after a clean stop");
    second.stop().await;
}

// ── Cancellation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stop_cancels_a_session_blocked_on_read() {
    // Arrange: a client that connects and then waits forever.
    let sink = Arc::new(MockPointerSink::new());
    let (log, mut events) = ChannelLogSink::new();
    let handle = start(ServerConfig::new("127.0.0.1", 0), sink, Arc::new(log))
        .await
        .expect("start must succeed");

    let url = format!("ws://{}", handle.local_addr());
    let (mut ws, _) = timeout(WAIT, connect_async(url))
        .await
        .expect("connect timed out")
        .expect("handshake must succeed");

    // Consume the greeting so the session is fully established and parked
    // on its next read.
    let greeting = timeout(WAIT, ws.next())
        .await
        .expect("greeting timed out")
        .expect("greeting expected")
        .expect("greeting frame error");
    assert_eq!(
        greeting,
        Message::Text("Connected (no password required)".to_string())
    );

    // Act: stop must not hang on the parked session.
    timeout(Duration::from_secs(10), handle.stop())
        .await
        .expect("stop must cancel the blocked session read");

    // Assert: the client observes the close...
    loop {
        match timeout(WAIT, ws.next()).await.expect("close timed out") {
            None | Some(Ok(Message::Close(_))) | Some(Err(_)) => break,
            Some(Ok(_)) => continue,
        }
    }

    // ...and the event stream tells the full story, disconnect before stop.
    let mut saw_disconnect = false;
    loop {
        match next_event(&mut events).await {
            ServerEvent::ClientDisconnected { .. } => saw_disconnect = true,
            ServerEvent::Stopped => break,
            _ => {}
        }
    }
    assert!(saw_disconnect, "session teardown must log the disconnect");
}

// ── Control surface ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_control_surface_log_lines_are_distinct() {
    // Arrange
    let (log, mut events) = ChannelLogSink::new();
    let mut control = RelayControl::new(Arc::new(MockPointerSink::new()), Arc::new(log));

    // Act: double start, then double stop.
    control.start("127.0.0.1", 0, "").await.unwrap();
    control.start("127.0.0.1", 0, "").await.unwrap();
    control.stop().await;
    control.stop().await;

    // Assert: the four log lines a control panel renders, in order.
    let lines = [
        next_event(&mut events).await.to_string(),
        next_event(&mut events).await.to_string(),
        next_event(&mut events).await.to_string(),
        next_event(&mut events).await.to_string(),
    ];
    assert!(lines[0].starts_with("Server started on ws://127.0.0.1:"));
    assert_eq!(lines[1], "Server already running!");
    assert_eq!(lines[2], "Server stopped");
    assert_eq!(lines[3], "Server not running");
}

#[tokio::test]
async fn test_control_surface_can_restart_after_stop() {
    // A stop followed by a start must yield a fresh, working server.
    let (log, _events) = ChannelLogSink::new();
    let mut control = RelayControl::new(Arc::new(MockPointerSink::new()), Arc::new(log));

    control.start("127.0.0.1", 0, "").await.unwrap();
    let first_addr = control.local_addr().expect("running server has an address");
    control.stop().await;

    control.start("127.0.0.1", 0, "").await.unwrap();
    let second_addr = control.local_addr().expect("restarted server has an address");
    assert!(control.is_running());
    // Ephemeral ports differ between runs; only liveness matters here.
    let _ = (first_addr, second_addr);

    control.stop().await;
}
