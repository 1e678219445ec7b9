//! WebSocket server: accept loop, per-session tasks, and lifecycle handle.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming TCP connections and upgrading each to a WebSocket
//!    session.
//! 3. Driving one [`SessionHandler`] per connection: feeding it inbound
//!    text frames, sending its replies, delivering its events to the log
//!    sink.
//! 4. Cancelling the accept loop and every blocked session read when the
//!    returned [`ServerHandle`] is stopped.
//!
//! # Lifecycle
//!
//! [`start`] binds the listener, spawns the accept loop, and returns
//! immediately with a [`ServerHandle`].  The handle owns the cancellation
//! signal (a `watch` channel) and the accept-loop task; `stop` fires the
//! signal and awaits the loop, which in turn drains its session
//! [`JoinSet`].  There is no global server state — dropping the handle
//! without calling `stop` also shuts the server down, because the closed
//! channel wakes every waiter.
//!
//! # Scalability
//!
//! Each session runs in its own Tokio task and owns its connection
//! exclusively; sessions share nothing but the pointer sink and the log
//! sink, both of which are `Sync`.  The accept loop never blocks on a
//! session: it accepts, spawns, and immediately accepts again.  A session
//! waiting forever for its next message (or for a credential) costs one
//! suspended task and nothing else.
//!
//! # The pointer device is shared
//!
//! Sessions dispatch to the single pointer device without any cross-session
//! ordering.  Two clients moving at once interleave at the device, exactly
//! like two physical mice plugged into one machine.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    WebSocketStream,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::dispatch::CommandDispatcher;
use crate::application::pointer::PointerSink;
use crate::application::session::{Disposition, SessionHandler, Turn};
use crate::domain::config::ServerConfig;
use crate::domain::events::{LogSink, ServerEvent};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for server startup.
#[derive(Debug, Error)]
pub enum StartError {
    /// The listening address could not be bound (unavailable, in use, or
    /// insufficient permissions).  Fatal to this start attempt; the caller
    /// decides whether to retry with a different address.
    #[error("failed to bind ws://{addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

// ── Server handle ─────────────────────────────────────────────────────────────

/// Lifecycle handle for a running relay server.
///
/// Returned by [`start`]; holding it keeps the server alive.  `stop`
/// consumes the handle, so a server can be stopped at most once — calling
/// stop on a server that was never started is impossible by construction.
pub struct ServerHandle {
    shutdown: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
    local_addr: SocketAddr,
    log: Arc<dyn LogSink>,
}

impl ServerHandle {
    /// The address the listener actually bound, with the real port even
    /// when the config requested port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops the server: cancels the accept loop and every session's
    /// blocking read, then waits for all of them to finish.
    ///
    /// Sessions that are mid-message (not mid-wait) complete their current
    /// dispatch-and-echo exchange before they observe the cancellation.
    pub async fn stop(self) {
        // Ignore the send result: an already-finished accept loop has
        // dropped its receiver, which is exactly the state we want.
        let _ = self.shutdown.send(true);
        if let Err(e) = self.accept_task.await {
            debug!("accept loop join error: {e}");
        }
        self.log.on_event(&ServerEvent::Stopped);
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Binds the listener and starts accepting connections in the background.
///
/// Returns as soon as the listener is bound; the accept loop runs on the
/// Tokio runtime until the handle is stopped or dropped.
///
/// # Errors
///
/// Returns [`StartError::Bind`] if the address is unavailable or already
/// in use.  This is the only error surfaced synchronously; everything
/// later is per-session and reported through the log sink.
pub async fn start(
    config: ServerConfig,
    pointer: Arc<dyn PointerSink>,
    log: Arc<dyn LogSink>,
) -> Result<ServerHandle, StartError> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await.map_err(|source| StartError::Bind {
        addr: addr.clone(),
        source,
    })?;
    let local_addr = listener.local_addr().map_err(|source| StartError::Bind {
        addr: addr.clone(),
        source,
    })?;

    // Report the configured host with the actually-bound port, so a port-0
    // bind logs a truthful, dialable address.
    log.on_event(&ServerEvent::Started {
        addr: format!("{}:{}", config.bind_host, local_addr.port()),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let accept_task = tokio::spawn(accept_loop(
        listener,
        Arc::new(config),
        pointer,
        Arc::clone(&log),
        shutdown_rx,
    ));

    Ok(ServerHandle {
        shutdown: shutdown_tx,
        accept_task,
        local_addr,
        log,
    })
}

// ── Accept loop ───────────────────────────────────────────────────────────────

/// Accepts connections until the shutdown signal fires, then drains the
/// session task group.
async fn accept_loop(
    listener: TcpListener,
    config: Arc<ServerConfig>,
    pointer: Arc<dyn PointerSink>,
    log: Arc<dyn LogSink>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                // A dropped sender (handle dropped without stop) shuts the
                // server down the same way an explicit stop does.
                if changed.is_err() || *shutdown.borrow() {
                    debug!("shutdown signal received; stopping accept loop");
                    break;
                }
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!("incoming TCP connection from {peer}");
                    let config = Arc::clone(&config);
                    let pointer = Arc::clone(&pointer);
                    let log = Arc::clone(&log);
                    let shutdown = shutdown.clone();
                    sessions.spawn(async move {
                        run_session(stream, peer, config, pointer, log, shutdown).await;
                    });
                }
                Err(e) => {
                    // Transient accept failure (e.g., file-descriptor
                    // exhaustion).  Log it and keep accepting.
                    log.on_event(&ServerEvent::AcceptError { detail: e.to_string() });
                }
            }
        }
    }

    // Release the port immediately; sessions shut themselves down via
    // their own copy of the signal.
    drop(listener);
    while sessions.join_next().await.is_some() {}
    debug!("all sessions finished");
}

// ── Per-session handling ──────────────────────────────────────────────────────

type WsSink = SplitSink<WebSocketStream<TcpStream>, WsMessage>;

/// What the transport loop should do after applying a [`Turn`].
enum Flow {
    /// Keep reading.
    Continue,
    /// The protocol asked to close (auth failure); send a Close frame.
    Close,
    /// The transport failed while sending; tear down without more writes.
    Lost,
}

/// Delivers a turn: events to the log sink, replies to the client.
async fn apply_turn(ws_tx: &mut WsSink, log: &Arc<dyn LogSink>, turn: Turn) -> Flow {
    emit_events(log, &turn);
    for reply in turn.replies {
        if ws_tx.send(WsMessage::Text(reply)).await.is_err() {
            return Flow::Lost;
        }
    }
    match turn.disposition {
        Disposition::Continue => Flow::Continue,
        Disposition::Close => Flow::Close,
    }
}

fn emit_events(log: &Arc<dyn LogSink>, turn: &Turn) {
    for event in &turn.events {
        log.on_event(event);
    }
}

/// Runs the complete lifecycle of one client session.
///
/// The protocol lives in [`SessionHandler`]; this function only moves
/// frames and signals between the socket and the state machine:
///
/// 1. WebSocket upgrade handshake.
/// 2. Greeting turn (password prompt or immediate-connect notice).
/// 3. Read loop: every text frame goes through the handler, strictly in
///    arrival order; the loop also watches the shutdown signal so a
///    stopped server cancels reads that would otherwise wait forever.
/// 4. Teardown: disconnect turns emit their events; auth-failure closes
///    skip the disconnect line because the session already closed itself.
async fn run_session(
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<ServerConfig>,
    pointer: Arc<dyn PointerSink>,
    log: Arc<dyn LogSink>,
    mut shutdown: watch::Receiver<bool>,
) {
    // Diagnostic identifier; the protocol itself never sees it.
    let session_id = Uuid::new_v4();

    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            debug!("session {session_id}: WebSocket handshake failed with {peer}: {e}");
            return;
        }
    };
    debug!("session {session_id}: WebSocket session established with {peer}");

    let (mut ws_tx, mut ws_rx) = ws.split();

    let dispatcher = CommandDispatcher::new(pointer);
    let (mut handler, greeting) = SessionHandler::connect(
        config.required_password().map(str::to_string),
        dispatcher,
        peer,
    );

    match apply_turn(&mut ws_tx, &log, greeting).await {
        Flow::Continue => {}
        Flow::Close | Flow::Lost => {
            emit_events(&log, &handler.on_transport_closed());
            return;
        }
    }

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    debug!("session {session_id}: server stopping, closing connection");
                    // Best-effort goodbye; the client may already be gone.
                    let _ = ws_tx.send(WsMessage::Close(None)).await;
                    emit_events(&log, &handler.on_transport_closed());
                    break;
                }
            }
            frame = ws_rx.next() => {
                if let Flow::Continue = handle_frame(
                    frame, &mut handler, &mut ws_tx, &log, session_id,
                ).await {
                    continue;
                }
                break;
            }
        }
    }

    debug!("session {session_id}: finished");
}

/// Processes one frame (or stream end) from the client.
async fn handle_frame(
    frame: Option<Result<WsMessage, WsError>>,
    handler: &mut SessionHandler,
    ws_tx: &mut WsSink,
    log: &Arc<dyn LogSink>,
    session_id: Uuid,
) -> Flow {
    match frame {
        Some(Ok(WsMessage::Text(text))) => {
            let turn = handler.on_message(&text);
            match apply_turn(ws_tx, log, turn).await {
                Flow::Continue => Flow::Continue,
                Flow::Close => {
                    // Protocol-initiated close (failed authentication):
                    // the verdict reply is already out, now close cleanly.
                    let _ = ws_tx.send(WsMessage::Close(None)).await;
                    Flow::Close
                }
                Flow::Lost => {
                    emit_events(log, &handler.on_transport_closed());
                    Flow::Lost
                }
            }
        }

        Some(Ok(WsMessage::Binary(_))) => {
            // The protocol is text-only; binary frames are unexpected but
            // harmless.
            warn!("session {session_id}: unexpected binary WebSocket frame (ignored)");
            Flow::Continue
        }

        Some(Ok(WsMessage::Ping(data))) => {
            // Protocol-level ping; tokio-tungstenite queues the Pong reply
            // automatically on the next write.
            debug!("session {session_id}: WebSocket ping ({} bytes)", data.len());
            Flow::Continue
        }

        Some(Ok(WsMessage::Pong(_))) => {
            debug!("session {session_id}: WebSocket pong received");
            Flow::Continue
        }

        Some(Ok(WsMessage::Close(_))) | None => {
            debug!("session {session_id}: client closed the connection");
            emit_events(log, &handler.on_transport_closed());
            Flow::Lost
        }

        Some(Ok(WsMessage::Frame(_))) => {
            debug!("session {session_id}: raw frame (ignored)");
            Flow::Continue
        }

        Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
            debug!("session {session_id}: connection closed");
            emit_events(log, &handler.on_transport_closed());
            Flow::Lost
        }

        Some(Err(e)) => {
            warn!("session {session_id}: WebSocket error: {e}");
            emit_events(log, &handler.on_transport_closed());
            Flow::Lost
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
