//! Server events and the log-sink observer seam.
//!
//! Every lifecycle and session event the relay produces is a structured
//! [`ServerEvent`].  The server hands each event to a [`LogSink`]; the
//! embedding control surface decides what to do with it (render it in a
//! log pane, forward it over a channel, drop it).  The server itself never
//! formats UI text beyond the canonical log line in the `Display` impl.
//!
//! # Delivery contract
//!
//! Log delivery must never block or fail the server operation it
//! annotates.  `on_event` is therefore a synchronous, infallible call;
//! sinks that cross a thread or task boundary must use a non-blocking
//! hand-off (see [`ChannelLogSink`]).
//!
//! # Log line stability
//!
//! The `Display` strings below are shown verbatim in control-panel log
//! panes and are matched by operator tooling; treat them as part of the
//! external interface.

use std::fmt;
use std::net::SocketAddr;

use serde::Serialize;
use tokio::sync::mpsc;

// ── Event vocabulary ──────────────────────────────────────────────────────────

/// One lifecycle or session event, in the order a control surface would
/// want to render it.
///
/// Serializable so a control panel can forward events across its own UI
/// boundary (IPC, web frontend) without re-modelling them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The listener is bound and accepting connections.
    Started {
        /// The `host:port` the server is reachable at.
        addr: String,
    },

    /// A start request was ignored because the server is already running.
    AlreadyRunning,

    /// The server has shut down and released the listener.
    Stopped,

    /// A stop request was ignored because no server is running.
    NotRunning,

    /// A client completed the handshake and entered the authenticated state.
    ClientConnected {
        /// Remote address of the client connection.
        addr: SocketAddr,
        /// `true` when a password was verified; `false` when the server is
        /// running without authentication.
        authenticated: bool,
    },

    /// A client connection was closed by either side.
    ClientDisconnected {
        /// Remote address of the client connection.
        addr: SocketAddr,
    },

    /// A client presented the wrong password and was disconnected.
    AuthFailed {
        /// Remote address of the rejected connection.
        addr: SocketAddr,
    },

    /// An inbound message could not be parsed or acted upon.  The session
    /// stays open.
    CommandError {
        /// Human-readable description of the failure.
        detail: String,
    },

    /// The accept loop failed to accept one connection.  The loop keeps
    /// running.
    AcceptError {
        /// Human-readable description of the failure.
        detail: String,
    },
}

impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerEvent::Started { addr } => write!(f, "Server started on ws://{addr}"),
            ServerEvent::AlreadyRunning => write!(f, "Server already running!"),
            ServerEvent::Stopped => write!(f, "Server stopped"),
            ServerEvent::NotRunning => write!(f, "Server not running"),
            ServerEvent::ClientConnected {
                authenticated: true,
                ..
            } => write!(f, "Client connected (authenticated)"),
            ServerEvent::ClientConnected {
                authenticated: false,
                ..
            } => write!(f, "Client connected (no password)"),
            ServerEvent::ClientDisconnected { .. } => write!(f, "Client disconnected ❌"),
            ServerEvent::AuthFailed { .. } => write!(f, "Client rejected (wrong password)"),
            ServerEvent::CommandError { detail } => {
                write!(f, "Error parsing/acting on message: {detail}")
            }
            ServerEvent::AcceptError { detail } => {
                write!(f, "Connection accept failed: {detail}")
            }
        }
    }
}

// ── Observer seam ─────────────────────────────────────────────────────────────

/// Receives every [`ServerEvent`] the relay produces.
///
/// Implementations must return quickly and must not panic; the server
/// calls `on_event` inline from the accept loop and from session tasks.
pub trait LogSink: Send + Sync {
    /// Delivers one event.  Infallible by design: there is nothing useful
    /// a session could do about a failed log line.
    fn on_event(&self, event: &ServerEvent);
}

/// Forwards events to the `tracing` subscriber.
///
/// The default sink for the headless CLI: session errors surface at `warn`,
/// everything else at `info`.
#[derive(Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn on_event(&self, event: &ServerEvent) {
        match event {
            ServerEvent::CommandError { .. }
            | ServerEvent::AcceptError { .. }
            | ServerEvent::AuthFailed { .. } => tracing::warn!("{event}"),
            _ => tracing::info!("{event}"),
        }
    }
}

/// Forwards events over an unbounded channel to a consumer task.
///
/// This is the message-passing decoupling for control surfaces that live
/// on another thread or task (a UI event loop, a test harness).  The
/// unbounded sender makes `on_event` non-blocking; if the receiver has
/// been dropped the event is discarded, never surfaced as an error.
#[derive(Debug, Clone)]
pub struct ChannelLogSink {
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl ChannelLogSink {
    /// Creates the sink together with the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl LogSink for ChannelLogSink {
    fn on_event(&self, event: &ServerEvent) {
        // A closed receiver means the control surface went away; the server
        // keeps running regardless.
        let _ = self.tx.send(event.clone());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
