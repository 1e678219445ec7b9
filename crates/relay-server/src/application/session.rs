//! SessionHandler: the per-connection protocol state machine.
//!
//! One `SessionHandler` exists per client connection.  It is deliberately
//! free of I/O: the WebSocket loop in the infrastructure layer feeds it
//! inbound text frames and transport signals, and each call returns a
//! [`Turn`] describing what to send, what to log, and whether the
//! connection should close.  This keeps the entire protocol — handshake,
//! single-attempt authentication, command dispatch, echo behavior —
//! testable without sockets.
//!
//! # State machine
//!
//! ```text
//!                    password configured          credential matches
//! connection accept ────────────────────► AwaitingPassword ────────► Authenticated
//!        │                                        │                        │
//!        │ no password                            │ mismatch               │ transport
//!        └───────────────► Authenticated          ▼                        ▼ closed
//!                                               Closed ◄─────────────── Closed
//! ```
//!
//! Authentication happens at most once, and only when a password is
//! configured.  A credential mismatch closes the session immediately —
//! there is no retry.  Once authenticated, command-level failures
//! (malformed JSON, unknown type, device errors) are contained: they
//! produce a log event and the session keeps reading.  The only paths to
//! `Closed` are the auth mismatch and a transport-level disconnect.

use std::net::SocketAddr;

use relay_core::protocol::replies;
use relay_core::Command;

use crate::application::dispatch::CommandDispatcher;
use crate::domain::events::ServerEvent;

// ── Turn: the outcome of one protocol step ────────────────────────────────────

/// Whether the connection stays open after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep reading from the client.
    Continue,
    /// Close the connection after sending the turn's replies.
    Close,
}

/// Everything one protocol step asks the transport layer to do.
#[derive(Debug)]
pub struct Turn {
    /// Text frames to send to the client, in order.
    pub replies: Vec<String>,
    /// Events to deliver to the log sink, in order.
    pub events: Vec<ServerEvent>,
    /// Whether the connection stays open.
    pub disposition: Disposition,
}

impl Turn {
    fn open() -> Self {
        Self {
            replies: Vec::new(),
            events: Vec::new(),
            disposition: Disposition::Continue,
        }
    }

    fn closing() -> Self {
        Self {
            replies: Vec::new(),
            events: Vec::new(),
            disposition: Disposition::Close,
        }
    }
}

// ── Session state ─────────────────────────────────────────────────────────────

/// The authentication state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the client to send the password.  Only entered when a
    /// password is configured.
    AwaitingPassword,
    /// Commands are accepted.
    Authenticated,
    /// The session is over; no further messages are processed.
    Closed,
}

// ── Session handler ───────────────────────────────────────────────────────────

/// Per-connection protocol state machine.
pub struct SessionHandler {
    state: SessionState,
    /// The password clients must present, or `None` when auth is disabled.
    password: Option<String>,
    dispatcher: CommandDispatcher,
    peer: SocketAddr,
}

impl SessionHandler {
    /// Creates the handler for a freshly accepted connection and returns
    /// the greeting turn.
    ///
    /// With a password configured the greeting is the literal prompt
    /// `"Enter password:"` and the session waits for the credential.
    /// Without one, the client is authenticated immediately and told so.
    pub fn connect(
        password: Option<String>,
        dispatcher: CommandDispatcher,
        peer: SocketAddr,
    ) -> (Self, Turn) {
        let mut turn = Turn::open();
        let state = match &password {
            Some(_) => {
                turn.replies.push(replies::PASSWORD_PROMPT.to_string());
                SessionState::AwaitingPassword
            }
            None => {
                turn.replies.push(replies::CONNECTED_NO_PASSWORD.to_string());
                turn.events.push(ServerEvent::ClientConnected {
                    addr: peer,
                    authenticated: false,
                });
                SessionState::Authenticated
            }
        };

        (
            Self {
                state,
                password,
                dispatcher,
                peer,
            },
            turn,
        )
    }

    /// Current state, for tests and diagnostics.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Processes one inbound text frame.
    pub fn on_message(&mut self, raw: &str) -> Turn {
        match self.state {
            SessionState::AwaitingPassword => self.check_credential(raw),
            SessionState::Authenticated => self.handle_command(raw),
            // Defensive: the transport loop stops reading once a turn says
            // Close, so this arm is unreachable in practice.
            SessionState::Closed => Turn::closing(),
        }
    }

    /// Signals that the transport was closed by either side.
    ///
    /// Emits the disconnect event unless the session was already closed by
    /// an authentication failure (the original logs no second line there).
    pub fn on_transport_closed(&mut self) -> Turn {
        let mut turn = Turn::closing();
        if self.state != SessionState::Closed {
            turn.events
                .push(ServerEvent::ClientDisconnected { addr: self.peer });
        }
        self.state = SessionState::Closed;
        turn
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    /// One-shot credential check.  Comparison is byte-for-byte; a mismatch
    /// terminates the session without retry.
    fn check_credential(&mut self, credential: &str) -> Turn {
        // `password` is always Some in this state; `connect` only enters
        // AwaitingPassword when a password is configured.
        let expected = self.password.as_deref().unwrap_or_default();

        if credential.as_bytes() == expected.as_bytes() {
            self.state = SessionState::Authenticated;
            let mut turn = Turn::open();
            turn.replies.push(replies::AUTH_SUCCESS.to_string());
            turn.events.push(ServerEvent::ClientConnected {
                addr: self.peer,
                authenticated: true,
            });
            turn
        } else {
            self.state = SessionState::Closed;
            let mut turn = Turn::closing();
            turn.replies.push(replies::AUTH_FAILED.to_string());
            turn.events.push(ServerEvent::AuthFailed { addr: self.peer });
            turn
        }
    }

    /// Parses and executes one command, then echoes the raw message.
    ///
    /// Failures here are contained: a malformed frame or a device error
    /// produces a log event, the echo still goes out, and the session
    /// keeps reading.
    fn handle_command(&mut self, raw: &str) -> Turn {
        let mut turn = Turn::open();

        let outcome = Command::parse(raw)
            .map_err(|e| e.to_string())
            .and_then(|cmd| self.dispatcher.dispatch(&cmd).map_err(|e| e.to_string()));

        if let Err(detail) = outcome {
            turn.events.push(ServerEvent::CommandError { detail });
        }

        // Unconditional: every inbound message gets exactly one echo,
        // valid or not.
        turn.replies.push(replies::echo(raw));
        turn
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::pointer::PointerSink;
    use crate::infrastructure::pointer::mock::MockPointerSink;

    fn peer() -> SocketAddr {
        "192.168.1.20:40000".parse().unwrap()
    }

    /// Builds a handler plus the mock sink backing its dispatcher.
    fn make_session(password: Option<&str>) -> (SessionHandler, Turn, Arc<MockPointerSink>) {
        let sink = Arc::new(MockPointerSink::at(100.0, 100.0));
        let dispatcher = CommandDispatcher::new(Arc::clone(&sink) as Arc<dyn PointerSink>);
        let (handler, greeting) =
            SessionHandler::connect(password.map(String::from), dispatcher, peer());
        (handler, greeting, sink)
    }

    // ── Greeting ──────────────────────────────────────────────────────────────

    #[test]
    fn test_connect_with_password_prompts_and_waits() {
        // Arrange / Act
        let (handler, greeting, _) = make_session(Some("secret1"));

        // Assert: prompt sent, no connect event yet, session not authenticated
        assert_eq!(handler.state(), SessionState::AwaitingPassword);
        assert_eq!(greeting.replies, vec!["Enter password:"]);
        assert!(greeting.events.is_empty());
        assert_eq!(greeting.disposition, Disposition::Continue);
    }

    #[test]
    fn test_connect_without_password_authenticates_immediately() {
        let (handler, greeting, _) = make_session(None);

        assert_eq!(handler.state(), SessionState::Authenticated);
        assert_eq!(greeting.replies, vec!["Connected (no password required)"]);
        assert_eq!(
            greeting.events,
            vec![ServerEvent::ClientConnected {
                addr: peer(),
                authenticated: false,
            }]
        );
    }

    // ── Authentication ────────────────────────────────────────────────────────

    #[test]
    fn test_correct_password_authenticates_once() {
        // Arrange
        let (mut handler, _, _) = make_session(Some("secret1"));

        // Act
        let turn = handler.on_message("secret1");

        // Assert
        assert_eq!(handler.state(), SessionState::Authenticated);
        assert_eq!(turn.replies, vec!["Authentication successful ✅"]);
        assert_eq!(
            turn.events,
            vec![ServerEvent::ClientConnected {
                addr: peer(),
                authenticated: true,
            }]
        );
        assert_eq!(turn.disposition, Disposition::Continue);
    }

    #[test]
    fn test_wrong_password_closes_without_retry() {
        // Arrange
        let (mut handler, _, _) = make_session(Some("secret1"));

        // Act
        let turn = handler.on_message("wrong");

        // Assert: failure reply, session closed, one auth-failed event
        assert_eq!(handler.state(), SessionState::Closed);
        assert_eq!(turn.replies, vec!["Authentication failed ❌"]);
        assert_eq!(turn.events, vec![ServerEvent::AuthFailed { addr: peer() }]);
        assert_eq!(turn.disposition, Disposition::Close);
    }

    #[test]
    fn test_password_comparison_is_byte_exact() {
        // Case differences and surrounding whitespace must both fail.
        for wrong in ["Secret1", "secret1 ", " secret1"] {
            let (mut handler, _, _) = make_session(Some("secret1"));
            let turn = handler.on_message(wrong);
            assert_eq!(
                turn.disposition,
                Disposition::Close,
                "credential {wrong:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_credential_is_not_processed_as_a_command() {
        // A credential that happens to be valid JSON must not reach the
        // pointer device.
        let (mut handler, _, sink) = make_session(Some(r#"{"type":"CLICK"}"#));

        let turn = handler.on_message(r#"{"type":"CLICK"}"#);

        assert_eq!(turn.replies, vec!["Authentication successful ✅"]);
        assert!(sink.clicks().is_empty(), "credential must not click");
    }

    // ── Command loop ──────────────────────────────────────────────────────────

    #[test]
    fn test_move_command_applies_scaled_delta_and_echoes() {
        // Arrange: authenticated session over a device at (100, 100)
        let (mut handler, _, sink) = make_session(None);
        let raw = r#"{"type":"MOVE","dx":10,"dy":-5}"#;

        // Act
        let turn = handler.on_message(raw);

        // Assert: pointer moved by (+8, -4), echo is verbatim, no error event
        assert_eq!(sink.current_position(), (108.0, 96.0));
        assert_eq!(turn.replies, vec![format!("Echo: {raw}")]);
        assert!(turn.events.is_empty());
        assert_eq!(turn.disposition, Disposition::Continue);
    }

    #[test]
    fn test_click_command_clicks_and_echoes() {
        let (mut handler, _, sink) = make_session(None);
        let raw = r#"{"type":"CLICK"}"#;

        let turn = handler.on_message(raw);

        assert_eq!(sink.clicks().len(), 1);
        assert_eq!(turn.replies, vec![format!("Echo: {raw}")]);
    }

    #[test]
    fn test_move_sequence_accumulates_scaled_deltas() {
        let (mut handler, _, sink) = make_session(None);

        handler.on_message(r#"{"type":"MOVE","dx":10,"dy":0}"#);
        handler.on_message(r#"{"type":"MOVE","dx":10,"dy":0}"#);
        handler.on_message(r#"{"type":"MOVE","dx":0,"dy":-10}"#);

        // 100 + 2·(10·0.8) = 116; 100 − 10·0.8 = 92
        assert_eq!(sink.current_position(), (116.0, 92.0));
    }

    #[test]
    fn test_malformed_json_logs_error_and_keeps_session_open() {
        // Arrange
        let (mut handler, _, _) = make_session(None);

        // Act
        let turn = handler.on_message("not json");

        // Assert: one error event, one echo, session still authenticated
        assert_eq!(turn.events.len(), 1);
        assert!(matches!(turn.events[0], ServerEvent::CommandError { .. }));
        assert_eq!(turn.replies, vec!["Echo: not json"]);
        assert_eq!(handler.state(), SessionState::Authenticated);
    }

    #[test]
    fn test_unknown_command_type_logs_error_and_keeps_session_open() {
        let (mut handler, _, sink) = make_session(None);
        let raw = r#"{"type":"SCROLL","dy":120}"#;

        let turn = handler.on_message(raw);

        assert!(matches!(turn.events[0], ServerEvent::CommandError { .. }));
        assert_eq!(turn.replies, vec![format!("Echo: {raw}")]);
        assert_eq!(handler.state(), SessionState::Authenticated);
        assert!(sink.moves().is_empty());
    }

    #[test]
    fn test_device_failure_is_contained_and_still_echoes() {
        // Arrange: the pointer device starts failing
        let (mut handler, _, sink) = make_session(None);
        sink.set_fail(true);
        let raw = r#"{"type":"MOVE","dx":1,"dy":1}"#;

        // Act
        let turn = handler.on_message(raw);

        // Assert: contained as a command error, echo still sent
        assert!(matches!(turn.events[0], ServerEvent::CommandError { .. }));
        assert_eq!(turn.replies, vec![format!("Echo: {raw}")]);
        assert_eq!(handler.state(), SessionState::Authenticated);
    }

    #[test]
    fn test_every_message_produces_exactly_one_echo() {
        let (mut handler, _, _) = make_session(None);

        for raw in [
            r#"{"type":"MOVE","dx":1,"dy":1}"#,
            r#"{"type":"CLICK"}"#,
            "garbage",
            r#"{"type":"NOPE"}"#,
            "",
        ] {
            let turn = handler.on_message(raw);
            assert_eq!(
                turn.replies,
                vec![format!("Echo: {raw}")],
                "message {raw:?} must produce exactly one echo"
            );
        }
    }

    // ── Disconnect ────────────────────────────────────────────────────────────

    #[test]
    fn test_transport_close_emits_disconnect_event_once() {
        // Arrange
        let (mut handler, _, _) = make_session(None);

        // Act
        let turn = handler.on_transport_closed();

        // Assert
        assert_eq!(handler.state(), SessionState::Closed);
        assert_eq!(
            turn.events,
            vec![ServerEvent::ClientDisconnected { addr: peer() }]
        );

        // A second close signal is silent.
        let again = handler.on_transport_closed();
        assert!(again.events.is_empty());
    }

    #[test]
    fn test_transport_close_after_auth_failure_is_silent() {
        // The auth-failure turn already closed the session; tearing down
        // the socket afterwards must not log a disconnect line.
        let (mut handler, _, _) = make_session(Some("secret1"));
        handler.on_message("wrong");

        let turn = handler.on_transport_closed();

        assert!(turn.events.is_empty());
    }

    #[test]
    fn test_closed_session_ignores_further_messages() {
        let (mut handler, _, sink) = make_session(Some("secret1"));
        handler.on_message("wrong");

        let turn = handler.on_message(r#"{"type":"CLICK"}"#);

        assert_eq!(turn.disposition, Disposition::Close);
        assert!(turn.replies.is_empty());
        assert!(sink.clicks().is_empty(), "closed session must not dispatch");
    }
}
