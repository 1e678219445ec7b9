//! JSON command types for the client-facing WebSocket protocol.
//!
//! # JSON discriminant
//!
//! Every command is a JSON object with a `"type"` field that identifies the
//! variant.  All other fields are flattened into the same object:
//!
//! ```json
//! {"type":"MOVE","dx":10,"dy":-5}
//! {"type":"CLICK"}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles this automatically:
//! an unknown `type` value or a missing `type` field is a deserialization
//! error, which the session layer treats as a recoverable parse failure
//! (the session stays open).
//!
//! # Why floating-point deltas?
//!
//! Clients report touch-drag deltas, which are fractional after the client's
//! own scaling.  JSON integers deserialize into `f64` fields without loss,
//! so `"dx":10` and `"dx":10.0` are equivalent on the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error type ────────────────────────────────────────────────────────────────

/// Error produced when an inbound text frame cannot be parsed as a command.
///
/// This is a recoverable, per-message failure: the session logs it, echoes
/// the raw message back, and keeps reading.  It never terminates the
/// connection.
#[derive(Debug, Error)]
pub enum CommandParseError {
    /// The frame was not a JSON object with a recognized `type`, or a
    /// required field was missing or of the wrong type.
    #[error("malformed command: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ── Mouse button ──────────────────────────────────────────────────────────────

/// Mouse buttons the relay can press.
///
/// The wire `CLICK` command carries no button field today — clients only
/// ever request a left click — so [`MouseButton::Left`] is the serde
/// default.  The enum exists so the dispatch path and the pointer sinks
/// stay button-agnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// The primary (left) button.
    #[default]
    Left,
}

// ── Command ───────────────────────────────────────────────────────────────────

/// All commands a client can send to the relay over WebSocket.
///
/// # Serde representation
///
/// ```json
/// {"type":"MOVE","dx":10.0,"dy":-5.0}
/// {"type":"CLICK"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
// `tag = "type"` means serde looks for a `"type"` field in the JSON object
// to determine which enum variant to use when deserializing.
#[serde(tag = "type")]
pub enum Command {
    /// Move the pointer by a relative delta.
    ///
    /// The server reads the pointer's current absolute position, scales the
    /// delta by the fixed sensitivity factor, and writes the sum back as the
    /// new absolute position.  See [`crate::domain::motion::apply_delta`].
    #[serde(rename = "MOVE")]
    Move {
        /// Horizontal delta in client units (positive = right).
        dx: f64,
        /// Vertical delta in client units (positive = down).
        dy: f64,
    },

    /// Press and release a mouse button at the current pointer position.
    ///
    /// The command carries no coordinates: the click lands wherever the
    /// pointer currently is.
    #[serde(rename = "CLICK")]
    Click {
        /// Which button to click.  Absent on the wire today; defaults to left.
        #[serde(default)]
        button: MouseButton,
    },
}

impl Command {
    /// Parses one inbound text frame into a [`Command`].
    ///
    /// # Errors
    ///
    /// Returns [`CommandParseError::Malformed`] for non-JSON input, an
    /// unknown or missing `type`, or missing/ill-typed `dx`/`dy` fields.
    pub fn parse(raw: &str) -> Result<Self, CommandParseError> {
        Ok(serde_json::from_str(raw)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
