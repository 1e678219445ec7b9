//! Literal server→client reply strings.
//!
//! Existing clients match on these strings verbatim, so they are part of the
//! wire protocol and must never be reworded.  Each constant is sent as one
//! WebSocket text frame.

/// Sent immediately after the handshake when a password is configured.
/// The next inbound frame is treated as the credential.
pub const PASSWORD_PROMPT: &str = "Enter password:";

/// Sent when the credential matches the configured password.
pub const AUTH_SUCCESS: &str = "Authentication successful ✅";

/// Sent when the credential does not match; the connection is closed
/// immediately afterwards.  No retry is offered.
pub const AUTH_FAILED: &str = "Authentication failed ❌";

/// Sent immediately after the handshake when no password is configured.
pub const CONNECTED_NO_PASSWORD: &str = "Connected (no password required)";

/// Builds the echo reply for one inbound message.
///
/// Every inbound frame — valid command, malformed JSON, or wrong type —
/// produces exactly one echo containing the original text verbatim.
pub fn echo(raw: &str) -> String {
    format!("Echo: {raw}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
