//! # relay-core
//!
//! Shared library for the pointer relay containing the client command
//! protocol, the literal server reply strings, and the pointer-motion
//! arithmetic.
//!
//! This crate is used by the relay server and by any native client that
//! wants to speak the protocol.  It has zero dependencies on OS APIs,
//! async runtimes, or network sockets.
//!
//! # Protocol overview
//!
//! The relay is a remote-input service: a client (typically a phone app)
//! sends cursor-movement and click commands over a persistent WebSocket
//! connection, and the server applies them to the local pointer device.
//!
//! This crate defines:
//!
//! - **`protocol`** – What travels over the wire.  Client commands are JSON
//!   text frames with a `"type"` discriminant (`MOVE` / `CLICK`); server
//!   replies are fixed literal strings plus an `Echo:` line per inbound
//!   message.
//!
//! - **`domain`** – Pure business logic with no I/O.  The important piece
//!   is the motion arithmetic: relative deltas are scaled by a fixed
//!   sensitivity factor and added to the pointer's current absolute
//!   position.

// Declare the two top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/protocol/mod.rs).
pub mod domain;
pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `relay_core::Command` instead of `relay_core::protocol::command::Command`.
pub use domain::motion::{apply_delta, SENSITIVITY};
pub use protocol::command::{Command, CommandParseError, MouseButton};
