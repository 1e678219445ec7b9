//! Wire protocol for the pointer relay.
//!
//! The transport is a message-oriented, full-duplex WebSocket connection
//! carrying text frames.  Inbound frames are JSON command objects; outbound
//! frames are fixed literal strings (see [`replies`]) plus one `Echo:` line
//! per inbound message.

pub mod command;
pub mod replies;

pub use command::{Command, CommandParseError, MouseButton};
