//! Domain layer for relay-server.
//!
//! Pure business-logic types with no dependencies on sockets, OS APIs, or
//! the async runtime:
//!
//! - Server configuration (bind address, optional password)
//! - The structured event vocabulary and its human-readable log lines
//! - The `LogSink` observer seam through which every lifecycle and session
//!   event reaches the embedding control surface

pub mod config;
pub mod events;

// Re-export the most commonly needed types at the domain module boundary.
pub use config::{ServerConfig, MIN_PASSWORD_LEN};
pub use events::{ChannelLogSink, LogSink, ServerEvent, TracingLogSink};
