//! Infrastructure layer for relay-server.
//!
//! All I/O lives here: the TCP/WebSocket listener, the per-session tasks,
//! and the OS pointer APIs.
//!
//! # Responsibilities
//!
//! - Binding the listener and performing WebSocket upgrade handshakes
//! - Spawning and cancelling per-session Tokio tasks
//! - Moving frames between sockets and the application-layer state machine
//! - The control surface an embedding panel drives (`RelayControl`)
//! - Platform pointer sinks (X11, Win32, Core Graphics) and the mock
//!
//! # What does NOT belong here?
//!
//! - Protocol decisions (application layer)
//! - Message/event type definitions (domain layer and relay-core)
//! - Configuration parsing (main.rs)

pub mod control;
pub mod pointer;
pub mod ws_server;

// Re-export the primary entry points so callers can write
// `infrastructure::start` / `infrastructure::RelayControl`.
pub use control::{ControlError, RelayControl};
pub use pointer::platform_pointer_sink;
pub use ws_server::{start, ServerHandle, StartError};
