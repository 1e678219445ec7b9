//! relay-server library crate.
//!
//! This crate implements the pointer relay: a WebSocket server that applies
//! remote cursor-movement and click commands to the local pointer device.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Client (JSON over WebSocket)
//!         ↕
//! [relay-server]
//!   ├── domain/           Pure types: ServerConfig, ServerEvent, LogSink
//!   ├── application/      Session state machine, command dispatch, PointerSink trait
//!   └── infrastructure/
//!         ├── ws_server/  Accept loop + ServerHandle (tokio-tungstenite)
//!         ├── control/    Start/Stop surface for an embedding control panel
//!         └── pointer/    Platform pointer sinks (X11, Win32, Core Graphics, mock)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async code (the `ChannelLogSink` carries a
//!   channel sender but never awaits).
//! - `application` depends on `domain` and `relay-core` only.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tungstenite`, and owns every socket and OS call.
//!
//! The session protocol itself — authentication handshake, command
//! dispatch, echo behavior — lives entirely in the application layer, so
//! it can be tested without opening a single socket.

/// Domain layer: configuration, server events, and the log-sink seam.
pub mod domain;

/// Application layer: session state machine and pointer dispatch.
pub mod application;

/// Infrastructure layer: WebSocket server, control surface, pointer sinks.
pub mod infrastructure;
