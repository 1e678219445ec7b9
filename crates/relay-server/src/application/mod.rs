//! Application layer for relay-server.
//!
//! The application layer owns the session protocol: it knows *what* each
//! inbound message means and what must happen in response, but delegates
//! *how* — sockets, OS input injection — to the infrastructure layer.
//!
//! # Responsibilities
//!
//! - The per-connection session state machine (handshake, authentication,
//!   command loop, echo behavior)
//! - Dispatching decoded commands to the [`pointer::PointerSink`] seam
//! - Defining the `PointerError` type for device-level failures
//!
//! # What does NOT belong here?
//!
//! - Accepting connections or reading WebSocket frames (infrastructure)
//! - Platform input APIs (infrastructure)
//! - Configuration parsing (main.rs)

pub mod dispatch;
pub mod pointer;
pub mod session;

pub use dispatch::CommandDispatcher;
pub use pointer::{PointerError, PointerSink};
pub use session::{Disposition, SessionHandler, SessionState, Turn};
