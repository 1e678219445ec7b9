//! CommandDispatcher: translates decoded commands into pointer operations.
//!
//! This use case sits at the application layer and delegates to a
//! [`PointerSink`] trait object for the actual OS-level side effects.
//!
//! # MOVE semantics
//!
//! The pointer's current position is re-read from the device for every
//! MOVE, then the scaled delta is applied on top of it.  The position is
//! never carried over from a previous message, so concurrent pointer
//! motion from other sources composes instead of being overwritten.

use std::sync::Arc;

use relay_core::{apply_delta, Command};

use crate::application::pointer::{PointerError, PointerSink};

/// Applies decoded [`Command`]s to a shared [`PointerSink`].
///
/// Cheap to clone; every session holds one and dispatches sequentially
/// within its own read loop.
#[derive(Clone)]
pub struct CommandDispatcher {
    sink: Arc<dyn PointerSink>,
}

impl CommandDispatcher {
    /// Creates a dispatcher over the given pointer sink.
    pub fn new(sink: Arc<dyn PointerSink>) -> Self {
        Self { sink }
    }

    /// Executes one command against the pointer device.
    ///
    /// # Errors
    ///
    /// Returns [`PointerError`] if the device read or write fails.  The
    /// caller treats this as a recoverable per-message failure.
    pub fn dispatch(&self, command: &Command) -> Result<(), PointerError> {
        match command {
            Command::Move { dx, dy } => {
                // Read-then-write: the current position must come from the
                // device, not from session state.
                let current = self.sink.position()?;
                let (x, y) = apply_delta(current, *dx, *dy);
                self.sink.move_to(x, y)
            }
            Command::Click { button } => self.sink.click(*button),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
