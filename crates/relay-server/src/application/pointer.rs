//! The pointer-device seam.
//!
//! [`PointerSink`] abstracts the operating system's pointer: read the
//! current absolute position, move it, click it.  Platform implementations
//! live in the infrastructure layer; the application layer only ever talks
//! to the trait, which keeps the session protocol testable without a
//! desktop environment.
//!
//! # Contract
//!
//! - All three operations are synchronous, platform-level calls.
//! - `position` reads the device every time — implementations must not
//!   cache, so motion from other sources (the physical mouse, another
//!   session) is always observed.
//! - No coordinate-range invariant is enforced: out-of-bounds values are
//!   passed through for the platform to clamp or reject as it sees fit.
//! - The device is a single shared resource.  Concurrent sessions may
//!   interleave calls arbitrarily; implementations only need to keep the
//!   underlying library calls memory-safe, not ordered.

use thiserror::Error;

use relay_core::MouseButton;

/// Error type for pointer-device operations.
#[derive(Debug, Error)]
pub enum PointerError {
    /// The OS input call failed.
    #[error("platform error: {0}")]
    Platform(String),

    /// No pointer device is reachable (e.g., no display server).
    #[error("pointer device unavailable")]
    Unavailable,
}

/// Platform-agnostic pointer control.
///
/// Each supported OS provides an implementation in the infrastructure
/// layer; tests use the recording mock.
pub trait PointerSink: Send + Sync {
    /// Reads the pointer's current absolute position from the device.
    fn position(&self) -> Result<(f64, f64), PointerError>;

    /// Moves the pointer to an absolute position.
    fn move_to(&self, x: f64, y: f64) -> Result<(), PointerError>;

    /// Presses and releases `button` at the current pointer position.
    fn click(&self, button: MouseButton) -> Result<(), PointerError>;
}
