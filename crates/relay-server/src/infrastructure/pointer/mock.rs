//! Mock pointer sink for unit and integration testing.
//!
//! # Why a mock sink?
//!
//! The real sinks (`X11PointerSink`, `WindowsPointerSink`,
//! `MacosPointerSink`) make OS API calls that:
//!
//! - Require a desktop session to run.
//! - Actually move the cursor and click on the test machine.
//! - Cannot be observed directly from Rust test code.
//!
//! `MockPointerSink` replaces the OS with an in-memory virtual pointer: it
//! holds a position that `move_to` updates and `position` reports, so a
//! test can drive a whole session and then assert on the final coordinates
//! and the recorded call history.
//!
//! # `fail` flag
//!
//! Flip `set_fail(true)` to make every subsequent call return
//! `PointerError::Platform`, which exercises the error-containment paths
//! without a broken OS.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use relay_core::MouseButton;

use crate::application::pointer::{PointerError, PointerSink};

/// A pointer sink that records all calls against a virtual position.
///
/// All records live behind `Mutex`/atomic fields so tests can share the
/// sink across tasks via `Arc`.
#[derive(Debug, Default)]
pub struct MockPointerSink {
    /// The virtual pointer position reported by `position`.
    pos: Mutex<(f64, f64)>,
    /// Every (x, y) passed to `move_to`, in call order.
    moves: Mutex<Vec<(f64, f64)>>,
    /// Every button passed to `click`, in call order.
    clicks: Mutex<Vec<MouseButton>>,
    /// Number of `position` reads served.
    position_reads: AtomicUsize,
    /// When `true`, every call returns `PointerError::Platform`.
    fail: AtomicBool,
}

impl MockPointerSink {
    /// Creates a mock with the virtual pointer at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock with the virtual pointer at `(x, y)`.
    pub fn at(x: f64, y: f64) -> Self {
        let sink = Self::default();
        *sink.pos.lock().unwrap() = (x, y);
        sink
    }

    /// The current virtual position.
    pub fn current_position(&self) -> (f64, f64) {
        *self.pos.lock().unwrap()
    }

    /// All `move_to` calls recorded so far.
    pub fn moves(&self) -> Vec<(f64, f64)> {
        self.moves.lock().unwrap().clone()
    }

    /// All `click` calls recorded so far.
    pub fn clicks(&self) -> Vec<MouseButton> {
        self.clicks.lock().unwrap().clone()
    }

    /// How many times `position` has been read.
    pub fn position_reads(&self) -> usize {
        self.position_reads.load(Ordering::Relaxed)
    }

    /// Makes every subsequent call fail (or succeed again with `false`).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    fn check_fail(&self) -> Result<(), PointerError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(PointerError::Platform("mock failure".to_string()));
        }
        Ok(())
    }
}

impl PointerSink for MockPointerSink {
    /// Reports the virtual position, or fails if the flag is set.
    fn position(&self) -> Result<(f64, f64), PointerError> {
        self.check_fail()?;
        self.position_reads.fetch_add(1, Ordering::Relaxed);
        Ok(*self.pos.lock().unwrap())
    }

    /// Records and applies the move, or fails if the flag is set.
    fn move_to(&self, x: f64, y: f64) -> Result<(), PointerError> {
        self.check_fail()?;
        *self.pos.lock().unwrap() = (x, y);
        self.moves.lock().unwrap().push((x, y));
        Ok(())
    }

    /// Records the click, or fails if the flag is set.
    fn click(&self, button: MouseButton) -> Result<(), PointerError> {
        self.check_fail()?;
        self.clicks.lock().unwrap().push(button);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_reports_the_virtual_position() {
        let sink = MockPointerSink::at(640.0, 480.0);
        assert_eq!(sink.position().unwrap(), (640.0, 480.0));
        assert_eq!(sink.position_reads(), 1);
    }

    #[test]
    fn test_move_to_updates_position_and_records_call() {
        // Arrange
        let sink = MockPointerSink::new();

        // Act
        sink.move_to(10.5, -3.0).unwrap();

        // Assert
        assert_eq!(sink.current_position(), (10.5, -3.0));
        assert_eq!(sink.moves(), vec![(10.5, -3.0)]);
    }

    #[test]
    fn test_click_records_button() {
        let sink = MockPointerSink::new();
        sink.click(MouseButton::Left).unwrap();
        assert_eq!(sink.clicks(), vec![MouseButton::Left]);
    }

    #[test]
    fn test_fail_flag_makes_all_calls_error() {
        // Arrange
        let sink = MockPointerSink::new();
        sink.set_fail(true);

        // Assert
        assert!(sink.position().is_err());
        assert!(sink.move_to(0.0, 0.0).is_err());
        assert!(sink.click(MouseButton::Left).is_err());

        // Recovery: clearing the flag restores normal behavior
        sink.set_fail(false);
        assert!(sink.position().is_ok());
    }
}
