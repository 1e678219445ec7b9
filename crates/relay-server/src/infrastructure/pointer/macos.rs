//! macOS pointer sink.
//!
//! Uses Core Graphics (Quartz) events:
//!
//! - `CGEvent::new` + `location()` — read the pointer's absolute position.
//! - A posted `MouseMoved` event — move the pointer.
//! - A posted `LeftMouseDown`/`LeftMouseUp` pair — click.
//!
//! Events are posted to the HID event tap, which is the same injection
//! point the window server uses for real hardware.  The process needs the
//! Accessibility permission (System Settings → Privacy & Security);
//! without it, posted events are silently dropped by the OS.

use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

use relay_core::MouseButton;

use crate::application::pointer::{PointerError, PointerSink};

/// Core Graphics implementation of [`PointerSink`].
///
/// Event sources are cheap to create, so the sink builds one per call
/// rather than caching a non-`Sync` handle.
#[derive(Debug, Default)]
pub struct MacosPointerSink;

impl MacosPointerSink {
    /// Creates the sink.
    pub fn new() -> Self {
        Self
    }

    fn event_source() -> Result<CGEventSource, PointerError> {
        CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| PointerError::Platform("CGEventSource creation failed".to_string()))
    }
}

impl PointerSink for MacosPointerSink {
    fn position(&self) -> Result<(f64, f64), PointerError> {
        let source = Self::event_source()?;
        // An empty event snapshots the current HID state, including the
        // pointer location.
        let event = CGEvent::new(source)
            .map_err(|_| PointerError::Platform("CGEvent creation failed".to_string()))?;
        let location = event.location();
        Ok((location.x, location.y))
    }

    fn move_to(&self, x: f64, y: f64) -> Result<(), PointerError> {
        let source = Self::event_source()?;
        let event = CGEvent::new_mouse_event(
            source,
            CGEventType::MouseMoved,
            CGPoint::new(x, y),
            CGMouseButton::Left,
        )
        .map_err(|_| PointerError::Platform("CGEvent mouse-move creation failed".to_string()))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), PointerError> {
        let (down_type, up_type, cg_button) = match button {
            MouseButton::Left => (
                CGEventType::LeftMouseDown,
                CGEventType::LeftMouseUp,
                CGMouseButton::Left,
            ),
        };

        let (x, y) = self.position()?;
        let point = CGPoint::new(x, y);

        for event_type in [down_type, up_type] {
            let source = Self::event_source()?;
            let event = CGEvent::new_mouse_event(source, event_type, point, cg_button)
                .map_err(|_| {
                    PointerError::Platform("CGEvent mouse-button creation failed".to_string())
                })?;
            event.post(CGEventTapLocation::HID);
        }
        Ok(())
    }
}
