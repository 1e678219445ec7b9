//! Windows pointer sink.
//!
//! Uses the Win32 cursor APIs:
//!
//! - `GetCursorPos` — read the pointer's absolute screen coordinates.
//! - `SetCursorPos` — move the pointer to absolute coordinates.
//! - `SendInput`    — inject a button-down/button-up pair at the current
//!   position (the receiving application cannot distinguish it from a
//!   physical click).
//!
//! All three calls are thread-safe at the OS level, so the sink carries no
//! state and needs no locking.

use std::mem;

use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEINPUT,
};
use windows::Win32::UI::WindowsAndMessaging::{GetCursorPos, SetCursorPos};

use relay_core::MouseButton;

use crate::application::pointer::{PointerError, PointerSink};

/// Win32 implementation of [`PointerSink`].
#[derive(Debug, Default)]
pub struct WindowsPointerSink;

impl WindowsPointerSink {
    /// Creates the sink.  Construction cannot fail on Windows; the cursor
    /// APIs are always available in an interactive session.
    pub fn new() -> Self {
        Self
    }
}

impl PointerSink for WindowsPointerSink {
    fn position(&self) -> Result<(f64, f64), PointerError> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }
            .map_err(|e| PointerError::Platform(format!("GetCursorPos: {e}")))?;
        Ok((f64::from(point.x), f64::from(point.y)))
    }

    fn move_to(&self, x: f64, y: f64) -> Result<(), PointerError> {
        // Out-of-range coordinates are handed to the OS unmodified; Windows
        // clamps to the virtual desktop on its own.
        unsafe { SetCursorPos(x.round() as i32, y.round() as i32) }
            .map_err(|e| PointerError::Platform(format!("SetCursorPos: {e}")))
    }

    fn click(&self, button: MouseButton) -> Result<(), PointerError> {
        let (down_flag, up_flag) = match button {
            MouseButton::Left => (MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP),
        };

        let make_input = |flags| INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };

        let inputs = [make_input(down_flag), make_input(up_flag)];
        let sent = unsafe { SendInput(&inputs, mem::size_of::<INPUT>() as i32) };
        if sent != inputs.len() as u32 {
            // SendInput reports partial injection when input is blocked
            // (e.g., by a UIPI-elevated foreground window).
            return Err(PointerError::Platform(format!(
                "SendInput injected {sent} of {} events",
                inputs.len()
            )));
        }
        Ok(())
    }
}
