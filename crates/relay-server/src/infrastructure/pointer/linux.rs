//! Linux X11 pointer sink.
//!
//! Talks to the X server through core Xlib:
//!
//! - `XQueryPointer` — read the pointer's absolute root-window coordinates.
//! - `XWarpPointer`  — move the pointer to absolute coordinates.
//! - `XSendEvent`    — deliver synthetic `ButtonPress`/`ButtonRelease`
//!   events to the window under the pointer.
//!
//! # Why XSendEvent rather than XTest?
//!
//! The XTest extension (`XTestFakeButtonEvent`) produces clicks that are
//! indistinguishable from hardware input and is the first choice when
//! `libXtst` development files are present at build time.  Core Xlib is
//! universally available, so clicks here are synthesized with `XSendEvent`
//! targeting the deepest window under the pointer.  Toolkits that check
//! the `send_event` flag may ignore these events; that is a documented
//! limitation of a libX11-only build.
//!
//! # Threading
//!
//! Xlib display connections are not thread-safe.  `XInitThreads` is called
//! before the connection is opened, and every call goes through an internal
//! mutex so concurrent sessions cannot corrupt the connection.  The mutex
//! serializes individual libX11 calls only — it does not order whole
//! read-move sequences across sessions, which remain free to interleave.
//!
//! # Permissions
//!
//! The process must have access to the X display.  If the `DISPLAY`
//! environment variable is unset or the X server is unreachable,
//! construction fails with `PointerError::Unavailable`.

use std::os::raw::{c_int, c_uint};
use std::ptr;
use std::sync::Mutex;

use x11::xlib;

use relay_core::MouseButton;

use crate::application::pointer::{PointerError, PointerSink};

// ── Display connection ────────────────────────────────────────────────────────

/// Owned Xlib display pointer.
///
/// Wrapped in a newtype so it can be marked `Send`: the raw pointer may
/// move between session tasks because every use is serialized by the
/// sink's mutex.
struct DisplayConn(*mut xlib::Display);

unsafe impl Send for DisplayConn {}

/// Pointer state the click path needs in one shot: absolute root
/// coordinates, window-relative coordinates, and the target window.
struct PointerQuery {
    root: xlib::Window,
    target: xlib::Window,
    root_x: c_int,
    root_y: c_int,
    win_x: c_int,
    win_y: c_int,
}

// ── Sink ──────────────────────────────────────────────────────────────────────

/// X11 implementation of [`PointerSink`].
pub struct X11PointerSink {
    conn: Mutex<DisplayConn>,
}

impl X11PointerSink {
    /// Opens a connection to the display named by `DISPLAY`.
    ///
    /// # Errors
    ///
    /// Returns [`PointerError::Unavailable`] if no X server can be reached.
    pub fn new() -> Result<Self, PointerError> {
        let display = unsafe {
            xlib::XInitThreads();
            xlib::XOpenDisplay(ptr::null())
        };
        if display.is_null() {
            return Err(PointerError::Unavailable);
        }
        Ok(Self {
            conn: Mutex::new(DisplayConn(display)),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, DisplayConn>, PointerError> {
        self.conn
            .lock()
            .map_err(|_| PointerError::Platform("display connection lock poisoned".to_string()))
    }

    /// Queries the pointer, descending from the root window to the deepest
    /// child that contains it.  The descent gives `XSendEvent` a target
    /// that actually receives button events; the root coordinates are the
    /// absolute position.
    fn query_pointer(display: *mut xlib::Display) -> Result<PointerQuery, PointerError> {
        unsafe {
            let root = xlib::XDefaultRootWindow(display);
            let mut target = root;

            let mut root_ret: xlib::Window = 0;
            let mut child: xlib::Window = 0;
            let mut root_x: c_int = 0;
            let mut root_y: c_int = 0;
            let mut win_x: c_int = 0;
            let mut win_y: c_int = 0;
            let mut mask: c_uint = 0;

            loop {
                let on_screen = xlib::XQueryPointer(
                    display,
                    target,
                    &mut root_ret,
                    &mut child,
                    &mut root_x,
                    &mut root_y,
                    &mut win_x,
                    &mut win_y,
                    &mut mask,
                );
                if on_screen == 0 {
                    return Err(PointerError::Platform(
                        "XQueryPointer: pointer is not on this screen".to_string(),
                    ));
                }
                if child == 0 {
                    break;
                }
                target = child;
            }

            Ok(PointerQuery {
                root,
                target,
                root_x,
                root_y,
                win_x,
                win_y,
            })
        }
    }
}

impl Drop for X11PointerSink {
    fn drop(&mut self) {
        if let Ok(conn) = self.conn.get_mut() {
            unsafe {
                xlib::XCloseDisplay(conn.0);
            }
        }
    }
}

impl PointerSink for X11PointerSink {
    fn position(&self) -> Result<(f64, f64), PointerError> {
        let conn = self.lock()?;
        let query = Self::query_pointer(conn.0)?;
        Ok((f64::from(query.root_x), f64::from(query.root_y)))
    }

    fn move_to(&self, x: f64, y: f64) -> Result<(), PointerError> {
        let conn = self.lock()?;
        unsafe {
            let root = xlib::XDefaultRootWindow(conn.0);
            // dest_w = root with src_w = 0 makes the coordinates absolute.
            // Out-of-range values are handed to the server unmodified; it
            // clamps to the screen on its own.
            xlib::XWarpPointer(
                conn.0,
                0,
                root,
                0,
                0,
                0,
                0,
                x.round() as c_int,
                y.round() as c_int,
            );
            xlib::XFlush(conn.0);
        }
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), PointerError> {
        let xbutton: c_uint = match button {
            MouseButton::Left => xlib::Button1,
        };
        let state_mask: c_uint = match button {
            MouseButton::Left => xlib::Button1Mask,
        };

        let conn = self.lock()?;
        let query = Self::query_pointer(conn.0)?;

        unsafe {
            let mut event = xlib::XButtonEvent {
                type_: xlib::ButtonPress,
                serial: 0,
                send_event: xlib::True,
                display: conn.0,
                window: query.target,
                root: query.root,
                subwindow: 0,
                time: xlib::CurrentTime,
                x: query.win_x,
                y: query.win_y,
                x_root: query.root_x,
                y_root: query.root_y,
                state: 0,
                button: xbutton,
                same_screen: xlib::True,
            };

            let mut xevent = xlib::XEvent { button: event };
            if xlib::XSendEvent(
                conn.0,
                query.target,
                xlib::True,
                xlib::ButtonPressMask,
                &mut xevent,
            ) == 0
            {
                return Err(PointerError::Platform(
                    "XSendEvent: button press rejected".to_string(),
                ));
            }

            // The matching release reports the button in `state`, as a real
            // release would.
            event.type_ = xlib::ButtonRelease;
            event.state = state_mask;
            let mut xevent = xlib::XEvent { button: event };
            if xlib::XSendEvent(
                conn.0,
                query.target,
                xlib::True,
                xlib::ButtonReleaseMask,
                &mut xevent,
            ) == 0
            {
                return Err(PointerError::Platform(
                    "XSendEvent: button release rejected".to_string(),
                ));
            }

            xlib::XFlush(conn.0);
        }
        Ok(())
    }
}
