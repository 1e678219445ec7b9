//! Platform-specific pointer sink implementations.
//!
//! The correct implementation is selected at compile time via
//! `#[cfg(target_os = ...)]`.  The mock is always available for tests and
//! headless development.

use std::sync::Arc;

use crate::application::pointer::{PointerError, PointerSink};

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

/// Builds the pointer sink for the current platform.
///
/// # Errors
///
/// Returns [`PointerError::Unavailable`] when no pointer device can be
/// reached (no display server, unsupported OS).
pub fn platform_pointer_sink() -> Result<Arc<dyn PointerSink>, PointerError> {
    #[cfg(target_os = "linux")]
    {
        Ok(Arc::new(linux::X11PointerSink::new()?))
    }

    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsPointerSink::new()))
    }

    #[cfg(target_os = "macos")]
    {
        Ok(Arc::new(macos::MacosPointerSink::new()))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        Err(PointerError::Unavailable)
    }
}
