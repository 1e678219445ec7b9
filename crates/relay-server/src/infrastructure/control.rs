//! RelayControl: the start/stop surface for an embedding control panel.
//!
//! A control panel (desktop UI, tray icon, test harness) talks to the relay
//! through this object and the [`LogSink`] it was constructed with.  The
//! panel never touches sockets or sessions; it calls `start`/`stop` and
//! renders whatever events arrive at its sink.  That keeps the coupling to
//! one trait object and two async methods, so the panel can live on any
//! thread or task as long as it can reach the Tokio runtime.
//!
//! # Idempotency
//!
//! Both methods are safe to call at any time, in any state:
//!
//! - `start` while running logs "Server already running!" and changes
//!   nothing.
//! - `stop` while stopped logs "Server not running" (distinct from the
//!   "Server stopped" line a real shutdown produces) and changes nothing.
//!
//! Neither case is an error — a double-click on a UI button is not a fault.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::application::pointer::PointerSink;
use crate::domain::config::{ServerConfig, MIN_PASSWORD_LEN};
use crate::domain::events::{LogSink, ServerEvent};
use crate::infrastructure::ws_server::{self, ServerHandle, StartError};

/// Error type for control-surface operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The configured password is non-empty but shorter than the minimum.
    /// The server is not started.
    #[error("password must be at least {MIN_PASSWORD_LEN} characters, or empty for no authentication")]
    PasswordTooShort,

    /// The listener could not be bound.
    #[error(transparent)]
    Start(#[from] StartError),
}

/// Owns at most one running server on behalf of a control panel.
pub struct RelayControl {
    pointer: Arc<dyn PointerSink>,
    log: Arc<dyn LogSink>,
    handle: Option<ServerHandle>,
}

impl RelayControl {
    /// Creates the control surface.  Nothing is started yet.
    pub fn new(pointer: Arc<dyn PointerSink>, log: Arc<dyn LogSink>) -> Self {
        Self {
            pointer,
            log,
            handle: None,
        }
    }

    /// `true` while a server started through this control is running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// The bound address of the running server, if any.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.handle.as_ref().map(ServerHandle::local_addr)
    }

    /// Starts the server on `host:port`.
    ///
    /// An empty `password` disables authentication.  When a server is
    /// already running this logs "Server already running!" and returns
    /// `Ok` without touching it.
    ///
    /// # Errors
    ///
    /// [`ControlError::PasswordTooShort`] for a 1–5 character password
    /// (checked before any socket work), or [`ControlError::Start`] when
    /// the bind fails.
    pub async fn start(
        &mut self,
        host: &str,
        port: u16,
        password: &str,
    ) -> Result<(), ControlError> {
        if self.handle.is_some() {
            self.log.on_event(&ServerEvent::AlreadyRunning);
            return Ok(());
        }

        let config = ServerConfig::new(host, port).with_password(password);
        if !config.password_rule_ok() {
            return Err(ControlError::PasswordTooShort);
        }

        let handle =
            ws_server::start(config, Arc::clone(&self.pointer), Arc::clone(&self.log)).await?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Stops the running server, if any.
    ///
    /// Waits for the accept loop and all sessions to finish.  When nothing
    /// is running this logs "Server not running" and returns.
    pub async fn stop(&mut self) {
        match self.handle.take() {
            Some(handle) => handle.stop().await,
            None => self.log.on_event(&ServerEvent::NotRunning),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
