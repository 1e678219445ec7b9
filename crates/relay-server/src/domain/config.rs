//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production) or
//! from sensible defaults (useful for local development and tests).
//!
//! Configuration is immutable once the server is started: `start` moves the
//! config behind an `Arc` and nothing mutates it afterwards.  Credentials
//! are never persisted to disk; they live only in this struct for the
//! lifetime of the process.

/// Minimum length for a configured password.
///
/// A short password on an unencrypted transport is worse than none at all
/// because it suggests protection that isn't there.  Leave the password
/// empty to disable authentication entirely.  Enforced by the control
/// surface and the CLI, not by the bind path.
pub const MIN_PASSWORD_LEN: usize = 6;

/// All runtime configuration for the relay server.
///
/// # Example
///
/// ```rust
/// use relay_server::domain::ServerConfig;
///
/// // Defaults are suitable for local development:
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.bind_port, 5000);
/// assert!(cfg.required_password().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host or IP address the WebSocket listener binds to.
    ///
    /// `0.0.0.0` accepts connections from any network interface (LAN +
    /// localhost).  Set to `127.0.0.1` to accept only local connections.
    /// Hostnames are allowed; resolution happens at bind time.
    pub bind_host: String,

    /// TCP port the WebSocket listener binds to.
    ///
    /// Port 0 asks the OS for an ephemeral port; the actually-bound port is
    /// available from the server handle after a successful start.
    pub bind_port: u16,

    /// Optional session password.
    ///
    /// `None` or an empty string means clients connect without any
    /// credential exchange.  Comparison against the client credential is
    /// byte-for-byte; no hashing, per the wire protocol.
    pub password: Option<String>,
}

impl ServerConfig {
    /// Creates a config with the given bind address and no password.
    pub fn new(bind_host: impl Into<String>, bind_port: u16) -> Self {
        Self {
            bind_host: bind_host.into(),
            bind_port,
            password: None,
        }
    }

    /// Sets the password, treating empty or whitespace-only input as "no
    /// password" (the original control panel trims the entry field the
    /// same way).
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let trimmed = password.into().trim().to_string();
        self.password = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        };
        self
    }

    /// Returns the password a client must present, or `None` when
    /// authentication is disabled.
    ///
    /// Normalizes the `Some("")` case so callers never have to distinguish
    /// an empty password from an absent one.
    pub fn required_password(&self) -> Option<&str> {
        match self.password.as_deref() {
            Some("") | None => None,
            Some(p) => Some(p),
        }
    }

    /// The `host:port` string handed to the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }

    /// Checks the password rule: a configured password must have at least
    /// [`MIN_PASSWORD_LEN`] characters.
    ///
    /// Returns `false` only for a non-empty password that is too short.
    pub fn password_rule_ok(&self) -> bool {
        match self.required_password() {
            Some(p) => p.chars().count() >= MIN_PASSWORD_LEN,
            None => true,
        }
    }
}

impl Default for ServerConfig {
    /// Returns a `ServerConfig` suitable for local development.
    ///
    /// | Field     | Default   |
    /// |-----------|-----------|
    /// | bind_host | `0.0.0.0` |
    /// | bind_port | `5000`    |
    /// | password  | none      |
    fn default() -> Self {
        Self::new("0.0.0.0", 5000)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
