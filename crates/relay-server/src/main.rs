//! Pointer relay server — entry point.
//!
//! This binary accepts WebSocket connections from remote-control clients
//! and applies their cursor-movement and click commands to the local
//! pointer device.
//!
//! # Usage
//!
//! ```text
//! relay-server [OPTIONS]
//!
//! Options:
//!   --host     <HOST>  Address to bind the listener to [default: 0.0.0.0]
//!   --port     <PORT>  TCP port for the WebSocket listener [default: 5000]
//!   --password <PW>    Session password; empty disables authentication
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable         | Default   | Description                       |
//! |------------------|-----------|-----------------------------------|
//! | `RELAY_HOST`     | `0.0.0.0` | Listener bind address             |
//! | `RELAY_PORT`     | `5000`    | Listener TCP port                 |
//! | `RELAY_PASSWORD` | (empty)   | Session password (empty = none)   |
//!
//! # Shutdown
//!
//! Ctrl+C stops the server gracefully: the accept loop and all session
//! reads are cancelled, in-flight messages finish, and the process exits
//! once every session has closed.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_server::domain::{ServerConfig, TracingLogSink};
use relay_server::infrastructure::{platform_pointer_sink, start};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Pointer relay server.
///
/// Accepts WebSocket connections from remote-control clients and applies
/// their cursor commands to the local pointer device.
#[derive(Debug, Parser)]
#[command(
    name = "relay-server",
    about = "WebSocket pointer relay — remote cursor control for the local machine",
    version
)]
struct Cli {
    /// Address to bind the WebSocket listener to.
    ///
    /// Use `0.0.0.0` to accept connections from any network interface, or
    /// `127.0.0.1` to accept only local connections.
    #[arg(long, default_value = "0.0.0.0", env = "RELAY_HOST")]
    host: String,

    /// TCP port for the WebSocket listener.
    #[arg(long, default_value_t = 5000, env = "RELAY_PORT")]
    port: u16,

    /// Session password clients must present before sending commands.
    ///
    /// Leave empty to disable authentication.  A non-empty password must
    /// be at least 6 characters.
    #[arg(long, default_value = "", env = "RELAY_PASSWORD")]
    password: String,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error for a non-empty password shorter than 6 characters.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let config = ServerConfig::new(self.host, self.port).with_password(self.password);
        if !config.password_rule_ok() {
            anyhow::bail!("password must be at least 6 characters long, or empty for no authentication");
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `RUST_LOG` controls the log level; default to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_server_config()?;

    let pointer = platform_pointer_sink().context("no pointer device available")?;
    let log = Arc::new(TracingLogSink);

    let handle = start(config, pointer, log)
        .await
        .context("server startup failed")?;

    info!("press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("received Ctrl+C — shutting down");

    handle.stop().await;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
