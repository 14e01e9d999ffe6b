//! cli
//!
//! Command-line interface for obs-origin.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that build an [`crate::origin::OriginResolver`] on top of the
//! configured build service.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::config::Overrides;
use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings shared by all command handlers.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Explicit config file
    pub config_path: Option<PathBuf>,
    /// Values overriding the config file
    pub overrides: Overrides,
    /// Debug logging enabled
    pub debug: bool,
    /// Prompts allowed
    pub interactive: bool,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = Context {
        config_path: cli.config.clone(),
        overrides: Overrides {
            api_url: cli.api_url.clone(),
            username: cli.username.clone(),
            password: cli.password.clone(),
        },
        debug: cli.debug,
        interactive: cli.interactive(),
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--debug`.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
