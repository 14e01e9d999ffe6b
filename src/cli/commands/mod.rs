//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the configuration and connects to the build service
//! 2. Runs the resolver
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Every command except `completion` talks to the build service. Handlers
//! are synchronous wrappers that run their async implementation on a
//! tokio runtime.

mod completion;
mod config_cmd;
mod find;
mod list;
mod origins;
mod projects;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::config;
pub use find::find;
pub use list::{format_text, list};
pub use origins::origins;
pub use projects::projects;

use crate::cli::args::{Command, ProjectKind};
use crate::cli::Context;
use crate::core::config::{Config, Overrides};
use crate::origin::OriginResolver;
use crate::service::obs::ObsClient;
use anyhow::{Context as _, Result};
use std::io::{self, Write};
use std::sync::Arc;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Find {
            project,
            package,
            no_resolve_inheritance,
        } => find::find(ctx, &project, &package, !no_resolve_inheritance),
        Command::List { project, json } => list::list(ctx, &project, json),
        Command::Origins { project } => origins::origins(ctx, project.as_deref()),
        Command::Config { project } => config_cmd::config(ctx, &project),
        Command::Projects {
            maintained,
            configured,
            maintenance,
        } => projects::projects(
            ctx,
            ProjectKind::from_flags(maintained, configured, maintenance),
        ),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Load the configuration with command-line overrides applied.
///
/// Prompts for the password when an account is configured without one and
/// prompts are allowed.
pub fn load_config(ctx: &Context) -> Result<Config> {
    let config = Config::load(ctx.config_path.as_deref()).context("Failed to load config")?;
    let config = config
        .with_overrides(ctx.overrides.clone())
        .context("Invalid configuration")?;

    let Some(username) = config.username().map(str::to_string) else {
        return Ok(config);
    };
    if config.password().is_some() || !ctx.interactive {
        return Ok(config);
    }

    eprint!("Password for {}: ", username);
    io::stderr().flush()?;
    let password = rpassword::read_password().context("Failed to read password")?;

    config
        .with_overrides(Overrides {
            password: Some(password),
            ..Overrides::default()
        })
        .context("Invalid configuration")
}

/// Connect to the configured build service.
pub fn connect(ctx: &Context) -> Result<OriginResolver> {
    let config = load_config(ctx)?;
    if let Some(path) = config.loaded_from() {
        tracing::debug!("Using config file {}", path.display());
    }

    let client = ObsClient::from_config(&config)
        .context("Failed to create build service client")?;
    Ok(OriginResolver::new(Arc::new(client)))
}

/// Run an async command implementation to completion.
pub(crate) fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}
