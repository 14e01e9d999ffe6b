//! list command - Resolve the origins of all packages of a project

use crate::cli::Context;
use crate::origin::PackageOrigin;
use anyhow::{Context as _, Result};

/// Print the origin of every package in `project`.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn list(ctx: &Context, project: &str, json: bool) -> Result<()> {
    super::block_on(list_async(ctx, project, json))
}

async fn list_async(ctx: &Context, project: &str, json: bool) -> Result<()> {
    let mut resolver = super::connect(ctx)?;
    let origins = resolver
        .list(project)
        .await
        .with_context(|| format!("Failed to list origins of {}", project))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&origins)?);
    } else {
        print!("{}", format_text(&origins));
    }
    Ok(())
}

/// Render origins as `package<TAB>origin` lines.
pub fn format_text(origins: &[PackageOrigin]) -> String {
    origins
        .iter()
        .map(|o| format!("{}\t{}\n", o.package, o.origin.as_deref().unwrap_or("(none)")))
        .collect()
}
