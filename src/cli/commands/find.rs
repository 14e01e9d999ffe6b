//! find command - Resolve the origin of one package

use crate::cli::Context;
use crate::origin::OriginResolver;
use anyhow::{Context as _, Result};

/// Print the origin project of `package` in `project`.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn find(ctx: &Context, project: &str, package: &str, resolve_inheritance: bool) -> Result<()> {
    super::block_on(find_async(ctx, project, package, resolve_inheritance))
}

async fn find_async(
    ctx: &Context,
    project: &str,
    package: &str,
    resolve_inheritance: bool,
) -> Result<()> {
    let mut resolver = super::connect(ctx)?;
    let origin = resolve(&mut resolver, project, package, resolve_inheritance).await?;
    println!("{}", origin.as_deref().unwrap_or("(none)"));
    Ok(())
}

async fn resolve(
    resolver: &mut OriginResolver,
    project: &str,
    package: &str,
    resolve_inheritance: bool,
) -> Result<Option<String>> {
    resolver
        .find_package_origin(package, project, resolve_inheritance)
        .await
        .with_context(|| format!("Failed to resolve origin of {}/{}", project, package))
}
