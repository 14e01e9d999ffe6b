//! config command - Show the origin configuration of a project

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Print the decoded origin configuration of `project` as YAML.
pub fn config(ctx: &Context, project: &str) -> Result<()> {
    super::block_on(config_async(ctx, project))
}

async fn config_async(ctx: &Context, project: &str) -> Result<()> {
    let mut resolver = super::connect(ctx)?;
    let config = resolver
        .project_origin_config(project)
        .await
        .with_context(|| format!("Failed to read origin configuration of {}", project))?;

    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
