//! origins command - Show expanded origin candidates

use crate::cli::Context;
use anyhow::{bail, Result};

/// Print the expanded origins of `project`, or of every configured project.
pub fn origins(ctx: &Context, project: Option<&str>) -> Result<()> {
    super::block_on(origins_async(ctx, project))
}

async fn origins_async(ctx: &Context, project: Option<&str>) -> Result<()> {
    let mut resolver = super::connect(ctx)?;

    match project {
        Some(project) => {
            let Some(origins) = resolver.project_origins(project).await? else {
                bail!("Project {} has no origin configuration", project);
            };
            for origin in origins {
                println!("{}", origin);
            }
        }
        None => {
            for (project, origins) in resolver.expanded_origins().await? {
                println!("{}:", project);
                for origin in origins {
                    println!("  {}", origin);
                }
            }
        }
    }
    Ok(())
}
