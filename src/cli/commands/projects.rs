//! projects command - List maintained, configured or maintenance projects

use crate::cli::args::ProjectKind;
use crate::cli::Context;
use anyhow::Result;

/// Print the projects of the given kind, one per line.
pub fn projects(ctx: &Context, kind: ProjectKind) -> Result<()> {
    super::block_on(projects_async(ctx, kind))
}

async fn projects_async(ctx: &Context, kind: ProjectKind) -> Result<()> {
    let mut resolver = super::connect(ctx)?;

    let projects: Vec<String> = match kind {
        ProjectKind::Maintained => resolver.maintained_projects().await?.to_vec(),
        ProjectKind::Configured => resolver.configured_projects().await?.to_vec(),
        ProjectKind::Maintenance => resolver
            .maintenance_project()
            .await?
            .map(str::to_string)
            .into_iter()
            .collect(),
    };

    for project in projects {
        println!("{}", project);
    }
    Ok(())
}
