//! `update` workflow: refresh the project in the current directory.

use super::{ensure_with_progress, CliConfirmer};
use crate::cache::EngineCache;
use crate::display::{DisplayMode, Reporter};
use crate::project::{
    materialize, require_thin_project, DeploymentMode, EngineSource, MaterializeOptions,
};
use crate::version::{self, ResolvedVersion};
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Engine version; the installed version stays when omitted.
    pub version: Option<String>,
    /// Flush the cache entry and download a fresh engine.
    pub rebuild: bool,
    /// Reset web.xml and bluedragon.xml to their defaults.
    pub overwrite_config: bool,
    pub verbose: bool,
}

/// Run update against `project_dir` (the invoker's working directory).
pub async fn run(project_dir: &Path, args: UpdateArgs) -> Result<()> {
    require_thin_project(project_dir)?;

    let reporter = Reporter::new(DisplayMode::from_verbose(args.verbose));
    let resolved = version::resolve(args.version.as_deref(), true)?;
    let name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| project_dir.display().to_string());

    let opts = MaterializeOptions {
        mode: DeploymentMode::Thin,
        overwrite_config: args.overwrite_config,
        is_update: true,
    };

    match &resolved {
        ResolvedVersion::Pinned(version) => {
            let cache = EngineCache::from_env()?;
            let entry = ensure_with_progress(&cache, version, args.rebuild, &reporter).await?;
            materialize(
                project_dir,
                EngineSource::Cached(&entry),
                &opts,
                &reporter,
                &mut CliConfirmer,
            )?;
            reporter.plain(format!("{name} updated to OpenBD {version}"));
        }
        ResolvedVersion::Unchanged => {
            materialize(
                project_dir,
                EngineSource::Unchanged,
                &opts,
                &reporter,
                &mut CliConfirmer,
            )?;
        }
    }
    Ok(())
}
