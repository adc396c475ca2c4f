//! `generate` workflow: scaffold a new project directory.

use super::{ensure_with_progress, CliConfirmer};
use crate::cache::EngineCache;
use crate::display::{DisplayMode, Reporter};
use crate::git;
use crate::project::{materialize, DeploymentMode, EngineSource, MaterializeOptions};
use crate::version::{self, ResolvedVersion};
use anyhow::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Project name; auto-generated when omitted.
    pub name: Option<String>,
    /// Engine version; latest stable when omitted.
    pub version: Option<String>,
    /// Flush the cache entry and download a fresh engine.
    pub rebuild: bool,
    /// Delete an existing project directory without asking.
    pub overwrite: bool,
    /// Bundle the complete engine instead of thin deployment.
    pub full_engine: bool,
    /// Skip git init and first commit.
    pub no_git: bool,
    pub verbose: bool,
}

/// Run generate under `base_dir` (the invoker's working directory).
pub async fn run(base_dir: &Path, args: GenerateArgs) -> Result<()> {
    let reporter = Reporter::new(DisplayMode::from_verbose(args.verbose));
    let name = match args.name {
        Some(name) => name,
        None => next_project_name(base_dir),
    };
    let project_dir = base_dir.join(&name);

    if project_dir.is_dir() {
        if args.overwrite {
            fs::remove_dir_all(&project_dir)?;
        } else {
            let replace = cliclack::confirm(format!(
                "Project {name} already exists. Should I replace it?"
            ))
            .initial_value(false)
            .interact()?;
            if !replace {
                return Ok(());
            }
            let sure =
                cliclack::confirm("This will delete ALL existing files. Are you ABSOLUTELY sure?")
                    .initial_value(false)
                    .interact()?;
            if !sure {
                return Ok(());
            }
            fs::remove_dir_all(&project_dir)?;
        }
    }

    let version = match version::resolve(args.version.as_deref(), false)? {
        ResolvedVersion::Pinned(version) => version,
        ResolvedVersion::Unchanged => unreachable!("generate always pins a version"),
    };

    let cache = EngineCache::from_env()?;
    let entry = ensure_with_progress(&cache, &version, args.rebuild, &reporter).await?;

    let opts = MaterializeOptions {
        mode: if args.full_engine {
            DeploymentMode::FullEngine
        } else {
            DeploymentMode::Thin
        },
        overwrite_config: false,
        is_update: false,
    };
    materialize(
        &project_dir,
        EngineSource::Cached(&entry),
        &opts,
        &reporter,
        &mut CliConfirmer,
    )?;

    if !args.no_git {
        git::init_and_commit(&project_dir, &reporter)?;
    }

    reporter.status(format!("Project '{name}' created successfully."));
    reporter.plain(format!("Type 'cd {name}' to change to your project folder."));
    reporter.plain("Type 'foreman start' to run the server locally");
    Ok(())
}

/// First free `openbd-project[-N]` name under `base_dir`.
fn next_project_name(base_dir: &Path) -> String {
    let prefix = "openbd-project";
    if !base_dir.join(prefix).is_dir() {
        return prefix.to_string();
    }
    let mut suffix = 1;
    loop {
        let name = format!("{prefix}-{suffix}");
        if !base_dir.join(&name).is_dir() {
            return name;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn project_names_skip_existing_directories() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_project_name(dir.path()), "openbd-project");

        fs::create_dir(dir.path().join("openbd-project")).unwrap();
        assert_eq!(next_project_name(dir.path()), "openbd-project-1");

        fs::create_dir(dir.path().join("openbd-project-1")).unwrap();
        assert_eq!(next_project_name(dir.path()), "openbd-project-2");
    }
}
