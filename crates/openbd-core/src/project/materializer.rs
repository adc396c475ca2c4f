//! Project materialization.
//!
//! Reconciles a target project directory against a cached engine tree and
//! the patch-file catalog: every file or folder the project needs is either
//! copied fresh from the cache, left alone because the user already has it,
//! replaced, or written from a bundled template. Guard conditions are all
//! path-existence checks, so a failed run can be re-run safely even though
//! no step is transactional.

use crate::cache::CacheEntry;
use crate::display::Reporter;
use crate::project::layout::{self, DeploymentMode, PatchPolicy};
use crate::project::{validate, Confirmer};
use crate::version::EngineVersion;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Where engine files come from for this invocation.
pub enum EngineSource<'a> {
    /// Copy from an extracted cache entry.
    Cached(&'a CacheEntry),
    /// Update-only config refresh: no cache-derived copying at all.
    Unchanged,
}

#[derive(Debug, Clone, Copy)]
pub struct MaterializeOptions {
    pub mode: DeploymentMode,
    /// Reset the overwrite-if-flag config files even if they exist.
    pub overwrite_config: bool,
    /// In-place update of an existing project (changes bulk-copy handling).
    pub is_update: bool,
}

/// Materialize or update the project at `project_dir`.
///
/// Idempotent modulo the user's answers to replace prompts.
pub fn materialize(
    project_dir: &Path,
    source: EngineSource<'_>,
    opts: &MaterializeOptions,
    reporter: &Reporter,
    confirmer: &mut dyn Confirmer,
) -> Result<()> {
    fs::create_dir_all(project_dir)
        .with_context(|| format!("failed to create {}", project_dir.display()))?;

    let entry = match source {
        EngineSource::Unchanged => {
            reporter.status("Using currently installed version of OpenBD...");
            let version = validate::installed_version(project_dir)
                .context("project has no readme marker to read the engine version from")?;
            return write_generated_files(project_dir, DeploymentMode::Thin, &version);
        }
        EngineSource::Cached(entry) => entry,
    };

    match opts.mode {
        DeploymentMode::FullEngine => materialize_full(project_dir, entry, reporter)?,
        DeploymentMode::Thin => materialize_thin(project_dir, entry, opts, reporter, confirmer)?,
    }

    apply_patches(project_dir, opts, reporter, confirmer)
}

/// Copy the entire distribution in, minus the class/customtag directories,
/// which must end up present but empty.
fn materialize_full(project_dir: &Path, entry: &CacheEntry, reporter: &Reporter) -> Result<()> {
    reporter.progress("Copying full engine for deployment...");
    copy_tree_excluding(entry.dir(), project_dir, layout::PLACEHOLDER_FOLDERS)?;
    for folder in layout::PLACEHOLDER_FOLDERS {
        let dir = project_dir.join(folder);
        if dir.is_dir() {
            clear_dir(&dir)?;
        } else {
            fs::create_dir_all(&dir)?;
        }
    }
    reporter.progress_done("Copying full engine for deployment... done");

    write_generated_files(project_dir, DeploymentMode::FullEngine, entry.version())
}

fn materialize_thin(
    project_dir: &Path,
    entry: &CacheEntry,
    opts: &MaterializeOptions,
    reporter: &Reporter,
    confirmer: &mut dyn Confirmer,
) -> Result<()> {
    for folder in layout::BULK_COPY_FOLDERS {
        let target = project_dir.join(folder);
        let mut do_copy = true;
        if target.is_dir() {
            if opts.is_update {
                fs::remove_dir_all(&target)?;
            } else if confirmer
                .confirm(&format!("Directory /{folder} already exists. Should I replace it?"))?
            {
                fs::remove_dir_all(&target)?;
            } else {
                reporter.v_status(format!("Using existing /{folder}... done"));
                do_copy = false;
            }
        }
        if do_copy {
            reporter.v_progress(format!("Copying /{folder}..."));
            copy_tree(&entry.dir().join(folder), &target)?;
            reporter.v_progress_done(format!("Copying /{folder}... done"));
        }
    }

    for folder in layout::PLACEHOLDER_FOLDERS {
        let target = project_dir.join(folder);
        if target.is_dir() {
            reporter.v_status(format!("Using existing /{folder}... done"));
        } else {
            reporter.v_progress(format!("Initializing /{folder}..."));
            fs::create_dir_all(&target)?;
            reporter.v_progress_done(format!("Initializing /{folder}... done"));
        }
    }

    // One marker per project: drop stale ones, record the new version.
    for stale in validate::readme_markers(project_dir) {
        fs::remove_file(&stale)?;
    }
    let marker_dir = project_dir.join(layout::README_MARKER_DIR);
    fs::create_dir_all(&marker_dir)?;
    fs::write(
        marker_dir.join(layout::readme_marker_name(entry.version())),
        layout::README_MARKER_CONTENTS,
    )?;

    write_generated_files(project_dir, DeploymentMode::Thin, entry.version())
}

fn apply_patches(
    project_dir: &Path,
    opts: &MaterializeOptions,
    reporter: &Reporter,
    confirmer: &mut dyn Confirmer,
) -> Result<()> {
    let reset_config = opts.overwrite_config || opts.mode == DeploymentMode::FullEngine;

    for patch in layout::PATCH_FILES {
        if patch.thin_only && opts.mode == DeploymentMode::FullEngine {
            continue;
        }
        let target = project_dir.join(patch.rel_path);
        let label = format!("/{}", patch.rel_path);

        let mut do_copy = true;
        if target.is_file() {
            do_copy = false;
            match patch.policy {
                PatchPolicy::OverwriteIfConfigReset if reset_config => {
                    fs::remove_file(&target)?;
                    reporter.progress(format!("Patching {label}..."));
                    do_copy = true;
                }
                PatchPolicy::AlwaysPreserve | PatchPolicy::OverwriteIfConfigReset => {
                    reporter.v_status(format!("Using existing {label}... done"));
                }
                PatchPolicy::AskBeforeReplace => {
                    if confirmer
                        .confirm(&format!("File {label} already exists. Should I replace it?"))?
                    {
                        fs::remove_file(&target)?;
                        reporter.v_progress(format!("Patching {label}..."));
                        do_copy = true;
                    } else {
                        reporter.v_status(format!("Using existing {label}... done"));
                    }
                }
            }
        } else {
            reporter.v_progress(format!("Patching {label}..."));
        }

        if do_copy {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, patch.contents)
                .with_context(|| format!("failed to write {}", target.display()))?;
            if reset_config {
                reporter.progress_done(format!("Patching {label}... done"));
            } else {
                reporter.v_progress_done(format!("Patching {label}... done"));
            }
        }
    }
    Ok(())
}

/// The three derived files, regenerated on every pass.
fn write_generated_files(
    project_dir: &Path,
    mode: DeploymentMode,
    version: &EngineVersion,
) -> Result<()> {
    let home = dirs::home_dir().context("could not determine your home directory")?;
    fs::write(project_dir.join(".gitignore"), layout::gitignore_contents(mode))?;
    fs::write(project_dir.join(".env"), layout::env_contents(&home))?;
    fs::write(
        project_dir.join("Procfile"),
        layout::procfile_contents(mode, version),
    )?;
    Ok(())
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    copy_tree_excluding(src, dest, &[])
}

/// Recursively copy `src` into `dest`. Excluded folders are created on the
/// destination side but their contents are skipped.
fn copy_tree_excluding(src: &Path, dest: &Path, excluded: &[&str]) -> Result<()> {
    let excluded: Vec<_> = excluded.iter().map(|rel| src.join(rel)).collect();
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let path = entry.path();
        if path == src {
            continue;
        }
        if excluded.iter().any(|ex| path.starts_with(ex) && path != ex) {
            continue;
        }
        let rel = path.strip_prefix(src)?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &target)
                .with_context(|| format!("failed to copy {}", path.display()))?;
        }
    }
    Ok(())
}

/// Delete a directory's contents, keeping the directory itself.
fn clear_dir(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
