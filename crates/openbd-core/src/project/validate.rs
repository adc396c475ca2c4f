//! Project recognition checks used by the update workflow.

use crate::error::{Error, Result};
use crate::project::layout;
use crate::version::EngineVersion;
use std::fs;
use std::path::{Path, PathBuf};

/// What a directory looks like to the update command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectState {
    /// All three structural sentinel files exist.
    pub valid: bool,
    /// A versioned readme marker exists, so the thin update path applies.
    pub thin_capable: bool,
}

/// Inspect a directory. Pure filesystem check, never fails.
pub fn validate(project_dir: &Path) -> ProjectState {
    let valid = layout::STRUCTURAL_SENTINELS
        .iter()
        .all(|rel| project_dir.join(rel).is_file());
    let thin_capable = !readme_markers(project_dir).is_empty();
    ProjectState {
        valid,
        thin_capable,
    }
}

/// Fail fast unless `project_dir` is a valid, thin-capable project.
pub fn require_thin_project(project_dir: &Path) -> Result<()> {
    let state = validate(project_dir);
    if !state.valid {
        return Err(Error::InvalidProject {
            reason: "Current directory is not an openbd project".to_string(),
        });
    }
    if !state.thin_capable {
        return Err(Error::InvalidProject {
            reason: "Current project is not setup for thin deployment\n\
                     Modifications to OpenBD must be performed manually"
                .to_string(),
        });
    }
    Ok(())
}

/// All readme marker files under `WEB-INF/lib`. A healthy project has
/// exactly one; stale ones from earlier versions get cleaned up by the
/// materializer.
pub fn readme_markers(project_dir: &Path) -> Vec<PathBuf> {
    let lib_dir = project_dir.join(layout::README_MARKER_DIR);
    let Ok(entries) = fs::read_dir(&lib_dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| layout::parse_readme_marker(n).is_some())
        })
        .collect()
}

/// Engine version recorded by the readme marker, if present and supported.
pub fn installed_version(project_dir: &Path) -> Option<EngineVersion> {
    readme_markers(project_dir).iter().find_map(|path| {
        let name = path.file_name()?.to_str()?;
        EngineVersion::parse(layout::parse_readme_marker(name)?).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"x").unwrap();
    }

    fn seed_valid_project(dir: &Path) {
        for rel in layout::STRUCTURAL_SENTINELS {
            touch(dir, rel);
        }
    }

    #[test]
    fn empty_directory_is_not_a_project() {
        let dir = TempDir::new().unwrap();
        let state = validate(dir.path());
        assert!(!state.valid);
        assert!(!state.thin_capable);
    }

    #[test]
    fn all_sentinels_make_a_valid_project() {
        let dir = TempDir::new().unwrap();
        seed_valid_project(dir.path());
        let state = validate(dir.path());
        assert!(state.valid);
        assert!(!state.thin_capable);
    }

    #[test]
    fn missing_any_sentinel_invalidates() {
        for skipped in layout::STRUCTURAL_SENTINELS {
            let dir = TempDir::new().unwrap();
            for rel in layout::STRUCTURAL_SENTINELS {
                if rel != skipped {
                    touch(dir.path(), rel);
                }
            }
            assert!(!validate(dir.path()).valid, "missing {skipped}");
        }
    }

    #[test]
    fn marker_makes_a_project_thin_capable() {
        let dir = TempDir::new().unwrap();
        seed_valid_project(dir.path());
        touch(dir.path(), "WEB-INF/lib/openbd-heroku-readme-1.2.txt");
        let state = validate(dir.path());
        assert!(state.valid);
        assert!(state.thin_capable);
        assert_eq!(
            installed_version(dir.path()).unwrap().as_str(),
            "1.2"
        );
    }

    #[test]
    fn other_lib_files_are_not_markers() {
        let dir = TempDir::new().unwrap();
        seed_valid_project(dir.path());
        touch(dir.path(), "WEB-INF/lib/some-library.jar");
        touch(dir.path(), "WEB-INF/lib/readme.txt");
        assert!(!validate(dir.path()).thin_capable);
        assert!(installed_version(dir.path()).is_none());
    }

    #[test]
    fn require_thin_project_distinguishes_its_failures() {
        let dir = TempDir::new().unwrap();
        let err = require_thin_project(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not an openbd project"));

        seed_valid_project(dir.path());
        let err = require_thin_project(dir.path()).unwrap_err();
        assert!(err.to_string().contains("thin deployment"));

        touch(dir.path(), "WEB-INF/lib/openbd-heroku-readme-3.0.txt");
        assert!(require_thin_project(dir.path()).is_ok());
    }

    #[test]
    fn marker_presence_alone_is_not_validity() {
        // The marker without the structural files still fails as "not a
        // project", not as "not thin capable".
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "WEB-INF/lib/openbd-heroku-readme-3.0.txt");
        let err = require_thin_project(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not an openbd project"));
    }
}
