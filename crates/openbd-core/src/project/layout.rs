//! Fixed catalog of the files and folders an openbd project is made of.
//!
//! Everything the materializer touches is declared here as data: the
//! folders copied from the cache, the placeholder folders, the patch files
//! with their replacement policies, and the generated-file templates. The
//! materializer consults this table uniformly instead of branching on
//! literal paths.

use crate::version::EngineVersion;
use std::path::Path;

/// Directories copied wholesale from the cache entry (replaced on update).
pub const BULK_COPY_FOLDERS: &[&str] = &["bluedragon", "WEB-INF/webresources"];

/// Class/customtag loading directories: created empty, never touched again.
pub const PLACEHOLDER_FOLDERS: &[&str] = &["WEB-INF/classes", "WEB-INF/customtags"];

/// Paths whose presence marks a directory as an openbd project.
pub const STRUCTURAL_SENTINELS: &[&str] =
    &["Procfile", "WEB-INF/web.xml", "WEB-INF/bluedragon/bluedragon.xml"];

pub const README_MARKER_DIR: &str = "WEB-INF/lib";
pub const README_MARKER_PREFIX: &str = "openbd-heroku-readme-";
pub const README_MARKER_SUFFIX: &str = ".txt";

/// Body of the versioned readme marker file.
pub const README_MARKER_CONTENTS: &str =
    include_str!("../../patches/WEB-INF/lib/openbd-heroku-readme.txt");

/// Marker file name for a version, e.g. `openbd-heroku-readme-1.2.txt`.
pub fn readme_marker_name(version: &EngineVersion) -> String {
    format!("{README_MARKER_PREFIX}{version}{README_MARKER_SUFFIX}")
}

/// Extract the version recorded in a marker file name.
pub fn parse_readme_marker(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(README_MARKER_PREFIX)?
        .strip_suffix(README_MARKER_SUFFIX)
}

/// Whether the engine is shared from the cache or bundled into the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Engine jars stay in the cache; the Procfile points winstone at them.
    Thin,
    /// The whole distribution is copied in for self-contained deployment.
    FullEngine,
}

/// What to do with a patch file that already exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchPolicy {
    /// User-customizable; an existing copy is never replaced.
    AlwaysPreserve,
    /// Structural and safe to reset; replaced when the overwrite-config
    /// flag (or full-engine mode) is set.
    OverwriteIfConfigReset,
    /// Prompt before replacing. No current patch file uses this; it is the
    /// policy any future, unlisted patch path falls back to.
    AskBeforeReplace,
}

/// A project file sourced from a bundled template rather than from the
/// downloaded distribution.
pub struct PatchFile {
    pub rel_path: &'static str,
    pub policy: PatchPolicy,
    pub contents: &'static str,
    /// Skipped entirely in full-engine mode (the distribution ships its own).
    pub thin_only: bool,
}

pub const PATCH_FILES: &[PatchFile] = &[
    PatchFile {
        rel_path: "index.cfm",
        policy: PatchPolicy::AlwaysPreserve,
        contents: include_str!("../../patches/index.cfm"),
        thin_only: true,
    },
    PatchFile {
        rel_path: "WEB-INF/bluedragon/log4j.properties",
        policy: PatchPolicy::AlwaysPreserve,
        contents: include_str!("../../patches/WEB-INF/bluedragon/log4j.properties"),
        thin_only: false,
    },
    PatchFile {
        rel_path: "WEB-INF/web.xml",
        policy: PatchPolicy::OverwriteIfConfigReset,
        contents: include_str!("../../patches/WEB-INF/web.xml"),
        thin_only: false,
    },
    PatchFile {
        rel_path: "WEB-INF/bluedragon/bluedragon.xml",
        policy: PatchPolicy::OverwriteIfConfigReset,
        contents: include_str!("../../patches/WEB-INF/bluedragon/bluedragon.xml"),
        thin_only: false,
    },
    PatchFile {
        rel_path: "WEB-INF/bluedragon/component.cfc",
        policy: PatchPolicy::AlwaysPreserve,
        contents: include_str!("../../patches/WEB-INF/bluedragon/component.cfc"),
        thin_only: false,
    },
];

/// Policy for a relative path; unlisted paths ask before replacing.
pub fn patch_policy(rel_path: &str) -> PatchPolicy {
    PATCH_FILES
        .iter()
        .find(|p| p.rel_path == rel_path)
        .map(|p| p.policy)
        .unwrap_or(PatchPolicy::AskBeforeReplace)
}

/// Template contents for a listed patch file.
pub fn patch_contents(rel_path: &str) -> Option<&'static str> {
    PATCH_FILES
        .iter()
        .find(|p| p.rel_path == rel_path)
        .map(|p| p.contents)
}

const GITIGNORE_THIN: &str = "/Procfile\n/.env\n/bluedragon/\n/WEB-INF/bluedragon/work/\n/WEB-INF/webresources/\n/WEB-INF/bluedragon/bluedragon.xml.bak.*\n";

const GITIGNORE_FULL: &str =
    "/Procfile\n/.env\n/WEB-INF/bluedragon/work/\n/WEB-INF/bluedragon/bluedragon.xml.bak.*\n";

/// Version-control ignore list. Thin mode also ignores the bulk-copy
/// folders; full-engine mode commits them since they are the engine.
pub fn gitignore_contents(mode: DeploymentMode) -> &'static str {
    match mode {
        DeploymentMode::Thin => GITIGNORE_THIN,
        DeploymentMode::FullEngine => GITIGNORE_FULL,
    }
}

/// Environment file: home override, port default, JVM tuning.
pub fn env_contents(home_dir: &Path) -> String {
    format!(
        "HOME={}\nPORT=8080\nJAVA_OPTS=-Xmx128m -Xss512k",
        home_dir.display()
    )
}

const WINSTONE_JAR: &str =
    "$HOME/.heroku/plugins/openbd-heroku/opt/server-engines/winstone-lite-0.9.10.jar";

/// Process descriptor: a single `web:` line launching winstone. Thin mode
/// adds the common-library-folder flag pointing into the cache entry.
pub fn procfile_contents(mode: DeploymentMode, version: &EngineVersion) -> String {
    let common_lib = match mode {
        DeploymentMode::Thin => format!(
            " --commonLibFolder=$HOME/.openbd-heroku/cache/{version}/WEB-INF/lib"
        ),
        DeploymentMode::FullEngine => String::new(),
    };
    format!(
        "web: java $JAVA_OPTS -Dlog4j.configuration=file:WEB-INF/bluedragon/log4j.properties \
         -jar {WINSTONE_JAR}{common_lib} --webroot=. --httpPort=$PORT"
    )
}
