//! Project materialization: deciding, for every file and directory a
//! project requires, whether to copy from cache, preserve, overwrite, or
//! patch from a bundled template.

pub mod layout;
pub mod materializer;
pub mod validate;

pub use layout::{DeploymentMode, PatchPolicy};
pub use materializer::{materialize, EngineSource, MaterializeOptions};
pub use validate::{installed_version, require_thin_project, validate, ProjectState};

/// Answers "should I replace it?" questions during materialization.
///
/// The workflow layer backs this with an interactive prompt; tests script
/// the answers. Declining is a normal outcome, never an error.
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool>;
}
