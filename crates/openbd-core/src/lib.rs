//! openbd-core - Scaffolding and update engine for OpenBD server projects
//!
//! This library downloads versioned OpenBD engine distributions into a
//! local cache and materializes project directories from them, deciding
//! per file whether to copy from cache, preserve the user's copy,
//! overwrite it, or patch it from a bundled template.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Core operations** - version registry/resolution (`version`), the
//!   artifact cache (`cache`), and project materialization/validation
//!   (`project`)
//! - **Collaborators** - thin glue over the git binary (`git`) and the
//!   platform API (`platform`)
//! - **Workflows** - cliclack-driven `generate`/`create`/`update`
//!   orchestration (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the interactive workflows module
//!
//! # Example Usage (without workflows)
//!
//! ```ignore
//! use openbd_core::{version, EngineCache, DisplayMode, Reporter};
//!
//! let resolved = version::resolve(Some("3.0"), false)?;
//! let cache = EngineCache::from_env()?;
//! let entry = cache.ensure(resolved.pinned().unwrap(), false, |_| {}).await?;
//! ```

pub mod cache;
pub mod display;
pub mod error;
pub mod git;
pub mod platform;
pub mod project;
pub mod version;

#[cfg(feature = "tui")]
pub mod workflows;

// Re-export main types for convenience
pub use cache::{CacheEntry, EngineCache, FetchEvent};
pub use display::{DisplayMode, Reporter};
pub use error::{Error, Result};
pub use project::{
    materialize, Confirmer, DeploymentMode, EngineSource, MaterializeOptions, ProjectState,
};
pub use version::{resolve, EngineVersion, ResolvedVersion, SUPPORTED_VERSIONS};
