//! Error kinds surfaced to the user as terminal, descriptive messages.
//!
//! None of these are retried and none are swallowed: every kind either
//! aborts the running command or (for interactive declines, which are not
//! errors at all) never reaches this module.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Requested engine version is not in the supported registry.
    #[error(
        "Specified version \"{requested}\" isn't supported.\nTry one of the following:\n{}",
        format_versions(.supported)
    )]
    UnsupportedVersion {
        requested: String,
        supported: &'static [&'static str],
    },

    /// Update run outside a recognized project, or against a full-engine
    /// project that has no thin-deployment marker.
    #[error("{reason}")]
    InvalidProject { reason: String },

    /// A required external binary is absent from PATH.
    #[error("{0}")]
    MissingDependency(String),

    /// An external binary was found but its invocation failed.
    #[error("'{command}' failed: {status}")]
    CommandFailed { command: String, status: String },

    /// Engine archive download failed. Fatal; the cache entry is left
    /// without its sentinel so the next run starts over.
    #[error("Failed to download OpenBD {version} from {url}: {reason}")]
    NetworkFailure {
        version: String,
        url: String,
        reason: String,
    },

    /// Engine archive extraction failed. Fatal, same recovery story as
    /// download failures.
    #[error("Failed to extract the OpenBD {version} archive: {reason}")]
    ExtractionFailure { version: String, reason: String },

    /// A platform labs feature the workflow depends on is not offered.
    #[error("Heroku labs feature \"{feature}\" is not available")]
    FeatureUnavailable { feature: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_versions(versions: &[&str]) -> String {
    versions
        .iter()
        .map(|v| format!("   {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
