//! Supported engine versions and version resolution for generate/update.

use crate::error::{Error, Result};
use std::fmt;

/// Versions available from the distribution mirror, oldest to newest.
/// The last entry is the latest stable release.
pub const SUPPORTED_VERSIONS: &[&str] = &[
    "nightly", "1.1", "1.2", "1.3", "1.4", "2.0", "2.0.1", "2.0.2", "3.0",
];

/// Default for generate when no version is requested.
pub const DEFAULT_VERSION: &str = "3.0";

/// Rolling build whose cache entry gets a creation-date display.
pub const NIGHTLY: &str = "nightly";

/// An engine version known to the registry. Construction validates
/// membership, so holding one means the version is supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineVersion(String);

impl EngineVersion {
    pub fn parse(requested: &str) -> Result<Self> {
        if SUPPORTED_VERSIONS.contains(&requested) {
            Ok(Self(requested.to_string()))
        } else {
            Err(Error::UnsupportedVersion {
                requested: requested.to_string(),
                supported: SUPPORTED_VERSIONS,
            })
        }
    }

    pub fn default_version() -> Self {
        Self(DEFAULT_VERSION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_nightly(&self) -> bool {
        self.0 == NIGHTLY
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of version resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedVersion {
    /// Copy engine files for this version from the cache.
    Pinned(EngineVersion),
    /// Update-only: keep the installed engine, just re-run the file pass.
    Unchanged,
}

impl ResolvedVersion {
    pub fn pinned(&self) -> Option<&EngineVersion> {
        match self {
            ResolvedVersion::Pinned(v) => Some(v),
            ResolvedVersion::Unchanged => None,
        }
    }
}

/// Validate a requested version against the registry.
///
/// An absent version means "latest stable" for generate and "leave the
/// engine alone" for update. Pure validation; no side effects.
pub fn resolve(requested: Option<&str>, is_update: bool) -> Result<ResolvedVersion> {
    match requested {
        Some(v) => Ok(ResolvedVersion::Pinned(EngineVersion::parse(v)?)),
        None if is_update => Ok(ResolvedVersion::Unchanged),
        None => Ok(ResolvedVersion::Pinned(EngineVersion::default_version())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_last_registry_entry() {
        assert_eq!(Some(&DEFAULT_VERSION), SUPPORTED_VERSIONS.last());
    }

    #[test]
    fn every_registry_member_parses() {
        for v in SUPPORTED_VERSIONS {
            assert!(EngineVersion::parse(v).is_ok(), "{v} should parse");
        }
    }

    #[test]
    fn unknown_version_is_rejected_with_full_registry() {
        let err = EngineVersion::parse("0.5").unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::UnsupportedVersion { .. }));
        for v in SUPPORTED_VERSIONS {
            assert!(msg.contains(v), "message should list {v}");
        }
    }

    #[test]
    fn resolve_defaults_for_generate() {
        let resolved = resolve(None, false).unwrap();
        assert_eq!(
            resolved,
            ResolvedVersion::Pinned(EngineVersion::default_version())
        );
    }

    #[test]
    fn resolve_is_unchanged_for_update_without_version() {
        assert_eq!(resolve(None, true).unwrap(), ResolvedVersion::Unchanged);
    }

    #[test]
    fn resolve_pins_explicit_versions_for_both_operations() {
        for is_update in [false, true] {
            let resolved = resolve(Some("1.2"), is_update).unwrap();
            assert_eq!(resolved.pinned().unwrap().as_str(), "1.2");
        }
    }

    #[test]
    fn resolve_rejects_unknown_versions_for_both_operations() {
        for is_update in [false, true] {
            assert!(matches!(
                resolve(Some("4.2"), is_update),
                Err(Error::UnsupportedVersion { .. })
            ));
        }
    }

    #[test]
    fn nightly_detection() {
        assert!(EngineVersion::parse("nightly").unwrap().is_nightly());
        assert!(!EngineVersion::parse("3.0").unwrap().is_nightly());
    }
}
