//! Command workflows: interactive orchestration of the core operations.
//!
//! Everything user-facing and prompt-driven lives here; the modules below
//! call into the core (version, cache, project, git, platform) and own no
//! decision logic of their own.

pub mod create;
pub mod generate;
pub mod update;

use crate::cache::{CacheEntry, EngineCache, FetchEvent};
use crate::display::Reporter;
use crate::error::Result;
use crate::project::Confirmer;
use crate::version::EngineVersion;

/// cliclack-backed interactive prompt.
pub struct CliConfirmer;

impl Confirmer for CliConfirmer {
    fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool> {
        Ok(cliclack::confirm(prompt).initial_value(false).interact()?)
    }
}

/// Ensure a cache entry while narrating download/extract progress in the
/// original buildpack style.
pub(crate) async fn ensure_with_progress(
    cache: &EngineCache,
    version: &EngineVersion,
    rebuild: bool,
    reporter: &Reporter,
) -> Result<CacheEntry> {
    let label = format!("Using OpenBD {version}");
    reporter.progress(format!("{label}..."));

    let entry = cache
        .ensure(version, rebuild, |event| match event {
            FetchEvent::Downloading { received, total } => match total {
                Some(total) => {
                    reporter.progress(format!("{label}... downloading {received}/{total} bytes"))
                }
                None => reporter.progress(format!("{label}... downloading {received} bytes")),
            },
            FetchEvent::Extracting => reporter.progress(format!("{label}... extracting")),
        })
        .await?;

    // Nightly builds roll, so show how fresh the cached copy is.
    match entry.sentinel_created_date() {
        Some(date) if version.is_nightly() => {
            reporter.progress_done(format!("{label} [{date}]... done"));
        }
        _ => reporter.progress_done(format!("{label}... done")),
    }
    Ok(entry)
}
