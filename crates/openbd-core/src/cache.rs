//! Versioned engine distribution cache.
//!
//! Engine archives are downloaded once per version and extracted under
//! `{home}/cache/{version}`, mirroring the archive's internal layout. The
//! extracted `WEB-INF/lib/OpenBlueDragon.jar` is the completion sentinel:
//! it only exists once a previous extraction finished, so an interrupted
//! download or extraction is simply a cache miss on the next run.

use crate::error::{Error, Result};
use crate::version::EngineVersion;
use anyhow::Context;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use url::Url;
use zip::ZipArchive;

/// Name of the distribution archive on the mirror.
pub const ARCHIVE_NAME: &str = "openbd.war";

/// Relative path of the sentinel artifact inside an extracted entry.
pub const SENTINEL_JAR: &str = "WEB-INF/lib/OpenBlueDragon.jar";

pub const DEFAULT_MIRROR_URL: &str = "http://openbd.org/download";

/// Overrides the download mirror base URL.
pub const MIRROR_URL_ENV: &str = "OPENBD_MIRROR_URL";

/// Overrides the cache home (default `~/.openbd-heroku`).
pub const HOME_ENV: &str = "OPENBD_HOME";

/// Progress notifications emitted while populating a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchEvent {
    Downloading { received: u64, total: Option<u64> },
    Extracting,
}

/// One extracted engine version, ready for materialization.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    version: EngineVersion,
    dir: PathBuf,
    fetched: bool,
    sentinel_created: Option<SystemTime>,
}

impl CacheEntry {
    pub(crate) fn new(
        version: EngineVersion,
        dir: PathBuf,
        fetched: bool,
        sentinel_created: Option<SystemTime>,
    ) -> Self {
        Self {
            version,
            dir,
            fetched,
            sentinel_created,
        }
    }

    pub fn version(&self) -> &EngineVersion {
        &self.version
    }

    /// Root of the extracted tree.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether this call hit the network (false on a pure cache hit).
    pub fn fetched(&self) -> bool {
        self.fetched
    }

    /// Sentinel creation date as `YYYY-MM-DD`, for nightly display.
    pub fn sentinel_created_date(&self) -> Option<String> {
        let created = self.sentinel_created?;
        let local: chrono::DateTime<chrono::Local> = created.into();
        Some(local.format("%Y-%m-%d").to_string())
    }
}

/// Resolves versions to extracted directory trees on disk, downloading and
/// extracting on miss.
pub struct EngineCache {
    home: PathBuf,
    mirror: Url,
    client: reqwest::Client,
}

impl EngineCache {
    pub fn new(home: PathBuf, mirror: Url) -> Self {
        Self {
            home,
            mirror,
            client: reqwest::Client::new(),
        }
    }

    /// Build a cache from the environment: `OPENBD_HOME` (default
    /// `~/.openbd-heroku`) and `OPENBD_MIRROR_URL`.
    pub fn from_env() -> anyhow::Result<Self> {
        let home = match std::env::var_os(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .context("could not determine your home directory")?
                .join(".openbd-heroku"),
        };
        let raw = std::env::var(MIRROR_URL_ENV).unwrap_or_else(|_| DEFAULT_MIRROR_URL.to_string());
        let mirror = Url::parse(&raw).with_context(|| format!("Invalid mirror URL: {raw}"))?;
        Ok(Self::new(home, mirror))
    }

    /// Directory holding the extracted tree for `version`.
    pub fn entry_dir(&self, version: &EngineVersion) -> PathBuf {
        self.home.join("cache").join(version.as_str())
    }

    /// `{mirror}/{version}/openbd.war`.
    pub fn archive_url(&self, version: &EngineVersion) -> Result<Url> {
        let mut url = self.mirror.clone();
        url.path_segments_mut()
            .map_err(|_| Error::NetworkFailure {
                version: version.to_string(),
                url: self.mirror.to_string(),
                reason: "mirror URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .push(version.as_str())
            .push(ARCHIVE_NAME);
        Ok(url)
    }

    /// Make `version` present locally and return its entry.
    ///
    /// With `rebuild` any existing tree is deleted first, valid or not. A
    /// present sentinel short-circuits without any network I/O. On a miss
    /// the archive is streamed to a temporary file (progress reported via
    /// `on_event`), extracted, and deleted; extraction skips entries whose
    /// target already exists so a rerun after a crash picks up where it
    /// stopped.
    pub async fn ensure(
        &self,
        version: &EngineVersion,
        rebuild: bool,
        mut on_event: impl FnMut(FetchEvent),
    ) -> Result<CacheEntry> {
        let dir = self.entry_dir(version);
        let sentinel = dir.join(SENTINEL_JAR);

        if rebuild && dir.is_dir() {
            fs::remove_dir_all(&dir)?;
        }

        if sentinel.is_file() {
            let created = sentinel
                .metadata()
                .and_then(|m| m.created().or_else(|_| m.modified()))
                .ok();
            return Ok(CacheEntry::new(version.clone(), dir, false, created));
        }

        fs::create_dir_all(&dir)?;
        let url = self.archive_url(version)?;
        let archive_path = dir.join(ARCHIVE_NAME);
        self.download(version, &url, &archive_path, &mut on_event)
            .await?;

        on_event(FetchEvent::Extracting);
        extract_archive(&archive_path, &dir).map_err(|e| Error::ExtractionFailure {
            version: version.to_string(),
            reason: format!("{e:#}"),
        })?;
        fs::remove_file(&archive_path)?;

        Ok(CacheEntry::new(version.clone(), dir, true, None))
    }

    async fn download(
        &self,
        version: &EngineVersion,
        url: &Url,
        dest: &Path,
        on_event: &mut impl FnMut(FetchEvent),
    ) -> Result<()> {
        let network_err = |reason: String| Error::NetworkFailure {
            version: version.to_string(),
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| network_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(network_err(format!("HTTP {}", response.status())));
        }

        let total = response.content_length();
        let mut out = File::create(dest)?;
        let mut received = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| network_err(e.to_string()))?
        {
            out.write_all(&chunk)?;
            received += chunk.len() as u64;
            on_event(FetchEvent::Downloading { received, total });
        }
        out.flush()?;
        Ok(())
    }
}

/// Extract the whole archive into `dest`, skipping entries that already
/// exist on disk (partial-extract recovery) and entries that would escape
/// the destination directory.
///
/// The sentinel jar is extracted last, regardless of its position in the
/// archive: its presence means every other entry made it to disk.
fn extract_archive(archive: &Path, dest: &Path) -> anyhow::Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("failed to read archive {}", archive.display()))?;

    let sentinel_rel = Path::new(SENTINEL_JAR);
    for sentinel_pass in [false, true] {
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            let Some(rel) = entry.enclosed_name() else {
                continue;
            };
            if (rel == sentinel_rel) != sentinel_pass {
                continue;
            }
            let target = dest.join(rel);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }
            if target.exists() {
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
            io::copy(&mut entry, &mut out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn test_cache(home: &TempDir) -> EngineCache {
        // Unroutable mirror: any network attempt fails fast.
        EngineCache::new(
            home.path().to_path_buf(),
            Url::parse("http://127.0.0.1:1/download").unwrap(),
        )
    }

    fn seed_entry(cache: &EngineCache, version: &EngineVersion) {
        let sentinel = cache.entry_dir(version).join(SENTINEL_JAR);
        fs::create_dir_all(sentinel.parent().unwrap()).unwrap();
        fs::write(&sentinel, b"jar bytes").unwrap();
    }

    fn build_archive(files: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            for (name, contents) in files {
                zip.start_file(name.to_string(), options).unwrap();
                zip.write_all(contents.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn archive_url_follows_the_mirror_layout() {
        let home = TempDir::new().unwrap();
        let cache = test_cache(&home);
        let version = EngineVersion::parse("1.2").unwrap();
        assert_eq!(
            cache.archive_url(&version).unwrap().as_str(),
            "http://127.0.0.1:1/download/1.2/openbd.war"
        );
    }

    #[tokio::test]
    async fn sentinel_hit_returns_without_network() {
        let home = TempDir::new().unwrap();
        let cache = test_cache(&home);
        let version = EngineVersion::parse("3.0").unwrap();
        seed_entry(&cache, &version);

        // The mirror is unroutable, so this only passes on a pure fs check.
        let mut events = 0;
        let entry = cache
            .ensure(&version, false, |_| events += 1)
            .await
            .unwrap();
        assert!(!entry.fetched());
        assert_eq!(events, 0);
        assert_eq!(entry.dir(), cache.entry_dir(&version));

        // And again: still no network.
        let entry = cache.ensure(&version, false, |_| ()).await.unwrap();
        assert!(!entry.fetched());
    }

    #[tokio::test]
    async fn sentinel_hit_surfaces_creation_time() {
        let home = TempDir::new().unwrap();
        let cache = test_cache(&home);
        let version = EngineVersion::parse("nightly").unwrap();
        seed_entry(&cache, &version);

        let entry = cache.ensure(&version, false, |_| ()).await.unwrap();
        let date = entry.sentinel_created_date().unwrap();
        // YYYY-MM-DD
        assert_eq!(date.len(), 10);
        assert_eq!(date.as_bytes()[4], b'-');
        assert_eq!(date.as_bytes()[7], b'-');
    }

    #[tokio::test]
    async fn rebuild_deletes_a_valid_tree_before_downloading() {
        let home = TempDir::new().unwrap();
        let cache = test_cache(&home);
        let version = EngineVersion::parse("3.0").unwrap();
        seed_entry(&cache, &version);

        let err = cache.ensure(&version, true, |_| ()).await.unwrap_err();
        assert!(matches!(err, Error::NetworkFailure { .. }));
        // The previously valid entry is gone, so the next run is a miss.
        assert!(!cache.entry_dir(&version).join(SENTINEL_JAR).exists());
    }

    #[tokio::test]
    async fn miss_against_dead_mirror_is_a_network_failure() {
        let home = TempDir::new().unwrap();
        let cache = test_cache(&home);
        let version = EngineVersion::parse("1.1").unwrap();

        let err = cache.ensure(&version, false, |_| ()).await.unwrap_err();
        assert!(matches!(err, Error::NetworkFailure { .. }));
        assert!(!cache.entry_dir(&version).join(SENTINEL_JAR).exists());
    }

    #[test]
    fn extract_reconstructs_the_archive_layout() {
        let home = TempDir::new().unwrap();
        let archive_bytes = build_archive(&[
            ("index.cfm", "<cfoutput>hi</cfoutput>"),
            ("WEB-INF/lib/OpenBlueDragon.jar", "jar"),
            ("WEB-INF/web.xml", "<web-app/>"),
        ]);
        let archive = home.path().join("openbd.war");
        fs::write(&archive, &archive_bytes).unwrap();

        let dest = home.path().join("out");
        extract_archive(&archive, &dest).unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("index.cfm")).unwrap(),
            "<cfoutput>hi</cfoutput>"
        );
        assert!(dest.join(SENTINEL_JAR).is_file());
        assert!(dest.join("WEB-INF/web.xml").is_file());
    }

    #[test]
    fn extract_skips_already_materialized_paths() {
        let home = TempDir::new().unwrap();
        let archive_bytes = build_archive(&[("a.txt", "from archive"), ("b.txt", "new file")]);
        let archive = home.path().join("openbd.war");
        fs::write(&archive, &archive_bytes).unwrap();

        let dest = home.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("a.txt"), "already here").unwrap();

        extract_archive(&archive, &dest).unwrap();
        assert_eq!(
            fs::read_to_string(dest.join("a.txt")).unwrap(),
            "already here"
        );
        assert_eq!(fs::read_to_string(dest.join("b.txt")).unwrap(), "new file");
    }

    #[test]
    fn sentinel_is_only_written_once_extraction_completes() {
        let home = TempDir::new().unwrap();
        // Sentinel first in archive order, then an entry that cannot land
        // because a file blocks its parent directory.
        let archive_bytes = build_archive(&[
            ("WEB-INF/lib/OpenBlueDragon.jar", "jar"),
            ("blocked/late.txt", "never extracted"),
        ]);
        let archive = home.path().join("openbd.war");
        fs::write(&archive, &archive_bytes).unwrap();

        let dest = home.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("blocked"), b"a file, not a directory").unwrap();

        assert!(extract_archive(&archive, &dest).is_err());
        // The failed run must not leave a sentinel behind, or the next
        // ensure would treat the broken tree as a cache hit.
        assert!(!dest.join(SENTINEL_JAR).exists());
    }

    #[test]
    fn extract_rejects_garbage() {
        let home = TempDir::new().unwrap();
        let archive = home.path().join("openbd.war");
        fs::write(&archive, b"not a zip at all").unwrap();
        assert!(extract_archive(&archive, &home.path().join("out")).is_err());
    }
}
