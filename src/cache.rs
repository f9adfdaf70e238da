//! Result cache
//!
//! Persists the last computed [`VersionResult`] in a single JSON file,
//! keyed by a [`Fingerprint`] of everything that can change the outcome.

use crate::domain::{CommitId, VersionResult};
use crate::error::{NextVerError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Bumped whenever the on-disk layout changes; older files read as misses
const CACHE_FORMAT_VERSION: u32 = 1;

/// Directory created inside `.git` for cache files
pub const CACHE_DIR_NAME: &str = "nextver";

const CACHE_FILE_NAME: &str = "cache.json";

/// Identity of one repository and configuration state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// SHA-256 over HEAD, the resolved configuration hash and the refs hash
    pub fn new(head: &CommitId, config_hash: &str, refs_hash: &str) -> Self {
        let mut hasher = Sha256::new();
        for part in [head.as_str(), config_hash, refs_hash] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One persisted result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub format_version: u32,
    pub fingerprint: Fingerprint,
    pub result: VersionResult,
    /// Unix seconds
    pub computed_at: u64,
}

impl CacheEntry {
    fn new(fingerprint: Fingerprint, result: VersionResult) -> Self {
        let computed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        CacheEntry {
            format_version: CACHE_FORMAT_VERSION,
            fingerprint,
            result,
            computed_at,
        }
    }
}

/// File-backed store for the most recent result.
///
/// The file is read once when the cache is opened. Writers are serialized
/// and replace the file atomically, so a reader never sees a partial entry.
#[derive(Debug)]
pub struct ResultCache {
    path: PathBuf,
    current: RwLock<Option<CacheEntry>>,
    write_lock: Mutex<()>,
}

impl ResultCache {
    /// Open the cache stored at `path`; a missing or unreadable file
    /// starts the cache empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match load_entry(&path) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring unusable cache file");
                None
            }
        };
        ResultCache {
            path,
            current: RwLock::new(current),
            write_lock: Mutex::new(()),
        }
    }

    /// Cache kept inside a repository's `.git` directory
    pub fn in_git_dir(git_dir: &Path) -> Self {
        Self::open(git_dir.join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Result stored for exactly this fingerprint
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<VersionResult> {
        let current = match self.current.read() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Cache lock poisoned, treating as miss");
                return None;
            }
        };
        match current.as_ref() {
            Some(entry) if &entry.fingerprint == fingerprint => {
                info!(fingerprint = %short(fingerprint), "Cache hit");
                Some(entry.result.clone())
            }
            _ => {
                info!(fingerprint = %short(fingerprint), "Cache miss");
                None
            }
        }
    }

    /// Persist `result` under `fingerprint`, replacing any previous entry
    pub fn store(&self, fingerprint: Fingerprint, result: VersionResult) -> Result<()> {
        let _writer = self
            .write_lock
            .lock()
            .map_err(|_| NextVerError::cache_corruption("Cache writer lock poisoned"))?;

        let entry = CacheEntry::new(fingerprint, result);
        write_entry(&self.path, &entry)?;
        debug!(path = %self.path.display(), "Stored cache entry");

        let mut current = self
            .current
            .write()
            .map_err(|_| NextVerError::cache_corruption("Cache reader lock poisoned"))?;
        *current = Some(entry);
        Ok(())
    }
}

fn short(fingerprint: &Fingerprint) -> &str {
    fingerprint.as_str().get(..12).unwrap_or(fingerprint.as_str())
}

fn load_entry(path: &Path) -> Result<Option<CacheEntry>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let entry: CacheEntry = serde_json::from_str(&content).map_err(|e| {
        NextVerError::cache_corruption(format!("{}: {}", path.display(), e))
    })?;
    if entry.format_version != CACHE_FORMAT_VERSION {
        return Err(NextVerError::cache_corruption(format!(
            "{}: format version {} (expected {})",
            path.display(),
            entry.format_version,
            CACHE_FORMAT_VERSION
        )));
    }
    Ok(Some(entry))
}

fn write_entry(path: &Path, entry: &CacheEntry) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, entry)?;
    file.write_all(b"\n")?;
    file.persist(path).map_err(|e| NextVerError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SemanticVersion;
    use tempfile::TempDir;

    fn result(version: &str) -> VersionResult {
        VersionResult::new(
            SemanticVersion::parse(version).unwrap(),
            "Git tag 'v1.2.0'",
            3,
            "main",
            CommitId::new("ab".repeat(20)),
        )
    }

    fn fingerprint(head: &str) -> Fingerprint {
        Fingerprint::new(&CommitId::new(head), "config", "refs")
    }

    #[test]
    fn test_fingerprint_changes_with_each_input() {
        let head = CommitId::new("a".repeat(40));
        let base = Fingerprint::new(&head, "config", "refs");
        assert_eq!(base, Fingerprint::new(&head, "config", "refs"));
        assert_ne!(base, Fingerprint::new(&CommitId::new("b".repeat(40)), "config", "refs"));
        assert_ne!(base, Fingerprint::new(&head, "other", "refs"));
        assert_ne!(base, Fingerprint::new(&head, "config", "tags-moved"));
        assert_eq!(base.as_str().len(), 64);
    }

    #[test]
    fn test_store_then_lookup() {
        let dir = TempDir::new().unwrap();
        let cache = ResultCache::open(dir.path().join("cache.json"));
        assert_eq!(cache.lookup(&fingerprint("a")), None);

        cache.store(fingerprint("a"), result("1.2.1+3")).unwrap();
        assert_eq!(cache.lookup(&fingerprint("a")), Some(result("1.2.1+3")));
        assert_eq!(cache.lookup(&fingerprint("b")), None);
    }

    #[test]
    fn test_entry_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        ResultCache::open(&path)
            .store(fingerprint("a"), result("2.0.0"))
            .unwrap();

        let reopened = ResultCache::open(&path);
        assert_eq!(reopened.lookup(&fingerprint("a")), Some(result("2.0.0")));
    }

    #[test]
    fn test_store_replaces_previous_entry() {
        let dir = TempDir::new().unwrap();
        let cache = ResultCache::open(dir.path().join("cache.json"));
        cache.store(fingerprint("a"), result("1.0.0")).unwrap();
        cache.store(fingerprint("b"), result("1.0.1")).unwrap();

        assert_eq!(cache.lookup(&fingerprint("a")), None);
        assert_eq!(cache.lookup(&fingerprint("b")), Some(result("1.0.1")));
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let cache = ResultCache::open(&path);
        assert_eq!(cache.lookup(&fingerprint("a")), None);

        cache.store(fingerprint("a"), result("1.0.0")).unwrap();
        assert_eq!(
            ResultCache::open(&path).lookup(&fingerprint("a")),
            Some(result("1.0.0"))
        );
    }

    #[test]
    fn test_load_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "[]").unwrap();
        assert!(matches!(
            load_entry(&path),
            Err(NextVerError::CacheCorruption(_))
        ));
    }

    #[test]
    fn test_other_format_version_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let mut entry = CacheEntry::new(fingerprint("a"), result("1.0.0"));
        entry.format_version = CACHE_FORMAT_VERSION + 1;
        fs::write(&path, serde_json::to_string(&entry).unwrap()).unwrap();

        assert_eq!(ResultCache::open(&path).lookup(&fingerprint("a")), None);
    }

    #[test]
    fn test_in_git_dir_location() {
        let dir = TempDir::new().unwrap();
        let cache = ResultCache::in_git_dir(dir.path());
        assert_eq!(cache.path(), dir.path().join("nextver").join("cache.json"));
    }
}
