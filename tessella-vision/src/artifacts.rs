//! Debug artifact placement and eviction
//!
//! Artifacts are plain raster files written next to their source media. They
//! are transient: anything older than the configured age is fair game for
//! eviction, including partial files left behind by interrupted writes.

use crate::error::VisionError;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

const SUFFIX_LEN: usize = 6;

/// Default age in hours after which debug artifacts are evicted
pub const DEFAULT_MAX_AGE_HOURS: u64 = 24;

/// Return `desired` unchanged if nothing exists there, otherwise a variant
/// with a short random suffix inserted before the extension. Retries until
/// the candidate is vacant; with a six-character alphanumeric suffix a retry
/// is effectively never needed.
pub fn unique_artifact_path(desired: &Path) -> PathBuf {
    if !desired.exists() {
        return desired.to_path_buf();
    }

    let stem = desired
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("artifact");
    let extension = desired.extension().and_then(|e| e.to_str());

    loop {
        let suffix: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();
        let candidate = match extension {
            Some(ext) => desired.with_file_name(format!("{}-{}.{}", stem, suffix, ext)),
            None => desired.with_file_name(format!("{}-{}", stem, suffix)),
        };
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// Delete files in `dir` whose name matches `pattern` (a `*` wildcard
/// pattern) and whose modification time is older than `max_age`. Individual
/// failures are logged and skipped; only a missing directory or an unreadable
/// listing fails the call. Returns the number of files removed.
pub fn evict_stale_artifacts(
    dir: &Path,
    pattern: &str,
    max_age: Duration,
) -> Result<usize, VisionError> {
    if !dir.is_dir() {
        return Err(VisionError::NotFound(format!(
            "Artifact directory {} does not exist",
            dir.display()
        )));
    }

    let cutoff = match SystemTime::now().checked_sub(max_age) {
        Some(cutoff) => cutoff,
        None => return Ok(0),
    };

    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let name = entry.file_name();
        if !wildcard_match(pattern, &name.to_string_lossy()) {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                warn!("Cannot read modification time of {}: {}", path.display(), e);
                continue;
            }
        };

        if modified < cutoff {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Evicted stale artifact {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to evict {}: {}", path.display(), e),
            }
        }
    }

    Ok(removed)
}

/// Match `name` against `pattern`, where `*` matches any run of characters.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    fn matches(pattern: &[u8], name: &[u8]) -> bool {
        match (pattern.first(), name.first()) {
            (None, None) => true,
            (Some(b'*'), _) => {
                matches(&pattern[1..], name) || (!name.is_empty() && matches(pattern, &name[1..]))
            }
            (Some(&pc), Some(&nc)) if pc == nc => matches(&pattern[1..], &name[1..]),
            _ => false,
        }
    }
    matches(pattern.as_bytes(), name.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*.debug.png", "photo.debug.png"));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("photo-*.png", "photo-a1b2c3.png"));
        assert!(!wildcard_match("*.debug.png", "photo.png"));
        assert!(!wildcard_match("photo.png", "photo.jpg"));
        assert!(wildcard_match("", ""));
        assert!(!wildcard_match("", "x"));
    }

    #[test]
    fn test_unique_path_returns_vacant_path_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let desired = dir.path().join("render.debug.png");
        assert_eq!(unique_artifact_path(&desired), desired);
    }

    #[test]
    fn test_unique_path_disambiguates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let desired = dir.path().join("render.debug.png");
        fs::write(&desired, b"occupied").unwrap();

        let first = unique_artifact_path(&desired);
        assert_ne!(first, desired);
        assert_eq!(first.extension().unwrap(), "png");
        fs::write(&first, b"occupied").unwrap();

        let second = unique_artifact_path(&desired);
        assert_ne!(second, desired);
        assert_ne!(second, first);
    }

    #[test]
    fn test_unique_path_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let desired = dir.path().join("render");
        fs::write(&desired, b"occupied").unwrap();

        let unique = unique_artifact_path(&desired);
        assert_ne!(unique, desired);
        assert!(unique
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("render-"));
    }

    #[test]
    fn test_evict_missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = evict_stale_artifacts(&missing, "*", Duration::from_secs(60));
        assert!(matches!(result, Err(VisionError::NotFound(_))));
    }

    #[test]
    fn test_evict_respects_age_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let old_path = dir.path().join("old.debug.png");
        let fresh_path = dir.path().join("fresh.debug.png");
        fs::write(&old_path, b"old").unwrap();
        fs::write(&fresh_path, b"fresh").unwrap();

        let old_mtime = SystemTime::now() - Duration::from_secs(25 * 3600);
        let file = fs::OpenOptions::new().write(true).open(&old_path).unwrap();
        file.set_modified(old_mtime).unwrap();
        drop(file);

        let fresh_mtime = SystemTime::now() - Duration::from_secs(3600);
        let file = fs::OpenOptions::new().write(true).open(&fresh_path).unwrap();
        file.set_modified(fresh_mtime).unwrap();
        drop(file);

        let removed =
            evict_stale_artifacts(dir.path(), "*.debug.png", Duration::from_secs(24 * 3600))
                .unwrap();
        assert_eq!(removed, 1);
        assert!(!old_path.exists());
        assert!(fresh_path.exists());
    }

    #[test]
    fn test_evict_ignores_non_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("keep.txt");
        fs::write(&other, b"keep").unwrap();

        let old_mtime = SystemTime::now() - Duration::from_secs(48 * 3600);
        let file = fs::OpenOptions::new().write(true).open(&other).unwrap();
        file.set_modified(old_mtime).unwrap();
        drop(file);

        let removed =
            evict_stale_artifacts(dir.path(), "*.debug.png", Duration::from_secs(24 * 3600))
                .unwrap();
        assert_eq!(removed, 0);
        assert!(other.exists());
    }
}
