//! services/dashboard/src/adapters/file_cache.rs
//!
//! A `LocalCache` backed by one JSON file per key inside a cache directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use student_records_core::ports::{LocalCache, PortError, PortResult};
use tracing::debug;

/// Stores each cache entry as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Opens (creating if needed) the cache directory.
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PortResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(PortError::Unexpected(format!("Invalid cache key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl LocalCache for FileCache {
    fn read(&self, key: &str) -> PortResult<Option<String>> {
        let path = self.entry_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unavailable(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> PortResult<()> {
        let path = self.entry_path(key)?;
        // Write to a sibling file first so a crash never leaves a torn entry.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .and_then(|_| std::fs::rename(&tmp, &path))
            .map_err(|e| {
                PortError::Unavailable(format!("Failed to write {}: {}", path.display(), e))
            })?;
        debug!(key, bytes = value.len(), "Wrote cache entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).unwrap();
        assert_eq!(cache.read("students").unwrap(), None);
    }

    #[test]
    fn written_entry_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileCache::open(dir.path())
            .unwrap()
            .write("students", r#"[{"id":"1"}]"#)
            .unwrap();

        let reopened = FileCache::open(dir.path()).unwrap();
        assert_eq!(
            reopened.read("students").unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
        assert!(dir.path().join("students.json").exists());
        assert!(!dir.path().join("students.json.tmp").exists());
    }

    #[test]
    fn open_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let cache = FileCache::open(&nested).unwrap();
        assert_eq!(cache.dir(), nested.as_path());
        assert!(nested.is_dir());
    }

    #[test]
    fn keys_that_escape_the_directory_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).unwrap();
        assert!(cache.write("../students", "[]").is_err());
        assert!(cache.read("").is_err());
    }

    #[test]
    fn unreadable_entry_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).unwrap();
        // A directory where the file should be cannot be read as text.
        std::fs::create_dir(dir.path().join("courses.json")).unwrap();
        assert!(matches!(
            cache.read("courses"),
            Err(PortError::Unavailable(_))
        ));
    }
}
