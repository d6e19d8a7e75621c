//! The on-disk parse cache (§4.8): keyed by a fingerprint over every
//! discovered file's `(path, mtime, size)`, written atomically so a reader
//! never observes a half-written cache file.
//!
//! The cache is a pure optimization — a miss, a version mismatch, or a
//! corrupted file all just mean "re-parse", never a hard failure. Only an
//! I/O error on the cache *directory* itself (unwritable, disk full on
//! write) surfaces as [`AppStreamError::Cache`].

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::component::Component;
use crate::error::{AppStreamError, Result};

/// Bumped whenever the on-disk encoding of a cached [`Component`] list
/// changes incompatibly; a stored file with a different version is
/// treated as a miss rather than an error.
const CACHE_FORMAT_VERSION: u16 = 1;
const MAGIC: &[u8; 4] = b"ASPC";

/// A fingerprint over the directory listing the cache was built from:
/// every `(path, mtime, size)` tuple, order-independent. Two directory
/// scans with the same fingerprint are assumed to contain the same files
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn build(entries: impl IntoIterator<Item = (PathBuf, SystemTime, u64)>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut hasher = DefaultHasher::new();
        for (path, mtime, size) in &entries {
            path.hash(&mut hasher);
            mtime.hash(&mut hasher);
            size.hash(&mut hasher);
        }
        Self(hasher.finish())
    }

    fn as_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

/// A single cache file under the cache directory, one per origin
/// (`<origin-name-hash>.cache`).
pub struct Cache {
    directory: PathBuf,
}

impl Cache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    fn path_for(&self, origin: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        origin.hash(&mut hasher);
        self.directory.join(format!("{:016x}.cache", hasher.finish()))
    }

    /// Loads the cached components for `origin` if the stored fingerprint
    /// matches `expected`. Any mismatch, corruption, or format-version
    /// skew is a cache miss (`Ok(None)`), not an error.
    pub fn load(&self, origin: &str, expected: Fingerprint) -> Result<Option<Vec<Component>>> {
        let path = self.path_for(origin);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppStreamError::File { path, source: e }),
        };

        if bytes.len() < MAGIC.len() + 2 + 8 {
            log::debug!("cache file {} is too short, treating as a miss", path.display());
            return Ok(None);
        }
        if &bytes[0..4] != MAGIC {
            log::debug!("cache file {} has a bad magic, treating as a miss", path.display());
            return Ok(None);
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != CACHE_FORMAT_VERSION {
            log::debug!("cache file {} is format v{version}, current is v{CACHE_FORMAT_VERSION}", path.display());
            return Ok(None);
        }
        let stored_fingerprint = u64::from_le_bytes(bytes[6..14].try_into().unwrap());
        if stored_fingerprint != expected.0 {
            return Ok(None);
        }

        match serde_json::from_slice::<Vec<Component>>(&bytes[14..]) {
            Ok(components) => Ok(Some(components)),
            Err(e) => {
                log::warn!("cache file {} failed to deserialize ({e}), treating as a miss", path.display());
                Ok(None)
            }
        }
    }

    /// Writes `components` for `origin`, keyed by `fingerprint`. Uses a
    /// temp-file-then-rename so a reader never sees a partially written
    /// cache (§4.8).
    pub fn store(&self, origin: &str, fingerprint: Fingerprint, components: &[Component]) -> Result<()> {
        fs::create_dir_all(&self.directory).map_err(|e| AppStreamError::Cache {
            path: self.directory.clone(),
            message: e.to_string(),
        })?;

        let path = self.path_for(origin);
        let tmp_path = path.with_extension("cache.tmp");

        let body = serde_json::to_vec(components).map_err(|e| AppStreamError::Cache {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut file = fs::File::create(&tmp_path).map_err(|e| AppStreamError::File {
            path: tmp_path.clone(),
            source: e,
        })?;
        file.write_all(MAGIC).and_then(|_| file.write_all(&CACHE_FORMAT_VERSION.to_le_bytes()))
            .and_then(|_| file.write_all(&fingerprint.as_bytes()))
            .and_then(|_| file.write_all(&body))
            .and_then(|_| file.sync_all())
            .map_err(|e| AppStreamError::File { path: tmp_path.clone(), source: e })?;
        drop(file);

        fs::rename(&tmp_path, &path).map_err(|e| AppStreamError::File { path, source: e })?;
        Ok(())
    }

    /// Removes every cache file for origins not present in `live_origins`,
    /// so a source directory that disappears doesn't leave a stale cache
    /// behind indefinitely.
    pub fn prune(&self, live_origins: &[String]) -> Result<()> {
        let live_paths: std::collections::HashSet<PathBuf> =
            live_origins.iter().map(|o| self.path_for(o)).collect();

        let dir = match fs::read_dir(&self.directory) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(AppStreamError::File { path: self.directory.clone(), source: e }),
        };
        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "cache") && !live_paths.contains(&path) {
                let _ = fs::remove_file(&path);
            }
        }
        Ok(())
    }
}

/// Computes a [`Fingerprint`] from a directory's metadata, without
/// actually reading file contents.
pub fn fingerprint_directory(paths: &[PathBuf]) -> Fingerprint {
    let entries = paths.iter().filter_map(|path| {
        let meta = fs::metadata(path).ok()?;
        let mtime = meta.modified().ok()?;
        Some((path.clone(), mtime, meta.len()))
    });
    Fingerprint::build(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;

    #[test]
    fn round_trips_through_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let components = vec![Component::new("org.example.Foo", ComponentKind::DesktopApplication)];
        let fp = Fingerprint::build([(PathBuf::from("/a"), SystemTime::UNIX_EPOCH, 10)]);

        cache.store("origin-a", fp, &components).unwrap();
        let loaded = cache.load("origin-a", fp).unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id.as_str(), "org.example.Foo");
    }

    #[test]
    fn fingerprint_mismatch_is_a_miss_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let components = vec![Component::new("org.example.Foo", ComponentKind::DesktopApplication)];
        let fp_a = Fingerprint::build([(PathBuf::from("/a"), SystemTime::UNIX_EPOCH, 10)]);
        let fp_b = Fingerprint::build([(PathBuf::from("/a"), SystemTime::UNIX_EPOCH, 20)]);

        cache.store("origin-a", fp_a, &components).unwrap();
        assert!(cache.load("origin-a", fp_b).unwrap().is_none());
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let fp = Fingerprint::build([(PathBuf::from("/a"), SystemTime::UNIX_EPOCH, 10)]);
        assert!(cache.load("never-written", fp).unwrap().is_none());
    }

    #[test]
    fn corrupted_body_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let fp = Fingerprint::build([(PathBuf::from("/a"), SystemTime::UNIX_EPOCH, 10)]);

        let path = cache.path_for("origin-a");
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&CACHE_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&fp.as_bytes());
        bytes.extend_from_slice(b"not valid json");
        fs::write(&path, bytes).unwrap();

        assert!(cache.load("origin-a", fp).unwrap().is_none());
    }

    #[test]
    fn prune_removes_dead_origins() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let components = vec![Component::new("org.example.Foo", ComponentKind::DesktopApplication)];
        let fp = Fingerprint::build([(PathBuf::from("/a"), SystemTime::UNIX_EPOCH, 10)]);

        cache.store("origin-a", fp, &components).unwrap();
        cache.store("origin-b", fp, &components).unwrap();
        cache.prune(&["origin-a".to_string()]).unwrap();

        assert!(cache.load("origin-a", fp).unwrap().is_some());
        assert!(cache.load("origin-b", fp).unwrap().is_none());
    }
}
