//! Incremental cache
//!
//! Maps a source path (relative to the directory holding the cache file) to
//! an opaque freshness string. The batch layer stores
//! `<version>;<options>;<length>` values in it; this module never looks
//! inside them.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::dirs_home;
use crate::error::FormatError;

/// In-memory view of one cache file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cache {
    directory: PathBuf,
    entries: BTreeMap<String, String>,
}

impl Cache {
    /// `$XDG_CACHE_HOME/rulefmt/cache.json`, falling back to `~/.cache`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CACHE_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs_home().map(|home| home.join(".cache")))?;
        Some(base.join("rulefmt").join("cache.json"))
    }

    /// An empty cache that will be keyed relative to `path`'s directory
    #[must_use]
    pub fn empty(path: &Path) -> Self {
        Cache {
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the cache stored at `path`
    ///
    /// A missing, unreadable or malformed file yields an empty cache.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let mut cache = Cache::empty(path);
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file yet");
                return cache;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read cache, starting empty");
                return cache;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(entries) => cache.entries = entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed cache, starting empty");
            }
        }
        cache
    }

    /// Write the cache to `path` as a JSON object
    ///
    /// Parent directories are not created. Failing to write into an
    /// existing directory is a writing error; a missing directory is
    /// reported as a reading error.
    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            FormatError::Writing(format!("Failed to serialize cache: {e}"))
        })?;
        match fs::write(path, json) {
            Ok(()) => {
                debug!(path = %path.display(), entries = self.entries.len(), "saved cache");
                Ok(())
            }
            Err(e) => {
                let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty());
                match directory {
                    Some(dir) if !dir.is_dir() => Err(FormatError::Reading(format!(
                        "Cache directory does not exist: {}",
                        dir.display()
                    ))),
                    _ => Err(FormatError::Writing(format!(
                        "Failed to write cache file at {}: {e}",
                        path.display()
                    ))),
                }
            }
        }
    }

    /// Cache key for `path`: relative to the cache directory when below it
    #[must_use]
    pub fn key(&self, path: &Path) -> String {
        path.strip_prefix(&self.directory)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
