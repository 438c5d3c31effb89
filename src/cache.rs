use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, io, io::Write, path::Path, path::PathBuf, time::Duration};
use tempfile::NamedTempFile;
use tracing::debug;

/// The single cache slot on disk: when it was written and the raw
/// upstream payload. The file is self-describing so the freshness check
/// works across restarts.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

/// One-slot disk cache for the upcoming-launches response.
///
/// Anything wrong with the file on read (missing, unreadable, malformed,
/// expired) is just a miss; only writes surface errors, and those are
/// non-fatal for callers holding the payload in memory.
pub struct LaunchCache {
    path: PathBuf,
    max_age: Duration,
}

impl LaunchCache {
    pub fn new(path: PathBuf, max_age: Duration) -> Self {
        Self { path, max_age }
    }

    /// Returns the cached entry if it parses and is younger than the
    /// freshness window.
    pub fn load(&self) -> Option<CacheEntry> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let entry: CacheEntry = serde_json::from_str(&raw).ok()?;

        let max_age = chrono::Duration::from_std(self.max_age).ok()?;
        if Utc::now().signed_duration_since(entry.timestamp) < max_age {
            Some(entry)
        } else {
            debug!("cache entry at {:?} expired", self.path);
            None
        }
    }

    /// Overwrites the slot with a freshly stamped entry and returns it.
    /// Writes go to a uniquely named temp file in the same directory and
    /// are renamed into place, so concurrent writers never share a temp
    /// path and a reader sees either the old or the new file, never a
    /// torn one. Last writer wins.
    pub fn save(&self, payload: &Value) -> io::Result<CacheEntry> {
        let entry = CacheEntry {
            timestamp: Utc::now(),
            data: payload.clone(),
        };

        let raw = serde_json::to_vec(&entry)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&raw)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("cached launch data at {:?}", self.path);
        Ok(entry)
    }
}
