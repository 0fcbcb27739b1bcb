use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::error::{CacheError, CacheResult};
use super::result_cache::{CacheKey, ResultCache};
use crate::search::SearchResult;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    key: String,
    result: SearchResult,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: String,
    entries: Vec<SnapshotEntry>,
}

impl ResultCache {
    /// Writes every entry to `path` as JSON. Returns the number written.
    ///
    /// Writes to a sibling `.tmp` file first and renames it into place.
    pub fn save_snapshot(&self, path: &Path) -> CacheResult<usize> {
        self.run_pending_tasks();

        let entries: Vec<SnapshotEntry> = self
            .iter_entries()
            .map(|(key, result)| SnapshotEntry {
                key: key.to_hex(),
                result: SearchResult::clone(&result),
            })
            .collect();
        let count = entries.len();

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now().to_rfc3339(),
            entries,
        };
        let bytes = serde_json::to_vec(&snapshot).map_err(CacheError::Serialize)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), entries = count, "Saved result cache snapshot");
        Ok(count)
    }

    /// Restores entries from a snapshot written by [`Self::save_snapshot`].
    ///
    /// Entries with unparseable keys are skipped.
    pub fn load_snapshot(&self, path: &Path) -> CacheResult<usize> {
        let raw = fs::read(path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Snapshot =
            serde_json::from_slice(&raw).map_err(|source| CacheError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CacheError::UnsupportedVersion {
                path: path.to_path_buf(),
                version: snapshot.version,
            });
        }

        let mut restored = 0;
        for entry in snapshot.entries {
            match CacheKey::from_hex(&entry.key) {
                Some(key) => {
                    self.insert_raw(key, entry.result);
                    restored += 1;
                }
                None => warn!(key = %entry.key, "Skipping snapshot entry with invalid key"),
            }
        }

        info!(
            path = %path.display(),
            entries = restored,
            saved_at = %snapshot.saved_at,
            "Loaded result cache snapshot"
        );
        Ok(restored)
    }
}
