use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::hasher;
use crate::storage::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintStatus {
    /// First time this path has been seen.
    New,
    /// Content hash differs from the stored one.
    Changed,
    Unchanged,
}

impl FingerprintStatus {
    pub fn needs_update(self) -> bool {
        !matches!(self, FingerprintStatus::Unchanged)
    }
}

/// Durable "last known content hash" per input file.
#[derive(Debug)]
pub struct FingerprintIndex {
    db: Database,
}

impl FingerprintIndex {
    pub fn new(db: Database) -> Result<Self> {
        db.initialize()?;
        Ok(FingerprintIndex { db })
    }

    pub fn open(path: &str) -> Result<Self> {
        Self::new(Database::open(path)?)
    }

    /// Hash `path` and compare with the stored record, recording the new hash
    /// when it is new or changed.
    ///
    /// Not idempotent: once this has reported `New` or `Changed`, a second call
    /// for unchanged content reports `Unchanged`. Call it once per file per scan.
    pub fn check(&self, path: &Path) -> Result<FingerprintStatus> {
        let hash = hasher::content_hash(path)?;
        let key = index_key(path);

        match self.db.get_fingerprint(&key)? {
            None => {
                self.db.insert_fingerprint(&key, &hash)?;
                debug!("New fingerprint for {}", key);
                Ok(FingerprintStatus::New)
            }
            Some(record) if record.hash != hash => {
                self.db.update_fingerprint(&key, &hash)?;
                debug!("Fingerprint changed for {}", key);
                Ok(FingerprintStatus::Changed)
            }
            Some(_) => Ok(FingerprintStatus::Unchanged),
        }
    }

    pub fn needs_update(&self, path: &Path) -> Result<bool> {
        Ok(self.check(path)?.needs_update())
    }

    /// Drop the record for `path` so the next check treats it as new.
    pub fn forget(&self, path: &Path) -> Result<bool> {
        Ok(self.db.delete_fingerprint(&index_key(path))?)
    }

    pub fn stored_hash(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.db.get_fingerprint(&index_key(path))?.map(|fp| fp.hash))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.db.count_fingerprints()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove records whose file no longer exists. Returns the number removed.
    pub fn prune_missing(&self) -> Result<usize> {
        let mut removed = 0;
        for path in self.db.all_fingerprint_paths()? {
            if !Path::new(&path).exists() && self.db.delete_fingerprint(&path)? {
                debug!("Pruned fingerprint for {}", path);
                removed += 1;
            }
        }
        info!("Pruned {} stale fingerprint(s)", removed);
        Ok(removed)
    }

    pub fn clear(&self) -> Result<usize> {
        Ok(self.db.truncate()?)
    }
}

/// Canonical path string used as the record key. Falls back to the path as
/// given when it cannot be canonicalized.
fn index_key(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
