//! File-backed entry store.
//!
//! The whole log is one pretty-printed JSON array. Every append reads the
//! document, pushes one record, and rewrites it. Pretty printing puts each
//! record field on its own line so git line diffs track records.
//!
//! Loading is fail-soft: a missing or unparseable document is treated as an
//! empty sequence. Writes go to a sibling temp file which is then renamed over
//! the log, so a crash leaves either the old or the new document on disk.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use witness_contracts::{
    entry::EncryptedRecord,
    error::{WitnessError, WitnessResult},
};

/// Parse a log document. Blank input is an empty log.
pub fn parse_document(contents: &str) -> WitnessResult<Vec<EncryptedRecord>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(contents).map_err(|e| WitnessError::StoreError {
        reason: format!("log document unparseable: {}", e),
    })
}

/// The on-disk log document.
#[derive(Debug, Clone)]
pub struct EntryStore {
    path: PathBuf,
}

impl EntryStore {
    /// Open the store at `path`. Nothing is read or created until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record in file order. Never fails; see module docs.
    pub fn load_all(&self) -> Vec<EncryptedRecord> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "log document absent, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "log document unreadable, treating as empty");
                return Vec::new();
            }
        };

        match parse_document(&contents) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "log document unparseable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Append one encrypted blob and return its id (`len + 1`).
    ///
    /// Returns `StoreError` if the rewritten document cannot be persisted.
    pub fn append(&self, blob: String) -> WitnessResult<u64> {
        let mut records = self.load_all();
        let id = records.len() as u64 + 1;
        records.push(EncryptedRecord { id, encrypted: blob });

        self.write_all(&records)?;

        info!(path = %self.path.display(), id, "entry appended");
        Ok(id)
    }

    fn write_all(&self, records: &[EncryptedRecord]) -> WitnessResult<()> {
        let mut document = serde_json::to_string_pretty(records).map_err(|e| WitnessError::StoreError {
            reason: format!("failed to serialize log document: {}", e),
        })?;
        document.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.store_error("create directory for", e))?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, document).map_err(|e| self.store_error("write", e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.store_error("replace", e)
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }

    fn store_error(&self, action: &str, e: io::Error) -> WitnessError {
        WitnessError::StoreError {
            reason: format!("failed to {} log document '{}': {}", action, self.path.display(), e),
        }
    }
}
