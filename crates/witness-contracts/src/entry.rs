//! Log entry and persisted record types.
//!
//! `LogEntry` is the plaintext audit record. It is serialized to JSON and
//! encrypted before it goes anywhere; the JSON field names are camelCase
//! because the browser viewer reads the same document.
//!
//! `EncryptedRecord` is what the entry store actually persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exit code carried by tamper-warning entries.
///
/// Ordinary entries are written before the command runs and carry `None`.
pub const TAMPER_EXIT_CODE: i32 = -1;

/// Who is running the command, and where.
///
/// Gathered once at process entry and handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user: String,
    pub hostname: String,
    pub cwd: String,
}

/// One plaintext audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Creation time (UTC, RFC 3339 on the wire).
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub hostname: String,
    /// The full command line, or a tamper-warning message.
    pub command: String,
    /// `None` until the command has run; `TAMPER_EXIT_CODE` for tamper warnings.
    pub exit_code: Option<i32>,
    /// Empty for pre-execution entries; tamper diagnostics otherwise.
    pub output: String,
    pub cwd: String,
}

impl LogEntry {
    /// An entry for a command that is about to run.
    pub fn pending(actor: &Actor, command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            user: actor.user.clone(),
            hostname: actor.hostname.clone(),
            command: command.into(),
            exit_code: None,
            output: String::new(),
            cwd: actor.cwd.clone(),
        }
    }

    /// True if this entry documents detected tampering.
    pub fn is_tamper_warning(&self) -> bool {
        self.exit_code == Some(TAMPER_EXIT_CODE)
            && self.command.starts_with(crate::tamper::TAMPER_MARKER)
    }
}

/// One persisted record: a position-derived id and an opaque blob.
///
/// `id` is `count_of_existing_records + 1` at append time. It is not a
/// cryptographic sequence number and does not protect against deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    pub id: u64,
    pub encrypted: String,
}
