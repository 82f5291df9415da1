//! Commit history and tamper finding types.
//!
//! `Commit` is read from the replication adapter and only ever inspected.
//! `TamperRecord` is derived per suspicious commit and is never persisted as
//! such: it is re-encoded as a tamper-warning `LogEntry`, which is what makes
//! the finding durable and replicated.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::entry::{Actor, LogEntry, TAMPER_EXIT_CODE};

/// Prefix of the `command` field of every tamper-warning entry.
pub const TAMPER_MARKER: &str = "[TAMPER DETECTED]";

/// Number of hash characters embedded in a tamper-warning command.
pub const SHORT_HASH_LEN: usize = 7;

const COMMIT_PHRASE: &str = " in commit ";

/// The abbreviated form of `hash` used in tamper-warning entries.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}

/// One commit that touched the log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub author: String,
    /// Author date as reported by git (ISO 8601).
    pub date: String,
    pub message: String,
    /// Patch of this commit against its parent, restricted to the log file.
    /// `None` when it could not be retrieved.
    pub diff: Option<String>,
}

/// A commit whose diff removed more lines than it added, beyond tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TamperRecord {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub message: String,
    pub deletion_count: usize,
}

impl TamperRecord {
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }

    /// The `command` text of the tamper-warning entry for this finding.
    pub fn summary(&self) -> String {
        format!(
            "{} {} line(s) deleted{}{} by {}",
            TAMPER_MARKER,
            self.deletion_count,
            COMMIT_PHRASE,
            self.short_hash(),
            self.author
        )
    }

    /// Re-encode this finding as a log entry written by `actor`.
    pub fn to_log_entry(&self, actor: &Actor) -> LogEntry {
        let output = format!(
            "Possible log tampering detected.\n\
             commit: {}\n\
             author: {}\n\
             date: {}\n\
             message: {}\n\
             net lines deleted: {}",
            self.hash, self.author, self.date, self.message, self.deletion_count
        );
        LogEntry {
            timestamp: Utc::now(),
            user: actor.user.clone(),
            hostname: actor.hostname.clone(),
            command: self.summary(),
            exit_code: Some(TAMPER_EXIT_CODE),
            output,
            cwd: actor.cwd.clone(),
        }
    }
}

/// Extract the short commit hash from a tamper-warning `command`.
///
/// Returns `None` for ordinary commands.
pub fn reported_hash(command: &str) -> Option<&str> {
    let rest = command.strip_prefix(TAMPER_MARKER)?;
    let (_, after) = rest.split_once(COMMIT_PHRASE)?;
    after.split_whitespace().next()
}

/// A commit the detector could not classify.
///
/// Not an error and not a finding: it is logged and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub hash: String,
    pub reason: String,
}

/// Everything one scan of the history produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TamperReport {
    pub findings: Vec<TamperRecord>,
    pub warnings: Vec<ScanWarning>,
}

impl TamperReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}
