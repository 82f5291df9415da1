//! Commit classification by diff shape.
//!
//! Append-only growth of the log document adds lines. Reformatting the last
//! record (`}` becoming `},`) costs one deletion and one addition. A commit is
//! suspicious only when it removes more than it adds by more than
//! `TOLERANCE` lines.
//!
//! Known limitation: this is a heuristic, not a proof. A rewrite that deletes
//! records and inserts at least as many decoy lines in the same commit is
//! classified as benign.

use tracing::{debug, warn};

use witness_contracts::tamper::{Commit, ScanWarning, TamperRecord, TamperReport};

/// Net deletions a commit may carry before it counts as tampering.
pub const TOLERANCE: usize = 2;

/// Line counts of one unified diff, excluding the `---`/`+++` file headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub additions: usize,
    pub deletions: usize,
}

impl DiffStats {
    /// Count added and removed lines in `diff`.
    pub fn from_diff(diff: &str) -> Self {
        let mut stats = Self::default();
        for line in diff.lines() {
            if line.starts_with('+') && !line.starts_with("+++") {
                stats.additions += 1;
            } else if line.starts_with('-') && !line.starts_with("---") {
                stats.deletions += 1;
            }
        }
        stats
    }

    pub fn is_suspicious(&self) -> bool {
        self.deletions > self.additions + TOLERANCE
    }

    /// `deletions - TOLERANCE` for suspicious diffs, `None` otherwise.
    pub fn deletion_count(&self) -> Option<usize> {
        self.is_suspicious().then(|| self.deletions - TOLERANCE)
    }
}

/// Classify one commit.
///
/// Returns `Ok(Some(record))` for a suspicious commit, `Ok(None)` for a benign
/// one, and `Err(warning)` when the commit carries no diff.
pub fn classify(commit: &Commit) -> Result<Option<TamperRecord>, ScanWarning> {
    let diff = commit.diff.as_deref().ok_or_else(|| ScanWarning {
        hash: commit.hash.clone(),
        reason: "diff could not be retrieved".to_string(),
    })?;

    let stats = DiffStats::from_diff(diff);
    debug!(
        commit = %commit.hash,
        additions = stats.additions,
        deletions = stats.deletions,
        "classified commit"
    );

    Ok(stats.deletion_count().map(|deletion_count| TamperRecord {
        hash: commit.hash.clone(),
        author: commit.author.clone(),
        date: commit.date.clone(),
        message: commit.message.clone(),
        deletion_count,
    }))
}

/// Classify every commit, collecting findings and warnings in input order.
pub fn detect(commits: &[Commit]) -> TamperReport {
    let mut report = TamperReport::default();

    for commit in commits {
        match classify(commit) {
            Ok(Some(record)) => {
                warn!(
                    commit = %record.hash,
                    author = %record.author,
                    deletion_count = record.deletion_count,
                    "suspicious deletion in log history"
                );
                report.findings.push(record);
            }
            Ok(None) => {}
            Err(warning) => {
                warn!(commit = %warning.hash, reason = %warning.reason, "skipping commit during tamper scan");
                report.warnings.push(warning);
            }
        }
    }

    report
}
