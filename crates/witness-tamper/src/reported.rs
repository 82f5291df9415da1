//! The already-reported set.
//!
//! Tamper findings are persisted only as encrypted tamper-warning entries, so
//! the set of reported commits is re-derived from the log on every run by
//! decrypting each record and reading the short hash out of its command.

use std::collections::HashSet;

use tracing::debug;

use witness_codec::Codec;
use witness_contracts::{
    entry::EncryptedRecord,
    tamper::{reported_hash, TamperRecord},
};

/// Short hashes already recorded by tamper-warning entries in `records`.
///
/// Only entries carrying the tamper exit sentinel count; an ordinary command
/// that happens to look like a warning does not.
///
/// Records that fail to decrypt are skipped: this scan is advisory.
pub fn reported_hashes(records: &[EncryptedRecord], codec: &Codec) -> HashSet<String> {
    let mut reported = HashSet::new();

    for record in records {
        match codec.open_entry(&record.encrypted) {
            Ok(entry) if entry.is_tamper_warning() => {
                if let Some(hash) = reported_hash(&entry.command) {
                    reported.insert(hash.to_string());
                }
            }
            Ok(_) => {}
            Err(e) => {
                debug!(id = record.id, error = %e, "skipping undecryptable record");
            }
        }
    }

    reported
}

/// Findings whose short hash is not in `reported`, each short hash once.
pub fn unreported(findings: &[TamperRecord], reported: &HashSet<String>) -> Vec<TamperRecord> {
    let mut seen = HashSet::new();
    findings
        .iter()
        .filter(|f| !reported.contains(f.short_hash()))
        .filter(|f| seen.insert(f.short_hash().to_string()))
        .cloned()
        .collect()
}
