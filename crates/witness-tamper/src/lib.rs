//! # witness-tamper
//!
//! Tamper detection over the git history of the log document.
//!
//! Two pieces:
//!
//! 1. **Detection**: [`detect`] classifies each commit that touched the log
//!    by the shape of its diff (see [`detector`] for the rule and its known
//!    limitation).
//! 2. **De-duplication**: [`reported_hashes`] rebuilds the set of commits
//!    already recorded as tampering from the encrypted log itself, and
//!    [`unreported`] filters a scan down to new findings. Running the scan
//!    twice over unchanged history therefore reports nothing the second time.

pub mod detector;
pub mod reported;

pub use detector::{classify, detect, DiffStats, TOLERANCE};
pub use reported::{reported_hashes, unreported};

// ── Tests ─────────────────────────────────────────────────────────────────────
