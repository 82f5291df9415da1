//! Error types for the witness workflow.
//!
//! All fallible operations return `WitnessResult<T>`. Each variant maps to one
//! failure class of the workflow and carries a human-readable reason.

use thiserror::Error;

/// The unified error type for witness.
#[derive(Debug, Error)]
pub enum WitnessError {
    /// A required configuration value is missing or invalid.
    ///
    /// Raised before any workflow step runs.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Clone, pull, commit, or push against the remote repository failed.
    ///
    /// Fatal for the current invocation: the privileged command does not run.
    #[error("replication error: {reason}")]
    ReplicationError { reason: String },

    /// A blob could not be decrypted: wrong password, altered, or malformed.
    #[error("decryption error: {reason}")]
    DecryptionError { reason: String },

    /// The local log document could not be written.
    #[error("entry store error: {reason}")]
    StoreError { reason: String },

    /// The privileged program could not be started or awaited.
    #[error("execution error: {reason}")]
    ExecutionError { reason: String },
}

/// Convenience alias used throughout the witness crates.
pub type WitnessResult<T> = Result<T, WitnessError>;
