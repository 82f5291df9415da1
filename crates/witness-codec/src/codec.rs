//! `Codec`: the password-holding entry encoder.
//!
//! The password is handed over once from configuration; callers never see it
//! again. `Debug` output omits it.

use std::fmt;

use tracing::debug;

use witness_contracts::{
    entry::LogEntry,
    error::{WitnessError, WitnessResult},
};

use crate::cipher::{decrypt, encrypt};

/// Encrypts and decrypts whole `LogEntry` values with one long-lived password.
#[derive(Clone)]
pub struct Codec {
    password: String,
}

impl Codec {
    pub fn new(password: impl Into<String>) -> Self {
        Self { password: password.into() }
    }

    /// Encrypt an arbitrary string.
    pub fn encrypt(&self, plaintext: &str) -> String {
        encrypt(plaintext, &self.password)
    }

    /// Decrypt a blob produced with the same password.
    pub fn decrypt(&self, blob: &str) -> WitnessResult<String> {
        decrypt(blob, &self.password)
    }

    /// Serialize `entry` to JSON and encrypt it.
    ///
    /// # Panics
    ///
    /// Panics if `entry` cannot be serialized to JSON, which cannot happen
    /// for the plain-data `LogEntry` type.
    pub fn seal_entry(&self, entry: &LogEntry) -> String {
        let json = serde_json::to_string(entry).expect("LogEntry must always be serializable to JSON");
        self.encrypt(&json)
    }

    /// Decrypt a blob and parse it as a `LogEntry`.
    pub fn open_entry(&self, blob: &str) -> WitnessResult<LogEntry> {
        let json = self.decrypt(blob)?;
        serde_json::from_str(&json).map_err(|e| {
            debug!(error = %e, "decrypted payload did not parse as a log entry");
            WitnessError::DecryptionError {
                reason: format!("decrypted payload is not a log entry: {}", e),
            }
        })
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").field("password", &"<redacted>").finish()
    }
}
