//! # witness-codec
//!
//! Authenticated, password-based encryption of single log entries.
//!
//! ## Overview
//!
//! Every entry is encrypted independently: each blob embeds its own random
//! salt and nonce, so there is no nonce reuse even though one password covers
//! every entry ever written, and any entry can be decrypted on its own.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use witness_codec::Codec;
//!
//! let codec = Codec::new(config.password.clone());
//! let blob = codec.seal_entry(&entry);
//! let back = codec.open_entry(&blob)?;
//! ```

pub mod cipher;
pub mod codec;

pub use cipher::{decrypt, encrypt, PBKDF2_ROUNDS};
pub use codec::Codec;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use witness_contracts::{
        entry::{Actor, LogEntry},
        error::WitnessError,
    };

    use super::Codec;

    fn actor() -> Actor {
        Actor {
            user: "root".to_string(),
            hostname: "db-02".to_string(),
            cwd: "/".to_string(),
        }
    }

    #[test]
    fn seal_then_open_returns_the_same_entry() {
        let codec = Codec::new("hunter2");
        let entry = LogEntry::pending(&actor(), "systemctl restart nginx");

        let blob = codec.seal_entry(&entry);
        assert!(!blob.contains("nginx"), "plaintext must not leak into the blob");

        let opened = codec.open_entry(&blob).unwrap();
        assert_eq!(opened, entry);
    }

    #[test]
    fn open_with_other_password_fails() {
        let blob = Codec::new("one").seal_entry(&LogEntry::pending(&actor(), "id"));
        assert!(matches!(
            Codec::new("two").open_entry(&blob),
            Err(WitnessError::DecryptionError { .. })
        ));
    }

    #[test]
    fn open_rejects_non_entry_plaintext() {
        let codec = Codec::new("pw");
        let blob = codec.encrypt("just a string");
        match codec.open_entry(&blob) {
            Err(WitnessError::DecryptionError { reason }) => {
                assert!(reason.contains("not a log entry"), "unexpected reason: {reason}");
            }
            other => panic!("expected DecryptionError, got {:?}", other),
        }
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", Codec::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
