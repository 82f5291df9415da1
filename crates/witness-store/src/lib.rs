//! # witness-store
//!
//! Append-only, file-backed collection of encrypted log records.
//!
//! ## Overview
//!
//! The store is agnostic to plaintext: it only ever sees Codec blobs. Ids are
//! assigned by position (`count + 1`), so they are sequential within one file
//! but carry no cryptographic meaning. Deleting a record is not prevented here;
//! it is detected from git history by `witness-tamper`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use witness_store::EntryStore;
//!
//! let store = EntryStore::new(repo_dir.join("log.json"));
//! let id = store.append(codec.seal_entry(&entry))?;
//! ```

pub mod file;

pub use file::{parse_document, EntryStore};

// ── Tests ─────────────────────────────────────────────────────────────────────
