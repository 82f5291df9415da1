//! # witness-replica
//!
//! Git replication for the witness log.
//!
//! `GitReplica` implements `witness_core::traits::Replicator` by driving the
//! `git` binary against a local working copy. Every remote operation runs
//! with terminal prompts disabled, so a bad token fails fast instead of
//! blocking on a credential prompt, and error text never includes the token.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use witness_core::traits::Replicator;
//! use witness_replica::GitReplica;
//!
//! let replica = GitReplica::from_config(&config);
//! replica.pull()?;
//! let history = replica.history_for(Path::new("log.json"))?;
//! ```

mod git;
pub mod replica;

pub use replica::{GitIdentity, GitReplica, BRANCH};

// ── Tests ─────────────────────────────────────────────────────────────────────
