//! Collaborator traits for the witness workflow.
//!
//! These three traits are the boundary between the orchestrator and the
//! outside world:
//!
//! - `Replicator`: the remote git working copy (fetch, push, history)
//! - `Confirmer`: the operator's yes/no on the exact command string
//! - `CommandRunner`: the privileged execution itself
//!
//! The orchestrator never calls `CommandRunner::run` unless the log entry for
//! that command has been pushed.

use std::path::{Path, PathBuf};

use witness_contracts::{error::WitnessResult, tamper::Commit};

use crate::runner::CommandExit;

/// A local working copy backed by a remote repository on branch `main`.
pub trait Replicator {
    /// Clone the remote if there is no working copy yet.
    fn ensure_cloned(&self) -> WitnessResult<()>;

    /// Make the working copy match the remote `main` exactly.
    ///
    /// Clones instead when no working copy exists. Local commits and edits
    /// that never reached the remote are discarded, never merged; callers
    /// that care about them read `published` first. Any failure is a
    /// `ReplicationError`, and the caller must not log or execute.
    fn pull(&self) -> WitnessResult<()>;

    /// Contents of `path` on the remote `main` as of the last fetch or
    /// successful push, or `None` if the working copy has never seen it there.
    fn published(&self, path: &Path) -> WitnessResult<Option<String>>;

    /// Stage `paths` (relative to the working copy), commit if anything
    /// changed, and push to `main`.
    fn commit_and_push(&self, paths: &[PathBuf]) -> WitnessResult<()>;

    /// Every commit on any ref that touched `path`, each with its diff.
    ///
    /// Order is not significant to callers.
    fn history_for(&self, path: &Path) -> WitnessResult<Vec<Commit>>;

    /// Root of the working copy.
    fn workdir(&self) -> &Path;
}

/// Asks the operator to approve a command.
pub trait Confirmer {
    /// Return true only on an explicit affirmative answer.
    fn confirm(&self, command: &str) -> bool;
}

/// Runs the approved command.
pub trait CommandRunner {
    /// Run `argv` with inherited stdio and wait for it.
    fn run(&self, argv: &[String]) -> WitnessResult<CommandExit>;
}
