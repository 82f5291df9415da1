//! `GitReplica`: the `Replicator` backed by a git working copy.
//!
//! The remote is always tracked on branch `main`. A fresh clone of an empty
//! remote points HEAD at an unborn `main` so the first commit lands there.
//!
//! Pulling never merges. Every host appends to the end of the same document,
//! so any two unsynchronised appends collide textually. `pull` resets the
//! working copy to the remote instead, and the orchestrator re-appends the
//! records that never reached it (see `Replicator::published`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use witness_config::WitnessConfig;
use witness_contracts::{
    error::{WitnessError, WitnessResult},
    tamper::Commit,
};
use witness_core::traits::Replicator;

use crate::git::Git;

pub const BRANCH: &str = "main";

/// Field separator in the `git log` format; cannot appear in author names or
/// subjects.
const FIELD_SEP: char = '\u{1f}';
const LOG_FORMAT: &str = "--format=%H%x1f%P%x1f%an%x1f%aI%x1f%s";

/// Remote-tracking ref for `BRANCH`, updated by every fetch and successful push.
const REMOTE_REF: &str = "refs/remotes/origin/main";

/// Identity recorded on commits made from the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

/// A local working copy of the log repository.
#[derive(Debug, Clone)]
pub struct GitReplica {
    workdir: PathBuf,
    remote_url: String,
    identity: GitIdentity,
    git: Git,
}

impl GitReplica {
    pub fn new(
        workdir: impl Into<PathBuf>,
        remote_url: impl Into<String>,
        identity: GitIdentity,
    ) -> Self {
        Self {
            workdir: workdir.into(),
            remote_url: remote_url.into(),
            identity,
            git: Git::new(None),
        }
    }

    /// Scrub `secret` from every error message this replica produces.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.git = Git::new(Some(secret.into()));
        self
    }

    pub fn from_config(config: &WitnessConfig) -> Self {
        let identity = GitIdentity {
            name: config.user.clone(),
            email: config.commit_email(),
        };
        Self::new(config.local_path.clone(), config.remote_url(), identity)
            .with_secret(config.token.clone())
    }

    fn is_cloned(&self) -> bool {
        self.workdir.join(".git").exists()
    }

    /// Run git inside the working copy and return stdout.
    fn git(&self, args: &[&str], what: &str) -> WitnessResult<String> {
        let mut command = self.git.command(Some(&self.workdir));
        command.args(args);
        self.git.output(command, what)
    }

    fn has_head(&self) -> WitnessResult<bool> {
        let mut command = self.git.command(Some(&self.workdir));
        command.args(["rev-parse", "--verify", "--quiet", "HEAD"]);
        Ok(self.git.status(command, "rev-parse")?.success())
    }

    fn remote_has_branch(&self) -> WitnessResult<bool> {
        let heads = self.git(&["ls-remote", "--heads", "origin", BRANCH], "ls-remote")?;
        Ok(!heads.trim().is_empty())
    }

    /// Abort a rebase left behind by an earlier interrupted or manual pull.
    fn abort_rebase(&self) -> WitnessResult<()> {
        let git_dir = self.workdir.join(".git");
        if git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists() {
            warn!(path = %self.workdir.display(), "aborting unfinished rebase in working copy");
            self.git(&["rebase", "--abort"], "rebase --abort")?;
        }
        Ok(())
    }

    fn has_any_ref(&self) -> WitnessResult<bool> {
        let refs = self.git(&["for-each-ref", "--count=1", "--format=%(refname)"], "for-each-ref")?;
        Ok(!refs.trim().is_empty())
    }

    /// Patch of `hash` against its first parent, limited to `path`. A root
    /// commit is diffed against the empty tree.
    fn diff_of(&self, hash: &str, first_parent: Option<&str>, path: &Path) -> WitnessResult<String> {
        let mut command = self.git.command(Some(&self.workdir));
        match first_parent {
            Some(parent) => {
                command.args(["diff", "--no-color", "--no-ext-diff", parent, hash, "--"]);
            }
            None => {
                command.args([
                    "diff-tree",
                    "-p",
                    "--no-color",
                    "--no-ext-diff",
                    "--no-commit-id",
                    "--root",
                    hash,
                    "--",
                ]);
            }
        }
        command.arg(path);
        self.git.output(command, "diff")
    }
}

impl Replicator for GitReplica {
    fn ensure_cloned(&self) -> WitnessResult<()> {
        if self.is_cloned() {
            return Ok(());
        }

        if let Some(parent) = self.workdir.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| WitnessError::ReplicationError {
                reason: format!("failed to create '{}': {}", parent.display(), e),
            })?;
        }

        info!(path = %self.workdir.display(), "cloning log repository");
        let mut command = self.git.command(None);
        command
            .args(["clone", "--quiet"])
            .arg(&self.remote_url)
            .arg(&self.workdir);
        self.git.output(command, "clone")?;

        self.git(&["config", "user.name", &self.identity.name], "config")?;
        self.git(&["config", "user.email", &self.identity.email], "config")?;

        if !self.has_head()? {
            debug!("remote is empty; starting on an unborn main");
            self.git(
                &["symbolic-ref", "HEAD", &format!("refs/heads/{}", BRANCH)],
                "symbolic-ref",
            )?;
        }
        Ok(())
    }

    fn pull(&self) -> WitnessResult<()> {
        self.ensure_cloned()?;
        self.abort_rebase()?;

        if !self.remote_has_branch()? {
            debug!("remote has no main branch yet; nothing to pull");
            return Ok(());
        }

        // Fetch first: when the network fails the working copy is untouched.
        self.git(&["fetch", "--quiet", "origin"], "fetch")?;
        self.git(&["reset", "--quiet", "--hard", REMOTE_REF], "reset")?;

        debug!(path = %self.workdir.display(), "working copy reset to remote main");
        Ok(())
    }

    fn published(&self, path: &Path) -> WitnessResult<Option<String>> {
        if !self.is_cloned() {
            return Ok(None);
        }

        let object = format!("{}:{}", REMOTE_REF, tree_path(path));
        let mut exists = self.git.command(Some(&self.workdir));
        exists.args(["cat-file", "-e", object.as_str()]);
        if !self.git.status(exists, "cat-file")?.success() {
            return Ok(None);
        }

        self.git(&["show", &object], "show").map(Some)
    }

    fn commit_and_push(&self, paths: &[PathBuf]) -> WitnessResult<()> {
        if !paths.is_empty() {
            let mut add = self.git.command(Some(&self.workdir));
            add.args(["add", "--"]).args(paths);
            self.git.output(add, "add")?;
        }

        let mut staged = self.git.command(Some(&self.workdir));
        staged.args(["diff", "--cached", "--quiet"]);
        match self.git.status(staged, "diff")?.code() {
            Some(0) => debug!("nothing staged; skipping commit"),
            Some(1) => {
                let message = format!(
                    "log: {}",
                    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
                );
                self.git(
                    &["-c", "commit.gpgsign=false", "commit", "--quiet", "-m", &message],
                    "commit",
                )?;
            }
            other => {
                return Err(WitnessError::ReplicationError {
                    reason: format!("git diff --cached exited with {:?}", other),
                });
            }
        }

        if !self.has_head()? {
            debug!("no commits yet; nothing to push");
            return Ok(());
        }

        self.git(
            &["push", "--quiet", "origin", &format!("HEAD:{}", BRANCH)],
            "push",
        )?;
        info!("log pushed");
        Ok(())
    }

    fn history_for(&self, path: &Path) -> WitnessResult<Vec<Commit>> {
        if !self.is_cloned() {
            return Err(WitnessError::ReplicationError {
                reason: format!("no working copy at '{}'", self.workdir.display()),
            });
        }
        if !self.has_any_ref()? {
            return Ok(Vec::new());
        }

        let mut command = self.git.command(Some(&self.workdir));
        command
            .args(["log", "--all", "--no-color", LOG_FORMAT, "--"])
            .arg(path);
        let log = self.git.output(command, "log")?;

        let mut commits = Vec::new();
        for line in log.lines().filter(|l| !l.is_empty()) {
            let mut fields = line.splitn(5, FIELD_SEP);
            let (Some(hash), Some(parents), Some(author), Some(date), Some(message)) = (
                fields.next(),
                fields.next(),
                fields.next(),
                fields.next(),
                fields.next(),
            ) else {
                warn!(line, "unrecognised git log line; skipping");
                continue;
            };

            let first_parent = parents.split_whitespace().next();
            let diff = match self.diff_of(hash, first_parent, path) {
                Ok(diff) => Some(diff),
                Err(e) => {
                    warn!(hash, error = %e, "could not read commit diff");
                    None
                }
            };

            commits.push(Commit {
                hash: hash.to_string(),
                author: author.to_string(),
                date: date.to_string(),
                message: message.to_string(),
                diff,
            });
        }

        debug!(count = commits.len(), "read log history");
        Ok(commits)
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }
}

/// `path` as a `/`-separated path inside a git tree.
fn tree_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
