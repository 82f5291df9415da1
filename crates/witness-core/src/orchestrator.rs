//! The witness orchestrator: the ordered logging workflow.
//!
//! Every invocation walks the same gates, in order, each a hard precondition
//! of the next:
//!
//!   Confirm → Pull → Scan → Report tampering → Log → Push → Execute
//!
//! The ordering invariant is absolute: `CommandRunner::run()` is NEVER called
//! unless the entry for that command has been pushed. The only call site of
//! `run()` sits after a successful `commit_and_push()`.
//!
//! Pull resets the working copy to the remote. Records written locally but
//! never pushed (an interrupted run, a rejected push) are found beforehand by
//! comparing the local log with the last published one, and appended again
//! after the reset, so they go out with the next push.

use std::{collections::HashSet, path::PathBuf};

use tracing::{debug, info, warn};

use witness_codec::Codec;
use witness_config::WitnessConfig;
use witness_contracts::{
    entry::{Actor, EncryptedRecord, LogEntry},
    error::{WitnessError, WitnessResult},
    tamper::{TamperRecord, TamperReport},
};
use witness_store::{parse_document, EntryStore};
use witness_tamper::{detect, reported_hashes, unreported};

use crate::{
    runner::CommandExit,
    traits::{CommandRunner, Confirmer, Replicator},
    viewer,
};

/// How one invocation ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The operator declined. Nothing was pulled, written, or run.
    Declined,

    /// The entry was pushed and the command ran.
    Completed {
        /// Id of the ordinary entry for this command.
        entry_id: u64,
        /// Tampering first reported by this invocation.
        new_tampering: Vec<TamperRecord>,
        exit: CommandExit,
    },
}

/// What the logging gates (Pull through Push) produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub entry_id: u64,
    pub new_tampering: Vec<TamperRecord>,
}

/// A read-only look at the shared history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub report: TamperReport,
    /// Findings not yet recorded in the log.
    pub unreported: Vec<TamperRecord>,
}

/// Drives one invocation.
///
/// Owns the codec and store and the three collaborators. Built once at process
/// entry from the validated configuration.
pub struct Orchestrator {
    codec: Codec,
    store: EntryStore,
    log_file: PathBuf,
    actor: Actor,
    replica: Box<dyn Replicator>,
    confirmer: Box<dyn Confirmer>,
    runner: Box<dyn CommandRunner>,
}

impl Orchestrator {
    /// The log lives at `config.log_file` inside the replica's working copy.
    pub fn new(
        config: &WitnessConfig,
        actor: Actor,
        replica: Box<dyn Replicator>,
        confirmer: Box<dyn Confirmer>,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        let log_file = PathBuf::from(&config.log_file);
        let store = EntryStore::new(replica.workdir().join(&log_file));
        Self {
            codec: Codec::new(config.password.clone()),
            store,
            log_file,
            actor,
            replica,
            confirmer,
            runner,
        }
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Run the full workflow for `argv`.
    ///
    /// # Errors
    ///
    /// Pull and push failures return `ReplicationError`; a log write failure
    /// returns `StoreError`. In every error case the command has not run.
    /// A push failure leaves the entry in the local store, and the next
    /// invocation replays it onto the remote log.
    pub fn run(&self, argv: &[String]) -> WitnessResult<RunOutcome> {
        if argv.is_empty() {
            return Err(WitnessError::ExecutionError {
                reason: "no command given".to_string(),
            });
        }
        let command = argv.join(" ");

        // ── Step 1: Confirm ──────────────────────────────────────────────────
        if !self.confirmer.confirm(&command) {
            info!(command = %command, "operator declined");
            return Ok(RunOutcome::Declined);
        }

        // ── Steps 2–6: Pull, Scan, Report, Log, Push ─────────────────────────
        let recorded = self.record(&command)?;

        // ── Step 7: Execute ──────────────────────────────────────────────────
        //
        // Only reachable after the push succeeded. This is the ONLY call site
        // of runner.run() in the workflow.
        debug!(entry_id = recorded.entry_id, "entry replicated, executing command");
        let exit = self.runner.run(argv)?;

        Ok(RunOutcome::Completed {
            entry_id: recorded.entry_id,
            new_tampering: recorded.new_tampering,
            exit,
        })
    }

    /// Pull, scan, report new tampering, log `command`, and push.
    pub fn record(&self, command: &str) -> WitnessResult<Recorded> {
        // ── Step 2: Pull ─────────────────────────────────────────────────────
        //
        // Tamper detection must see the freshest history, so a failed pull
        // aborts before anything is written.
        self.sync()?;
        debug!("working copy up to date");

        // ── Step 3: Scan ─────────────────────────────────────────────────────
        let report = self.scan();

        // ── Step 4: Report new tampering ─────────────────────────────────────
        let new_tampering = self.report_tampering(&report)?;

        // ── Step 5: Log ──────────────────────────────────────────────────────
        let entry = LogEntry::pending(&self.actor, command);
        let entry_id = self.store.append(self.codec.seal_entry(&entry))?;
        info!(entry_id, user = %self.actor.user, "command logged");

        // ── Step 6: Push ─────────────────────────────────────────────────────
        self.push()?;
        info!(entry_id, "log replicated");

        Ok(Recorded { entry_id, new_tampering })
    }

    /// Pull and scan without writing anything.
    pub fn inspect(&self) -> WitnessResult<Inspection> {
        self.sync()?;
        let report = self.scan();
        let reported = reported_hashes(&self.store.load_all(), &self.codec);
        let unreported = unreported(&report.findings, &reported);
        Ok(Inspection { report, unreported })
    }

    /// Pull, then append again every unpushed record the pull discarded.
    fn sync(&self) -> WitnessResult<()> {
        let unpushed = self.unpushed()?;
        self.replica.pull()?;

        if unpushed.is_empty() {
            return Ok(());
        }

        let present: HashSet<String> = self
            .store
            .load_all()
            .into_iter()
            .map(|r| r.encrypted)
            .collect();

        for record in unpushed {
            if present.contains(&record.encrypted) {
                continue;
            }
            let id = self.store.append(record.encrypted)?;
            info!(entry_id = id, local_id = record.id, "replayed unpushed entry");
        }
        Ok(())
    }

    /// Local records absent from the log as last published.
    ///
    /// Blobs carry a random salt and nonce, so equal blobs are the same record.
    fn unpushed(&self) -> WitnessResult<Vec<EncryptedRecord>> {
        let local = self.store.load_all();
        if local.is_empty() {
            return Ok(local);
        }

        let published: HashSet<String> = match self.replica.published(&self.log_file)? {
            Some(document) => match parse_document(&document) {
                Ok(records) => records.into_iter().map(|r| r.encrypted).collect(),
                Err(e) => {
                    warn!(error = %e, "published log unparseable; treating every local record as unpushed");
                    HashSet::new()
                }
            },
            None => HashSet::new(),
        };

        let unpushed: Vec<EncryptedRecord> = local
            .into_iter()
            .filter(|r| !published.contains(&r.encrypted))
            .collect();
        if !unpushed.is_empty() {
            debug!(count = unpushed.len(), "local log has unpushed records");
        }
        Ok(unpushed)
    }

    /// Classify the log file's history. Never fails: an unreadable history is
    /// logged and treated as clean.
    fn scan(&self) -> TamperReport {
        match self.replica.history_for(&self.log_file) {
            Ok(commits) => {
                debug!(commits = commits.len(), "scanning log history");
                detect(&commits)
            }
            Err(e) => {
                warn!(error = %e, "could not read log history; skipping tamper scan");
                TamperReport::default()
            }
        }
    }

    /// Append one tamper-warning entry per finding not already in the log.
    fn report_tampering(&self, report: &TamperReport) -> WitnessResult<Vec<TamperRecord>> {
        if report.is_clean() {
            return Ok(Vec::new());
        }

        let reported = reported_hashes(&self.store.load_all(), &self.codec);
        let fresh = unreported(&report.findings, &reported);

        for finding in &fresh {
            let entry = finding.to_log_entry(&self.actor);
            let id = self.store.append(self.codec.seal_entry(&entry))?;
            warn!(
                entry_id = id,
                commit = %finding.hash,
                author = %finding.author,
                deletion_count = finding.deletion_count,
                "recorded new log tampering"
            );
        }

        if fresh.len() < report.findings.len() {
            debug!(
                already_reported = report.findings.len() - fresh.len(),
                "suppressed previously reported tampering"
            );
        }

        Ok(fresh)
    }

    /// Publish viewer assets and replicate them with the log.
    fn push(&self) -> WitnessResult<()> {
        let mut paths = viewer::publish(self.replica.workdir())?;
        paths.insert(0, self.log_file.clone());
        self.replica.commit_and_push(&paths)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{
        path::{Path, PathBuf},
        sync::{Arc, Mutex},
    };

    use tempfile::TempDir;

    use witness_config::WitnessConfig;
    use witness_contracts::{
        entry::{Actor, LogEntry, TAMPER_EXIT_CODE},
        error::{WitnessError, WitnessResult},
        tamper::{Commit, TAMPER_MARKER},
    };

    use crate::{
        runner::CommandExit,
        traits::{CommandRunner, Confirmer, Replicator},
    };

    use super::{Orchestrator, RunOutcome};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    type Journal = Arc<Mutex<Vec<String>>>;

    fn config(dir: &Path) -> WitnessConfig {
        WitnessConfig {
            password: "test-password".to_string(),
            repo: "acme/log".to_string(),
            user: "octocat".to_string(),
            token: "tok".to_string(),
            local_path: dir.to_path_buf(),
            log_file: "log.json".to_string(),
            privilege_program: None,
        }
    }

    fn actor() -> Actor {
        Actor {
            user: "alice".to_string(),
            hostname: "web-1".to_string(),
            cwd: "/srv".to_string(),
        }
    }

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    /// A replica over a plain directory that records every call.
    ///
    /// When `remote` holds a document, `pull` overwrites the local log with it
    /// the way a reset to the remote would.
    struct MockReplica {
        workdir: PathBuf,
        journal: Journal,
        remote: Arc<Mutex<Option<String>>>,
        history: Arc<Mutex<WitnessResult<Vec<Commit>>>>,
        fail_pull: bool,
        fail_push: bool,
        pushed: Arc<Mutex<Vec<Vec<PathBuf>>>>,
    }

    impl Replicator for MockReplica {
        fn ensure_cloned(&self) -> WitnessResult<()> {
            self.journal.lock().unwrap().push("clone".to_string());
            Ok(())
        }

        fn pull(&self) -> WitnessResult<()> {
            self.journal.lock().unwrap().push("pull".to_string());
            if self.fail_pull {
                return Err(WitnessError::ReplicationError { reason: "network down".to_string() });
            }
            if let Some(document) = &*self.remote.lock().unwrap() {
                std::fs::write(self.workdir.join("log.json"), document).unwrap();
            }
            Ok(())
        }

        fn published(&self, _path: &Path) -> WitnessResult<Option<String>> {
            Ok(self.remote.lock().unwrap().clone())
        }

        fn commit_and_push(&self, paths: &[PathBuf]) -> WitnessResult<()> {
            self.journal.lock().unwrap().push("push".to_string());
            if self.fail_push {
                return Err(WitnessError::ReplicationError { reason: "push rejected".to_string() });
            }
            self.pushed.lock().unwrap().push(paths.to_vec());
            let document = std::fs::read_to_string(self.workdir.join("log.json")).ok();
            *self.remote.lock().unwrap() = document;
            Ok(())
        }

        fn history_for(&self, _path: &Path) -> WitnessResult<Vec<Commit>> {
            self.journal.lock().unwrap().push("history".to_string());
            match &*self.history.lock().unwrap() {
                Ok(commits) => Ok(commits.clone()),
                Err(e) => Err(WitnessError::ReplicationError { reason: e.to_string() }),
            }
        }

        fn workdir(&self) -> &Path {
            &self.workdir
        }
    }

    struct MockConfirmer {
        answer: bool,
        journal: Journal,
    }

    impl Confirmer for MockConfirmer {
        fn confirm(&self, command: &str) -> bool {
            self.journal.lock().unwrap().push(format!("confirm:{command}"));
            self.answer
        }
    }

    struct MockRunner {
        exit: CommandExit,
        journal: Journal,
        calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl CommandRunner for MockRunner {
        fn run(&self, argv: &[String]) -> WitnessResult<CommandExit> {
            self.journal.lock().unwrap().push("run".to_string());
            self.calls.lock().unwrap().push(argv.to_vec());
            Ok(self.exit)
        }
    }

    /// Knobs and shared handles for one test invocation.
    struct Harness {
        dir: TempDir,
        journal: Journal,
        remote: Arc<Mutex<Option<String>>>,
        history: Arc<Mutex<WitnessResult<Vec<Commit>>>>,
        pushed: Arc<Mutex<Vec<Vec<PathBuf>>>>,
        calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                journal: Arc::new(Mutex::new(vec![])),
                remote: Arc::new(Mutex::new(None)),
                history: Arc::new(Mutex::new(Ok(vec![]))),
                pushed: Arc::new(Mutex::new(vec![])),
                calls: Arc::new(Mutex::new(vec![])),
            }
        }

        fn with_history(self, commits: Vec<Commit>) -> Self {
            *self.history.lock().unwrap() = Ok(commits);
            self
        }

        fn orchestrator(&self, confirm: bool, fail_pull: bool, fail_push: bool) -> Orchestrator {
            self.orchestrator_with_exit(confirm, fail_pull, fail_push, CommandExit::Code(0))
        }

        fn orchestrator_with_exit(
            &self,
            confirm: bool,
            fail_pull: bool,
            fail_push: bool,
            exit: CommandExit,
        ) -> Orchestrator {
            let replica = MockReplica {
                workdir: self.dir.path().to_path_buf(),
                journal: self.journal.clone(),
                remote: self.remote.clone(),
                history: self.history.clone(),
                fail_pull,
                fail_push,
                pushed: self.pushed.clone(),
            };
            let confirmer = MockConfirmer { answer: confirm, journal: self.journal.clone() };
            let runner = MockRunner { exit, journal: self.journal.clone(), calls: self.calls.clone() };

            Orchestrator::new(
                &config(self.dir.path()),
                actor(),
                Box::new(replica),
                Box::new(confirmer),
                Box::new(runner),
            )
        }

        fn entries(&self, orchestrator: &Orchestrator) -> Vec<LogEntry> {
            orchestrator
                .store()
                .load_all()
                .iter()
                .map(|r| orchestrator.codec().open_entry(&r.encrypted).unwrap())
                .collect()
        }

        fn journal(&self) -> Vec<String> {
            self.journal.lock().unwrap().clone()
        }
    }

    /// A commit whose diff deletes `deletions` lines and adds none.
    fn deleting_commit(hash: &str, deletions: usize) -> Commit {
        let mut diff = String::from("--- a/log.json\n+++ b/log.json\n@@ -1,8 +1,4 @@\n");
        for i in 0..deletions {
            diff.push_str(&format!("-  line {i}\n"));
        }
        Commit {
            hash: hash.to_string(),
            author: "mallory".to_string(),
            date: "2026-09-30T22:00:00+00:00".to_string(),
            message: "rewrite".to_string(),
            diff: Some(diff),
        }
    }

    // ── Test cases ────────────────────────────────────────────────────────────

    /// Fresh remote: one ordinary entry, pushed before the command runs.
    #[test]
    fn test_fresh_remote_end_to_end() {
        let harness = Harness::new();
        let orchestrator = harness.orchestrator(true, false, false);

        let outcome = orchestrator.run(&argv(&["apt", "update"])).unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed { entry_id: 1, new_tampering: vec![], exit: CommandExit::Code(0) }
        );

        let records = orchestrator.store().load_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);

        let entries = harness.entries(&orchestrator);
        assert_eq!(entries[0].command, "apt update");
        assert_eq!(entries[0].exit_code, None);
        assert_eq!(entries[0].user, "alice");
        assert_eq!(entries[0].hostname, "web-1");

        assert_eq!(
            harness.journal(),
            vec!["confirm:apt update", "pull", "history", "push", "run"]
        );
        assert_eq!(*harness.calls.lock().unwrap(), vec![argv(&["apt", "update"])]);
    }

    /// The log file and both viewer assets are staged together.
    #[test]
    fn test_push_stages_log_and_viewer_assets() {
        let harness = Harness::new();
        let orchestrator = harness.orchestrator(true, false, false);
        orchestrator.run(&argv(&["true"])).unwrap();

        let pushed = harness.pushed.lock().unwrap();
        assert_eq!(
            pushed[0],
            vec![
                PathBuf::from("log.json"),
                PathBuf::from("index.html"),
                PathBuf::from(".nojekyll"),
            ]
        );
        assert!(harness.dir.path().join("index.html").exists());
        assert!(harness.dir.path().join(".nojekyll").exists());
    }

    /// Declining has no side effects at all.
    #[test]
    fn test_decline_has_no_side_effects() {
        let harness = Harness::new();
        let orchestrator = harness.orchestrator(false, false, false);

        let outcome = orchestrator.run(&argv(&["rm", "-rf", "/tmp/x"])).unwrap();

        assert_eq!(outcome, RunOutcome::Declined);
        assert_eq!(harness.journal(), vec!["confirm:rm -rf /tmp/x"]);
        assert!(orchestrator.store().load_all().is_empty());
    }

    /// A failed pull aborts before any write and before execution.
    #[test]
    fn test_pull_failure_aborts_before_logging() {
        let harness = Harness::new();
        let orchestrator = harness.orchestrator(true, true, false);

        let result = orchestrator.run(&argv(&["reboot"]));

        assert!(matches!(result, Err(WitnessError::ReplicationError { .. })));
        assert!(orchestrator.store().load_all().is_empty());
        assert!(harness.calls.lock().unwrap().is_empty(), "command must not run");
        assert_eq!(harness.journal(), vec!["confirm:reboot", "pull"]);
    }

    /// Core ordering test: a failed push must prevent execution, and the
    /// entry survives locally for the next invocation.
    #[test]
    fn test_push_failure_blocks_execution() {
        let harness = Harness::new();
        let orchestrator = harness.orchestrator(true, false, true);

        let result = orchestrator.run(&argv(&["systemctl", "stop", "db"]));

        match result {
            Err(WitnessError::ReplicationError { reason }) => assert!(reason.contains("rejected")),
            other => panic!("expected ReplicationError, got {:?}", other),
        }
        assert!(harness.calls.lock().unwrap().is_empty(), "run() must not be called");
        assert_eq!(orchestrator.store().load_all().len(), 1);
        assert!(!harness.journal().contains(&"run".to_string()));
    }

    /// One deleting commit: one tamper entry, written before the ordinary one.
    #[test]
    fn test_tampering_reported_before_entry() {
        let harness = Harness::new()
            .with_history(vec![deleting_commit("9f8e7d6c5b4a39281706", 4)]);
        let orchestrator = harness.orchestrator(true, false, false);

        let outcome = orchestrator.run(&argv(&["apt", "upgrade"])).unwrap();

        let entries = harness.entries(&orchestrator);
        assert_eq!(entries.len(), 2);

        let warning = &entries[0];
        assert!(warning.command.starts_with(TAMPER_MARKER));
        assert!(warning.command.contains("9f8e7d6"));
        assert!(warning.command.contains("2 line(s)"));
        assert_eq!(warning.exit_code, Some(TAMPER_EXIT_CODE));
        assert!(warning.output.contains("9f8e7d6c5b4a39281706"));

        assert_eq!(entries[1].command, "apt upgrade");
        assert_eq!(entries[1].exit_code, None);

        match outcome {
            RunOutcome::Completed { entry_id, new_tampering, .. } => {
                assert_eq!(entry_id, 2);
                assert_eq!(new_tampering.len(), 1);
                assert_eq!(new_tampering[0].deletion_count, 2);
            }
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    /// A second run over unchanged history adds no tamper entries.
    #[test]
    fn test_tamper_reporting_is_idempotent() {
        let harness = Harness::new()
            .with_history(vec![deleting_commit("abcdef0123456789", 10)]);
        let orchestrator = harness.orchestrator(true, false, false);

        orchestrator.run(&argv(&["id"])).unwrap();
        let second = orchestrator.run(&argv(&["id"])).unwrap();

        match second {
            RunOutcome::Completed { new_tampering, entry_id, .. } => {
                assert!(new_tampering.is_empty());
                assert_eq!(entry_id, 3);
            }
            other => panic!("expected Completed, got {:?}", other),
        }

        let tamper_count = harness
            .entries(&orchestrator)
            .iter()
            .filter(|e| e.is_tamper_warning())
            .count();
        assert_eq!(tamper_count, 1);
    }

    /// History that cannot be read does not block logging or execution.
    #[test]
    fn test_history_failure_is_not_fatal() {
        let harness = Harness::new();
        *harness.history.lock().unwrap() =
            Err(WitnessError::ReplicationError { reason: "git log failed".to_string() });
        let orchestrator = harness.orchestrator(true, false, false);

        let outcome = orchestrator.run(&argv(&["uptime"])).unwrap();

        assert!(matches!(outcome, RunOutcome::Completed { entry_id: 1, .. }));
        assert_eq!(harness.calls.lock().unwrap().len(), 1);
    }

    /// A commit without a retrievable diff is a warning, not tampering.
    #[test]
    fn test_missing_diff_is_not_tampering() {
        let mut commit = deleting_commit("1111111222", 50);
        commit.diff = None;
        let harness = Harness::new().with_history(vec![commit]);
        let orchestrator = harness.orchestrator(true, false, false);

        orchestrator.run(&argv(&["ls"])).unwrap();

        assert_eq!(orchestrator.store().load_all().len(), 1);
    }

    /// The runner's exit (including a signal) is handed back unchanged.
    #[test]
    fn test_exit_is_propagated() {
        let harness = Harness::new();
        let orchestrator =
            harness.orchestrator_with_exit(true, false, false, CommandExit::Signal(9));

        match orchestrator.run(&argv(&["sleep", "100"])).unwrap() {
            RunOutcome::Completed { exit, .. } => assert_eq!(exit, CommandExit::Signal(9)),
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    /// Inspection reports findings without writing.
    #[test]
    fn test_inspect_is_read_only() {
        let harness = Harness::new()
            .with_history(vec![deleting_commit("0badc0de00", 7)]);
        let orchestrator = harness.orchestrator(true, false, false);

        let inspection = orchestrator.inspect().unwrap();

        assert_eq!(inspection.report.findings.len(), 1);
        assert_eq!(inspection.unreported.len(), 1);
        assert!(orchestrator.store().load_all().is_empty());
        assert_eq!(harness.journal(), vec!["pull", "history"]);
    }

    /// An entry whose push was rejected is replayed on top of what another
    /// host pushed meanwhile, then pushed with the next entry.
    #[test]
    fn test_unpushed_entry_is_replayed_after_pull() {
        let harness = Harness::new();
        let orchestrator = harness.orchestrator(true, false, false);
        orchestrator.run(&argv(&["first"])).unwrap();

        let rejected = harness.orchestrator(true, false, true);
        assert!(rejected.run(&argv(&["rejected"])).is_err());

        // Meanwhile another host appended to the published log.
        let other = tempfile::tempdir().unwrap();
        let other_store = witness_store::EntryStore::new(other.path().join("log.json"));
        std::fs::write(
            other_store.path(),
            harness.remote.lock().unwrap().clone().unwrap(),
        )
        .unwrap();
        let elsewhere = LogEntry::pending(&actor(), "elsewhere");
        other_store.append(orchestrator.codec().seal_entry(&elsewhere)).unwrap();
        *harness.remote.lock().unwrap() =
            Some(std::fs::read_to_string(other_store.path()).unwrap());

        let outcome = orchestrator.run(&argv(&["next"])).unwrap();

        assert!(matches!(outcome, RunOutcome::Completed { entry_id: 4, .. }));
        let commands: Vec<String> =
            harness.entries(&orchestrator).into_iter().map(|e| e.command).collect();
        assert_eq!(commands, vec!["first", "elsewhere", "rejected", "next"]);

        let published = harness.remote.lock().unwrap().clone().unwrap();
        assert_eq!(witness_store::parse_document(&published).unwrap().len(), 4);
    }

    /// Records already on the remote are not appended twice.
    #[test]
    fn test_published_records_are_not_replayed() {
        let harness = Harness::new();
        let orchestrator = harness.orchestrator(true, false, false);

        orchestrator.run(&argv(&["one"])).unwrap();
        orchestrator.run(&argv(&["two"])).unwrap();

        assert_eq!(orchestrator.store().load_all().len(), 2);
    }

    /// An empty argv is rejected before the operator is asked.
    #[test]
    fn test_empty_command_rejected() {
        let harness = Harness::new();
        let orchestrator = harness.orchestrator(true, false, false);

        assert!(matches!(
            orchestrator.run(&[]),
            Err(WitnessError::ExecutionError { .. })
        ));
        assert!(harness.journal().is_empty());
    }
}
