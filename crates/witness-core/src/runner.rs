//! Privileged command execution.
//!
//! `SystemRunner` spawns the approved command behind the configured privilege
//! program with inherited stdio. While the child runs, the parent ignores
//! SIGINT and SIGQUIT (the terminal delivers those to the child directly) and
//! forwards SIGTERM and SIGHUP to it. The previous dispositions come back when
//! the child has been reaped.
//!
//! The caller propagates the result with [`propagate`]: the child's exit code
//! becomes ours, and a terminating signal is re-raised on this process.

use std::{
    os::unix::process::ExitStatusExt,
    process::{Command, ExitStatus},
    sync::atomic::{AtomicI32, Ordering},
};

use nix::{
    libc,
    sys::signal::{kill, raise, sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal},
    unistd::Pid,
};
use tracing::{debug, warn};

use witness_contracts::error::{WitnessError, WitnessResult};

use crate::traits::CommandRunner;

/// How the privileged command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandExit {
    /// Exited normally with this status code.
    Code(i32),
    /// Killed by this signal number.
    Signal(i32),
}

impl CommandExit {
    pub fn from_status(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => Self::Code(code),
            (None, Some(signal)) => Self::Signal(signal),
            (None, None) => Self::Code(1),
        }
    }
}

/// Runs commands as child processes of this one.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    privilege_program: Option<String>,
}

impl SystemRunner {
    /// `privilege_program` is prepended to every argv (e.g. `sudo`); `None`
    /// runs the argv as given.
    pub fn new(privilege_program: Option<String>) -> Self {
        Self { privilege_program }
    }

    fn command(&self, argv: &[String]) -> WitnessResult<Command> {
        let (first, rest) = argv.split_first().ok_or_else(|| WitnessError::ExecutionError {
            reason: "no command given".to_string(),
        })?;

        let command = match &self.privilege_program {
            Some(program) => {
                let mut command = Command::new(program);
                command.args(argv);
                command
            }
            None => {
                let mut command = Command::new(first);
                command.args(rest);
                command
            }
        };
        Ok(command)
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> WitnessResult<CommandExit> {
        let mut command = self.command(argv)?;

        let mut child = command.spawn().map_err(|e| WitnessError::ExecutionError {
            reason: format!("failed to start '{}': {}", argv.join(" "), e),
        })?;
        debug!(pid = child.id(), "privileged command started");

        let _forwarding = SignalForwarding::install(child.id());

        let status = child.wait().map_err(|e| WitnessError::ExecutionError {
            reason: format!("failed to wait for '{}': {}", argv.join(" "), e),
        })?;

        let exit = CommandExit::from_status(status);
        debug!(?exit, "privileged command finished");
        Ok(exit)
    }
}

// ── Signal forwarding ─────────────────────────────────────────────────────────

/// Pid of the child currently being waited on; 0 when there is none.
static CHILD_PID: AtomicI32 = AtomicI32::new(0);

extern "C" fn forward_to_child(signo: libc::c_int) {
    let pid = CHILD_PID.load(Ordering::SeqCst);
    if pid > 0 {
        if let Ok(signal) = Signal::try_from(signo) {
            let _ = kill(Pid::from_raw(pid), signal);
        }
    }
}

/// Signal dispositions installed for the lifetime of one child.
struct SignalForwarding {
    previous: Vec<(Signal, SigAction)>,
}

impl SignalForwarding {
    fn install(child_pid: u32) -> Self {
        CHILD_PID.store(child_pid as i32, Ordering::SeqCst);

        let forward = SigAction::new(
            SigHandler::Handler(forward_to_child),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());

        let mut previous = Vec::new();
        for (signal, action) in [
            (Signal::SIGTERM, &forward),
            (Signal::SIGHUP, &forward),
            (Signal::SIGINT, &ignore),
            (Signal::SIGQUIT, &ignore),
        ] {
            // SAFETY: the handler only reads an atomic and calls kill(2).
            match unsafe { sigaction(signal, action) } {
                Ok(old) => previous.push((signal, old)),
                Err(e) => warn!(signal = %signal, error = %e, "could not install signal handler"),
            }
        }

        Self { previous }
    }
}

impl Drop for SignalForwarding {
    fn drop(&mut self) {
        for (signal, old) in self.previous.drain(..).rev() {
            // SAFETY: restores a disposition previously returned by sigaction.
            if let Err(e) = unsafe { sigaction(signal, &old) } {
                warn!(signal = %signal, error = %e, "could not restore signal handler");
            }
        }
        CHILD_PID.store(0, Ordering::SeqCst);
    }
}

// ── Exit propagation ──────────────────────────────────────────────────────────

/// End this process the way the child ended.
pub fn propagate(exit: CommandExit) -> ! {
    match exit {
        CommandExit::Code(code) => std::process::exit(code),
        CommandExit::Signal(signo) => reraise(signo),
    }
}

/// Re-raise `signo` on this process with its default disposition.
///
/// Falls back to exit status `128 + signo` if the signal does not terminate
/// the process.
pub fn reraise(signo: i32) -> ! {
    if let Ok(signal) = Signal::try_from(signo) {
        let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
        // SAFETY: installs the default disposition; no handler code runs.
        let _ = unsafe { sigaction(signal, &default) };
        let _ = raise(signal);
    }
    std::process::exit(128 + signo)
}
