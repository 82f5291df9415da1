//! witness: run a privileged command only after an encrypted record of it has
//! been pushed to a shared git repository.
//!
//! Usage:
//!   witness exec -- apt update
//!   witness scan
//!   witness show --limit 20
//!
//! Configuration comes from `--config`, `$WITNESS_CONFIG`, or
//! `~/.config/witness/config.toml`, with `WITNESS_*` environment overrides.

mod confirm;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nix::unistd::{gethostname, getuid, User};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use witness_codec::Codec;
use witness_config::WitnessConfig;
use witness_contracts::{
    entry::{Actor, LogEntry},
    error::WitnessResult,
    tamper::short_hash,
};
use witness_core::{propagate, Orchestrator, RunOutcome, SystemRunner};
use witness_replica::GitReplica;
use witness_store::EntryStore;

use crate::confirm::TerminalConfirmer;

/// Exit status of `scan` when the history shows tampering.
const EXIT_TAMPERED: i32 = 2;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Tamper-evident log of privileged commands.
///
/// Every command is confirmed, encrypted, committed, and pushed before it runs.
/// Commits that delete log lines are flagged and recorded on the next run.
#[derive(Parser)]
#[command(name = "witness", version)]
struct Cli {
    /// Config file (default: $WITNESS_CONFIG or ~/.config/witness/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log a command, push the log, then run the command.
    Exec {
        /// The command and its arguments.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<String>,
    },
    /// Pull and check the log history for deletions. Writes nothing.
    Scan,
    /// Decrypt and print the local log.
    Show {
        /// Print only the last N entries.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to trace each workflow step.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = WitnessConfig::load(cli.config.as_deref()).and_then(|config| {
        debug!(?config, "configuration loaded");
        match cli.command {
            Command::Exec { argv } => exec(&config, argv),
            Command::Scan => scan(&config),
            Command::Show { limit } => show(&config, limit),
        }
    });

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("witness: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn exec(config: &WitnessConfig, argv: Vec<String>) -> WitnessResult<i32> {
    let orchestrator = orchestrator(config);

    match orchestrator.run(&argv)? {
        RunOutcome::Declined => {
            eprintln!("aborted");
            Ok(1)
        }
        RunOutcome::Completed { new_tampering, exit, .. } => {
            for finding in &new_tampering {
                eprintln!("witness: {}", finding.summary());
            }
            propagate(exit)
        }
    }
}

fn scan(config: &WitnessConfig) -> WitnessResult<i32> {
    let inspection = orchestrator(config).inspect()?;
    let report = &inspection.report;

    for warning in &report.warnings {
        eprintln!(
            "witness: could not inspect commit {}: {}",
            short_hash(&warning.hash),
            warning.reason
        );
    }

    if report.is_clean() {
        println!("no tampering detected");
        return Ok(0);
    }

    for finding in &report.findings {
        let pending = inspection
            .unreported
            .iter()
            .any(|u| u.short_hash() == finding.short_hash());
        println!(
            "{} ({}){}",
            finding.summary(),
            finding.date,
            if pending { " [not yet recorded]" } else { "" }
        );
    }
    Ok(EXIT_TAMPERED)
}

fn show(config: &WitnessConfig, limit: Option<usize>) -> WitnessResult<i32> {
    let store = EntryStore::new(config.log_path());
    let codec = Codec::new(config.password.clone());

    let records = store.load_all();
    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));

    for record in records.iter().skip(skip) {
        match codec.open_entry(&record.encrypted) {
            Ok(entry) => print_entry(record.id, &entry),
            Err(e) => {
                debug!(id = record.id, error = %e, "record did not decrypt");
                println!("#{} <undecryptable>", record.id);
            }
        }
    }
    Ok(0)
}

fn print_entry(id: u64, entry: &LogEntry) {
    let exit = match entry.exit_code {
        Some(code) => code.to_string(),
        None => "-".to_string(),
    };
    println!(
        "#{} {} {}@{} [{}] {} $ {}",
        id,
        entry.timestamp.to_rfc3339(),
        entry.user,
        entry.hostname,
        exit,
        entry.cwd,
        entry.command
    );
    for line in entry.output.lines() {
        println!("    {}", line);
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn orchestrator(config: &WitnessConfig) -> Orchestrator {
    Orchestrator::new(
        config,
        current_actor(),
        Box::new(GitReplica::from_config(config)),
        Box::new(TerminalConfirmer),
        Box::new(SystemRunner::new(config.privilege_program.clone())),
    )
}

/// The invoking user, this host, and the working directory.
fn current_actor() -> Actor {
    let user = User::from_uid(getuid())
        .ok()
        .flatten()
        .map(|u| u.name)
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "unknown".to_string());

    let hostname = gethostname()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());

    let cwd = std::env::current_dir()
        .map(|d| d.display().to_string())
        .unwrap_or_default();

    Actor { user, hostname, cwd }
}
