//! # witness-core
//!
//! The ordered logging workflow for privileged commands.
//!
//! This crate provides:
//! - The three collaborator traits (`Replicator`, `Confirmer`, `CommandRunner`)
//! - The `Orchestrator` that sequences them so that a command only runs after
//!   its encrypted log entry has been pushed
//! - `SystemRunner`, the child-process runner with signal forwarding
//! - The static viewer assets published alongside the log
//!
//! ## Usage
//!
//! ```rust,ignore
//! use witness_core::{Orchestrator, SystemRunner};
//!
//! let orchestrator = Orchestrator::new(&config, actor, replica, confirmer, runner);
//! match orchestrator.run(&argv)? { /* ... */ }
//! ```

pub mod orchestrator;
pub mod runner;
pub mod traits;
pub mod viewer;

pub use orchestrator::{Inspection, Orchestrator, Recorded, RunOutcome};
pub use runner::{propagate, CommandExit, SystemRunner};
