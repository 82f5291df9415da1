//! # witness-contracts
//!
//! Shared types and errors for witness.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions, the tamper-warning text format, and
//! error types.

pub mod entry;
pub mod error;
pub mod tamper;
