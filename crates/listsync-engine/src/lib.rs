//! # listsync-engine
//!
//! Reconciliation of remote list membership against the local roster.
//!
//! One run ([`run_sync`]) discovers the managed subgroups, reconciles each
//! roster key against its subgroup in file order, then reconciles the
//! unified list against the union of every gated roster. Lists are handled
//! strictly one after another; a failure on one list never stops the next.

#![deny(unsafe_code)]

pub mod errors;
pub mod reconcile;
pub mod report;
pub mod runner;
pub mod unified;

pub use errors::EngineError;
pub use reconcile::{Reconciler, SyncMode};
pub use report::{ListOutcome, ListStatus, RunReport, RunStatus, SkipReason};
pub use runner::run_sync;
pub use unified::UnionRoster;
