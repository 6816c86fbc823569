//! Customer retention enforcement.
//!
//! This module provides the retention pass that permanently deletes
//! customers whose last order is older than the configured window, plus a
//! background worker that repeats the pass on an interval. Deletions are
//! batched to avoid long-running transactions, and a dry-run mode allows
//! testing the policy before enabling it.
//!
//! Every pass appends one line to the plain-text run log, preserving the
//! `YYYY-MM-DD HH:MM:SS - Deleted: <count>` format operators already watch.

mod run_log;
mod worker;

pub use run_log::RunLog;
pub use worker::{
    RetentionError, RetentionRunResult, compute_cutoff, run_recorded, run_retention,
    start_retention_worker,
};
