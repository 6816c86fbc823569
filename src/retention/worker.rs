//! Retention worker for purging inactive customers.
//!
//! A single pass computes the cutoff date, bulk-deletes customers whose
//! last order is strictly before it, and reports the count. The worker
//! repeats the pass at the configured interval.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::RetentionConfig,
    db::{DbError, DbPool, DbResult},
    retention::RunLog,
};

/// Errors from a recorded retention pass.
#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Failed to write run log: {0}")]
    RunLog(#[from] std::io::Error),
}

/// Results from a single retention pass.
#[derive(Debug)]
pub struct RetentionRunResult {
    /// Number of customers deleted.
    pub customers_deleted: u64,
    /// The cutoff date used for this pass.
    pub cutoff: DateTime<Utc>,
    /// Whether this was a dry run (nothing actually deleted).
    pub dry_run: bool,
}

impl RetentionRunResult {
    /// Check if any customers were deleted.
    pub fn has_deletions(&self) -> bool {
        self.customers_deleted > 0
    }
}

/// Compute the retention cutoff: exactly `inactive_days` days before `now`.
///
/// Customers whose last order is strictly before the cutoff are eligible
/// for deletion; a customer whose last order falls exactly on the cutoff
/// is retained. A window too large to represent saturates at the minimum
/// timestamp, which no stored row predates, so nothing is deleted.
pub fn compute_cutoff(now: DateTime<Utc>, inactive_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(inactive_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Run a single retention pass.
///
/// With `dry_run` set, logs the cutoff and deletes nothing. A disabled
/// policy (`inactive_days = 0`) also deletes nothing.
pub async fn run_retention(
    db: &DbPool,
    config: &RetentionConfig,
    now: DateTime<Utc>,
) -> DbResult<RetentionRunResult> {
    let cutoff = compute_cutoff(now, config.inactive_days);

    if !config.is_enabled() {
        tracing::info!("Retention policy disabled (inactive_days = 0), nothing to delete");
        return Ok(RetentionRunResult {
            customers_deleted: 0,
            cutoff,
            dry_run: config.safety.dry_run,
        });
    }

    if config.safety.dry_run {
        tracing::info!(
            cutoff = %cutoff,
            "DRY RUN: Would delete customers with last order before {}",
            cutoff
        );
        return Ok(RetentionRunResult {
            customers_deleted: 0,
            cutoff,
            dry_run: true,
        });
    }

    let max_deletes = if config.safety.max_deletes_per_run == 0 {
        u64::MAX
    } else {
        config.safety.max_deletes_per_run
    };

    let deleted = db
        .customers()
        .delete_inactive_before(cutoff, config.safety.batch_size, max_deletes)
        .await?;

    if deleted > 0 {
        tracing::debug!(
            deleted = deleted,
            cutoff = %cutoff,
            "Deleted inactive customers"
        );
    }

    Ok(RetentionRunResult {
        customers_deleted: deleted,
        cutoff,
        dry_run: false,
    })
}

/// Run a single retention pass and record the outcome in the run log.
///
/// Success and failure both append a line, so the run log alone tells the
/// whole history of the job. A run-log write failure on a successful pass
/// is itself an error; on a failed pass the delete error takes precedence
/// and the write failure is only logged.
pub async fn run_recorded(
    db: &DbPool,
    config: &RetentionConfig,
    run_log: Option<&RunLog>,
    now: DateTime<Utc>,
) -> Result<RetentionRunResult, RetentionError> {
    match run_retention(db, config, now).await {
        Ok(result) => {
            if let Some(log) = run_log {
                log.record_success(now, result.customers_deleted)?;
            }
            Ok(result)
        }
        Err(e) => {
            if let Some(log) = run_log
                && let Err(io_err) = log.record_failure(now, &e.to_string())
            {
                tracing::warn!(error = %io_err, path = %log.path().display(), "Failed to write run log");
            }
            Err(e.into())
        }
    }
}

/// Starts the retention worker as a background task.
///
/// The worker runs in a loop, purging inactive customers at the configured
/// interval. A failed pass is logged and recorded in the run log; the loop
/// continues. Runs indefinitely until the task is cancelled.
pub async fn start_retention_worker(
    db: Arc<DbPool>,
    config: RetentionConfig,
    run_log: Option<RunLog>,
) {
    if !config.is_enabled() {
        tracing::info!("Retention worker not started: policy disabled (inactive_days = 0)");
        return;
    }

    let dry_run_msg = if config.safety.dry_run {
        " (DRY RUN)"
    } else {
        ""
    };

    tracing::info!(
        inactive_days = config.inactive_days,
        interval_hours = config.interval_hours,
        dry_run = config.safety.dry_run,
        "Starting retention worker{}",
        dry_run_msg
    );

    let interval = config.interval();

    loop {
        let now = Utc::now();
        match run_recorded(&db, &config, run_log.as_ref(), now).await {
            Ok(result) => {
                if result.has_deletions() {
                    tracing::info!(
                        deleted = result.customers_deleted,
                        cutoff = %result.cutoff,
                        "Retention pass complete{}",
                        dry_run_msg
                    );
                } else {
                    tracing::debug!("Retention pass complete, no customers to delete");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Error running retention pass");
            }
        }

        tokio::time::sleep(interval).await;
    }
}
