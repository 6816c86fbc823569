//! Retention policy configuration.
//!
//! # Example
//!
//! ```toml
//! [retention]
//! inactive_days = 365
//! interval_hours = 24
//!
//! [retention.safety]
//! dry_run = false
//! batch_size = 1000
//! max_deletes_per_run = 100000
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Retention policy configuration.
///
/// Customers whose last order is older than `inactive_days` are permanently
/// deleted. The `worker` subcommand repeats the pass every `interval_hours`;
/// the `run` subcommand executes exactly one pass regardless of interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Days of inactivity after which a customer is deleted.
    /// Set to 0 to disable deletion entirely (keep everyone).
    /// Default: 365
    #[serde(default = "default_inactive_days")]
    pub inactive_days: u32,

    /// How often the background worker runs (in hours).
    /// Default: 24 (once per day)
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Safety settings to prevent accidental data loss.
    #[serde(default)]
    pub safety: RetentionSafety,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            inactive_days: default_inactive_days(),
            interval_hours: default_interval_hours(),
            safety: RetentionSafety::default(),
        }
    }
}

fn default_inactive_days() -> u32 {
    365
}

fn default_interval_hours() -> u64 {
    24
}

/// Safety settings for retention operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionSafety {
    /// If true, log what would be deleted without actually deleting.
    /// Useful for testing the policy before enabling it.
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Maximum number of customers to delete per pass.
    /// Set to 0 for unlimited.
    /// Default: 100000
    #[serde(default = "default_max_deletes_per_run")]
    pub max_deletes_per_run: u64,

    /// Batch size for delete operations.
    /// Records are deleted in batches to avoid locking the database.
    /// Default: 1000
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

impl Default for RetentionSafety {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_deletes_per_run: default_max_deletes_per_run(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_max_deletes_per_run() -> u64 {
    100_000
}

fn default_batch_size() -> u32 {
    1000
}

impl RetentionConfig {
    /// Whether the policy deletes anything at all.
    pub fn is_enabled(&self) -> bool {
        self.inactive_days > 0
    }

    /// Get the worker interval as a Duration.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_hours * 3600)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_hours == 0 {
            return Err(ConfigError::Validation(
                "retention.interval_hours must be at least 1".into(),
            ));
        }
        if self.safety.batch_size == 0 {
            return Err(ConfigError::Validation(
                "retention.safety.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
