use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Run log configuration.
///
/// The run log is the plain-text audit trail of the retention job: one line
/// per pass, `YYYY-MM-DD HH:MM:SS - Deleted: <count>`, appended to a fixed
/// file. Operators tail this file to verify the job is running; it is
/// intentionally simpler than the structured logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunLogConfig {
    /// Whether to write the run log at all.
    /// Default: true
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path of the append-only run log file. The file is created on first
    /// write; it is never rotated or truncated by this service.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for RunLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_path() -> String {
    "/var/log/crm-retention.log".to_string()
}

impl RunLogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.is_empty() {
            return Err(ConfigError::Validation(
                "run_log.path cannot be empty when the run log is enabled".into(),
            ));
        }
        Ok(())
    }
}
