//! Repository configuration.

use crate::value::Value;

/// Default maximum SQL length written to logs.
pub const DEFAULT_MAX_SQL_LOG_LENGTH: usize = 1024;

/// Configuration for [`Repository`](crate::Repository).
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Lifecycle attribute checked for the soft-delete default.
    pub status_field: String,
    /// Criteria key holding statuses to exclude.
    pub excluded_status_key: String,
    /// Status value marking a soft-deleted row.
    pub deleted_status: Value,
    /// Longest SQL text logged before truncation.
    pub max_sql_log_length: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            status_field: "status".to_string(),
            excluded_status_key: "excludedStatus".to_string(),
            deleted_status: Value::from("deleted"),
            max_sql_log_length: DEFAULT_MAX_SQL_LOG_LENGTH,
        }
    }
}

impl RepositoryConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lifecycle attribute name.
    pub fn status_field(mut self, field: impl Into<String>) -> Self {
        self.status_field = field.into();
        self
    }

    /// Set the criteria key for excluded statuses.
    pub fn excluded_status_key(mut self, key: impl Into<String>) -> Self {
        self.excluded_status_key = key.into();
        self
    }

    /// Set the soft-deleted status value.
    pub fn deleted_status(mut self, status: impl Into<Value>) -> Self {
        self.deleted_status = status.into();
        self
    }

    /// Set the longest SQL text written to logs.
    pub fn max_sql_log_length(mut self, len: usize) -> Self {
        self.max_sql_log_length = len;
        self
    }
}
