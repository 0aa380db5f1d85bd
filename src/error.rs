//! Error types for the shift engine.
//!
//! Degenerate input (empty collections, ranges that end before they
//! start) is not an error; only malformed records and bad configuration
//! are.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid shift record {record_id}: field `{field}` {reason}")]
    InvalidRecord {
        record_id: String,
        field: &'static str,
        reason: String,
    },

    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn record(record_id: &str, field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidRecord {
            record_id: record_id.to_string(),
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
