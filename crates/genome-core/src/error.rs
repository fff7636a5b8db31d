// Error types for the scoring engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// A required metric was absent or not a finite number. No score is
    /// produced from such a record.
    #[error("invalid metric input `{field}`: {reason}")]
    InvalidMetricInput { field: String, reason: String },

    #[error("invalid engine config `{field}`: {message}")]
    InvalidConfig { field: String, message: String },
}

impl ScoringError {
    pub(crate) fn missing(field: &str) -> Self {
        ScoringError::InvalidMetricInput {
            field: field.to_string(),
            reason: "required value is missing".into(),
        }
    }

    pub(crate) fn non_finite(field: &str, value: f64) -> Self {
        ScoringError::InvalidMetricInput {
            field: field.to_string(),
            reason: format!("expected a finite number, got {value}"),
        }
    }

    pub(crate) fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        ScoringError::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
