//! Metric error taxonomy.
//!
//! Every variant is terminal: the first error aborts the whole comparison.
//! Variants carry enough context (object, field, environment) to be
//! actionable without re-deriving state.

/// Errors raised while parsing, validating, or reconciling metrics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("Invalid metric '{token}': {reason}")]
    InvalidMetric { token: String, reason: String },

    #[error("Field '{field}' not found on {object} in {environment}")]
    FieldNotFound {
        object: String,
        field: String,
        environment: String,
    },

    #[error("Field '{field}' on {object} is not aggregatable in {environment}")]
    NonAggregatableField {
        object: String,
        field: String,
        environment: String,
    },

    #[error(
        "Field '{field}' has type {field_type} but '{metric}' requires a {required} field in {environment}"
    )]
    UnsupportedFieldType {
        field: String,
        field_type: String,
        metric: String,
        required: String,
        environment: String,
    },

    #[error("Metric sets diverge between environments: {0}")]
    ValidationMismatch(String),
}

impl MetricError {
    pub fn invalid(token: impl Into<String>, reason: impl Into<String>) -> Self {
        MetricError::InvalidMetric {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for metric operations.
pub type MetricResult<T> = Result<T, MetricError>;
