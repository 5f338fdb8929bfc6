//! Error types for the metric model.

use thiserror::Error;

/// Errors raised when a sample does not fit its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("metric {metric}: expected {expected} label values, got {got}")]
    LabelCardinality {
        metric: String,
        expected: usize,
        got: usize,
    },
}
