//! Error types for payload decoding.

use std::num::ParseIntError;

use thiserror::Error;

/// Malformed interval-list text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("bad range: {0}")]
    MissingSeparator(String),

    #[error("bad range bound in {segment:?}: {source}")]
    InvalidBound {
        segment: String,
        #[source]
        source: ParseIntError,
    },
}
