//! Interval-list codec for range resources such as ports.
//!
//! Mesos renders ranges as `"[31000-32000, 33000-33010]"`. Intervals are
//! inclusive on both ends. Ordering and overlap are taken on trust from
//! the master: nothing here sorts, merges or rejects reversed intervals.

use crate::error::RangeError;

/// Ordered sequence of closed integer intervals `[lo, hi]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet(Vec<(u64, u64)>);

impl RangeSet {
    /// Parse a delimiter-wrapped, comma-separated list of `lo-hi` pairs.
    ///
    /// Surrounding `[`, `]` and `"` characters are ignored and an empty
    /// body yields an empty set. Any malformed segment fails the whole
    /// parse.
    pub fn parse(text: &str) -> Result<Self, RangeError> {
        let body = text.trim_matches(|c| matches!(c, '[' | ']' | '"'));
        if body.is_empty() {
            return Ok(Self::default());
        }

        let mut intervals = Vec::new();
        for segment in body.split(',') {
            let (lo, hi) = segment
                .split_once('-')
                .ok_or_else(|| RangeError::MissingSeparator(segment.to_string()))?;
            intervals.push((parse_bound(segment, lo)?, parse_bound(segment, hi)?));
        }
        Ok(Self(intervals))
    }

    /// Literal sum of `hi - lo + 1` over all intervals.
    ///
    /// Arithmetic is unsigned and wrapping, so a reversed interval such as
    /// `5-3` contributes `u64::MAX` and overlapping intervals are counted
    /// twice.
    pub fn size(&self) -> u64 {
        self.0.iter().fold(0u64, |sz, &(lo, hi)| {
            sz.wrapping_add(hi.wrapping_sub(lo).wrapping_add(1))
        })
    }

    pub fn intervals(&self) -> &[(u64, u64)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn parse_bound(segment: &str, bound: &str) -> Result<u64, RangeError> {
    bound
        .trim()
        .parse()
        .map_err(|source| RangeError::InvalidBound {
            segment: segment.to_string(),
            source,
        })
}
