//! mesos-state — typed payloads polled from a Mesos master.
//!
//! Covers the `/state` document (agents and frameworks), the flat
//! `/metrics/snapshot` map, the `/version` build metadata, and the
//! interval-list encoding Mesos uses for port resources.

pub mod error;
pub mod ranges;
pub mod types;

pub use error::RangeError;
pub use ranges::RangeSet;
pub use types::*;
