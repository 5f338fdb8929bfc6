//! mesos-collectors — translate Mesos master payloads into samples.
//!
//! # Architecture
//!
//! ```text
//! Registry (one scrape entry point, members in registration order)
//!   ├── MasterStateCollector   GET /state
//!   │     ├── 12 per-agent resource gauges
//!   │     ├── mesos_slave_attributes (allowlisted agent attributes)
//!   │     └── mesos_master_tasks (task counts per state)
//!   ├── SnapshotCollector      GET /metrics/snapshot
//!   ├── VersionCollector       GET /version
//!   └── ErrorCollector         mesos_collector_errors_total
//! ```
//!
//! Every member shares the registry's `HttpClient`. Failures stay inside
//! the member that hit them: output degrades metric by metric.

pub mod collector;
pub mod labels;
pub mod master;
pub mod snapshot;
pub mod version;

pub use collector::{Collector, ErrorCollector, Observation, Registry, RegistryError};
pub use labels::{AttributeRejected, attribute_string, normalise_label};
pub use master::MasterStateCollector;
pub use snapshot::{ExtractError, SnapshotCollector, SnapshotMetric, master_snapshot_metrics};
pub use version::VersionCollector;

use mesos_client::HttpClient;

/// Endpoint of the flat metrics snapshot.
pub const SNAPSHOT_ENDPOINT: &str = "/metrics/snapshot";

/// Registry with the standard master collectors.
///
/// `slave_attribute_labels` is the ordered attribute allowlist; empty
/// disables the attribute series.
pub fn master_registry<S: AsRef<str>>(
    client: HttpClient,
    slave_attribute_labels: &[S],
) -> Result<Registry, RegistryError> {
    let errors = client.errors().clone();
    let mut registry = Registry::new(client);
    registry.register(Box::new(MasterStateCollector::new(slave_attribute_labels)))?;
    registry.register(Box::new(SnapshotCollector::new(
        SNAPSHOT_ENDPOINT,
        master_snapshot_metrics(),
    )))?;
    registry.register(Box::new(VersionCollector::new()))?;
    registry.register(Box::new(ErrorCollector::new(errors)))?;
    Ok(registry)
}
