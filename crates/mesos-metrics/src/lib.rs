//! mesos-metrics — the metric model behind the Mesos exporter.
//!
//! Descriptors are declared once for the lifetime of the process; samples
//! are instantiated on every scrape. Label *names* are fixed by the
//! descriptor while label *values* are only known once an upstream payload
//! has been decoded, so collectors buffer fully-labelled samples in a
//! [`SettableVec`] (or an unkeyed [`Settable`]) and drain them when the
//! scrape is gathered.
//!
//! # Architecture
//!
//! ```text
//! Descriptor (name + ordered label names, fixed)
//!   └── SettableVec / Settable
//!         ├── set() ← called by translators during a scrape
//!         └── drain() → Vec<Sample>, buffer cleared
//!
//! ErrorCounter
//!   └── shared failure count, cloned into every collector
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```

pub mod descriptor;
pub mod error;
pub mod errors;
pub mod prometheus;
pub mod settable;

pub use descriptor::{Descriptor, MetricKind, NAMESPACE, Sample, fq_name};
pub use error::MetricError;
pub use errors::ErrorCounter;
pub use prometheus::render_prometheus;
pub use settable::{CachedMetric, Settable, SettableVec};
