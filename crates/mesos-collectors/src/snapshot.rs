//! Collector for the flat `/metrics/snapshot` endpoint.
//!
//! Each exported metric owns an extraction function over the decoded
//! key → value map. A function whose source key is absent fails on its
//! own (logged, counted, skipped); its siblings still run.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::error;

use mesos_client::HttpClient;
use mesos_metrics::{CachedMetric, Descriptor, MetricKind, Sample, Settable, SettableVec};
use mesos_state::MetricMap;

use crate::collector::{Collector, Observation, record};

/// Snapshot memory and disk values are megabytes.
const MEBIBYTE: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("couldn't find key in map: {0}")]
    MissingKey(String),
}

pub type SnapshotFill = Box<dyn Fn(&MetricMap) -> Result<Vec<Observation>, ExtractError> + Send + Sync>;

/// Look up `key`, failing if the master did not report it.
pub fn lookup(m: &MetricMap, key: &str) -> Result<f64, ExtractError> {
    m.get(key)
        .copied()
        .ok_or_else(|| ExtractError::MissingKey(key.to_string()))
}

/// A metric paired with its extraction function.
pub struct SnapshotMetric {
    metric: Box<dyn CachedMetric>,
    fill: SnapshotFill,
}

impl SnapshotMetric {
    pub fn new(metric: Box<dyn CachedMetric>, fill: SnapshotFill) -> Self {
        Self { metric, fill }
    }

    /// Unlabelled gauge read from a single key and multiplied by `scale`.
    pub fn gauge(subsystem: &str, name: &str, help: &str, key: &str, scale: f64) -> Self {
        let desc = Descriptor::gauge(subsystem, name, help, Vec::<String>::new());
        let key = key.to_string();
        Self::new(
            Box::new(Settable::new(desc)),
            Box::new(move |m: &MetricMap| -> Result<Vec<Observation>, ExtractError> {
                Ok(vec![Observation::unlabelled(lookup(m, &key)? * scale)])
            }),
        )
    }

    /// One series per `(label value, key)` pair under a single label.
    /// Every key must be present or the whole metric is skipped.
    pub fn labelled(
        kind: MetricKind,
        (subsystem, name, help): (&str, &str, &str),
        label: &str,
        series: &[(&str, &str)],
        scale: f64,
    ) -> Self {
        let desc = Descriptor::new(subsystem, name, help, kind, [label]);
        let series: Vec<(String, String)> = series
            .iter()
            .map(|(value, key)| (value.to_string(), key.to_string()))
            .collect();
        Self::new(
            Box::new(SettableVec::new(desc)),
            Box::new(move |m: &MetricMap| -> Result<Vec<Observation>, ExtractError> {
                series
                    .iter()
                    .map(|(value, key)| Ok(Observation::new(vec![value.clone()], lookup(m, key)? * scale)))
                    .collect::<Result<Vec<_>, ExtractError>>()
            }),
        )
    }

    pub fn descriptor(&self) -> &Arc<Descriptor> {
        self.metric.descriptor()
    }
}

pub struct SnapshotCollector {
    endpoint: String,
    metrics: Vec<SnapshotMetric>,
}

impl SnapshotCollector {
    pub fn new(endpoint: impl Into<String>, metrics: Vec<SnapshotMetric>) -> Self {
        Self {
            endpoint: endpoint.into(),
            metrics,
        }
    }
}

#[async_trait]
impl Collector for SnapshotCollector {
    fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.metrics
            .iter()
            .map(|m| Arc::clone(m.descriptor()))
            .collect()
    }

    async fn collect(&mut self, client: &mut HttpClient) -> Vec<Sample> {
        let Some(snapshot) = client.fetch_and_decode::<MetricMap>(&self.endpoint).await else {
            return Vec::new();
        };

        let errors = client.errors();
        let mut samples = Vec::new();
        for m in self.metrics.iter_mut() {
            match (m.fill)(&snapshot) {
                Ok(observations) => {
                    record(m.metric.as_mut(), observations, errors);
                    samples.extend(m.metric.drain());
                }
                Err(e) => {
                    error!(metric = m.metric.descriptor().fq_name(), error = %e, "error extracting metric");
                    errors.inc();
                }
            }
        }
        samples
    }
}

/// Default extraction set for a master's `/metrics/snapshot`.
pub fn master_snapshot_metrics() -> Vec<SnapshotMetric> {
    use MetricKind::{Counter, Gauge};

    vec![
        SnapshotMetric::gauge(
            "master",
            "uptime_seconds",
            "Number of seconds the master process is running",
            "master/uptime_secs",
            1.0,
        ),
        SnapshotMetric::gauge(
            "master",
            "elected",
            "1 if the master is the elected leader, 0 otherwise",
            "master/elected",
            1.0,
        ),
        SnapshotMetric::labelled(
            Gauge,
            ("master", "cpus", "Current CPU resources in cluster"),
            "type",
            &[("total", "master/cpus_total"), ("used", "master/cpus_used")],
            1.0,
        ),
        SnapshotMetric::labelled(
            Gauge,
            ("master", "mem_bytes", "Current memory resources in cluster"),
            "type",
            &[("total", "master/mem_total"), ("used", "master/mem_used")],
            MEBIBYTE,
        ),
        SnapshotMetric::labelled(
            Gauge,
            ("master", "disk_bytes", "Current disk resources in cluster"),
            "type",
            &[("total", "master/disk_total"), ("used", "master/disk_used")],
            MEBIBYTE,
        ),
        SnapshotMetric::labelled(
            Gauge,
            ("master", "slaves_state", "Current number of slaves known to the master per state"),
            "connection_state",
            &[
                ("active", "master/slaves_active"),
                ("inactive", "master/slaves_inactive"),
                ("connected", "master/slaves_connected"),
                ("disconnected", "master/slaves_disconnected"),
            ],
            1.0,
        ),
        SnapshotMetric::labelled(
            Gauge,
            ("master", "task_states_current", "Current number of tasks by state"),
            "state",
            &[
                ("staging", "master/tasks_staging"),
                ("starting", "master/tasks_starting"),
                ("running", "master/tasks_running"),
                ("killing", "master/tasks_killing"),
            ],
            1.0,
        ),
        SnapshotMetric::labelled(
            Counter,
            ("master", "task_states_exit_total", "Total number of tasks by exit state"),
            "state",
            &[
                ("finished", "master/tasks_finished"),
                ("failed", "master/tasks_failed"),
                ("killed", "master/tasks_killed"),
                ("lost", "master/tasks_lost"),
            ],
            1.0,
        ),
    ]
}
