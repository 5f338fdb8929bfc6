//! Collector for the master `/state` endpoint.
//!
//! Each metric is paired with a translator that maps the decoded state to
//! observations. Pairs live in an ordered list so iteration is
//! deterministic.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use mesos_client::HttpClient;
use mesos_metrics::{CachedMetric, Descriptor, Sample, SettableVec};
use mesos_state::{Resources, SlaveNode, State};

use crate::collector::{Collector, Observation, record};
use crate::labels::{attribute_string, normalise_label, normalise_label_list};

/// Identity labels on every per-agent resource series.
pub const SLAVE_LABELS: [&str; 4] = ["slave", "hostname", "port", "id"];

/// Identity label on the attribute series.
pub const SLAVE_IDENTITY_LABEL: &str = "slave";

/// Master units are megabytes; exported once as `value * 1024`.
const MEM_SCALE: f64 = 1024.0;

pub type StateFill = Box<dyn Fn(&State) -> Vec<Observation> + Send + Sync>;

pub type ResourcePick = fn(&SlaveNode) -> Option<f64>;

pub struct MasterStateCollector {
    metrics: Vec<(SettableVec, StateFill)>,
}

impl MasterStateCollector {
    /// `attribute_labels` is the ordered allowlist of agent attributes to
    /// export; empty disables the attribute series.
    pub fn new<S: AsRef<str>>(attribute_labels: &[S]) -> Self {
        let mut metrics: Vec<(SettableVec, StateFill)> = slave_resource_metrics()
            .into_iter()
            .map(|(desc, pick)| (SettableVec::new(desc), resource_fill(pick)))
            .collect();

        if !attribute_labels.is_empty() {
            let labels = normalise_label_list(attribute_labels, &[SLAVE_IDENTITY_LABEL]);
            let desc = Descriptor::counter(
                "slave",
                "attributes",
                "Attributes assigned to slaves",
                std::iter::once(SLAVE_IDENTITY_LABEL.to_string()).chain(labels.iter().cloned()),
            );
            metrics.push((
                SettableVec::new(desc),
                Box::new(move |st: &State| attribute_observations(st, &labels)),
            ));
        }

        metrics.push((
            SettableVec::new(Descriptor::gauge(
                "master",
                "tasks",
                "Tasks known to the master by state",
                ["state"],
            )),
            Box::new(task_state_observations),
        ));

        Self { metrics }
    }
}

#[async_trait]
impl Collector for MasterStateCollector {
    fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.metrics
            .iter()
            .map(|(metric, _)| Arc::clone(metric.descriptor()))
            .collect()
    }

    async fn collect(&mut self, client: &mut HttpClient) -> Vec<Sample> {
        let Some(state) = client.fetch_and_decode::<State>("/state").await else {
            return Vec::new();
        };
        debug!(slaves = state.slaves.len(), frameworks = state.frameworks.len(), "decoded master state");

        let errors = client.errors();
        let mut samples = Vec::new();
        for (metric, fill) in self.metrics.iter_mut() {
            record(metric, fill(&state), errors);
            samples.extend(metric.drain());
        }
        samples
    }
}

fn slave_labels(s: &SlaveNode) -> Vec<String> {
    vec![
        s.pid.clone(),
        s.hostname.clone(),
        s.port.to_string(),
        s.id.clone(),
    ]
}

fn resource_fill(pick: ResourcePick) -> StateFill {
    Box::new(move |st: &State| {
        st.slaves
            .iter()
            .filter_map(|s| pick(s).map(|value| Observation::new(slave_labels(s), value)))
            .collect()
    })
}

fn port_count(s: &SlaveNode, res: &Resources, kind: &str) -> Option<f64> {
    match &res.ports {
        Ok(ranges) => Some(ranges.size() as f64),
        Err(e) => {
            warn!(slave = %s.pid, resources = kind, error = %e, "invalid port ranges");
            None
        }
    }
}

/// The twelve per-agent resource gauges:
/// {total, used, unreserved} × {cpus, mem, disk, ports}.
pub fn slave_resource_metrics() -> Vec<(Arc<Descriptor>, ResourcePick)> {
    let table: [(&str, &str, ResourcePick); 12] = [
        ("cpus", "Total slave CPUs (fractional)", |s| Some(s.total.cpus)),
        ("cpus_used", "Used slave CPUs (fractional)", |s| Some(s.used.cpus)),
        ("cpus_unreserved", "Unreserved slave CPUs (fractional)", |s| {
            Some(s.unreserved.cpus)
        }),
        ("mem_bytes", "Total slave memory in bytes", |s| {
            Some(s.total.mem * MEM_SCALE)
        }),
        ("mem_used_bytes", "Used slave memory in bytes", |s| {
            Some(s.used.mem * MEM_SCALE)
        }),
        ("mem_unreserved_bytes", "Unreserved slave memory in bytes", |s| {
            Some(s.unreserved.mem * MEM_SCALE)
        }),
        ("disk_bytes", "Total slave disk space in bytes", |s| {
            Some(s.total.disk * MEM_SCALE)
        }),
        ("disk_used_bytes", "Used slave disk space in bytes", |s| {
            Some(s.used.disk * MEM_SCALE)
        }),
        ("disk_unreserved_bytes", "Unreserved slave disk in bytes", |s| {
            Some(s.unreserved.disk * MEM_SCALE)
        }),
        ("ports", "Total slave ports", |s| port_count(s, &s.total, "total")),
        ("ports_used", "Used slave ports", |s| port_count(s, &s.used, "used")),
        ("ports_unreserved", "Unreserved slave ports", |s| {
            port_count(s, &s.unreserved, "unreserved")
        }),
    ];

    table
        .into_iter()
        .map(|(name, help, pick)| (Descriptor::gauge("slave", name, help, SLAVE_LABELS), pick))
        .collect()
}

/// One observation per agent: identity label followed by the allowlisted
/// attribute labels, in order. Missing or rejected values are empty.
pub fn attribute_observations(st: &State, labels: &[String]) -> Vec<Observation> {
    st.slaves
        .iter()
        .map(|s| {
            let mut values = vec![String::new(); labels.len() + 1];
            values[0] = s.pid.clone();

            for (key, value) in &s.attributes {
                let name = normalise_label(key);
                let Some(i) = labels.iter().position(|l| *l == name) else {
                    continue;
                };
                match attribute_string(value.get()) {
                    Ok(text) => values[i + 1] = text,
                    Err(e) => debug!(slave = %s.pid, attribute = %key, reason = %e, "dropping attribute value"),
                }
            }

            Observation::new(values, 1.0)
        })
        .collect()
}

/// Task counts per state across all frameworks, current and completed.
pub fn task_state_observations(st: &State) -> Vec<Observation> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for framework in &st.frameworks {
        for task in framework.tasks.iter().chain(&framework.completed) {
            *counts.entry(task.state.as_str()).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(state, n)| Observation::new(vec![state.to_string()], n as f64))
        .collect()
}
