//! Metric descriptors and scrape-time samples.

use std::fmt;
use std::sync::Arc;

/// Namespace prefixed to every exported series.
pub const NAMESPACE: &str = "mesos";

/// Exposition type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a metric series: fully-qualified name, help text,
/// type and the ordered label names every sample must fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    fq_name: String,
    help: String,
    kind: MetricKind,
    label_names: Vec<String>,
}

impl Descriptor {
    /// Build a descriptor named `mesos_<subsystem>_<name>`.
    pub fn new<I, S>(subsystem: &str, name: &str, help: &str, kind: MetricKind, labels: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            fq_name: fq_name(NAMESPACE, subsystem, name),
            help: help.to_string(),
            kind,
            label_names: labels.into_iter().map(Into::into).collect(),
        })
    }

    pub fn gauge<I, S>(subsystem: &str, name: &str, help: &str, labels: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(subsystem, name, help, MetricKind::Gauge, labels)
    }

    pub fn counter<I, S>(subsystem: &str, name: &str, help: &str, labels: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(subsystem, name, help, MetricKind::Counter, labels)
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }
}

/// Join the non-empty name parts with underscores.
///
/// `fq_name("mesos", "", "version")` is `mesos_version`.
pub fn fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// One observation instantiated at scrape time.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub desc: Arc<Descriptor>,
    /// Values in the same order as `desc.label_names()`.
    pub label_values: Vec<String>,
    pub value: f64,
}
