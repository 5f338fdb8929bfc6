//! Domain types for Mesos master payloads.
//!
//! Every field defaults when absent so that partially populated documents
//! from older masters still decode.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::RangeError;
use crate::ranges::RangeSet;

/// Flat `/metrics/snapshot` document: metric key → value.
pub type MetricMap = HashMap<String, f64>;

// ── State ──────────────────────────────────────────────────────────

/// The `/state` document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct State {
    #[serde(default)]
    pub slaves: Vec<SlaveNode>,
    #[serde(default)]
    pub frameworks: Vec<Framework>,
}

/// An agent as reported by the master.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlaveNode {
    #[serde(default)]
    pub pid: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub port: u32,
    #[serde(default, rename = "resources")]
    pub total: Resources,
    #[serde(default, rename = "used_resources")]
    pub used: Resources,
    #[serde(default, rename = "unreserved_resources")]
    pub unreserved: Resources,
    /// Attribute values as the exact JSON text the master sent.
    #[serde(default)]
    pub attributes: BTreeMap<String, Box<RawValue>>,
}

/// Scalar resources in the master's units (MB for mem/disk) plus ports.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawResources")]
pub struct Resources {
    pub cpus: f64,
    pub mem: f64,
    pub disk: f64,
    /// Parsed port ranges. A malformed range string only invalidates this
    /// field; the scalars above still decode.
    pub ports: Result<RangeSet, RangeError>,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            cpus: 0.0,
            mem: 0.0,
            disk: 0.0,
            ports: Ok(RangeSet::default()),
        }
    }
}

#[derive(Deserialize)]
struct RawResources {
    #[serde(default)]
    cpus: f64,
    #[serde(default)]
    mem: f64,
    #[serde(default)]
    disk: f64,
    #[serde(default)]
    ports: Option<serde_json::Value>,
}

impl From<RawResources> for Resources {
    fn from(raw: RawResources) -> Self {
        let ports = match raw.ports {
            None | Some(serde_json::Value::Null) => Ok(RangeSet::default()),
            Some(serde_json::Value::String(text)) => RangeSet::parse(&text),
            Some(other) => RangeSet::parse(&other.to_string()),
        };
        Self {
            cpus: raw.cpus,
            mem: raw.mem,
            disk: raw.disk,
            ports,
        }
    }
}

// ── Frameworks ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Framework {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, rename = "completed_tasks")]
    pub completed: Vec<Task>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub executor_id: String,
    #[serde(default)]
    pub framework_id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub slave_id: String,
    /// e.g. `TASK_RUNNING`.
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub statuses: Vec<TaskStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Label {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskStatus {
    pub state: String,
    #[serde(default)]
    pub timestamp: f64,
}

// ── Version ────────────────────────────────────────────────────────

/// The `/version` document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub build_date: String,
    /// Unix seconds.
    #[serde(default)]
    pub build_time: f64,
    #[serde(default)]
    pub build_user: String,
    #[serde(default)]
    pub git_sha: String,
    #[serde(default)]
    pub git_tag: String,
    #[serde(default)]
    pub version: String,
}
