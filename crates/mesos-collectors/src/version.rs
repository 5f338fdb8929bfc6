//! Build information of the polled master, as a constant `1` series.

use std::sync::Arc;

use async_trait::async_trait;

use mesos_client::HttpClient;
use mesos_metrics::{CachedMetric, Descriptor, Sample, SettableVec};
use mesos_state::VersionInfo;

use crate::collector::{Collector, Observation, record};

pub const VERSION_LABELS: [&str; 5] = ["build_date", "build_time", "git_sha", "git_tag", "version"];

pub struct VersionCollector {
    metric: SettableVec,
}

impl VersionCollector {
    pub fn new() -> Self {
        Self {
            metric: SettableVec::new(Descriptor::gauge(
                "",
                "version",
                "Version information for the mesos slave/master stored in labeling",
                VERSION_LABELS,
            )),
        }
    }
}

impl Default for VersionCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Label values in [`VERSION_LABELS`] order. `build_time` keeps six
/// decimals, e.g. `1556822310.000000`.
pub fn version_observation(v: &VersionInfo) -> Observation {
    Observation::new(
        vec![
            v.build_date.clone(),
            format!("{:.6}", v.build_time),
            v.git_sha.clone(),
            v.git_tag.clone(),
            v.version.clone(),
        ],
        1.0,
    )
}

#[async_trait]
impl Collector for VersionCollector {
    fn describe(&self) -> Vec<Arc<Descriptor>> {
        vec![Arc::clone(self.metric.descriptor())]
    }

    async fn collect(&mut self, client: &mut HttpClient) -> Vec<Sample> {
        if let Some(v) = client.fetch_and_decode::<VersionInfo>("/version").await {
            record(&mut self.metric, vec![version_observation(&v)], client.errors());
        }
        self.metric.drain()
    }
}
