//! The collector capability and the registry that aggregates collectors.
//!
//! A scrape runs every member in registration order against one shared
//! [`HttpClient`]. A member whose fetch or decode fails yields no samples
//! for that cycle; its siblings are unaffected.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error};

use mesos_client::HttpClient;
use mesos_metrics::{CachedMetric, Descriptor, ErrorCounter, Sample, render_prometheus};

/// A polymorphic metric source.
#[async_trait]
pub trait Collector: Send {
    /// Descriptors this collector may emit. Fixed for the process lifetime.
    fn describe(&self) -> Vec<Arc<Descriptor>>;

    /// Fetch, translate and drain one cycle's samples.
    async fn collect(&mut self, client: &mut HttpClient) -> Vec<Sample>;
}

/// One labelled value produced by a translator.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub labels: Vec<String>,
    pub value: f64,
}

impl Observation {
    pub fn new(labels: Vec<String>, value: f64) -> Self {
        Self { labels, value }
    }

    pub fn unlabelled(value: f64) -> Self {
        Self {
            labels: Vec::new(),
            value,
        }
    }
}

/// Buffer observations into `metric`. Label mismatches are logged and
/// counted; the remaining observations still land.
pub(crate) fn record(
    metric: &mut dyn CachedMetric,
    observations: Vec<Observation>,
    errors: &ErrorCounter,
) {
    for obs in observations {
        if let Err(e) = metric.set(obs.value, obs.labels) {
            error!(error = %e, "error recording metric");
            errors.inc();
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate metric descriptor: {0}")]
    DuplicateDescriptor(String),
}

/// Aggregates collectors behind a single scrape entry point.
pub struct Registry {
    client: HttpClient,
    collectors: Vec<Box<dyn Collector>>,
    descriptors: Vec<Arc<Descriptor>>,
    names: HashSet<String>,
}

impl Registry {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            collectors: Vec::new(),
            descriptors: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Register a collector. Every descriptor name must be unique across
    /// the registry; on conflict nothing is registered.
    pub fn register(&mut self, collector: Box<dyn Collector>) -> Result<(), RegistryError> {
        let descs = collector.describe();
        let mut seen = HashSet::new();
        for d in &descs {
            if self.names.contains(d.fq_name()) || !seen.insert(d.fq_name()) {
                return Err(RegistryError::DuplicateDescriptor(d.fq_name().to_string()));
            }
        }

        for d in &descs {
            self.names.insert(d.fq_name().to_string());
        }
        self.descriptors.extend(descs);
        self.collectors.push(collector);
        Ok(())
    }

    /// All declared descriptors, in registration order.
    pub fn describe(&self) -> &[Arc<Descriptor>] {
        &self.descriptors
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Run one scrape cycle across all members.
    pub async fn scrape(&mut self) -> Vec<Sample> {
        let mut samples = Vec::new();
        for collector in self.collectors.iter_mut() {
            samples.extend(collector.collect(&mut self.client).await);
        }
        debug!(samples = samples.len(), "scrape complete");
        samples
    }

    /// Scrape and render the Prometheus text exposition.
    pub async fn render(&mut self) -> String {
        let samples = self.scrape().await;
        render_prometheus(&self.descriptors, &samples)
    }
}

/// Exposes the shared error counter as `mesos_collector_errors_total`.
///
/// Register it last so that failures from the same scrape are included.
pub struct ErrorCollector {
    errors: ErrorCounter,
}

impl ErrorCollector {
    pub fn new(errors: ErrorCounter) -> Self {
        Self { errors }
    }
}

#[async_trait]
impl Collector for ErrorCollector {
    fn describe(&self) -> Vec<Arc<Descriptor>> {
        vec![Arc::clone(self.errors.descriptor())]
    }

    async fn collect(&mut self, _client: &mut HttpClient) -> Vec<Sample> {
        vec![self.errors.sample()]
    }
}

#[cfg(test)]
mod tests {
    use mesos_client::ClientConfig;
    use mesos_metrics::SettableVec;

    use super::*;

    /// Emits a fixed value without touching the network.
    struct Fixed {
        metric: SettableVec,
        value: f64,
    }

    impl Fixed {
        fn new(name: &str, value: f64) -> Self {
            Self {
                metric: SettableVec::new(Descriptor::gauge("test", name, "help", ["k"])),
                value,
            }
        }
    }

    #[async_trait]
    impl Collector for Fixed {
        fn describe(&self) -> Vec<Arc<Descriptor>> {
            vec![Arc::clone(self.metric.descriptor())]
        }

        async fn collect(&mut self, client: &mut HttpClient) -> Vec<Sample> {
            let errors = client.errors().clone();
            record(
                &mut self.metric,
                vec![Observation::new(vec!["v".to_string()], self.value)],
                &errors,
            );
            self.metric.drain()
        }
    }

    fn registry() -> Registry {
        let client =
            HttpClient::new(&ClientConfig::new("http://127.0.0.1:9"), ErrorCounter::new()).unwrap();
        Registry::new(client)
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut registry = registry();
        registry.register(Box::new(Fixed::new("a", 1.0))).unwrap();
        let err = registry.register(Box::new(Fixed::new("a", 2.0))).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateDescriptor(ref n) if n == "mesos_test_a"));
        assert_eq!(registry.describe().len(), 1);
    }

    #[tokio::test]
    async fn scrape_follows_registration_order() {
        let mut registry = registry();
        registry.register(Box::new(Fixed::new("b", 2.0))).unwrap();
        registry.register(Box::new(Fixed::new("a", 1.0))).unwrap();

        let samples = registry.scrape().await;
        let names: Vec<&str> = samples.iter().map(|s| s.desc.fq_name()).collect();
        assert_eq!(names, ["mesos_test_b", "mesos_test_a"]);
    }

    #[tokio::test]
    async fn error_collector_reports_shared_count() {
        let mut registry = registry();
        let errors = registry.client().errors().clone();
        registry.register(Box::new(ErrorCollector::new(errors.clone()))).unwrap();

        errors.inc();
        let samples = registry.scrape().await;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 1.0);
    }

    #[test]
    fn record_counts_label_mismatches() {
        let errors = ErrorCounter::new();
        let mut metric = SettableVec::new(Descriptor::gauge("test", "x", "help", ["k"]));
        record(
            &mut metric,
            vec![
                Observation::new(vec!["a".to_string()], 1.0),
                Observation::unlabelled(2.0),
            ],
            &errors,
        );
        assert_eq!(metric.pending(), 1);
        assert_eq!(errors.get(), 1);
    }
}
