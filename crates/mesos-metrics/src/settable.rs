//! Scrape-time sample buffers.
//!
//! A registry needs label names declared up front, but attribute label
//! values only exist after the upstream payload is decoded. These metrics
//! register one fixed [`Descriptor`] at construction and accumulate
//! fully-instantiated samples while a scrape runs. Draining hands every
//! buffered sample out exactly once and leaves the buffer empty, so an
//! empty cycle emits nothing and stale values never leak forward.

use std::sync::Arc;

use tracing::warn;

use crate::descriptor::{Descriptor, Sample};
use crate::error::MetricError;

/// Common surface of the buffered metric variants.
pub trait CachedMetric: Send + Sync {
    fn descriptor(&self) -> &Arc<Descriptor>;

    /// Buffer one sample. `label_values` must match the descriptor's labels.
    fn set(&mut self, value: f64, label_values: Vec<String>) -> Result<(), MetricError>;

    /// Take every buffered sample, clearing the buffer.
    fn drain(&mut self) -> Vec<Sample>;
}

/// Labelled metric whose label values are supplied per sample.
#[derive(Debug)]
pub struct SettableVec {
    desc: Arc<Descriptor>,
    values: Vec<Sample>,
}

impl SettableVec {
    pub fn new(desc: Arc<Descriptor>) -> Self {
        Self {
            desc,
            values: Vec::new(),
        }
    }

    /// Number of samples buffered since the last drain.
    pub fn pending(&self) -> usize {
        self.values.len()
    }
}

impl CachedMetric for SettableVec {
    fn descriptor(&self) -> &Arc<Descriptor> {
        &self.desc
    }

    fn set(&mut self, value: f64, label_values: Vec<String>) -> Result<(), MetricError> {
        let expected = self.desc.label_names().len();
        if label_values.len() != expected {
            return Err(MetricError::LabelCardinality {
                metric: self.desc.fq_name().to_string(),
                expected,
                got: label_values.len(),
            });
        }
        self.values.push(Sample {
            desc: Arc::clone(&self.desc),
            label_values,
            value,
        });
        Ok(())
    }

    fn drain(&mut self) -> Vec<Sample> {
        std::mem::take(&mut self.values)
    }
}

/// Unkeyed metric holding at most one value per cycle.
#[derive(Debug)]
pub struct Settable {
    desc: Arc<Descriptor>,
    value: Option<Sample>,
}

impl Settable {
    pub fn new(desc: Arc<Descriptor>) -> Self {
        if !desc.label_names().is_empty() {
            warn!(metric = desc.fq_name(), "unkeyed metric declared with labels");
        }
        Self { desc, value: None }
    }

    /// Replace the buffered value.
    pub fn set_value(&mut self, value: f64) {
        self.value = Some(Sample {
            desc: Arc::clone(&self.desc),
            label_values: Vec::new(),
            value,
        });
    }
}

impl CachedMetric for Settable {
    fn descriptor(&self) -> &Arc<Descriptor> {
        &self.desc
    }

    fn set(&mut self, value: f64, label_values: Vec<String>) -> Result<(), MetricError> {
        if !label_values.is_empty() {
            return Err(MetricError::LabelCardinality {
                metric: self.desc.fq_name().to_string(),
                expected: 0,
                got: label_values.len(),
            });
        }
        self.set_value(value);
        Ok(())
    }

    fn drain(&mut self) -> Vec<Sample> {
        self.value.take().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn vec_drains_once() {
        let mut metric = SettableVec::new(Descriptor::counter("slave", "attributes", "help", ["slave"]));
        metric.set(1.0, labels(&["a"])).unwrap();
        metric.set(1.0, labels(&["b"])).unwrap();
        assert_eq!(metric.pending(), 2);

        let first = metric.drain();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].label_values, ["a"]);
        assert_eq!(first[1].label_values, ["b"]);

        // Nothing set since the last drain.
        assert!(metric.drain().is_empty());
    }

    #[test]
    fn vec_rejects_wrong_label_count() {
        let mut metric = SettableVec::new(Descriptor::gauge("slave", "cpus", "help", ["slave", "hostname"]));
        let err = metric.set(4.0, labels(&["only-one"])).unwrap_err();
        assert_eq!(
            err,
            MetricError::LabelCardinality {
                metric: "mesos_slave_cpus".to_string(),
                expected: 2,
                got: 1,
            }
        );
        assert_eq!(metric.pending(), 0);
    }

    #[test]
    fn vec_appends_duplicate_label_sets() {
        let mut metric = SettableVec::new(Descriptor::gauge("slave", "cpus", "help", ["slave"]));
        metric.set(1.0, labels(&["a"])).unwrap();
        metric.set(2.0, labels(&["a"])).unwrap();
        assert_eq!(metric.drain().len(), 2);
    }

    #[test]
    fn single_keeps_last_value() {
        let mut metric = Settable::new(Descriptor::gauge("master", "elected", "help", Vec::<String>::new()));
        metric.set_value(0.0);
        metric.set_value(1.0);

        let samples = metric.drain();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 1.0);
        assert!(metric.drain().is_empty());
    }

    #[test]
    fn single_rejects_labels() {
        let mut metric = Settable::new(Descriptor::gauge("master", "elected", "help", Vec::<String>::new()));
        assert!(metric.set(1.0, labels(&["x"])).is_err());
        assert!(metric.set(1.0, Vec::new()).is_ok());
        assert_eq!(metric.drain().len(), 1);
    }
}
