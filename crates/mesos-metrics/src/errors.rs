//! Shared scrape error counter.
//!
//! One counter is created at the composition root and cloned into the HTTP
//! client and every collector. Clones share the same atomic.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::descriptor::{Descriptor, Sample};

/// Monotonic count of failed fetches, decodes and extractions.
#[derive(Debug, Clone)]
pub struct ErrorCounter {
    count: Arc<AtomicU64>,
    desc: Arc<Descriptor>,
}

impl ErrorCounter {
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicU64::new(0)),
            desc: Descriptor::counter(
                "collector",
                "errors_total",
                "Total number of internal mesos-collector errors.",
                Vec::<String>::new(),
            ),
        }
    }

    pub fn inc(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.desc
    }

    /// Current value as a sample. Unlike buffered metrics this is emitted
    /// on every scrape.
    pub fn sample(&self) -> Sample {
        Sample {
            desc: Arc::clone(&self.desc),
            label_values: Vec::new(),
            value: self.get() as f64,
        }
    }
}

impl Default for ErrorCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_count() {
        let counter = ErrorCounter::new();
        let clone = counter.clone();
        counter.inc();
        clone.inc();
        assert_eq!(counter.get(), 2);
        assert_eq!(clone.sample().value, 2.0);
    }

    #[test]
    fn sample_name() {
        let counter = ErrorCounter::default();
        assert_eq!(counter.sample().desc.fq_name(), "mesos_collector_errors_total");
        assert_eq!(counter.sample().value, 0.0);
    }
}
