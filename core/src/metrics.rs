//! Per-tick metric series for plotting and export.
//!
//! Three named series are sampled once per tick (twice on the final
//! tick, before and after end-of-run banking).

use serde::{Deserialize, Serialize};

use crate::types::Tick;

pub const SERIES_LOBSTER: &str = "Lobster";
pub const SERIES_BIG: &str = "Big";
pub const SERIES_SMALL: &str = "Small";
pub const SERIES_NAMES: [&str; 3] = [SERIES_LOBSTER, SERIES_BIG, SERIES_SMALL];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSample {
    pub tick: Tick,
    pub lobsters: u64,
    pub big_landings: u64,
    pub small_landings: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsCollector {
    samples: Vec<MetricSample>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// One named series in sample order. None for an unknown name.
    pub fn series(&self, name: &str) -> Option<Vec<u64>> {
        if !SERIES_NAMES.contains(&name) {
            return None;
        }
        let values = self.samples.iter().map(|s| match name {
            SERIES_LOBSTER => s.lobsters,
            SERIES_BIG     => s.big_landings,
            _              => s.small_landings,
        });
        Some(values.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_by_name() {
        let mut metrics = MetricsCollector::new();
        metrics.collect(MetricSample { tick: 1, lobsters: 10, big_landings: 0, small_landings: 1 });
        metrics.collect(MetricSample { tick: 2, lobsters: 8, big_landings: 3, small_landings: 1 });

        assert_eq!(metrics.series(SERIES_LOBSTER), Some(vec![10, 8]));
        assert_eq!(metrics.series(SERIES_BIG), Some(vec![0, 3]));
        assert_eq!(metrics.series(SERIES_SMALL), Some(vec![1, 1]));
        assert_eq!(metrics.series("Crabs"), None);
        assert_eq!(metrics.latest().map(|s| s.tick), Some(2));
    }
}
