//! Grass coverage statistics tracked across a run.

use serde::{Deserialize, Serialize};

/// Running coverage statistics, one sample per completed tick.
///
/// Coverage is the fraction of tiles bearing grass, in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    current: f64,
    sum: f64,
    samples: u64,
    min: f64,
    max: f64,
}

impl CoverageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild statistics by replaying a full coverage history
    pub fn from_history(history: &[f64]) -> Self {
        history.iter().fold(Self::new(), |mut stats, &coverage| {
            stats.record(coverage);
            stats
        })
    }

    pub fn record(&mut self, coverage: f64) {
        if self.samples == 0 {
            self.min = coverage;
            self.max = coverage;
        } else {
            self.min = self.min.min(coverage);
            self.max = self.max.max(coverage);
        }
        self.current = coverage;
        self.sum += coverage;
        self.samples += 1;
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn average(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum / self.samples as f64
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Terminal summary line reported at the end of a run
    pub fn summary_line(&self) -> String {
        format!(
            "summary ticks={} avg_coverage={:.1}% min_coverage={:.1}% max_coverage={:.1}%",
            self.samples,
            self.average() * 100.0,
            self.min * 100.0,
            self.max * 100.0
        )
    }
}

/// Fraction of `total` tiles that bear grass
pub fn coverage_fraction(grass: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        grass as f64 / total as f64
    }
}
