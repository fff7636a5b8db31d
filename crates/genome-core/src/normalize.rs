// Direction-aware linear rescaling of raw metrics onto a common 0-100 scale.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ScoringError;
use crate::metrics::{AthleteMetrics, Metric};

pub const NORMALIZED_MIN: f64 = 0.0;
pub const NORMALIZED_MAX: f64 = 100.0;

/// Linear-scale `raw_value` from `[range_min, range_max]` onto `[0, 100]`.
///
/// With `invert` set, a lower raw value maps to a higher result
/// (`100 - linear`). The result is always clamped to `[0, 100]`. A degenerate
/// range (`range_max == range_min`) uses a denominator of 1. A NaN input
/// normalizes to 0.
///
/// `metric_name` is only used for diagnostics.
pub fn normalize(
    metric_name: &str,
    raw_value: f64,
    range_min: f64,
    range_max: f64,
    invert: bool,
) -> f64 {
    if raw_value.is_nan() {
        trace!(metric = metric_name, "NaN input normalized to floor");
        return NORMALIZED_MIN;
    }

    let span = range_max - range_min;
    let denominator = if span == 0.0 { 1.0 } else { span };
    let linear = (raw_value - range_min) / denominator * NORMALIZED_MAX;
    let directed = if invert { NORMALIZED_MAX - linear } else { linear };
    let clamped = directed.clamp(NORMALIZED_MIN, NORMALIZED_MAX);

    if clamped != directed {
        trace!(
            metric = metric_name,
            raw_value,
            range_min,
            range_max,
            "clamped normalized value {directed:.2} to {clamped}"
        );
    }
    clamped
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Plausible raw range for one metric, plus its direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
    /// True when a lower raw value is better.
    #[serde(default)]
    pub invert: bool,
}

impl MetricRange {
    pub const fn new(min: f64, max: f64, invert: bool) -> Self {
        MetricRange { min, max, invert }
    }

    pub fn normalize(&self, metric_name: &str, raw_value: f64) -> f64 {
        normalize(metric_name, raw_value, self.min, self.max, self.invert)
    }

    /// Reject non-finite bounds and `min > max`. Equal bounds are allowed;
    /// normalization guards that case.
    pub fn validate(&self, field: &str) -> Result<(), ScoringError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ScoringError::config(field, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(ScoringError::config(
                field,
                format!("min ({}) must not exceed max ({})", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Per-metric ranges for the six core metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricRanges {
    pub velocity: MetricRange,
    pub release_time: MetricRange,
    pub spin_rate: MetricRange,
    pub mechanics: MetricRange,
    pub accuracy: MetricRange,
    pub decision_speed: MetricRange,
}

impl Default for MetricRanges {
    fn default() -> Self {
        MetricRanges {
            velocity: MetricRange::new(40.0, 70.0, false),
            release_time: MetricRange::new(0.30, 0.70, true),
            spin_rate: MetricRange::new(450.0, 800.0, false),
            mechanics: MetricRange::new(0.0, 100.0, false),
            accuracy: MetricRange::new(0.0, 100.0, false),
            decision_speed: MetricRange::new(0.0, 100.0, false),
        }
    }
}

impl MetricRanges {
    pub fn get(&self, metric: Metric) -> &MetricRange {
        match metric {
            Metric::Velocity => &self.velocity,
            Metric::ReleaseTime => &self.release_time,
            Metric::SpinRate => &self.spin_rate,
            Metric::Mechanics => &self.mechanics,
            Metric::Accuracy => &self.accuracy,
            Metric::DecisionSpeed => &self.decision_speed,
        }
    }

    pub fn validate(&self, prefix: &str) -> Result<(), ScoringError> {
        for metric in Metric::ALL {
            self.get(metric)
                .validate(&format!("{prefix}.{}", metric.key()))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Normalized vector
// ---------------------------------------------------------------------------

/// An athlete's six metrics on the common 0-100 scale, where higher is
/// always better. Also used as the target vector of a program profile.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    pub velocity: f64,
    pub release_time: f64,
    pub spin_rate: f64,
    pub mechanics: f64,
    pub accuracy: f64,
    pub decision_speed: f64,
}

impl NormalizedMetrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Velocity => self.velocity,
            Metric::ReleaseTime => self.release_time,
            Metric::SpinRate => self.spin_rate,
            Metric::Mechanics => self.mechanics,
            Metric::Accuracy => self.accuracy,
            Metric::DecisionSpeed => self.decision_speed,
        }
    }

    /// Sum of absolute per-metric differences.
    pub fn l1_distance(&self, other: &NormalizedMetrics) -> f64 {
        Metric::ALL
            .iter()
            .map(|&m| (self.get(m) - other.get(m)).abs())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Normalizes whole metric records against a fixed set of ranges.
#[derive(Debug, Clone)]
pub struct MetricNormalizer {
    ranges: MetricRanges,
}

impl MetricNormalizer {
    pub fn new(ranges: &MetricRanges) -> Self {
        MetricNormalizer {
            ranges: ranges.clone(),
        }
    }

    pub fn ranges(&self) -> &MetricRanges {
        &self.ranges
    }

    pub fn normalize_metric(&self, metric: Metric, raw_value: f64) -> f64 {
        self.ranges.get(metric).normalize(metric.key(), raw_value)
    }

    pub fn normalize_all(&self, metrics: &AthleteMetrics) -> NormalizedMetrics {
        let n = |m: Metric| self.normalize_metric(m, metrics.get(m));
        NormalizedMetrics {
            velocity: n(Metric::Velocity),
            release_time: n(Metric::ReleaseTime),
            spin_rate: n(Metric::SpinRate),
            mechanics: n(Metric::Mechanics),
            accuracy: n(Metric::Accuracy),
            decision_speed: n(Metric::DecisionSpeed),
        }
    }
}
