// Genome Activation Index: weighted composite of the six normalized metrics.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::archetype::{Archetype, ArchetypeClassifier};
use crate::config::EngineConfig;
use crate::error::ScoringError;
use crate::metrics::{AthleteMetrics, Metric};
use crate::normalize::{MetricNormalizer, NormalizedMetrics};
use crate::program::{self, ProgramFit, ProgramProfile};
use crate::tier::{finalize_score, Tier, TierConfig};

/// Allowed drift of a weight vector's sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// GAI weight per metric. Must be positive and sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaiWeights {
    pub velocity: f64,
    pub release_time: f64,
    pub spin_rate: f64,
    pub mechanics: f64,
    pub accuracy: f64,
    pub decision_speed: f64,
}

impl Default for GaiWeights {
    fn default() -> Self {
        GaiWeights {
            velocity: 0.18,
            release_time: 0.15,
            spin_rate: 0.10,
            mechanics: 0.22,
            accuracy: 0.25,
            decision_speed: 0.10,
        }
    }
}

impl GaiWeights {
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

    pub fn validate(&self, prefix: &str) -> Result<(), ScoringError> {
        let named: Vec<(String, f64)> = Metric::ALL
            .iter()
            .map(|m| (format!("{prefix}.{}", m.key()), self.get(*m)))
            .collect();
        validate_weight_vector(prefix, &named)
    }
}

/// Every weight must be finite and > 0, and the vector must sum to 1.0.
pub(crate) fn validate_weight_vector(
    prefix: &str,
    weights: &[(String, f64)],
) -> Result<(), ScoringError> {
    for (name, val) in weights {
        if !val.is_finite() || *val <= 0.0 {
            return Err(ScoringError::config(
                name.clone(),
                format!("must be > 0, got {val}"),
            ));
        }
    }
    let sum: f64 = weights.iter().map(|(_, v)| v).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ScoringError::config(
            prefix,
            format!("weights must sum to 1.0, got {sum}"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Output of the GAI engine for one athlete. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: u8,
    pub tier: Tier,
    pub tier_color: String,
    pub archetype: Archetype,
    pub best_fit_program: Option<ProgramFit>,
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CompositeScorer {
    normalizer: MetricNormalizer,
    weights: GaiWeights,
    tiers: TierConfig,
    classifier: ArchetypeClassifier,
    programs: Vec<ProgramProfile>,
}

impl CompositeScorer {
    pub fn new(config: &EngineConfig) -> Self {
        CompositeScorer {
            normalizer: MetricNormalizer::new(&config.ranges),
            weights: config.gai_weights,
            tiers: config.tiers.clone(),
            classifier: ArchetypeClassifier::new(&config.ranges, &config.archetypes),
            programs: config.programs.clone(),
        }
    }

    /// Score one athlete: GAI, tier, archetype and best-fit program.
    pub fn compute_gai(&self, metrics: &AthleteMetrics) -> ScoreResult {
        let normalized = self.normalizer.normalize_all(metrics);
        let raw = self.weighted_sum(&normalized);
        let score = finalize_score(raw);
        let tier = self.tiers.tier_for(score);
        let archetype = self.classifier.classify_normalized(&normalized);
        let best_fit_program = program::best_fit(&self.programs, &normalized);

        debug!(
            raw,
            score,
            tier = tier.label(),
            archetype = archetype.label(),
            "computed GAI"
        );

        ScoreResult {
            score,
            tier,
            tier_color: self.tiers.color_for(tier).to_string(),
            archetype,
            best_fit_program,
        }
    }

    /// Unrounded weighted sum of a normalized vector.
    pub fn weighted_sum(&self, normalized: &NormalizedMetrics) -> f64 {
        Metric::ALL
            .iter()
            .map(|&m| normalized.get(m) * self.weights.get(m))
            .sum()
    }

    pub fn tier_for(&self, score: u8) -> (Tier, &str) {
        let tier = self.tiers.tier_for(score);
        (tier, self.tiers.color_for(tier))
    }
}
