// Scoring engine facade: owns every component built from one EngineConfig.

use serde::Serialize;
use tracing::{debug, warn};

use crate::archetype::{Archetype, ArchetypeClassifier};
use crate::config::EngineConfig;
use crate::error::ScoringError;
use crate::gai::{CompositeScorer, ScoreResult};
use crate::metrics::{Athlete, AthleteMetrics, RawAthlete};
use crate::normalize::{MetricNormalizer, NormalizedMetrics};
use crate::qb_index::{QbIndexCalculator, QbIndexInput, QbTier, QbTraits};

/// Everything the engine derives for one athlete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteScore {
    pub gai: ScoreResult,
    pub qb_index: u8,
    pub qb_tier: QbTier,
}

/// Per-athlete outcome of a batch run. A failure affects only its own entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub id: String,
    pub result: Result<AthleteScore, ScoringError>,
}

/// Immutable, thread-safe engine. Build once at startup and share.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: EngineConfig,
    normalizer: MetricNormalizer,
    scorer: CompositeScorer,
    classifier: ArchetypeClassifier,
    qb: QbIndexCalculator,
}

impl ScoringEngine {
    /// Validate `config` and construct every component from it.
    pub fn new(config: EngineConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(ScoringEngine {
            normalizer: MetricNormalizer::new(&config.ranges),
            scorer: CompositeScorer::new(&config),
            classifier: ArchetypeClassifier::new(&config.ranges, &config.archetypes),
            qb: QbIndexCalculator::new(&config.qb_index),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn normalize(&self, metrics: &AthleteMetrics) -> NormalizedMetrics {
        self.normalizer.normalize_all(metrics)
    }

    pub fn compute_gai(&self, metrics: &AthleteMetrics) -> ScoreResult {
        self.scorer.compute_gai(metrics)
    }

    pub fn detect_archetype(&self, metrics: &AthleteMetrics) -> Archetype {
        self.classifier.detect_archetype(metrics)
    }

    pub fn calculate_qb_index(&self, input: &QbIndexInput) -> u8 {
        self.qb.calculate_qb_index(input)
    }

    pub fn qb_index_tier(&self, score: u8) -> QbTier {
        self.qb.qb_index_tier(score)
    }

    /// GAI and QB Index for a metric record plus optional measured traits.
    pub fn score_metrics(&self, metrics: &AthleteMetrics, traits: &QbTraits) -> AthleteScore {
        let gai = self.compute_gai(metrics);
        let qb_index = self.calculate_qb_index(&QbIndexInput::from_metrics(metrics, traits));
        AthleteScore {
            gai,
            qb_index,
            qb_tier: self.qb_index_tier(qb_index),
        }
    }

    pub fn score(&self, athlete: &Athlete) -> AthleteScore {
        self.score_metrics(&athlete.metrics, &athlete.traits)
    }

    /// Score unvalidated records one by one. Malformed records produce an
    /// error entry; the rest are still scored.
    pub fn score_batch(&self, batch: Vec<RawAthlete>) -> Vec<BatchOutcome> {
        let total = batch.len();
        let outcomes: Vec<BatchOutcome> = batch
            .into_iter()
            .map(|raw| {
                let id = raw.id.clone();
                let result = Athlete::try_from(raw).map(|athlete| self.score(&athlete));
                if let Err(e) = &result {
                    warn!(athlete = %id, "not scored: {e}");
                }
                BatchOutcome { id, result }
            })
            .collect();
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        debug!(total, failed, "scored batch");
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RawAthleteMetrics;
    use crate::tier::Tier;
    use std::sync::Arc;
    use std::thread;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(EngineConfig::default()).unwrap()
    }

    fn raw_athlete(id: &str, decision_speed: Option<f64>) -> RawAthlete {
        RawAthlete {
            id: id.into(),
            name: id.to_uppercase(),
            measured_on: None,
            metrics: RawAthleteMetrics {
                velocity: Some(62.0),
                release_time: Some(0.38),
                spin_rate: Some(620.0),
                mechanics: Some(88.0),
                accuracy: Some(91.0),
                decision_speed,
            },
            traits: Default::default(),
        }
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScoringEngine>();
    }

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = EngineConfig::default();
        cfg.gai_weights.velocity = 0.5;
        assert!(matches!(
            ScoringEngine::new(cfg),
            Err(ScoringError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn score_combines_both_composites() {
        let m = AthleteMetrics::new(62.0, 0.38, 620.0, 88.0, 91.0, 85.0).unwrap();
        let score = engine().score_metrics(&m, &QbTraits::default());
        assert_eq!(score.gai.score, 81);
        assert_eq!(score.gai.tier, Tier::Premium);
        assert_eq!(score.qb_index, 85);
        assert_eq!(score.qb_tier, QbTier::Starter);
        assert_eq!(engine().detect_archetype(&m), score.gai.archetype);
    }

    #[test]
    fn batch_isolates_failures() {
        let batch = vec![
            raw_athlete("ok1", Some(85.0)),
            raw_athlete("broken", None),
            raw_athlete("ok2", Some(70.0)),
        ];
        let outcomes = engine().score_batch(batch);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert_eq!(outcomes[1].id, "broken");
        assert!(matches!(
            outcomes[1].result,
            Err(ScoringError::InvalidMetricInput { .. })
        ));
        assert!(outcomes[2].result.is_ok());
    }

    #[test]
    fn concurrent_callers_agree() {
        let engine = Arc::new(engine());
        let m = AthleteMetrics::new(58.0, 0.44, 700.0, 77.0, 82.0, 69.0).unwrap();
        let expected = engine.score_metrics(&m, &QbTraits::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    (0..200)
                        .map(|_| engine.score_metrics(&m, &QbTraits::default()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for result in handle.join().unwrap() {
                assert_eq!(result, expected);
            }
        }
    }
}
