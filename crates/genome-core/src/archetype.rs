// Playing-style archetype classification.
//
// Archetypes are decided by an ordered list of rules over normalized metric
// values. The first rule whose conditions all hold wins; if none match the
// athlete is `Balanced`, so every athlete gets exactly one archetype.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::metrics::{AthleteMetrics, Metric};
use crate::normalize::{MetricNormalizer, MetricRanges, NormalizedMetrics};

/// Closed set of playing-style labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Gunslinger,
    PurePasser,
    Processor,
    DualThreat,
    /// Catch-all when no specific rule matches.
    Balanced,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Gunslinger,
        Archetype::PurePasser,
        Archetype::Processor,
        Archetype::DualThreat,
        Archetype::Balanced,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Archetype::Gunslinger => "Gunslinger",
            Archetype::PurePasser => "Pure Passer",
            Archetype::Processor => "Processor",
            Archetype::DualThreat => "Dual Threat",
            Archetype::Balanced => "Balanced",
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// value >= threshold
    AtLeast,
    /// value < threshold
    Below,
}

/// One comparison of a normalized metric against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub metric: Metric,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Condition {
    pub const fn at_least(metric: Metric, threshold: f64) -> Self {
        Condition {
            metric,
            comparison: Comparison::AtLeast,
            threshold,
        }
    }

    pub const fn below(metric: Metric, threshold: f64) -> Self {
        Condition {
            metric,
            comparison: Comparison::Below,
            threshold,
        }
    }

    pub fn holds(&self, normalized: &NormalizedMetrics) -> bool {
        let value = normalized.get(self.metric);
        match self.comparison {
            Comparison::AtLeast => value >= self.threshold,
            Comparison::Below => value < self.threshold,
        }
    }
}

/// An archetype and the conditions that must all hold for it to apply.
/// A rule without conditions matches every athlete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeRule {
    pub archetype: Archetype,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ArchetypeRule {
    pub fn matches(&self, normalized: &NormalizedMetrics) -> bool {
        self.conditions.iter().all(|c| c.holds(normalized))
    }
}

/// Built-in rules in priority order.
pub fn default_rules() -> Vec<ArchetypeRule> {
    use Metric::*;
    vec![
        // Big arm, slow reads.
        ArchetypeRule {
            archetype: Archetype::Gunslinger,
            conditions: vec![
                Condition::at_least(Velocity, 75.0),
                Condition::below(DecisionSpeed, 60.0),
            ],
        },
        // Clean mechanics and accuracy without relying on velocity.
        ArchetypeRule {
            archetype: Archetype::PurePasser,
            conditions: vec![
                Condition::at_least(Mechanics, 80.0),
                Condition::at_least(Accuracy, 80.0),
                Condition::at_least(Velocity, 40.0),
                Condition::below(Velocity, 80.0),
            ],
        },
        ArchetypeRule {
            archetype: Archetype::Processor,
            conditions: vec![
                Condition::at_least(DecisionSpeed, 80.0),
                Condition::at_least(ReleaseTime, 70.0),
            ],
        },
        ArchetypeRule {
            archetype: Archetype::DualThreat,
            conditions: vec![
                Condition::at_least(Velocity, 65.0),
                Condition::at_least(SpinRate, 65.0),
            ],
        },
    ]
}

pub fn validate_rules(rules: &[ArchetypeRule]) -> Result<(), ScoringError> {
    for (i, rule) in rules.iter().enumerate() {
        for (j, condition) in rule.conditions.iter().enumerate() {
            if !condition.threshold.is_finite() {
                return Err(ScoringError::config(
                    format!("archetypes[{i}].conditions[{j}].threshold"),
                    "must be finite",
                ));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ArchetypeClassifier {
    normalizer: MetricNormalizer,
    rules: Vec<ArchetypeRule>,
}

impl ArchetypeClassifier {
    pub fn new(ranges: &MetricRanges, rules: &[ArchetypeRule]) -> Self {
        ArchetypeClassifier {
            normalizer: MetricNormalizer::new(ranges),
            rules: rules.to_vec(),
        }
    }

    pub fn detect_archetype(&self, metrics: &AthleteMetrics) -> Archetype {
        self.classify_normalized(&self.normalizer.normalize_all(metrics))
    }

    /// Classify an already-normalized vector.
    pub fn classify_normalized(&self, normalized: &NormalizedMetrics) -> Archetype {
        self.rules
            .iter()
            .find(|rule| rule.matches(normalized))
            .map(|rule| rule.archetype)
            .unwrap_or(Archetype::Balanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ArchetypeClassifier {
        ArchetypeClassifier::new(&MetricRanges::default(), &default_rules())
    }

    fn metrics(v: f64, rt: f64, sr: f64, me: f64, ac: f64, ds: f64) -> AthleteMetrics {
        AthleteMetrics::new(v, rt, sr, me, ac, ds).unwrap()
    }

    #[test]
    fn gunslinger_big_arm_slow_reads() {
        // velocity 66 -> 86.7 normalized; decision 45.
        let m = metrics(66.0, 0.45, 700.0, 70.0, 72.0, 45.0);
        assert_eq!(classifier().detect_archetype(&m), Archetype::Gunslinger);
    }

    #[test]
    fn example_athlete_is_pure_passer() {
        let m = metrics(62.0, 0.38, 620.0, 88.0, 91.0, 85.0);
        assert_eq!(classifier().detect_archetype(&m), Archetype::PurePasser);
    }

    #[test]
    fn processor_quick_reads_quick_release() {
        // velocity 48 -> 26.7 normalized keeps this out of the passer band.
        let m = metrics(48.0, 0.36, 500.0, 85.0, 85.0, 90.0);
        assert_eq!(classifier().detect_archetype(&m), Archetype::Processor);
    }

    #[test]
    fn dual_threat_velocity_and_spin() {
        let m = metrics(62.0, 0.55, 720.0, 60.0, 65.0, 70.0);
        assert_eq!(classifier().detect_archetype(&m), Archetype::DualThreat);
    }

    #[test]
    fn falls_back_to_balanced() {
        let m = metrics(52.0, 0.50, 600.0, 65.0, 68.0, 66.0);
        assert_eq!(classifier().detect_archetype(&m), Archetype::Balanced);
    }

    #[test]
    fn priority_order_resolves_overlap() {
        // Satisfies both Gunslinger and Dual Threat; Gunslinger is listed first.
        let m = metrics(68.0, 0.50, 780.0, 60.0, 60.0, 40.0);
        let c = classifier();
        let n = MetricNormalizer::new(&MetricRanges::default()).normalize_all(&m);
        let rules = default_rules();
        assert!(rules[0].matches(&n));
        assert!(rules[3].matches(&n));
        assert_eq!(c.detect_archetype(&m), Archetype::Gunslinger);
    }

    #[test]
    fn empty_rule_list_is_total() {
        let c = ArchetypeClassifier::new(&MetricRanges::default(), &[]);
        let m = metrics(70.0, 0.30, 800.0, 100.0, 100.0, 100.0);
        assert_eq!(c.detect_archetype(&m), Archetype::Balanced);
    }

    #[test]
    fn every_grid_point_gets_one_archetype() {
        let c = classifier();
        for v in [40.0, 55.0, 70.0] {
            for rt in [0.30, 0.50, 0.70] {
                for sr in [450.0, 625.0, 800.0] {
                    for grade in [0.0, 50.0, 100.0] {
                        let m = metrics(v, rt, sr, grade, grade, 100.0 - grade);
                        let a = c.detect_archetype(&m);
                        assert!(Archetype::ALL.contains(&a));
                    }
                }
            }
        }
    }

    #[test]
    fn non_finite_threshold_is_rejected() {
        let mut rules = default_rules();
        rules[2].conditions[1].threshold = f64::NAN;
        assert!(validate_rules(&rules).is_err());
        assert!(validate_rules(&default_rules()).is_ok());
    }
}
