// Raw athlete measurements and the closed set of scored metrics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScoringError;
use crate::qb_index::{QbTraits, RawQbTraits};

// ---------------------------------------------------------------------------
// Metric identifiers
// ---------------------------------------------------------------------------

/// The six core performance metrics every athlete record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Velocity,
    ReleaseTime,
    SpinRate,
    Mechanics,
    Accuracy,
    DecisionSpeed,
}

impl Metric {
    /// All metrics in canonical declaration order.
    pub const ALL: [Metric; 6] = [
        Metric::Velocity,
        Metric::ReleaseTime,
        Metric::SpinRate,
        Metric::Mechanics,
        Metric::Accuracy,
        Metric::DecisionSpeed,
    ];

    /// Snake-case key used in config files, CSV headers and the wire protocol.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Velocity => "velocity",
            Metric::ReleaseTime => "release_time",
            Metric::SpinRate => "spin_rate",
            Metric::Mechanics => "mechanics",
            Metric::Accuracy => "accuracy",
            Metric::DecisionSpeed => "decision_speed",
        }
    }

    /// Parse a metric key. Accepts snake_case and camelCase spellings
    /// ("release_time", "releaseTime"), case-insensitively.
    pub fn from_key(s: &str) -> Option<Self> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "velocity" => Some(Metric::Velocity),
            "releasetime" => Some(Metric::ReleaseTime),
            "spinrate" => Some(Metric::SpinRate),
            "mechanics" => Some(Metric::Mechanics),
            "accuracy" => Some(Metric::Accuracy),
            "decisionspeed" => Some(Metric::DecisionSpeed),
            _ => None,
        }
    }

    /// Whether a smaller raw value is the better one.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Metric::ReleaseTime)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// AthleteMetrics
// ---------------------------------------------------------------------------

/// Raw performance measurements for one athlete at one point in time.
///
/// Fields are private so that every instance has passed through
/// [`AthleteMetrics::new`]: all six values are present and finite. Values
/// outside the plausible ranges are accepted here and clamped during
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAthleteMetrics", rename_all = "camelCase")]
pub struct AthleteMetrics {
    velocity: f64,
    release_time: f64,
    spin_rate: f64,
    mechanics: f64,
    accuracy: f64,
    decision_speed: f64,
}

impl AthleteMetrics {
    /// Build a validated metric record. Fails with
    /// [`ScoringError::InvalidMetricInput`] on the first non-finite value.
    pub fn new(
        velocity: f64,
        release_time: f64,
        spin_rate: f64,
        mechanics: f64,
        accuracy: f64,
        decision_speed: f64,
    ) -> Result<Self, ScoringError> {
        let values = [
            (Metric::Velocity, velocity),
            (Metric::ReleaseTime, release_time),
            (Metric::SpinRate, spin_rate),
            (Metric::Mechanics, mechanics),
            (Metric::Accuracy, accuracy),
            (Metric::DecisionSpeed, decision_speed),
        ];
        for (metric, value) in values {
            if !value.is_finite() {
                return Err(ScoringError::non_finite(metric.key(), value));
            }
        }
        Ok(AthleteMetrics {
            velocity,
            release_time,
            spin_rate,
            mechanics,
            accuracy,
            decision_speed,
        })
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn release_time(&self) -> f64 {
        self.release_time
    }

    pub fn spin_rate(&self) -> f64 {
        self.spin_rate
    }

    pub fn mechanics(&self) -> f64 {
        self.mechanics
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn decision_speed(&self) -> f64 {
        self.decision_speed
    }

    /// Raw value of a single metric.
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

    /// Copy of this record with one metric replaced.
    pub fn with(&self, metric: Metric, value: f64) -> Result<Self, ScoringError> {
        let mut values = Metric::ALL.map(|m| self.get(m));
        values[metric as usize] = value;
        let [v, rt, sr, me, ac, ds] = values;
        AthleteMetrics::new(v, rt, sr, me, ac, ds)
    }
}

/// Unvalidated metric record as it arrives from an input boundary (JSON,
/// CSV). Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAthleteMetrics {
    #[serde(default)]
    pub velocity: Option<f64>,
    #[serde(default, alias = "release_time")]
    pub release_time: Option<f64>,
    #[serde(default, alias = "spin_rate")]
    pub spin_rate: Option<f64>,
    #[serde(default)]
    pub mechanics: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default, alias = "decision_speed")]
    pub decision_speed: Option<f64>,
}

impl TryFrom<RawAthleteMetrics> for AthleteMetrics {
    type Error = ScoringError;

    fn try_from(raw: RawAthleteMetrics) -> Result<Self, Self::Error> {
        let require = |metric: Metric, value: Option<f64>| {
            value.ok_or_else(|| ScoringError::missing(metric.key()))
        };
        AthleteMetrics::new(
            require(Metric::Velocity, raw.velocity)?,
            require(Metric::ReleaseTime, raw.release_time)?,
            require(Metric::SpinRate, raw.spin_rate)?,
            require(Metric::Mechanics, raw.mechanics)?,
            require(Metric::Accuracy, raw.accuracy)?,
            require(Metric::DecisionSpeed, raw.decision_speed)?,
        )
    }
}

// ---------------------------------------------------------------------------
// Athlete
// ---------------------------------------------------------------------------

/// A member of an athlete pool: identity plus one measurement snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Athlete {
    pub id: String,
    pub name: String,
    /// Date the measurements were taken, when known.
    #[serde(default)]
    pub measured_on: Option<NaiveDate>,
    pub metrics: AthleteMetrics,
    /// Independently measured QB Index traits. Missing traits are
    /// approximated from the core metrics.
    #[serde(default)]
    pub traits: QbTraits,
}

/// Unvalidated athlete record used for batch scoring, where one bad row
/// must not prevent scoring the rest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAthlete {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub measured_on: Option<NaiveDate>,
    #[serde(default)]
    pub metrics: RawAthleteMetrics,
    #[serde(default)]
    pub traits: RawQbTraits,
}

impl TryFrom<RawAthlete> for Athlete {
    type Error = ScoringError;

    fn try_from(raw: RawAthlete) -> Result<Self, Self::Error> {
        Ok(Athlete {
            metrics: AthleteMetrics::try_from(raw.metrics)?,
            traits: QbTraits::try_from(raw.traits)?,
            id: raw.id,
            name: raw.name,
            measured_on: raw.measured_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_keys_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_key(metric.key()), Some(metric));
        }
        assert_eq!(Metric::from_key("releaseTime"), Some(Metric::ReleaseTime));
        assert_eq!(Metric::from_key("DECISION_SPEED"), Some(Metric::DecisionSpeed));
        assert_eq!(Metric::from_key("arm_strength"), None);
    }

    #[test]
    fn only_release_time_is_lower_better() {
        let inverted: Vec<Metric> = Metric::ALL
            .into_iter()
            .filter(|m| m.lower_is_better())
            .collect();
        assert_eq!(inverted, vec![Metric::ReleaseTime]);
    }

    #[test]
    fn new_rejects_non_finite_values() {
        let err = AthleteMetrics::new(60.0, f64::NAN, 600.0, 80.0, 80.0, 80.0).unwrap_err();
        match err {
            ScoringError::InvalidMetricInput { field, .. } => assert_eq!(field, "release_time"),
            other => panic!("expected InvalidMetricInput, got: {other}"),
        }

        assert!(AthleteMetrics::new(f64::INFINITY, 0.4, 600.0, 80.0, 80.0, 80.0).is_err());
    }

    #[test]
    fn out_of_range_values_are_accepted() {
        // Clamping happens at normalization, not construction.
        let m = AthleteMetrics::new(1000.0, -1.0, 0.0, 150.0, -5.0, 200.0).unwrap();
        assert_eq!(m.velocity(), 1000.0);
        assert_eq!(m.get(Metric::ReleaseTime), -1.0);
    }

    #[test]
    fn with_replaces_one_metric() {
        let m = AthleteMetrics::new(60.0, 0.4, 600.0, 80.0, 81.0, 82.0).unwrap();
        let faster = m.with(Metric::Velocity, 65.0).unwrap();
        assert_eq!(faster.velocity(), 65.0);
        assert_eq!(faster.accuracy(), 81.0);
        assert_eq!(faster.decision_speed(), 82.0);
    }

    #[test]
    fn raw_metrics_missing_field_is_invalid() {
        let raw = RawAthleteMetrics {
            velocity: Some(60.0),
            release_time: Some(0.4),
            spin_rate: None,
            mechanics: Some(80.0),
            accuracy: Some(80.0),
            decision_speed: Some(80.0),
        };
        let err = AthleteMetrics::try_from(raw).unwrap_err();
        assert_eq!(
            err,
            ScoringError::InvalidMetricInput {
                field: "spin_rate".into(),
                reason: "required value is missing".into(),
            }
        );
    }

    #[test]
    fn deserializes_camel_case_and_snake_case() {
        let camel = r#"{"velocity":62,"releaseTime":0.38,"spinRate":620,"mechanics":88,"accuracy":91,"decisionSpeed":85}"#;
        let snake = r#"{"velocity":62,"release_time":0.38,"spin_rate":620,"mechanics":88,"accuracy":91,"decision_speed":85}"#;
        let a: AthleteMetrics = serde_json::from_str(camel).unwrap();
        let b: AthleteMetrics = serde_json::from_str(snake).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.spin_rate(), 620.0);
    }

    #[test]
    fn deserialize_fails_on_missing_metric() {
        let json = r#"{"velocity":62,"releaseTime":0.38,"spinRate":620,"mechanics":88,"accuracy":91}"#;
        let result: Result<AthleteMetrics, _> = serde_json::from_str(json);
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("decision_speed"), "unexpected error: {msg}");
    }

    #[test]
    fn raw_athlete_converts_with_default_traits() {
        let raw = RawAthlete {
            id: "a1".into(),
            name: "Test".into(),
            measured_on: NaiveDate::from_ymd_opt(2026, 3, 14),
            metrics: RawAthleteMetrics {
                velocity: Some(60.0),
                release_time: Some(0.4),
                spin_rate: Some(600.0),
                mechanics: Some(80.0),
                accuracy: Some(80.0),
                decision_speed: Some(80.0),
            },
            traits: RawQbTraits::default(),
        };
        let athlete = Athlete::try_from(raw).unwrap();
        assert_eq!(athlete.id, "a1");
        assert_eq!(athlete.traits, QbTraits::default());
        assert_eq!(athlete.measured_on, NaiveDate::from_ymd_opt(2026, 3, 14));
    }
}
