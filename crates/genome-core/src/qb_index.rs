// QB Index: secondary 0-99 composite with its own inputs, ranges and weights.
//
// Only velocity and release time are rescaled; the six grade inputs are
// already on 0-100 and pass through (clamped). When footwork, poise, field
// vision or clutch factor were not measured they are approximated from the
// core metrics.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScoringError;
use crate::gai::validate_weight_vector;
use crate::metrics::AthleteMetrics;
use crate::normalize::{MetricRange, NORMALIZED_MAX, NORMALIZED_MIN};
use crate::tier::{finalize_score, TierThresholds};

// ---------------------------------------------------------------------------
// Measured traits
// ---------------------------------------------------------------------------

/// Independently measured QB traits. Each is optional; a present trait is
/// always finite.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawQbTraits", rename_all = "camelCase")]
pub struct QbTraits {
    footwork: Option<f64>,
    poise: Option<f64>,
    field_vision: Option<f64>,
    clutch_factor: Option<f64>,
}

impl QbTraits {
    pub fn new(
        footwork: Option<f64>,
        poise: Option<f64>,
        field_vision: Option<f64>,
        clutch_factor: Option<f64>,
    ) -> Result<Self, ScoringError> {
        let fields = [
            ("footwork", footwork),
            ("poise", poise),
            ("field_vision", field_vision),
            ("clutch_factor", clutch_factor),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(ScoringError::non_finite(name, v));
                }
            }
        }
        Ok(QbTraits {
            footwork,
            poise,
            field_vision,
            clutch_factor,
        })
    }

    /// All four traits measured.
    pub fn measured(
        footwork: f64,
        poise: f64,
        field_vision: f64,
        clutch_factor: f64,
    ) -> Result<Self, ScoringError> {
        QbTraits::new(
            Some(footwork),
            Some(poise),
            Some(field_vision),
            Some(clutch_factor),
        )
    }

    pub fn footwork(&self) -> Option<f64> {
        self.footwork
    }

    pub fn poise(&self) -> Option<f64> {
        self.poise
    }

    pub fn field_vision(&self) -> Option<f64> {
        self.field_vision
    }

    pub fn clutch_factor(&self) -> Option<f64> {
        self.clutch_factor
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQbTraits {
    #[serde(default)]
    pub footwork: Option<f64>,
    #[serde(default)]
    pub poise: Option<f64>,
    #[serde(default, alias = "field_vision")]
    pub field_vision: Option<f64>,
    #[serde(default, alias = "clutch_factor")]
    pub clutch_factor: Option<f64>,
}

impl TryFrom<RawQbTraits> for QbTraits {
    type Error = ScoringError;

    fn try_from(raw: RawQbTraits) -> Result<Self, Self::Error> {
        QbTraits::new(raw.footwork, raw.poise, raw.field_vision, raw.clutch_factor)
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The eight QB Index inputs. Built from an athlete's core metrics plus any
/// measured traits, so every value is finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QbIndexInput {
    velocity: f64,
    release_time: f64,
    accuracy: f64,
    mechanics: f64,
    footwork: f64,
    poise: f64,
    field_vision: f64,
    clutch_factor: f64,
}

impl QbIndexInput {
    /// Combine core metrics with measured traits, approximating the missing
    /// traits:
    ///
    /// - footwork ~ mechanics
    /// - poise ~ mean(decision speed, accuracy)
    /// - field vision ~ decision speed
    /// - clutch factor ~ mean(accuracy, mechanics, decision speed)
    pub fn from_metrics(metrics: &AthleteMetrics, traits: &QbTraits) -> Self {
        let accuracy = metrics.accuracy();
        let mechanics = metrics.mechanics();
        let decision = metrics.decision_speed();
        QbIndexInput {
            velocity: metrics.velocity(),
            release_time: metrics.release_time(),
            accuracy,
            mechanics,
            footwork: traits.footwork.unwrap_or(mechanics),
            poise: traits.poise.unwrap_or((decision + accuracy) / 2.0),
            field_vision: traits.field_vision.unwrap_or(decision),
            clutch_factor: traits
                .clutch_factor
                .unwrap_or((accuracy + mechanics + decision) / 3.0),
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn release_time(&self) -> f64 {
        self.release_time
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn mechanics(&self) -> f64 {
        self.mechanics
    }

    pub fn footwork(&self) -> f64 {
        self.footwork
    }

    pub fn poise(&self) -> f64 {
        self.poise
    }

    pub fn field_vision(&self) -> f64 {
        self.field_vision
    }

    pub fn clutch_factor(&self) -> f64 {
        self.clutch_factor
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QbWeights {
    pub accuracy: f64,
    pub velocity: f64,
    pub mechanics: f64,
    pub release_time: f64,
    pub poise: f64,
    pub field_vision: f64,
    pub footwork: f64,
    pub clutch_factor: f64,
}

impl Default for QbWeights {
    fn default() -> Self {
        QbWeights {
            accuracy: 0.20,
            velocity: 0.15,
            mechanics: 0.14,
            release_time: 0.12,
            poise: 0.12,
            field_vision: 0.11,
            footwork: 0.10,
            clutch_factor: 0.06,
        }
    }
}

impl QbWeights {
    fn named(&self, prefix: &str) -> Vec<(String, f64)> {
        [
            ("accuracy", self.accuracy),
            ("velocity", self.velocity),
            ("mechanics", self.mechanics),
            ("release_time", self.release_time),
            ("poise", self.poise),
            ("field_vision", self.field_vision),
            ("footwork", self.footwork),
            ("clutch_factor", self.clutch_factor),
        ]
        .into_iter()
        .map(|(k, v)| (format!("{prefix}.{k}"), v))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QbIndexConfig {
    pub velocity: MetricRange,
    pub release_time: MetricRange,
    pub weights: QbWeights,
    pub tiers: QbTierThresholds,
}

impl Default for QbIndexConfig {
    fn default() -> Self {
        QbIndexConfig {
            velocity: MetricRange::new(40.0, 70.0, false),
            release_time: MetricRange::new(0.3, 0.7, true),
            weights: QbWeights::default(),
            tiers: QbTierThresholds::default(),
        }
    }
}

impl QbIndexConfig {
    pub fn validate(&self, prefix: &str) -> Result<(), ScoringError> {
        self.velocity.validate(&format!("{prefix}.velocity"))?;
        self.release_time.validate(&format!("{prefix}.release_time"))?;
        let weights_prefix = format!("{prefix}.weights");
        validate_weight_vector(&weights_prefix, &self.weights.named(&weights_prefix))?;
        self.tiers.validate(&format!("{prefix}.tiers"))
    }
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Lower bounds of the Franchise, Starter, Contender and Prospect bands.
/// Anything below `prospect` is a Project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QbTierThresholds {
    pub franchise: u8,
    pub starter: u8,
    pub contender: u8,
    pub prospect: u8,
}

impl Default for QbTierThresholds {
    fn default() -> Self {
        QbTierThresholds::from(TierThresholds::default())
    }
}

impl From<TierThresholds> for QbTierThresholds {
    fn from(t: TierThresholds) -> Self {
        QbTierThresholds {
            franchise: t.elite,
            starter: t.premium,
            contender: t.verified,
            prospect: t.developing,
        }
    }
}

impl QbTierThresholds {
    fn bands(&self) -> TierThresholds {
        TierThresholds {
            elite: self.franchise,
            premium: self.starter,
            verified: self.contender,
            developing: self.prospect,
        }
    }

    pub fn tier_for(&self, score: u8) -> QbTier {
        QbTier::ALL[self.bands().band(score)]
    }

    pub fn validate(&self, field: &str) -> Result<(), ScoringError> {
        self.bands().validate(field)
    }
}

/// QB Index bucket. Same breakpoints as the GAI tiers by default, different
/// labels; the two are displayed side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QbTier {
    Franchise,
    Starter,
    Contender,
    Prospect,
    Project,
}

impl QbTier {
    pub const ALL: [QbTier; 5] = [
        QbTier::Franchise,
        QbTier::Starter,
        QbTier::Contender,
        QbTier::Prospect,
        QbTier::Project,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QbTier::Franchise => "Franchise",
            QbTier::Starter => "Starter",
            QbTier::Contender => "Contender",
            QbTier::Prospect => "Prospect",
            QbTier::Project => "Project",
        }
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

fn pass_through(value: f64) -> f64 {
    value.clamp(NORMALIZED_MIN, NORMALIZED_MAX)
}

#[derive(Debug, Clone)]
pub struct QbIndexCalculator {
    config: QbIndexConfig,
}

impl QbIndexCalculator {
    pub fn new(config: &QbIndexConfig) -> Self {
        QbIndexCalculator {
            config: config.clone(),
        }
    }

    /// Weighted QB Index in `[0, 99]`.
    pub fn calculate_qb_index(&self, input: &QbIndexInput) -> u8 {
        let w = &self.config.weights;
        let velocity = self.config.velocity.normalize("velocity", input.velocity);
        let release = self
            .config
            .release_time
            .normalize("release_time", input.release_time);

        let raw = velocity * w.velocity
            + release * w.release_time
            + pass_through(input.accuracy) * w.accuracy
            + pass_through(input.mechanics) * w.mechanics
            + pass_through(input.footwork) * w.footwork
            + pass_through(input.poise) * w.poise
            + pass_through(input.field_vision) * w.field_vision
            + pass_through(input.clutch_factor) * w.clutch_factor;

        let score = finalize_score(raw);
        debug!(raw, score, "computed QB Index");
        score
    }

    pub fn qb_index_tier(&self, score: u8) -> QbTier {
        self.config.tiers.tier_for(score)
    }
}
