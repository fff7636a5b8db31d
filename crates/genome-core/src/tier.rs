// Score tiers: five contiguous bands over the 0-99 score scale.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// Highest score either composite can produce. A perfect 100 is unreachable.
pub const MAX_SCORE: u8 = 99;

/// Round a raw weighted sum to the nearest integer and clamp it to
/// `[0, MAX_SCORE]`.
pub fn finalize_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, MAX_SCORE as f64) as u8
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Lower bounds of the four upper bands. Everything below `developing`
/// falls into the bottom band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub elite: u8,
    pub premium: u8,
    pub verified: u8,
    pub developing: u8,
}

impl Default for TierThresholds {
    fn default() -> Self {
        TierThresholds {
            elite: 90,
            premium: 80,
            verified: 70,
            developing: 60,
        }
    }
}

impl TierThresholds {
    /// Band index for a score: 0 is the top band, 4 the bottom.
    pub fn band(&self, score: u8) -> usize {
        if score >= self.elite {
            0
        } else if score >= self.premium {
            1
        } else if score >= self.verified {
            2
        } else if score >= self.developing {
            3
        } else {
            4
        }
    }

    /// Thresholds must be strictly descending, leave room for a non-empty
    /// bottom band, and keep the top band reachable.
    pub fn validate(&self, field: &str) -> Result<(), ScoringError> {
        let ordered = [self.elite, self.premium, self.verified, self.developing];
        if ordered.windows(2).any(|w| w[0] <= w[1]) {
            return Err(ScoringError::config(
                field,
                format!("thresholds must be strictly descending, got {ordered:?}"),
            ));
        }
        if self.developing == 0 {
            return Err(ScoringError::config(field, "lowest threshold must be > 0"));
        }
        if self.elite > MAX_SCORE {
            return Err(ScoringError::config(
                field,
                format!("top threshold must be <= {MAX_SCORE}, got {}", self.elite),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GAI tiers
// ---------------------------------------------------------------------------

/// Qualitative bucket for a Genome Activation Index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Elite,
    Premium,
    Verified,
    Developing,
    Emerging,
}

impl Tier {
    /// Best to worst.
    pub const ALL: [Tier; 5] = [
        Tier::Elite,
        Tier::Premium,
        Tier::Verified,
        Tier::Developing,
        Tier::Emerging,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Elite => "Elite",
            Tier::Premium => "Premium",
            Tier::Verified => "Verified",
            Tier::Developing => "Developing",
            Tier::Emerging => "Emerging",
        }
    }
}

/// Display colors per GAI tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierColors {
    pub elite: String,
    pub premium: String,
    pub verified: String,
    pub developing: String,
    pub emerging: String,
}

impl Default for TierColors {
    fn default() -> Self {
        TierColors {
            elite: "#00F5A0".into(),
            premium: "#00C2FF".into(),
            verified: "#7C5CFF".into(),
            developing: "#FFB020".into(),
            emerging: "#8A8F98".into(),
        }
    }
}

impl TierColors {
    pub fn get(&self, tier: Tier) -> &str {
        match tier {
            Tier::Elite => &self.elite,
            Tier::Premium => &self.premium,
            Tier::Verified => &self.verified,
            Tier::Developing => &self.developing,
            Tier::Emerging => &self.emerging,
        }
    }
}

/// Thresholds plus colors for the GAI tier scale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub thresholds: TierThresholds,
    pub colors: TierColors,
}

impl TierConfig {
    pub fn tier_for(&self, score: u8) -> Tier {
        Tier::ALL[self.thresholds.band(score)]
    }

    pub fn color_for(&self, tier: Tier) -> &str {
        self.colors.get(tier)
    }
}
