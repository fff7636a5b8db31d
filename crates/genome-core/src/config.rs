// Engine tuning constants gathered into one immutable configuration.
//
// Every section has a `Default` that reproduces the product constants, so a
// config file only needs to name what it overrides. Note that listing
// `programs` or `archetypes` replaces the whole built-in catalogue.

use serde::{Deserialize, Serialize};

use crate::archetype::{self, ArchetypeRule};
use crate::error::ScoringError;
use crate::gai::GaiWeights;
use crate::normalize::MetricRanges;
use crate::program::{self, ProgramProfile};
use crate::qb_index::QbIndexConfig;
use crate::tier::TierConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ranges: MetricRanges,
    pub gai_weights: GaiWeights,
    pub tiers: TierConfig,
    pub qb_index: QbIndexConfig,
    /// Best-fit catalogue in tie-break order.
    pub programs: Vec<ProgramProfile>,
    /// Archetype rules in priority order.
    pub archetypes: Vec<ArchetypeRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            ranges: MetricRanges::default(),
            gai_weights: GaiWeights::default(),
            tiers: TierConfig::default(),
            qb_index: QbIndexConfig::default(),
            programs: program::default_catalogue(),
            archetypes: archetype::default_rules(),
        }
    }
}

impl EngineConfig {
    /// Check every section. The first violation is reported with the dotted
    /// path of the offending field.
    pub fn validate(&self) -> Result<(), ScoringError> {
        self.ranges.validate("ranges")?;
        self.gai_weights.validate("gai_weights")?;
        self.tiers.thresholds.validate("tiers.thresholds")?;
        self.qb_index.validate("qb_index")?;
        program::validate_catalogue(&self.programs)?;
        archetype::validate_rules(&self.archetypes)?;
        Ok(())
    }
}
