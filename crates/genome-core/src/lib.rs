// Athlete genome scoring engine: metric normalization, the Genome Activation
// Index and QB Index composites, archetype classification, and population
// ranking. Everything here is pure computation over immutable inputs.

pub mod archetype;
pub mod config;
pub mod engine;
pub mod error;
pub mod gai;
pub mod leaderboard;
pub mod metrics;
pub mod normalize;
pub mod program;
pub mod qb_index;
pub mod rank;
pub mod tier;

pub use config::EngineConfig;
pub use engine::{AthleteScore, ScoringEngine};
pub use error::ScoringError;
pub use metrics::{Athlete, AthleteMetrics, Metric, RawAthlete};
