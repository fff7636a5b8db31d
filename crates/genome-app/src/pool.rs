// Athlete pool CSV loading.
//
// One row per athlete. Required columns: id, velocity, release_time,
// spin_rate, mechanics, accuracy, decision_speed. Optional columns: name,
// measured_on (YYYY-MM-DD), footwork, poise, field_vision, clutch_factor.
// Unknown columns are ignored.

use chrono::NaiveDate;
use genome_core::metrics::RawAthleteMetrics;
use genome_core::qb_index::RawQbTraits;
use genome_core::{Athlete, RawAthlete};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("failed to read athlete pool {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse athlete pool {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Raw CSV row
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawAthleteRow {
    #[serde(alias = "ID", alias = "athlete_id")]
    id: String,
    #[serde(default, alias = "Name")]
    name: String,
    #[serde(default, alias = "date")]
    measured_on: Option<String>,
    #[serde(default, alias = "velo")]
    velocity: Option<f64>,
    #[serde(default)]
    release_time: Option<f64>,
    #[serde(default, alias = "spin")]
    spin_rate: Option<f64>,
    #[serde(default)]
    mechanics: Option<f64>,
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(default)]
    decision_speed: Option<f64>,
    #[serde(default)]
    footwork: Option<f64>,
    #[serde(default)]
    poise: Option<f64>,
    #[serde(default)]
    field_vision: Option<f64>,
    #[serde(default, alias = "clutch")]
    clutch_factor: Option<f64>,
}

impl RawAthleteRow {
    fn into_raw_athlete(self) -> RawAthlete {
        let measured_on = self
            .measured_on
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!(athlete = %self.id, "ignoring measured_on {s:?}: {e}");
                    None
                }
            });

        RawAthlete {
            id: self.id,
            name: self.name,
            measured_on,
            metrics: RawAthleteMetrics {
                velocity: self.velocity,
                release_time: self.release_time,
                spin_rate: self.spin_rate,
                mechanics: self.mechanics,
                accuracy: self.accuracy,
                decision_speed: self.decision_speed,
            },
            traits: RawQbTraits {
                footwork: self.footwork,
                poise: self.poise,
                field_vision: self.field_vision,
                clutch_factor: self.clutch_factor,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Parse athletes from any CSV reader.
///
/// Rows that fail to deserialize or that carry a missing or non-finite core
/// metric are skipped with a warning. A repeated id keeps the first row.
pub fn load_athletes_from_reader<R: Read>(reader: R) -> Result<Vec<Athlete>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut athletes = Vec::new();
    let mut seen = HashSet::new();

    for (row, result) in rdr.deserialize::<RawAthleteRow>().enumerate() {
        // Header is line 1.
        let line = row + 2;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping malformed athlete row {line}: {e}");
                continue;
            }
        };

        if raw.id.trim().is_empty() {
            warn!("Skipping athlete row {line}: empty id");
            continue;
        }

        let athlete = match Athlete::try_from(raw.into_raw_athlete()) {
            Ok(a) => a,
            Err(e) => {
                warn!("Skipping athlete row {line}: {e}");
                continue;
            }
        };

        if !seen.insert(athlete.id.clone()) {
            warn!(athlete = %athlete.id, "Skipping athlete row {line}: duplicate id");
            continue;
        }

        athletes.push(athlete);
    }

    Ok(athletes)
}

/// Load the athlete pool from a CSV file.
pub fn load_athletes(path: &Path) -> Result<Vec<Athlete>, PoolError> {
    let file = std::fs::File::open(path).map_err(|e| PoolError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let athletes = load_athletes_from_reader(file).map_err(|e| PoolError::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Loaded {} athletes from {}", athletes.len(), path.display());
    Ok(athletes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
