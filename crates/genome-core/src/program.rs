// Best-fit program lookup: nearest catalogue profile in normalized space.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::metrics::Metric;
use crate::normalize::{NormalizedMetrics, NORMALIZED_MAX, NORMALIZED_MIN};

/// A program's target athlete, expressed as a normalized metric vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramProfile {
    pub name: String,
    pub target: NormalizedMetrics,
}

/// The selected program and how far the athlete sits from its target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramFit {
    pub program: String,
    pub distance: f64,
}

fn profile(
    name: &str,
    velocity: f64,
    release_time: f64,
    spin_rate: f64,
    mechanics: f64,
    accuracy: f64,
    decision_speed: f64,
) -> ProgramProfile {
    ProgramProfile {
        name: name.into(),
        target: NormalizedMetrics {
            velocity,
            release_time,
            spin_rate,
            mechanics,
            accuracy,
            decision_speed,
        },
    }
}

/// Built-in program catalogue, in declaration (tie-break) order.
pub fn default_catalogue() -> Vec<ProgramProfile> {
    vec![
        profile("Air Raid", 70.0, 80.0, 60.0, 75.0, 90.0, 85.0),
        profile("Pro Style", 80.0, 60.0, 75.0, 90.0, 85.0, 80.0),
        profile("Spread Option", 65.0, 75.0, 55.0, 65.0, 70.0, 75.0),
        profile("West Coast", 55.0, 90.0, 50.0, 85.0, 90.0, 90.0),
        profile("Vertical Power", 95.0, 55.0, 85.0, 70.0, 70.0, 65.0),
    ]
}

/// Pick the profile with the smallest L1 distance to `athlete`.
///
/// Ties resolve to the profile declared first. Returns `None` for an empty
/// catalogue.
pub fn best_fit(catalogue: &[ProgramProfile], athlete: &NormalizedMetrics) -> Option<ProgramFit> {
    let mut best: Option<(&ProgramProfile, f64)> = None;
    for candidate in catalogue {
        let distance = athlete.l1_distance(&candidate.target);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best.map(|(p, distance)| ProgramFit {
        program: p.name.clone(),
        distance,
    })
}

pub fn validate_catalogue(catalogue: &[ProgramProfile]) -> Result<(), ScoringError> {
    for (i, p) in catalogue.iter().enumerate() {
        if p.name.trim().is_empty() {
            return Err(ScoringError::config(
                format!("programs[{i}].name"),
                "must not be empty",
            ));
        }
        for metric in Metric::ALL {
            let v = p.target.get(metric);
            if !(NORMALIZED_MIN..=NORMALIZED_MAX).contains(&v) {
                return Err(ScoringError::config(
                    format!("programs[{i}].target.{}", metric.key()),
                    format!("must be within 0..=100, got {v}"),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(v: f64) -> NormalizedMetrics {
        NormalizedMetrics {
            velocity: v,
            release_time: v,
            spin_rate: v,
            mechanics: v,
            accuracy: v,
            decision_speed: v,
        }
    }

    #[test]
    fn picks_nearest_profile() {
        let catalogue = vec![
            ProgramProfile { name: "low".into(), target: flat(20.0) },
            ProgramProfile { name: "mid".into(), target: flat(50.0) },
            ProgramProfile { name: "high".into(), target: flat(90.0) },
        ];
        let fit = best_fit(&catalogue, &flat(60.0)).unwrap();
        assert_eq!(fit.program, "mid");
        assert!((fit.distance - 60.0).abs() < 1e-10);
    }

    #[test]
    fn ties_go_to_first_declared() {
        let catalogue = vec![
            ProgramProfile { name: "first".into(), target: flat(40.0) },
            ProgramProfile { name: "second".into(), target: flat(60.0) },
            ProgramProfile { name: "third".into(), target: flat(40.0) },
        ];
        // 50 is equidistant from 40 and 60.
        let fit = best_fit(&catalogue, &flat(50.0)).unwrap();
        assert_eq!(fit.program, "first");
    }

    #[test]
    fn empty_catalogue_has_no_fit() {
        assert_eq!(best_fit(&[], &flat(50.0)), None);
    }

    #[test]
    fn example_athlete_fits_air_raid() {
        let athlete = NormalizedMetrics {
            velocity: 73.33,
            release_time: 80.0,
            spin_rate: 48.57,
            mechanics: 88.0,
            accuracy: 91.0,
            decision_speed: 85.0,
        };
        let fit = best_fit(&default_catalogue(), &athlete).unwrap();
        assert_eq!(fit.program, "Air Raid");
    }

    #[test]
    fn default_catalogue_is_valid() {
        assert!(validate_catalogue(&default_catalogue()).is_ok());
    }

    #[test]
    fn rejects_out_of_scale_target() {
        let mut catalogue = default_catalogue();
        catalogue[1].target.spin_rate = 120.0;
        let err = validate_catalogue(&catalogue).unwrap_err();
        match err {
            ScoringError::InvalidConfig { field, .. } => {
                assert_eq!(field, "programs[1].target.spin_rate");
            }
            other => panic!("expected InvalidConfig, got: {other}"),
        }
    }
}
