// Leaderboard assembly and pool ranking by a chosen key.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::engine::{AthleteScore, ScoringEngine};
use crate::metrics::{Athlete, Metric};
use crate::rank::{self, compare_values, percentile_for_rank, RankEntry, RankedEntry};

// ---------------------------------------------------------------------------
// Rank keys
// ---------------------------------------------------------------------------

/// What to rank a pool by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    Gai,
    QbIndex,
    Metric(Metric),
}

impl RankKey {
    /// Raw metrics carry their own direction; composite scores are always
    /// higher-is-better.
    pub fn lower_is_better(&self) -> bool {
        match self {
            RankKey::Metric(m) => m.lower_is_better(),
            RankKey::Gai | RankKey::QbIndex => false,
        }
    }

    /// Raw metric keys read the record directly; only composite keys score it.
    fn value_for(&self, engine: &ScoringEngine, athlete: &Athlete) -> f64 {
        match self {
            RankKey::Gai => engine.score(athlete).gai.score as f64,
            RankKey::QbIndex => engine.score(athlete).qb_index as f64,
            RankKey::Metric(m) => athlete.metrics.get(*m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rank key `{0}`")]
pub struct UnknownRankKey(pub String);

impl FromStr for RankKey {
    type Err = UnknownRankKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gai" | "score" => Ok(RankKey::Gai),
            "qb_index" | "qbindex" | "qb" => Ok(RankKey::QbIndex),
            other => Metric::from_key(other)
                .map(RankKey::Metric)
                .ok_or_else(|| UnknownRankKey(s.to_string())),
        }
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankKey::Gai => f.write_str("gai"),
            RankKey::QbIndex => f.write_str("qb_index"),
            RankKey::Metric(m) => write!(f, "{m}"),
        }
    }
}

/// Rank a pool of athletes by `key`. Direction follows the key.
pub fn rank_athletes(engine: &ScoringEngine, athletes: &[Athlete], key: RankKey) -> Vec<RankedEntry> {
    let population: Vec<RankEntry> = athletes
        .iter()
        .map(|a| RankEntry::new(a.id.clone(), key.value_for(engine, a)))
        .collect();
    rank::rank(&population, key.lower_is_better())
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub percentile: u8,
    pub id: String,
    pub name: String,
    pub score: AthleteScore,
}

/// Score every athlete and order by GAI descending, breaking GAI ties by QB
/// Index descending. Full ties keep pool order.
pub fn build_leaderboard(engine: &ScoringEngine, athletes: &[Athlete]) -> Vec<LeaderboardRow> {
    let mut scored: Vec<(&Athlete, AthleteScore)> =
        athletes.iter().map(|a| (a, engine.score(a))).collect();

    scored.sort_by(|(_, a), (_, b)| {
        compare_values(a.gai.score as f64, b.gai.score as f64, false)
            .then_with(|| compare_values(a.qb_index as f64, b.qb_index as f64, false))
    });

    let n = scored.len();
    scored
        .into_iter()
        .enumerate()
        .map(|(i, (athlete, score))| LeaderboardRow {
            rank: i + 1,
            percentile: percentile_for_rank(i + 1, n),
            id: athlete.id.clone(),
            name: athlete.name.clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::metrics::AthleteMetrics;
    use crate::qb_index::QbTraits;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(EngineConfig::default()).unwrap()
    }

    fn athlete(id: &str, m: AthleteMetrics, traits: QbTraits) -> Athlete {
        Athlete {
            id: id.into(),
            name: format!("Athlete {id}"),
            measured_on: None,
            metrics: m,
            traits,
        }
    }

    fn m(v: f64, rt: f64, sr: f64, me: f64, ac: f64, ds: f64) -> AthleteMetrics {
        AthleteMetrics::new(v, rt, sr, me, ac, ds).unwrap()
    }

    #[test]
    fn parses_rank_keys() {
        assert_eq!("gai".parse::<RankKey>().unwrap(), RankKey::Gai);
        assert_eq!("QB_INDEX".parse::<RankKey>().unwrap(), RankKey::QbIndex);
        assert_eq!(
            "releaseTime".parse::<RankKey>().unwrap(),
            RankKey::Metric(Metric::ReleaseTime)
        );
        let err = "wingspan".parse::<RankKey>().unwrap_err();
        assert_eq!(err.to_string(), "unknown rank key `wingspan`");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
        for key in [RankKey::Gai, RankKey::QbIndex, RankKey::Metric(Metric::SpinRate)] {
            assert_eq!(key.to_string().parse::<RankKey>().unwrap(), key);
        }
    }

    #[test]
    fn leaderboard_orders_by_gai() {
        let pool = vec![
            athlete("low", m(48.0, 0.60, 500.0, 55.0, 58.0, 50.0), QbTraits::default()),
            athlete("top", m(66.0, 0.34, 760.0, 94.0, 95.0, 92.0), QbTraits::default()),
            athlete("mid", m(62.0, 0.38, 620.0, 88.0, 91.0, 85.0), QbTraits::default()),
        ];
        let board = build_leaderboard(&engine(), &pool);
        let ids: Vec<&str> = board.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "mid", "low"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].percentile, 100);
        assert_eq!(board[2].percentile, 33);
        assert!(board.windows(2).all(|w| w[0].score.gai.score >= w[1].score.gai.score));
    }

    #[test]
    fn qb_index_breaks_gai_ties() {
        let base = m(62.0, 0.38, 620.0, 88.0, 91.0, 85.0);
        let weak_traits = QbTraits::measured(40.0, 40.0, 40.0, 40.0).unwrap();
        let strong_traits = QbTraits::measured(99.0, 99.0, 99.0, 99.0).unwrap();
        let pool = vec![
            athlete("weak", base, weak_traits),
            athlete("strong", base, strong_traits),
            athlete("derived", base, QbTraits::default()),
        ];
        let board = build_leaderboard(&engine(), &pool);
        // Identical core metrics give identical GAI.
        assert!(board.iter().all(|r| r.score.gai.score == board[0].score.gai.score));
        let ids: Vec<&str> = board.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["strong", "derived", "weak"]);
    }

    #[test]
    fn full_ties_keep_pool_order() {
        let base = m(55.0, 0.50, 600.0, 70.0, 70.0, 70.0);
        let pool = vec![
            athlete("first", base, QbTraits::default()),
            athlete("second", base, QbTraits::default()),
        ];
        let board = build_leaderboard(&engine(), &pool);
        assert_eq!(board[0].id, "first");
        assert_eq!(board[1].id, "second");
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn rank_by_release_time_prefers_quicker() {
        let pool = vec![
            athlete("slow", m(60.0, 0.55, 600.0, 70.0, 70.0, 70.0), QbTraits::default()),
            athlete("quick", m(60.0, 0.33, 600.0, 70.0, 70.0, 70.0), QbTraits::default()),
        ];
        let ranked = rank_athletes(&engine(), &pool, RankKey::Metric(Metric::ReleaseTime));
        assert_eq!(ranked[0].id, "quick");
        assert_eq!(ranked[0].value, 0.33);
        assert_eq!(ranked[1].percentile, 50);
    }

    #[test]
    fn metric_keys_rank_raw_values_and_composites_rank_scores() {
        let e = engine();
        let a = athlete("a", m(62.0, 0.38, 620.0, 88.0, 91.0, 85.0), QbTraits::default());
        assert_eq!(RankKey::Metric(Metric::SpinRate).value_for(&e, &a), 620.0);
        assert_eq!(RankKey::Gai.value_for(&e, &a), e.score(&a).gai.score as f64);
        assert_eq!(RankKey::QbIndex.value_for(&e, &a), e.score(&a).qb_index as f64);
    }

    #[test]
    fn empty_pool() {
        assert!(build_leaderboard(&engine(), &[]).is_empty());
        assert!(rank_athletes(&engine(), &[], RankKey::Gai).is_empty());
    }
}
