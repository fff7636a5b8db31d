// Rank and percentile positions within a population snapshot.
//
// Two independent percentile definitions live here:
// - rank-based (`rank`): position in the sorted population mapped to
//   "better than X%";
// - value-based (`value_percentile`): share of a raw value distribution at
//   or below a given value.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

/// One member of a ranking population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub id: String,
    pub value: f64,
}

impl RankEntry {
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        RankEntry {
            id: id.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub id: String,
    pub value: f64,
    /// 1-based sequential position; ties are not collapsed.
    pub rank: usize,
    pub percentile: u8,
}

/// Percentile for a 1-based `rank` in a population of `population_size`:
/// the share of members ranked at or below it, rounded, floored at 1.
///
/// Returns 0 only for an empty population or an out-of-range rank.
pub fn percentile_for_rank(rank: usize, population_size: usize) -> u8 {
    if population_size == 0 || rank == 0 || rank > population_size {
        return 0;
    }
    let at_or_below = population_size - rank + 1;
    let pct = (at_or_below as f64 / population_size as f64 * 100.0).round();
    (pct as u8).max(1)
}

/// Order a value pair best-first.
pub(crate) fn compare_values(a: f64, b: f64, invert: bool) -> Ordering {
    let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    if invert {
        ord
    } else {
        ord.reverse()
    }
}

/// Rank a population by value: descending, or ascending when `invert`
/// (lower is better).
///
/// The sort is stable, so equal values keep their input order and receive
/// distinct sequential ranks. Entries with non-finite values cannot be
/// ordered and are excluded from the snapshot. An empty population yields an
/// empty result.
pub fn rank(population: &[RankEntry], invert: bool) -> Vec<RankedEntry> {
    let mut snapshot: Vec<&RankEntry> = population
        .iter()
        .filter(|entry| {
            let finite = entry.value.is_finite();
            if !finite {
                warn!(id = %entry.id, value = entry.value, "excluding non-finite value from ranking");
            }
            finite
        })
        .collect();

    snapshot.sort_by(|a, b| compare_values(a.value, b.value, invert));

    let n = snapshot.len();
    snapshot
        .into_iter()
        .enumerate()
        .map(|(i, entry)| RankedEntry {
            id: entry.id.clone(),
            value: entry.value,
            rank: i + 1,
            percentile: percentile_for_rank(i + 1, n),
        })
        .collect()
}

/// Value-based percentile: the share of `distribution` that `value` is at
/// least as good as, rounded to 0..=100.
///
/// Non-finite members of the distribution are ignored. Returns `None` when
/// nothing remains to compare against or `value` itself is not finite.
pub fn value_percentile(value: f64, distribution: &[f64], invert: bool) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    let finite: Vec<f64> = distribution.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let at_or_below = finite
        .iter()
        .filter(|&&other| if invert { other >= value } else { other <= value })
        .count();
    Some((at_or_below as f64 / finite.len() as f64 * 100.0).round() as u8)
}
