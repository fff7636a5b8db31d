// Request dispatch: turns protocol requests into engine calls.

use genome_core::leaderboard::{build_leaderboard, rank_athletes, RankKey};
use genome_core::qb_index::QbTraits;
use genome_core::rank;
use genome_core::{Athlete, AthleteMetrics, ScoringEngine};
use serde_json::Value;
use tracing::{debug, warn};

use crate::protocol::{
    decode_athlete, decode_metrics, decode_traits, BatchItem, LeaderboardItem, Request, Response,
    ScoreView,
};

/// Fallback frame if a response cannot be encoded.
const ENCODE_FAILURE: &str = r#"{"type":"error","message":"failed to encode response"}"#;

/// The engine plus the athlete pool loaded at startup. Shared read-only
/// across connections.
#[derive(Debug)]
pub struct ScoringService {
    engine: ScoringEngine,
    pool: Vec<Athlete>,
}

impl ScoringService {
    pub fn new(engine: ScoringEngine, pool: Vec<Athlete>) -> Self {
        ScoringService { engine, pool }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn pool(&self) -> &[Athlete] {
        &self.pool
    }

    /// Parse one JSON text frame, dispatch it, and encode the reply.
    /// Malformed input yields an error response rather than failing.
    pub fn handle_text(&self, text: &str) -> String {
        let response = match serde_json::from_str::<Request>(text) {
            Ok(request) => self.handle(request),
            Err(e) => {
                debug!("rejecting malformed request: {e}");
                Response::error(format!("invalid request: {e}"))
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            warn!("failed to encode response: {e}");
            ENCODE_FAILURE.to_string()
        })
    }

    pub fn handle(&self, request: Request) -> Response {
        match request {
            Request::Score { metrics, traits } => self.score(metrics, traits),
            Request::ScoreBatch { athletes } => Response::ScoreBatch {
                results: self.score_batch(athletes),
            },
            Request::Rank { population, invert } => Response::Rank {
                entries: rank::rank(&population, invert),
            },
            Request::RankPool { by } => match by.parse::<RankKey>() {
                Ok(key) => Response::Rank {
                    entries: rank_athletes(&self.engine, &self.pool, key),
                },
                Err(e) => Response::error(e.to_string()),
            },
            Request::Leaderboard { limit } => {
                let mut rows = build_leaderboard(&self.engine, &self.pool);
                if let Some(limit) = limit {
                    rows.truncate(limit);
                }
                Response::Leaderboard {
                    rows: rows.iter().map(LeaderboardItem::from).collect(),
                }
            }
        }
    }

    fn score(&self, metrics: Value, traits: Value) -> Response {
        let validated = decode_metrics(metrics)
            .and_then(AthleteMetrics::try_from)
            .and_then(|m| Ok((m, QbTraits::try_from(decode_traits(traits)?)?)));
        match validated {
            Ok((metrics, traits)) => {
                let score = self.engine.score_metrics(&metrics, &traits);
                Response::Score(ScoreView::from(&score))
            }
            Err(e) => Response::error(e.to_string()),
        }
    }

    /// Entries that fail to decode keep their slot as an error item; the
    /// rest go through the engine's batch scorer.
    fn score_batch(&self, athletes: Vec<Value>) -> Vec<BatchItem> {
        let mut slots: Vec<Option<BatchItem>> = Vec::with_capacity(athletes.len());
        let mut decoded = Vec::with_capacity(athletes.len());
        for (position, value) in athletes.into_iter().enumerate() {
            match decode_athlete(position, value) {
                Ok(raw) => {
                    decoded.push(raw);
                    slots.push(None);
                }
                Err((id, e)) => {
                    warn!(athlete = %id, "not decoded: {e}");
                    slots.push(Some(BatchItem::rejected(id, &e)));
                }
            }
        }

        let mut scored = self
            .engine
            .score_batch(decoded)
            .into_iter()
            .map(|outcome| BatchItem::from(&outcome));
        slots
            .into_iter()
            .filter_map(|slot| slot.or_else(|| scored.next()))
            .collect()
    }
}
