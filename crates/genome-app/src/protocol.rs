// JSON message protocol spoken over the WebSocket connection.
//
// Every message is a JSON object tagged by "type". Clients send a Request and
// receive exactly one Response per request.

use genome_core::engine::BatchOutcome;
use genome_core::leaderboard::LeaderboardRow;
use genome_core::metrics::RawAthleteMetrics;
use genome_core::qb_index::RawQbTraits;
use genome_core::rank::{RankEntry, RankedEntry};
use genome_core::{AthleteScore, RawAthlete, ScoringError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Client -> service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Score one metric record. Metrics and traits stay untyped until
    /// [`decode_metrics`] and [`decode_traits`] can name the bad field.
    Score {
        metrics: Value,
        #[serde(default)]
        traits: Value,
    },
    /// Score several athletes; failures are reported per athlete, including
    /// entries that do not decode.
    ScoreBatch { athletes: Vec<Value> },
    /// Rank an arbitrary population snapshot.
    Rank {
        population: Vec<RankEntry>,
        #[serde(default)]
        invert: bool,
    },
    /// Rank the loaded athlete pool by GAI, QB Index or a raw metric.
    RankPool { by: String },
    /// Leaderboard of the loaded pool, optionally truncated.
    Leaderboard {
        #[serde(default)]
        limit: Option<usize>,
    },
}

// ---------------------------------------------------------------------------
// Field-level decoding
// ---------------------------------------------------------------------------

/// Accepted spellings of each metric field, mapped to its canonical key.
const METRIC_FIELDS: &[(&str, &str)] = &[
    ("velocity", "velocity"),
    ("releaseTime", "release_time"),
    ("release_time", "release_time"),
    ("spinRate", "spin_rate"),
    ("spin_rate", "spin_rate"),
    ("mechanics", "mechanics"),
    ("accuracy", "accuracy"),
    ("decisionSpeed", "decision_speed"),
    ("decision_speed", "decision_speed"),
];

const TRAIT_FIELDS: &[(&str, &str)] = &[
    ("footwork", "footwork"),
    ("poise", "poise"),
    ("fieldVision", "field_vision"),
    ("field_vision", "field_vision"),
    ("clutchFactor", "clutch_factor"),
    ("clutch_factor", "clutch_factor"),
];

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ScoringError {
    ScoringError::InvalidMetricInput {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Reject the first known field holding something other than a number or
/// null, naming it by its canonical key.
fn check_numeric_fields(
    value: &Value,
    fields: &[(&str, &'static str)],
) -> Result<(), ScoringError> {
    let Some(object) = value.as_object() else {
        return Ok(());
    };
    for (name, field_value) in object {
        let Some((_, key)) = fields.iter().find(|(spelling, _)| *spelling == name.as_str()) else {
            continue;
        };
        if !matches!(field_value, Value::Number(_) | Value::Null) {
            return Err(invalid(
                key,
                format!("expected a number, got {}", json_kind(field_value)),
            ));
        }
    }
    Ok(())
}

pub fn decode_metrics(value: Value) -> Result<RawAthleteMetrics, ScoringError> {
    check_numeric_fields(&value, METRIC_FIELDS)?;
    serde_json::from_value(value).map_err(|e| invalid("metrics", e.to_string()))
}

/// Absent (null) traits decode to all-missing.
pub fn decode_traits(value: Value) -> Result<RawQbTraits, ScoringError> {
    if value.is_null() {
        return Ok(RawQbTraits::default());
    }
    check_numeric_fields(&value, TRAIT_FIELDS)?;
    serde_json::from_value(value).map_err(|e| invalid("traits", e.to_string()))
}

/// Decode one batch entry. On failure the error is paired with the entry's
/// id, or with its position when no id can be read.
pub fn decode_athlete(
    position: usize,
    mut value: Value,
) -> Result<RawAthlete, (String, ScoringError)> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{position}"));
    if !value.is_object() {
        let err = invalid(
            "athlete",
            format!("expected an object, got {}", json_kind(&value)),
        );
        return Err((id, err));
    }

    let mut take = |key: &str| {
        value
            .as_object_mut()
            .and_then(|object| object.remove(key))
            .unwrap_or(Value::Null)
    };
    let metrics = take("metrics");
    let traits = take("traits");

    // Missing metrics are reported field by field when the athlete is scored.
    let metrics = if metrics.is_null() {
        RawAthleteMetrics::default()
    } else {
        decode_metrics(metrics).map_err(|e| (id.clone(), e))?
    };
    let traits = decode_traits(traits).map_err(|e| (id.clone(), e))?;

    let mut raw: RawAthlete = serde_json::from_value(value)
        .map_err(|e| (id.clone(), invalid("athlete", e.to_string())))?;
    raw.metrics = metrics;
    raw.traits = traits;
    Ok(raw)
}

// ---------------------------------------------------------------------------
// Service -> client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Score(ScoreView),
    ScoreBatch { results: Vec<BatchItem> },
    Rank { entries: Vec<RankedEntry> },
    Leaderboard { rows: Vec<LeaderboardItem> },
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

/// Display form of an [`AthleteScore`]: enums rendered as their labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    pub gai: u8,
    pub tier: String,
    pub tier_color: String,
    pub archetype: String,
    pub best_fit_program: Option<String>,
    pub program_distance: Option<f64>,
    pub qb_index: u8,
    pub qb_tier: String,
}

impl From<&AthleteScore> for ScoreView {
    fn from(score: &AthleteScore) -> Self {
        let gai = &score.gai;
        ScoreView {
            gai: gai.score,
            tier: gai.tier.label().to_string(),
            tier_color: gai.tier_color.clone(),
            archetype: gai.archetype.label().to_string(),
            best_fit_program: gai.best_fit_program.as_ref().map(|f| f.program.clone()),
            program_distance: gai.best_fit_program.as_ref().map(|f| f.distance),
            qb_index: score.qb_index,
            qb_tier: score.qb_tier.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn rejected(id: String, error: &ScoringError) -> Self {
        BatchItem {
            id,
            score: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<&BatchOutcome> for BatchItem {
    fn from(outcome: &BatchOutcome) -> Self {
        match &outcome.result {
            Ok(score) => BatchItem {
                id: outcome.id.clone(),
                score: Some(ScoreView::from(score)),
                error: None,
            },
            Err(e) => BatchItem::rejected(outcome.id.clone(), e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardItem {
    pub rank: usize,
    pub percentile: u8,
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub score: ScoreView,
}

impl From<&LeaderboardRow> for LeaderboardItem {
    fn from(row: &LeaderboardRow) -> Self {
        LeaderboardItem {
            rank: row.rank,
            percentile: row.percentile,
            id: row.id.clone(),
            name: row.name.clone(),
            score: ScoreView::from(&row.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_score_request_without_traits() {
        let req: Request = serde_json::from_value(json!({
            "type": "score",
            "metrics": {
                "velocity": 62, "releaseTime": 0.38, "spinRate": 620,
                "mechanics": 88, "accuracy": 91, "decisionSpeed": 85
            }
        }))
        .unwrap();
        match req {
            Request::Score { metrics, traits } => {
                assert_eq!(decode_metrics(metrics).unwrap().release_time, Some(0.38));
                assert_eq!(decode_traits(traits).unwrap().poise, None);
            }
            other => panic!("expected Score, got {other:?}"),
        }
    }

    #[test]
    fn parses_rank_request_with_default_invert() {
        let req: Request = serde_json::from_value(json!({
            "type": "rank",
            "population": [{"id": "a", "value": 1.0}, {"id": "b", "value": 2.0}]
        }))
        .unwrap();
        match req {
            Request::Rank { population, invert } => {
                assert_eq!(population.len(), 2);
                assert!(!invert);
            }
            other => panic!("expected Rank, got {other:?}"),
        }
    }

    #[test]
    fn parses_pool_requests() {
        let req: Request =
            serde_json::from_value(json!({"type": "rank_pool", "by": "qb_index"})).unwrap();
        assert!(matches!(req, Request::RankPool { by } if by == "qb_index"));

        let req: Request = serde_json::from_value(json!({"type": "leaderboard"})).unwrap();
        assert!(matches!(req, Request::Leaderboard { limit: None }));
    }

    fn field_of(err: ScoringError) -> String {
        match err {
            ScoringError::InvalidMetricInput { field, .. } => field,
            other => panic!("expected InvalidMetricInput, got: {other}"),
        }
    }

    #[test]
    fn non_numeric_metric_names_the_field() {
        let err = decode_metrics(json!({"velocity": 62, "spinRate": "high"})).unwrap_err();
        assert_eq!(field_of(err.clone()), "spin_rate");
        assert!(err.to_string().contains("got a string"));

        let err = decode_traits(json!({"clutch_factor": [1, 2]})).unwrap_err();
        assert_eq!(field_of(err), "clutch_factor");

        // Unknown fields are ignored whatever they hold.
        assert!(decode_metrics(json!({"wingspan": "long"})).is_ok());
        assert_eq!(field_of(decode_metrics(json!(5)).unwrap_err()), "metrics");
    }

    #[test]
    fn decode_athlete_reports_id_or_position() {
        let raw = decode_athlete(
            0,
            json!({"id": "ok", "name": "Ok", "metrics": {"velocity": 60}, "traits": {"poise": 70}}),
        )
        .unwrap();
        assert_eq!(raw.id, "ok");
        assert_eq!(raw.metrics.velocity, Some(60.0));
        assert_eq!(raw.traits.poise, Some(70.0));

        let (id, err) =
            decode_athlete(1, json!({"id": "x", "metrics": {"velocity": "fast"}})).unwrap_err();
        assert_eq!(id, "x");
        assert_eq!(field_of(err), "velocity");

        let (id, err) = decode_athlete(2, json!({"metrics": {}})).unwrap_err();
        assert_eq!(id, "#2");
        assert_eq!(field_of(err), "athlete");

        let (id, _) = decode_athlete(3, json!("not an athlete")).unwrap_err();
        assert_eq!(id, "#3");
    }

    #[test]
    fn rejects_unknown_type() {
        let result = serde_json::from_value::<Request>(json!({"type": "train"}));
        assert!(result.is_err());
    }

    #[test]
    fn error_response_shape() {
        let value = serde_json::to_value(Response::error("bad input")).unwrap();
        assert_eq!(value, json!({"type": "error", "message": "bad input"}));
    }

    #[test]
    fn batch_item_omits_absent_side() {
        let item = BatchItem {
            id: "x".into(),
            score: None,
            error: Some("missing field".into()),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value, json!({"id": "x", "error": "missing field"}));
    }
}
