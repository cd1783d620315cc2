//! Normalization of upstream match records into [`Match`] values.
//!
//! Upstream payloads come in several shapes: a bare array, or an object
//! wrapping the array under `data` or a collection-specific key. Individual
//! records use different field names depending on the endpoint (flat matches,
//! pool `rencontres`, store documents). Every fallback lives in
//! [`SynonymTable`] so the resolution policy is declared in one place.
use crate::{Category, Match, MatchStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::debug;
use serde_json::{Map, Value};
use std::fmt;

pub const HOME_PLACEHOLDER: &str = "Home team";
pub const AWAY_PLACEHOLDER: &str = "Away team";

/// Keys that may wrap a list of match records.
pub const MATCH_ENVELOPE_KEYS: &[&str] = &["data", "matchs", "matches", "rencontres"];

/// Per-field lookup keys: canonical name first, then synonyms in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    pub id: &'static [&'static str],
    pub date: &'static [&'static str],
    pub home_team: &'static [&'static str],
    pub away_team: &'static [&'static str],
    pub home_score: &'static [&'static str],
    pub away_score: &'static [&'static str],
    pub status: &'static [&'static str],
    pub pool: &'static [&'static str],
    pub category: &'static [&'static str],
    pub phase_id: &'static [&'static str],
}

impl SynonymTable {
    pub const DEFAULT: SynonymTable = SynonymTable {
        id: &["rencId", "renc_id", "id", "match_id", "rencontre_id"],
        date: &["date", "date_heure", "dateTime", "date_match"],
        home_team: &["equipe_domicile", "equipe1", "homeTeam", "home_team"],
        away_team: &["equipe_exterieur", "equipe2", "awayTeam", "away_team"],
        home_score: &["score_domicile", "but1", "homeScore", "home_score"],
        away_score: &["score_exterieur", "but2", "awayScore", "away_score"],
        status: &["statut", "status"],
        pool: &["poule", "pool", "poule_libelle"],
        category: &["category", "categorie"],
        phase_id: &["phase_id", "phaseId"],
    };
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Raised only when a payload cannot be a collection at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    NotACollection { found: &'static str },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::NotACollection { found } => {
                write!(f, "expected an array or an envelope object, found {found}")
            }
        }
    }
}

impl std::error::Error for ShapeError {}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    table: SynonymTable,
}

impl Normalizer {
    pub fn new(table: SynonymTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SynonymTable {
        &self.table
    }

    /// Normalize every record of an envelope. Non-object elements are skipped.
    pub fn normalize_all(&self, payload: &Value, category: Category) -> Result<Vec<Match>, ShapeError> {
        let records = unwrap_envelope(payload, MATCH_ENVELOPE_KEYS)?;
        let matches = records
            .iter()
            .filter(|r| {
                let keep = r.is_object();
                if !keep {
                    debug!("skipping non-object match record: {r}");
                }
                keep
            })
            .map(|r| self.normalize(r, category))
            .collect();
        Ok(matches)
    }

    /// Best-effort conversion of one record. Never fails.
    pub fn normalize(&self, raw: &Value, category: Category) -> Match {
        let empty = Map::new();
        let record = raw.as_object().unwrap_or(&empty);
        let t = &self.table;

        let team = |keys: &[&str], placeholder: &str| {
            lookup(record, keys)
                .and_then(text)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| placeholder.to_owned())
        };

        Match {
            id: lookup(record, t.id).and_then(text).unwrap_or_default(),
            date: lookup(record, t.date).and_then(Value::as_str).and_then(parse_date),
            home_team: team(t.home_team, HOME_PLACEHOLDER),
            away_team: team(t.away_team, AWAY_PLACEHOLDER),
            home_score: lookup(record, t.home_score).and_then(coerce_score),
            away_score: lookup(record, t.away_score).and_then(coerce_score),
            status: lookup(record, t.status)
                .and_then(Value::as_str)
                .map(parse_status)
                .unwrap_or_default(),
            pool: lookup(record, t.pool).and_then(text).filter(|p| !p.is_empty()),
            category: lookup(record, t.category)
                .and_then(Value::as_str)
                .and_then(Category::parse)
                .unwrap_or(category),
            phase_id: lookup(record, t.phase_id).and_then(text).filter(|p| !p.is_empty()),
        }
    }
}

/// [`Normalizer::normalize_all`] with the default synonym table.
pub fn normalize_all(payload: &Value, category: Category) -> Result<Vec<Match>, ShapeError> {
    Normalizer::default().normalize_all(payload, category)
}

/// [`Normalizer::normalize`] with the default synonym table.
pub fn normalize(raw: &Value, category: Category) -> Match {
    Normalizer::default().normalize(raw, category)
}

/// The list of records inside a payload.
///
/// `null` and objects carrying none of `keys` as an array are empty
/// collections; scalars are rejected.
pub fn unwrap_envelope<'a>(payload: &'a Value, keys: &[&str]) -> Result<&'a [Value], ShapeError> {
    const EMPTY: &[Value] = &[];
    match payload {
        Value::Array(items) => Ok(items.as_slice()),
        Value::Null => Ok(EMPTY),
        Value::Object(map) => Ok(keys
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(EMPTY)),
        Value::Bool(_) => Err(ShapeError::NotACollection { found: "a boolean" }),
        Value::Number(_) => Err(ShapeError::NotACollection { found: "a number" }),
        Value::String(_) => Err(ShapeError::NotACollection { found: "a string" }),
    }
}

/// First key present with a non-null value.
pub fn lookup<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null())
}

/// Strings as-is, numbers in their decimal form; anything else is absent.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer coercion for scores. Zero is a score; garbage is `None`.
/// Fractions are truncated the same way for numbers and numeric strings.
pub fn coerce_score(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).ok();
            }
            n.as_f64().and_then(truncate_score)
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u32>().ok().or_else(|| s.parse::<f64>().ok().and_then(truncate_score))
        }
        _ => None,
    }
}

fn truncate_score(f: f64) -> Option<u32> {
    (f.is_finite() && f >= 0.0 && f <= f64::from(u32::MAX)).then(|| f.trunc() as u32)
}

pub fn parse_status(s: &str) -> MatchStatus {
    let s = s.trim();
    if s.eq_ignore_ascii_case("FINISHED") {
        MatchStatus::Finished
    } else if s.eq_ignore_ascii_case("LIVE") {
        MatchStatus::Live
    } else {
        MatchStatus::Scheduled
    }
}

/// RFC 3339 first, then offset-less ISO forms (read as UTC), then a bare date.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
