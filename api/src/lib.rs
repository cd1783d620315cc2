pub mod client;
pub mod filter;
pub mod normalize;
pub mod phases;
pub mod sheet;
pub mod standings;
pub mod store;
pub mod sync;
pub mod wire;

use chrono::{DateTime, Duration, Utc};

pub use filter::{DateWindow, filter_by_team, filter_by_window, sort_by_kickoff};
pub use normalize::{Normalizer, ShapeError, SynonymTable, normalize, normalize_all};
pub use phases::{build_feed, flatten};
pub use standings::{compute_standings, normalize_standings};
pub use client::{ApiConfig, ApiError, ApiResult, FfhApi};
pub use store::{DocumentStore, JsonFileStore, MemoryStore, StoreError};
pub use sync::{SyncReport, Synchronizer, load_category_from_store};

/// Regulation length of a U14 match: two 20-minute halves and a 5-minute break.
pub const MATCH_DURATION_MINUTES: i64 = 45;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the API wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    Girls,
    Boys,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Girls, Category::Boys];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Girls => "Girls",
            Category::Boys => "Boys",
        }
    }

    /// Path segment used by the REST API and the store collections.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Girls => "filles",
            Category::Boys => "garcons",
        }
    }

    /// Accepts both the API spelling and the English one.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "filles" | "girls" | "f" => Some(Category::Girls),
            "garcons" | "garçons" | "boys" | "g" => Some(Category::Boys),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Category::Girls => Category::Boys,
            Category::Boys => Category::Girls,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Upcoming",
            MatchStatus::Live => "Live",
            MatchStatus::Finished => "Final",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub id: String,
    pub date: Option<DateTime<Utc>>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: MatchStatus,
    pub pool: Option<String>,
    pub category: Category,
    pub phase_id: Option<String>,
}

impl Match {
    /// Both scores, when the match carries a parseable result.
    pub fn score(&self) -> Option<(u32, u32)> {
        self.home_score.zip(self.away_score)
    }

    /// A match counts towards the standings only when it is flagged finished
    /// and carries both scores.
    pub fn is_played(&self) -> bool {
        self.status == MatchStatus::Finished && self.score().is_some()
    }

    /// True while `now` falls inside the regulation window after kickoff.
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        let Some(kickoff) = self.date else {
            return false;
        };
        let end = kickoff + Duration::minutes(MATCH_DURATION_MINUTES);
        now >= kickoff && now <= end
    }
}

/// A tournament stage and its pools, each pool still holding raw match records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Phase {
    pub id: String,
    pub label: String,
    pub order: i64,
    pub pools: Vec<Pool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pool {
    pub id: String,
    pub label: String,
    pub matches: Vec<serde_json::Value>,
}

/// One phase of a category, already normalized, window-filtered and sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseFeed {
    pub id: String,
    pub label: String,
    pub matches: Vec<Match>,
}

/// Everything displayed for one category, phases in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFeed {
    pub category: Category,
    pub phases: Vec<PhaseFeed>,
}

impl CategoryFeed {
    pub fn phase(&self, id: &str) -> Option<&PhaseFeed> {
        self.phases.iter().find(|p| p.id == id)
    }

    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.phases
            .iter()
            .flat_map(|p| p.matches.iter())
            .find(|m| m.id == match_id)
    }

    pub fn match_count(&self) -> usize {
        self.phases.iter().map(|p| p.matches.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamStanding {
    pub team_name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub points_for: u32,
    pub points_against: u32,
}

impl TeamStanding {
    pub fn new(team_name: impl Into<String>) -> Self {
        Self { team_name: team_name.into(), ..Default::default() }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }

    pub fn ranking_points(&self) -> u32 {
        self.won.saturating_mul(3).saturating_add(self.drawn)
    }
}

// ---------------------------------------------------------------------------
// Match detail: officials, scorers, cards and the scraped match sheet
// ---------------------------------------------------------------------------

/// Function code the federation uses for referees.
pub const REFEREE_CODE: &str = "ARB";
/// Function code the federation uses for the match delegate.
pub const DELEGATE_CODE: &str = "DLG";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchDetail {
    pub match_id: String,
    pub officials: Vec<Official>,
    pub scorers: Sides<Vec<Scorer>>,
    pub cards: Sides<Vec<Card>>,
    pub sheet: MatchSheet,
    /// Plain-text rendering of the match sheet HTML.
    pub sheet_text: String,
}

impl MatchDetail {
    /// The officials shown up front: two referees, then one delegate.
    pub fn headline_officials(&self) -> Vec<&Official> {
        let referees = self.officials.iter().filter(|o| o.code == REFEREE_CODE).take(2);
        let delegates = self.officials.iter().filter(|o| o.code == DELEGATE_CODE).take(1);
        referees.chain(delegates).collect()
    }

    pub fn has_more_officials(&self) -> bool {
        self.officials.len() > self.headline_officials().len()
    }

    pub fn has_scorers(&self) -> bool {
        !self.scorers.home.is_empty() || !self.scorers.away.is_empty()
    }

    pub fn has_cards(&self) -> bool {
        !self.cards.home.is_empty() || !self.cards.away.is_empty()
    }

    /// Sheet title in the "Home 2 - 1 Away" form.
    pub fn title(&self) -> String {
        let s = &self.sheet;
        format!(
            "{} {} - {} {}",
            s.home_team.as_deref().unwrap_or("?"),
            s.home_score.map(|v| v.to_string()).unwrap_or_default(),
            s.away_score.map(|v| v.to_string()).unwrap_or_default(),
            s.away_team.as_deref().unwrap_or("?"),
        )
    }
}

/// Per-team pair in match sheet order (home club listed first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sides<T> {
    pub home: T,
    pub away: T,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Official {
    pub name: String,
    pub role: String,
    pub code: String,
    pub licence: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scorer {
    pub shirt_number: String,
    pub goals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardColor {
    Green,
    Yellow,
    Red,
}

impl CardColor {
    /// Display order on the match sheet.
    pub const ALL: [CardColor; 3] = [CardColor::Green, CardColor::Yellow, CardColor::Red];

    pub fn label(&self) -> &'static str {
        match self {
            CardColor::Green => "Green card",
            CardColor::Yellow => "Yellow card",
            CardColor::Red => "Red card",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub color: CardColor,
    pub player: String,
}

/// Fields scraped from the federation's HTML match sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSheet {
    pub date: Option<String>,
    pub time: Option<String>,
    pub ground: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn official(code: &str, name: &str) -> Official {
        Official { name: name.into(), role: code.into(), code: code.into(), licence: None }
    }

    #[test]
    fn headline_officials_take_two_referees_then_one_delegate() {
        let detail = MatchDetail {
            officials: vec![
                official("DLG", "Delegate 1"),
                official("ARB", "Ref 1"),
                official("TAB", "Table"),
                official("ARB", "Ref 2"),
                official("ARB", "Ref 3"),
                official("DLG", "Delegate 2"),
            ],
            ..Default::default()
        };
        let names: Vec<&str> = detail.headline_officials().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Ref 1", "Ref 2", "Delegate 1"]);
        assert!(detail.has_more_officials());
    }

    #[test]
    fn ongoing_covers_regulation_time_only() {
        let kickoff = Utc.with_ymd_and_hms(2025, 10, 28, 9, 0, 0).unwrap();
        let m = Match { date: Some(kickoff), ..Default::default() };
        assert!(!m.is_ongoing(kickoff - Duration::minutes(1)));
        assert!(m.is_ongoing(kickoff));
        assert!(m.is_ongoing(kickoff + Duration::minutes(45)));
        assert!(!m.is_ongoing(kickoff + Duration::minutes(46)));
        assert!(!Match::default().is_ongoing(kickoff));
    }

    #[test]
    fn category_parses_api_and_english_names() {
        assert_eq!(Category::parse("filles"), Some(Category::Girls));
        assert_eq!(Category::parse(" Garcons "), Some(Category::Boys));
        assert_eq!(Category::parse("boys"), Some(Category::Boys));
        assert_eq!(Category::parse("mixed"), None);
    }

    #[test]
    fn played_requires_finished_status_and_both_scores() {
        let finished = Match {
            status: MatchStatus::Finished,
            home_score: Some(0),
            away_score: Some(0),
            ..Default::default()
        };
        assert!(finished.is_played());

        let missing_score = Match { away_score: None, ..finished.clone() };
        assert!(!missing_score.is_played());

        let live = Match { status: MatchStatus::Live, ..finished };
        assert!(!live.is_played());
    }
}
