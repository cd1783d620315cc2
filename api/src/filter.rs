use crate::Match;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

/// Inclusive date window matches must fall into to be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Default for DateWindow {
    /// The Interligues U14 tournament week, 27–30 October 2025.
    fn default() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2025, 10, 27, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 10, 30, 23, 59, 59).unwrap(),
        }
    }
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parse a `start/end` pair of RFC 3339 timestamps.
    pub fn parse(s: &str) -> Option<Self> {
        let (start, end) = s.split_once('/')?;
        let start = DateTime::parse_from_rfc3339(start.trim()).ok()?.with_timezone(&Utc);
        let end = DateTime::parse_from_rfc3339(end.trim()).ok()?.with_timezone(&Utc);
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} – {}", self.start.format("%d/%m/%Y"), self.end.format("%d/%m/%Y"))
    }
}

/// Matches whose date lies inside `window`, in input order.
/// Unscheduled matches are left out.
pub fn filter_by_window(matches: &[Match], window: &DateWindow) -> Vec<Match> {
    matches
        .iter()
        .filter(|m| m.date.is_some_and(|d| window.contains(d)))
        .cloned()
        .collect()
}

/// Stable sort by kickoff, unscheduled matches last.
pub fn sort_by_kickoff(matches: &mut [Match]) {
    matches.sort_by_key(|m| (m.date.is_none(), m.date));
}

/// Case-insensitive search on either team name. A blank term keeps everything.
pub fn filter_by_team(matches: &[Match], term: &str) -> Vec<Match> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return matches.to_vec();
    }
    matches
        .iter()
        .filter(|m| {
            m.home_team.to_lowercase().contains(&needle) || m.away_team.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
