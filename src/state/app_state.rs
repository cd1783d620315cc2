use crate::app::MenuItem;
use chrono::{DateTime, Local};
use interligues_api::{
    Category, CategoryFeed, Match, MatchDetail, PhaseFeed, SyncReport, TeamStanding, compute_standings,
    filter_by_team,
};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Per-category match lists
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CategoryState {
    pub feed: Option<CategoryFeed>,
    pub selected_phase: usize,
    pub selected_match: usize,
    pub last_loaded: Option<DateTime<Local>>,
}

impl CategoryState {
    /// Swap in a fresh feed, keeping the selected phase (by id) and match
    /// position when they still exist.
    pub fn load(&mut self, feed: CategoryFeed) {
        let previous_phase = self.phase().map(|p| p.id.clone());
        self.selected_phase = previous_phase
            .and_then(|id| feed.phases.iter().position(|p| p.id == id))
            .unwrap_or(0);
        self.feed = Some(feed);
        self.last_loaded = Some(Local::now());
        self.clamp_selection(None);
    }

    pub fn phase(&self) -> Option<&PhaseFeed> {
        self.feed.as_ref()?.phases.get(self.selected_phase)
    }

    pub fn phase_count(&self) -> usize {
        self.feed.as_ref().map(|f| f.phases.len()).unwrap_or(0)
    }

    /// Matches of the selected phase narrowed by the team search.
    pub fn visible_matches(&self, search: Option<&str>) -> Vec<Match> {
        let Some(phase) = self.phase() else {
            return Vec::new();
        };
        match search {
            Some(term) => filter_by_team(&phase.matches, term),
            None => phase.matches.clone(),
        }
    }

    pub fn selected(&self, search: Option<&str>) -> Option<Match> {
        self.visible_matches(search).into_iter().nth(self.selected_match)
    }

    pub fn next_phase(&mut self) {
        if self.selected_phase + 1 < self.phase_count() {
            self.selected_phase += 1;
            self.selected_match = 0;
        }
    }

    pub fn prev_phase(&mut self) {
        if self.selected_phase > 0 {
            self.selected_phase -= 1;
            self.selected_match = 0;
        }
    }

    pub fn move_down(&mut self, search: Option<&str>) {
        let max = self.visible_matches(search).len().saturating_sub(1);
        if self.selected_match < max {
            self.selected_match += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected_match = self.selected_match.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self, search: Option<&str>) {
        let max = self.visible_matches(search).len().saturating_sub(1);
        self.selected_match = self.selected_match.min(max);
    }
}

// ---------------------------------------------------------------------------
// Team search
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SearchState {
    pub input: String,
    pub editing: bool,
}

impl SearchState {
    /// The active search term, if any.
    pub fn term(&self) -> Option<&str> {
        let term = self.input.trim();
        (!term.is_empty()).then_some(term)
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.editing = false;
    }
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StandingsSource {
    #[default]
    Computed,
    Official,
}

#[derive(Debug, Default)]
pub struct StandingsState {
    pub category: Category,
    pub source: StandingsSource,
    pub official: HashMap<Category, Vec<TeamStanding>>,
}

impl StandingsState {
    /// Only the girls' competition publishes a classement.
    pub fn official_available(&self) -> bool {
        self.category == Category::Girls
    }
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MatchDetailState {
    /// The list entry the detail was opened from.
    pub summary: Option<Match>,
    pub detail: Option<MatchDetail>,
    pub show_all_officials: bool,
    pub scroll_offset: u16,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub girls: CategoryState,
    pub boys: CategoryState,
    pub search: SearchState,
    pub standings: StandingsState,
    pub match_detail: MatchDetailState,
    pub last_sync: Option<(DateTime<Local>, SyncReport)>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, category: Category) -> &CategoryState {
        match category {
            Category::Girls => &self.girls,
            Category::Boys => &self.boys,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut CategoryState {
        match category {
            Category::Girls => &mut self.girls,
            Category::Boys => &mut self.boys,
        }
    }

    /// Standings of the selected standings category: derived from the phase
    /// currently shown for it, or the published table.
    pub fn standings_rows(&self) -> Vec<TeamStanding> {
        match self.standings.source {
            StandingsSource::Official => self
                .standings
                .official
                .get(&self.standings.category)
                .cloned()
                .unwrap_or_default(),
            StandingsSource::Computed => self
                .category(self.standings.category)
                .phase()
                .map(|p| compute_standings(&p.matches))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interligues_api::MatchStatus;

    fn played(id: &str, home: &str, away: &str, hs: u32, aw: u32) -> Match {
        Match {
            id: id.into(),
            home_team: home.into(),
            away_team: away.into(),
            home_score: Some(hs),
            away_score: Some(aw),
            status: MatchStatus::Finished,
            ..Default::default()
        }
    }

    fn feed(phases: Vec<(&str, Vec<Match>)>) -> CategoryFeed {
        CategoryFeed {
            category: Category::Girls,
            phases: phases
                .into_iter()
                .map(|(id, matches)| PhaseFeed { id: id.into(), label: id.into(), matches })
                .collect(),
        }
    }

    #[test]
    fn reload_keeps_selected_phase_by_id() {
        let mut state = CategoryState::default();
        state.load(feed(vec![("a", vec![]), ("b", vec![played("1", "X", "Y", 1, 0)])]));
        state.next_phase();
        assert_eq!(state.phase().map(|p| p.id.as_str()), Some("b"));

        state.load(feed(vec![("new", vec![]), ("a", vec![]), ("b", vec![])]));
        assert_eq!(state.phase().map(|p| p.id.as_str()), Some("b"));
        assert_eq!(state.selected_match, 0);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut state = CategoryState::default();
        state.load(feed(vec![(
            "a",
            vec![played("1", "A", "B", 1, 0), played("2", "C", "D", 0, 0)],
        )]));
        state.prev_phase();
        state.next_phase();
        assert_eq!(state.selected_phase, 0);
        state.move_down(None);
        state.move_down(None);
        assert_eq!(state.selected(None).map(|m| m.id), Some("2".to_string()));
        state.move_up();
        state.move_up();
        assert_eq!(state.selected_match, 0);
    }

    #[test]
    fn search_narrows_the_selection() {
        let mut state = CategoryState::default();
        state.load(feed(vec![(
            "a",
            vec![played("1", "Bretagne", "B", 1, 0), played("2", "C", "Normandie", 0, 0)],
        )]));
        assert_eq!(state.selected(Some("norm")).map(|m| m.id), Some("2".to_string()));
        let search = SearchState { input: "   ".into(), editing: false };
        assert_eq!(search.term(), None);
    }

    #[test]
    fn computed_standings_follow_the_shown_phase() {
        let mut app = AppState::new();
        app.girls.load(feed(vec![
            ("group", vec![played("1", "A", "B", 2, 1)]),
            ("final", vec![played("2", "C", "D", 0, 3)]),
        ]));
        assert_eq!(app.standings_rows()[0].team_name, "A");
        app.girls.next_phase();
        assert_eq!(app.standings_rows()[0].team_name, "D");

        app.standings.source = StandingsSource::Official;
        assert!(app.standings_rows().is_empty());
    }
}
