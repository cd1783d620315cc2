use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, StandingsSource};
use chrono::Local;
use interligues_api::{Category, CategoryFeed, Match, MatchDetail, SyncReport, TeamStanding};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Girls,
    Boys,
    Standings,
    MatchDetail,
    Help,
}

impl MenuItem {
    /// The category whose match list this tab shows.
    pub fn category(&self) -> Option<Category> {
        match self {
            MenuItem::Girls => Some(Category::Girls),
            MenuItem::Boys => Some(Category::Boys),
            _ => None,
        }
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_category_loaded(&mut self, feed: CategoryFeed) {
        self.state.last_error = None;
        let category = feed.category;
        let search = self.search_for(category).map(str::to_owned);
        let list = self.state.category_mut(category);
        list.load(feed);
        list.clamp_selection(search.as_deref());
    }

    pub fn on_official_standings_loaded(&mut self, category: Category, table: Vec<TeamStanding>) {
        self.state.last_error = None;
        self.state.standings.official.insert(category, table);
    }

    pub fn on_match_detail_loaded(&mut self, detail: MatchDetail) {
        self.state.last_error = None;
        let match_detail = &mut self.state.match_detail;
        let changed = match_detail.detail.as_ref().map(|d| d.match_id.as_str()) != Some(detail.match_id.as_str());
        if changed {
            match_detail.scroll_offset = 0;
            match_detail.show_all_officials = false;
        }
        match_detail.detail = Some(detail);
    }

    pub fn on_sync_completed(&mut self, report: SyncReport) {
        self.state.last_error = None;
        self.state.last_sync = Some((Local::now(), report));
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.search.editing = false;
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    /// Leave the detail view for the list it was opened from.
    pub fn exit_match_detail(&mut self) {
        let back = match self.state.previous_tab {
            MenuItem::MatchDetail | MenuItem::Help => MenuItem::Girls,
            tab => tab,
        };
        self.update_tab(back);
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Match lists
    // -----------------------------------------------------------------------

    /// Search term applying to `category`'s list. The search box belongs to
    /// the list tab that is showing.
    fn search_for(&self, category: Category) -> Option<&str> {
        if self.state.active_tab.category() == Some(category) {
            self.state.search.term()
        } else {
            None
        }
    }

    pub fn next_phase(&mut self, category: Category) {
        self.state.category_mut(category).next_phase();
    }

    pub fn prev_phase(&mut self, category: Category) {
        self.state.category_mut(category).prev_phase();
    }

    pub fn match_down(&mut self, category: Category) {
        let search = self.search_for(category).map(str::to_owned);
        self.state.category_mut(category).move_down(search.as_deref());
    }

    pub fn match_up(&mut self, category: Category) {
        self.state.category_mut(category).move_up();
    }

    pub fn visible_matches(&self, category: Category) -> Vec<Match> {
        self.state.category(category).visible_matches(self.search_for(category))
    }

    /// Opens the detail tab on the selected match and returns its id.
    pub fn select_match(&mut self, category: Category) -> Option<String> {
        let selected = self.state.category(category).selected(self.search_for(category))?;
        let match_id = selected.id.clone();
        if match_id.is_empty() {
            self.state.last_error = Some("this match has no identifier yet".into());
            return None;
        }
        self.state.match_detail.summary = Some(selected);
        self.update_tab(MenuItem::MatchDetail);
        Some(match_id)
    }

    pub fn start_search(&mut self) {
        self.state.search.editing = true;
    }

    pub fn search_push(&mut self, c: char) {
        self.state.search.input.push(c);
        self.reset_list_selection();
    }

    pub fn search_pop(&mut self) {
        self.state.search.input.pop();
        self.reset_list_selection();
    }

    pub fn finish_search(&mut self) {
        self.state.search.editing = false;
    }

    pub fn clear_search(&mut self) {
        self.state.search.clear();
        self.reset_list_selection();
    }

    fn reset_list_selection(&mut self) {
        if let Some(category) = self.state.active_tab.category() {
            self.state.category_mut(category).selected_match = 0;
        }
    }

    // -----------------------------------------------------------------------
    // Standings
    // -----------------------------------------------------------------------

    pub fn standings_toggle_category(&mut self) {
        let standings = &mut self.state.standings;
        standings.category = standings.category.other();
        if !standings.official_available() {
            standings.source = StandingsSource::Computed;
        }
    }

    /// Flip between computed and published standings. Returns the category
    /// whose published table still needs fetching.
    pub fn standings_toggle_source(&mut self) -> Option<Category> {
        let standings = &mut self.state.standings;
        if !standings.official_available() {
            self.state.last_error =
                Some(format!("no official standings for {}", standings.category.label()));
            return None;
        }
        standings.source = match standings.source {
            StandingsSource::Computed => StandingsSource::Official,
            StandingsSource::Official => StandingsSource::Computed,
        };
        (standings.source == StandingsSource::Official
            && !standings.official.contains_key(&standings.category))
        .then_some(standings.category)
    }

    // -----------------------------------------------------------------------
    // Match detail
    // -----------------------------------------------------------------------

    pub fn toggle_all_officials(&mut self) {
        let detail = &mut self.state.match_detail;
        detail.show_all_officials = !detail.show_all_officials;
    }

    pub fn detail_scroll_down(&mut self) {
        let detail = &mut self.state.match_detail;
        detail.scroll_offset = detail.scroll_offset.saturating_add(1);
    }

    pub fn detail_scroll_up(&mut self) {
        let detail = &mut self.state.match_detail;
        detail.scroll_offset = detail.scroll_offset.saturating_sub(1);
    }
}
