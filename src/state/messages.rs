use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use interligues_api::{Category, CategoryFeed, MatchDetail, SyncReport, TeamStanding};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadCategory { category: Category },
    LoadOfficialStandings { category: Category },
    LoadMatchDetail { match_id: String },
    Sync,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    CategoryLoaded { feed: CategoryFeed },
    OfficialStandingsLoaded { category: Category, table: Vec<TeamStanding> },
    MatchDetailLoaded { detail: MatchDetail },
    SyncCompleted { report: SyncReport },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
