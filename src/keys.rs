use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use interligues_api::Category;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if guard.state.search.editing {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            (KeyCode::Esc, _) => guard.clear_search(),
            (KeyCode::Enter, _) => guard.finish_search(),
            (KeyCode::Backspace, _) => guard.search_pop(),
            (Char(c), _) => guard.search_push(c),
            _ => {}
        }
        return;
    }

    let mut requests: Vec<NetworkRequest> = Vec::new();

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Girls),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Boys),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Standings),
        (_, Char('4'), _) => guard.update_tab(MenuItem::MatchDetail),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Match lists
        (tab @ (MenuItem::Girls | MenuItem::Boys), code, _) => {
            let Some(category) = tab.category() else {
                return;
            };
            match code {
                Char('l') | KeyCode::Right => guard.next_phase(category),
                Char('h') | KeyCode::Left => guard.prev_phase(category),
                Char('j') | KeyCode::Down => guard.match_down(category),
                Char('k') | KeyCode::Up => guard.match_up(category),
                Char('/') => guard.start_search(),
                KeyCode::Esc => guard.clear_search(),
                KeyCode::Enter => requests.extend(
                    guard
                        .select_match(category)
                        .map(|match_id| NetworkRequest::LoadMatchDetail { match_id }),
                ),
                _ => requests = global_key(&mut guard, code),
            }
        }

        // Standings
        (MenuItem::Standings, Char('c'), _) => guard.standings_toggle_category(),
        (MenuItem::Standings, Char('o'), _) => {
            requests.extend(
                guard
                    .standings_toggle_source()
                    .map(|category| NetworkRequest::LoadOfficialStandings { category }),
            );
        }
        (MenuItem::Standings, Char('l') | KeyCode::Right, _) => {
            let category = guard.state.standings.category;
            guard.next_phase(category);
        }
        (MenuItem::Standings, Char('h') | KeyCode::Left, _) => {
            let category = guard.state.standings.category;
            guard.prev_phase(category);
        }

        // Match detail
        (MenuItem::MatchDetail, Char('j') | KeyCode::Down, _) => guard.detail_scroll_down(),
        (MenuItem::MatchDetail, Char('k') | KeyCode::Up, _) => guard.detail_scroll_up(),
        (MenuItem::MatchDetail, Char('a'), _) => guard.toggle_all_officials(),
        (MenuItem::MatchDetail, KeyCode::Esc, _) => guard.exit_match_detail(),

        (_, code, _) => requests = global_key(&mut guard, code),
    }

    drop(guard);
    for request in requests {
        let _ = network_requests.send(request).await;
    }
}

/// Keys that work on every tab. Returns the requests to send.
fn global_key(app: &mut App, code: KeyCode) -> Vec<NetworkRequest> {
    match code {
        Char('f') => app.toggle_full_screen(),
        Char('"') => app.toggle_show_logs(),
        Char('r') => {
            return Category::ALL
                .into_iter()
                .map(|category| NetworkRequest::LoadCategory { category })
                .collect();
        }
        Char('s') => return vec![NetworkRequest::Sync],
        _ => {}
    }
    Vec::new()
}
