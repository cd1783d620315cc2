mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{AppSettings, DataSource};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use interligues_api::{Category, DocumentStore, FfhApi, JsonFileStore, Synchronizer};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

enum CliAction {
    Run,
    Exit,
    Sync,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match handle_cli_args() {
        CliAction::Exit => return Ok(()),
        CliAction::Sync => return run_headless_sync().await,
        CliAction::Run => {}
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let settings = AppSettings::load();
    let store = open_store(&settings);
    let sync_enabled = settings.sync_enabled() && store.is_some();
    let worker_settings = settings.clone();
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(&worker_settings, store, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic reload, plus the hourly sync when a store is configured
    let periodic_updater = PeriodicRefresher::new(network_req_tx.clone(), sync_enabled);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Trigger both match lists on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

fn handle_cli_args() -> CliAction {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return CliAction::Run;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            CliAction::Exit
        }
        "-V" | "--version" => {
            println!("interligues {}", env!("CARGO_PKG_VERSION"));
            CliAction::Exit
        }
        "--sync" => CliAction::Sync,
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "interligues - Interligues U14 field hockey results in the terminal

Usage:
  interligues
  interligues --sync
  interligues --help
  interligues --version

Options:
  --sync    Mirror phases, pools and matches into the store once and exit

Environment:
  INTERLIGUES_API_URL   REST API base URL
  INTERLIGUES_WINDOW    Tournament window as start/end RFC 3339 timestamps
  INTERLIGUES_STORE     JSON store file; enables sync (s key, hourly, --sync)
  INTERLIGUES_SOURCE    Where match lists come from: api (default) or store
  INTERLIGUES_LOG       Log level: off, error, warn, info, debug or trace"
}

/// `--sync`: one mirror pass without the terminal UI.
async fn run_headless_sync() -> anyhow::Result<()> {
    let settings = AppSettings::load();
    let Some(path) = settings.store_path.as_ref() else {
        anyhow::bail!("--sync needs INTERLIGUES_STORE to point at the store file");
    };

    let store = JsonFileStore::open(path)?;
    let synchronizer = Synchronizer::new(FfhApi::with_config(settings.api.clone()), Arc::new(store));
    let report = synchronizer.sync_all().await?;
    println!("synced into {}: {report}", path.display());
    Ok(())
}

fn open_store(settings: &AppSettings) -> Option<Arc<dyn DocumentStore>> {
    let path = settings.store_path.as_ref()?;
    match JsonFileStore::open(path) {
        Ok(store) => {
            info!("using store at {}", path.display());
            let store: Arc<dyn DocumentStore> = Arc::new(store);
            Some(store)
        }
        Err(e) => {
            error!("store unavailable, sync disabled: {e}");
            None
        }
    }
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            for category in Category::ALL {
                let _ = network_requests.send(NetworkRequest::LoadCategory { category }).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::CategoryLoaded { feed } => {
            let mut guard = app.lock().await;
            guard.on_category_loaded(feed);
        }
        NetworkResponse::OfficialStandingsLoaded { category, table } => {
            let mut guard = app.lock().await;
            guard.on_official_standings_loaded(category, table);
        }
        NetworkResponse::MatchDetailLoaded { detail } => {
            let mut guard = app.lock().await;
            guard.on_match_detail_loaded(detail);
        }
        NetworkResponse::SyncCompleted { report } => {
            let mut guard = app.lock().await;
            guard.on_sync_completed(report);
            let reads_store = guard.settings.source == DataSource::Store;
            drop(guard);
            // Lists read from the store only change after a sync.
            if reads_store {
                for category in Category::ALL {
                    let _ = network_requests.send(NetworkRequest::LoadCategory { category }).await;
                }
            }
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: runs on quit and from the panic hook.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
