use crate::state::app_settings::{AppSettings, DataSource};
use crate::state::messages::{NetworkRequest, NetworkResponse};
use interligues_api::{
    ApiError, ApiResult, Category, DocumentStore, FfhApi, Synchronizer, load_category_from_store,
};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: FfhApi,
    store: Option<Arc<dyn DocumentStore>>,
    source: DataSource,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        settings: &AppSettings,
        store: Option<Arc<dyn DocumentStore>>,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client: FfhApi::with_config(settings.api.clone()),
            store,
            source: settings.source,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::LoadCategory { category } => self.handle_load_category(category).await,
                NetworkRequest::LoadOfficialStandings { category } => {
                    self.handle_load_official_standings(category).await
                }
                NetworkRequest::LoadMatchDetail { match_id } => {
                    self.handle_load_match_detail(match_id).await
                }
                NetworkRequest::Sync => self.handle_sync().await,
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_category(&self, category: Category) -> ApiResult<NetworkResponse> {
        let feed = match (&self.store, self.source) {
            (Some(store), DataSource::Store) => {
                debug!("loading {} matches from store", category.label());
                load_category_from_store(store.as_ref(), self.client.normalizer(), category, self.client.window())?
            }
            _ => {
                debug!("loading {} matches from API", category.label());
                self.client.fetch_category(category).await?
            }
        };
        Ok(NetworkResponse::CategoryLoaded { feed })
    }

    async fn handle_load_official_standings(&self, category: Category) -> ApiResult<NetworkResponse> {
        debug!("loading official {} standings", category.label());
        let table = self.client.fetch_official_standings(category).await?;
        Ok(NetworkResponse::OfficialStandingsLoaded { category, table })
    }

    async fn handle_load_match_detail(&self, match_id: String) -> ApiResult<NetworkResponse> {
        debug!("loading match detail for {match_id}");
        let detail = self.client.fetch_match_detail(&match_id).await;
        Ok(NetworkResponse::MatchDetailLoaded { detail })
    }

    async fn handle_sync(&self) -> ApiResult<NetworkResponse> {
        let Some(store) = self.store.clone() else {
            return Err(ApiError::Other(
                "no store configured, set INTERLIGUES_STORE to enable sync".into(),
            ));
        };
        info!("syncing API into store");
        let report = Synchronizer::new(self.client.clone(), store).sync_all().await?;
        Ok(NetworkResponse::SyncCompleted { report })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
