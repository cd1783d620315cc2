use crate::normalize::{MATCH_ENVELOPE_KEYS, Normalizer, ShapeError, unwrap_envelope};
use crate::phases::{build_feed, parse_phases, parse_pools};
use crate::sheet::{html_to_text, parse_match_sheet};
use crate::standings::normalize_standings;
use crate::store::StoreError;
use crate::wire::{CardsResponse, OfficialsResponse, ScorersResponse, SheetResponse};
use crate::{Category, CategoryFeed, DateWindow, Match, MatchDetail, Phase, Pool, TeamStanding};
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "https://api-ffhockey-sur-gazon.fly.dev/api/v1";
pub const BASE_URL_ENV: &str = "INTERLIGUES_API_URL";
pub const WINDOW_ENV: &str = "INTERLIGUES_WINDOW";

const GIRLS_COMPETITION: &str = "interligues-u14-filles";
const BOYS_COMPETITION: &str = "interligues-u14-garcons";
/// The boys' group stage is published as two separate competitions.
pub const BOYS_POOLS: [(&str, &str); 2] = [
    ("interligues-u14-garcons-poule-a", "Poule A"),
    ("interligues-u14-garcons-poule-b", "Poule B"),
];

/// Competition slug holding a category's phases and classement.
pub fn competition(category: Category) -> &'static str {
    match category {
        Category::Girls => GIRLS_COMPETITION,
        Category::Boys => BOYS_COMPETITION,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub window: DateWindow,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(10),
            window: DateWindow::default(),
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `INTERLIGUES_API_URL` and `INTERLIGUES_WINDOW`.
    /// Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV)
            && !url.trim().is_empty()
        {
            config.base_url = url.trim().trim_end_matches('/').to_owned();
        }
        if let Ok(raw) = std::env::var(WINDOW_ENV)
            && !raw.trim().is_empty()
        {
            match DateWindow::parse(&raw) {
                Some(window) => config.window = window,
                None => warn!("ignoring {WINDOW_ENV}={raw}: expected <rfc3339>/<rfc3339>"),
            }
        }
        config
    }
}

/// Client for the federation's REST API.
#[derive(Debug, Clone)]
pub struct FfhApi {
    client: Client,
    config: ApiConfig,
    normalizer: Normalizer,
}

impl Default for FfhApi {
    fn default() -> Self {
        Self::with_config(ApiConfig::default())
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Shape(ShapeError, String),
    Store(StoreError),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Shape(e, url) => write!(f, "Unexpected payload for {url}: {e}"),
            ApiError::Store(e) => write!(f, "Store error: {e}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl FfhApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("interligues/0.1 (terminal results viewer)")
                .build()
                .unwrap_or_default(),
            config,
            normalizer: Normalizer::default(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn window(&self) -> &DateWindow {
        &self.config.window
    }

    /// Use a custom field table for every record this client reads.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    /// Raw match records of one competition, envelope removed.
    pub async fn fetch_match_records(&self, competition: &str) -> ApiResult<Vec<Value>> {
        let url = self.url(&format!("{competition}/matchs"));
        let payload: Value = self.get(&url).await?;
        unwrap_envelope(&payload, MATCH_ENVELOPE_KEYS)
            .map(<[Value]>::to_vec)
            .map_err(|e| ApiError::Shape(e, url))
    }

    /// Normalized matches of one competition, in payload order.
    pub async fn fetch_matches(&self, competition: &str, category: Category) -> ApiResult<Vec<Match>> {
        let url = self.url(&format!("{competition}/matchs"));
        let payload: Value = self.get(&url).await?;
        self.normalizer
            .normalize_all(&payload, category)
            .map_err(|e| ApiError::Shape(e, url))
    }

    /// Phases of a category, without their pools.
    pub async fn fetch_phases(&self, category: Category) -> ApiResult<Vec<Phase>> {
        let url = self.url(&format!("{}/phases", competition(category)));
        let payload: Value = self.get(&url).await?;
        parse_phases(&payload).map_err(|e| ApiError::Shape(e, url))
    }

    pub async fn fetch_pools(&self, category: Category, phase_id: &str) -> ApiResult<Vec<Pool>> {
        let url = self.url(&format!("{}/poules/{phase_id}", competition(category)));
        let payload: Value = self.get(&url).await?;
        parse_pools(&payload).map_err(|e| ApiError::Shape(e, url))
    }

    /// Phases with their pools filled in. A phase whose pools cannot be
    /// fetched is kept with no pools.
    pub async fn fetch_phase_tree(&self, category: Category) -> ApiResult<Vec<Phase>> {
        let mut phases = self.fetch_phases(category).await?;
        for phase in &mut phases {
            match self.fetch_pools(category, &phase.id).await {
                Ok(pools) => phase.pools = pools,
                Err(e) => warn!("pools of phase {} ({}): {e}", phase.id, category.label()),
            }
        }
        Ok(phases)
    }

    /// Everything displayed for a category: the group stage from the flat
    /// matches endpoint(s), then every extra phase. Each phase is filtered to
    /// the configured window and sorted by kickoff.
    pub async fn fetch_category(&self, category: Category) -> ApiResult<CategoryFeed> {
        let base = match category {
            Category::Girls => self.fetch_matches(GIRLS_COMPETITION, category).await?,
            Category::Boys => {
                let mut merged = Vec::new();
                for (slug, label) in BOYS_POOLS {
                    let matches = self.fetch_matches(slug, category).await?;
                    merged.extend(matches.into_iter().map(|m| Match { pool: Some(label.to_owned()), ..m }));
                }
                merged
            }
        };

        let phases = self.fetch_phase_tree(category).await.unwrap_or_else(|e| {
            warn!("phases of {}: {e}", category.label());
            Vec::new()
        });

        let feed = build_feed(&self.normalizer, category, &base, &phases, &self.config.window);
        debug!(
            "{} feed: {} phases, {} matches in window",
            category.label(),
            feed.phases.len(),
            feed.match_count()
        );
        Ok(feed)
    }

    /// The classement published by the federation, in its own order.
    pub async fn fetch_official_standings(&self, category: Category) -> ApiResult<Vec<TeamStanding>> {
        let url = self.url(&format!("{}/classement", competition(category)));
        let payload: Value = self.get(&url).await?;
        normalize_standings(&payload).map_err(|e| ApiError::Shape(e, url))
    }

    /// Officials, scorers, cards and match sheet, fetched concurrently. Each
    /// part that fails to load is left empty.
    pub async fn fetch_match_detail(&self, match_id: &str) -> MatchDetail {
        let officials_url = self.url(&format!("match/{match_id}/officiels"));
        let scorers_url = self.url(&format!("match/{match_id}/buteurs"));
        let cards_url = self.url(&format!("match/{match_id}/cartons"));
        let sheet_url = self.url(&format!("match/{match_id}/feuille-de-match"));

        let (officials, scorers, cards, sheet) = tokio::join!(
            self.get::<OfficialsResponse>(&officials_url),
            self.get::<ScorersResponse>(&scorers_url),
            self.get::<CardsResponse>(&cards_url),
            self.get::<SheetResponse>(&sheet_url),
        );

        let html = or_empty(sheet).html.unwrap_or_default();
        MatchDetail {
            match_id: match_id.to_owned(),
            officials: or_empty(officials)
                .data
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            scorers: or_empty(scorers).into_sides(),
            cards: or_empty(cards).into_sides(),
            sheet: parse_match_sheet(&html),
            sheet_text: html_to_text(&html),
        }
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

fn or_empty<T: Default>(result: ApiResult<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!("{e}");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let api = FfhApi::with_config(ApiConfig { base_url: "http://localhost:1/api/v1".into(), ..Default::default() });
        assert_eq!(api.url("/match/9/cartons"), "http://localhost:1/api/v1/match/9/cartons");
        assert_eq!(api.url("interligues-u14-filles/matchs"), "http://localhost:1/api/v1/interligues-u14-filles/matchs");
    }

    #[test]
    fn competitions_per_category() {
        assert_eq!(competition(Category::Girls), "interligues-u14-filles");
        assert_eq!(competition(Category::Boys), "interligues-u14-garcons");
        assert!(BOYS_POOLS.iter().all(|(slug, _)| slug.starts_with(competition(Category::Boys))));
    }

    #[test]
    fn default_config_targets_the_tournament_week() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.window, DateWindow::default());
    }

    #[test]
    fn errors_render_their_context() {
        let e = ApiError::Shape(ShapeError::NotACollection { found: "string" }, "http://x/matchs".into());
        assert!(e.to_string().contains("http://x/matchs"));
        assert_eq!(ApiError::Other("no store".into()).to_string(), "Error: no store");
    }
}
