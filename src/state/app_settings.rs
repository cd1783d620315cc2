use interligues_api::ApiConfig;
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

pub const STORE_ENV: &str = "INTERLIGUES_STORE";
pub const SOURCE_ENV: &str = "INTERLIGUES_SOURCE";
pub const LOG_ENV: &str = "INTERLIGUES_LOG";

/// Where match lists are read from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    #[default]
    Api,
    Store,
}

impl DataSource {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "api" => Some(DataSource::Api),
            "store" => Some(DataSource::Store),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api: ApiConfig,
    /// JSON store mirror. Enables `s` and the hourly sync.
    pub store_path: Option<PathBuf>,
    pub source: DataSource,
}

impl AppSettings {
    pub fn load() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let log_level = var(LOG_ENV).and_then(|raw| match LevelFilter::from_str(raw.trim()) {
            Ok(level) => Some(level),
            Err(_) => {
                eprintln!("ignoring {LOG_ENV}={raw}: expected off, error, warn, info, debug or trace");
                None
            }
        });

        let store_path = var(STORE_ENV).map(PathBuf::from);
        let mut source = var(SOURCE_ENV).and_then(|s| DataSource::parse(&s)).unwrap_or_default();
        if source == DataSource::Store && store_path.is_none() {
            log::warn!("{SOURCE_ENV}=store without {STORE_ENV}, reading from the API");
            source = DataSource::Api;
        }

        Self {
            full_screen: false,
            log_level,
            api: ApiConfig::from_env(),
            store_path,
            source,
        }
    }

    pub fn sync_enabled(&self) -> bool {
        self.store_path.is_some()
    }
}
