use crate::state::messages::NetworkRequest;
use interligues_api::Category;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const RELOAD_EVERY: Duration = Duration::from_secs(60);
pub const SYNC_EVERY: Duration = Duration::from_secs(60 * 60);

/// Reloads both categories every minute. With a store configured it also
/// mirrors the API into it every hour.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
    sync_enabled: bool,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>, sync_enabled: bool) -> Self {
        Self { network_requests, sync_enabled }
    }

    pub async fn run(self) {
        let mut reload_interval = interval(RELOAD_EVERY);
        let mut sync_interval = interval(SYNC_EVERY);
        // Skip the immediate first ticks so startup loading isn't double-triggered.
        reload_interval.tick().await;
        sync_interval.tick().await;

        loop {
            let requests: Vec<NetworkRequest> = tokio::select! {
                _ = reload_interval.tick() => Category::ALL
                    .into_iter()
                    .map(|category| NetworkRequest::LoadCategory { category })
                    .collect(),
                _ = sync_interval.tick(), if self.sync_enabled => vec![NetworkRequest::Sync],
            };
            for request in requests {
                if self.network_requests.send(request).await.is_err() {
                    return;
                }
            }
        }
    }
}
