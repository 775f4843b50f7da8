//! Periodic IMDB liveness probe.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::StatusMonitorConfig;
use crate::health::status::ImdbStatus;
use crate::imdb::MetadataProvider;
use crate::observability::metrics;

pub struct ImdbStatusMonitor {
    provider: Arc<dyn MetadataProvider>,
    status: ImdbStatus,
    interval: Duration,
}

impl ImdbStatusMonitor {
    pub fn new(provider: Arc<dyn MetadataProvider>, status: ImdbStatus, config: &StatusMonitorConfig) -> Self {
        Self {
            provider,
            status,
            interval: Duration::from_secs(config.interval_secs),
        }
    }

    /// Probe immediately, then once per interval until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(interval = ?self.interval, "IMDB status monitor starting");

        loop {
            let up = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                up = self.provider.ping() => up,
            };
            self.status.record(up, Utc::now());
            metrics::record_imdb_status(up);
            tracing::debug!(up, "IMDB status recorded");

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("IMDB status monitor stopped");
    }
}
