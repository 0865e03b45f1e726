use std::sync::Arc;

use hpccmon_core::{
    client_identity, ConfigStore, CycleId, PatternStatusParser, StatusParser, UpdateOutcome,
};
use monitor_logging::{monitor_info, monitor_warn};
use tokio::sync::Mutex;

use crate::{CycleReport, StatusFetcher};

/// Runs update cycles: config -> fetch -> parse -> outcome.
///
/// Cycles never overlap. Concurrent callers queue on a FIFO lock, so cycles
/// complete in the order they were triggered and receive ascending ids.
pub struct UpdateOrchestrator {
    store: Arc<dyn ConfigStore>,
    fetcher: Arc<dyn StatusFetcher>,
    parser: Arc<dyn StatusParser>,
    identity: String,
    last_cycle: Mutex<CycleId>,
}

impl UpdateOrchestrator {
    pub fn new(store: Arc<dyn ConfigStore>, fetcher: Arc<dyn StatusFetcher>) -> Self {
        Self {
            store,
            fetcher,
            parser: Arc::new(PatternStatusParser),
            identity: client_identity().to_string(),
            last_cycle: Mutex::new(0),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn StatusParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub async fn run_cycle(&self) -> UpdateOutcome {
        self.run_cycle_report().await.outcome
    }

    pub async fn run_cycle_report(&self) -> CycleReport {
        let mut last_cycle = self.last_cycle.lock().await;
        *last_cycle += 1;
        let cycle = *last_cycle;
        let outcome = self.execute(cycle).await;
        CycleReport { cycle, outcome }
    }

    async fn execute(&self, cycle: CycleId) -> UpdateOutcome {
        // One read per cycle; later edits apply to the next cycle.
        let config = self.store.get();
        if !config.is_configured() {
            monitor_info!("Cycle {}: not configured, skipping update", cycle);
            return UpdateOutcome::Skipped;
        }

        let url = config.status_url();
        monitor_info!("Cycle {}: polling {}", cycle, url);
        let page = match self.fetcher.fetch(&url, &self.identity).await {
            Ok(page) => page,
            Err(err) => {
                monitor_warn!("Cycle {}: couldn't contact status page: {}", cycle, err);
                return UpdateOutcome::FetchFailed(err);
            }
        };

        match self.parser.parse(&page.text) {
            Ok(status) => {
                monitor_info!(
                    "Cycle {}: {} running, {} finished",
                    cycle,
                    status.running,
                    status.finished
                );
                UpdateOutcome::Success(status)
            }
            Err(err) => {
                monitor_warn!(
                    "Cycle {}: couldn't parse {} byte response: {}",
                    cycle,
                    page.metadata.byte_len,
                    err
                );
                UpdateOutcome::ParseFailed(err)
            }
        }
    }
}
