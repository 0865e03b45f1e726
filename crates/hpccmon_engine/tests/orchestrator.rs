use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hpccmon_core::{
    ClusterStatus, ConfigStore, Configuration, FailureKind, FetchError, MemoryConfigStore,
    ParseError, StatusParser, UpdateOutcome,
};
use hpccmon_engine::{FetchMetadata, RawPage, StatusFetcher, UpdateOrchestrator};
use pretty_assertions::assert_eq;

fn page(text: &str) -> RawPage {
    RawPage {
        text: text.to_string(),
        metadata: FetchMetadata {
            url: String::new(),
            final_url: String::new(),
            status: 200,
            content_type: None,
            encoding_label: "UTF-8".to_string(),
            byte_len: text.len() as u64,
        },
    }
}

struct ScriptedFetcher {
    response: Result<String, FetchError>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedFetcher {
    fn new(response: Result<&str, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            response: response.map(str::to_string),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StatusFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, identity: &str) -> Result<RawPage, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), identity.to_string()));
        self.response.clone().map(|text| page(&text))
    }
}

#[derive(Default)]
struct CountingParser {
    calls: AtomicUsize,
}

impl StatusParser for CountingParser {
    fn parse(&self, text: &str) -> Result<ClusterStatus, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        hpccmon_core::parse_status(text)
    }
}

fn store(account: &str, url: &str) -> Arc<MemoryConfigStore> {
    Arc::new(MemoryConfigStore::new(Configuration::new(account, url)))
}

#[tokio::test]
async fn empty_account_skips_without_fetching() {
    let fetcher = ScriptedFetcher::new(Ok("1 Current\nx\n1 Finished"));
    let orchestrator = UpdateOrchestrator::new(store("", "http://x/y"), fetcher.clone());

    assert_eq!(orchestrator.run_cycle().await, UpdateOutcome::Skipped);
    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn success_builds_target_and_parses_counters() {
    let fetcher = ScriptedFetcher::new(Ok("42 Current\nsome text\n7 Finished"));
    let orchestrator = UpdateOrchestrator::new(store("bob", "http://x/y"), fetcher.clone())
        .with_identity("HPCCMon/test");

    let outcome = orchestrator.run_cycle().await;
    assert_eq!(
        outcome,
        UpdateOutcome::Success(ClusterStatus {
            running: 42,
            finished: 7
        })
    );
    assert_eq!(
        fetcher.requests(),
        vec![(
            "http://x/y?username=bob".to_string(),
            "HPCCMon/test".to_string()
        )]
    );
}

#[tokio::test]
async fn fetch_failures_never_reach_the_parser() {
    let failures = [
        FetchError::new(FailureKind::Timeout, "timed out"),
        FetchError::new(FailureKind::Network, "connection refused"),
        FetchError::new(FailureKind::HttpStatus(500), "500 Internal Server Error"),
    ];
    for failure in failures {
        let parser = Arc::new(CountingParser::default());
        let fetcher = ScriptedFetcher::new(Err(failure.clone()));
        let orchestrator =
            UpdateOrchestrator::new(store("bob", "http://x/y"), fetcher).with_parser(parser.clone());

        assert_eq!(
            orchestrator.run_cycle().await,
            UpdateOutcome::FetchFailed(failure)
        );
        assert_eq!(parser.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn unexpected_page_is_a_parse_failure() {
    let fetcher = ScriptedFetcher::new(Ok("no status available"));
    let orchestrator = UpdateOrchestrator::new(store("bob", "http://x/y"), fetcher);

    assert_eq!(
        orchestrator.run_cycle().await,
        UpdateOutcome::ParseFailed(ParseError::PatternNotFound)
    );
}

#[tokio::test]
async fn configuration_is_read_fresh_each_cycle() {
    let config = store("", "http://x/y");
    let fetcher = ScriptedFetcher::new(Ok("1 Current\nx\n2 Finished"));
    let orchestrator = UpdateOrchestrator::new(config.clone(), fetcher.clone());

    assert_eq!(orchestrator.run_cycle().await, UpdateOutcome::Skipped);
    config.set(Configuration::new("carol", "http://x/y"));
    assert!(orchestrator.run_cycle().await.is_success());
    assert_eq!(fetcher.requests()[0].0, "http://x/y?username=carol");
}

/// Records overlap and completion order; the first request is the slowest.
#[derive(Default)]
struct SlowFetcher {
    started: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: Mutex<Vec<usize>>,
}

#[async_trait::async_trait]
impl StatusFetcher for SlowFetcher {
    async fn fetch(&self, _url: &str, _identity: &str) -> Result<RawPage, FetchError> {
        let order = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = if order == 1 { 150 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(order);
        Ok(page(&format!("{order} Current\nx\n0 Finished")))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn overlapping_cycles_run_one_at_a_time_in_trigger_order() {
    let fetcher = Arc::new(SlowFetcher::default());
    let orchestrator = Arc::new(UpdateOrchestrator::new(
        store("bob", "http://x/y"),
        fetcher.clone(),
    ));

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.run_cycle_report().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.run_cycle_report().await })
    };

    let first = first.await.unwrap();
    let second = second.await.unwrap();

    assert_eq!(first.cycle, 1);
    assert_eq!(second.cycle, 2);
    assert_eq!(first.outcome.status().map(|s| s.running), Some(1));
    assert_eq!(second.outcome.status().map(|s| s.running), Some(2));
    assert_eq!(fetcher.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(*fetcher.completed.lock().unwrap(), vec![1, 2]);
}
