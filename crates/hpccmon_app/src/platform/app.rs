use std::io::BufRead;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use hpccmon_core::{ConfigStore, Configuration};
use hpccmon_engine::{EngineEvent, EngineHandle, FileConfigStore, ReqwestFetcher, UpdateOrchestrator};
use log::LevelFilter;
use monitor_logging::{monitor_info, monitor_warn};

use super::cli::{Cli, Command, PollArgs};
use super::display::TerminalDisplay;
use super::logging;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What wakes the scheduler loop.
enum Trigger {
    Tick,
    Refresh,
}

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log.into(), level);

    let store = Arc::new(
        FileConfigStore::open(&cli.config, cli.instance.as_str())
            .with_context(|| format!("loading settings from {}", cli.config.display()))?,
    );

    match cli.command {
        Command::Show => {
            print_config(&store.get());
            Ok(())
        }
        Command::Configure { user, url, poll } => {
            let config = Configuration::from_editor(&user, &url);
            store
                .try_set(config.clone())
                .with_context(|| format!("saving settings to {}", store.path().display()))?;
            monitor_info!("Saved settings for instance '{}'", store.instance());
            print_config(&config);
            run_once(store, &poll)
        }
        Command::Once { poll } => run_once(store, &poll),
        Command::Run { interval, poll } => run_scheduled(store, &poll, Duration::from_secs(interval)),
    }
}

fn start_engine(store: Arc<FileConfigStore>, poll: &PollArgs) -> anyhow::Result<EngineHandle> {
    let fetcher = ReqwestFetcher::new(poll.fetch_settings()).context("creating http client")?;
    let orchestrator = UpdateOrchestrator::new(store, Arc::new(fetcher));
    Ok(EngineHandle::new(Arc::new(orchestrator)))
}

fn run_once(store: Arc<FileConfigStore>, poll: &PollArgs) -> anyhow::Result<()> {
    let engine = start_engine(store, poll)?;
    let mut display = TerminalDisplay::new(poll.fetch_error_display());

    engine.trigger();
    let deadline = Duration::from_secs(poll.timeout) + Duration::from_secs(5);
    match engine.recv_timeout(deadline) {
        Some(event) => show_event(&mut display, event),
        None => monitor_warn!("No update finished within {:?}", deadline),
    }
    engine.shutdown();
    Ok(())
}

fn run_scheduled(
    store: Arc<FileConfigStore>,
    poll: &PollArgs,
    interval: Duration,
) -> anyhow::Result<()> {
    let engine = start_engine(store, poll)?;
    let mut display = TerminalDisplay::new(poll.fetch_error_display());
    let (trigger_tx, trigger_rx) = mpsc::channel::<Trigger>();

    let tick_tx = trigger_tx.clone();
    thread::spawn(move || {
        while tick_tx.send(Trigger::Tick).is_ok() {
            thread::sleep(interval);
        }
    });

    thread::spawn(move || {
        let stdin = std::io::stdin();
        for _ in stdin.lock().lines().map_while(Result::ok) {
            if trigger_tx.send(Trigger::Refresh).is_err() {
                break;
            }
        }
    });

    monitor_info!("Polling every {:?}; press Enter to refresh", interval);
    loop {
        while let Ok(trigger) = trigger_rx.try_recv() {
            if let Trigger::Refresh = trigger {
                monitor_info!("Manual refresh requested");
            }
            engine.trigger();
        }
        if let Some(event) = engine.recv_timeout(POLL_INTERVAL) {
            show_event(&mut display, event);
        }
    }
}

fn show_event(display: &mut TerminalDisplay, event: EngineEvent) {
    match event {
        EngineEvent::CycleCompleted { report, .. } => {
            if let Some(text) = display.apply(&report.outcome, Local::now()) {
                println!("{text}");
            }
        }
    }
}

fn print_config(config: &Configuration) {
    let or_unset = |value: &str| {
        if value.is_empty() {
            "<unset>".to_string()
        } else {
            value.to_string()
        }
    };
    println!("account: {}", or_unset(&config.account_id));
    println!("url:     {}", or_unset(&config.source_url));
}
