use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hpccmon_core::FetchErrorDisplay;
use hpccmon_engine::{FetchSettings, DEFAULT_INSTANCE};

use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "hpccmon",
    version,
    about = "Show running and finished job counts from an HPCC status page"
)]
pub struct Cli {
    /// Settings file holding the account and status page URL.
    #[arg(long, global = true, default_value = "hpccmon.ron")]
    pub config: PathBuf,

    /// Which saved configuration to use.
    #[arg(long, global = true, default_value = DEFAULT_INSTANCE)]
    pub instance: String,

    #[arg(long, global = true, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Log debug details.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll on an interval; press Enter to refresh immediately.
    Run {
        /// Seconds between scheduled updates.
        #[arg(long, default_value_t = 900, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// Run a single update and exit.
    Once {
        #[command(flatten)]
        poll: PollArgs,
    },
    /// Save the account and status page, then update once.
    Configure {
        #[arg(long)]
        user: String,
        /// Leave empty for the default MSU HPCC status page.
        #[arg(long, default_value = "")]
        url: String,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// Print the saved configuration.
    Show,
}

#[derive(Debug, Clone, Args)]
pub struct PollArgs {
    /// Whole-request timeout in seconds.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Show "Network Error" instead of keeping the last status when a fetch fails.
    #[arg(long)]
    pub surface_fetch_errors: bool,
}

impl PollArgs {
    pub fn fetch_settings(&self) -> FetchSettings {
        let request_timeout = Duration::from_secs(self.timeout);
        FetchSettings {
            connect_timeout: FetchSettings::default().connect_timeout.min(request_timeout),
            request_timeout,
            ..FetchSettings::default()
        }
    }

    pub fn fetch_error_display(&self) -> FetchErrorDisplay {
        if self.surface_fetch_errors {
            FetchErrorDisplay::Message
        } else {
            FetchErrorDisplay::Silent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
