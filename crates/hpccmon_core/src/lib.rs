//! HPCC monitor core: configuration, status parsing and rendering, free of I/O.
mod config;
mod identity;
mod parse;
mod types;
mod view_model;

pub use config::{ConfigStore, Configuration, MemoryConfigStore, DEFAULT_SOURCE_URL};
pub use identity::{client_identity, CLIENT_IDENTITY};
pub use parse::{parse_status, ParseError, PatternStatusParser, StatusParser};
pub use types::{ClusterStatus, CycleId, FailureKind, FetchError, UpdateOutcome};
pub use view_model::{
    render, render_with, DisplayUpdate, FetchErrorDisplay, NETWORK_ERROR_MESSAGE,
    PARSE_ERROR_MESSAGE, STATUS_TITLE,
};
