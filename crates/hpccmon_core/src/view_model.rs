use crate::{ClusterStatus, UpdateOutcome};

pub const STATUS_TITLE: &str = "HPCC Status";
pub const PARSE_ERROR_MESSAGE: &str = "Parse Error";
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error";

/// What the display collaborator should do after a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUpdate {
    /// Keep whatever is currently shown.
    Unchanged,
    Status { title: String, body: String },
    Message(String),
}

/// How a failed fetch shows up on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchErrorDisplay {
    /// Log only; the display keeps its previous content.
    #[default]
    Silent,
    /// Replace the display with [`NETWORK_ERROR_MESSAGE`].
    Message,
}

pub fn render(outcome: &UpdateOutcome) -> DisplayUpdate {
    render_with(outcome, FetchErrorDisplay::default())
}

pub fn render_with(outcome: &UpdateOutcome, fetch_errors: FetchErrorDisplay) -> DisplayUpdate {
    match outcome {
        UpdateOutcome::Skipped => DisplayUpdate::Unchanged,
        UpdateOutcome::FetchFailed(_) => match fetch_errors {
            FetchErrorDisplay::Silent => DisplayUpdate::Unchanged,
            FetchErrorDisplay::Message => DisplayUpdate::Message(NETWORK_ERROR_MESSAGE.into()),
        },
        UpdateOutcome::ParseFailed(_) => DisplayUpdate::Message(PARSE_ERROR_MESSAGE.into()),
        UpdateOutcome::Success(status) => DisplayUpdate::Status {
            title: STATUS_TITLE.into(),
            body: status_body(status),
        },
    }
}

fn status_body(status: &ClusterStatus) -> String {
    format!("{} Running\n{} Finished", status.running, status.finished)
}
