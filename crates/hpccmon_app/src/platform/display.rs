use chrono::{DateTime, Local};
use hpccmon_core::{render_with, DisplayUpdate, FetchErrorDisplay, UpdateOutcome};

/// Terminal stand-in for the status widget: keeps the last thing shown and
/// only produces output when a cycle changes it.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    fetch_errors: FetchErrorDisplay,
    shown: Option<DisplayUpdate>,
}

impl TerminalDisplay {
    pub fn new(fetch_errors: FetchErrorDisplay) -> Self {
        Self {
            fetch_errors,
            shown: None,
        }
    }

    pub fn apply(&mut self, outcome: &UpdateOutcome, now: DateTime<Local>) -> Option<String> {
        let update = render_with(outcome, self.fetch_errors);
        if update == DisplayUpdate::Unchanged {
            return None;
        }
        let text = format_update(&update, now);
        self.shown = Some(update);
        text
    }

    pub fn shown(&self) -> Option<&DisplayUpdate> {
        self.shown.as_ref()
    }
}

fn format_update(update: &DisplayUpdate, now: DateTime<Local>) -> Option<String> {
    let stamp = now.format("%Y-%m-%d %H:%M:%S");
    match update {
        DisplayUpdate::Unchanged => None,
        DisplayUpdate::Status { title, body } => Some(format!("[{stamp}] {title}\n{body}")),
        DisplayUpdate::Message(message) => Some(format!("[{stamp}] {message}")),
    }
}
