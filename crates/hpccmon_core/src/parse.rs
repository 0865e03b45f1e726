use std::sync::LazyLock;

use regex::Regex;

use crate::ClusterStatus;

// `<int> Current`, at least one line break, then `<int> Finished`.
// `(?s)` lets the gaps span lines; lazy gaps keep the first occurrence.
// Counters are ASCII digits only; `\d` would also take other Unicode digits.
static STATUS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)([0-9]+) Current.+?\n.*?([0-9]+) Finished").expect("status pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("status pattern not found in page")]
    PatternNotFound,
    #[error("counter `{0}` does not fit in 64 bits")]
    CounterOutOfRange(String),
}

pub trait StatusParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<ClusterStatus, ParseError>;
}

/// Parser for the fixed `N Current ... M Finished` page layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternStatusParser;

impl StatusParser for PatternStatusParser {
    fn parse(&self, text: &str) -> Result<ClusterStatus, ParseError> {
        parse_status(text)
    }
}

/// Extract the running/finished counters from the first match in `text`.
pub fn parse_status(text: &str) -> Result<ClusterStatus, ParseError> {
    let caps = STATUS_PATTERN
        .captures(text)
        .ok_or(ParseError::PatternNotFound)?;
    let running = parse_counter(&caps[1])?;
    let finished = parse_counter(&caps[2])?;
    Ok(ClusterStatus { running, finished })
}

fn parse_counter(digits: &str) -> Result<u64, ParseError> {
    digits
        .parse()
        .map_err(|_| ParseError::CounterOutOfRange(digits.to_string()))
}
