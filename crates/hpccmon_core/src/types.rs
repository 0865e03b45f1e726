use std::fmt;

use crate::ParseError;

/// Monotonic number of an update cycle, starting at 1.
pub type CycleId = u64;

/// Counters extracted from the cluster status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterStatus {
    pub running: u64,
    pub finished: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind.is_network()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl FailureKind {
    /// Everything except a server-reported status is a transport failure.
    pub fn is_network(&self) -> bool {
        !matches!(self, FailureKind::HttpStatus(_))
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Result of one update cycle. Exactly one variant per cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No account configured; nothing was fetched.
    Skipped,
    FetchFailed(FetchError),
    ParseFailed(ParseError),
    Success(ClusterStatus),
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UpdateOutcome::Success(_))
    }

    pub fn status(&self) -> Option<ClusterStatus> {
        match self {
            UpdateOutcome::Success(status) => Some(*status),
            _ => None,
        }
    }
}
