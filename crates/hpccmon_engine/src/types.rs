use hpccmon_core::{CycleId, UpdateOutcome};

/// Full body of a successful status request, decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub text: String,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub encoding_label: String,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: CycleId,
    pub outcome: UpdateOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CycleCompleted {
        report: CycleReport,
        /// Extra triggers folded into this cycle while it was queued.
        coalesced: usize,
    },
}
