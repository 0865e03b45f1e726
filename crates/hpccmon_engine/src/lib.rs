//! HPCC monitor engine: status fetching, update cycles and persisted settings.
mod decode;
mod engine;
mod fetch;
mod orchestrator;
mod persist;
mod types;

pub use decode::{decode_body, DecodedText};
pub use engine::EngineHandle;
pub use fetch::{FetchSettings, ReqwestFetcher, StatusFetcher};
pub use orchestrator::UpdateOrchestrator;
pub use persist::{FileConfigStore, PersistError, DEFAULT_INSTANCE};
pub use types::{CycleReport, EngineEvent, FetchMetadata, RawPage};
