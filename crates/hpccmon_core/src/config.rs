use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Status page used when the configuration editor is saved with an empty URL.
pub const DEFAULT_SOURCE_URL: &str = "http://www.cse.msu.edu/~connel42/diststats/index.php";

/// The two user-supplied settings. Empty strings mean "unconfigured".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub source_url: String,
}

impl Configuration {
    pub fn new(account_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            source_url: source_url.into(),
        }
    }

    /// Builds the record the way the configuration editor saves it: a blank
    /// URL falls back to [`DEFAULT_SOURCE_URL`].
    pub fn from_editor(account_id: &str, source_url: &str) -> Self {
        let account_id = account_id.trim();
        let source_url = source_url.trim();
        let source_url = if source_url.is_empty() {
            DEFAULT_SOURCE_URL
        } else {
            source_url
        };
        Self::new(account_id, source_url)
    }

    pub fn is_configured(&self) -> bool {
        !self.account_id.is_empty() && !self.source_url.is_empty()
    }

    /// Request target: `<source_url>?username=<account_id>`, with the account
    /// id form-urlencoded.
    pub fn status_url(&self) -> String {
        let username: String = form_urlencoded::byte_serialize(self.account_id.as_bytes()).collect();
        format!("{}?username={}", self.source_url, username)
    }
}

/// Persisted home of the [`Configuration`] record.
///
/// Reads and writes always cover the whole record; `set` replaces, it never merges.
pub trait ConfigStore: Send + Sync {
    fn get(&self) -> Configuration;
    fn set(&self, config: Configuration);
}

#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    inner: RwLock<Configuration>,
}

impl MemoryConfigStore {
    pub fn new(config: Configuration) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self) -> Configuration {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, config: Configuration) {
        match self.inner.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }
}
