use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use hpccmon_core::{ConfigStore, Configuration};
use monitor_logging::{monitor_error, monitor_info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DEFAULT_INSTANCE: &str = "default";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("config directory missing or not writable: {0}")]
    ConfigDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to parse settings file: {0}")]
    Deserialize(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedSettings {
    #[serde(default)]
    instances: BTreeMap<String, Configuration>,
}

/// [`ConfigStore`] backed by a RON file holding one record per instance name.
///
/// The file is rewritten whole through a temp file and rename, so readers
/// never observe a half-written record.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    instance: String,
    current: RwLock<Configuration>,
}

impl FileConfigStore {
    /// Load `instance` from `path`. A missing file means "unconfigured".
    pub fn open(path: impl Into<PathBuf>, instance: impl Into<String>) -> Result<Self, PersistError> {
        let path = path.into();
        let instance = instance.into();
        let current = read_settings(&path)?
            .instances
            .remove(&instance)
            .unwrap_or_default();
        monitor_info!("Loaded settings for instance '{}' from {:?}", instance, path);
        Ok(Self {
            path,
            instance,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Persist `config` for this instance and make it current.
    pub fn try_set(&self, config: Configuration) -> Result<(), PersistError> {
        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut settings = read_settings(&self.path)?;
        settings
            .instances
            .insert(self.instance.clone(), config.clone());
        write_atomically(&self.path, &settings)?;
        *current = config;
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self) -> Configuration {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, config: Configuration) {
        if let Err(err) = self.try_set(config) {
            monitor_error!("Failed to save settings to {:?}: {}", self.path, err);
        }
    }
}

fn read_settings(path: &Path) -> Result<PersistedSettings, PersistError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(ron::from_str(&text)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PersistedSettings::default()),
        Err(err) => Err(err.into()),
    }
}

fn write_atomically(path: &Path, settings: &PersistedSettings) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_dir(&dir)?;

    let content = ron::ser::to_string_pretty(settings, ron::ser::PrettyConfig::new())?;
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::ConfigDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::ConfigDir("path is not a directory".into()));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| PersistError::ConfigDir(e.to_string()))
}
