//! Layered service configuration
//!
//! Sources, highest priority first:
//! 1. Environment variables with the `SUBMISSION_` prefix (`SUBMISSION_STORAGE_ROOT`, ...)
//! 2. `submission.toml` in the working directory, if present
//! 3. Built-in defaults
use super::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "submission.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Base directory of the versioned store.
    pub storage_root: PathBuf,
    /// Default tracing filter, overridden by `SUBMISSION_LOG`.
    pub log_level: String,
    /// Location of the sled course cache; `None` starts with an empty in-memory directory.
    #[serde(default)]
    pub directory_cache: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./submissions"),
            log_level: "info".into(),
            directory_cache: None,
        }
    }
}

impl ServiceConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    /// Like [`ServiceConfig::load`], reading a `.env` file into the environment first.
    ///
    /// A missing `.env` is fine; an unreadable or malformed one is an error.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(error) if error.not_found() => {}
            Err(error) => return Err(ConfigError::Dotenv(error)),
        }
        Self::load()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("SUBMISSION_"))
    }

    /// Creates the storage root if it does not exist yet and returns it.
    pub fn ensure_storage_root(&self) -> Result<PathBuf, ConfigError> {
        fs::create_dir_all(&self.storage_root)
            .map_err(|e| ConfigError::StorageRoot(self.storage_root.clone(), e))?;
        Ok(self.storage_root.clone())
    }
}
