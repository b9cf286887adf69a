//! `config.toml` storage.
//!
//! Responsibilities:
//! - **Load** the client configuration, falling back to defaults when the file
//!   is missing or empty
//! - **Save** it atomically (see [`AtomicTextFile`])
//! - **Environment overrides** for the API endpoint and the attestation token

use super::AtomicTextFile;
use geofinder_core::config::ClientConfig;
use geofinder_core::error::Result;
use std::path::{Path, PathBuf};

/// Overrides `api.base_url`.
pub const ENV_API_BASE_URL: &str = "GEOFINDER_API_BASE_URL";
/// Overrides `api.app_check_token`.
pub const ENV_APP_CHECK_TOKEN: &str = "GEOFINDER_APP_CHECK_TOKEN";

pub struct ConfigStorage {
    file: AtomicTextFile,
}

impl ConfigStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTextFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the file as-is. A malformed file is a serialization error.
    pub fn load(&self) -> Result<ClientConfig> {
        match self.file.load()? {
            Some(content) => Ok(toml::from_str(&content)?),
            None => {
                tracing::debug!(path = %self.path().display(), "[Config] No config file, using defaults");
                Ok(ClientConfig::default())
            }
        }
    }

    /// Loads the file and applies the process environment on top.
    pub fn load_with_env(&self) -> Result<ClientConfig> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        let content = toml::to_string_pretty(config)?;
        self.file.save(&content)
    }

    /// Writes the default configuration if no file exists yet.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path().exists() {
            return Ok(());
        }
        tracing::info!(path = %self.path().display(), "[Config] Writing default config");
        self.save(&ClientConfig::default())
    }
}

/// Applies environment overrides read through `lookup`. Blank values are
/// ignored.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(base_url) = read(ENV_API_BASE_URL) {
        tracing::info!(base_url = %base_url, "[Config] API base URL overridden from environment");
        config.api.base_url = base_url;
    }
    if let Some(token) = read(ENV_APP_CHECK_TOKEN) {
        config.api.app_check_token = Some(token);
    }
}
