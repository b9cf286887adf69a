//! Path management for GeoFinder files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/geofinder/         # Config directory
//! └── config.toml              # Client configuration
//!
//! ~/.local/share/geofinder/    # Data directory
//! ├── store/                   # Device-local key/value entries
//! │   ├── highScore.value
//! │   ├── highScorePano.value
//! │   ├── gameSessionIds.value
//! │   └── lastUsedImages.value
//! └── logs/
//!     └── geofinder.log.YYYY-MM-DD
//! ```
//!
//! Setting `GEOFINDER_HOME` puts both directories under that one root
//! (`$GEOFINDER_HOME/config`, `$GEOFINDER_HOME/data`).

use geofinder_core::error::{GeoError, Result};
use std::path::{Path, PathBuf};

pub const ENV_HOME: &str = "GEOFINDER_HOME";

const APP_DIR: &str = "geofinder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl GeoPaths {
    /// Resolves the platform directories, honoring `GEOFINDER_HOME`.
    pub fn resolve() -> Result<Self> {
        let home = std::env::var_os(ENV_HOME).filter(|v| !v.is_empty());
        Self::resolve_with(home.map(PathBuf::from))
    }

    fn resolve_with(home: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = home {
            return Ok(Self::from_root(root));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| GeoError::config("Cannot find config directory"))?
            .join(APP_DIR);
        let data_dir = dirs::data_dir()
            .ok_or_else(|| GeoError::config("Cannot find data directory"))?
            .join(APP_DIR);
        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Lays out everything under one root directory.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Creates the config, store and log directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.config_dir.clone(), self.store_dir(), self.log_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
