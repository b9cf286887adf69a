//! Device-local key/value persistence port.
//!
//! Values are stored as strings in the same shapes the mobile app used: the
//! high score as a plain integer string and lists as JSON arrays.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// Key holding the JSON array of server session ids issued to this device.
pub const SESSION_IDS_KEY: &str = "gameSessionIds";
/// Key holding the JSON array of recently shown menu background indices.
pub const RECENT_BACKGROUNDS_KEY: &str = "lastUsedImages";

pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Read-modify-write of one key, exclusive against every other `update`
    /// and `set` on the same key.
    ///
    /// `f` receives the current value and returns the new one, or `None` to
    /// leave the key untouched.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<Option<String>>,
    ) -> Result<()>;
}

/// Volatile store used by tests and by front ends without a writable disk.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| crate::error::GeoError::storage(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| crate::error::GeoError::storage(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| crate::error::GeoError::storage(e.to_string()))?;
        values.remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<Option<String>>,
    ) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| crate::error::GeoError::storage(e.to_string()))?;
        if let Some(next) = f(values.get(key).cloned())? {
            values.insert(key.to_string(), next);
        }
        Ok(())
    }
}
