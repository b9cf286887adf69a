//! Typed accessors over the device-local key/value store.
//!
//! Reads never fail: unreadable or corrupt entries are logged and treated as
//! empty so the game can always start.

use geofinder_core::background::parse_recent;
use geofinder_core::error::Result;
use geofinder_core::high_score::HighScore;
use geofinder_core::round::GameMode;
use geofinder_core::store::{LocalStore, RECENT_BACKGROUNDS_KEY, SESSION_IDS_KEY};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

fn read(store: &dyn LocalStore, key: &str) -> Option<String> {
    store.get(key).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "[Store] Read failed, treating as empty");
        None
    })
}

// ============================================================================
// High score
// ============================================================================

#[derive(Clone)]
pub struct HighScoreRepository {
    store: Arc<dyn LocalStore>,
}

impl HighScoreRepository {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn load(&self, mode: GameMode) -> HighScore {
        HighScore::parse(read(self.store.as_ref(), mode.high_score_key()).as_deref())
    }

    /// Stores `value` under a high-score key unless the stored value is
    /// already at least as high. Returns whether it was written.
    ///
    /// The compare and the write happen in one locked update, so writers
    /// racing with stale values can never lower the record.
    pub fn raise(&self, key: &str, value: i64) -> Result<bool> {
        let mut raised = false;
        self.store.update(key, &mut |current| {
            if HighScore::parse(current.as_deref()).value() >= value {
                return Ok(None);
            }
            raised = true;
            Ok(Some(value.to_string()))
        })?;
        Ok(raised)
    }
}

// ============================================================================
// Session identifiers
// ============================================================================

/// Server session ids issued to this device, used to spot the player's own
/// leaderboard rows.
#[derive(Clone)]
pub struct SessionIdRepository {
    store: Arc<dyn LocalStore>,
}

impl SessionIdRepository {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> HashSet<String> {
        parse_session_ids(read(self.store.as_ref(), SESSION_IDS_KEY).as_deref())
            .into_iter()
            .collect()
    }

    /// Appends `id` unless it is blank or already recorded.
    pub fn record(&self, id: &str) -> Result<()> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(());
        }

        self.store.update(SESSION_IDS_KEY, &mut |current| {
            let mut ids = parse_session_ids(current.as_deref());
            if ids.iter().any(|existing| existing == id) {
                return Ok(None);
            }
            ids.push(id.to_string());
            Ok(Some(serde_json::to_string(&ids)?))
        })
    }
}

/// Parses the stored array, keeping order and dropping duplicates,
/// non-strings and blanks.
fn parse_session_ids(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let values = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(error = %e, "[Store] Session id list is corrupt, ignoring it");
            return Vec::new();
        }
    };

    let mut ids: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if let Value::String(id) = value {
            let id = id.trim();
            if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
    }
    ids
}

// ============================================================================
// Background rotation window
// ============================================================================

#[derive(Clone)]
pub struct BackgroundCacheRepository {
    store: Arc<dyn LocalStore>,
}

impl BackgroundCacheRepository {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn load_recent(&self) -> Vec<usize> {
        parse_recent(read(self.store.as_ref(), RECENT_BACKGROUNDS_KEY).as_deref())
    }

    pub fn save_recent(&self, recent: &[usize]) -> Result<()> {
        self.store
            .set(RECENT_BACKGROUNDS_KEY, &serde_json::to_string(recent)?)
    }
}
