//! Leaderboard with the player's own rows marked.

use geofinder_core::api::GameApi;
use geofinder_core::leaderboard::{LeaderboardRow, tag_own_rows};
use geofinder_infrastructure::SessionIdRepository;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct LeaderboardService {
    api: Arc<dyn GameApi>,
    session_ids: SessionIdRepository,
}

impl LeaderboardService {
    pub fn new(api: Arc<dyn GameApi>, session_ids: SessionIdRepository) -> Self {
        Self { api, session_ids }
    }

    /// Fetches the top `limit` rows. A failed fetch yields an empty board.
    pub async fn top(&self, limit: u32) -> Vec<LeaderboardRow> {
        let session_ids = self.session_ids.clone();
        let (entries, own) = tokio::join!(self.api.leaderboard(limit), async move {
            session_ids.load()
        });

        match entries {
            Ok(entries) => {
                debug!(rows = entries.len(), own = own.len(), "[Leaderboard] Loaded");
                tag_own_rows(entries, &own)
            }
            Err(err) => {
                warn!(error = %err, "[Leaderboard] Failed to load leaderboard");
                Vec::new()
            }
        }
    }
}
