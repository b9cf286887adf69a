//! Leaderboard rows and "that's you" tagging.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub score: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub game_session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub entry: LeaderboardEntry,
    /// The row's session was issued to this device.
    pub is_mine: bool,
}

/// Tags rows whose session id is one of `own_session_ids`, keeping order.
pub fn tag_own_rows(
    entries: Vec<LeaderboardEntry>,
    own_session_ids: &HashSet<String>,
) -> Vec<LeaderboardRow> {
    entries
        .into_iter()
        .map(|entry| {
            let is_mine = entry
                .game_session_id
                .as_ref()
                .is_some_and(|id| own_session_ids.contains(id));
            LeaderboardRow { entry, is_mine }
        })
        .collect()
}
