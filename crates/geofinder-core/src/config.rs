//! Client configuration model.
//!
//! Every field has a default so an empty or partial `config.toml` is valid.

use crate::round::GameMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://geo.api.oof2510.space";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub game: GameConfig,
    pub leaderboard: LeaderboardConfig,
    pub background: BackgroundConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Static attestation token, mainly for development builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_check_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 15,
            user_agent: format!("geofinder-rs/{}", env!("CARGO_PKG_VERSION")),
            app_check_token: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub total_rounds: u32,
    pub max_attempts: u32,
    pub summary_delay_ms: u64,
    /// Points lost on a missed round once a session has been continued.
    pub photo_continued_miss_penalty: i64,
    pub panorama_continued_miss_penalty: i64,
    pub submit_to_leaderboard: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 10,
            max_attempts: 3,
            summary_delay_ms: 2800,
            photo_continued_miss_penalty: 0,
            panorama_continued_miss_penalty: 1,
            submit_to_leaderboard: true,
        }
    }
}

impl GameConfig {
    pub fn summary_delay(&self) -> Duration {
        Duration::from_millis(self.summary_delay_ms)
    }

    pub fn continued_miss_penalty(&self, mode: GameMode) -> i64 {
        match mode {
            GameMode::Photo => self.photo_continued_miss_penalty,
            GameMode::Panorama => self.panorama_continued_miss_penalty,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub limit: u32,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { limit: 50 }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackgroundConfig {
    pub image_count: usize,
    pub recent_window: usize,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            image_count: 8,
            recent_window: 4,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
