//! AI-duel wire/domain types.
//!
//! The duel server is authoritative; these types are what it reports and what
//! the client caches between requests.

use crate::round::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Running two-sided score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelScores {
    #[serde(default)]
    pub player: i64,
    #[serde(default)]
    pub ai: i64,
}

/// Match status. Unknown strings from the server are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DuelStatus {
    #[default]
    InProgress,
    Completed,
    Other(String),
}

impl From<String> for DuelStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "in-progress" => DuelStatus::InProgress,
            "completed" => DuelStatus::Completed,
            _ => DuelStatus::Other(value),
        }
    }
}

impl From<DuelStatus> for String {
    fn from(value: DuelStatus) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DuelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuelStatus::InProgress => f.write_str("in-progress"),
            DuelStatus::Completed => f.write_str("completed"),
            DuelStatus::Other(other) => f.write_str(other),
        }
    }
}

/// One duel round as served to the player (no answer attached).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelRound {
    /// Zero-based.
    pub round_index: u32,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelCountry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Optional-field coordinates as the duel endpoint sends them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DuelCoordinates {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl DuelCoordinates {
    pub fn resolve(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGuessResult {
    #[serde(default)]
    pub guess: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiGuessResult {
    #[serde(default)]
    pub country_name: Option<String>,
    /// 0.0 – 1.0
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub fallback_reason: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelHistoryEntry {
    pub round_index: u32,
    #[serde(default)]
    pub correct_country: Option<DuelCountry>,
    #[serde(default)]
    pub player: Option<PlayerGuessResult>,
    #[serde(default)]
    pub ai: Option<AiGuessResult>,
}

/// Response of `POST ai-duel/start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStart {
    pub match_id: String,
    pub round: DuelRound,
    #[serde(default)]
    pub total_rounds: Option<u32>,
    #[serde(default)]
    pub scores: Option<DuelScores>,
    #[serde(default)]
    pub status: Option<DuelStatus>,
}

/// Response of `POST ai-duel/guess`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResult {
    #[serde(default)]
    pub correct_country: Option<DuelCountry>,
    #[serde(default)]
    pub coordinates: Option<DuelCoordinates>,
    #[serde(default)]
    pub contributor: Option<String>,
    #[serde(default)]
    pub player_result: Option<PlayerGuessResult>,
    #[serde(default)]
    pub ai_result: Option<AiGuessResult>,
    #[serde(default)]
    pub scores: Option<DuelScores>,
    #[serde(default)]
    pub status: Option<DuelStatus>,
    #[serde(default)]
    pub history: Option<Vec<DuelHistoryEntry>>,
    #[serde(default)]
    pub next_round: Option<DuelRound>,
}

/// Server-asserted match state attached to reconciliation errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelSnapshot {
    #[serde(default)]
    pub expected_round: Option<DuelRound>,
    #[serde(default)]
    pub history: Option<Vec<DuelHistoryEntry>>,
    #[serde(default)]
    pub scores: Option<DuelScores>,
    #[serde(default)]
    pub status: Option<DuelStatus>,
}
