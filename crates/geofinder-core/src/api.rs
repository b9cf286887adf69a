//! Ports onto the Remote Game API.
//!
//! The HTTP implementation lives in `geofinder-interaction`; everything in
//! the core and application layers depends only on these traits and on the
//! closed [`ApiError`] set.

use crate::duel::{DuelSnapshot, GuessResult, MatchStart};
use crate::leaderboard::LeaderboardEntry;
use crate::round::{GameMode, Round};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every way a Remote Game API call can fail.
///
/// Classification happens once, at the HTTP boundary, so reconciliation logic
/// can match exhaustively instead of inspecting string codes.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ApiError {
    /// Transport failure: unreachable host, timeout, 5xx.
    #[error("Network error: {message}")]
    Network { message: String, retryable: bool },

    /// App-attestation token missing, expired or rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The duel server is on a different round than the one we guessed for.
    #[error("Round out of sync with the server")]
    ProtocolDesync(DuelSnapshot),

    /// The duel server already finished this match.
    #[error("Match already completed")]
    MatchCompleted(DuelSnapshot),

    /// The server answered but the body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Any other failure reported by the server.
    #[error("{message}")]
    Unknown { status: Option<u16>, message: String },
}

impl ApiError {
    pub fn network(message: impl Into<String>, retryable: bool) -> Self {
        Self::Network {
            message: message.into(),
            retryable,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Whether a manual retry by the user has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { retryable, .. } => *retryable,
            Self::ProtocolDesync(_) => true,
            _ => false,
        }
    }
}

/// Server-issued scored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSessionTicket {
    pub game_session_id: String,
    #[serde(default)]
    pub seed: String,
    #[serde(default)]
    pub expires_at: String,
}

/// Extra context sent along with a submitted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreMetadata {
    pub correct_answers: u32,
    pub total_rounds: u32,
    pub rounds_played: u32,
}

/// Body of `POST game/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub game_session_id: String,
    pub score: i64,
    pub metadata: ScoreMetadata,
}

/// Scored-game operations.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Fetches one random located image for `mode`. A missing or malformed
    /// `imageUrl`/`coordinates` is an error, never a partial round.
    async fn fetch_round(&self, mode: GameMode) -> Result<Round, ApiError>;

    /// Opens a scored session (`POST game/start`, attested).
    async fn start_session(&self) -> Result<GameSessionTicket, ApiError>;

    /// Records a final score (`POST game/submit`, attested).
    async fn submit_score(&self, submission: &ScoreSubmission) -> Result<(), ApiError>;

    /// Fetches the top `limit` leaderboard rows.
    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, ApiError>;
}

/// AI-duel operations.
#[async_trait]
pub trait DuelApi: Send + Sync {
    async fn start_match(&self) -> Result<MatchStart, ApiError>;

    async fn submit_guess(
        &self,
        match_id: &str,
        round_index: u32,
        guess: &str,
    ) -> Result<GuessResult, ApiError>;
}
