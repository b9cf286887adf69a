//! Scored sessions: a fixed number of rounds sharing one cumulative score.

mod lifecycle;

pub use lifecycle::{
    Effect, GuessAttempt, LifecycleError, LifecycleEvent, Phase, RoundLifecycle, RoundOutcome,
};

use crate::api::{ScoreMetadata, ScoreSubmission};
use crate::config::GameConfig;
use crate::round::GameMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TOTAL_ROUNDS: u32 = 10;
pub const MAX_ATTEMPTS: u32 = 3;

/// Points for a correct guess on the `attempt`-th try (1-based): 3, 2, 1,
/// then nothing.
pub fn points_for_attempt(attempt: u32) -> i64 {
    match attempt {
        1..=3 => 4 - i64::from(attempt),
        _ => 0,
    }
}

/// Rules fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub mode: GameMode,
    pub total_rounds: u32,
    pub max_attempts: u32,
    pub summary_delay: Duration,
    /// Subtracted from the score on a missed round once the session has been
    /// continued past its first summary.
    pub continued_miss_penalty: i64,
    pub submit_to_leaderboard: bool,
}

impl SessionSettings {
    pub fn new(mode: GameMode) -> Self {
        Self::from_config(&GameConfig::default(), mode)
    }

    pub fn from_config(config: &GameConfig, mode: GameMode) -> Self {
        Self {
            mode,
            total_rounds: config.total_rounds.max(1),
            max_attempts: config.max_attempts.max(1),
            summary_delay: config.summary_delay(),
            continued_miss_penalty: config.continued_miss_penalty(mode),
            submit_to_leaderboard: config.submit_to_leaderboard,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(GameMode::default())
    }
}

/// Counters for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// 1-based round currently being played or about to be played.
    pub round_number: u32,
    pub completed_rounds: u32,
    pub correct_answers: u32,
    pub score: i64,
    /// `None` when playing offline.
    pub session_id: Option<String>,
    /// Set after "continue" from a session summary.
    pub continued: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            round_number: 1,
            ..Self::default()
        }
    }

    pub fn is_complete(&self, total_rounds: u32) -> bool {
        self.completed_rounds >= total_rounds
    }

    /// The leaderboard submission for the current score, if one is due.
    pub fn submission(&self, settings: &SessionSettings) -> Option<ScoreSubmission> {
        if !settings.submit_to_leaderboard || self.score <= 0 {
            return None;
        }
        let session_id = self.session_id.as_ref()?;
        Some(ScoreSubmission {
            game_session_id: session_id.clone(),
            score: self.score,
            metadata: ScoreMetadata {
                correct_answers: self.correct_answers,
                total_rounds: settings.total_rounds,
                rounds_played: self.completed_rounds,
            },
        })
    }
}
