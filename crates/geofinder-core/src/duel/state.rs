//! Client-side cache of an AI-duel match.
//!
//! The server owns the match. [`DuelMatch`] holds the client's copy and knows
//! how to fold in guess results and how to resynchronize when the server
//! rejects a guess. Once the server asserts `completed`, the local status never
//! goes back to in-progress for that match.

use super::model::{
    DuelHistoryEntry, DuelRound, DuelScores, DuelSnapshot, DuelStatus, GuessResult, MatchStart,
};
use crate::api::ApiError;
use serde::Serialize;

pub const MSG_START_FAILED: &str =
    "Couldn't start a match right now. Check your network connection and try again.";
pub const MSG_NOT_READY: &str = "Match not ready yet. Please wait a moment.";
pub const MSG_EMPTY_GUESS: &str = "Enter a country before submitting your guess.";
pub const MSG_RESYNCED: &str = "The match fell out of sync with the server. Try guessing again!";
pub const MSG_ALREADY_COMPLETED: &str = "This match already wrapped up. Start a new duel!";
pub const MSG_AUTH_FAILED: &str =
    "App Check verification failed. Please try again or restart the app.";
pub const MSG_GUESS_FAILED: &str = "Something went wrong submitting your guess. Please try again.";

/// What a guess submission should carry to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRequest {
    pub match_id: String,
    pub round_index: u32,
    pub guess: String,
}

/// Why a guess was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessRejection {
    /// Loading, already submitting, completed, or the result is on screen.
    Unavailable,
    NotReady,
    EmptyGuess,
}

/// How a failed guess submission was folded into local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Adopted the server's round/scores/history; the player should guess again.
    Resynced,
    /// The match is over; guessing is disabled.
    Completed,
    /// Attestation failed; state untouched.
    AuthFailed,
    /// Any other failure; state untouched.
    Failed,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DuelMatch {
    match_id: Option<String>,
    current_round: Option<DuelRound>,
    queued_round: Option<DuelRound>,
    total_rounds: u32,
    scores: DuelScores,
    status: DuelStatus,
    latest_result: Option<GuessResult>,
    history: Vec<DuelHistoryEntry>,
    error_message: Option<String>,
    loading: bool,
    submitting: bool,
}

impl DuelMatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything and marks a match start as in flight.
    pub fn begin_start(&mut self) {
        *self = Self {
            loading: true,
            ..Self::default()
        };
    }

    pub fn apply_start(&mut self, start: MatchStart) {
        self.loading = false;
        self.match_id = Some(start.match_id);
        self.current_round = Some(start.round);
        self.total_rounds = start.total_rounds.unwrap_or(0);
        self.scores = start.scores.unwrap_or_default();
        self.status = start.status.unwrap_or_default();
        self.error_message = None;
    }

    pub fn fail_start(&mut self) {
        self.loading = false;
        self.error_message = Some(MSG_START_FAILED.to_string());
    }

    /// Validates local state and builds the request for a guess.
    ///
    /// On success the match is marked as submitting; every outcome must be
    /// followed by [`apply_guess_result`](Self::apply_guess_result) or
    /// [`apply_guess_error`](Self::apply_guess_error).
    pub fn prepare_guess(&mut self, text: &str) -> Result<GuessRequest, GuessRejection> {
        if !self.can_submit_guess() {
            return Err(GuessRejection::Unavailable);
        }
        let (Some(match_id), Some(round)) = (&self.match_id, &self.current_round) else {
            self.error_message = Some(MSG_NOT_READY.to_string());
            return Err(GuessRejection::NotReady);
        };
        let guess = text.trim();
        if guess.is_empty() {
            self.error_message = Some(MSG_EMPTY_GUESS.to_string());
            return Err(GuessRejection::EmptyGuess);
        }

        let request = GuessRequest {
            match_id: match_id.clone(),
            round_index: round.round_index,
            guess: guess.to_string(),
        };
        self.submitting = true;
        self.error_message = None;
        Ok(request)
    }

    /// Folds a successful guess response in. The next round is staged, not
    /// shown; see [`advance_round`](Self::advance_round).
    pub fn apply_guess_result(&mut self, result: GuessResult) {
        self.submitting = false;
        if let Some(scores) = result.scores {
            self.scores = scores;
        }
        if let Some(status) = result.status.clone() {
            self.adopt_status(status);
        }
        if let Some(history) = result.history.clone() {
            self.history = history;
        }
        self.queued_round = result.next_round.clone();
        self.latest_result = Some(result);
    }

    /// Folds a failed guess submission in, resynchronizing from the server's
    /// snapshot where one was sent. Never re-submits.
    pub fn apply_guess_error(&mut self, error: &ApiError) -> Reconciliation {
        self.submitting = false;
        match error {
            ApiError::ProtocolDesync(snapshot) => {
                self.adopt_snapshot(snapshot);
                self.queued_round = None;
                self.latest_result = None;
                self.error_message = Some(MSG_RESYNCED.to_string());
                Reconciliation::Resynced
            }
            ApiError::MatchCompleted(snapshot) => {
                if let Some(scores) = snapshot.scores {
                    self.scores = scores;
                }
                if let Some(history) = &snapshot.history {
                    self.history = history.clone();
                }
                self.status = DuelStatus::Completed;
                self.latest_result = None;
                self.queued_round = None;
                self.error_message = Some(MSG_ALREADY_COMPLETED.to_string());
                Reconciliation::Completed
            }
            ApiError::Auth(_) => {
                self.error_message = Some(MSG_AUTH_FAILED.to_string());
                Reconciliation::AuthFailed
            }
            other => {
                let message = match other {
                    ApiError::Unknown { message, .. } if !message.trim().is_empty() => {
                        message.clone()
                    }
                    ApiError::Unknown { .. } => MSG_GUESS_FAILED.to_string(),
                    _ => other.to_string(),
                };
                self.error_message = Some(message);
                Reconciliation::Failed
            }
        }
    }

    /// Moves the staged round on screen. Returns false when nothing is staged.
    pub fn advance_round(&mut self) -> bool {
        let Some(next) = self.queued_round.take() else {
            return false;
        };
        self.current_round = Some(next);
        self.latest_result = None;
        self.error_message = None;
        true
    }

    fn adopt_snapshot(&mut self, snapshot: &DuelSnapshot) {
        if let Some(round) = &snapshot.expected_round {
            self.current_round = Some(round.clone());
        }
        if let Some(history) = &snapshot.history {
            self.history = history.clone();
        }
        if let Some(scores) = snapshot.scores {
            self.scores = scores;
        }
        if let Some(status) = &snapshot.status {
            self.adopt_status(status.clone());
        }
    }

    fn adopt_status(&mut self, status: DuelStatus) {
        if self.status == DuelStatus::Completed {
            return;
        }
        self.status = status;
    }

    // ============================================================================
    // View state
    // ============================================================================

    pub fn match_id(&self) -> Option<&str> {
        self.match_id.as_deref()
    }

    pub fn current_round(&self) -> Option<&DuelRound> {
        self.current_round.as_ref()
    }

    pub fn queued_round(&self) -> Option<&DuelRound> {
        self.queued_round.as_ref()
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn scores(&self) -> DuelScores {
        self.scores
    }

    pub fn status(&self) -> &DuelStatus {
        &self.status
    }

    pub fn latest_result(&self) -> Option<&GuessResult> {
        self.latest_result.as_ref()
    }

    pub fn history(&self) -> &[DuelHistoryEntry] {
        &self.history
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_completed(&self) -> bool {
        self.status == DuelStatus::Completed
    }

    /// Whether the guess input should be offered.
    pub fn can_submit_guess(&self) -> bool {
        !self.loading
            && !self.submitting
            && self.status == DuelStatus::InProgress
            && self.current_round.is_some()
            && self.latest_result.is_none()
    }

    /// A result is on screen and the next round is staged.
    pub fn awaiting_next_round(&self) -> bool {
        self.status == DuelStatus::InProgress
            && self.latest_result.is_some()
            && self.queued_round.is_some()
    }

    /// `Round n / total`, or `Round n` when the total is unknown.
    pub fn round_label(&self) -> Option<String> {
        let round = self.current_round.as_ref()?;
        let number = round.round_index + 1;
        Some(if self.total_rounds > 0 {
            format!("Round {} / {}", number, self.total_rounds)
        } else {
            format!("Round {}", number)
        })
    }
}
