//! AI-duel mode: a second, remote participant guesses every round and the
//! server keeps the authoritative round index.

mod format;
mod model;
mod state;

pub use format::{format_confidence, format_country};
pub use model::{
    AiGuessResult, DuelCoordinates, DuelCountry, DuelHistoryEntry, DuelRound, DuelScores,
    DuelSnapshot, DuelStatus, GuessResult, MatchStart, PlayerGuessResult,
};
pub use state::{DuelMatch, GuessRejection, GuessRequest, Reconciliation};
pub use state::{
    MSG_ALREADY_COMPLETED, MSG_AUTH_FAILED, MSG_EMPTY_GUESS, MSG_GUESS_FAILED, MSG_NOT_READY,
    MSG_RESYNCED, MSG_START_FAILED,
};
