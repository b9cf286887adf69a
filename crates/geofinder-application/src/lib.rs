//! Application layer for GeoFinder.
//!
//! Use cases that drive the core state machines against the remote API ports
//! and the device-local store.

pub mod ai_duel_usecase;
pub mod background_service;
pub mod error;
pub mod game_session_usecase;
pub mod leaderboard_service;
pub mod prefetcher;
pub mod summary_timer;

#[cfg(test)]
mod mock;

pub use ai_duel_usecase::{AiDuelUseCase, GuessOutcome};
pub use background_service::BackgroundRotationService;
pub use error::{PlayError, PlayResult};
pub use game_session_usecase::{GameSessionUseCase, SubmitStatus};
pub use leaderboard_service::LeaderboardService;
pub use prefetcher::RoundPrefetcher;
pub use summary_timer::SummaryTimer;
