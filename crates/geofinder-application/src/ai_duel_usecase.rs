//! AI duel use case.
//!
//! The duel server owns the match; [`DuelMatch`] is the local cache of it.
//! Network calls are made without holding the state lock, so the view stays
//! readable while a request is in flight.

use crate::error::{PlayError, PlayResult};
use geofinder_core::api::{ApiError, DuelApi};
use geofinder_core::duel::{DuelMatch, Reconciliation};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// What happened to a guess that reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The result is on screen; the next round (if any) is staged.
    Scored,
    /// The server rejected it and the local state was reconciled.
    Reconciled(Reconciliation),
}

pub struct AiDuelUseCase {
    api: Arc<dyn DuelApi>,
    state: Mutex<DuelMatch>,
}

impl AiDuelUseCase {
    pub fn new(api: Arc<dyn DuelApi>) -> Self {
        Self {
            api,
            state: Mutex::new(DuelMatch::new()),
        }
    }

    pub async fn view(&self) -> DuelMatch {
        self.state.lock().await.clone()
    }

    /// Starts a match, discarding any local state.
    pub async fn start(&self) -> Result<(), ApiError> {
        self.state.lock().await.begin_start();

        let result = self.api.start_match().await;

        let mut state = self.state.lock().await;
        match result {
            Ok(start) => {
                info!(match_id = %start.match_id, "[AiDuel] Match started");
                state.apply_start(start);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "[AiDuel] Failed to start match");
                state.fail_start();
                Err(err)
            }
        }
    }

    /// Throws the current match away and starts another.
    pub async fn rematch(&self) -> Result<(), ApiError> {
        info!("[AiDuel] Rematch requested");
        self.start().await
    }

    /// Sends a guess for the current round.
    ///
    /// Local refusals (blank input, no match, result still on screen, another
    /// guess in flight) return [`PlayError::Rejected`] without a request.
    /// Server-side failures are folded into the match state and reported as
    /// [`GuessOutcome::Reconciled`]; the guess is never re-sent.
    pub async fn submit_guess(&self, text: &str) -> PlayResult<GuessOutcome> {
        let request = self
            .state
            .lock()
            .await
            .prepare_guess(text)
            .map_err(PlayError::Rejected)?;

        let result = self
            .api
            .submit_guess(&request.match_id, request.round_index, &request.guess)
            .await;

        let mut state = self.state.lock().await;
        match result {
            Ok(result) => {
                state.apply_guess_result(result);
                info!(
                    match_id = %request.match_id,
                    round = request.round_index,
                    player = state.scores().player,
                    ai = state.scores().ai,
                    "[AiDuel] Guess scored"
                );
                Ok(GuessOutcome::Scored)
            }
            Err(err) => {
                let reconciliation = state.apply_guess_error(&err);
                warn!(
                    match_id = %request.match_id,
                    round = request.round_index,
                    error = %err,
                    ?reconciliation,
                    "[AiDuel] Guess rejected"
                );
                Ok(GuessOutcome::Reconciled(reconciliation))
            }
        }
    }

    /// Shows the staged next round. Returns false when none is staged.
    pub async fn advance(&self) -> bool {
        self.state.lock().await.advance_round()
    }
}
