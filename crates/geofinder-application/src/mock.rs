//! Hand-written port doubles shared by the unit tests.

use async_trait::async_trait;
use geofinder_core::api::{
    ApiError, DuelApi, GameApi, GameSessionTicket, ScoreSubmission,
};
use geofinder_core::duel::{GuessResult, MatchStart};
use geofinder_core::leaderboard::LeaderboardEntry;
use geofinder_core::round::{Coordinates, CountryAnswer, GameMode, Round};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

pub fn round(country: &str) -> Round {
    Round {
        mode: GameMode::Photo,
        image_url: format!("https://img/{country}.jpg"),
        coordinates: Coordinates::new(10.0, 20.0),
        answer: CountryAnswer::from_api(Some(country), None),
        contributor: None,
    }
}

/// Scripted [`GameApi`]. Rounds are served from `rounds` (falling back to
/// "Japan"), or from `gates` when gated responses were queued.
#[derive(Default)]
pub struct MockGameApi {
    pub rounds: Mutex<VecDeque<Result<Round, ApiError>>>,
    pub gates: Mutex<VecDeque<oneshot::Receiver<Round>>>,
    pub session: Mutex<Option<Result<GameSessionTicket, ApiError>>>,
    pub leaderboard: Mutex<Option<Result<Vec<LeaderboardEntry>, ApiError>>>,
    pub submissions: Mutex<Vec<ScoreSubmission>>,
    pub submit_error: Mutex<Option<ApiError>>,
    pub fetch_calls: AtomicUsize,
    pub session_calls: AtomicUsize,
}

impl MockGameApi {
    pub fn with_session(id: &str) -> Self {
        let api = Self::default();
        *api.session.lock().unwrap() = Some(Ok(ticket(id)));
        api
    }

    pub fn push_round(&self, round: Result<Round, ApiError>) {
        self.rounds.lock().unwrap().push_back(round);
    }

    pub fn gate(&self) -> oneshot::Sender<Round> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

pub fn ticket(id: &str) -> GameSessionTicket {
    GameSessionTicket {
        game_session_id: id.to_string(),
        seed: "seed".to_string(),
        expires_at: "2030-01-01T00:00:00Z".to_string(),
    }
}

#[async_trait]
impl GameApi for MockGameApi {
    async fn fetch_round(&self, _mode: GameMode) -> Result<Round, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            return gate
                .await
                .map_err(|_| ApiError::network("gate dropped", false));
        }
        self.rounds
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(round("Japan")))
    }

    async fn start_session(&self) -> Result<GameSessionTicket, ApiError> {
        let n = self.session_calls.fetch_add(1, Ordering::SeqCst);
        match self.session.lock().unwrap().clone() {
            Some(Ok(ticket)) if n > 0 => Ok(GameSessionTicket {
                game_session_id: format!("{}-{}", ticket.game_session_id, n),
                ..ticket
            }),
            Some(result) => result,
            None => Err(ApiError::Auth("no token".into())),
        }
    }

    async fn submit_score(&self, submission: &ScoreSubmission) -> Result<(), ApiError> {
        self.submissions.lock().unwrap().push(submission.clone());
        match self.submit_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn leaderboard(&self, _limit: u32) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.leaderboard
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Scripted [`DuelApi`].
#[derive(Default)]
pub struct MockDuelApi {
    pub starts: Mutex<VecDeque<Result<MatchStart, ApiError>>>,
    pub guesses: Mutex<VecDeque<Result<GuessResult, ApiError>>>,
    pub sent: Mutex<Vec<(String, u32, String)>>,
}

#[async_trait]
impl DuelApi for MockDuelApi {
    async fn start_match(&self) -> Result<MatchStart, ApiError> {
        self.starts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::network("no scripted start", true)))
    }

    async fn submit_guess(
        &self,
        match_id: &str,
        round_index: u32,
        guess: &str,
    ) -> Result<GuessResult, ApiError> {
        self.sent
            .lock()
            .unwrap()
            .push((match_id.to_string(), round_index, guess.to_string()));
        self.guesses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::network("no scripted guess", true)))
    }
}
