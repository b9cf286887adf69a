//! Game session use case.
//!
//! Runs the [`RoundLifecycle`] state machine against the Remote Game API and
//! the device-local store, carrying out the effects each transition asks for.

use crate::error::{PlayError, PlayResult};
use crate::prefetcher::RoundPrefetcher;
use crate::summary_timer::SummaryTimer;
use geofinder_core::api::{GameApi, ScoreSubmission};
use geofinder_core::session::{Effect, LifecycleEvent, RoundLifecycle, SessionSettings};
use geofinder_core::store::LocalStore;
use geofinder_infrastructure::{HighScoreRepository, SessionIdRepository};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What happened to the score when a session was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Offline or zero score, so there was nothing to submit.
    Skipped,
    Submitted,
    /// The leaderboard write failed. The score is gone either way.
    Failed,
}

/// Use case for one screen's worth of scored play (photo or panorama).
///
/// # Responsibilities
///
/// - Opening server sessions, falling back to offline play when that fails
/// - Starting rounds from the prefetch buffer or a direct fetch
/// - Resolving guesses and persisting a raised high score
/// - Deferring the session summary and cancelling it on teardown
/// - Submitting the final score when the player leaves or restarts
pub struct GameSessionUseCase {
    api: Arc<dyn GameApi>,
    prefetcher: RoundPrefetcher,
    lifecycle: Arc<Mutex<RoundLifecycle>>,
    high_scores: HighScoreRepository,
    session_ids: SessionIdRepository,
    summary_timer: SummaryTimer,
    submitting: AtomicBool,
}

/// Clears the in-flight flag when the guess finishes, however it finishes.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl GameSessionUseCase {
    pub fn new(api: Arc<dyn GameApi>, store: Arc<dyn LocalStore>, settings: SessionSettings) -> Self {
        let high_scores = HighScoreRepository::new(store.clone());
        let high_score = high_scores.load(settings.mode);
        info!(mode = %settings.mode, high_score = high_score.value(), "[GameSession] Created");

        Self {
            prefetcher: RoundPrefetcher::new(api.clone(), settings.mode),
            api,
            lifecycle: Arc::new(Mutex::new(RoundLifecycle::new(settings, high_score))),
            high_scores,
            session_ids: SessionIdRepository::new(store),
            summary_timer: SummaryTimer::new(),
            submitting: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current state for rendering.
    pub async fn view(&self) -> RoundLifecycle {
        self.lifecycle.lock().await.clone()
    }

    // ============================================================================
    // Session
    // ============================================================================

    /// Opens a server session. On failure the session continues offline and
    /// its score is simply never submitted.
    pub async fn start_session(&self) -> Option<String> {
        let session_id = match self.api.start_session().await {
            Ok(ticket) => {
                info!(session_id = %ticket.game_session_id, "[GameSession] Server session started");
                if let Err(e) = self.session_ids.record(&ticket.game_session_id) {
                    warn!(error = %e, "[GameSession] Failed to remember session id");
                }
                Some(ticket.game_session_id)
            }
            Err(err) => {
                warn!(error = %err, "[GameSession] Could not start server session, playing offline");
                None
            }
        };

        let mut lifecycle = self.lifecycle.lock().await;
        // SessionStarted never produces effects
        let _ = lifecycle.apply(LifecycleEvent::SessionStarted {
            session_id: session_id.clone(),
        });
        session_id
    }

    /// Opens the session and buffers the first round.
    pub async fn begin(&self) -> Option<String> {
        let prefetch = self.prefetcher.spawn_prefetch();
        let session_id = self.start_session().await;
        if let Err(e) = prefetch.await {
            warn!(error = %e, "[GameSession] Initial prefetch task failed");
        }
        session_id
    }

    // ============================================================================
    // Rounds
    // ============================================================================

    /// Starts the next round. A fetch failure is reported and leaves the
    /// lifecycle in its failed phase; the player retries by calling this again.
    pub async fn start_round(&self) -> PlayResult<()> {
        let buffered = self.prefetcher.take_ready();
        let effects = {
            let mut lifecycle = self.lifecycle.lock().await;
            lifecycle.apply(LifecycleEvent::StartRound {
                prefetched: buffered,
            })?
        };
        self.run_effects(effects).await;

        if !self.lifecycle.lock().await.is_loading() {
            return Ok(());
        }

        debug!("[GameSession] No buffered round, fetching");
        let fetched = self.prefetcher.take_or_fetch().await;
        let (effects, failure) = {
            let mut lifecycle = self.lifecycle.lock().await;
            match fetched {
                Ok(round) => (lifecycle.apply(LifecycleEvent::RoundLoaded(round))?, None),
                Err(err) => {
                    warn!(error = %err, "[GameSession] Failed to load round");
                    let effects = lifecycle.apply(LifecycleEvent::RoundFailed(err.to_string()))?;
                    (effects, Some(err))
                }
            }
        };
        self.run_effects(effects).await;

        match failure {
            Some(err) => Err(PlayError::Api(err)),
            None => Ok(()),
        }
    }

    /// Resolves one guess. Blank input is ignored; a guess while another is
    /// being processed is refused with [`PlayError::Busy`].
    pub async fn submit_guess(&self, text: &str) -> PlayResult<()> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(PlayError::Busy);
        }
        let _guard = SubmitGuard(&self.submitting);

        let effects = {
            let mut lifecycle = self.lifecycle.lock().await;
            lifecycle.apply(LifecycleEvent::Guess(text.to_string()))?
        };
        self.run_effects(effects).await;
        Ok(())
    }

    // ============================================================================
    // Summary actions
    // ============================================================================

    /// Keeps the score and plays another set of rounds in a new server session.
    pub async fn continue_session(&self) -> PlayResult<()> {
        self.apply_and_run(LifecycleEvent::Continue).await?;
        Ok(())
    }

    /// Submits the current score if eligible and starts over from zero.
    pub async fn new_game(&self) -> PlayResult<SubmitStatus> {
        self.apply_and_run(LifecycleEvent::NewGame).await
    }

    /// Submits the current score if eligible and abandons the session.
    pub async fn return_to_menu(&self) -> PlayResult<SubmitStatus> {
        self.apply_and_run(LifecycleEvent::ReturnToMenu).await
    }

    /// Teardown: nothing scheduled may touch the state afterwards.
    pub fn shutdown(&self) {
        self.summary_timer.cancel();
    }

    async fn apply_and_run(&self, event: LifecycleEvent) -> PlayResult<SubmitStatus> {
        let effects = self.lifecycle.lock().await.apply(event)?;
        Ok(self.run_effects(effects).await)
    }

    // ============================================================================
    // Effects
    // ============================================================================

    /// Carries out `effects` in order and reports any score submission.
    async fn run_effects(&self, effects: Vec<Effect>) -> SubmitStatus {
        let mut submit = SubmitStatus::Skipped;
        for effect in effects {
            match effect {
                Effect::Prefetch => {
                    self.prefetcher.spawn_prefetch();
                }
                Effect::PersistHighScore { key, value } => {
                    let repo = self.high_scores.clone();
                    // Writes may land out of order; raise only ever moves the record up
                    tokio::task::spawn_blocking(move || match repo.raise(key, value) {
                        Ok(true) => debug!(key, value, "[GameSession] High score persisted"),
                        Ok(false) => debug!(key, value, "[GameSession] Stored high score already higher"),
                        Err(e) => {
                            warn!(key, value, error = %e, "[GameSession] Failed to persist high score")
                        }
                    });
                }
                Effect::ScheduleSummary(delay) => {
                    let lifecycle = self.lifecycle.clone();
                    self.summary_timer.schedule(delay, move || async move {
                        let mut lifecycle = lifecycle.lock().await;
                        if lifecycle.apply(LifecycleEvent::ShowSummary).is_ok() {
                            info!(score = lifecycle.session().score, "[GameSession] Showing summary");
                        }
                    });
                }
                Effect::CancelSummary => self.summary_timer.cancel(),
                Effect::SubmitScore(submission) => submit = self.submit_score(submission).await,
                Effect::StartServerSession => {
                    self.start_session().await;
                }
            }
        }
        submit
    }

    /// Leaderboard writes are best effort; a failure never blocks play but is
    /// reported so the screen can tell the player.
    async fn submit_score(&self, submission: ScoreSubmission) -> SubmitStatus {
        match self.api.submit_score(&submission).await {
            Ok(()) => {
                info!(
                    session_id = %submission.game_session_id,
                    score = submission.score,
                    "[GameSession] Score submitted"
                );
                SubmitStatus::Submitted
            }
            Err(err) => {
                warn!(
                    session_id = %submission.game_session_id,
                    error = %err,
                    "[GameSession] Score submission failed"
                );
                SubmitStatus::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockGameApi, round};
    use geofinder_core::api::ApiError;
    use geofinder_core::round::GameMode;
    use geofinder_core::session::{LifecycleError, Phase};
    use geofinder_core::error::Result as StoreResult;
    use geofinder_core::store::{LocalStore, MemoryStore, SESSION_IDS_KEY};
    use std::time::Duration;

    /// Store whose first locked update stalls, so a later high-score write
    /// can overtake an earlier one.
    #[derive(Default)]
    struct StallingStore {
        inner: MemoryStore,
        stalled: AtomicBool,
    }

    impl LocalStore for StallingStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }

        fn update(
            &self,
            key: &str,
            f: &mut dyn FnMut(Option<String>) -> StoreResult<Option<String>>,
        ) -> StoreResult<()> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(300));
            }
            self.inner.update(key, f)
        }
    }

    fn use_case(api: Arc<MockGameApi>) -> (GameSessionUseCase, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let use_case = GameSessionUseCase::new(api, store.clone(), SessionSettings::new(GameMode::Photo));
        (use_case, store)
    }

    async fn wait_for_value(store: &MemoryStore, key: &str, expected: &str) {
        for _ in 0..200 {
            if store.get(key).unwrap().as_deref() == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("{key} never became {expected}");
    }

    #[tokio::test]
    async fn test_offline_fallback_when_session_start_fails() {
        let api = Arc::new(MockGameApi::default());
        let (use_case, store) = use_case(api);

        assert_eq!(use_case.start_session().await, None);
        assert!(use_case.view().await.session().session_id.is_none());
        assert_eq!(store.get(SESSION_IDS_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_id_recorded() {
        let api = Arc::new(MockGameApi::with_session("gs"));
        let (use_case, store) = use_case(api);

        assert_eq!(use_case.start_session().await.as_deref(), Some("gs"));
        assert_eq!(store.get(SESSION_IDS_KEY).unwrap().as_deref(), Some(r#"["gs"]"#));
    }

    #[tokio::test]
    async fn test_round_uses_buffer_then_refills() {
        let api = Arc::new(MockGameApi::default());
        api.push_round(Ok(round("Peru")));
        let (use_case, _) = use_case(api.clone());

        use_case.begin().await;
        assert_eq!(api.fetches(), 1);

        use_case.start_round().await.unwrap();
        let view = use_case.view().await;
        assert_eq!(view.current_round().unwrap().display_name(), "Peru");

        // entering play requests the next buffered round
        while api.fetches() < 2 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_reported_not_retried() {
        let api = Arc::new(MockGameApi::default());
        api.push_round(Err(ApiError::network("offline", true)));
        let (use_case, _) = use_case(api.clone());

        let err = use_case.start_round().await.unwrap_err();
        assert!(matches!(err, PlayError::Api(ApiError::Network { .. })));
        assert!(matches!(use_case.view().await.phase(), Phase::Failed { .. }));
        assert_eq!(api.fetches(), 1);

        use_case.start_round().await.unwrap();
        assert_eq!(use_case.view().await.phase().name(), "playing");
    }

    #[tokio::test]
    async fn test_correct_guess_persists_high_score() {
        let api = Arc::new(MockGameApi::default());
        let (use_case, store) = use_case(api);

        use_case.start_round().await.unwrap();
        use_case.submit_guess("japan").await.unwrap();

        let view = use_case.view().await;
        assert!(view.feedback().contains("Correct"));
        assert_eq!(view.session().score, 3);
        wait_for_value(&store, "highScore", "3").await;
    }

    #[tokio::test]
    async fn test_late_high_score_write_cannot_lower_record() {
        let api = Arc::new(MockGameApi::default());
        let store = Arc::new(StallingStore::default());
        let use_case =
            GameSessionUseCase::new(api, store.clone(), SessionSettings::new(GameMode::Photo));

        for _ in 0..2 {
            use_case.start_round().await.unwrap();
            use_case.submit_guess("japan").await.unwrap();
        }
        assert_eq!(use_case.view().await.session().score, 6);

        // Let the stalled write for 3 finish after the one for 6
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.get("highScore").unwrap().as_deref(), Some("6"));
    }

    #[tokio::test]
    async fn test_guess_outside_round_is_lifecycle_error() {
        let api = Arc::new(MockGameApi::default());
        let (use_case, _) = use_case(api);
        let err = use_case.submit_guess("japan").await.unwrap_err();
        assert!(matches!(err, PlayError::Lifecycle(LifecycleError::NotPlaying)));
        // the in-flight flag was released
        assert!(!use_case.submitting.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_busy_while_submitting() {
        let api = Arc::new(MockGameApi::default());
        let (use_case, _) = use_case(api);
        use_case.start_round().await.unwrap();

        use_case.submitting.store(true, Ordering::SeqCst);
        assert!(matches!(use_case.submit_guess("japan").await, Err(PlayError::Busy)));
        assert_eq!(use_case.view().await.attempt_count(), 0);
    }

    #[tokio::test]
    async fn test_return_to_menu_submits_score() {
        let api = Arc::new(MockGameApi::with_session("gs"));
        let (use_case, _) = use_case(api.clone());
        use_case.start_session().await;
        use_case.start_round().await.unwrap();
        use_case.submit_guess("Japan").await.unwrap();

        assert_eq!(use_case.return_to_menu().await.unwrap(), SubmitStatus::Submitted);

        let submissions = api.submissions.lock().unwrap().clone();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].score, 3);
        assert_eq!(submissions[0].metadata.rounds_played, 1);
        assert_eq!(use_case.view().await.session().score, 0);
    }

    #[tokio::test]
    async fn test_new_game_opens_fresh_session() {
        let api = Arc::new(MockGameApi::with_session("gs"));
        let (use_case, store) = use_case(api.clone());
        use_case.start_session().await;

        assert_eq!(use_case.new_game().await.unwrap(), SubmitStatus::Skipped);

        // zero score: nothing submitted
        assert!(api.submissions.lock().unwrap().is_empty());
        assert_eq!(
            use_case.view().await.session().session_id.as_deref(),
            Some("gs-1")
        );
        assert_eq!(
            store.get(SESSION_IDS_KEY).unwrap().as_deref(),
            Some(r#"["gs","gs-1"]"#)
        );
    }

    #[tokio::test]
    async fn test_failed_submission_is_reported_and_score_still_resets() {
        let api = Arc::new(MockGameApi::with_session("gs"));
        *api.submit_error.lock().unwrap() = Some(ApiError::network("offline", true));
        let (use_case, _) = use_case(api.clone());
        use_case.start_session().await;
        use_case.start_round().await.unwrap();
        use_case.submit_guess("Japan").await.unwrap();

        assert_eq!(use_case.return_to_menu().await.unwrap(), SubmitStatus::Failed);

        assert_eq!(api.submissions.lock().unwrap().len(), 1);
        let view = use_case.view().await;
        assert_eq!(view.session().score, 0);
        assert_eq!(view.phase().name(), "idle");
    }
}
