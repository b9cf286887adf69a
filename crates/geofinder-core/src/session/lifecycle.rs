//! Round lifecycle state machine.
//!
//! All state changes go through [`RoundLifecycle::apply`]. The machine does no
//! I/O: it returns [`Effect`]s (persist the high score, schedule the summary,
//! submit a score, ...) for the application layer to carry out.
//!
//! ```text
//! Idle ──StartRound──▶ Loading ──RoundLoaded──▶ Playing ──Guess*──▶ Resolved
//!   ▲        │ (prefetched round skips Loading)    ▲                  │
//!   │        └─────────────────────────────────────┘◀──StartRound─────┤
//!   │                                                                 │ last round
//!   └──────────── Continue / NewGame / ReturnToMenu ◀── Summary ◀─────┘ (deferred)
//! ```

use super::{Session, SessionSettings, points_for_attempt};
use crate::api::ScoreSubmission;
use crate::country;
use crate::high_score::HighScore;
use crate::round::Round;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessAttempt {
    pub text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundOutcome {
    /// Guessed right on the `attempt`-th try.
    Correct { attempt: u32, points: i64 },
    /// Ran out of attempts. `penalty` is what was subtracted from the score.
    Missed { penalty: i64 },
}

impl RoundOutcome {
    pub fn score_delta(&self) -> i64 {
        match self {
            RoundOutcome::Correct { points, .. } => *points,
            RoundOutcome::Missed { penalty } => -penalty,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, RoundOutcome::Correct { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Phase {
    Idle,
    Loading,
    Playing {
        round: Round,
        attempts: Vec<GuessAttempt>,
    },
    Resolved {
        round: Round,
        attempts: Vec<GuessAttempt>,
        outcome: RoundOutcome,
    },
    Summary {
        round: Round,
        outcome: RoundOutcome,
    },
    /// The round could not be loaded; the player has to retry.
    Failed {
        message: String,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Playing { .. } => "playing",
            Phase::Resolved { .. } => "resolved",
            Phase::Summary { .. } => "summary",
            Phase::Failed { .. } => "failed",
        }
    }

    pub fn round(&self) -> Option<&Round> {
        match self {
            Phase::Playing { round, .. }
            | Phase::Resolved { round, .. }
            | Phase::Summary { round, .. } => Some(round),
            _ => None,
        }
    }

    pub fn attempts(&self) -> &[GuessAttempt] {
        match self {
            Phase::Playing { attempts, .. } | Phase::Resolved { attempts, .. } => attempts,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// A server session was opened (`Some`) or could not be (`None`, offline).
    SessionStarted { session_id: Option<String> },
    /// Begin the next round, with the buffered round if one was ready.
    StartRound { prefetched: Option<Round> },
    RoundLoaded(Round),
    RoundFailed(String),
    Guess(String),
    /// The deferred summary timer fired.
    ShowSummary,
    Continue,
    NewGame,
    ReturnToMenu,
}

impl LifecycleEvent {
    fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::SessionStarted { .. } => "session_started",
            LifecycleEvent::StartRound { .. } => "start_round",
            LifecycleEvent::RoundLoaded(_) => "round_loaded",
            LifecycleEvent::RoundFailed(_) => "round_failed",
            LifecycleEvent::Guess(_) => "guess",
            LifecycleEvent::ShowSummary => "show_summary",
            LifecycleEvent::Continue => "continue",
            LifecycleEvent::NewGame => "new_game",
            LifecycleEvent::ReturnToMenu => "return_to_menu",
        }
    }
}

/// Work the application layer must carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Buffer the round after this one.
    Prefetch,
    /// Write the new high score (fire-and-forget).
    PersistHighScore { key: &'static str, value: i64 },
    /// Show the summary after the delay unless cancelled first.
    ScheduleSummary(Duration),
    CancelSummary,
    SubmitScore(ScoreSubmission),
    StartServerSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("no round is being played")]
    NotPlaying,
    #[error("a round is already in progress")]
    RoundInProgress,
    #[error("the session is complete; continue or start a new game")]
    SessionComplete,
    #[error("cannot {event} while {phase}")]
    InvalidTransition {
        phase: &'static str,
        event: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundLifecycle {
    settings: SessionSettings,
    session: Session,
    phase: Phase,
    feedback: String,
    high_score: HighScore,
}

impl RoundLifecycle {
    pub fn new(settings: SessionSettings, high_score: HighScore) -> Self {
        Self {
            settings,
            session: Session::new(),
            phase: Phase::Idle,
            feedback: String::new(),
            high_score,
        }
    }

    /// The single transition function.
    pub fn apply(&mut self, event: LifecycleEvent) -> Result<Vec<Effect>, LifecycleError> {
        let event_name = event.name();
        debug!(event = event_name, phase = self.phase.name(), "[Lifecycle] apply");

        match event {
            LifecycleEvent::SessionStarted { session_id } => {
                self.session.session_id = session_id;
                Ok(Vec::new())
            }
            LifecycleEvent::StartRound { prefetched } => self.start_round(prefetched),
            LifecycleEvent::RoundLoaded(round) => match self.phase {
                Phase::Loading => Ok(self.enter_playing(round)),
                _ => Err(self.invalid(event_name)),
            },
            LifecycleEvent::RoundFailed(message) => match self.phase {
                Phase::Loading => {
                    self.phase = Phase::Failed { message };
                    Ok(Vec::new())
                }
                _ => Err(self.invalid(event_name)),
            },
            LifecycleEvent::Guess(text) => self.guess(text),
            LifecycleEvent::ShowSummary => Ok(self.show_summary()),
            LifecycleEvent::Continue => self.continue_session(),
            LifecycleEvent::NewGame => Ok(self.new_game()),
            LifecycleEvent::ReturnToMenu => Ok(self.return_to_menu()),
        }
    }

    fn start_round(&mut self, prefetched: Option<Round>) -> Result<Vec<Effect>, LifecycleError> {
        match self.phase {
            Phase::Loading | Phase::Playing { .. } => return Err(LifecycleError::RoundInProgress),
            Phase::Summary { .. } => return Err(LifecycleError::SessionComplete),
            _ => {}
        }
        if self.session.is_complete(self.settings.total_rounds) {
            return Err(LifecycleError::SessionComplete);
        }

        self.feedback.clear();
        match prefetched {
            Some(round) => Ok(self.enter_playing(round)),
            None => {
                self.phase = Phase::Loading;
                Ok(Vec::new())
            }
        }
    }

    fn enter_playing(&mut self, round: Round) -> Vec<Effect> {
        info!(
            round = self.session.round_number,
            mode = %self.settings.mode,
            "[Lifecycle] Round ready"
        );
        self.feedback.clear();
        self.phase = Phase::Playing {
            round,
            attempts: Vec::new(),
        };
        vec![Effect::Prefetch]
    }

    fn guess(&mut self, text: String) -> Result<Vec<Effect>, LifecycleError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let Phase::Playing { round, attempts } = &mut self.phase else {
            return Err(LifecycleError::NotPlaying);
        };

        let correct = country::is_correct(&text, round.answer.as_ref());
        attempts.push(GuessAttempt { text, correct });
        let attempt = attempts.len() as u32;

        if correct {
            let points = points_for_attempt(attempt);
            self.feedback = format!("✅ Correct! It was {}", round.display_name());
            return Ok(self.resolve(RoundOutcome::Correct { attempt, points }));
        }

        if attempt >= self.settings.max_attempts {
            self.feedback = format!(
                "❌ Game over! It was {} ({})",
                round.display_name(),
                round.coordinates
            );
            let penalty = if self.session.continued {
                self.settings.continued_miss_penalty
            } else {
                0
            };
            return Ok(self.resolve(RoundOutcome::Missed { penalty }));
        }

        self.feedback = format!(
            "❌ Not quite. Try again! (Guess {}/{})",
            attempt, self.settings.max_attempts
        );
        Ok(Vec::new())
    }

    fn resolve(&mut self, outcome: RoundOutcome) -> Vec<Effect> {
        let Phase::Playing { round, attempts } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return Vec::new();
        };
        let mut effects = Vec::new();

        self.session.score += outcome.score_delta();
        if outcome.is_correct() {
            self.session.correct_answers += 1;
            if let Some(value) = self.high_score.observe(self.session.score) {
                effects.push(Effect::PersistHighScore {
                    key: self.settings.mode.high_score_key(),
                    value,
                });
            }
        }
        self.session.completed_rounds += 1;

        info!(
            round = self.session.round_number,
            correct = outcome.is_correct(),
            score = self.session.score,
            completed = self.session.completed_rounds,
            "[Lifecycle] Round resolved"
        );

        if self.session.is_complete(self.settings.total_rounds) {
            effects.push(Effect::ScheduleSummary(self.settings.summary_delay));
        } else {
            self.session.round_number += 1;
        }

        self.phase = Phase::Resolved {
            round,
            attempts,
            outcome,
        };
        effects
    }

    fn show_summary(&mut self) -> Vec<Effect> {
        if !self.session.is_complete(self.settings.total_rounds) {
            return Vec::new();
        }
        if let Phase::Resolved { round, outcome, .. } =
            std::mem::replace(&mut self.phase, Phase::Idle)
        {
            self.phase = Phase::Summary { round, outcome };
        } else {
            // a stale timer; leave whatever phase we were in
            debug!("[Lifecycle] Ignoring summary outside a resolved final round");
        }
        Vec::new()
    }

    fn continue_session(&mut self) -> Result<Vec<Effect>, LifecycleError> {
        if !self.session.is_complete(self.settings.total_rounds) {
            return Err(self.invalid("continue"));
        }
        self.session.round_number = 1;
        self.session.completed_rounds = 0;
        self.session.correct_answers = 0;
        self.session.session_id = None;
        self.session.continued = true;
        self.phase = Phase::Idle;
        self.feedback.clear();
        Ok(vec![Effect::CancelSummary, Effect::StartServerSession])
    }

    fn new_game(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::CancelSummary];
        effects.extend(self.session.submission(&self.settings).map(Effect::SubmitScore));
        effects.push(Effect::StartServerSession);
        self.reset();
        effects
    }

    fn return_to_menu(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::CancelSummary];
        effects.extend(self.session.submission(&self.settings).map(Effect::SubmitScore));
        self.reset();
        effects
    }

    fn reset(&mut self) {
        self.session = Session::new();
        self.phase = Phase::Idle;
        self.feedback.clear();
    }

    fn invalid(&self, event: &'static str) -> LifecycleError {
        LifecycleError::InvalidTransition {
            phase: self.phase.name(),
            event,
        }
    }

    // ============================================================================
    // Convenience wrappers
    // ============================================================================

    pub fn submit_guess(&mut self, text: impl Into<String>) -> Result<Vec<Effect>, LifecycleError> {
        self.apply(LifecycleEvent::Guess(text.into()))
    }

    // ============================================================================
    // View state
    // ============================================================================

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn high_score(&self) -> HighScore {
        self.high_score
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.phase.round()
    }

    /// Number of guesses made in the current round.
    pub fn attempt_count(&self) -> usize {
        self.phase.attempts().len()
    }

    pub fn incorrect_guesses(&self) -> Vec<&str> {
        self.phase
            .attempts()
            .iter()
            .filter(|a| !a.correct)
            .map(|a| a.text.as_str())
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    /// The current round is over (correctly or not).
    pub fn is_round_over(&self) -> bool {
        matches!(self.phase, Phase::Resolved { .. } | Phase::Summary { .. })
    }

    pub fn is_summary_visible(&self) -> bool {
        matches!(self.phase, Phase::Summary { .. })
    }

    pub fn is_session_complete(&self) -> bool {
        self.session.is_complete(self.settings.total_rounds)
    }
}
