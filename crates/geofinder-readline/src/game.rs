//! Photo and panorama game screens.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use geofinder_application::{GameSessionUseCase, PlayError, SubmitStatus};
use geofinder_core::api::GameApi;
use geofinder_core::session::{Phase, RoundLifecycle, RoundOutcome, SessionSettings};
use geofinder_core::store::LocalStore;

use crate::Flow;
use crate::input::{self, Input, Prompt, Screen};

const SUMMARY_POLL: Duration = Duration::from_millis(100);

pub async fn run(
    rl: &mut Prompt,
    api: Arc<dyn GameApi>,
    store: Arc<dyn LocalStore>,
    settings: SessionSettings,
) -> Result<Flow> {
    let summary_delay = settings.summary_delay;
    let game = GameSessionUseCase::new(api, store, settings);
    let flow = play(rl, &game, summary_delay).await;
    game.shutdown();
    flow
}

async fn play(rl: &mut Prompt, game: &GameSessionUseCase, summary_delay: Duration) -> Result<Flow> {
    let view = game.view().await;
    println!(
        "{}",
        format!("=== {} game ===", title(&view)).bright_magenta().bold()
    );
    announce_session(game.begin().await);

    loop {
        if let Some(flow) = start_round(rl, game).await? {
            return Ok(flow);
        }
        render_round(&game.view().await);

        if let Some(flow) = guess_until_resolved(rl, game).await? {
            return Ok(flow);
        }

        if !game.view().await.is_session_complete() {
            match input::read(rl, Screen::Round, "Press Enter for the next round... ")? {
                Input::Line(_) => continue,
                Input::Back => return leave(game, Flow::Menu).await,
                Input::Quit => return leave(game, Flow::Quit).await,
            }
        }

        wait_for_summary(game, summary_delay).await;
        render_summary(&game.view().await);
        if let Some(flow) = summary_choice(rl, game).await? {
            return Ok(flow);
        }
    }
}

/// Returns a flow when the player left instead of playing the round.
async fn start_round(rl: &mut Prompt, game: &GameSessionUseCase) -> Result<Option<Flow>> {
    loop {
        match game.start_round().await {
            Ok(()) => return Ok(None),
            Err(PlayError::Api(err)) => {
                println!("{}", format!("Couldn't load a round: {}", err).red());
                match input::read(rl, Screen::Round, "Press Enter to retry, or /menu to leave: ")? {
                    Input::Line(_) => continue,
                    Input::Back => return leave(game, Flow::Menu).await.map(Some),
                    Input::Quit => return leave(game, Flow::Quit).await.map(Some),
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
}

async fn guess_until_resolved(rl: &mut Prompt, game: &GameSessionUseCase) -> Result<Option<Flow>> {
    while !game.view().await.is_round_over() {
        let text = match input::read(rl, Screen::Round, "Your guess: ")? {
            Input::Line(text) if text.starts_with('/') => {
                println!("{}", "Type a country, or /menu to leave.".bright_black());
                continue;
            }
            Input::Line(text) => text,
            Input::Back => return leave(game, Flow::Menu).await.map(Some),
            Input::Quit => return leave(game, Flow::Quit).await.map(Some),
        };
        if text.is_empty() {
            continue;
        }

        match game.submit_guess(&text).await {
            Ok(()) => render_feedback(game.view().await.feedback()),
            Err(PlayError::Busy) => println!("{}", "Still checking your last guess...".yellow()),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(None)
}

async fn summary_choice(rl: &mut Prompt, game: &GameSessionUseCase) -> Result<Option<Flow>> {
    loop {
        match input::read(rl, Screen::Summary, "/continue, /new or /menu: ")? {
            Input::Line(cmd) if cmd == "/continue" => {
                game.continue_session().await?;
                announce_session(game.view().await.session().session_id.clone());
                return Ok(None);
            }
            Input::Line(cmd) if cmd == "/new" => {
                report_submission(game.new_game().await?);
                announce_session(game.view().await.session().session_id.clone());
                return Ok(None);
            }
            Input::Line(_) => continue,
            Input::Back => return leave(game, Flow::Menu).await.map(Some),
            Input::Quit => return leave(game, Flow::Quit).await.map(Some),
        }
    }
}

/// Submits the score if eligible and tears the screen down.
async fn leave(game: &GameSessionUseCase, flow: Flow) -> Result<Flow> {
    report_submission(game.return_to_menu().await?);
    Ok(flow)
}

async fn wait_for_summary(game: &GameSessionUseCase, delay: Duration) {
    let deadline = tokio::time::Instant::now() + delay + Duration::from_secs(1);
    while !game.view().await.is_summary_visible() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(SUMMARY_POLL).await;
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn title(view: &RoundLifecycle) -> String {
    let mode = view.settings().mode.to_string();
    let mut chars = mode.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => mode,
    }
}

fn announce_session(session_id: Option<String>) {
    match session_id {
        Some(id) => println!("{}", format!("Session {}", id).bright_black()),
        None => println!(
            "{}",
            "Playing offline: this session's score won't reach the leaderboard.".yellow()
        ),
    }
}

fn report_submission(status: SubmitStatus) {
    if status == SubmitStatus::Failed {
        println!("{}", "Could not submit score to leaderboard.".yellow());
    }
}

fn render_round(view: &RoundLifecycle) {
    let Some(round) = view.current_round() else {
        return;
    };
    println!();
    println!(
        "{}  {}  {}",
        format!(
            "Round {}/{}",
            view.session().round_number,
            view.settings().total_rounds
        )
        .bright_magenta()
        .bold(),
        format!("Score {}", view.session().score).bright_white(),
        format!("High score {}", view.high_score().value()).bright_black(),
    );
    println!("{}", round.image_url.bright_blue().underline());
    println!("{}", round.attribution().bright_black());
}

fn render_feedback(feedback: &str) {
    if feedback.is_empty() {
        return;
    }
    if feedback.starts_with('✅') {
        println!("{}", feedback.bright_green());
    } else {
        println!("{}", feedback.bright_red());
    }
}

fn render_summary(view: &RoundLifecycle) {
    let session = view.session();
    println!();
    println!("{}", "=== Session summary ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Correct: {}/{}   Score: {}   High score: {}",
            session.correct_answers,
            view.settings().total_rounds,
            session.score,
            view.high_score().value()
        )
        .bright_white()
    );
    if let Phase::Summary { round, outcome } = view.phase() {
        let last = match outcome {
            RoundOutcome::Correct { attempt, points } => {
                format!("Last round: {} on guess {} (+{})", round.display_name(), attempt, points)
            }
            RoundOutcome::Missed { .. } => {
                format!("Last round: {} ({})", round.display_name(), round.coordinates)
            }
        };
        println!("{}", last.bright_black());
    }
}
