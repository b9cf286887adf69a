//! AI duel screen.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use geofinder_application::{AiDuelUseCase, GuessOutcome, PlayError};
use geofinder_core::api::DuelApi;
use geofinder_core::duel::{DuelMatch, GuessResult, format_confidence, format_country};
use geofinder_core::round::attribution;

use crate::Flow;
use crate::input::{self, Input, Prompt, Screen};

pub async fn run(rl: &mut Prompt, api: Arc<dyn DuelApi>) -> Result<Flow> {
    println!("{}", "=== AI duel ===".bright_magenta().bold());
    let duel = AiDuelUseCase::new(api);
    if let Some(flow) = start(rl, &duel, false).await? {
        return Ok(flow);
    }

    loop {
        let view = duel.view().await;

        if view.is_completed() {
            render_final(&view);
            match input::read(rl, Screen::Duel, "/rematch or /menu: ")? {
                Input::Line(cmd) if cmd == "/rematch" => {
                    if let Some(flow) = start(rl, &duel, true).await? {
                        return Ok(flow);
                    }
                }
                Input::Line(_) => {}
                Input::Back => return Ok(Flow::Menu),
                Input::Quit => return Ok(Flow::Quit),
            }
            continue;
        }

        if view.awaiting_next_round() {
            match input::read(rl, Screen::Duel, "Press Enter for the next round... ")? {
                Input::Line(_) => {
                    duel.advance().await;
                }
                Input::Back => return Ok(Flow::Menu),
                Input::Quit => return Ok(Flow::Quit),
            }
            continue;
        }

        render_round(&view);
        let text = match input::read(rl, Screen::Duel, "Your guess: ")? {
            Input::Line(cmd) if cmd == "/rematch" => {
                if let Some(flow) = start(rl, &duel, true).await? {
                    return Ok(flow);
                }
                continue;
            }
            Input::Line(text) => text,
            Input::Back => return Ok(Flow::Menu),
            Input::Quit => return Ok(Flow::Quit),
        };

        match duel.submit_guess(&text).await {
            Ok(GuessOutcome::Scored) => {
                if let Some(result) = duel.view().await.latest_result() {
                    render_result(result);
                }
            }
            Ok(GuessOutcome::Reconciled(_)) | Err(PlayError::Rejected(_)) => {
                if let Some(message) = duel.view().await.error_message() {
                    println!("{}", message.yellow());
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Starts (or restarts) the match, offering a retry on failure.
async fn start(rl: &mut Prompt, duel: &AiDuelUseCase, rematch: bool) -> Result<Option<Flow>> {
    loop {
        println!("{}", "Setting up the match...".bright_black());
        let started = if rematch {
            duel.rematch().await
        } else {
            duel.start().await
        };
        if started.is_ok() {
            return Ok(None);
        }

        let view = duel.view().await;
        if let Some(message) = view.error_message() {
            println!("{}", message.red());
        }
        match input::read(rl, Screen::Duel, "Press Enter to retry, or /menu to leave: ")? {
            Input::Line(_) => continue,
            Input::Back => return Ok(Some(Flow::Menu)),
            Input::Quit => return Ok(Some(Flow::Quit)),
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn scoreline(view: &DuelMatch) -> String {
    let scores = view.scores();
    format!("You {} : {} AI", scores.player, scores.ai)
}

fn render_round(view: &DuelMatch) {
    let Some(round) = view.current_round() else {
        return;
    };
    println!();
    println!(
        "{}  {}",
        view.round_label()
            .unwrap_or_default()
            .bright_magenta()
            .bold(),
        scoreline(view).bright_white()
    );
    println!("{}", round.image_url.bright_blue().underline());
    println!("{}", attribution(round.contributor.as_deref()).bright_black());
}

fn render_result(result: &GuessResult) {
    let correct = format_country(
        result
            .correct_country
            .as_ref()
            .and_then(|c| c.name.as_deref().or(c.code.as_deref())),
    );
    let location = result
        .coordinates
        .as_ref()
        .and_then(|c| c.resolve())
        .map(|c| format!(" ({})", c))
        .unwrap_or_default();
    println!("{}", format!("It was {}{}", correct, location).bright_white());

    if let Some(player) = &result.player_result {
        let line = format!("You: {}", format_country(player.guess.as_deref()));
        if player.is_correct {
            println!("{}", format!("{} ✅", line).bright_green());
        } else {
            println!("{}", format!("{} ❌", line).bright_red());
        }
    }

    if let Some(ai) = &result.ai_result {
        let line = format!(
            "AI: {} ({} confident)",
            format_country(ai.country_name.as_deref()),
            format_confidence(ai.confidence)
        );
        if ai.is_correct {
            println!("{}", format!("{} ✅", line).bright_green());
        } else {
            println!("{}", format!("{} ❌", line).bright_red());
        }
        if let Some(explanation) = ai.explanation.as_deref().filter(|e| !e.trim().is_empty()) {
            println!("{}", format!("  \"{}\"", explanation.trim()).bright_blue());
        }
    }

    if let Some(contributor) = result.contributor.as_deref() {
        println!("{}", attribution(Some(contributor)).bright_black());
    }
}

fn render_final(view: &DuelMatch) {
    println!();
    println!("{}", "=== Match over ===".bright_magenta().bold());
    if let Some(result) = view.latest_result() {
        render_result(result);
    }
    let scores = view.scores();
    let verdict = match scores.player.cmp(&scores.ai) {
        std::cmp::Ordering::Greater => "You beat the AI!".bright_green(),
        std::cmp::Ordering::Less => "The AI wins this one.".bright_red(),
        std::cmp::Ordering::Equal => "It's a draw.".bright_yellow(),
    };
    println!("{}  {}", scoreline(view).bright_white(), verdict);
    if let Some(message) = view.error_message() {
        println!("{}", message.yellow());
    }
}
