use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

pub type Prompt = Editor<CliHelper, DefaultHistory>;

/// A slash command and the one-line blurb shown next to it when completing.
pub type Command = (&'static str, &'static str);

const MENU: &[Command] = &[
    ("/photo", "ten photo rounds"),
    ("/pano", "ten panorama rounds"),
    ("/duel", "five rounds against the AI"),
    ("/leaderboard", "top scores"),
    ("/help", "show the menu again"),
    ("/quit", "leave GeoFinder"),
];

const ROUND: &[Command] = &[
    ("/menu", "submit your score and leave"),
    ("/quit", "submit your score and exit"),
];

const SUMMARY: &[Command] = &[
    ("/continue", "keep your score, play ten more"),
    ("/new", "submit and start from zero"),
    ("/menu", "submit your score and leave"),
    ("/quit", "submit your score and exit"),
];

const DUEL: &[Command] = &[
    ("/rematch", "start a fresh match"),
    ("/menu", "leave the duel"),
    ("/quit", "exit"),
];

/// Which screen is reading input. Decides the commands offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Menu,
    /// Guessing, or waiting between rounds of a scored game.
    Round,
    Summary,
    Duel,
}

impl Screen {
    pub fn commands(self) -> &'static [Command] {
        match self {
            Screen::Menu => MENU,
            Screen::Round => ROUND,
            Screen::Summary => SUMMARY,
            Screen::Duel => DUEL,
        }
    }

    /// Commands on this screen starting with `prefix`.
    pub fn matching(self, prefix: &str) -> impl Iterator<Item = &'static Command> + '_ {
        self.commands()
            .iter()
            .filter(move |(name, _)| name.starts_with(prefix))
    }

    pub fn is_command(self, line: &str) -> bool {
        self.commands().iter().any(|(name, _)| *name == line)
    }

    /// Comma-separated command list for the menu banner.
    pub fn usage(self) -> String {
        let names: Vec<&str> = self.commands().iter().map(|(name, _)| *name).collect();
        names.join(", ")
    }
}

/// Completion, hints and highlighting for the current screen's commands.
/// Anything not starting with `/` is a guess and is left alone.
#[derive(Clone, Default)]
pub struct CliHelper {
    screen: Screen,
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = &line[..pos];
        if !typed.starts_with('/') {
            return Ok((0, Vec::new()));
        }
        let candidates = self
            .screen
            .matching(typed)
            .map(|(name, blurb)| Pair {
                display: format!("{:<14}{}", name, blurb),
                replacement: name.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        let command = line.trim_end();
        if self.screen.is_command(command) {
            Owned(line.bright_cyan().to_string())
        } else if self.screen.matching(command).next().is_some() {
            Owned(line.cyan().to_string())
        } else {
            Owned(line.bright_red().to_string())
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    /// Completes the command only while the prefix is unambiguous.
    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() || !line.starts_with('/') {
            return None;
        }
        let mut matches = self.screen.matching(line);
        let (name, _) = matches.next()?;
        if matches.next().is_some() || name.len() == line.len() {
            return None;
        }
        Some(name[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

pub fn new_prompt() -> Result<Prompt> {
    let mut rl = Prompt::new()?;
    rl.set_helper(Some(CliHelper::default()));
    Ok(rl)
}

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Trimmed text, possibly empty.
    Line(String),
    /// `/menu` or CTRL-C.
    Back,
    /// `/quit` or CTRL-D.
    Quit,
}

pub fn read(rl: &mut Prompt, screen: Screen, prompt: &str) -> Result<Input> {
    if let Some(helper) = rl.helper_mut() {
        helper.screen = screen;
    }
    match rl.readline(prompt) {
        Ok(line) => {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                let _ = rl.add_history_entry(trimmed);
            }
            Ok(match trimmed {
                "/menu" => Input::Back,
                "/quit" | "quit" | "exit" => Input::Quit,
                other => Input::Line(other.to_string()),
            })
        }
        Err(ReadlineError::Interrupted) => {
            println!("{}", "CTRL-C detected. Back to the menu.".yellow());
            Ok(Input::Back)
        }
        Err(ReadlineError::Eof) => Ok(Input::Quit),
        Err(err) => Err(err.into()),
    }
}
