mod duel;
mod game;
mod input;
mod leaderboard;

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use geofinder_application::{BackgroundRotationService, LeaderboardService};
use geofinder_core::config::ClientConfig;
use geofinder_core::round::GameMode;
use geofinder_core::session::SessionSettings;
use geofinder_core::store::LocalStore;
use geofinder_infrastructure::{
    BackgroundCacheRepository, ConfigStorage, FileKeyValueStore, GeoPaths, HighScoreRepository,
    SessionIdRepository,
};
use geofinder_interaction::GeoApiClient;

use crate::input::{Input, Screen};

/// Where a screen hands control back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Menu,
    Quit,
}

/// Logs go to a daily file so they never interleave with the prompt.
fn init_tracing(paths: &GeoPaths, level: &str) -> Result<WorkerGuard> {
    let appender = tracing_appender::rolling::daily(paths.log_dir(), "geofinder.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(guard)
}

struct App {
    config: ClientConfig,
    client: Arc<GeoApiClient>,
    store: Arc<dyn LocalStore>,
}

impl App {
    fn settings(&self, mode: GameMode) -> SessionSettings {
        SessionSettings::from_config(&self.config.game, mode)
    }

    fn print_menu(&self) {
        let high_scores = HighScoreRepository::new(self.store.clone());
        println!();
        println!("{}", "=== GeoFinder ===".bright_magenta().bold());

        let backgrounds = BackgroundRotationService::new(
            BackgroundCacheRepository::new(self.store.clone()),
            &self.config.background,
        );
        if let Some(index) = backgrounds.next() {
            println!("{}", format!("Background #{}", index + 1).bright_black());
        }

        println!(
            "{}",
            format!(
                "High scores: photo {}, panorama {}",
                high_scores.load(GameMode::Photo).value(),
                high_scores.load(GameMode::Panorama).value()
            )
            .bright_white()
        );
        println!("{}", Screen::Menu.usage().bright_black());
    }

    async fn dispatch(&self, rl: &mut input::Prompt, command: &str) -> Result<Flow> {
        match command {
            "/photo" => {
                game::run(rl, self.client.clone(), self.store.clone(), self.settings(GameMode::Photo))
                    .await
            }
            "/pano" => {
                game::run(
                    rl,
                    self.client.clone(),
                    self.store.clone(),
                    self.settings(GameMode::Panorama),
                )
                .await
            }
            "/duel" => duel::run(rl, self.client.clone()).await,
            "/leaderboard" => {
                let service = LeaderboardService::new(
                    self.client.clone(),
                    SessionIdRepository::new(self.store.clone()),
                );
                leaderboard::show(&service, self.config.leaderboard.limit).await;
                Ok(Flow::Menu)
            }
            "/help" | "" => Ok(Flow::Menu),
            other => {
                println!("{}", format!("Unknown command: {}", other).bright_black());
                Ok(Flow::Menu)
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ===== Configuration =====
    let paths = GeoPaths::resolve()?;
    paths.ensure_dirs()?;
    let config_storage = ConfigStorage::new(paths.config_file());
    config_storage.ensure_exists()?;
    let config = config_storage.load_with_env()?;

    let _log_guard = init_tracing(&paths, &config.logging.level)?;
    info!(
        config = %config_storage.path().display(),
        base_url = %config.api.base_url,
        "[Main] Starting GeoFinder"
    );

    // ===== Backend Initialization =====
    let client = Arc::new(GeoApiClient::from_config(&config.api)?);
    let store: Arc<dyn LocalStore> = Arc::new(FileKeyValueStore::new(paths.store_dir()));
    let app = App {
        config,
        client,
        store,
    };

    // ===== Main Loop =====
    let mut rl = input::new_prompt()?;
    loop {
        app.print_menu();
        let flow = match input::read(&mut rl, Screen::Menu, ">> ")? {
            Input::Line(command) => app.dispatch(&mut rl, &command).await?,
            Input::Back => Flow::Menu,
            Input::Quit => Flow::Quit,
        };
        if flow == Flow::Quit {
            break;
        }
    }

    println!("{}", "Goodbye!".bright_green());
    info!("[Main] Exiting");
    Ok(())
}
