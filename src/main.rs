mod command;
mod config;
mod handler;
mod platform;
mod providers;
mod reply;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::handler::MovieBot;
use crate::providers::opensubtitles::{NoSubtitles, OpenSubtitlesClient};
use crate::providers::yts::YtsClient;
use crate::providers::SubtitleProvider;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,moviebot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Movies: {}", config.movies.base_url);
    info!("  Subtitles: {}", config.subtitles_enabled().is_some());
    info!("  Discord: {}", config.discord.is_some());
    info!("  Telegram: {}", config.telegram.is_some());

    // Providers share one HTTP client
    let http = providers::http_client(&config.http)?;
    let movies = Arc::new(YtsClient::new(http.clone(), config.movies.clone()));
    let subtitles: Arc<dyn SubtitleProvider> = match config.subtitles_enabled() {
        Some(subtitles) => Arc::new(OpenSubtitlesClient::new(http, subtitles.clone())),
        None => Arc::new(NoSubtitles),
    };

    let bot = Arc::new(MovieBot::new(movies, subtitles));

    info!("Bot is starting...");
    let discord = config.discord.filter(|d| !d.bot_token.is_empty());
    let telegram = config.telegram.filter(|t| !t.bot_token.is_empty());
    match (discord, telegram) {
        (Some(discord), Some(telegram)) => {
            // Stop as soon as either platform stops
            tokio::select! {
                result = platform::discord::run(bot.clone(), &discord.bot_token) => result?,
                result = platform::telegram::run(bot, &telegram.bot_token, telegram.allowed_user_ids) => result?,
            }
        }
        (Some(discord), None) => platform::discord::run(bot, &discord.bot_token).await?,
        (None, Some(telegram)) => {
            platform::telegram::run(bot, &telegram.bot_token, telegram.allowed_user_ids).await?
        }
        (None, None) => anyhow::bail!("No platform configured"),
    }

    Ok(())
}
