use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub discord: Option<DiscordConfig>,
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub movies: MoviesConfig,
    pub subtitles: Option<SubtitlesConfig>,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Empty means every user may issue commands.
    #[serde(default)]
    pub allowed_user_ids: Vec<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MoviesConfig {
    #[serde(default = "default_movies_base_url")]
    pub base_url: String,
    #[serde(default = "default_movies_limit")]
    pub limit: u32,
}

impl Default for MoviesConfig {
    fn default() -> Self {
        Self {
            base_url: default_movies_base_url(),
            limit: default_movies_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubtitlesConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_subtitles_base_url")]
    pub base_url: String,
    #[serde(default = "default_subtitles_language")]
    pub language: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_movies_base_url() -> String {
    "https://yts.mx/api/v2".to_string()
}

fn default_movies_limit() -> u32 {
    10
}

fn default_subtitles_base_url() -> String {
    "https://api.opensubtitles.com/api/v1".to_string()
}

fn default_subtitles_language() -> String {
    "en".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("moviebot v{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Subtitle settings, or None when lookups are disabled (no section or empty key).
    pub fn subtitles_enabled(&self) -> Option<&SubtitlesConfig> {
        self.subtitles.as_ref().filter(|s| !s.api_key.is_empty())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        let discord = config
            .discord
            .as_ref()
            .is_some_and(|d| !d.bot_token.is_empty());
        let telegram = config
            .telegram
            .as_ref()
            .is_some_and(|t| !t.bot_token.is_empty());
        if !discord && !telegram {
            anyhow::bail!(
                "No platform configured: add a [discord] or [telegram] section with a bot_token"
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discord_only_uses_defaults() {
        let config = Config::parse(
            r#"
            [discord]
            bot_token = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.discord.unwrap().bot_token, "abc");
        assert!(config.telegram.is_none());
        assert_eq!(config.movies.base_url, "https://yts.mx/api/v2");
        assert_eq!(config.movies.limit, 10);
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
        assert!(config.http.user_agent.starts_with("moviebot v"));
    }

    #[test]
    fn test_missing_platform_is_rejected() {
        let err = Config::parse(
            r#"
            [movies]
            limit = 5
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("No platform configured"));
    }

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(Config::parse("[discord]\nbot_token = \"\"\n").is_err());
    }

    #[test]
    fn test_telegram_allow_list_defaults_to_empty() {
        let config = Config::parse("[telegram]\nbot_token = \"t\"\n").unwrap();
        assert!(config.telegram.unwrap().allowed_user_ids.is_empty());
    }

    #[test]
    fn test_subtitles_disabled_without_key() {
        let config = Config::parse(
            r#"
            [discord]
            bot_token = "abc"

            [subtitles]
            language = "fr"
            "#,
        )
        .unwrap();
        assert!(config.subtitles_enabled().is_none());
    }

    #[test]
    fn test_subtitles_enabled_with_key() {
        let config = Config::parse(
            r#"
            [discord]
            bot_token = "abc"

            [subtitles]
            api_key = "k"
            "#,
        )
        .unwrap();
        let subs = config.subtitles_enabled().unwrap();
        assert_eq!(subs.language, "en");
        assert_eq!(subs.base_url, "https://api.opensubtitles.com/api/v1");
    }
}
