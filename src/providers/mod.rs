pub mod opensubtitles;
pub mod yts;

use anyhow::{Context, Result};
use async_trait::async_trait;

/// A movie returned by a movie provider
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub title: String,
    pub year: u32,
    pub description: String,
    /// IMDB identifier, e.g. "tt1375666"
    pub imdb_id: String,
    pub thumbnail: String,
    pub downloads: Vec<Download>,
}

/// One downloadable release of a movie
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub title: String,
    pub url: String,
}

/// Subtitles found for a movie
#[derive(Debug, Clone, PartialEq)]
pub struct Subtitle {
    /// Display name of the language, e.g. "English"
    pub language: String,
    pub download_url: String,
}

/// Searches movies by free-text query. Order of the results is the provider's.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>>;
}

/// Looks up subtitles for a movie. `Ok(None)` means nothing was found.
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    async fn search_subtitles(&self, movie: &Movie) -> Result<Option<Subtitle>>;
}

/// Build the shared HTTP client used by every provider
pub fn http_client(config: &crate::config::HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .context("Failed to build HTTP client")
}
