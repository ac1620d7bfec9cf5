use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::SubtitlesConfig;
use crate::providers::{Movie, Subtitle, SubtitleProvider};

#[derive(Debug, Deserialize)]
struct SubtitlesResponse {
    #[serde(default)]
    data: Vec<SubtitleEntry>,
}

#[derive(Debug, Deserialize)]
struct SubtitleEntry {
    attributes: SubtitleAttributes,
}

#[derive(Debug, Deserialize)]
struct SubtitleAttributes {
    #[serde(default)]
    language: String,
    url: String,
}

/// English display name for an ISO 639-1 code; unknown codes are returned unchanged.
fn language_name(code: &str) -> String {
    let name = match code {
        "ar" => "Arabic",
        "de" => "German",
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "he" => "Hebrew",
        "it" => "Italian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "nl" => "Dutch",
        "pl" => "Polish",
        "pt-BR" => "Portuguese (BR)",
        "pt-PT" => "Portuguese",
        "ru" => "Russian",
        "sv" => "Swedish",
        "tr" => "Turkish",
        "zh-CN" => "Chinese",
        other => other,
    };
    name.to_string()
}

/// OpenSubtitles expects the numeric part of an IMDB id
fn imdb_number(imdb_id: &str) -> Option<&str> {
    let digits = imdb_id.strip_prefix("tt").unwrap_or(imdb_id);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

fn first_subtitle(response: SubtitlesResponse) -> Option<Subtitle> {
    response.data.into_iter().next().map(|entry| Subtitle {
        language: language_name(&entry.attributes.language),
        download_url: entry.attributes.url,
    })
}

/// Subtitle search backed by the OpenSubtitles REST API
pub struct OpenSubtitlesClient {
    client: reqwest::Client,
    config: SubtitlesConfig,
}

impl OpenSubtitlesClient {
    pub fn new(client: reqwest::Client, config: SubtitlesConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SubtitleProvider for OpenSubtitlesClient {
    async fn search_subtitles(&self, movie: &Movie) -> Result<Option<Subtitle>> {
        let Some(imdb_id) = imdb_number(&movie.imdb_id) else {
            debug!("No IMDB id for '{}', skipping subtitle search", movie.title);
            return Ok(None);
        };

        let url = format!("{}/subtitles", self.config.base_url);

        debug!("Searching OpenSubtitles for {} ({})", movie.title, imdb_id);

        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.config.api_key)
            .query(&[
                ("imdb_id", imdb_id),
                ("languages", self.config.language.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenSubtitles")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenSubtitles API error ({}): {}", status, error_body);
        }

        let body: SubtitlesResponse = response
            .json()
            .await
            .context("Failed to parse OpenSubtitles response")?;

        Ok(first_subtitle(body))
    }
}

/// Used when no subtitle API key is configured
pub struct NoSubtitles;

#[async_trait]
impl SubtitleProvider for NoSubtitles {
    async fn search_subtitles(&self, _movie: &Movie) -> Result<Option<Subtitle>> {
        Ok(None)
    }
}
