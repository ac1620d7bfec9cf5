use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::MoviesConfig;
use crate::providers::{Download, Movie, MovieProvider};

#[derive(Debug, Deserialize)]
struct ListMoviesResponse {
    status: String,
    #[serde(default)]
    status_message: String,
    data: Option<ListMoviesData>,
}

#[derive(Debug, Deserialize)]
struct ListMoviesData {
    /// Absent when nothing matched
    #[serde(default)]
    movies: Vec<YtsMovie>,
}

#[derive(Debug, Deserialize)]
struct YtsMovie {
    title: String,
    year: u32,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description_full: String,
    #[serde(default)]
    imdb_code: String,
    #[serde(default)]
    medium_cover_image: String,
    #[serde(default)]
    torrents: Vec<YtsTorrent>,
}

#[derive(Debug, Deserialize)]
struct YtsTorrent {
    url: String,
    quality: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    size: String,
}

impl From<YtsTorrent> for Download {
    fn from(torrent: YtsTorrent) -> Self {
        let mut title = torrent.quality;
        if !torrent.kind.is_empty() {
            title.push(' ');
            title.push_str(&torrent.kind);
        }
        if !torrent.size.is_empty() {
            title.push_str(&format!(" ({})", torrent.size));
        }
        Download {
            title,
            url: torrent.url,
        }
    }
}

impl From<YtsMovie> for Movie {
    fn from(movie: YtsMovie) -> Self {
        let description = if movie.description_full.is_empty() {
            movie.summary
        } else {
            movie.description_full
        };
        Movie {
            title: movie.title,
            year: movie.year,
            description,
            imdb_id: movie.imdb_code,
            thumbnail: movie.medium_cover_image,
            downloads: movie.torrents.into_iter().map(Download::from).collect(),
        }
    }
}

fn into_movies(response: ListMoviesResponse) -> Result<Vec<Movie>> {
    if response.status != "ok" {
        anyhow::bail!("YTS API error: {}", response.status_message);
    }
    Ok(response
        .data
        .map(|data| data.movies.into_iter().map(Movie::from).collect())
        .unwrap_or_default())
}

/// Movie search backed by the YTS `list_movies` endpoint
pub struct YtsClient {
    client: reqwest::Client,
    config: MoviesConfig,
}

impl YtsClient {
    pub fn new(client: reqwest::Client, config: MoviesConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl MovieProvider for YtsClient {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>> {
        let url = format!("{}/list_movies.json", self.config.base_url);

        debug!("Searching YTS for '{}': {}", query, url);

        let response = self
            .client
            .get(&url)
            .query(&[("query_term", query)])
            .query(&[("limit", self.config.limit)])
            .send()
            .await
            .context("Failed to send request to YTS")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("YTS API error ({}): {}", status, error_body);
        }

        let body: ListMoviesResponse = response
            .json()
            .await
            .context("Failed to parse YTS response")?;

        into_movies(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<Movie>> {
        into_movies(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_maps_movies_in_provider_order() {
        let movies = parse(
            r#"{
                "status": "ok",
                "status_message": "Query was successful",
                "data": {
                    "movie_count": 2,
                    "movies": [
                        {
                            "id": 1,
                            "title": "Inception",
                            "year": 2010,
                            "summary": "short",
                            "description_full": "A thief who steals corporate secrets.",
                            "imdb_code": "tt1375666",
                            "medium_cover_image": "http://x/y.png",
                            "torrents": [
                                {"url": "http://d/1", "quality": "720p", "type": "bluray", "size": "1.1 GB"},
                                {"url": "http://d/2", "quality": "1080p", "type": "web", "size": "2.0 GB"}
                            ]
                        },
                        {
                            "id": 2,
                            "title": "Inception: The Cobol Job",
                            "year": 2010,
                            "summary": "Prequel comic.",
                            "imdb_code": "tt5295894",
                            "medium_cover_image": "http://x/z.png"
                        }
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(movies.len(), 2);
        let first = &movies[0];
        assert_eq!(first.title, "Inception");
        assert_eq!(first.year, 2010);
        assert_eq!(first.description, "A thief who steals corporate secrets.");
        assert_eq!(first.imdb_id, "tt1375666");
        assert_eq!(first.thumbnail, "http://x/y.png");
        assert_eq!(
            first.downloads,
            vec![
                Download {
                    title: "720p bluray (1.1 GB)".to_string(),
                    url: "http://d/1".to_string(),
                },
                Download {
                    title: "1080p web (2.0 GB)".to_string(),
                    url: "http://d/2".to_string(),
                },
            ]
        );

        let second = &movies[1];
        assert_eq!(second.description, "Prequel comic.");
        assert!(second.downloads.is_empty());
    }

    #[test]
    fn test_no_movies_field_means_empty() {
        let movies = parse(
            r#"{"status": "ok", "status_message": "", "data": {"movie_count": 0, "limit": 10, "page_number": 1}}"#,
        )
        .unwrap();
        assert!(movies.is_empty());
    }

    #[test]
    fn test_error_status_is_a_failure() {
        let err = parse(r#"{"status": "error", "status_message": "Invalid query"}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid query"));
    }

    #[test]
    fn test_download_title_without_type_or_size() {
        let download = Download::from(YtsTorrent {
            url: "http://d/3".to_string(),
            quality: "3D".to_string(),
            kind: String::new(),
            size: String::new(),
        });
        assert_eq!(download.title, "3D");
    }
}
