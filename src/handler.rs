use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tracing::{error, info};

use crate::command::Command;
use crate::platform::{IncomingMessage, Messenger};
use crate::providers::{MovieProvider, SubtitleProvider};
use crate::reply::{self, Reply};

/// Which collaborator failed while resolving a query
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("movie search failed: {0:#}")]
    MovieSearch(anyhow::Error),

    #[error("subtitle search failed: {0:#}")]
    SubtitleSearch(anyhow::Error),
}

/// Turns movie commands into replies.
/// Platform-agnostic: adapters deliver `IncomingMessage`s and provide a `Messenger`.
pub struct MovieBot {
    movies: Arc<dyn MovieProvider>,
    subtitles: Arc<dyn SubtitleProvider>,
}

impl MovieBot {
    pub fn new(movies: Arc<dyn MovieProvider>, subtitles: Arc<dyn SubtitleProvider>) -> Self {
        Self { movies, subtitles }
    }

    /// Search for `query` and build the reply for the best match
    pub async fn resolve(&self, query: &str) -> Result<Reply, ResolveError> {
        let movies = self
            .movies
            .search_movies(query)
            .await
            .map_err(ResolveError::MovieSearch)?;

        let Some((selected, also)) = movies.split_first() else {
            return Ok(Reply::no_results());
        };

        let subtitle = self
            .subtitles
            .search_subtitles(selected)
            .await
            .map_err(ResolveError::SubtitleSearch)?;

        let text = if also.is_empty() {
            reply::SINGLE_RESULT
        } else {
            reply::MULTIPLE_RESULTS
        };

        Ok(Reply {
            text: text.to_string(),
            embed: Some(reply::movie_embed(selected, subtitle.as_ref(), also)),
        })
    }

    /// Handle one incoming message. Non-commands are ignored without side effects.
    /// Only failures of the messenger itself are returned.
    pub async fn handle_message(
        &self,
        messenger: &dyn Messenger,
        incoming: &IncomingMessage,
    ) -> Result<()> {
        let Some(command) = Command::parse(&incoming.text) else {
            return Ok(());
        };

        info!(
            "{} command from {} ({}) on {}: {:?}",
            command.keyword, incoming.user_name, incoming.user_id, incoming.platform, command.query
        );

        let placeholder = messenger
            .send_text(&incoming.chat_id, reply::PLACEHOLDER)
            .await?;

        let reply = match self.resolve(&command.query).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error resolving {:?}: {}", command.query, e);
                Reply::failure()
            }
        };

        messenger.edit(&placeholder, &reply).await
    }

    /// Called once a platform connection is established
    pub fn handle_ready(&self, platform: &str, user_name: &str, user_id: &str) {
        info!("Logged in to {} as {} ({})", platform, user_name, user_id);
    }
}
