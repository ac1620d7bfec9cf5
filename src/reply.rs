use crate::providers::{Movie, Subtitle};

pub const NO_RESULTS: &str = "Sorry, I didn't find anything.";
pub const SINGLE_RESULT: &str = "Got It!";
pub const MULTIPLE_RESULTS: &str = "Found some, here is the best one";
pub const FAILURE: &str = "Oops. Something went wrong.";
pub const PLACEHOLDER: &str = "Processing...";

/// Rich content attached to a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    /// Markdown, e.g. "[Download](https://...)"
    pub value: String,
    pub inline: bool,
}

/// The final content of the placeholder message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub embed: Option<Embed>,
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            embed: None,
        }
    }

    pub fn no_results() -> Self {
        Self::text(NO_RESULTS)
    }

    pub fn failure() -> Self {
        Self::text(FAILURE)
    }
}

fn markdown_link(label: &str, url: &str) -> String {
    format!("[{}]({})", label, url)
}

/// Build the embed for `movie`, listing `also` as "did you mean" suggestions.
pub fn movie_embed(movie: &Movie, subtitle: Option<&Subtitle>, also: &[Movie]) -> Embed {
    let description = format!(
        "{}\nView on {}",
        movie.description,
        markdown_link(
            "IMDB",
            &format!("https://www.imdb.com/title/{}", movie.imdb_id)
        )
    );

    // Downloads each get their own line; the subtitle field stays inline.
    let mut fields: Vec<EmbedField> = movie
        .downloads
        .iter()
        .map(|download| EmbedField {
            name: download.title.clone(),
            value: markdown_link("Download", &download.url),
            inline: false,
        })
        .collect();

    if let Some(subtitle) = subtitle {
        fields.push(EmbedField {
            name: format!("{} Subtitles", subtitle.language),
            value: markdown_link("Download Subs", &subtitle.download_url),
            inline: true,
        });
    }

    let footer = if also.is_empty() {
        None
    } else {
        let options = also
            .iter()
            .map(|m| format!("{} ({})", m.title, m.year))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("Did you mean:\n{}", options))
    };

    Embed {
        title: format!("{} | {}", movie.title, movie.year),
        description,
        thumbnail: movie.thumbnail.clone(),
        fields,
        footer,
    }
}
