use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::EditMessageTextSetters;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use teloxide::utils::html;
use tracing::{error, info, warn};

use crate::handler::MovieBot;
use crate::platform::{IncomingMessage, Messenger, SentMessage};
use crate::reply::{Embed, Reply};

/// Telegram's limit on message text, in UTF-16 code units
const MAX_MESSAGE_LEN: usize = 4096;

/// Anchor tag; the URL sits in a double-quoted attribute.
fn anchor(url: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        html::escape(url).replace('"', "&quot;"),
        html::escape(label)
    )
}

/// Split `[label](url)rest` into its parts. The label ends at the first `]`,
/// which must be followed directly by `(`.
fn split_link(text: &str) -> Option<(&str, &str, &str)> {
    let close = text.find(']')?;
    let label = &text[..close];
    if label.contains('[') {
        return None;
    }
    let after = text[close + 1..].strip_prefix('(')?;
    let end = after.find(')')?;
    Some((label, &after[..end], &after[end + 1..]))
}

/// HTML-escape `text`, turning markdown links `[label](url)` into anchors
fn markdown_to_html(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        out.push_str(&html::escape(&rest[..open]));
        let tail = &rest[open + 1..];
        match split_link(tail) {
            Some((label, url, remaining)) => {
                out.push_str(&anchor(url, label));
                rest = remaining;
            }
            None => {
                out.push('[');
                rest = tail;
            }
        }
    }

    out.push_str(&html::escape(rest));
    out
}

fn render_with_description(reply: &Reply, embed: &Embed, description: &str) -> String {
    let mut text = html::escape(&reply.text);

    text.push_str("\n\n");
    text.push_str(&html::bold(&html::escape(&embed.title)));
    text.push('\n');
    text.push_str(&markdown_to_html(description));

    if !embed.fields.is_empty() {
        text.push('\n');
    }
    for field in &embed.fields {
        text.push('\n');
        text.push_str(&html::bold(&html::escape(&field.name)));
        text.push_str(": ");
        text.push_str(&markdown_to_html(&field.value));
    }

    if let Some(ref footer) = embed.footer {
        text.push_str("\n\n");
        text.push_str(&html::italic(&html::escape(footer)));
    }

    text
}

/// Cut at least `excess` characters from the end of the description body.
/// The last line, which carries the IMDB link, is kept.
fn shorten_description(description: &str, excess: usize) -> String {
    let (body, link) = match description.rsplit_once('\n') {
        Some((body, link)) => (body, Some(link)),
        None => (description, None),
    };

    let keep = body.chars().count().saturating_sub(excess + 1);
    let mut shorter: String = body.chars().take(keep).collect();
    shorter.push('…');
    if let Some(link) = link {
        shorter.push('\n');
        shorter.push_str(link);
    }
    shorter
}

/// Telegram text messages have no embeds, so the embed is flattened into HTML.
/// Long descriptions are shortened to keep the message within Telegram's limit.
fn render_html(reply: &Reply) -> String {
    let Some(ref embed) = reply.embed else {
        return html::escape(&reply.text);
    };

    let mut description = embed.description.clone();
    loop {
        let text = render_with_description(reply, embed, &description);
        let len = text.encode_utf16().count();
        if len <= MAX_MESSAGE_LEN {
            return text;
        }
        let shorter = shorten_description(&description, len - MAX_MESSAGE_LEN);
        if shorter == description {
            return text;
        }
        description = shorter;
    }
}

/// Sends and edits messages through the Telegram Bot API
pub struct TelegramMessenger {
    bot: Bot,
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<SentMessage> {
        let chat: i64 = chat_id
            .parse()
            .with_context(|| format!("Invalid Telegram chat id: {}", chat_id))?;
        let message = self
            .bot
            .send_message(ChatId(chat), text)
            .await
            .context("Failed to send Telegram message")?;
        Ok(SentMessage {
            chat_id: chat_id.to_string(),
            message_id: message.id.0.to_string(),
        })
    }

    async fn edit(&self, message: &SentMessage, reply: &Reply) -> Result<()> {
        let chat: i64 = message
            .chat_id
            .parse()
            .with_context(|| format!("Invalid Telegram chat id: {}", message.chat_id))?;
        let message_id: i32 = message
            .message_id
            .parse()
            .with_context(|| format!("Invalid Telegram message id: {}", message.message_id))?;

        self.bot
            .edit_message_text(ChatId(chat), MessageId(message_id), render_html(reply))
            .parse_mode(ParseMode::Html)
            .await
            .context("Failed to edit Telegram message")?;
        Ok(())
    }
}

/// Run the Telegram platform
pub async fn run(movie_bot: Arc<MovieBot>, token: &str, allowed_user_ids: Vec<u64>) -> Result<()> {
    let bot = Bot::new(token);

    info!("Starting Telegram platform...");

    let me = bot.get_me().await.context("Failed to connect to Telegram")?;
    movie_bot.handle_ready("telegram", me.username(), &me.id.0.to_string());

    let handler = Update::filter_message()
        .filter_map(move |msg: Message| {
            let user = msg.from.as_ref()?;
            if allowed_user_ids.is_empty() || allowed_user_ids.contains(&user.id.0) {
                Some(msg)
            } else {
                None
            }
        })
        .endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![movie_bot])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, movie_bot: Arc<MovieBot>) -> ResponseResult<()> {
    let user = match msg.from.as_ref() {
        Some(user) => user,
        None => return Ok(()),
    };

    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    let incoming = IncomingMessage {
        platform: "telegram".to_string(),
        user_id: user.id.0.to_string(),
        chat_id: msg.chat.id.0.to_string(),
        user_name: user.first_name.clone(),
        text,
    };

    let messenger = TelegramMessenger { bot };
    if let Err(e) = movie_bot.handle_message(&messenger, &incoming).await {
        error!("Error handling Telegram message: {:#}", e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::EmbedField;

    #[test]
    fn test_markdown_links_become_anchors() {
        assert_eq!(
            markdown_to_html("View on [IMDB](https://www.imdb.com/title/tt1)"),
            "View on <a href=\"https://www.imdb.com/title/tt1\">IMDB</a>"
        );
    }

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(markdown_to_html("Tom & Jerry <3"), "Tom &amp; Jerry &lt;3");
    }

    #[test]
    fn test_unterminated_link_is_left_as_text() {
        assert_eq!(markdown_to_html("[Download](http://d/1"), "[Download](http://d/1");
        assert_eq!(markdown_to_html("a [b c"), "a [b c");
    }

    #[test]
    fn test_text_only_reply() {
        assert_eq!(
            render_html(&Reply::no_results()),
            "Sorry, I didn't find anything."
        );
    }

    #[test]
    fn test_embed_is_flattened() {
        let reply = Reply {
            text: "Got It!".to_string(),
            embed: Some(Embed {
                title: "Inception | 2010".to_string(),
                description: "Dreams.\nView on [IMDB](https://www.imdb.com/title/tt1375666)"
                    .to_string(),
                thumbnail: "http://x/y.png".to_string(),
                fields: vec![EmbedField {
                    name: "720p".to_string(),
                    value: "[Download](http://d/1)".to_string(),
                    inline: false,
                }],
                footer: Some("Did you mean:\nInception 2 (2030)".to_string()),
            }),
        };

        assert_eq!(
            render_html(&reply),
            "Got It!\n\n\
             <b>Inception | 2010</b>\n\
             Dreams.\nView on <a href=\"https://www.imdb.com/title/tt1375666\">IMDB</a>\n\
             \n<b>720p</b>: <a href=\"http://d/1\">Download</a>\n\n\
             <i>Did you mean:\nInception 2 (2030)</i>"
        );
    }

    #[test]
    fn test_bracket_in_text_does_not_swallow_link() {
        assert_eq!(
            markdown_to_html("Based on [true] events.\nView on [IMDB](https://www.imdb.com/title/tt1)"),
            "Based on [true] events.\nView on <a href=\"https://www.imdb.com/title/tt1\">IMDB</a>"
        );
        assert_eq!(
            markdown_to_html("a [b [Download](http://d/1)"),
            "a [b <a href=\"http://d/1\">Download</a>"
        );
    }

    #[test]
    fn test_quote_in_url_is_escaped() {
        assert_eq!(
            markdown_to_html("[Download](http://d/\"x\")"),
            "<a href=\"http://d/&quot;x&quot;\">Download</a>"
        );
    }

    fn long_reply(description_body: String) -> Reply {
        Reply {
            text: "Got It!".to_string(),
            embed: Some(Embed {
                title: "Long | 2000".to_string(),
                description: format!(
                    "{}\nView on [IMDB](https://www.imdb.com/title/tt1)",
                    description_body
                ),
                thumbnail: String::new(),
                fields: vec![EmbedField {
                    name: "720p".to_string(),
                    value: "[Download](http://d/1)".to_string(),
                    inline: false,
                }],
                footer: None,
            }),
        }
    }

    #[test]
    fn test_long_description_is_shortened_to_fit() {
        let text = render_html(&long_reply("a".repeat(5000)));

        assert!(text.encode_utf16().count() <= MAX_MESSAGE_LEN);
        assert!(text.contains("a…\nView on <a href=\"https://www.imdb.com/title/tt1\">IMDB</a>"));
        assert!(text.ends_with("<b>720p</b>: <a href=\"http://d/1\">Download</a>"));
    }

    #[test]
    fn test_escaped_description_is_shortened_to_fit() {
        // Each '&' renders as five characters.
        let text = render_html(&long_reply("&".repeat(3000)));

        assert!(text.encode_utf16().count() <= MAX_MESSAGE_LEN);
        assert!(text.contains("IMDB</a>"));
    }

    #[test]
    fn test_short_description_is_untouched() {
        let text = render_html(&long_reply("Dreams.".to_string()));
        assert!(text.contains("Dreams.\nView on"));
        assert!(!text.contains('…'));
    }
}
