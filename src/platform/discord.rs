use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::all::{
    ChannelId, Client, Context, CreateEmbed, CreateEmbedFooter, EditMessage, EventHandler,
    GatewayIntents, Http, Message, MessageId, Ready,
};
use tracing::{error, info};

use crate::handler::MovieBot;
use crate::platform::{IncomingMessage, Messenger, SentMessage};
use crate::reply::{Embed, Reply};

fn build_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new()
        .title(&embed.title)
        .description(&embed.description);
    if !embed.thumbnail.is_empty() {
        builder = builder.thumbnail(&embed.thumbnail);
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(ref footer) = embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    builder
}

/// The edit that turns the placeholder into `reply`; no embed clears any existing one.
fn edit_builder(reply: &Reply) -> EditMessage {
    let builder = EditMessage::new().content(&reply.text);
    match reply.embed {
        Some(ref embed) => builder.embed(build_embed(embed)),
        None => builder.embeds(Vec::new()),
    }
}

fn parse_id(id: &str) -> Result<u64> {
    id.parse()
        .with_context(|| format!("Invalid Discord id: {}", id))
}

/// Sends and edits messages through Discord's HTTP API
pub struct DiscordMessenger {
    http: Arc<Http>,
}

#[async_trait]
impl Messenger for DiscordMessenger {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<SentMessage> {
        let channel = ChannelId::new(parse_id(chat_id)?);
        let message = channel
            .say(&self.http, text)
            .await
            .context("Failed to send Discord message")?;
        Ok(SentMessage {
            chat_id: chat_id.to_string(),
            message_id: message.id.get().to_string(),
        })
    }

    async fn edit(&self, message: &SentMessage, reply: &Reply) -> Result<()> {
        let channel = ChannelId::new(parse_id(&message.chat_id)?);
        let message_id = MessageId::new(parse_id(&message.message_id)?);

        channel
            .edit_message(&self.http, message_id, edit_builder(reply))
            .await
            .context("Failed to edit Discord message")?;
        Ok(())
    }
}

struct Handler {
    bot: Arc<MovieBot>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let incoming = IncomingMessage {
            platform: "discord".to_string(),
            user_id: msg.author.id.get().to_string(),
            chat_id: msg.channel_id.get().to_string(),
            user_name: msg.author.name.clone(),
            text: msg.content.clone(),
        };

        let messenger = DiscordMessenger {
            http: ctx.http.clone(),
        };

        if let Err(e) = self.bot.handle_message(&messenger, &incoming).await {
            error!("Error handling Discord message: {:#}", e);
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.bot
            .handle_ready("discord", &ready.user.name, &ready.user.id.get().to_string());
    }
}

/// Run the Discord platform until the gateway connection ends
pub async fn run(bot: Arc<MovieBot>, token: &str) -> Result<()> {
    info!("Starting Discord platform...");

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler { bot })
        .await
        .context("Failed to create Discord client")?;

    client
        .start()
        .await
        .context("Discord client stopped with an error")?;

    Ok(())
}
