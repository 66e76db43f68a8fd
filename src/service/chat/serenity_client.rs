// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Production `ChatClient`, backed by `serenity`'s REST client. The gateway
//! connection is not needed: alerts are pushed in, buttons are driven by the
//! `/interactions` HTTP endpoint, so a bare `Http` client is enough.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateMessage, CreateThread, EditMessage,
};
use serenity::http::{Http, HttpError};
use serenity::model::channel::ChannelType;
use serenity::model::id::{ChannelId, MessageId};

use super::{Button, ButtonKind, ChannelKind, ChatClient, ChatError, ChatMessage, ChatResult, Embed, ThreadId};

pub struct SerenityChatClient {
    http: Arc<Http>,
}

impl SerenityChatClient {
    pub fn new(token: &str) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
        }
    }

    /// Confirms the token is accepted by Discord before the process declares
    /// itself ready. `Http::new` never talks to the network, so without this
    /// a bad token would surface as a confusing per-alert send failure instead
    /// of a clean startup error.
    pub async fn login_check(&self) -> Result<(), HttpError> {
        self.http.get_current_user().await.map(|_| ())
    }
}

fn build_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new()
        .title(&embed.title)
        .description(&embed.description)
        .colour(embed.color);

    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, false);
    }
    if let Some(url) = &embed.thumbnail_url {
        builder = builder.thumbnail(url);
    }
    builder
}

fn build_buttons(buttons: &[Button]) -> Vec<CreateActionRow> {
    if buttons.is_empty() {
        return Vec::new();
    }
    let row = buttons
        .iter()
        .map(|b| {
            let style = match b.kind {
                ButtonKind::Acknowledge => serenity::model::application::ButtonStyle::Primary,
                ButtonKind::Resolve => serenity::model::application::ButtonStyle::Success,
                ButtonKind::Troubleshoot => serenity::model::application::ButtonStyle::Secondary,
            };
            CreateButton::new(&b.custom_id).label(&b.label).style(style)
        })
        .collect::<Vec<_>>();
    vec![CreateActionRow::Buttons(row)]
}

/// Maps a `serenity` HTTP error to the narrow `ChatError` taxonomy. Discord's
/// 10003 (unknown channel) / 10008 (unknown message) codes are the "gone"
/// signals the chat mirror and reconciler branch on.
fn map_http_error(err: serenity::Error, context: &str) -> ChatError {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) => {
            match resp.error.code {
                10003 => ChatError::ChannelGone(context.to_string()),
                10008 => ChatError::MessageGone(context.to_string()),
                10011 | 10015 => ChatError::ThreadNotAccessible(context.to_string()),
                _ => ChatError::Transient(format!("{context}: {}", resp.error.message)),
            }
        }
        other => ChatError::Transient(format!("{context}: {other}")),
    }
}

#[async_trait]
impl ChatClient for SerenityChatClient {
    async fn send_message(
        &self,
        channel_id: &str,
        embed: &Embed,
        buttons: &[Button],
    ) -> ChatResult<ChatMessage> {
        let channel = ChannelId::new(channel_id.parse().unwrap_or_default());
        let mut builder = CreateMessage::new().embed(build_embed(embed));
        for row in build_buttons(buttons) {
            builder = builder.button_row(row);
        }
        let message = channel
            .send_message(&self.http, builder)
            .await
            .map_err(|e| map_http_error(e, channel_id))?;
        Ok(ChatMessage {
            message_id: message.id.to_string(),
        })
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        embed: &Embed,
        buttons: &[Button],
    ) -> ChatResult<()> {
        let channel = ChannelId::new(channel_id.parse().unwrap_or_default());
        let message = MessageId::new(message_id.parse().unwrap_or_default());
        let mut builder = EditMessage::new().embed(build_embed(embed));
        for row in build_buttons(buttons) {
            builder = builder.button_row(row);
        }
        channel
            .edit_message(&self.http, message, builder)
            .await
            .map_err(|e| map_http_error(e, message_id))?;
        Ok(())
    }

    async fn create_thread(
        &self,
        channel_id: &str,
        message_id: &str,
        name: &str,
    ) -> ChatResult<ThreadId> {
        let channel = ChannelId::new(channel_id.parse().unwrap_or_default());
        let message = MessageId::new(message_id.parse().unwrap_or_default());
        let builder = CreateThread::new(name).kind(ChannelType::PublicThread);
        let thread = channel
            .create_thread_from_message(&self.http, message, builder)
            .await
            .map_err(|e| map_http_error(e, channel_id))?;
        Ok(ThreadId(thread.id.to_string()))
    }

    async fn post_in_thread(&self, thread_id: &ThreadId, content: &str) -> ChatResult<()> {
        let thread = ChannelId::new(thread_id.0.parse().unwrap_or_default());
        thread
            .send_message(&self.http, CreateMessage::new().content(content))
            .await
            .map_err(|e| map_http_error(e, &thread_id.0))?;
        Ok(())
    }

    async fn post_in_channel(&self, channel_id: &str, content: &str) -> ChatResult<()> {
        let channel = ChannelId::new(channel_id.parse().unwrap_or_default());
        channel
            .send_message(&self.http, CreateMessage::new().content(content))
            .await
            .map_err(|e| map_http_error(e, channel_id))?;
        Ok(())
    }

    async fn fetch_message(&self, channel_id: &str, message_id: &str) -> Option<ChatMessage> {
        let channel = ChannelId::new(channel_id.parse().unwrap_or_default());
        let message = MessageId::new(message_id.parse().unwrap_or_default());
        channel
            .message(&self.http, message)
            .await
            .ok()
            .map(|m| ChatMessage {
                message_id: m.id.to_string(),
            })
    }

    async fn fetch_channel(&self, channel_id: &str) -> Option<ChannelKind> {
        let channel = ChannelId::new(channel_id.parse().unwrap_or_default());
        match channel.to_channel(&self.http).await {
            Ok(serenity::model::channel::Channel::Guild(c))
                if c.kind == ChannelType::Text || c.kind == ChannelType::News =>
            {
                Some(ChannelKind::Text)
            }
            Ok(serenity::model::channel::Channel::Private(_)) => Some(ChannelKind::Dm),
            Ok(_) => Some(ChannelKind::Other),
            Err(_) => None,
        }
    }

    async fn fetch_thread(&self, thread_id: &ThreadId) -> Option<()> {
        let channel = ChannelId::new(thread_id.0.parse().unwrap_or_default());
        channel.to_channel(&self.http).await.ok().map(|_| ())
    }
}
