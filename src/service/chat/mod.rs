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

//! The narrow seam to the chat backend. Production talks to Discord through
//! `serenity_client`; tests talk to `memory_client`. Nothing outside this
//! module (and its two implementations) is allowed to reference `serenity`
//! types directly.

pub mod memory_client;
pub mod mirror;
pub mod serenity_client;

use async_trait::async_trait;
use thiserror::Error;

use crate::common::meta::alert::Field;

#[derive(Debug, Clone)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<Field>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Acknowledge,
    Resolve,
    Troubleshoot,
}

#[derive(Debug, Clone)]
pub struct Button {
    pub kind: ButtonKind,
    pub label: String,
    pub custom_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Dm,
    Other,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("channel gone: {0}")]
    ChannelGone(String),
    #[error("message gone: {0}")]
    MessageGone(String),
    #[error("thread not accessible: {0}")]
    ThreadNotAccessible(String),
    #[error("transient chat API error: {0}")]
    Transient(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(
        &self,
        channel_id: &str,
        embed: &Embed,
        buttons: &[Button],
    ) -> ChatResult<ChatMessage>;

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        embed: &Embed,
        buttons: &[Button],
    ) -> ChatResult<()>;

    async fn create_thread(
        &self,
        channel_id: &str,
        message_id: &str,
        name: &str,
    ) -> ChatResult<ThreadId>;

    async fn post_in_thread(&self, thread_id: &ThreadId, content: &str) -> ChatResult<()>;

    async fn post_in_channel(&self, channel_id: &str, content: &str) -> ChatResult<()>;

    async fn fetch_message(&self, channel_id: &str, message_id: &str) -> Option<ChatMessage>;

    async fn fetch_channel(&self, channel_id: &str) -> Option<ChannelKind>;

    async fn fetch_thread(&self, thread_id: &ThreadId) -> Option<()>;
}
