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

//! In-memory `ChatClient` used by tests, and as a fallback when no Discord
//! token is configured. Never deletes state on its own; tests call
//! `remove_message`/`remove_thread` to simulate the chat backend forgetting
//! about something.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{Button, ChannelKind, ChatClient, ChatError, ChatMessage, ChatResult, Embed, ThreadId};

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub channel_id: String,
    pub embed: Embed,
    pub buttons: Vec<Button>,
}

#[derive(Default)]
pub struct InMemoryChatClient {
    next_id: AtomicU64,
    messages: DashMap<String, StoredMessage>,
    threads: DashMap<String, Vec<String>>,
    channel_posts: DashMap<String, Vec<String>>,
    channels: DashMap<String, ChannelKind>,
}

impl InMemoryChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(self, channel_id: &str, kind: ChannelKind) -> Self {
        self.channels.insert(channel_id.to_string(), kind);
        self
    }

    pub fn thread_posts(&self, thread_id: &ThreadId) -> Vec<String> {
        self.threads.get(&thread_id.0).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn channel_posts(&self, channel_id: &str) -> Vec<String> {
        self.channel_posts.get(channel_id).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn remove_message(&self, message_id: &str) {
        self.messages.remove(message_id);
    }

    pub fn remove_thread(&self, thread_id: &ThreadId) {
        self.threads.remove(&thread_id.0);
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{n}")
    }
}

#[async_trait]
impl ChatClient for InMemoryChatClient {
    async fn send_message(
        &self,
        channel_id: &str,
        embed: &Embed,
        buttons: &[Button],
    ) -> ChatResult<ChatMessage> {
        if !self.channels.contains_key(channel_id) {
            self.channels.insert(channel_id.to_string(), ChannelKind::Text);
        }
        let message_id = self.next_id("msg");
        self.messages.insert(
            message_id.clone(),
            StoredMessage {
                channel_id: channel_id.to_string(),
                embed: embed.clone(),
                buttons: buttons.to_vec(),
            },
        );
        Ok(ChatMessage { message_id })
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        embed: &Embed,
        buttons: &[Button],
    ) -> ChatResult<()> {
        match self.messages.get_mut(message_id) {
            Some(mut existing) => {
                existing.channel_id = channel_id.to_string();
                existing.embed = embed.clone();
                existing.buttons = buttons.to_vec();
                Ok(())
            }
            None => Err(ChatError::MessageGone(message_id.to_string())),
        }
    }

    async fn create_thread(
        &self,
        _channel_id: &str,
        message_id: &str,
        _name: &str,
    ) -> ChatResult<ThreadId> {
        let thread_id = ThreadId(self.next_id("thread"));
        self.threads.insert(thread_id.0.clone(), Vec::new());
        let _ = message_id;
        Ok(thread_id)
    }

    async fn post_in_thread(&self, thread_id: &ThreadId, content: &str) -> ChatResult<()> {
        match self.threads.get_mut(&thread_id.0) {
            Some(mut posts) => {
                posts.push(content.to_string());
                Ok(())
            }
            None => Err(ChatError::ThreadNotAccessible(thread_id.0.clone())),
        }
    }

    async fn post_in_channel(&self, channel_id: &str, content: &str) -> ChatResult<()> {
        self.channel_posts
            .entry(channel_id.to_string())
            .or_default()
            .push(content.to_string());
        Ok(())
    }

    async fn fetch_message(&self, _channel_id: &str, message_id: &str) -> Option<ChatMessage> {
        self.messages
            .get(message_id)
            .map(|_| ChatMessage { message_id: message_id.to_string() })
    }

    async fn fetch_channel(&self, channel_id: &str) -> Option<ChannelKind> {
        self.channels.get(channel_id).map(|k| *k)
    }

    async fn fetch_thread(&self, thread_id: &ThreadId) -> Option<()> {
        self.threads.get(&thread_id.0).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embed() -> Embed {
        Embed {
            title: "t".to_string(),
            description: "d".to_string(),
            color: 0,
            fields: vec![],
            thumbnail_url: None,
        }
    }

    #[tokio::test]
    async fn send_then_fetch_round_trips() {
        let client = InMemoryChatClient::new();
        let msg = client.send_message("chan-1", &embed(), &[]).await.unwrap();
        let fetched = client.fetch_message("chan-1", &msg.message_id).await;
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn edit_missing_message_returns_gone() {
        let client = InMemoryChatClient::new();
        let err = client
            .edit_message("chan-1", "nonexistent", &embed(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MessageGone(_)));
    }

    #[tokio::test]
    async fn thread_posts_accumulate() {
        let client = InMemoryChatClient::new();
        let msg = client.send_message("chan-1", &embed(), &[]).await.unwrap();
        let thread = client
            .create_thread("chan-1", &msg.message_id, "Incident: x")
            .await
            .unwrap();
        client.post_in_thread(&thread, "repeated").await.unwrap();
        assert_eq!(client.thread_posts(&thread), vec!["repeated".to_string()]);
    }

    #[tokio::test]
    async fn removed_message_is_gone() {
        let client = InMemoryChatClient::new();
        let msg = client.send_message("chan-1", &embed(), &[]).await.unwrap();
        client.remove_message(&msg.message_id);
        assert!(client.fetch_message("chan-1", &msg.message_id).await.is_none());
    }
}
