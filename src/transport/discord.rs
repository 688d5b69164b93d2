//! Discord delivery through direct messages

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serenity::http::Http;
use serenity::model::id::UserId;
use std::sync::Arc;

use super::Transport;

/// Sends reminder texts as DMs using the bot's HTTP client
#[derive(Clone)]
pub struct DiscordTransport {
    http: Arc<Http>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for DiscordTransport {
    async fn send(&self, user_id: &str, text: &str) -> Result<()> {
        let id = user_id
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("Invalid Discord user id: {}", user_id))?;

        let http: &Http = &self.http;
        let dm = UserId(id).create_dm_channel(http).await?;
        dm.send_message(http, |m| m.content(text)).await?;

        debug!("Delivered DM to user {user_id}");
        Ok(())
    }
}
