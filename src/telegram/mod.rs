//! Telegram access
//!
//! This module contains everything that talks to the messaging platform:
//! - `ChannelSource`: the user-session operations the analysis core needs
//! - `client`: gateway-backed `ChannelSource` implementation
//! - `bot_api`: Bot API client used by the chat bot
//! - `fetcher`: normalization of remote messages into `MessageRecord`s

pub mod bot_api;
pub mod client;
pub mod fetcher;
pub mod types;

#[cfg(test)]
mod fetcher_tests;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

pub use bot_api::BotApiClient;
pub use client::UserApiClient;
pub use fetcher::fetch_channel_messages;
pub use fetcher::FetchOutcome;
pub use fetcher::FetchProgress;
pub use types::*;

use crate::config::ProxyConfig;
use crate::models::ChannelInfo;
use crate::Result;

/// User-session operations backed by the remote platform
#[async_trait]
pub trait ChannelSource: Send + Sync {
    async fn is_authorized(&self) -> Result<bool>;

    /// Channels the logged-in user has joined
    async fn list_channels(&self) -> Result<Vec<ChannelInfo>>;

    async fn resolve_channel(&self, reference: &ChannelRef) -> Result<ChannelInfo>;

    /// Estimated number of messages in the channel, 0 when unknown
    async fn estimate_message_count(&self, channel: &ChannelInfo) -> Result<u64>;

    /// Up to `limit` messages older than `offset_id`, newest first.
    /// An empty page marks the end of history.
    async fn history_page(
        &self,
        channel: &ChannelInfo,
        offset_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<RemoteMessage>>;

    /// Original photo of a message, `None` when the message has none
    async fn download_photo(&self, channel: &ChannelInfo, message_id: i64)
        -> Result<Option<MediaBlob>>;

    /// Post to the user's own Saved Messages, with an optional photo
    async fn send_to_saved(&self, text: &str, photo: Option<&Path>) -> Result<()>;
}

/// HTTP client shared by the gateway and Bot API clients
pub fn build_http_client(proxy: &ProxyConfig, timeout: Duration) -> Result<reqwest::Client> {
    proxy.validate()?;
    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(url) = proxy.url() {
        tracing::debug!("Using proxy {url}");
        builder = builder.proxy(reqwest::Proxy::all(&url)?);
    }
    Ok(builder.build()?)
}
