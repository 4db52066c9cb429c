//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chanrank::models::ChannelInfo;
use chanrank::telegram::ChannelRef;
use chanrank::telegram::ChannelSource;
use chanrank::telegram::MediaBlob;
use chanrank::telegram::RemoteMessage;
use chanrank::telegram::RemoteReaction;
use chanrank::ChanRankError;
use chanrank::Result;
use chrono::TimeZone;
use chrono::Utc;

pub const CHANNEL_ID: i64 = 777;

pub fn channel() -> ChannelInfo {
    ChannelInfo {
        id: CHANNEL_ID,
        title: "Integration News".to_string(),
        username: Some("integration_news".to_string()),
    }
}

pub fn message(id: i64, day: u32, reactions: &[(&str, u64)]) -> RemoteMessage {
    RemoteMessage {
        id,
        date: Utc.with_ymd_and_hms(2026, 3, day, 8, 0, 0).unwrap(),
        text: Some(format!("post number {id}")),
        views: Some(1000 + id as u64),
        forwards: Some(id as u64),
        reactions: (!reactions.is_empty()).then(|| {
            reactions
                .iter()
                .map(|(e, count)| RemoteReaction {
                    emoticon: Some((*e).to_string()),
                    count: *count,
                })
                .collect()
        }),
        has_photo: false,
    }
}

/// Channel history served from memory, newest first
pub struct StaticSource {
    pub authorized: bool,
    pub history: Vec<RemoteMessage>,
    history_calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(history: Vec<RemoteMessage>) -> Self {
        Self {
            authorized: true,
            history,
            history_calls: AtomicUsize::new(0),
        }
    }

    pub fn logged_out() -> Self {
        Self {
            authorized: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

/// Three posts: 1 has the most hearts, 3 is the newest
pub fn sample_history() -> Vec<RemoteMessage> {
    vec![
        message(3, 20, &[("❤️", 3), ("🔥", 40)]),
        message(2, 10, &[]),
        message(1, 1, &[("❤️", 8), ("👍", 4)]),
    ]
}

#[async_trait]
impl ChannelSource for StaticSource {
    async fn is_authorized(&self) -> Result<bool> {
        Ok(self.authorized)
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>> {
        if !self.authorized {
            return Err(ChanRankError::Unauthorized("logged out".to_string()));
        }
        Ok(vec![channel()])
    }

    async fn resolve_channel(&self, reference: &ChannelRef) -> Result<ChannelInfo> {
        let ch = channel();
        let found = match reference {
            ChannelRef::Id(id) => *id == ch.id,
            ChannelRef::Username(name) => ch.username.as_deref() == Some(name.as_str()),
        };
        if found && self.authorized {
            Ok(ch)
        } else {
            Err(ChanRankError::ChannelNotFound(reference.to_string()))
        }
    }

    async fn estimate_message_count(&self, _channel: &ChannelInfo) -> Result<u64> {
        Ok(self.history.len() as u64)
    }

    async fn history_page(
        &self,
        _channel: &ChannelInfo,
        offset_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<RemoteMessage>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .history
            .iter()
            .filter(|m| offset_id.map_or(true, |offset| m.id < offset))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn download_photo(
        &self,
        _channel: &ChannelInfo,
        _message_id: i64,
    ) -> Result<Option<MediaBlob>> {
        Ok(None)
    }

    async fn send_to_saved(&self, _text: &str, _photo: Option<&Path>) -> Result<()> {
        Ok(())
    }
}
