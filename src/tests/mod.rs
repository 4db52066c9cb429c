//! Shared test fixtures
//!
//! `MockSource` is an in-memory `ChannelSource` that records how often each
//! remote call was made, so tests can assert that a cached path never
//! touched the network.


use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Utc;

use crate::models::ChannelInfo;
use crate::models::MessageRecord;
use crate::telegram::ChannelRef;
use crate::telegram::ChannelSource;
use crate::telegram::MediaBlob;
use crate::telegram::RemoteMessage;
use crate::telegram::RemoteReaction;
use crate::ChanRankError;
use crate::Result;

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Record with per-emoji details; `reactions` is left at 0 until recomputed
pub fn record(id: i64, details: &[(&str, u64)]) -> MessageRecord {
    let details: BTreeMap<String, u64> = details
        .iter()
        .map(|(e, c)| ((*e).to_string(), *c))
        .collect();
    let total = details.values().sum();
    MessageRecord {
        id,
        date: at(2026, 1, 15),
        text: format!("message {id}"),
        views: 100,
        forwards: 0,
        reactions: 0,
        reaction_details: Some(details),
        total_reactions: total,
        link: format!("https://t.me/test/{id}"),
        has_photo: false,
        image_path: None,
    }
}

/// Record without details whose `reactions` value is frozen
pub fn legacy_record(id: i64, reactions: u64) -> MessageRecord {
    MessageRecord {
        reactions,
        reaction_details: None,
        total_reactions: reactions,
        ..record(id, &[])
    }
}

pub fn channel() -> ChannelInfo {
    ChannelInfo {
        id: 4242,
        title: "Test Channel".to_string(),
        username: Some("test".to_string()),
    }
}

pub fn targets(emojis: &[&str]) -> Vec<String> {
    emojis.iter().map(|e| (*e).to_string()).collect()
}

pub fn remote(id: i64, reactions: Option<Vec<(&str, u64)>>, has_photo: bool) -> RemoteMessage {
    RemoteMessage {
        id,
        date: Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        text: Some(format!("remote {id}")),
        views: Some(10),
        forwards: None,
        reactions: reactions.map(|list| {
            list.into_iter()
                .map(|(e, count)| RemoteReaction {
                    emoticon: Some(e.to_string()),
                    count,
                })
                .collect()
        }),
        has_photo,
    }
}

/// In-memory channel source with call counters
#[derive(Default)]
pub struct MockSource {
    pub authorized: bool,
    pub channels: Vec<ChannelInfo>,
    /// Newest first, as the platform returns history
    pub history: Vec<RemoteMessage>,
    pub estimate: u64,
    /// Largest page the source returns regardless of the requested limit
    pub page_cap: Option<usize>,
    pub photos: HashMap<i64, Vec<u8>>,
    pub failing_photos: Vec<i64>,
    pub history_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub sent: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn authorized(history: Vec<RemoteMessage>) -> Self {
        Self {
            authorized: true,
            channels: vec![channel()],
            estimate: history.len() as u64,
            history,
            ..Self::default()
        }
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelSource for MockSource {
    async fn is_authorized(&self) -> Result<bool> {
        Ok(self.authorized)
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>> {
        Ok(self.channels.clone())
    }

    async fn resolve_channel(&self, reference: &ChannelRef) -> Result<ChannelInfo> {
        self.channels
            .iter()
            .find(|c| match reference {
                ChannelRef::Id(id) => c.id == *id,
                ChannelRef::Username(name) => c.username.as_deref() == Some(name.as_str()),
            })
            .cloned()
            .ok_or_else(|| ChanRankError::ChannelNotFound(reference.to_string()))
    }

    async fn estimate_message_count(&self, _channel: &ChannelInfo) -> Result<u64> {
        Ok(self.estimate)
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
            .take(self.page_cap.map_or(limit as usize, |cap| cap.min(limit as usize)))
            .cloned()
            .collect())
    }

    async fn download_photo(
        &self,
        _channel: &ChannelInfo,
        message_id: i64,
    ) -> Result<Option<MediaBlob>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_photos.contains(&message_id) {
            return Err(ChanRankError::RemoteAccess("FLOOD_WAIT".to_string()));
        }
        Ok(self.photos.get(&message_id).map(|bytes| MediaBlob {
            bytes: bytes.clone(),
            content_type: Some("image/jpeg".to_string()),
        }))
    }

    async fn send_to_saved(&self, text: &str, _photo: Option<&Path>) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
