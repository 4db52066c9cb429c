//! Channel history fetching and message normalization

use std::collections::BTreeMap;

use tracing::debug;
use tracing::info;

use super::types::RemoteMessage;
use super::ChannelSource;
use crate::models::ChannelInfo;
use crate::models::MessageRecord;
use crate::models::EMPTY_TEXT_PLACEHOLDER;
use crate::ChanRankError;
use crate::Result;

/// Characters of message text kept in a record
pub const TEXT_DISPLAY_LIMIT: usize = 100;

/// Messages requested per history page
pub const PAGE_SIZE: u32 = 100;

/// Progress snapshot emitted at each 10% boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    pub checked: u64,
    pub estimated_total: u64,
    /// 10, 20, ... 100
    pub percent: u8,
}

/// Result of a full history walk
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub messages: Vec<MessageRecord>,
    pub total_checked: u64,
}

/// Tracks which 10% boundaries of an estimate have been crossed
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    estimated_total: u64,
    last_decile: u64,
}

impl ProgressTracker {
    pub fn new(estimated_total: u64) -> Self {
        Self {
            estimated_total,
            last_decile: 0,
        }
    }

    /// Boundaries newly crossed after `checked` messages. Empty when the
    /// estimate is zero.
    pub fn observe(&mut self, checked: u64) -> Vec<FetchProgress> {
        if self.estimated_total == 0 {
            return Vec::new();
        }
        let decile = (checked.saturating_mul(10) / self.estimated_total).min(10);
        let crossed = (self.last_decile + 1..=decile)
            .map(|d| FetchProgress {
                checked,
                estimated_total: self.estimated_total,
                percent: (d * 10) as u8,
            })
            .collect();
        self.last_decile = self.last_decile.max(decile);
        crossed
    }
}

/// Truncate to [`TEXT_DISPLAY_LIMIT`] characters with `...`; placeholder for empty text
pub fn truncate_text(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => {
            if t.chars().count() > TEXT_DISPLAY_LIMIT {
                let head: String = t.chars().take(TEXT_DISPLAY_LIMIT).collect();
                format!("{head}...")
            } else {
                t.to_string()
            }
        }
        _ => EMPTY_TEXT_PLACEHOLDER.to_string(),
    }
}

/// Public `t.me/<username>/<id>` link, or the private `t.me/c/<channel>/<id>` form
pub fn message_link(channel: &ChannelInfo, message_id: i64) -> String {
    match &channel.username {
        Some(username) if !username.is_empty() => {
            format!("https://t.me/{username}/{message_id}")
        }
        _ => format!("https://t.me/c/{}/{message_id}", channel.id),
    }
}

/// Build a record for a message with at least one reaction, `None` otherwise
pub fn normalize_message(
    message: &RemoteMessage,
    channel: &ChannelInfo,
    target_emojis: &[String],
) -> Option<MessageRecord> {
    let reactions = message.reactions.as_deref().filter(|r| !r.is_empty())?;

    let mut details: BTreeMap<String, u64> = BTreeMap::new();
    for reaction in reactions {
        if let Some(emoticon) = &reaction.emoticon {
            *details.entry(emoticon.clone()).or_insert(0) += reaction.count;
        }
    }
    let total_reactions = reactions.iter().map(|r| r.count).sum();

    let mut record = MessageRecord {
        id: message.id,
        date: message.date.naive_utc(),
        text: truncate_text(message.text.as_deref()),
        views: message.views.unwrap_or(0),
        forwards: message.forwards.unwrap_or(0),
        reactions: 0,
        reaction_details: Some(details),
        total_reactions,
        link: message_link(channel, message.id),
        has_photo: message.has_photo,
        image_path: None,
    };
    record.reactions = record.target_total(target_emojis).unwrap_or(0);
    Some(record)
}

/// Walk the whole history of `channel` and keep every message with reactions.
///
/// `on_progress` is invoked at each 10% boundary of the estimated message
/// count. Any remote failure aborts the walk and discards what was collected.
pub async fn fetch_channel_messages(
    source: &dyn ChannelSource,
    channel: &ChannelInfo,
    target_emojis: &[String],
    on_progress: Option<&(dyn Fn(FetchProgress) + Send + Sync)>,
) -> Result<FetchOutcome> {
    if !source.is_authorized().await? {
        return Err(ChanRankError::Unauthorized(
            "user session is not logged in".to_string(),
        ));
    }

    let estimated_total = source.estimate_message_count(channel).await.unwrap_or_else(|e| {
        debug!("No message count estimate for {}: {e}", channel.title);
        0
    });
    let mut tracker = ProgressTracker::new(estimated_total);

    info!(
        "Fetching history of {} (~{} messages)",
        channel.title, estimated_total
    );

    let mut messages = Vec::new();
    let mut total_checked: u64 = 0;
    let mut offset_id: Option<i64> = None;

    loop {
        let page = source.history_page(channel, offset_id, PAGE_SIZE).await?;
        let Some(last) = page.last() else {
            break;
        };
        offset_id = Some(last.id);

        for message in &page {
            total_checked += 1;
            if let Some(record) = normalize_message(message, channel, target_emojis) {
                messages.push(record);
            }
            if let Some(callback) = on_progress {
                for progress in tracker.observe(total_checked) {
                    callback(progress);
                }
            }
        }

        debug!("Checked {} messages so far", total_checked);
    }

    info!(
        "Checked {} messages, {} with reactions",
        total_checked,
        messages.len()
    );

    Ok(FetchOutcome {
        messages,
        total_checked,
    })
}
