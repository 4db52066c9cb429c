use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;

/// Timestamp layout used in cache files and every rendered report
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder stored when a message has no text
pub const EMPTY_TEXT_PLACEHOLDER: &str = "[无文字内容]";

/// One channel message that carries at least one reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    #[serde(with = "date_format")]
    pub date: NaiveDateTime,
    pub text: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub forwards: u64,
    /// Target-emoji total for the currently selected emoji set
    pub reactions: u64,
    /// Per-emoji counts. `None` marks a legacy record whose `reactions`
    /// value is frozen and must never be recomputed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_details: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub total_reactions: u64,
    pub link: String,
    #[serde(default)]
    pub has_photo: bool,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
}

impl MessageRecord {
    /// Whether this record can be re-aggregated against a new emoji set
    pub fn is_recomputable(&self) -> bool {
        self.reaction_details.is_some()
    }

    /// Sum of the given emojis in `reaction_details`, or `None` for legacy records
    pub fn target_total(&self, target_emojis: &[String]) -> Option<u64> {
        self.reaction_details.as_ref().map(|details| {
            target_emojis
                .iter()
                .map(|emoji| details.get(emoji).copied().unwrap_or(0))
                .sum()
        })
    }
}

/// A channel the logged-in user has joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl ChannelInfo {
    /// `@username` when public, otherwise the numeric id
    pub fn handle(&self) -> String {
        match &self.username {
            Some(username) if !username.is_empty() => format!("@{username}"),
            _ => format!("ID: {}", self.id),
        }
    }
}

/// Unsorted, unscored fetch output for one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCacheEntry {
    pub channel_id: i64,
    pub channel_title: String,
    #[serde(with = "date_format")]
    pub fetched_at: NaiveDateTime,
    pub total_checked: u64,
    pub messages: Vec<MessageRecord>,
}

/// Scored and media-resolved results for one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultCacheEntry {
    pub channel_id: i64,
    pub channel_title: String,
    #[serde(with = "date_format")]
    pub analyzed_at: NaiveDateTime,
    pub results: Vec<MessageRecord>,
}

/// Display order for a ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Reactions,
    Hotness,
}

impl SortMode {
    /// Human label used in headers ("目标表情数量" / "热度")
    pub fn label(self) -> &'static str {
        match self {
            Self::Reactions => "目标表情数量",
            Self::Hotness => "热度",
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "reactions" | "reaction" => Ok(Self::Reactions),
            "2" | "hotness" | "hot" => Ok(Self::Hotness),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reactions => write!(f, "reactions"),
            Self::Hotness => write!(f, "hotness"),
        }
    }
}

/// Serde adapter for `NaiveDateTime` in [`DATE_FORMAT`]
pub mod date_format {
    use chrono::NaiveDateTime;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    use super::DATE_FORMAT;

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
