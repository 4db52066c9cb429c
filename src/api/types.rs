//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::analysis::AnalysisSource;
use crate::analysis::ReactionSummary;
use crate::config::parse_emoji_list;
use crate::models::ChannelInfo;
use crate::models::MessageRecord;
use crate::models::SortMode;
use crate::report::format_date;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Presentation parameters shared by ranking, report and send requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingQuery {
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub force: bool,
    /// Comma separated target emojis; configured set when absent
    #[serde(default)]
    pub emojis: Option<String>,
    #[serde(default)]
    pub top: Option<usize>,
}

impl RankingQuery {
    pub fn sort_mode(&self) -> Result<SortMode, String> {
        match self.sort.as_deref() {
            None | Some("") => Ok(SortMode::default()),
            Some(raw) => raw.parse(),
        }
    }

    pub fn keyword(&self) -> &str {
        self.keyword.as_deref().unwrap_or("").trim()
    }

    pub fn target_emojis(&self, configured: &[String]) -> Vec<String> {
        match self.emojis.as_deref() {
            Some(raw) => parse_emoji_list(raw),
            None => configured.to_vec(),
        }
    }
}

/// How much of a ranking to deliver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendScope {
    #[default]
    All,
    Top50,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendRequest {
    #[serde(flatten)]
    pub query: RankingQuery,
    #[serde(default)]
    pub scope: SendScope,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub sent: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearCacheQuery {
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub channel_id: i64,
    pub raw_cleared: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub message_count: usize,
    pub total_target: u64,
    pub total_all: u64,
    pub target_share: Option<f64>,
}

impl From<ReactionSummary> for SummaryResponse {
    fn from(summary: ReactionSummary) -> Self {
        Self {
            message_count: summary.message_count,
            total_target: summary.total_target,
            total_all: summary.total_all,
            target_share: summary.target_share,
        }
    }
}

/// One card of a ranking
#[derive(Debug, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub id: i64,
    pub date: String,
    pub text: String,
    pub views: u64,
    pub forwards: u64,
    pub reactions: u64,
    pub total_reactions: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotness: Option<f64>,
    pub link: String,
    /// Relative URL of the cached image
    pub image_url: Option<String>,
}

impl RankedEntry {
    pub fn new(rank: usize, channel_id: i64, record: &MessageRecord, hotness: Option<f64>) -> Self {
        let image_url = record
            .image_path
            .as_ref()
            .map(|_| format!("/api/channels/{channel_id}/images/{}", record.id));
        Self {
            rank,
            id: record.id,
            date: format_date(&record.date),
            text: record.text.clone(),
            views: record.views,
            forwards: record.forwards,
            reactions: record.reactions,
            total_reactions: record.total_reactions,
            hotness,
            link: record.link.clone(),
            image_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub channel: ChannelInfo,
    pub source: AnalysisSource,
    pub cached_at: Option<String>,
    pub sort: SortMode,
    pub keyword: String,
    pub has_legacy_records: bool,
    pub summary: SummaryResponse,
    pub entries: Vec<RankedEntry>,
}
