/// API request handlers
use std::sync::Arc;

use axum::Json;

use crate::analysis::filter_by_keyword;
use crate::analysis::hotness;
use crate::analysis::ranked;
use crate::analysis::AnalysisOutcome;
use crate::analysis::AnalysisRequest;
use crate::analysis::AnalysisService;
use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use crate::api::types::RankedEntry;
use crate::api::types::RankingQuery;
use crate::config::AppConfig;
use crate::models::ChannelInfo;
use crate::models::MessageRecord;
use crate::models::SortMode;
use crate::ChanRankError;

pub mod channels;
pub mod page;

pub use channels::*;
pub use page::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analysis: AnalysisService,
    pub config: Arc<AppConfig>,
}

/// Health check handler
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// An analysis plus the presentation parameters it was requested with
pub struct RankingView {
    pub outcome: AnalysisOutcome,
    pub mode: SortMode,
    pub keyword: String,
    /// Target set the outcome was scored with
    pub target_emojis: Vec<String>,
}

impl RankingView {
    /// Keyword-filtered records in display order
    pub fn ordered(&self) -> Vec<&MessageRecord> {
        ranked(
            filter_by_keyword(&self.outcome.results, &self.keyword),
            self.mode,
            crate::hotness_epoch(),
        )
    }

    pub fn entries(&self, top: usize) -> Vec<RankedEntry> {
        let epoch = crate::hotness_epoch();
        self.ordered()
            .into_iter()
            .take(top)
            .enumerate()
            .map(|(index, record)| {
                let score = (self.mode == SortMode::Hotness).then(|| hotness(record, epoch));
                RankedEntry::new(index + 1, self.outcome.channel.id, record, score)
            })
            .collect()
    }
}

/// Channel from the joined list, or from the caches when the remote is down
pub async fn lookup_channel(state: &AppState, channel_id: i64) -> crate::Result<ChannelInfo> {
    match state.analysis.find_channel(channel_id).await {
        Ok(channel) => Ok(channel),
        Err(e) => {
            let store = state.analysis.store();
            let cached_title = match store.load_result(channel_id).await {
                Some(entry) => Some(entry.channel_title),
                None => store.load_raw(channel_id).await.map(|entry| entry.channel_title),
            };
            match cached_title {
                Some(title) => {
                    tracing::debug!("Using cached title for {channel_id}: {e}");
                    Ok(ChannelInfo {
                        id: channel_id,
                        title,
                        username: None,
                    })
                }
                None => Err(e),
            }
        }
    }
}

/// Run the tiered analysis for a channel and apply the query
pub async fn load_ranking(
    state: &AppState,
    channel_id: i64,
    query: &RankingQuery,
) -> crate::Result<RankingView> {
    let mode = query.sort_mode().map_err(ChanRankError::Custom)?;
    let channel = lookup_channel(state, channel_id).await?;
    let request = AnalysisRequest {
        target_emojis: query.target_emojis(state.config.target_emojis()),
        force_refresh: query.force,
    };
    let outcome = state.analysis.analyze(&channel, &request, None).await?;
    Ok(RankingView {
        outcome,
        mode,
        keyword: query.keyword().to_string(),
        target_emojis: request.target_emojis,
    })
}

/// User-facing text for an analysis failure
pub fn describe_error(err: &ChanRankError) -> String {
    if err.is_auth() {
        format!("未授权，请先通过 CLI 完成登录: {err}")
    } else if err.is_remote() {
        format!("无法访问 Telegram: {err}")
    } else {
        err.to_string()
    }
}
