/// Channel ranking API handlers
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::Local;
use tracing::error;
use tracing::info;

use super::describe_error;
use super::load_ranking;
use super::AppState;
use crate::analysis::has_legacy_records;
use crate::analysis::send_to_saved_messages;
use crate::analysis::summarize;
use crate::analysis::SEND_INTERVAL;
use crate::api::types::*;
use crate::models::ChannelInfo;
use crate::report;

/// Entries returned when `top` is not given
const DEFAULT_TOP: usize = 50;

/// List joined channels (GET /api/channels)
pub async fn list_channels(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ChannelInfo>>>, StatusCode> {
    info!("GET /api/channels");
    match state.analysis.list_channels().await {
        Ok(channels) => Ok(Json(ApiResponse::success(channels))),
        Err(e) => {
            error!("Failed to list channels: {e}");
            Ok(Json(ApiResponse::error(describe_error(&e))))
        }
    }
}

/// Ranked entries (GET /api/channels/:id/ranking)
pub async fn get_ranking(
    State(state): State<AppState>,
    Path(channel_id): Path<i64>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<RankingResponse>>, StatusCode> {
    info!("GET /api/channels/{}/ranking", channel_id);

    let view = match load_ranking(&state, channel_id, &query).await {
        Ok(view) => view,
        Err(e) => {
            error!("Ranking for {channel_id} failed: {e}");
            return Ok(Json(ApiResponse::error(describe_error(&e))));
        }
    };

    let ordered = view.ordered();
    let response = RankingResponse {
        channel: view.outcome.channel.clone(),
        source: view.outcome.source,
        cached_at: view.outcome.cached_at.as_ref().map(report::format_date),
        sort: view.mode,
        keyword: view.keyword.clone(),
        has_legacy_records: has_legacy_records(&view.outcome.results),
        summary: summarize(&ordered).into(),
        entries: view.entries(query.top.unwrap_or(DEFAULT_TOP)),
    };
    Ok(Json(ApiResponse::success(response)))
}

/// Plain-text report download (GET /api/channels/:id/report)
pub async fn download_report(
    State(state): State<AppState>,
    Path(channel_id): Path<i64>,
    Query(query): Query<RankingQuery>,
) -> Response {
    info!("GET /api/channels/{}/report", channel_id);

    let view = match load_ranking(&state, channel_id, &query).await {
        Ok(view) => view,
        Err(e) => {
            error!("Report for {channel_id} failed: {e}");
            return (StatusCode::BAD_GATEWAY, describe_error(&e)).into_response();
        }
    };

    let title = &view.outcome.channel.title;
    let body = report::generate_report(&view.ordered(), title, view.mode);
    let filename = report::report_filename(title, Local::now().naive_local());
    let encoded: String = url::form_urlencoded::byte_serialize(filename.as_bytes())
        .collect::<String>()
        .replace('+', "%20");

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"report.txt\"; filename*=UTF-8''{encoded}"),
            ),
        ],
        body,
    )
        .into_response()
}

/// Deliver a ranking to Saved Messages (POST /api/channels/:id/send)
pub async fn send_ranking(
    State(state): State<AppState>,
    Path(channel_id): Path<i64>,
    Json(request): Json<SendRequest>,
) -> Result<Json<ApiResponse<SendResponse>>, StatusCode> {
    info!("POST /api/channels/{}/send", channel_id);

    let view = match load_ranking(&state, channel_id, &request.query).await {
        Ok(view) => view,
        Err(e) => return Ok(Json(ApiResponse::error(describe_error(&e)))),
    };

    let mut ordered = view.ordered();
    if request.scope == SendScope::Top50 {
        ordered.truncate(report::CHAT_TOP_N);
    }

    match send_to_saved_messages(
        state.analysis.source(),
        &view.outcome.channel.title,
        &ordered,
        SEND_INTERVAL,
    )
    .await
    {
        Ok(sent) => Ok(Json(ApiResponse::success(SendResponse { sent }))),
        Err(e) => {
            error!("Sending {channel_id} to Saved Messages failed: {e}");
            Ok(Json(ApiResponse::error(format!(
                "发送失败: {}",
                describe_error(&e)
            ))))
        }
    }
}

/// Drop cached data (DELETE /api/channels/:id/cache?all=)
pub async fn clear_cache(
    State(state): State<AppState>,
    Path(channel_id): Path<i64>,
    Query(query): Query<ClearCacheQuery>,
) -> Result<Json<ApiResponse<ClearCacheResponse>>, StatusCode> {
    info!("DELETE /api/channels/{}/cache (all={})", channel_id, query.all);

    let result = if query.all {
        state.analysis.clear_all(channel_id).await
    } else {
        state.analysis.clear_result(channel_id).await
    };
    match result {
        Ok(()) => Ok(Json(ApiResponse::success(ClearCacheResponse {
            channel_id,
            raw_cleared: query.all,
        }))),
        Err(e) => {
            error!("Clearing cache of {channel_id} failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Cached photo of a message (GET /api/channels/:id/images/:message_id)
pub async fn get_image(
    State(state): State<AppState>,
    Path((channel_id, message_id)): Path<(i64, i64)>,
) -> Response {
    let Some(path) = state.analysis.store().find_image(channel_id, message_id).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(e) => {
            error!("Reading {} failed: {e}", path.display());
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
