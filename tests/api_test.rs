//! HTTP tests against a live router on an ephemeral port

mod common;

use std::sync::Arc;

use chanrank::analysis::AnalysisService;
use chanrank::api::handlers::AppState;
use chanrank::api::build_router;
use chanrank::cache::CacheStore;
use chanrank::AppConfig;
use common::*;
use serde_json::Value;
use tempfile::TempDir;

/// Serve the app in the background and return its base URL
async fn spawn_app(source: StaticSource, dir: &TempDir) -> String {
    let state = AppState {
        analysis: AnalysisService::new(Arc::new(source), CacheStore::new(dir.path())),
        config: Arc::new(AppConfig::default()),
    };
    let app = build_router(state, false);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn get_json(url: &str, query: &[(&str, &str)]) -> Value {
    reqwest::Client::new()
        .get(url)
        .query(query)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::new(Vec::new()), &dir).await;

    let body = get_json(&format!("{base}/api/health"), &[]).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_ranking_fetches_then_serves_from_cache() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::new(sample_history()), &dir).await;
    let url = format!("{base}/api/channels/{CHANNEL_ID}/ranking");

    let first = get_json(&url, &[]).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["data"]["source"], "fetched");
    assert_eq!(first["data"]["entries"][0]["id"], 1);
    assert_eq!(first["data"]["entries"][0]["rank"], 1);
    assert_eq!(first["data"]["summary"]["message_count"], 2);

    let second = get_json(&url, &[("emojis", "🔥"), ("sort", "reactions")]).await;
    assert_eq!(second["data"]["source"], "result_cache");
    assert_eq!(second["data"]["entries"][0]["id"], 3);
    assert_eq!(second["data"]["entries"][0]["reactions"], 40);
}

#[tokio::test]
async fn test_ranking_hotness_includes_scores() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::new(sample_history()), &dir).await;
    let url = format!("{base}/api/channels/{CHANNEL_ID}/ranking");

    let body = get_json(&url, &[("sort", "hotness")]).await;
    let entries = body["data"]["entries"].as_array().unwrap();
    assert!(entries.iter().all(|e| e["hotness"].is_f64()));
}

#[tokio::test]
async fn test_keyword_filter_narrows_entries() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::new(sample_history()), &dir).await;
    let url = format!("{base}/api/channels/{CHANNEL_ID}/ranking");

    let body = get_json(&url, &[("keyword", "number 3")]).await;
    assert_eq!(body["data"]["keyword"], "number 3");
    assert_eq!(body["data"]["entries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_logged_out_without_cache_reports_error() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::logged_out(), &dir).await;

    let body = get_json(&format!("{base}/api/channels/{CHANNEL_ID}/ranking"), &[]).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("未授权"));
}

#[tokio::test]
async fn test_report_download_is_plain_text() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::new(sample_history()), &dir).await;

    let response = reqwest::get(format!("{base}/api/channels/{CHANNEL_ID}/report"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert!(response.headers().contains_key("content-disposition"));

    let text = response.text().await.unwrap();
    assert!(text.contains("Telegram 频道表情统计报告"));
    assert!(text.contains("Integration News"));
}

#[tokio::test]
async fn test_clear_cache_and_missing_image() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::new(sample_history()), &dir).await;
    get_json(&format!("{base}/api/channels/{CHANNEL_ID}/ranking"), &[]).await;

    let client = reqwest::Client::new();
    let cleared: Value = client
        .delete(format!("{base}/api/channels/{CHANNEL_ID}/cache"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cleared["success"], true);
    assert_eq!(cleared["data"]["raw_cleared"], false);

    let store = CacheStore::new(dir.path());
    assert!(store.load_result(CHANNEL_ID).await.is_none());
    assert!(store.load_raw(CHANNEL_ID).await.is_some());

    let image = reqwest::get(format!("{base}/api/channels/{CHANNEL_ID}/images/1"))
        .await
        .unwrap();
    assert_eq!(image.status(), 404);
}

#[tokio::test]
async fn test_index_page_lists_channels() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::new(sample_history()), &dir).await;

    let html = reqwest::get(format!("{base}/?channel={CHANNEL_ID}"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Telegram 频道表情统计"));
    assert!(html.contains("Integration News"));
    assert!(html.contains("rank-badge top3"));
}

#[tokio::test]
async fn test_page_clear_action_removes_caches() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::new(sample_history()), &dir).await;
    get_json(&format!("{base}/api/channels/{CHANNEL_ID}/ranking"), &[]).await;

    let html = reqwest::Client::new()
        .post(format!("{base}/actions/clear"))
        .form(&[("channel", CHANNEL_ID.to_string()), ("all", "true".to_string())])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("已清除该频道的全部缓存"));
    let store = CacheStore::new(dir.path());
    assert!(store.load_result(CHANNEL_ID).await.is_none());
    assert!(store.load_raw(CHANNEL_ID).await.is_none());
}

#[tokio::test]
async fn test_page_send_action_reports_count() {
    let dir = TempDir::new().unwrap();
    let base = spawn_app(StaticSource::new(sample_history()), &dir).await;

    let html = reqwest::Client::new()
        .post(format!("{base}/actions/send"))
        .form(&[
            ("channel", CHANNEL_ID.to_string()),
            ("emojis", "❤️".to_string()),
            ("sort", "reactions".to_string()),
            ("scope", "top50".to_string()),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("已发送 2 条消息到 Telegram 收藏"));
    assert!(html.contains("Integration News"));
}
