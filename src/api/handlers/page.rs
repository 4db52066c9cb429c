/// Interactive HTML page (GET /) and its form actions
use std::fmt::Write as _;

use axum::extract::Form;
use axum::extract::RawQuery;
use axum::extract::State;
use axum::response::Html;
use serde::Deserialize;
use tracing::error;
use tracing::info;

use super::describe_error;
use super::load_ranking;
use super::AppState;
use super::RankingView;
use crate::analysis::has_legacy_records;
use crate::analysis::send_to_saved_messages;
use crate::analysis::summarize;
use crate::analysis::SEND_INTERVAL;
use crate::api::types::RankingQuery;
use crate::api::types::SendScope;
use crate::config::parse_emoji_list;
use crate::config::ALL_EMOJIS;
use crate::models::ChannelInfo;
use crate::models::SortMode;
use crate::report::format_count;
use crate::report::CHAT_TOP_N;

/// Cards rendered on the page
const PAGE_TOP_N: usize = 50;

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", "PingFang SC", sans-serif; max-width: 960px; margin: 0 auto; padding: 24px; color: #222; }
form { background: #f6f8fa; border-radius: 8px; padding: 16px; margin-bottom: 24px; }
fieldset { border: none; padding: 0; margin: 8px 0; }
.emoji { display: inline-block; margin: 2px 6px 2px 0; }
.notice { background: #fff8e1; border-left: 4px solid #f5a623; padding: 8px 12px; margin: 12px 0; }
.success { background: #e6f4ea; border-left: 4px solid #1e8e3e; padding: 8px 12px; margin: 12px 0; }
.error { background: #fdecea; border-left: 4px solid #d93025; padding: 8px 12px; margin: 12px 0; }
.metrics span { display: inline-block; margin-right: 24px; font-weight: 600; }
.rank-card { border: 1px solid #e1e4e8; border-radius: 8px; padding: 14px; margin: 12px 0; display: flex; gap: 16px; }
.rank-card img { width: 180px; object-fit: cover; border-radius: 6px; }
.rank-badge { background: #0088cc; color: #fff; border-radius: 12px; padding: 2px 10px; margin-right: 8px; }
.rank-badge.top3 { background: #f5a623; }
.rank-stat { margin-right: 12px; color: #555; }
.rank-stat.primary { color: #0088cc; font-weight: 600; }
"#;

/// Form state parsed from the query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageForm {
    pub channel_id: Option<i64>,
    /// Selected emojis; `None` means the configured set
    pub emojis: Option<Vec<String>>,
    pub keyword: String,
    pub sort: SortMode,
    pub force: bool,
}

impl PageForm {
    /// Parse `channel=..&e=..&e=..&keyword=..&sort=..&force=on`
    pub fn parse(raw: Option<&str>) -> Self {
        let mut form = Self::default();
        let Some(raw) = raw else {
            return form;
        };
        let mut emojis = Vec::new();
        let mut emoji_field_seen = false;
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "channel" => form.channel_id = value.trim().parse().ok(),
                "e" => {
                    emoji_field_seen = true;
                    if !value.trim().is_empty() {
                        emojis.push(value.trim().to_string());
                    }
                }
                "keyword" => form.keyword = value.trim().to_string(),
                "sort" => form.sort = value.parse().unwrap_or_default(),
                "force" => form.force = matches!(value.as_ref(), "on" | "true" | "1"),
                _ => {}
            }
        }
        if emoji_field_seen {
            form.emojis = Some(emojis);
        }
        form
    }

    fn ranking_query(&self) -> RankingQuery {
        RankingQuery {
            sort: Some(self.sort.to_string()),
            keyword: Some(self.keyword.clone()),
            force: self.force,
            emojis: self.emojis.as_ref().map(|list| list.join(",")),
            top: Some(PAGE_TOP_N),
        }
    }
}

/// Result of a page action, shown above the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

/// Fields posted by the send and clear buttons
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionForm {
    pub channel: i64,
    /// Comma separated; configured set when absent
    #[serde(default)]
    pub emojis: Option<String>,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub scope: SendScope,
    /// Clear the raw cache too
    #[serde(default)]
    pub all: bool,
}

impl ActionForm {
    /// Page state to render after the action
    pub fn page_form(&self) -> PageForm {
        PageForm {
            channel_id: Some(self.channel),
            emojis: self.emojis.as_deref().map(parse_emoji_list),
            keyword: self.keyword.trim().to_string(),
            sort: self
                .sort
                .as_deref()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default(),
            force: false,
        }
    }
}

/// Main page handler
pub async fn index(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Html<String> {
    info!("GET /");
    let form = PageForm::parse(raw.as_deref());

    let ranking = match form.channel_id {
        Some(channel_id) => Some(
            load_ranking(&state, channel_id, &form.ranking_query())
                .await
                .map_err(|e| describe_error(&e)),
        ),
        None => None,
    };

    render_index(&state, &form, ranking, None).await
}

/// Send the shown ranking to Saved Messages (POST /actions/send)
pub async fn send_action(State(state): State<AppState>, Form(action): Form<ActionForm>) -> Html<String> {
    info!("POST /actions/send (channel {}, {:?})", action.channel, action.scope);
    let form = action.page_form();
    let ranking = load_ranking(&state, action.channel, &form.ranking_query()).await;

    let notice = match &ranking {
        Ok(view) => {
            let mut ordered = view.ordered();
            if action.scope == SendScope::Top50 {
                ordered.truncate(CHAT_TOP_N);
            }
            let sent = send_to_saved_messages(
                state.analysis.source(),
                &view.outcome.channel.title,
                &ordered,
                SEND_INTERVAL,
            )
            .await;
            Some(match sent {
                Ok(count) => Notice::Success(format!("已发送 {count} 条消息到 Telegram 收藏")),
                Err(e) => {
                    error!("Sending {} to Saved Messages failed: {e}", action.channel);
                    Notice::Failure(format!("发送失败: {}", describe_error(&e)))
                }
            })
        }
        Err(_) => None,
    };

    let ranking = ranking.map_err(|e| describe_error(&e));
    render_index(&state, &form, Some(ranking), notice).await
}

/// Drop cached data of the selected channel (POST /actions/clear)
pub async fn clear_action(State(state): State<AppState>, Form(action): Form<ActionForm>) -> Html<String> {
    info!("POST /actions/clear (channel {}, all={})", action.channel, action.all);
    let result = if action.all {
        state.analysis.clear_all(action.channel).await
    } else {
        state.analysis.clear_result(action.channel).await
    };
    let notice = match result {
        Ok(()) if action.all => Notice::Success("已清除该频道的全部缓存".to_string()),
        Ok(()) => Notice::Success("已清除结果缓存，原始数据缓存保留".to_string()),
        Err(e) => {
            error!("Clearing cache of {} failed: {e}", action.channel);
            Notice::Failure(format!("清除缓存失败: {e}"))
        }
    };
    render_index(&state, &action.page_form(), None, Some(notice)).await
}

async fn render_index(
    state: &AppState,
    form: &PageForm,
    ranking: Option<Result<RankingView, String>>,
    notice: Option<Notice>,
) -> Html<String> {
    let channels = state
        .analysis
        .list_channels()
        .await
        .map_err(|e| describe_error(&e));

    let selected: Vec<String> = form
        .emojis
        .clone()
        .unwrap_or_else(|| state.config.target_emojis().to_vec());

    Html(render_page(
        form,
        &selected,
        &channels,
        ranking.as_ref(),
        notice.as_ref(),
    ))
}

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render_page(
    form: &PageForm,
    selected_emojis: &[String],
    channels: &Result<Vec<ChannelInfo>, String>,
    ranking: Option<&Result<RankingView, String>>,
    notice: Option<&Notice>,
) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"zh\"><head><meta charset=\"utf-8\">\
         <title>Telegram 频道表情统计</title><style>{STYLE}</style></head><body>\
         <h1>Telegram 频道表情统计</h1>"
    );
    match notice {
        Some(Notice::Success(message)) => {
            let _ = write!(html, "<div class=\"success\">{}</div>", escape_html(message));
        }
        Some(Notice::Failure(message)) => {
            let _ = write!(html, "<div class=\"error\">{}</div>", escape_html(message));
        }
        None => {}
    }
    render_form(&mut html, form, selected_emojis, channels);
    match ranking {
        Some(Ok(view)) => render_results(&mut html, view),
        Some(Err(message)) => {
            let _ = write!(html, "<div class=\"error\">{}</div>", escape_html(message));
        }
        None => {}
    }
    if let Some(channel_id) = form.channel_id {
        render_cache_actions(&mut html, channel_id);
    }
    html.push_str("</body></html>");
    html
}

fn render_form(
    html: &mut String,
    form: &PageForm,
    selected_emojis: &[String],
    channels: &Result<Vec<ChannelInfo>, String>,
) {
    html.push_str("<form method=\"get\" action=\"/\">");
    match channels {
        Ok(channels) if !channels.is_empty() => {
            html.push_str("<label>频道 <select name=\"channel\">");
            for channel in channels {
                let selected = if form.channel_id == Some(channel.id) {
                    " selected"
                } else {
                    ""
                };
                let _ = write!(
                    html,
                    "<option value=\"{}\"{selected}>{} ({})</option>",
                    channel.id,
                    escape_html(&channel.title),
                    escape_html(&channel.handle())
                );
            }
            html.push_str("</select></label>");
        }
        Ok(_) => html.push_str("<div class=\"notice\">未找到已加入的频道</div>"),
        Err(message) => {
            let _ = write!(
                html,
                "<div class=\"error\">获取频道列表失败: {}</div>\
                 <label>频道 ID <input name=\"channel\" value=\"{}\"></label>",
                escape_html(message),
                form.channel_id.map(|id| id.to_string()).unwrap_or_default()
            );
        }
    }

    html.push_str("<fieldset><legend>目标表情</legend>");
    for emoji in ALL_EMOJIS {
        let checked = if selected_emojis.iter().any(|e| e == emoji) {
            " checked"
        } else {
            ""
        };
        let _ = write!(
            html,
            "<label class=\"emoji\"><input type=\"checkbox\" name=\"e\" value=\"{0}\"{checked}>{0}</label>",
            escape_html(emoji)
        );
    }
    let _ = write!(
        html,
        "<a href=\"{}\">恢复默认</a></fieldset>",
        escape_html(&restore_defaults_href(form))
    );

    let _ = write!(
        html,
        "<fieldset><label>关键词 <input name=\"keyword\" value=\"{}\"></label> ",
        escape_html(&form.keyword)
    );
    for mode in [SortMode::Reactions, SortMode::Hotness] {
        let checked = if form.sort == mode { " checked" } else { "" };
        let _ = write!(
            html,
            "<label><input type=\"radio\" name=\"sort\" value=\"{mode}\"{checked}>按{}</label> ",
            mode.label()
        );
    }
    let force = if form.force { " checked" } else { "" };
    let _ = write!(
        html,
        "<label><input type=\"checkbox\" name=\"force\"{force}>忽略缓存</label></fieldset>\
         <button type=\"submit\">开始分析</button></form>"
    );
}

fn render_results(html: &mut String, view: &RankingView) {
    let outcome = &view.outcome;
    let _ = write!(
        html,
        "<h2>分析结果: {}</h2><p>数据来源: {}{}</p>",
        escape_html(&outcome.channel.title),
        outcome.source.describe(),
        outcome
            .cached_at
            .map(|at| format!("（{}）", crate::report::format_date(&at)))
            .unwrap_or_default()
    );

    if outcome.results.is_empty() {
        html.push_str("<div class=\"notice\">未找到任何有表情的消息</div>");
        return;
    }
    if has_legacy_records(&outcome.results) {
        html.push_str(
            "<div class=\"notice\">部分消息缺少表情明细数据（旧缓存），切换目标表情不会影响这些消息的统计值。\
             建议勾选「忽略缓存」重新分析以获得完整数据。</div>",
        );
    }

    let ordered = view.ordered();
    if !view.keyword.is_empty() {
        let _ = write!(
            html,
            "<div class=\"notice\">当前关键词筛选: 「{}」，匹配 {} 条消息</div>",
            escape_html(&view.keyword),
            ordered.len()
        );
    }

    let summary = summarize(&ordered);
    let _ = write!(
        html,
        "<div class=\"metrics\"><span>有表情的消息 {}</span><span>目标表情总数 {}</span><span>所有表情总数 {}</span>",
        summary.message_count, summary.total_target, summary.total_all
    );
    if let Some(share) = summary.target_share {
        let _ = write!(html, "<span>目标表情占比 {share:.1}%</span>");
    }
    html.push_str("</div>");

    let _ = write!(html, "<h3>排行榜（按{}排序）</h3>", view.mode.label());
    for entry in view.entries(PAGE_TOP_N) {
        let badge = if entry.rank <= 3 {
            "rank-badge top3"
        } else {
            "rank-badge"
        };
        html.push_str("<div class=\"rank-card\">");
        if let Some(url) = &entry.image_url {
            let _ = write!(html, "<img src=\"{}\" alt=\"\">", escape_html(url));
        }
        let _ = write!(
            html,
            "<div><span class=\"{badge}\">第 {} 名</span><span style=\"color:#888\">{}</span>\
             <div style=\"margin:10px 0\">{}</div><div>",
            entry.rank,
            escape_html(&entry.date),
            escape_html(&entry.text)
        );
        if let Some(score) = entry.hotness {
            let _ = write!(html, "<span class=\"rank-stat primary\">🔥 热度 {score:.2}</span>");
        }
        let _ = write!(
            html,
            "<span class=\"rank-stat primary\">目标表情 {}</span>\
             <span class=\"rank-stat\">总表情 {}</span>\
             <span class=\"rank-stat\">浏览 {}</span>\
             <span class=\"rank-stat\">转发 {}</span></div>\
             <div style=\"margin-top:8px\"><a href=\"{}\" target=\"_blank\">查看原文 &rarr;</a></div></div></div>",
            entry.reactions,
            entry.total_reactions,
            format_count(entry.views),
            format_count(entry.forwards),
            escape_html(&entry.link)
        );
    }

    let channel_id = outcome.channel.id;
    let query = view_query(view);
    let _ = write!(
        html,
        "<h3>导出报告</h3><p><a href=\"/api/channels/{channel_id}/report?{}\">下载完整报告</a></p>",
        escape_html(&query)
    );
    render_send_form(html, view);
}

fn render_send_form(html: &mut String, view: &RankingView) {
    let _ = write!(
        html,
        "<h3>发送到 Telegram 收藏</h3><form method=\"post\" action=\"/actions/send\">\
         <input type=\"hidden\" name=\"channel\" value=\"{}\">\
         <input type=\"hidden\" name=\"emojis\" value=\"{}\">\
         <input type=\"hidden\" name=\"keyword\" value=\"{}\">\
         <input type=\"hidden\" name=\"sort\" value=\"{}\">\
         <label><input type=\"radio\" name=\"scope\" value=\"all\" checked>完整排行</label> \
         <label><input type=\"radio\" name=\"scope\" value=\"top50\">前 50 条</label> \
         <button type=\"submit\">发送到 Telegram 收藏</button></form>",
        view.outcome.channel.id,
        escape_html(&view.target_emojis.join(",")),
        escape_html(&view.keyword),
        view.mode
    );
}

fn render_cache_actions(html: &mut String, channel_id: i64) {
    let _ = write!(
        html,
        "<h3>缓存管理</h3><form method=\"post\" action=\"/actions/clear\">\
         <input type=\"hidden\" name=\"channel\" value=\"{channel_id}\">\
         <button type=\"submit\" name=\"all\" value=\"false\">清除结果缓存</button> \
         <button type=\"submit\" name=\"all\" value=\"true\">清除全部缓存</button></form>"
    );
}

/// Query string that reproduces a view through the JSON API
fn view_query(view: &RankingView) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("sort", &view.mode.to_string());
    if !view.keyword.is_empty() {
        serializer.append_pair("keyword", &view.keyword);
    }
    serializer.append_pair("emojis", &view.target_emojis.join(","));
    serializer.finish()
}

/// Same page without an emoji selection, so the configured set applies
fn restore_defaults_href(form: &PageForm) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    if let Some(channel_id) = form.channel_id {
        serializer.append_pair("channel", &channel_id.to_string());
    }
    if !form.keyword.is_empty() {
        serializer.append_pair("keyword", &form.keyword);
    }
    serializer.append_pair("sort", &form.sort.to_string());
    format!("/?{}", serializer.finish())
}
