//! Text renderings of a ranking
//!
//! Every function takes records by reference and never reorders or edits
//! them.

use std::borrow::Borrow;
use std::path::Path;
use std::path::PathBuf;

use chrono::Local;
use chrono::NaiveDateTime;

use crate::analysis::hotness;
use crate::analysis::summarize;
use crate::analysis::ReactionSummary;
use crate::models::MessageRecord;
use crate::models::SortMode;
use crate::models::DATE_FORMAT;
use crate::Result;

/// Caption limit for photos
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Text limit for plain messages
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Entries in the compact chat listing and the bot reply
pub const CHAT_TOP_N: usize = 50;

const REPORT_RULE_WIDTH: usize = 80;
const HEADER_RULE_WIDTH: usize = 40;

/// Keep at most `max` characters
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// `1234567` → `1,234,567`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn now_stamp() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Summary block lines; the share line is dropped when there are no reactions
pub fn summary_lines(summary: &ReactionSummary) -> Vec<String> {
    let mut lines = vec![
        format!("有表情的消息数: {}", summary.message_count),
        format!("目标表情总数: {}", summary.total_target),
        format!("所有表情总数: {}", summary.total_all),
    ];
    if let Some(share) = summary.target_share {
        lines.push(format!("目标表情占比: {share:.1}%"));
    }
    lines
}

/// Full plain-text report, used for downloads and exports
pub fn generate_report<R: Borrow<MessageRecord>>(
    messages: &[R],
    channel_title: &str,
    mode: SortMode,
) -> String {
    let epoch = crate::hotness_epoch();
    let mut lines = vec![
        "Telegram 频道表情统计报告".to_string(),
        format!("频道: {channel_title}"),
        format!("生成时间: {}", now_stamp()),
        format!("排序方式: {}", mode.label()),
        "=".repeat(REPORT_RULE_WIDTH),
        String::new(),
    ];

    for (idx, msg) in messages.iter().enumerate() {
        let msg: &MessageRecord = msg.borrow();
        lines.push(format!("第 {} 名", idx + 1));
        lines.push(format!("时间: {}", format_date(&msg.date)));
        lines.push(format!("浏览: {} | 转发: {}", msg.views, msg.forwards));
        lines.push(format!(
            "目标表情: {} | 总表情: {}",
            msg.reactions, msg.total_reactions
        ));
        if mode == SortMode::Hotness {
            lines.push(format!("热度: {:.2}", hotness(msg, epoch)));
        }
        lines.push(format!("内容: {}", msg.text));
        lines.push(format!("链接: {}", msg.link));
        lines.push("-".repeat(REPORT_RULE_WIDTH));
    }

    lines.push(String::new());
    lines.push("统计汇总:".to_string());
    lines.extend(summary_lines(&summarize(messages)));
    lines.join("\n")
}

/// Bot reply sent before the individual entries
pub fn chat_header<R: Borrow<MessageRecord>>(messages: &[R], channel_title: &str) -> String {
    let summary = summarize(messages);
    format!(
        "📊 {channel_title} — Reaction 排行 Top {}\n消息数: {} | 目标表情: {} | 总表情: {}",
        summary.message_count, summary.message_count, summary.total_target, summary.total_all
    )
}

/// First message of a Saved Messages delivery
pub fn saved_messages_header<R: Borrow<MessageRecord>>(messages: &[R], channel_title: &str) -> String {
    let summary = summarize(messages);
    format!(
        "Telegram 频道表情统计报告\n频道: {channel_title}\n生成时间: {}\n{}\n消息数: {} | 目标表情: {} | 总表情: {}",
        now_stamp(),
        "=".repeat(HEADER_RULE_WIDTH),
        summary.message_count,
        summary.total_target,
        summary.total_all
    )
}

/// Text of one ranked entry, capped for a photo caption or a plain message
pub fn chat_entry_caption(rank: usize, msg: &MessageRecord, with_photo: bool) -> String {
    let text = format!(
        "第 {rank} 名\n时间: {}\n目标表情: {} | 总表情: {}\n浏览: {} | 转发: {}\n内容: {}\n链接: {}",
        format_date(&msg.date),
        msg.reactions,
        msg.total_reactions,
        msg.views,
        msg.forwards,
        msg.text,
        msg.link
    );
    let limit = if with_photo {
        MAX_CAPTION_CHARS
    } else {
        MAX_MESSAGE_CHARS
    };
    truncate_chars(&text, limit)
}

/// `report_<title>_<YYYYmmdd_HHMMSS>.txt` with path-hostile characters replaced
pub fn report_filename(channel_title: &str, at: NaiveDateTime) -> String {
    let safe: String = channel_title
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let safe = safe.trim();
    let safe = if safe.is_empty() { "channel" } else { safe };
    format!("report_{safe}_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Write the full report into `dir` and return the file path
pub async fn export_to_file<R: Borrow<MessageRecord>>(
    dir: &Path,
    messages: &[R],
    channel_title: &str,
    mode: SortMode,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(report_filename(channel_title, Local::now().naive_local()));
    tokio::fs::write(&path, generate_report(messages, channel_title, mode)).await?;
    tracing::info!("Report written to {}", path.display());
    Ok(path)
}
