//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `chanrank` CLI

use crate::analysis::hotness;
use crate::analysis::ReactionSummary;
use crate::models::ChannelInfo;
use crate::models::MessageRecord;
use crate::models::SortMode;
use crate::report::format_count;
use crate::report::format_date;
use crate::telegram::FetchProgress;
use crate::AppConfig;

/// Characters of message text shown per console entry
const CONSOLE_TEXT_CHARS: usize = 200;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// Returns the truncated string with a "..." suffix if it was cut, otherwise
/// the original string.
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print the numbered channel list used by `select`
pub fn print_channels(channels: &[ChannelInfo]) {
    println!();
    println!("{}", "=".repeat(60));
    println!("📋 你加入的频道列表");
    println!("{}", "=".repeat(60));
    for (idx, channel) in channels.iter().enumerate() {
        println!("  [{:3}] {}", idx + 1, channel.title);
        println!("        {}", channel.handle());
    }
    println!("{}", "=".repeat(60));
    println!("共 {} 个频道", channels.len());
}

/// Print a fetch progress line
pub fn print_progress(progress: &FetchProgress) {
    println!(
        "   ⏳ {}% 已检查 {} / 约 {} 条消息",
        progress.percent, progress.checked, progress.estimated_total
    );
}

/// Print the top of a ranking
pub fn print_ranking(records: &[&MessageRecord], channel_title: &str, mode: SortMode, top_n: usize) {
    let epoch = crate::hotness_epoch();
    let shown = records.len().min(top_n);

    println!();
    println!("{}", "=".repeat(80));
    println!(
        "📊 频道 [{channel_title}] 排序结果（按{}，显示前 {shown} 条）",
        mode.label()
    );
    println!("{}", "=".repeat(80));

    for (idx, msg) in records.iter().take(top_n).enumerate() {
        println!();
        println!("🏆 第 {} 名", idx + 1);
        println!("   📅 时间: {}", format_date(&msg.date));
        println!(
            "   👁️  浏览: {} | 📤 转发: {}",
            format_count(msg.views),
            format_count(msg.forwards)
        );
        println!(
            "   ❤️👍 目标表情: {} | 📊 总表情: {}",
            msg.reactions, msg.total_reactions
        );
        if mode == SortMode::Hotness {
            println!("   🔥 热度: {:.2}", hotness(msg, epoch));
        }
        println!("   📝 内容: {}", truncate_str(&msg.text, CONSOLE_TEXT_CHARS));
        println!("   🔗 链接: {}", msg.link);
        println!("{}", "-".repeat(80));
    }
}

/// Print the totals block
pub fn print_summary(summary: &ReactionSummary) {
    println!();
    println!("📈 统计汇总:");
    for line in crate::report::summary_lines(summary) {
        println!("   • {line}");
    }
}

pub fn print_legacy_warning() {
    print_warning(
        "部分消息缺少表情明细数据（旧缓存），切换目标表情不会影响这些消息的统计值。使用 --force 重新分析以获得完整数据。",
    );
}

/// Print configuration
pub fn print_config(config: &AppConfig) {
    println!("📋 chanrank Configuration:");
    println!();

    println!("📡 Telegram:");
    println!(
        "  API ID: {}",
        config
            .telegram
            .api_id
            .map_or_else(|| "(not set)".to_string(), |id| id.to_string())
    );
    println!(
        "  API hash: {}",
        mask_secret(config.telegram.api_hash.as_deref().unwrap_or(""))
    );
    println!("  Session: {}", config.telegram.session_name);
    println!("  Gateway: {}", config.gateway_url());
    println!("  Bot token: {}", mask_secret(&config.telegram.bot_token));
    println!();

    println!("🌐 Proxy:");
    match config.proxy.url() {
        Some(url) => println!("  {url}"),
        None => println!("  Disabled"),
    }
    println!();

    println!("🔐 Auth:");
    println!("  Phone: {}", mask_secret(&config.auth.phone));
    println!("  Code: {}", mask_secret(&config.auth.code));
    println!("  Password: {}", mask_secret(&config.auth.password));
    println!();

    println!("📊 Analyzer:");
    println!("  Channel: {}", config.analyzer.channel);
    println!(
        "  Date range: {} .. {}",
        config.analyzer.start_date, config.analyzer.end_date
    );
    println!("  Target emojis: {}", config.target_emojis().join(" "));
    println!("  Top N: {}", config.analyzer.top_n);
    println!();

    println!("💾 Cache:");
    println!("  Dir: {}", config.cache_dir().display());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!();

    println!("🖥️  Web:");
    println!("  Address: {}:{}", config.web.host, config.web.port);
}

/// Keep the first and last two characters of a secret
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "(not set)".to_string();
    }
    if count <= 6 {
        return "***".to_string();
    }
    let head: String = secret.chars().take(2).collect();
    let tail: String = secret.chars().skip(count - 2).collect();
    format!("{head}***{tail}")
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    println!("❌ {msg}");
}

pub fn print_prompt(msg: &str) {
    print!("{msg}");
    let _ = std::io::Write::flush(&mut std::io::stdout());
}
