//! Analysis handlers shared by `analyze` and `select`

use std::path::Path;

use super::CliContext;
use crate::analysis::filter_by_keyword;
use crate::analysis::has_legacy_records;
use crate::analysis::ranked;
use crate::analysis::summarize;
use crate::analysis::AnalysisRequest;
use crate::analysis::AnalysisSource;
use crate::cli::commands::AnalyzeArgs;
use crate::cli::output::*;
use crate::models::ChannelInfo;
use crate::models::SortMode;
use crate::report;
use crate::telegram::ChannelRef;
use crate::telegram::FetchProgress;
use crate::ChanRankError;
use crate::Result;

/// How a finished analysis is shown
#[derive(Debug, Clone)]
pub struct RankingOptions {
    pub top: usize,
    pub mode: SortMode,
    pub keyword: String,
    pub force: bool,
    pub export: bool,
}

impl RankingOptions {
    pub fn from_args(args: &AnalyzeArgs, default_top: usize) -> Self {
        Self {
            top: args.top.unwrap_or(default_top),
            mode: args.sort.into(),
            keyword: args.keyword.clone().unwrap_or_default(),
            force: args.force,
            export: args.export,
        }
    }
}

pub async fn handle_analyze_command(ctx: &CliContext, args: AnalyzeArgs) -> Result<()> {
    let raw = args
        .channel
        .clone()
        .filter(|c| !c.trim().is_empty())
        .or_else(|| Some(ctx.config.analyzer.channel.clone()).filter(|c| !c.trim().is_empty()))
        .ok_or_else(|| {
            ChanRankError::Config(
                "请指定频道，或在 config.toml [analyzer] 段 / 环境变量 TELEGRAM_CHANNEL 中设置"
                    .to_string(),
            )
        })?;

    print_info("🔗 正在连接 Telegram...");
    ctx.ensure_login().await?;
    print_success("已登录");

    let channel = ctx.analysis.resolve_channel(&ChannelRef::parse(&raw)).await?;
    let options = RankingOptions::from_args(&args, ctx.config.analyzer.top_n);
    run_analysis(ctx, &channel, &options).await
}

/// Analyze `channel` and print the ranking
pub async fn run_analysis(ctx: &CliContext, channel: &ChannelInfo, options: &RankingOptions) -> Result<()> {
    println!();
    println!("🔍 正在分析频道: {}", channel.title);
    println!("{}", "-".repeat(50));

    let request = AnalysisRequest {
        target_emojis: ctx.config.target_emojis().to_vec(),
        force_refresh: options.force,
    };
    let progress: &(dyn Fn(FetchProgress) + Send + Sync) = &|p: FetchProgress| print_progress(&p);
    let outcome = ctx.analysis.analyze(channel, &request, Some(progress)).await?;

    match (outcome.source, outcome.total_checked) {
        (AnalysisSource::Fetched, Some(checked)) => print_success(&format!(
            "共检查 {checked} 条消息，找到 {} 条有表情的消息",
            outcome.results.len()
        )),
        (source, _) => print_info(&format!(
            "使用{}（{}）",
            source.describe(),
            outcome
                .cached_at
                .as_ref()
                .map(report::format_date)
                .unwrap_or_default()
        )),
    }

    if outcome.results.is_empty() {
        print_error("未找到任何有表情的消息");
        return Ok(());
    }
    if has_legacy_records(&outcome.results) {
        print_legacy_warning();
    }

    let filtered = filter_by_keyword(&outcome.results, &options.keyword);
    if !options.keyword.is_empty() {
        print_info(&format!(
            "当前关键词筛选: 「{}」，匹配 {} 条消息",
            options.keyword,
            filtered.len()
        ));
    }
    let ordered = ranked(filtered, options.mode, crate::hotness_epoch());

    print_ranking(&ordered, &channel.title, options.mode, options.top);
    print_summary(&summarize(&ordered));

    if options.export {
        let path = report::export_to_file(Path::new("."), &ordered, &channel.title, options.mode).await?;
        println!();
        print_success(&format!("📝 完整报告已保存到: {}", path.display()));
    }
    Ok(())
}
