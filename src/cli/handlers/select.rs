//! Interactive channel picker
//!
//! Runs on the main thread and hands remote work to the background runtime.

use std::io::BufRead;

use super::analyze::run_analysis;
use super::analyze::RankingOptions;
use super::CliContext;
use crate::cli::output::*;
use crate::models::ChannelInfo;
use crate::models::SortMode;
use crate::runtime::BackgroundRuntime;
use crate::Result;

/// What the user typed at the picker prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Channel(usize),
    Quit,
    Invalid(String),
}

/// Interpret one line of picker input against `count` channels
pub fn parse_selection(input: &str, count: usize) -> Selection {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Selection::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Selection::Channel(n - 1),
        Ok(_) => Selection::Invalid(format!("请输入 1 到 {count} 之间的数字")),
        Err(_) => Selection::Invalid("请输入有效的数字".to_string()),
    }
}

/// Prompt until a valid choice, `q` or end of input
pub fn prompt_selection<R: BufRead>(channels: &[ChannelInfo], input: &mut R) -> Result<Option<ChannelInfo>> {
    loop {
        print_prompt(&format!(
            "\n请输入频道编号 (1-{}), 或输入 q 退出: ",
            channels.len()
        ));
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match parse_selection(&line, channels.len()) {
            Selection::Channel(index) => return Ok(Some(channels[index].clone())),
            Selection::Quit => return Ok(None),
            Selection::Invalid(message) => print_error(&message),
        }
    }
}

pub fn handle_select_command(ctx: &CliContext, runtime: &BackgroundRuntime, top: Option<usize>) -> Result<()> {
    println!("🚀 Telegram 频道选择器 - 表情统计工具");
    println!();
    print_info("🔗 正在连接 Telegram...");

    let login_ctx = ctx.clone();
    runtime.block_on(async move { login_ctx.ensure_login().await })??;
    print_success("已登录");

    print_info("📡 正在获取频道列表...");
    let analysis = ctx.analysis.clone();
    let channels = runtime.block_on(async move { analysis.list_channels().await })??;
    if channels.is_empty() {
        print_error("未找到任何频道");
        return Ok(());
    }
    print_channels(&channels);

    let stdin = std::io::stdin();
    let Some(channel) = prompt_selection(&channels, &mut stdin.lock())? else {
        println!("\n👋 已退出");
        return Ok(());
    };

    let options = RankingOptions {
        top: top.unwrap_or(ctx.config.analyzer.top_n),
        mode: SortMode::Reactions,
        keyword: String::new(),
        force: false,
        export: true,
    };
    let run_ctx = ctx.clone();
    runtime.block_on(async move { run_analysis(&run_ctx, &channel, &options).await })?
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::tests::channel;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("2\n", 3), Selection::Channel(1));
        assert_eq!(parse_selection(" Q ", 3), Selection::Quit);
        assert!(matches!(parse_selection("0", 3), Selection::Invalid(_)));
        assert!(matches!(parse_selection("4", 3), Selection::Invalid(_)));
        assert!(matches!(parse_selection("abc", 3), Selection::Invalid(_)));
    }

    #[test]
    fn test_prompt_retries_until_valid() {
        let mut other = channel();
        other.id = 7;
        let channels = vec![channel(), other];
        let mut input = Cursor::new("x\n9\n2\n");
        let picked = prompt_selection(&channels, &mut input).unwrap();
        assert_eq!(picked.unwrap().id, 7);
    }

    #[test]
    fn test_prompt_quit_and_eof() {
        let channels = vec![channel()];
        assert!(prompt_selection(&channels, &mut Cursor::new("q\n")).unwrap().is_none());
        assert!(prompt_selection(&channels, &mut Cursor::new("")).unwrap().is_none());
    }
}
