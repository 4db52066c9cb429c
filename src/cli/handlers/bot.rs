//! Chat bot handler

use super::CliContext;
use crate::bot::BotService;
use crate::cli::output::*;
use crate::telegram::BotApiClient;
use crate::ChanRankError;
use crate::Result;

pub async fn handle_bot_command(ctx: &CliContext) -> Result<()> {
    if !ctx.config.has_bot_token() {
        return Err(ChanRankError::Config(
            "TELEGRAM_BOT_TOKEN is not set".to_string(),
        ));
    }
    let bot = BotApiClient::from_config(&ctx.config)?;

    match ctx.ensure_login().await {
        Ok(()) => {}
        Err(e) if e.is_auth() => {
            print_error("用户客户端未授权，请先运行 chanrank select 完成登录");
            print_info(&e.to_string());
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    print_success("🤖 Bot 已启动，发送频道链接或转发频道消息即可开始分析");
    let targets = ctx.config.target_emojis().to_vec();
    BotService::new(bot, ctx.analysis.clone(), targets).run().await
}
