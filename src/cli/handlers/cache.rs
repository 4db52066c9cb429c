//! Cache management handlers

use super::CliContext;
use crate::cli::output::*;
use crate::Result;

pub async fn handle_cache_clear_command(ctx: &CliContext, channel_id: i64, all: bool) -> Result<()> {
    if all {
        ctx.analysis.clear_all(channel_id).await?;
        print_success(&format!("已清除频道 {channel_id} 的全部缓存"));
    } else {
        ctx.analysis.clear_result(channel_id).await?;
        print_success(&format!(
            "已清除频道 {channel_id} 的结果缓存，原始数据缓存保留"
        ));
    }
    Ok(())
}
