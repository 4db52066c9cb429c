//! Web server handler

use super::CliContext;
use crate::api::serve_api;
use crate::cli::output::*;
use crate::Result;

pub async fn handle_serve_command(
    ctx: &CliContext,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    let host = host.unwrap_or_else(|| ctx.config.web.host.clone());
    let port = port.unwrap_or(ctx.config.web.port);

    println!("🚀 Starting chanrank Web UI");
    println!("===========================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!();

    if let Err(e) = ctx.ensure_login().await {
        print_warning(&format!(
            "Telegram session is not ready ({e}); cached rankings stay available"
        ));
    }

    serve_api(&ctx.config, ctx.analysis.clone(), host, port, cors).await
}
