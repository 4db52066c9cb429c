//! Information display handlers (config)

use crate::cli::output::*;
use crate::AppConfig;

pub fn handle_config_command(config: &AppConfig) {
    print_config(config);
    if !config.has_bot_token() {
        println!();
        print_warning("TELEGRAM_BOT_TOKEN is not set, `chanrank bot` is unavailable");
    }
}
