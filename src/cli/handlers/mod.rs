//! CLI command handlers module
//!
//! This module is organized by command:
//! - analyze: One-shot analysis of a named channel
//! - select: Interactive channel picker
//! - bot: Chat bot
//! - serve: Web UI
//! - cache: Cache management
//! - info: Information display (config)

pub mod analyze;
pub mod bot;
pub mod cache;
pub mod info;
pub mod select;
pub mod serve;

use std::sync::Arc;

// Re-export all public handlers
pub use analyze::*;
pub use bot::*;
pub use cache::*;
pub use info::*;
pub use select::*;
pub use serve::*;

use crate::analysis::AnalysisService;
use crate::cache::CacheStore;
use crate::cli::output::print_error;
use crate::telegram::UserApiClient;
use crate::AppConfig;
use crate::ChanRankError;
use crate::Result;

/// Services shared by every command
#[derive(Clone)]
pub struct CliContext {
    pub config: AppConfig,
    pub client: Arc<UserApiClient>,
    pub analysis: AnalysisService,
}

impl CliContext {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let client = Arc::new(UserApiClient::from_config(&config)?);
        let analysis = AnalysisService::new(client.clone(), CacheStore::from_config(&config));
        Ok(Self {
            config,
            client,
            analysis,
        })
    }

    /// Log the user session in with the configured credentials if needed
    pub async fn ensure_login(&self) -> Result<()> {
        self.client.login(&self.config.auth).await
    }
}

/// Print a failure the way users should read it
pub fn print_failure(err: &ChanRankError) {
    if err.is_auth() {
        print_error(&format!("未授权: {err}"));
    } else if err.is_remote() {
        print_error(&format!("访问 Telegram 失败: {err}"));
    } else {
        print_error(&err.to_string());
    }
}
