//! Chat bot front end
//!
//! A user names a channel (forwarded post, `t.me` link or `@handle`), picks a
//! sort order with `1` or `2`, and receives the top entries one message at a
//! time.

pub mod parse;
pub mod session;


use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

pub use parse::classify;
pub use parse::BotCommand;
pub use session::SelectionStore;

use crate::analysis::ranked;
use crate::analysis::AnalysisRequest;
use crate::analysis::AnalysisService;
use crate::models::ChannelInfo;
use crate::models::SortMode;
use crate::report;
use crate::telegram::bot_api::BotMessage;
use crate::telegram::BotApiClient;
use crate::telegram::ChannelRef;
use crate::Result;

pub const HELP_TEXT: &str = "请通过以下任一方式告诉我要分析的频道：\n\
1. 转发该频道的任意一条消息\n\
2. 发送频道链接，如 https://t.me/channel_name\n\
3. 发送频道用户名，如 @channel_name";

/// Pause after a failed poll before trying again
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Outbound side of a chat
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str, reply_to: Option<i64>) -> Result<()>;

    async fn send_photo(&self, chat_id: i64, photo: &Path, caption: &str) -> Result<()>;
}

#[async_trait]
impl ChatSender for BotApiClient {
    async fn send_text(&self, chat_id: i64, text: &str, reply_to: Option<i64>) -> Result<()> {
        self.send_message(chat_id, text, reply_to).await
    }

    async fn send_photo(&self, chat_id: i64, photo: &Path, caption: &str) -> Result<()> {
        BotApiClient::send_photo(self, chat_id, photo, caption).await
    }
}

pub fn sort_prompt(channel: &ChannelInfo) -> String {
    format!(
        "已选择频道「{}」\n请选择排序方式（回复数字）：\n1. 按{}\n2. 按{}",
        channel.title,
        SortMode::Reactions.label(),
        SortMode::Hotness.label()
    )
}

/// Clones share the pending selections
#[derive(Clone)]
pub struct BotService<S: ChatSender> {
    sender: S,
    analysis: AnalysisService,
    selections: Arc<SelectionStore>,
    target_emojis: Vec<String>,
    send_interval: Duration,
}

impl<S: ChatSender> BotService<S> {
    pub fn new(sender: S, analysis: AnalysisService, target_emojis: Vec<String>) -> Self {
        Self {
            sender,
            analysis,
            selections: Arc::new(SelectionStore::default()),
            target_emojis,
            send_interval: crate::analysis::SEND_INTERVAL,
        }
    }

    /// Override the pause between ranking entries
    #[must_use]
    pub fn with_send_interval(mut self, interval: Duration) -> Self {
        self.send_interval = interval;
        self
    }

    pub fn selections(&self) -> &SelectionStore {
        &self.selections
    }

    /// Answer one incoming message. Failures are reported back into the chat.
    pub async fn handle_message(&self, message: &BotMessage) -> Result<()> {
        let chat_id = message.chat.id;
        let reply_to = Some(message.message_id);

        match classify(message, self.selections.is_pending(chat_id)) {
            BotCommand::Help => self.sender.send_text(chat_id, HELP_TEXT, reply_to).await,
            BotCommand::Channel(reference) => self.select_channel(chat_id, reply_to, &reference).await,
            BotCommand::Sort(mode) => match self.selections.take(chat_id) {
                Some(channel) => self.send_ranking(chat_id, reply_to, &channel, mode).await,
                None => self.sender.send_text(chat_id, HELP_TEXT, reply_to).await,
            },
        }
    }

    async fn select_channel(
        &self,
        chat_id: i64,
        reply_to: Option<i64>,
        reference: &ChannelRef,
    ) -> Result<()> {
        match self.analysis.resolve_channel(reference).await {
            Ok(channel) => {
                debug!("Chat {chat_id} selected {}", channel.title);
                let prompt = sort_prompt(&channel);
                self.selections.remember(chat_id, channel);
                self.sender.send_text(chat_id, &prompt, reply_to).await
            }
            Err(e) => {
                let text = format!("无法访问该频道（可能未加入或用户名无效）: {e}");
                self.sender.send_text(chat_id, &text, reply_to).await
            }
        }
    }

    async fn send_ranking(
        &self,
        chat_id: i64,
        reply_to: Option<i64>,
        channel: &ChannelInfo,
        mode: SortMode,
    ) -> Result<()> {
        self.sender
            .send_text(
                chat_id,
                &format!("正在分析频道「{}」，请稍候...", channel.title),
                reply_to,
            )
            .await?;

        let request = AnalysisRequest {
            target_emojis: self.target_emojis.clone(),
            force_refresh: false,
        };
        let outcome = match self.analysis.analyze(channel, &request, None).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Analysis of {} failed: {e}", channel.title);
                return self
                    .sender
                    .send_text(chat_id, &format!("获取消息失败: {e}"), reply_to)
                    .await;
            }
        };

        let mut top = ranked(&outcome.results, mode, crate::hotness_epoch());
        top.truncate(report::CHAT_TOP_N);
        if top.is_empty() {
            let text = format!("频道「{}」没有找到含表情反应的消息。", channel.title);
            return self.sender.send_text(chat_id, &text, reply_to).await;
        }

        info!(
            "Channel {}: {} messages with reactions ({:?})",
            channel.title,
            outcome.results.len(),
            outcome.source
        );

        self.sender
            .send_text(chat_id, &report::chat_header(&top, &channel.title), reply_to)
            .await?;

        for (index, record) in top.iter().enumerate() {
            let rank = index + 1;
            let photo = record.image_path.as_deref().filter(|p| p.exists());
            let sent_photo = match photo {
                Some(path) => {
                    let caption = report::chat_entry_caption(rank, record, true);
                    match self.sender.send_photo(chat_id, path, &caption).await {
                        Ok(()) => true,
                        Err(e) => {
                            debug!("Photo for entry {rank} not sent: {e}");
                            false
                        }
                    }
                }
                None => false,
            };
            if !sent_photo {
                let text = report::chat_entry_caption(rank, record, false);
                self.sender.send_text(chat_id, &text, None).await?;
            }
            tokio::time::sleep(self.send_interval).await;
        }
        Ok(())
    }
}

impl BotService<BotApiClient> {
    /// Long-poll forever, answering each message on its own task.
    /// Returns only when the bot token is rejected.
    pub async fn run(&self) -> Result<()> {
        let mut offset = 0;
        info!("Bot started, waiting for messages...");
        loop {
            let updates = match self.sender.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    warn!("Polling failed: {e}");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };
            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(message) = update.message else {
                    continue;
                };
                let bot = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = bot.handle_message(&message).await {
                        error!("Failed to answer chat {}: {e}", message.chat.id);
                    }
                });
            }
            self.selections.cleanup_expired();
        }
    }
}
