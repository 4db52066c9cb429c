//! Telegram Bot API client (long polling)

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::config::AppConfig;
use crate::report::truncate_chars;
use crate::report::MAX_CAPTION_CHARS;
use crate::report::MAX_MESSAGE_CHARS;
use crate::ChanRankError;
use crate::Result;

const BOT_API_BASE: &str = "https://api.telegram.org";

/// Seconds a `getUpdates` call may wait for new messages
pub const LONG_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
struct BotResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<BotMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Origin of a forwarded message (`forward_origin`)
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardOrigin {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub chat: Option<Chat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotMessage {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub forward_origin: Option<ForwardOrigin>,
    /// Older Bot API servers still send this instead of `forward_origin`
    #[serde(default)]
    pub forward_from_chat: Option<Chat>,
}

impl BotMessage {
    /// Channel this message was forwarded from, if any
    pub fn forwarded_channel(&self) -> Option<&Chat> {
        self.forward_origin
            .as_ref()
            .filter(|origin| origin.kind == "channel")
            .and_then(|origin| origin.chat.as_ref())
            .or(self.forward_from_chat.as_ref())
            .filter(|chat| chat.kind == "channel")
    }

    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
    disable_web_page_preview: bool,
}

/// Bot API client
#[derive(Clone)]
pub struct BotApiClient {
    client: Client,
    base_url: String,
}

impl BotApiClient {
    pub fn new(client: Client, token: &str) -> Self {
        Self::with_base_url(client, BOT_API_BASE, token)
    }

    /// Point at a self-hosted Bot API server
    pub fn with_base_url(client: Client, base: &str, token: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/bot{}", base.trim_end_matches('/'), token),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if !config.has_bot_token() {
            return Err(ChanRankError::Config(
                "未配置 bot_token，请在 config.toml [telegram] 段或环境变量 TELEGRAM_BOT_TOKEN 中设置"
                    .to_string(),
            ));
        }
        // Long polls must outlive the server-side wait
        let timeout = Duration::from_secs(LONG_POLL_TIMEOUT_SECS + 30);
        let client = super::build_http_client(&config.proxy, timeout)?;
        Ok(Self::new(client, config.telegram.bot_token.trim()))
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ChanRankError::RemoteAccess(format!("bot {method}: {e}")))?;
        let status = response.status();
        let body: BotResponse<T> = response.json().await?;
        if !body.ok {
            let description = body.description.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(ChanRankError::Unauthorized(format!(
                    "bot token rejected: {description}"
                )));
            }
            return Err(ChanRankError::RemoteAccess(format!(
                "bot {method}: HTTP {status} {description}"
            )));
        }
        body.result
            .ok_or_else(|| ChanRankError::RemoteAccess(format!("bot {method}: empty result")))
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let request = self.client.post(self.endpoint("getUpdates")).json(&GetUpdatesRequest {
            offset,
            timeout: LONG_POLL_TIMEOUT_SECS,
            allowed_updates: vec!["message"],
        });
        self.call("getUpdates", request).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str, reply_to: Option<i64>) -> Result<()> {
        let text = truncate_chars(text, MAX_MESSAGE_CHARS);
        let request = self.client.post(self.endpoint("sendMessage")).json(&SendMessageRequest {
            chat_id,
            text: &text,
            reply_to_message_id: reply_to,
            disable_web_page_preview: true,
        });
        let _: serde_json::Value = self.call("sendMessage", request).await?;
        Ok(())
    }

    pub async fn send_photo(&self, chat_id: i64, photo: &Path, caption: &str) -> Result<()> {
        let bytes = tokio::fs::read(photo).await?;
        let file_name = photo
            .file_name()
            .map_or_else(|| "photo.jpg".to_string(), |n| n.to_string_lossy().into_owned());
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", truncate_chars(caption, MAX_CAPTION_CHARS))
            .part("photo", reqwest::multipart::Part::bytes(bytes).file_name(file_name));
        let request = self.client.post(self.endpoint("sendPhoto")).multipart(form);
        let _: serde_json::Value = self.call("sendPhoto", request).await?;
        Ok(())
    }
}

/// Map a Bot API channel id (`-100XXXXXXXXXX`) to the bare MTProto id
pub fn bare_channel_id(bot_chat_id: i64) -> i64 {
    if bot_chat_id >= 0 {
        return bot_chat_id;
    }
    let digits = bot_chat_id.unsigned_abs().to_string();
    digits
        .strip_prefix("100")
        .and_then(|rest| rest.parse::<i64>().ok())
        .unwrap_or_else(|| bot_chat_id.saturating_abs())
}
