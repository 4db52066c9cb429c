//! Wire types exchanged with the user-session gateway

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::models::ChannelInfo;

/// How a caller names a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Username(String),
    Id(i64),
}

impl ChannelRef {
    /// Prefer the public username, fall back to the numeric id
    pub fn from_channel(channel: &ChannelInfo) -> Self {
        match &channel.username {
            Some(username) if !username.is_empty() => Self::Username(username.clone()),
            _ => Self::Id(channel.id),
        }
    }

    /// Parse `@name`, a bare name, or a numeric id
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            return Self::Id(id);
        }
        Self::Username(trimmed.trim_start_matches('@').to_string())
    }
}

impl std::fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Username(name) => write!(f, "@{name}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// One reaction bucket on a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteReaction {
    /// `None` for custom-emoji and paid reactions
    #[serde(default)]
    pub emoticon: Option<String>,
    pub count: u64,
}

/// A channel message as returned by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMessage {
    pub id: i64,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub forwards: Option<u64>,
    #[serde(default)]
    pub reactions: Option<Vec<RemoteReaction>>,
    #[serde(default)]
    pub has_photo: bool,
}

/// Downloaded media payload
#[derive(Debug, Clone)]
pub struct MediaBlob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl MediaBlob {
    /// File extension derived from the content type, `jpg` when unknown
    pub fn extension(&self) -> &'static str {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .and_then(|ct| mime_guess::get_mime_extensions_str(ct.trim()))
            .and_then(|exts| {
                exts.iter()
                    .copied()
                    .find(|ext| *ext == "jpg")
                    .or_else(|| exts.first().copied())
            })
            .unwrap_or("jpg")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthStatusResponse {
    pub authorized: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChannelsResponse {
    pub channels: Vec<ChannelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChannelStatsResponse {
    #[serde(default)]
    pub message_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessagesResponse {
    pub messages: Vec<RemoteMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SendCodeResponse {
    pub phone_code_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SignInResponse {
    #[serde(default)]
    pub authorized: bool,
    #[serde(default)]
    pub password_needed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendTextRequest<'a> {
    pub text: &'a str,
}
