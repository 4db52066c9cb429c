//! Interpreting incoming bot messages

use std::sync::OnceLock;

use regex::Regex;

use crate::models::SortMode;
use crate::telegram::bot_api::bare_channel_id;
use crate::telegram::bot_api::BotMessage;
use crate::telegram::ChannelRef;

/// What a chat message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Analyze this channel (forwarded post, link or handle)
    Channel(ChannelRef),
    /// Reply to the sort-order question
    Sort(SortMode),
    /// `/start`, `/help` or anything unrecognized
    Help,
}

fn channel_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:https?://t\.me/|@)([a-zA-Z]\w{3,})").expect("channel pattern is valid")
    })
}

/// Username from a leading `https://t.me/<name>` or `@<name>`
pub fn parse_channel_reference(text: &str) -> Option<String> {
    channel_pattern()
        .captures(text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `1` → reactions, `2` → hotness
pub fn parse_sort_reply(text: &str) -> Option<SortMode> {
    match text.trim() {
        "1" => Some(SortMode::Reactions),
        "2" => Some(SortMode::Hotness),
        _ => None,
    }
}

/// Classify a message. Sort replies only count while a selection is pending.
pub fn classify(message: &BotMessage, awaiting_sort: bool) -> BotCommand {
    if let Some(chat) = message.forwarded_channel() {
        return BotCommand::Channel(ChannelRef::Id(bare_channel_id(chat.id)));
    }
    let body = message.body();
    if awaiting_sort {
        if let Some(mode) = parse_sort_reply(body) {
            return BotCommand::Sort(mode);
        }
    }
    match parse_channel_reference(body) {
        Some(username) => BotCommand::Channel(ChannelRef::Username(username)),
        None => BotCommand::Help,
    }
}
