//! Per-chat state between "which channel" and "which sort order"

use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;

use crate::models::ChannelInfo;

/// A resolved channel waiting for the user's `1`/`2` reply
#[derive(Debug, Clone)]
pub struct PendingSelection {
    pub channel: ChannelInfo,
    pub created_at: Instant,
}

impl PendingSelection {
    #[must_use]
    pub fn new(channel: ChannelInfo) -> Self {
        Self {
            channel,
            created_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.created_at.elapsed() > timeout
    }
}

/// Pending selections keyed by chat id
pub struct SelectionStore {
    pending: DashMap<i64, PendingSelection>,
    timeout: Duration,
}

impl SelectionStore {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            timeout,
        }
    }

    /// Remember `channel` for `chat_id`, replacing an earlier one
    pub fn remember(&self, chat_id: i64, channel: ChannelInfo) {
        self.pending.insert(chat_id, PendingSelection::new(channel));
    }

    /// Remove and return the live selection of a chat
    #[must_use]
    pub fn take(&self, chat_id: i64) -> Option<ChannelInfo> {
        let (_, selection) = self.pending.remove(&chat_id)?;
        if selection.is_expired(self.timeout) {
            tracing::debug!("Selection for chat {chat_id} expired");
            return None;
        }
        Some(selection.channel)
    }

    #[must_use]
    pub fn is_pending(&self, chat_id: i64) -> bool {
        self.pending
            .get(&chat_id)
            .is_some_and(|s| !s.is_expired(self.timeout))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn cleanup_expired(&self) {
        let timeout = self.timeout;
        self.pending.retain(|chat_id, selection| {
            let keep = !selection.is_expired(timeout);
            if !keep {
                tracing::info!("Dropped expired selection for chat {chat_id}");
            }
            keep
        });
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(600)) // 10 minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::channel;

    #[test]
    fn test_remember_and_take() {
        let store = SelectionStore::default();
        store.remember(1, channel());
        assert!(store.is_pending(1));
        assert!(!store.is_pending(2));

        assert_eq!(store.take(1).unwrap().id, 4242);
        assert!(store.take(1).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_newer_selection_replaces_older() {
        let store = SelectionStore::default();
        store.remember(1, channel());
        let mut other = channel();
        other.id = 7;
        store.remember(1, other);
        assert_eq!(store.len(), 1);
        assert_eq!(store.take(1).unwrap().id, 7);
    }

    #[test]
    fn test_expired_selection_is_dropped() {
        let store = SelectionStore::new(Duration::ZERO);
        store.remember(1, channel());
        std::thread::sleep(Duration::from_millis(2));
        assert!(!store.is_pending(1));
        store.cleanup_expired();
        assert!(store.is_empty());
        store.remember(2, channel());
        std::thread::sleep(Duration::from_millis(2));
        assert!(store.take(2).is_none());
    }
}
