//! Unit tests for history fetching and normalization

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::telegram::fetcher::*;
    use crate::tests::channel;
    use crate::tests::remote;
    use crate::tests::targets;
    use crate::tests::MockSource;
    use crate::ChanRankError;

    // ====== Progress Tests ======

    #[test]
    fn test_progress_crosses_each_decile_once() {
        let mut tracker = ProgressTracker::new(100);
        assert!(tracker.observe(5).is_empty());
        let crossed = tracker.observe(25);
        assert_eq!(
            crossed.iter().map(|p| p.percent).collect::<Vec<_>>(),
            vec![10, 20]
        );
        assert!(tracker.observe(25).is_empty());
        let last = tracker.observe(150);
        assert_eq!(last.last().map(|p| p.percent), Some(100));
        assert!(tracker.observe(200).is_empty());
    }

    #[test]
    fn test_progress_silent_without_estimate() {
        let mut tracker = ProgressTracker::new(0);
        assert!(tracker.observe(1000).is_empty());
    }

    // ====== Normalization Tests ======

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text(None), "[无文字内容]");
        assert_eq!(truncate_text(Some("")), "[无文字内容]");
        assert_eq!(truncate_text(Some("short")), "short");

        let long = "字".repeat(TEXT_DISPLAY_LIMIT + 5);
        let cut = truncate_text(Some(&long));
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), TEXT_DISPLAY_LIMIT + 3);
    }

    #[test]
    fn test_message_link_public_and_private() {
        assert_eq!(message_link(&channel(), 9), "https://t.me/test/9");

        let mut private = channel();
        private.username = None;
        assert_eq!(message_link(&private, 9), "https://t.me/c/4242/9");
    }

    #[test]
    fn test_normalize_requires_reactions() {
        let ch = channel();
        let t = targets(&["❤️"]);
        assert!(normalize_message(&remote(1, None, false), &ch, &t).is_none());
        assert!(normalize_message(&remote(2, Some(vec![]), false), &ch, &t).is_none());
    }

    #[test]
    fn test_normalize_counts_targets_and_totals() {
        let msg = remote(3, Some(vec![("❤️", 4), ("👍", 2), ("🔥", 7)]), true);
        let record = normalize_message(&msg, &channel(), &targets(&["❤️", "👍"])).unwrap();

        assert_eq!(record.reactions, 6);
        assert_eq!(record.total_reactions, 13);
        assert_eq!(record.reaction_details.as_ref().unwrap()["🔥"], 7);
        assert_eq!(record.views, 10);
        assert_eq!(record.forwards, 0);
        assert!(record.has_photo);
        assert!(record.image_path.is_none());
        assert_eq!(record.link, "https://t.me/test/3");
    }

    // ====== Fetch Tests ======

    #[tokio::test]
    async fn test_fetch_walks_all_pages() {
        let history: Vec<_> = (1..=250)
            .rev()
            .map(|id| {
                let reactions = (id % 2 == 0).then(|| vec![("❤️", 1)]);
                remote(id, reactions, false)
            })
            .collect();
        let source = MockSource::authorized(history);
        let seen = Mutex::new(Vec::new());
        let on_progress: &(dyn Fn(FetchProgress) + Send + Sync) =
            &|p: FetchProgress| seen.lock().unwrap().push(p.percent);

        let outcome = fetch_channel_messages(&source, &channel(), &targets(&["❤️"]), Some(on_progress))
            .await
            .unwrap();

        assert_eq!(outcome.total_checked, 250);
        assert_eq!(outcome.messages.len(), 125);
        assert_eq!(source.history_calls(), 4);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
    }

    #[tokio::test]
    async fn test_fetch_continues_past_short_pages() {
        let history: Vec<_> = (1..=120)
            .rev()
            .map(|id| remote(id, Some(vec![("❤️", 1)]), false))
            .collect();
        let source = MockSource {
            page_cap: Some(50),
            ..MockSource::authorized(history)
        };

        let outcome = fetch_channel_messages(&source, &channel(), &targets(&["❤️"]), None)
            .await
            .unwrap();

        assert_eq!(outcome.total_checked, 120);
        assert_eq!(outcome.messages.len(), 120);
        assert_eq!(source.history_calls(), 4);
    }

    #[tokio::test]
    async fn test_fetch_requires_login() {
        let source = MockSource::default();
        let err = fetch_channel_messages(&source, &channel(), &targets(&["❤️"]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChanRankError::Unauthorized(_)));
        assert_eq!(source.history_calls(), 0);
    }
}
