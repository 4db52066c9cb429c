#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Local;
    use tempfile::TempDir;

    use crate::analysis::*;
    use crate::cache::CacheStore;
    use crate::models::RawCacheEntry;
    use crate::models::ResultCacheEntry;
    use crate::tests::channel;
    use crate::tests::legacy_record;
    use crate::tests::record;
    use crate::tests::remote;
    use crate::tests::targets;
    use crate::tests::MockSource;

    fn result_entry() -> ResultCacheEntry {
        ResultCacheEntry {
            channel_id: 4242,
            channel_title: "Test Channel".to_string(),
            analyzed_at: Local::now().naive_local(),
            results: vec![record(1, &[("❤️", 1)])],
        }
    }

    fn raw_entry() -> RawCacheEntry {
        RawCacheEntry {
            channel_id: 4242,
            channel_title: "Test Channel".to_string(),
            fetched_at: Local::now().naive_local(),
            total_checked: 10,
            messages: vec![record(1, &[("❤️", 1)])],
        }
    }

    // ====== Decision table ======

    #[test]
    fn test_resolve_source_prefers_result_cache() {
        let lookup = resolve_source(Some(result_entry()), Some(raw_entry()), false);
        assert_eq!(lookup.source(), AnalysisSource::ResultCache);
    }

    #[test]
    fn test_resolve_source_falls_back_to_raw() {
        let lookup = resolve_source(None, Some(raw_entry()), false);
        assert_eq!(lookup.source(), AnalysisSource::RawCache);
    }

    #[test]
    fn test_resolve_source_fetches_without_caches() {
        assert_eq!(resolve_source(None, None, false).source(), AnalysisSource::Fetched);
    }

    #[test]
    fn test_resolve_source_force_always_fetches() {
        for (result, raw) in [
            (Some(result_entry()), Some(raw_entry())),
            (Some(result_entry()), None),
            (None, Some(raw_entry())),
            (None, None),
        ] {
            assert_eq!(resolve_source(result, raw, true).source(), AnalysisSource::Fetched);
        }
    }

    #[tokio::test]
    async fn test_lookup_skips_raw_cache_on_result_hit() {
        let raw_loaded = AtomicBool::new(false);
        let lookup = lookup_caches(
            false,
            || async { Some(result_entry()) },
            || async {
                raw_loaded.store(true, Ordering::SeqCst);
                Some(raw_entry())
            },
        )
        .await;

        assert_eq!(lookup.source(), AnalysisSource::ResultCache);
        assert!(!raw_loaded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_lookup_reads_raw_cache_on_result_miss() {
        let lookup = lookup_caches(
            false,
            || async { None::<ResultCacheEntry> },
            || async { Some(raw_entry()) },
        )
        .await;
        assert_eq!(lookup.source(), AnalysisSource::RawCache);
    }

    #[tokio::test]
    async fn test_lookup_forced_reads_nothing() {
        let touched = AtomicBool::new(false);
        let forced = lookup_caches(
            true,
            || async {
                touched.store(true, Ordering::SeqCst);
                Some(result_entry())
            },
            || async {
                touched.store(true, Ordering::SeqCst);
                Some(raw_entry())
            },
        )
        .await;
        assert_eq!(forced.source(), AnalysisSource::Fetched);
        assert!(!touched.load(Ordering::SeqCst));
    }

    // ====== Service ======

    fn service(dir: &TempDir, source: MockSource) -> (AnalysisService, Arc<MockSource>) {
        let source = Arc::new(source);
        let service = AnalysisService::new(source.clone(), CacheStore::new(dir.path()));
        (service, source)
    }

    fn request(emojis: &[&str], force_refresh: bool) -> AnalysisRequest {
        AnalysisRequest {
            target_emojis: targets(emojis),
            force_refresh,
        }
    }

    #[tokio::test]
    async fn test_fetch_writes_both_caches_sorted() {
        let dir = TempDir::new().unwrap();
        let history = vec![
            remote(3, Some(vec![("❤️", 1)]), false),
            remote(2, None, false),
            remote(1, Some(vec![("❤️", 5), ("😢", 2)]), false),
        ];
        let (service, source) = service(&dir, MockSource::authorized(history));

        let outcome = service
            .analyze(&channel(), &request(&["❤️"], false), None)
            .await
            .unwrap();

        assert_eq!(outcome.source, AnalysisSource::Fetched);
        assert_eq!(outcome.total_checked, Some(3));
        let ids: Vec<i64> = outcome.results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(outcome.results[0].reactions, 5);
        // one page plus the empty page that ends the walk
        assert_eq!(source.history_calls(), 2);

        let raw = service.store().load_raw(4242).await.unwrap();
        assert_eq!(raw.total_checked, 3);
        assert_eq!(raw.messages.len(), 2);
        assert!(service.store().load_result(4242).await.is_some());
    }

    #[tokio::test]
    async fn test_result_cache_reaggregates_without_remote() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        store
            .save_result(
                4242,
                "Test Channel",
                &[record(1, &[("❤️", 2), ("👍", 3)]), legacy_record(2, 8)],
            )
            .await
            .unwrap();
        let (service, source) = service(&dir, MockSource::default());

        let outcome = service
            .analyze(&channel(), &request(&["👍"], false), None)
            .await
            .unwrap();

        assert_eq!(outcome.source, AnalysisSource::ResultCache);
        assert!(outcome.cached_at.is_some());
        assert_eq!(outcome.results[0].reactions, 3);
        assert_eq!(outcome.results[1].reactions, 8);
        assert_eq!(source.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_fetch_fails_without_caches() {
        let dir = TempDir::new().unwrap();
        let (service, _) = service(&dir, MockSource::default());

        let err = service
            .analyze(&channel(), &request(&["❤️"], false), None)
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert!(service.store().load_raw(4242).await.is_none());
    }

    #[tokio::test]
    async fn test_find_channel_from_joined_list() {
        let dir = TempDir::new().unwrap();
        let (service, _) = service(&dir, MockSource::authorized(Vec::new()));
        assert_eq!(service.find_channel(4242).await.unwrap().title, "Test Channel");
        assert!(service.find_channel(1).await.unwrap_err().is_remote());
    }

    // ====== Delivery ======

    #[tokio::test]
    async fn test_send_to_saved_messages_sends_header_and_entries() {
        let source = MockSource::authorized(Vec::new());
        let records = [record(1, &[("❤️", 2)]), record(2, &[("👍", 1)])];
        let refs: Vec<_> = records.iter().collect();

        let sent = send_to_saved_messages(&source, "Test Channel", &refs, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(sent, 2);
        let messages = source.sent.lock().unwrap();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("Test Channel"));
        assert!(messages[1].starts_with("第 1 名"));
        assert!(messages[2].starts_with("第 2 名"));
    }

    #[tokio::test]
    async fn test_send_to_saved_messages_requires_login() {
        let source = MockSource::default();
        let err = send_to_saved_messages(&source, "Test Channel", &[], Duration::ZERO)
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert!(source.sent.lock().unwrap().is_empty());
    }
}
