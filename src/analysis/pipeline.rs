//! Tiered analysis: result cache, then raw cache, then a full fetch

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use super::media::MediaResolver;
use super::scoring::recompute_target_reactions;
use super::scoring::sort_by_reactions;
use crate::cache::CacheStore;
use crate::models::ChannelInfo;
use crate::models::MessageRecord;
use crate::models::RawCacheEntry;
use crate::models::ResultCacheEntry;
use crate::telegram::fetch_channel_messages;
use crate::telegram::ChannelRef;
use crate::telegram::ChannelSource;
use crate::telegram::FetchProgress;
use crate::Result;

/// Where the records of an analysis came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    ResultCache,
    RawCache,
    Fetched,
}

impl AnalysisSource {
    /// Short note shown next to results
    pub fn describe(self) -> &'static str {
        match self {
            Self::ResultCache => "结果缓存",
            Self::RawCache => "原始数据缓存",
            Self::Fetched => "实时获取",
        }
    }
}

/// Outcome of the cache decision, carrying the entry that will be used
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Result(ResultCacheEntry),
    Raw(RawCacheEntry),
    Fetch,
}

impl CacheLookup {
    pub fn source(&self) -> AnalysisSource {
        match self {
            Self::Result(_) => AnalysisSource::ResultCache,
            Self::Raw(_) => AnalysisSource::RawCache,
            Self::Fetch => AnalysisSource::Fetched,
        }
    }
}

/// Pick the cheapest usable tier. Forcing a refresh always fetches.
pub fn resolve_source(
    result: Option<ResultCacheEntry>,
    raw: Option<RawCacheEntry>,
    force_refresh: bool,
) -> CacheLookup {
    match (force_refresh, result, raw) {
        (true, _, _) => CacheLookup::Fetch,
        (false, Some(result), _) => CacheLookup::Result(result),
        (false, None, Some(raw)) => CacheLookup::Raw(raw),
        (false, None, None) => CacheLookup::Fetch,
    }
}

/// Load only the tiers [`resolve_source`] needs. The raw cache is read
/// only when the result cache misses.
pub async fn lookup_caches<FR, R, FW, W>(force_refresh: bool, load_result: FR, load_raw: FW) -> CacheLookup
where
    FR: FnOnce() -> R,
    R: Future<Output = Option<ResultCacheEntry>>,
    FW: FnOnce() -> W,
    W: Future<Output = Option<RawCacheEntry>>,
{
    if force_refresh {
        return CacheLookup::Fetch;
    }
    let result = load_result().await;
    let raw = match result {
        Some(_) => None,
        None => load_raw().await,
    };
    resolve_source(result, raw, false)
}

/// Parameters that change between runs without invalidating caches
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub target_emojis: Vec<String>,
    pub force_refresh: bool,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub channel: ChannelInfo,
    pub source: AnalysisSource,
    /// Sorted by target reactions at the time the result cache was written
    pub results: Vec<MessageRecord>,
    /// When the reused cache entry was produced, `None` for fresh results
    pub cached_at: Option<NaiveDateTime>,
    /// Messages scanned by the fetch that produced the data, when known
    pub total_checked: Option<u64>,
}

/// Shared analysis core used by the CLI, the bot and the web UI
#[derive(Clone)]
pub struct AnalysisService {
    source: Arc<dyn ChannelSource>,
    store: CacheStore,
}

impl AnalysisService {
    pub fn new(source: Arc<dyn ChannelSource>, store: CacheStore) -> Self {
        Self { source, store }
    }

    pub fn source(&self) -> &dyn ChannelSource {
        self.source.as_ref()
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub async fn list_channels(&self) -> Result<Vec<ChannelInfo>> {
        self.source.list_channels().await
    }

    pub async fn resolve_channel(&self, reference: &ChannelRef) -> Result<ChannelInfo> {
        self.source.resolve_channel(reference).await
    }

    /// Channel info from the joined list, falling back to a remote lookup
    pub async fn find_channel(&self, channel_id: i64) -> Result<ChannelInfo> {
        let channels = self.source.list_channels().await?;
        match channels.into_iter().find(|c| c.id == channel_id) {
            Some(channel) => Ok(channel),
            None => self.source.resolve_channel(&ChannelRef::Id(channel_id)).await,
        }
    }

    /// Produce ranked records for a channel, reusing caches where possible.
    ///
    /// # Errors
    /// - `Unauthorized` when the session is logged out and remote work is needed
    /// - `RemoteAccess` / `ChannelNotFound` when the fetch fails
    /// - `Io` when a cache file cannot be written
    pub async fn analyze(
        &self,
        channel: &ChannelInfo,
        request: &AnalysisRequest,
        on_progress: Option<&(dyn Fn(FetchProgress) + Send + Sync)>,
    ) -> Result<AnalysisOutcome> {
        let lookup = lookup_caches(
            request.force_refresh,
            || self.store.load_result(channel.id),
            || self.store.load_raw(channel.id),
        )
        .await;
        let source = lookup.source();
        info!("Analyzing {} from {:?}", channel.title, source);

        match lookup {
            CacheLookup::Result(entry) => {
                let mut results = entry.results;
                recompute_target_reactions(&mut results, &request.target_emojis);
                Ok(AnalysisOutcome {
                    channel: channel.clone(),
                    source,
                    results,
                    cached_at: Some(entry.analyzed_at),
                    total_checked: None,
                })
            }
            CacheLookup::Raw(entry) => {
                let results = self.process(channel, entry.messages, request).await?;
                Ok(AnalysisOutcome {
                    channel: channel.clone(),
                    source,
                    results,
                    cached_at: Some(entry.fetched_at),
                    total_checked: Some(entry.total_checked),
                })
            }
            CacheLookup::Fetch => {
                let fetched = fetch_channel_messages(
                    self.source.as_ref(),
                    channel,
                    &request.target_emojis,
                    on_progress,
                )
                .await?;
                self.store
                    .save_raw(channel.id, &channel.title, &fetched.messages, fetched.total_checked)
                    .await?;
                let results = self.process(channel, fetched.messages, request).await?;
                Ok(AnalysisOutcome {
                    channel: channel.clone(),
                    source,
                    results,
                    cached_at: None,
                    total_checked: Some(fetched.total_checked),
                })
            }
        }
    }

    /// Score, sort, attach images and persist the result cache
    async fn process(
        &self,
        channel: &ChannelInfo,
        mut records: Vec<MessageRecord>,
        request: &AnalysisRequest,
    ) -> Result<Vec<MessageRecord>> {
        recompute_target_reactions(&mut records, &request.target_emojis);
        sort_by_reactions(&mut records);
        for record in &mut records {
            record.image_path = None;
        }
        MediaResolver::new(self.source.as_ref(), &self.store)
            .resolve(channel, &mut records)
            .await?;
        self.store
            .save_result(channel.id, &channel.title, &records)
            .await?;
        Ok(records)
    }

    pub async fn clear_result(&self, channel_id: i64) -> Result<()> {
        self.store.clear_result(channel_id).await
    }

    pub async fn clear_all(&self, channel_id: i64) -> Result<()> {
        self.store.clear_all(channel_id).await
    }
}
