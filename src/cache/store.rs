//! Per-channel JSON cache files and the image directory
//!
//! Layout under the cache dir:
//! - `raw_<channel_id>.json`: fetch output, see [`RawCacheEntry`]
//! - `channel_<channel_id>.json`: processed results, see [`ResultCacheEntry`]
//! - `images/<channel_id>/<message_id>.<ext>`: downloaded photos

use std::path::Path;
use std::path::PathBuf;

use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::debug;
use tracing::warn;

use crate::models::MessageRecord;
use crate::models::RawCacheEntry;
use crate::models::ResultCacheEntry;
use crate::Result;

/// File-backed cache for one installation. No locking: last write wins.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &crate::AppConfig) -> Self {
        Self::new(config.cache_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn raw_path(&self, channel_id: i64) -> PathBuf {
        self.dir.join(format!("raw_{channel_id}.json"))
    }

    pub fn result_path(&self, channel_id: i64) -> PathBuf {
        self.dir.join(format!("channel_{channel_id}.json"))
    }

    pub fn image_dir(&self, channel_id: i64) -> PathBuf {
        self.dir.join("images").join(channel_id.to_string())
    }

    /// Raw cache for a channel; any read or parse failure is a miss
    pub async fn load_raw(&self, channel_id: i64) -> Option<RawCacheEntry> {
        read_json(&self.raw_path(channel_id)).await
    }

    /// Replace the raw cache for a channel
    pub async fn save_raw(
        &self,
        channel_id: i64,
        channel_title: &str,
        messages: &[MessageRecord],
        total_checked: u64,
    ) -> Result<RawCacheEntry> {
        let entry = RawCacheEntry {
            channel_id,
            channel_title: channel_title.to_string(),
            fetched_at: Local::now().naive_local(),
            total_checked,
            messages: messages.to_vec(),
        };
        write_json(&self.raw_path(channel_id), &entry).await?;
        debug!(
            "Saved raw cache for channel {channel_id}: {} messages",
            entry.messages.len()
        );
        Ok(entry)
    }

    /// Result cache for a channel; any read or parse failure is a miss.
    ///
    /// Image paths whose file has since disappeared are reset to `None`.
    pub async fn load_result(&self, channel_id: i64) -> Option<ResultCacheEntry> {
        let mut entry: ResultCacheEntry = read_json(&self.result_path(channel_id)).await?;
        for record in &mut entry.results {
            if let Some(path) = &record.image_path {
                if !fs::try_exists(path).await.unwrap_or(false) {
                    debug!("Cached image {} is gone", path.display());
                    record.image_path = None;
                }
            }
        }
        Some(entry)
    }

    /// Replace the result cache for a channel
    pub async fn save_result(
        &self,
        channel_id: i64,
        channel_title: &str,
        results: &[MessageRecord],
    ) -> Result<ResultCacheEntry> {
        let entry = ResultCacheEntry {
            channel_id,
            channel_title: channel_title.to_string(),
            analyzed_at: Local::now().naive_local(),
            results: results.to_vec(),
        };
        write_json(&self.result_path(channel_id), &entry).await?;
        debug!(
            "Saved result cache for channel {channel_id}: {} results",
            entry.results.len()
        );
        Ok(entry)
    }

    /// Existing image for a message, matched by file stem with any extension
    pub async fn find_image(&self, channel_id: i64, message_id: i64) -> Option<PathBuf> {
        let mut entries = fs::read_dir(self.image_dir(channel_id)).await.ok()?;
        let stem = message_id.to_string();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str()) && path.is_file()
            {
                return Some(path);
            }
        }
        None
    }

    /// Store image bytes as `<message_id>.<ext>` and return the path
    pub async fn store_image(
        &self,
        channel_id: i64,
        message_id: i64,
        extension: &str,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let dir = self.image_dir(channel_id);
        fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{message_id}.{extension}"));
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Remove the result cache and downloaded images of a channel
    pub async fn clear_result(&self, channel_id: i64) -> Result<()> {
        remove_file_if_exists(&self.result_path(channel_id)).await?;
        let images = self.image_dir(channel_id);
        if fs::try_exists(&images).await.unwrap_or(false) {
            fs::remove_dir_all(&images).await?;
        }
        debug!("Cleared result cache for channel {channel_id}");
        Ok(())
    }

    /// Remove every cache file of a channel
    pub async fn clear_all(&self, channel_id: i64) -> Result<()> {
        self.clear_result(channel_id).await?;
        remove_file_if_exists(&self.raw_path(channel_id)).await?;
        debug!("Cleared all caches for channel {channel_id}");
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let Ok(bytes) = fs::read(path).await else {
        return None;
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Cache file corrupted {}: {err}", path.display());
            None
        }
    }
}

/// Whole-file replace through a sibling temp file
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

async fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
