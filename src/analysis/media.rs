//! Local image cache for the top of a ranking

use tracing::debug;
use tracing::info;

use crate::cache::CacheStore;
use crate::models::ChannelInfo;
use crate::models::MessageRecord;
use crate::telegram::ChannelSource;
use crate::ChanRankError;
use crate::Result;

/// Ranked entries that get a local image
pub const MEDIA_TOP_N: usize = 50;

/// Fills `image_path` for the leading photo records of a ranking
pub struct MediaResolver<'a> {
    source: &'a dyn ChannelSource,
    store: &'a CacheStore,
}

impl<'a> MediaResolver<'a> {
    pub fn new(source: &'a dyn ChannelSource, store: &'a CacheStore) -> Self {
        Self { source, store }
    }

    /// Attach images to the first [`MEDIA_TOP_N`] records that have a photo.
    ///
    /// Images already on disk are reused. The remote is only contacted when at
    /// least one image is missing, and a failed download just leaves
    /// `image_path` empty.
    ///
    /// # Errors
    /// - `Unauthorized` when downloads are needed but the session is logged out
    pub async fn resolve(&self, channel: &ChannelInfo, records: &mut [MessageRecord]) -> Result<usize> {
        let limit = records.len().min(MEDIA_TOP_N);
        let mut missing = Vec::new();

        for (index, record) in records[..limit].iter_mut().enumerate() {
            if !record.has_photo {
                continue;
            }
            match self.store.find_image(channel.id, record.id).await {
                Some(path) => record.image_path = Some(path),
                None => missing.push(index),
            }
        }

        if missing.is_empty() {
            debug!("All images for {} already cached", channel.title);
            return Ok(0);
        }

        if !self.source.is_authorized().await? {
            return Err(ChanRankError::Unauthorized(
                "user session is not logged in".to_string(),
            ));
        }

        info!("Downloading {} images for {}", missing.len(), channel.title);
        let mut downloaded = 0;
        for index in missing {
            let record = &mut records[index];
            match self.download(channel, record.id).await {
                Ok(Some(path)) => {
                    record.image_path = Some(path);
                    downloaded += 1;
                }
                Ok(None) => debug!("Message {} has no photo to download", record.id),
                Err(e) => debug!("Image download for message {} failed: {e}", record.id),
            }
        }
        Ok(downloaded)
    }

    async fn download(
        &self,
        channel: &ChannelInfo,
        message_id: i64,
    ) -> Result<Option<std::path::PathBuf>> {
        let Some(blob) = self.source.download_photo(channel, message_id).await? else {
            return Ok(None);
        };
        let path = self
            .store
            .store_image(channel.id, message_id, blob.extension(), &blob.bytes)
            .await?;
        Ok(Some(path))
    }
}
