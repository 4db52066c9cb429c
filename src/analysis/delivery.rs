//! Paced delivery of a ranking to the user's Saved Messages

use std::time::Duration;

use tracing::debug;
use tracing::info;

use crate::models::MessageRecord;
use crate::report;
use crate::telegram::ChannelSource;
use crate::Result;

/// Fixed pause between consecutive outbound sends
pub const SEND_INTERVAL: Duration = Duration::from_secs(1);

/// Send a header and one message per record, each with its image when cached.
///
/// Stops at the first failed send and returns the error; entries sent so far
/// stay delivered.
pub async fn send_to_saved_messages(
    source: &dyn ChannelSource,
    channel_title: &str,
    records: &[&MessageRecord],
    interval: Duration,
) -> Result<usize> {
    if !source.is_authorized().await? {
        return Err(crate::ChanRankError::Unauthorized(
            "user session is not logged in".to_string(),
        ));
    }

    source
        .send_to_saved(&report::saved_messages_header(records, channel_title), None)
        .await?;

    for (index, record) in records.iter().enumerate() {
        let photo = record.image_path.as_deref().filter(|p| p.exists());
        let text = report::chat_entry_caption(index + 1, record, photo.is_some());
        source.send_to_saved(&text, photo).await?;
        debug!("Sent entry {} of {}", index + 1, records.len());
        tokio::time::sleep(interval).await;
    }

    info!("Sent {} entries of {} to Saved Messages", records.len(), channel_title);
    Ok(records.len())
}
