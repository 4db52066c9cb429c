//! Reaction aggregation, hotness scoring and ranking

use std::borrow::Borrow;
use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::models::MessageRecord;
use crate::models::SortMode;

/// Weight of target reactions in the hotness base
const REACTION_WEIGHT: f64 = 0.7;

/// Weight of forwards in the hotness base
const FORWARD_WEIGHT: f64 = 0.3;

/// Days of age that are worth one order of magnitude of engagement
const DECAY_DAYS: f64 = 800.0;

/// Totals shown above every ranking
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReactionSummary {
    pub message_count: usize,
    pub total_target: u64,
    pub total_all: u64,
    /// Percentage of target reactions, `None` when there are no reactions at all
    pub target_share: Option<f64>,
}

/// Overwrite `reactions` with the target total of every record that has
/// details. Legacy records keep their stored value.
pub fn recompute_target_reactions(records: &mut [MessageRecord], target_emojis: &[String]) {
    for record in records.iter_mut() {
        if let Some(total) = record.target_total(target_emojis) {
            record.reactions = total;
        }
    }
}

/// Time-decayed engagement score.
///
/// `log10(max(reactions * 0.7 + forwards * 0.3, 1)) + days_since(epoch) / 800`
#[must_use]
pub fn hotness(record: &MessageRecord, epoch: NaiveDateTime) -> f64 {
    let base = record.reactions as f64 * REACTION_WEIGHT + record.forwards as f64 * FORWARD_WEIGHT;
    let age = record.date - epoch;
    let days = age.num_seconds() as f64 / 86_400.0;
    base.max(1.0).log10() + days / DECAY_DAYS
}

/// Records ordered by the active score, highest first. Ties keep input order.
#[must_use]
pub fn ranked<'a, I>(records: I, mode: SortMode, epoch: NaiveDateTime) -> Vec<&'a MessageRecord>
where
    I: IntoIterator<Item = &'a MessageRecord>,
{
    let mut ordered: Vec<&MessageRecord> = records.into_iter().collect();
    match mode {
        SortMode::Reactions => ordered.sort_by(|a, b| b.reactions.cmp(&a.reactions)),
        SortMode::Hotness => ordered.sort_by(|a, b| {
            hotness(b, epoch)
                .partial_cmp(&hotness(a, epoch))
                .unwrap_or(Ordering::Equal)
        }),
    }
    ordered
}

/// In-place stable sort by target reactions, as stored in the result cache
pub fn sort_by_reactions(records: &mut [MessageRecord]) {
    records.sort_by(|a, b| b.reactions.cmp(&a.reactions));
}

/// Records whose text contains `keyword`; an empty keyword keeps everything
#[must_use]
pub fn filter_by_keyword<'a>(records: &'a [MessageRecord], keyword: &str) -> Vec<&'a MessageRecord> {
    let keyword = keyword.trim();
    records
        .iter()
        .filter(|r| keyword.is_empty() || r.text.contains(keyword))
        .collect()
}

#[must_use]
pub fn summarize<R: Borrow<MessageRecord>>(records: &[R]) -> ReactionSummary {
    let total_target: u64 = records
        .iter()
        .map(|r| Borrow::<MessageRecord>::borrow(r).reactions)
        .sum();
    let total_all: u64 = records
        .iter()
        .map(|r| Borrow::<MessageRecord>::borrow(r).total_reactions)
        .sum();
    ReactionSummary {
        message_count: records.len(),
        total_target,
        total_all,
        target_share: (total_all > 0).then(|| total_target as f64 / total_all as f64 * 100.0),
    }
}

/// Whether any record predates per-emoji details
#[must_use]
pub fn has_legacy_records<R: Borrow<MessageRecord>>(records: &[R]) -> bool {
    records
        .iter()
        .any(|r| !Borrow::<MessageRecord>::borrow(r).is_recomputable())
}
