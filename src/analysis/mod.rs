//! Analysis core shared by every entry point
//!
//! Fetch → raw cache → scoring → media → result cache. Later runs start from
//! the cheapest cache tier that is still usable.

pub mod delivery;
pub mod media;
pub mod pipeline;
pub mod scoring;

#[cfg(test)]
mod pipeline_tests;

pub use delivery::send_to_saved_messages;
pub use delivery::SEND_INTERVAL;
pub use media::MediaResolver;
pub use media::MEDIA_TOP_N;
pub use pipeline::lookup_caches;
pub use pipeline::resolve_source;
pub use pipeline::AnalysisOutcome;
pub use pipeline::AnalysisRequest;
pub use pipeline::AnalysisService;
pub use pipeline::AnalysisSource;
pub use pipeline::CacheLookup;
pub use scoring::filter_by_keyword;
pub use scoring::has_legacy_records;
pub use scoring::hotness;
pub use scoring::ranked;
pub use scoring::recompute_target_reactions;
pub use scoring::summarize;
pub use scoring::ReactionSummary;
