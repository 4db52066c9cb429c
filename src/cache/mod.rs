//! On-disk caches for fetched and processed channel data

pub mod store;


pub use store::CacheStore;
