pub mod analysis;
pub mod api;
pub mod bot;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod report;
pub mod runtime;
pub mod telegram;

use chrono::DateTime;
use chrono::NaiveDateTime;

/// Hotness epoch (2020-01-01 00:00:00 UTC in seconds)
pub const HOTNESS_EPOCH_UNIX: i64 = 1_577_836_800;

/// The hotness epoch as a naive timestamp, matching how message dates are stored
pub fn hotness_epoch() -> NaiveDateTime {
    DateTime::from_timestamp(HOTNESS_EPOCH_UNIX, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

#[cfg(test)]
mod errors_tests;
#[cfg(test)]
mod models_tests;
#[cfg(test)]
pub mod tests;

pub use config::AppConfig;
pub use errors::*;
