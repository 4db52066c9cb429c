//! CLI module for the `chanrank` binary
//!
//! - Command line argument parsing
//! - Command handlers (one file per command in handlers/)
//! - Console output formatting and prompts

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::*;
pub use handlers::*;
pub use output::*;
