//! CLI command definitions and argument parsing

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

use crate::models::SortMode;

#[derive(Parser)]
#[command(name = "chanrank")]
#[command(about = "Rank Telegram channel messages by emoji reactions")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pick a joined channel interactively and analyze it
    Select {
        /// Number of entries to print
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// Analyze one channel
    Analyze(AnalyzeArgs),
    /// Run the chat bot
    Bot,
    /// Serve the web UI and JSON API
    Serve {
        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS for the JSON API
        #[arg(long)]
        cors: bool,
    },
    /// Cache management commands
    #[command(subcommand)]
    Cache(CacheCommands),
    /// Show current configuration
    Config,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// `@username`, username or numeric channel id (default: analyzer.channel)
    pub channel: Option<String>,
    /// Number of entries to print (default: analyzer.top_n)
    #[arg(short, long)]
    pub top: Option<usize>,
    /// Ranking order
    #[arg(short, long, value_enum, default_value = "reactions")]
    pub sort: SortArg,
    /// Only keep messages containing this text
    #[arg(short, long)]
    pub keyword: Option<String>,
    /// Ignore caches and fetch the full history again
    #[arg(short, long)]
    pub force: bool,
    /// Write the full report to a text file in the working directory
    #[arg(short, long)]
    pub export: bool,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove cached results of a channel
    Clear {
        /// Numeric channel id
        channel_id: i64,
        /// Also remove the raw fetch cache
        #[arg(long)]
        all: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortArg {
    /// Target emoji count
    Reactions,
    /// Time-decayed engagement
    Hotness,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Reactions => SortMode::Reactions,
            SortArg::Hotness => SortMode::Hotness,
        }
    }
}
