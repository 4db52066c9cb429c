use chanrank::cli::*;
use chanrank::runtime::BackgroundRuntime;
use chanrank::AppConfig;
use chanrank::Result;
use clap::Parser;
use tracing::info;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        print_failure(&e);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load()?;

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = if cli.verbose {
        chanrank::logging::init_logging_with_level("debug")?
    } else {
        chanrank::logging::init_logging_with_config(&config)?
    };
    info!("Configuration loaded successfully");

    if matches!(cli.command, Commands::Config) {
        handle_config_command(&config);
        return Ok(());
    }

    let ctx = CliContext::from_config(config)?;
    let runtime = BackgroundRuntime::start()?;

    match cli.command {
        Commands::Select { top } => handle_select_command(&ctx, &runtime, top),
        Commands::Analyze(args) => {
            runtime.block_on(async move { handle_analyze_command(&ctx, args).await })?
        }
        Commands::Bot => runtime.block_on(async move { handle_bot_command(&ctx).await })?,
        Commands::Serve { host, port, cors } => runtime
            .block_on(async move { handle_serve_command(&ctx, host, port, cors).await })?,
        Commands::Cache(CacheCommands::Clear { channel_id, all }) => runtime
            .block_on(async move { handle_cache_clear_command(&ctx, channel_id, all).await })?,
        Commands::Config => Ok(()),
    }
}
