//! Bounty verifier CLI entry point.

use clap::Parser;

use bounty_verifier::cli::{commands, handle_error, Cli, CommandContext, Commands};
use bounty_verifier::infrastructure::config::ConfigLoader;
use bounty_verifier::infrastructure::logging::LoggerImpl;
use bounty_verifier::infrastructure::setup::SetupPaths;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging)?;

    let ctx = CommandContext {
        json_mode: cli.json,
        caller: cli.caller(),
        paths: SetupPaths::new()?,
        config,
    };

    match cli.command {
        Commands::Init(args) => commands::init::execute(args, &ctx).await,
        Commands::Task(args) => commands::task::execute(args, &ctx).await,
    }
}
