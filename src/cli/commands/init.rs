//! Implementation of the `bounty init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::cli::CommandContext;
use crate::infrastructure::config::{ConfigLoader, CONFIG_FILE};
use crate::infrastructure::setup::{create_config_file, initialize_store, SetupPaths};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file with the defaults
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub config_written: bool,
    pub database_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            let config_file = self.initialized_path.join(CONFIG_FILE);
            lines.push(format!("\nWrote default configuration to {}", config_file.display()));
        } else {
            lines.push("\nKept existing configuration (use --force to overwrite)".to_string());
        }
        lines.push(format!("Database ready at {}", self.database_path.display()));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, ctx: &CommandContext) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let paths = SetupPaths::for_root(&target_path);
    let reinitializing = paths.is_initialized();
    let config_written = create_config_file(&paths, args.force)?;

    // The database location comes from the project's own config file.
    let config = ConfigLoader::load_from_file(&paths.config_file)?;
    let database_path = initialize_store(&paths, &config).await?;

    let out = InitOutput {
        success: true,
        message: if reinitializing {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path,
        config_written,
        database_path,
    };
    output(&out, ctx.json_mode);
    Ok(())
}
