//! CLI type definitions
//!
//! Clap structures for the `bounty` command line. Per-command argument
//! structs live next to their handlers in `commands`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::init::InitArgs;
use crate::cli::commands::task::TaskArgs;
use crate::domain::models::Identity;

#[derive(Parser, Debug)]
#[command(name = "bounty")]
#[command(about = "Bounty tasks with agreed evidence verification", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .bounty/config.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Identity to act as (defaults to the login user)
    #[arg(long = "as", global = true, env = "BOUNTY_IDENTITY", value_name = "IDENTITY")]
    pub identity: Option<String>,
}

impl Cli {
    /// The caller identity for lifecycle operations.
    pub fn caller(&self) -> Identity {
        self.identity
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|name| !name.is_empty())
            .map_or_else(|| Identity::new("anonymous"), Identity::new)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration and database in a project directory
    Init(InitArgs),

    /// Create, claim, submit and verify bounty tasks
    Task(TaskArgs),
}
