//! Command line interface.

pub mod commands;
pub mod output;
pub mod types;

use console::style;

use crate::domain::errors::DomainError;
use crate::domain::models::{Config, Identity};
use crate::infrastructure::setup::SetupPaths;

pub use types::{Cli, Commands};

/// Everything a command handler needs besides its own arguments.
pub struct CommandContext {
    pub json_mode: bool,
    pub caller: Identity,
    pub config: Config,
    pub paths: SetupPaths,
}

/// Report a failed command and exit with status 1.
///
/// Aborted verification rounds and storage conflicts are flagged as
/// retryable; the task they touched is unchanged.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let retryable = err
        .downcast_ref::<DomainError>()
        .is_some_and(DomainError::is_retryable);

    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
            "retryable": retryable,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        if retryable {
            eprintln!("{}", style("No task was changed. The command can be retried.").dim());
        }
    }

    std::process::exit(1)
}
