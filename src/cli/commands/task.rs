//! Task lifecycle CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::collections::{BTreeMap, HashMap};

use crate::cli::output::{
    create_spinner_with_message, output, truncate, CommandOutput, ProgressBarExt, TableFormatter,
};
use crate::cli::CommandContext;
use crate::domain::models::{JudgmentEngineKind, Task, TaskId, TaskStatus, VerificationOutcome};
use crate::domain::ports::TaskFilter;
use crate::infrastructure::setup::open_service;

#[derive(Args, Debug)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommands,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a new open task
    Create {
        /// Task title
        title: String,
        /// What the work is
        #[arg(short, long, default_value = "")]
        description: String,
        /// Success condition the evidence is judged against
        #[arg(short, long)]
        criteria: String,
        /// Reward amount (recorded, not transferred)
        #[arg(short, long, default_value = "0")]
        reward: u64,
    },
    /// Claim an open task as the current identity
    Claim {
        /// Task ID
        id: TaskId,
    },
    /// Submit a proof URL for a claimed task
    Submit {
        /// Task ID
        id: TaskId,
        /// Where the evidence of completion can be fetched
        url: String,
    },
    /// Fetch the evidence and judge it against the criteria
    Verify {
        /// Task ID
        id: TaskId,
    },
    /// Show a task record
    Show {
        /// Task ID
        id: TaskId,
    },
    /// Print a task's status
    Status {
        /// Task ID
        id: TaskId,
    },
    /// List tasks
    List {
        /// Filter by status (open, claimed, submitted, verified, rejected)
        #[arg(short, long)]
        status: Option<String>,
        /// Maximum number of tasks to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print the number of tasks ever created
    Total,
    /// Task counts per status
    Stats,
}

#[derive(Debug, serde::Serialize)]
pub struct TaskActionOutput {
    pub success: bool,
    pub message: String,
    pub task_id: TaskId,
}

impl CommandOutput for TaskActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct VerifyOutput {
    pub task_id: TaskId,
    #[serde(flatten)]
    pub outcome: VerificationOutcome,
    pub message: String,
}

impl CommandOutput for VerifyOutput {
    fn to_human(&self) -> String {
        format!("Task {}: {}", self.task_id, self.message)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct TaskDetailOutput {
    #[serde(flatten)]
    pub task: Task,
}

impl CommandOutput for TaskDetailOutput {
    fn to_human(&self) -> String {
        let task = &self.task;
        let mut lines = vec![
            format!("Task {}: {}", task.id, task.title),
            format!("Status: {}", task.status),
            format!("Creator: {}", task.creator),
            format!("Reward: {}", task.reward),
            format!("Criteria: {}", task.criteria),
        ];
        if !task.description.is_empty() {
            lines.push(format!("Description: {}", task.description));
        }
        if !task.worker.is_empty() {
            lines.push(format!("Worker: {}", task.worker));
        }
        if !task.proof_url.is_empty() {
            lines.push(format!("Proof: {}", task.proof_url));
        }
        if !task.result.is_empty() {
            lines.push(format!("Result: {}", truncate(&task.result, 200)));
        }
        lines.push(format!("Updated: {}", task.updated_at.to_rfc3339()));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.task).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct TaskListOutput {
    pub tasks: Vec<Task>,
    pub total: usize,
}

impl CommandOutput for TaskListOutput {
    fn to_human(&self) -> String {
        if self.tasks.is_empty() {
            return "No tasks found.".to_string();
        }
        format!(
            "Found {} task(s):\n{}",
            self.total,
            TableFormatter::new().format_tasks(&self.tasks)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct StatsOutput {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        let counts: HashMap<TaskStatus, u64> = self
            .by_status
            .iter()
            .filter_map(|(status, count)| TaskStatus::from_str(status).map(|s| (s, *count)))
            .collect();
        format!(
            "{} task(s) created\n{}",
            self.total,
            TableFormatter::new().format_status_counts(&counts)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: TaskArgs, ctx: &CommandContext) -> Result<()> {
    let service = open_service(&ctx.paths, &ctx.config).await?;
    let json_mode = ctx.json_mode;

    match args.command {
        TaskCommands::Create { title, description, criteria, reward } => {
            let id = service
                .create_task(&ctx.caller, &title, &description, &criteria, reward)
                .await?;
            let out = TaskActionOutput {
                success: true,
                message: format!("Task created: {id}"),
                task_id: id,
            };
            output(&out, json_mode);
        }

        TaskCommands::Claim { id } => {
            let claimed = service.claim_task(&ctx.caller, id).await?;
            let message = if claimed {
                format!("Task {id} claimed by {}", ctx.caller)
            } else {
                format!("Task {id} cannot be claimed: it is unknown or not open")
            };
            output(&TaskActionOutput { success: claimed, message, task_id: id }, json_mode);
        }

        TaskCommands::Submit { id, url } => {
            let submitted = service.submit_proof(&ctx.caller, id, &url).await?;
            let message = if submitted {
                format!("Proof submitted for task {id}")
            } else {
                format!("Task {id} cannot accept proof: it is unknown or not claimed")
            };
            output(&TaskActionOutput { success: submitted, message, task_id: id }, json_mode);
        }

        TaskCommands::Verify { id } => {
            ensure_judgment_configured(ctx)?;

            let spinner = (!json_mode)
                .then(|| create_spinner_with_message(format!("Verifying task {id}...")));
            let result = service.verify_completion(id).await;
            if let Some(spinner) = &spinner {
                match &result {
                    Ok(outcome) if !outcome.is_error() => spinner.finish_success("Verification concluded"),
                    Ok(_) => spinner.finish_error("Verification refused"),
                    Err(_) => spinner.finish_error("Verification aborted"),
                }
            }

            let outcome = result?;
            let out = VerifyOutput { task_id: id, message: outcome.message(), outcome };
            output(&out, json_mode);
        }

        TaskCommands::Show { id } => {
            match service.find_task(id).await? {
                Some(task) => output(&TaskDetailOutput { task }, json_mode),
                None if json_mode => println!("{}", service.get_task(id).await?),
                None => println!("Task {id} not found."),
            }
        }

        TaskCommands::Status { id } => {
            let status = service.get_task_status(id).await?;
            if json_mode {
                println!("{}", serde_json::json!({ "task_id": id, "status": status }));
            } else {
                println!("{status}");
            }
        }

        TaskCommands::List { status, limit } => {
            let status = status
                .map(|s| {
                    TaskStatus::from_str(&s).ok_or_else(|| anyhow::anyhow!("Invalid status: {s}"))
                })
                .transpose()?;
            let tasks = service.list_tasks(TaskFilter { status, limit }).await?;
            let out = TaskListOutput { total: tasks.len(), tasks };
            output(&out, json_mode);
        }

        TaskCommands::Total => {
            let total = service.get_total_tasks().await?;
            if json_mode {
                println!("{}", serde_json::json!({ "total": total }));
            } else {
                println!("{total}");
            }
        }

        TaskCommands::Stats => {
            let total = service.get_total_tasks().await?;
            let by_status = service
                .get_status_counts()
                .await?
                .into_iter()
                .map(|(status, count)| (status.as_str().to_string(), count))
                .collect();
            output(&StatsOutput { total, by_status }, json_mode);
        }
    }

    Ok(())
}

/// Fail before any evidence is fetched when the API engine has no key.
fn ensure_judgment_configured(ctx: &CommandContext) -> Result<()> {
    let judgment = &ctx.config.judgment;
    if judgment.engine == JudgmentEngineKind::Anthropic && judgment.resolve_api_key().is_none() {
        anyhow::bail!(
            "No API key for the judgment engine. Set ANTHROPIC_API_KEY or judgment.api_key, \
             or use judgment.engine: mock"
        );
    }
    Ok(())
}
