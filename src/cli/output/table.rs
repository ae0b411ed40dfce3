//! Table output for task listings using comfy-table.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::collections::HashMap;

use super::truncate;
use crate::domain::models::{Task, TaskStatus};

pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: console::colors_enabled(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self { use_colors, max_width }
    }

    pub fn format_tasks(&self, tasks: &[Task]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["ID", "Title", "Status", "Reward", "Creator", "Worker"]));

        for task in tasks {
            let worker = if task.worker.is_empty() { "-" } else { task.worker.as_str() };
            table.add_row(vec![
                Cell::new(task.id).set_alignment(CellAlignment::Right),
                Cell::new(truncate(&task.title, 40)),
                self.status_cell(task.status),
                Cell::new(task.reward).set_alignment(CellAlignment::Right),
                Cell::new(task.creator.as_str()),
                Cell::new(worker),
            ]);
        }

        table.to_string()
    }

    /// One row per status, including statuses with no tasks.
    pub fn format_status_counts(&self, counts: &HashMap<TaskStatus, u64>) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Status", "Tasks"]));

        for status in TaskStatus::all() {
            let count = counts.get(&status).copied().unwrap_or(0);
            table.add_row(vec![
                self.status_cell(status),
                Cell::new(count).set_alignment(CellAlignment::Right),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }

    fn status_cell(&self, status: TaskStatus) -> Cell {
        if self.use_colors {
            Cell::new(status.as_str()).fg(status_color(status))
        } else {
            Cell::new(status.as_str())
        }
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Open => Color::Blue,
        TaskStatus::Claimed => Color::Yellow,
        TaskStatus::Submitted => Color::Cyan,
        TaskStatus::Verified => Color::Green,
        TaskStatus::Rejected => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Identity, NewTask};

    fn task(id: u64, title: &str) -> Task {
        NewTask {
            creator: Identity::new("alice"),
            title: title.to_string(),
            description: String::new(),
            criteria: String::new(),
            reward: 25,
        }
        .into_task(id)
    }

    #[test]
    fn test_format_tasks() {
        let formatter = TableFormatter::with_config(false, Some(120));
        let output = formatter.format_tasks(&[task(0, "Write docs"), task(1, "Fix bug")]);

        assert!(output.contains("Write docs"));
        assert!(output.contains("Fix bug"));
        assert!(output.contains("open"));
        assert!(output.contains("alice"));
    }

    #[test]
    fn test_format_status_counts_lists_every_status() {
        let formatter = TableFormatter::with_config(false, Some(80));
        let counts = HashMap::from([(TaskStatus::Open, 4)]);
        let output = formatter.format_status_counts(&counts);

        for status in TaskStatus::all() {
            assert!(output.contains(status.as_str()));
        }
        assert!(output.contains('4'));
    }
}
