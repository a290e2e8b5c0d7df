// Terminal rendering of tasks

use crate::task::{Task, TaskStats, TaskStatus};
use colored::{ColoredString, Colorize};

const PREVIEW_CHARS: usize = 35;

pub fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "✓",
        TaskStatus::Pending => "○",
    }
}

/// Short description suffix shown after the title, empty when there is none
pub fn description_preview(description: Option<&str>) -> String {
    match description {
        Some(desc) if !desc.is_empty() => {
            let preview: String = desc.chars().take(PREVIEW_CHARS).collect();
            if desc.chars().count() > PREVIEW_CHARS {
                format!(" • {}...", preview)
            } else {
                format!(" • {}", preview)
            }
        }
        _ => String::new(),
    }
}

/// One list row, e.g. `○ [3] Buy milk • two litres`
pub fn format_row(task: &Task) -> String {
    format!(
        "{} [{}] {}{}",
        status_icon(task.status),
        task.id,
        task.title,
        description_preview(task.description.as_deref())
    )
}

pub fn render_row(task: &Task) -> ColoredString {
    let row = format_row(task);
    match task.status {
        TaskStatus::Completed => row.green(),
        TaskStatus::Pending => row.yellow(),
    }
}

pub fn format_stats(stats: &TaskStats) -> String {
    format!(
        "Total: {}  Pending: {}  Completed: {}",
        stats.total, stats.pending, stats.completed
    )
}

/// Full list view: one row per task followed by the stats line
pub fn render_list(tasks: &[Task]) -> Vec<String> {
    let mut lines: Vec<String> = if tasks.is_empty() {
        vec!["No tasks yet.".dimmed().to_string()]
    } else {
        tasks.iter().map(|t| render_row(t).to_string()).collect()
    };

    lines.push(String::new());
    lines.push(format_stats(&TaskStats::from_tasks(tasks)).bold().to_string());
    lines
}
