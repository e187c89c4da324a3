use crate::session::{Snapshot, TaskRow};
use crate::stats::Stats;
use crate::types::{Category, Filter, Task};

pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut lines = vec![render_view_header(snapshot)];
    if snapshot.is_empty() {
        lines.push("  (no tasks)".to_string());
    }
    lines.extend(snapshot.rows.iter().map(|row| format!("  {}", render_row(row))));
    lines.push(snapshot.remaining_label.clone());
    lines.join("\n")
}

fn render_view_header(snapshot: &Snapshot) -> String {
    let mut parts = Vec::new();
    if snapshot.view.filter != Filter::All {
        parts.push(format!("filter: {}", snapshot.view.filter.as_str()));
    }
    if !snapshot.view.search.is_empty() {
        parts.push(format!("search: {:?}", snapshot.view.search));
    }
    if snapshot.view.sort_by_due {
        parts.push("sorted by due date".to_string());
    }
    if parts.is_empty() {
        "Tasks".to_string()
    } else {
        format!("Tasks ({})", parts.join(", "))
    }
}

pub fn render_row(row: &TaskRow) -> String {
    let task = &row.task;
    let mut line = format!(
        "{} {:>13}  {}  {} {} · {}",
        if task.completed { "[x]" } else { "[ ]" },
        task.id,
        task.text,
        task.category.emoji(),
        task.category,
        task.priority,
    );
    if let Some(label) = &row.due_label {
        line.push_str(&format!(" · 📅 {label}"));
        if row.overdue {
            line.push_str(" (overdue)");
        }
    }
    line
}

pub fn render_task(task: &Task) -> String {
    format!("{} {}", task.id, task.text)
}

pub fn render_stats(stats: &Stats) -> String {
    let mut lines = vec![
        format!("Total:      {}", stats.total),
        format!("Completed:  {}", stats.completed_count),
        format!("Active:     {}", stats.active_count),
        format!("Completion: {}%", stats.completion_rate),
        "Active by category:".to_string(),
    ];
    lines.extend(Category::ALL.iter().map(|&category| {
        format!(
            "  {} {:<9} {}",
            category.emoji(),
            category.as_str(),
            stats.active_in(category)
        )
    }));
    lines.push(stats.remaining_label());
    lines.join("\n")
}
