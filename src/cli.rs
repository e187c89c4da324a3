use crate::dates::parse_due_date;
use crate::errors::Result;
use crate::render::{render_snapshot, render_stats, render_task};
use crate::session::TodoSession;
use crate::storage::KeyValueStore;
use crate::task_store::UpdateOutcome;
use crate::types::{Category, Filter, Priority, TaskDraft, Theme};
use crate::view::ViewConfig;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "todo-list-rs",
    version,
    about = "Keep a categorized, prioritized todo list on disk"
)]
pub struct Cli {
    /// Profile name; selects the state directory.
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// SQLite file holding the list (overrides TODO_DB).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log filter directive such as `debug` (overrides TODO_LOG).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Keep the list in memory only; nothing is read from or written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Task(TaskCommand),

    /// Read commands from stdin, keeping the view between lines.
    Shell,
}

/// Commands shared by one-shot invocations and the shell.
#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Add a task.
    Add(AddArgs),

    /// Show tasks through the current view.
    #[command(alias = "ls")]
    List(ListArgs),

    /// Flip a task between open and completed.
    #[command(alias = "done")]
    Toggle { id: i64 },

    /// Remove a task.
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Change a task; omitted fields keep their current values.
    Edit(EditArgs),

    /// Remove every completed task.
    ClearCompleted,

    /// Totals, completion rate and open tasks per category.
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Show or change the display theme.
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    #[arg(long, short, value_enum, default_value_t = Category::Work)]
    pub category: Category,

    #[arg(long, short, value_enum, default_value_t = Priority::Medium)]
    pub priority: Priority,

    /// Due date as YYYY-MM-DD.
    #[arg(long, short, value_parser = parse_due_date)]
    pub due: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, short, value_enum)]
    pub filter: Option<Filter>,

    /// Case-insensitive text search.
    #[arg(long, short)]
    pub search: Option<String>,

    /// Order by due date, undated tasks last.
    #[arg(long)]
    pub sort: bool,

    /// Search for the category name (resets the filter to `all`).
    #[arg(long, short, value_enum)]
    pub category: Option<Category>,

    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn apply_to(&self, view: &mut ViewConfig) {
        if let Some(filter) = self.filter {
            view.set_filter(filter);
        }
        if let Some(search) = &self.search {
            view.set_search_text(search.clone());
        }
        if self.sort {
            view.set_sort(true);
        }
        if let Some(category) = self.category {
            view.request_category_filter(category);
        }
    }
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: i64,

    #[arg(long, short)]
    pub text: Option<String>,

    #[arg(long, short, value_enum)]
    pub category: Option<Category>,

    #[arg(long, short, value_enum)]
    pub priority: Option<Priority>,

    #[arg(long, short, value_parser = parse_due_date, conflicts_with = "no_due")]
    pub due: Option<NaiveDate>,

    /// Remove the due date.
    #[arg(long)]
    pub no_due: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeMode {
    Dark,
    Light,
    Toggle,
}

/// Runs one command against the session, writing human-readable (or JSON)
/// output. Returns true when the task collection changed.
pub fn run_task_command<S: KeyValueStore>(
    session: &mut TodoSession<S>,
    command: TaskCommand,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<bool> {
    match command {
        TaskCommand::Add(args) => {
            let draft = TaskDraft::new(args.text.join(" "))
                .category(args.category)
                .priority(args.priority)
                .due(args.due);
            match session.create(draft)? {
                Some(task) => {
                    writeln!(out, "Added {}", render_task(&task))?;
                    Ok(true)
                }
                None => {
                    writeln!(out, "Nothing added: task text is empty")?;
                    Ok(false)
                }
            }
        }
        TaskCommand::List(args) => {
            let mut view = session.view().clone();
            args.apply_to(&mut view);
            session.set_view(view);
            let snapshot = session.snapshot(today);
            if args.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
            } else {
                writeln!(out, "{}", render_snapshot(&snapshot))?;
            }
            Ok(false)
        }
        TaskCommand::Toggle { id } => match session.toggle_completed(id)? {
            Some(task) => {
                let verb = if task.completed { "Completed" } else { "Reopened" };
                writeln!(out, "{verb} {}", render_task(&task))?;
                Ok(true)
            }
            None => {
                writeln!(out, "No task with id {id}")?;
                Ok(false)
            }
        },
        TaskCommand::Delete { id } => {
            if session.delete(id)? {
                writeln!(out, "Deleted {id}")?;
                Ok(true)
            } else {
                writeln!(out, "No task with id {id}")?;
                Ok(false)
            }
        }
        TaskCommand::Edit(args) => {
            let Some(current) = session.find(args.id).cloned() else {
                writeln!(out, "No task with id {}", args.id)?;
                return Ok(false);
            };
            let due = if args.no_due {
                None
            } else {
                args.due.or(current.due_date)
            };
            let draft = TaskDraft::new(args.text.unwrap_or(current.text))
                .category(args.category.unwrap_or(current.category))
                .priority(args.priority.unwrap_or(current.priority))
                .due(due);
            match session.update(args.id, draft)? {
                UpdateOutcome::Updated(task) => {
                    writeln!(out, "Updated {}", render_task(&task))?;
                    Ok(true)
                }
                UpdateOutcome::EmptyText => {
                    writeln!(out, "Not updated: task text is empty")?;
                    Ok(false)
                }
                UpdateOutcome::NotFound => {
                    writeln!(out, "No task with id {}", args.id)?;
                    Ok(false)
                }
            }
        }
        TaskCommand::ClearCompleted => {
            let removed = session.clear_completed()?;
            let noun = if removed == 1 { "task" } else { "tasks" };
            writeln!(out, "Cleared {removed} completed {noun}")?;
            Ok(removed > 0)
        }
        TaskCommand::Stats { json } => {
            let stats = session.stats();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else {
                writeln!(out, "{}", render_stats(&stats))?;
            }
            Ok(false)
        }
        TaskCommand::Theme { mode } => {
            let theme = match mode {
                None => session.theme(),
                Some(ThemeMode::Dark) => session.set_theme(Theme::Dark)?,
                Some(ThemeMode::Light) => session.set_theme(Theme::Light)?,
                Some(ThemeMode::Toggle) => session.toggle_theme()?,
            };
            writeln!(out, "Theme: {}", theme.as_str())?;
            Ok(false)
        }
    }
}
