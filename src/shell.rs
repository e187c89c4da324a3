use crate::cli::{run_task_command, TaskCommand};
use crate::errors::Result;
use crate::render::render_snapshot;
use crate::session::TodoSession;
use crate::storage::KeyValueStore;
use crate::types::{Category, Filter};
use crate::utils::split_command_line;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};

#[derive(Debug, Parser)]
#[command(name = "todo", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Task(TaskCommand),

    /// Show all, active, completed or high-priority tasks.
    Filter {
        #[arg(value_enum)]
        filter: Filter,
    },

    /// Search task text; no words clears the search.
    Search { text: Vec<String> },

    /// Turn due-date ordering on or off; no argument flips it.
    Sort {
        #[arg(value_enum)]
        state: Option<Switch>,
    },

    /// Search for a category name, as clicking it in a sidebar would.
    Category {
        #[arg(value_enum)]
        category: Category,
    },

    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Switch {
    On,
    Off,
}

pub struct ShellOptions {
    pub prompt: bool,
}

/// Line-oriented loop over `input`. The view configuration lives for the
/// whole loop; the current view is redrawn after every mutation or view
/// change. Parse errors are reported and the loop continues; storage
/// failures end it.
pub fn run_shell<S, R, F>(
    session: &mut TodoSession<S>,
    input: R,
    out: &mut dyn Write,
    options: &ShellOptions,
    today: F,
) -> Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    F: Fn() -> NaiveDate,
{
    writeln!(out, "{}", render_snapshot(&session.snapshot(today())))?;
    prompt(out, options)?;
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            prompt(out, options)?;
            continue;
        }
        let words = match split_command_line(trimmed) {
            Ok(words) => words,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                prompt(out, options)?;
                continue;
            }
        };
        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(err) => {
                write!(out, "{err}")?;
                prompt(out, options)?;
                continue;
            }
        };
        let redraw = match parsed.command {
            ShellCommand::Quit => break,
            ShellCommand::Task(command) => run_task_command(session, command, today(), out)?,
            ShellCommand::Filter { filter } => {
                session.set_filter(filter);
                true
            }
            ShellCommand::Search { text } => {
                session.set_search_text(text.join(" "));
                true
            }
            ShellCommand::Sort { state } => {
                let enabled = match state {
                    Some(Switch::On) => true,
                    Some(Switch::Off) => false,
                    None => !session.view().sort_by_due,
                };
                session.set_sort(enabled);
                true
            }
            ShellCommand::Category { category } => {
                session.request_category_filter(category);
                true
            }
        };
        if redraw {
            writeln!(out, "{}", render_snapshot(&session.snapshot(today())))?;
        }
        prompt(out, options)?;
    }
    Ok(())
}

fn prompt(out: &mut dyn Write, options: &ShellOptions) -> Result<()> {
    if options.prompt {
        write!(out, "todo> ")?;
        out.flush()?;
    }
    Ok(())
}
