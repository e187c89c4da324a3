mod cli;
mod config;
mod dates;
mod errors;
mod render;
mod session;
mod shell;
mod stats;
mod storage;
mod task_store;
mod types;
mod utils;
mod view;

use crate::cli::{run_task_command, Cli, Command, ListArgs, TaskCommand};
use crate::config::{AppConfig, ConfigOverrides};
use crate::dates::local_today;
use crate::errors::Result;
use crate::session::TodoSession;
use crate::shell::{run_shell, ShellOptions};
use crate::storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
use clap::Parser;
use std::fs;
use std::io::{self, IsTerminal, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let config = AppConfig::resolve(&ConfigOverrides {
        name: cli.name.clone(),
        db: cli.db.clone(),
        log_level: cli.log_level.clone(),
    });
    init_logging(&config.log_filter);

    if let Err(err) = run(cli, &config) {
        tracing::error!(error = %err, db = %config.db_path.display(), "todo list command failed");
        eprintln!("[{}] {err}", config.name);
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &AppConfig) -> Result<()> {
    if cli.ephemeral {
        tracing::info!("using in-memory todo store");
        let session = TodoSession::open(MemoryKeyValueStore::new())?;
        return run_command(session, cli.command);
    }
    if let Some(parent) = config.db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let gateway = SqliteKeyValueStore::open(&config.db_path)?;
    tracing::info!(
        db = %config.db_path.display(),
        state_dir = %config.state_dir.display(),
        "opened todo store"
    );
    run_command(TodoSession::open(gateway)?, cli.command)
}

fn run_command<S: KeyValueStore>(mut session: TodoSession<S>, command: Option<Command>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Some(Command::Shell) => {
            let options = ShellOptions {
                prompt: io::stdin().is_terminal(),
            };
            run_shell(&mut session, io::stdin().lock(), &mut out, &options, local_today)?;
        }
        Some(Command::Task(command)) => {
            run_task_command(&mut session, command, local_today(), &mut out)?;
        }
        None => {
            let list = TaskCommand::List(ListArgs {
                filter: None,
                search: None,
                sort: false,
                category: None,
                json: false,
            });
            run_task_command(&mut session, list, local_today(), &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Logs go to stderr so stdout carries only command output.
fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
