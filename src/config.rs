//! Runtime configuration, layered as command-line flags over `TODO_*`
//! environment variables over compiled defaults.

use crate::utils::{normalize_name, resolve_state_dir};
use std::env;
use std::path::PathBuf;

pub const ENV_DB: &str = "TODO_DB";
pub const ENV_STATE_ROOT: &str = "TODO_STATE_ROOT";
pub const ENV_LOG: &str = "TODO_LOG";

pub const DEFAULT_NAME: &str = "default";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub name: Option<String>,
    pub db: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub name: String,
    pub state_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    pub fn resolve(overrides: &ConfigOverrides) -> Self {
        Self::resolve_with(overrides, |key| env::var(key).ok())
    }

    pub fn resolve_with<F>(overrides: &ConfigOverrides, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let name = normalize_name(overrides.name.as_deref().unwrap_or(DEFAULT_NAME));
        let state_root = env_value(ENV_STATE_ROOT);
        let state_dir = resolve_state_dir(state_root.as_deref(), &name);
        let db_path = overrides
            .db
            .clone()
            .or_else(|| env_value(ENV_DB).map(|value| PathBuf::from(value.trim())))
            .unwrap_or_else(|| state_dir.join(format!("{name}.db.sqlite")));
        let log_filter = overrides
            .log_level
            .clone()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| env_value(ENV_LOG))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            name,
            state_dir,
            db_path,
            log_filter,
        }
    }
}
