use chrono::Utc;
use std::env;
use std::path::PathBuf;

pub const STATE_ROOT_DIRNAME: &str = ".todo-list";

/// `<root>/<name>`, where root is `state_root` when given and
/// `~/.todo-list` otherwise.
pub fn resolve_state_dir(state_root: Option<&str>, name: &str) -> PathBuf {
    let root = state_root
        .map(str::trim)
        .filter(|root| !root.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(STATE_ROOT_DIRNAME));
    root.join(normalize_name(name))
}

// HOME, then USERPROFILE, then the platform lookup.
fn home_dir() -> PathBuf {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Lowercases a profile name and folds every run of characters outside
/// `[a-z0-9_-]` into one underscore. Blank results fall back to `default`.
pub fn normalize_name(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let folded = lowered
        .split(|ch: char| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    match folded.trim_matches('_') {
        "" => "default".to_string(),
        name => name.to_string(),
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Splits a shell line into words. Single and double quotes group words;
/// a backslash escapes the next character outside single quotes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some('\'') => current.push(ch),
            Some(_) if ch == '\\' => match chars.next() {
                Some(next) => current.push(next),
                None => return Err("trailing backslash".to_string()),
            },
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch == '\\' => match chars.next() {
                Some(next) => {
                    current.push(next);
                    in_word = true;
                }
                None => return Err("trailing backslash".to_string()),
            },
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }
    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
