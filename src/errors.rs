/// Errors raised by the todo list core and its storage.
///
/// Empty text and unknown ids are not errors; those degrade to no-ops and
/// surface through return values instead.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// The key-value database could not be opened, read, or written.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The collection could not be encoded for persistence.
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem failure (state directory, stdin/stdout).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No id above the largest one in the collection is representable.
    #[error("task ids exhausted after {last}")]
    IdsExhausted { last: i64 },
}

pub type Result<T> = std::result::Result<T, TodoError>;
