use crate::types::{Category, Filter, Task};
use serde::Serialize;

/// Ephemeral display settings. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub filter: Filter,
    pub search: String,
    pub sort_by_due: bool,
}

impl ViewConfig {
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn set_search_text(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_sort(&mut self, enabled: bool) {
        self.sort_by_due = enabled;
    }

    /// Clicking a category shows every task whose text mentions the category
    /// name. This goes through free-text search, not a category filter, so a
    /// "work" task without the word in its text is not shown.
    pub fn request_category_filter(&mut self, category: Category) {
        self.filter = Filter::All;
        self.search = category.as_str().to_string();
    }
}

/// Filter, then search, then (optionally) a stable sort by due date with
/// undated tasks last. Borrows from `tasks`; nothing is copied or reordered
/// in the source.
pub fn project<'a>(tasks: &'a [Task], config: &ViewConfig) -> Vec<&'a Task> {
    let needle = config.search.to_lowercase();
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|task| config.filter.matches(task))
        .filter(|task| needle.is_empty() || task.text.to_lowercase().contains(&needle))
        .collect();
    if config.sort_by_due {
        view.sort_by_key(|task| (task.due_date.is_none(), task.due_date));
    }
    view
}
