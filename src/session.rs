use crate::dates::{due_label, is_overdue};
use crate::errors::Result;
use crate::stats::Stats;
use crate::storage::{KeyValueStore, THEME_KEY};
use crate::task_store::{TaskStore, UpdateOutcome};
use crate::types::{Category, Filter, Task, TaskDraft, Theme};
use crate::view::{project, ViewConfig};
use chrono::NaiveDate;
use serde::Serialize;

/// What a front end calls into: the task store, the current view settings,
/// and the persisted theme. Callers re-render from [`TodoSession::snapshot`]
/// after every call.
pub struct TodoSession<S: KeyValueStore> {
    store: TaskStore<S>,
    view: ViewConfig,
    theme: Theme,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    #[serde(flatten)]
    pub task: Task,
    pub overdue: bool,
    pub due_label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub rows: Vec<TaskRow>,
    pub stats: Stats,
    pub remaining_label: String,
    pub view: ViewConfig,
    pub theme: Theme,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<S: KeyValueStore> TodoSession<S> {
    pub fn open(gateway: S) -> Result<Self> {
        let theme = Theme::from_stored(gateway.get(THEME_KEY)?.as_deref());
        let store = TaskStore::load(gateway)?;
        Ok(Self {
            store,
            view: ViewConfig::default(),
            theme,
        })
    }

    pub fn create(&mut self, draft: TaskDraft) -> Result<Option<Task>> {
        self.store.create(draft)
    }

    pub fn delete(&mut self, id: i64) -> Result<bool> {
        self.store.delete(id)
    }

    pub fn toggle_completed(&mut self, id: i64) -> Result<Option<Task>> {
        self.store.toggle_completed(id)
    }

    pub fn update(&mut self, id: i64, draft: TaskDraft) -> Result<UpdateOutcome> {
        self.store.update(id, draft)
    }

    pub fn clear_completed(&mut self) -> Result<usize> {
        self.store.clear_completed()
    }

    pub fn find(&self, id: i64) -> Option<&Task> {
        self.store.find(id)
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.all()
    }

    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    pub fn set_view(&mut self, view: ViewConfig) {
        self.view = view;
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.view.set_filter(filter);
    }

    pub fn set_search_text(&mut self, search: impl Into<String>) {
        self.view.set_search_text(search);
    }

    pub fn set_sort(&mut self, enabled: bool) {
        self.view.set_sort(enabled);
    }

    pub fn request_category_filter(&mut self, category: Category) {
        self.view.request_category_filter(category);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<Theme> {
        self.store.gateway().set(THEME_KEY, theme.as_str())?;
        self.theme = theme;
        Ok(theme)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.set_theme(self.theme.toggled())
    }

    pub fn stats(&self) -> Stats {
        Stats::from_tasks(self.tasks())
    }

    /// Recomputes the projected rows and statistics from current state.
    pub fn snapshot(&self, today: NaiveDate) -> Snapshot {
        let rows = project(self.store.all(), &self.view)
            .into_iter()
            .map(|task| TaskRow {
                overdue: is_overdue(task.due_date, task.completed, today),
                due_label: task.due_date.map(|due| due_label(due, today)),
                task: task.clone(),
            })
            .collect();
        let stats = self.stats();
        Snapshot {
            rows,
            remaining_label: stats.remaining_label(),
            stats,
            view: self.view.clone(),
            theme: self.theme,
        }
    }
}
