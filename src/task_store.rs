use crate::errors::{Result, TodoError};
use crate::storage::{KeyValueStore, TODOS_KEY};
use crate::types::{Task, TaskDraft};
use crate::utils::now_millis;
use std::collections::HashSet;

/// Owns the authoritative task collection and mirrors it to the gateway.
///
/// Every mutation rewrites the whole collection under [`TODOS_KEY`]. Write
/// failures are returned to the caller; in-memory state already reflects the
/// mutation at that point.
pub struct TaskStore<S: KeyValueStore> {
    gateway: S,
    tasks: Vec<Task>,
    ids: IdAllocator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Task),
    EmptyText,
    NotFound,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Reads the persisted collection. Missing or malformed data yields an
    /// empty store rather than an error; only gateway read failures propagate.
    pub fn load(gateway: S) -> Result<Self> {
        let tasks = match gateway.get(TODOS_KEY)? {
            Some(raw) => decode_tasks(&raw),
            None => Vec::new(),
        };
        let ids = IdAllocator::seeded(tasks.iter().map(|task| task.id).max());
        tracing::debug!(count = tasks.len(), "task collection loaded");
        Ok(Self {
            gateway,
            tasks,
            ids,
        })
    }

    /// Appends a new task. Returns `None` without touching storage when the
    /// text trims to empty.
    pub fn create(&mut self, draft: TaskDraft) -> Result<Option<Task>> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let task = Task {
            id: self.ids.next_at(now_millis())?,
            text: text.to_string(),
            completed: false,
            category: draft.category,
            priority: draft.priority,
            due_date: draft.due_date,
        };
        self.tasks.push(task.clone());
        self.persist()?;
        Ok(Some(task))
    }

    /// Removes the task if present. The collection is rewritten either way.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;
        self.persist()?;
        Ok(removed)
    }

    pub fn toggle_completed(&mut self, id: i64) -> Result<Option<Task>> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let toggled = task.clone();
        self.persist()?;
        Ok(Some(toggled))
    }

    /// Overwrites text, category, priority and due date in place. Id and
    /// completion state are kept.
    pub fn update(&mut self, id: i64, draft: TaskDraft) -> Result<UpdateOutcome> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Ok(UpdateOutcome::EmptyText);
        }
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            tracing::debug!(id, "edit target missing");
            return Ok(UpdateOutcome::NotFound);
        };
        task.text = text.to_string();
        task.category = draft.category;
        task.priority = draft.priority;
        task.due_date = draft.due_date;
        let updated = task.clone();
        self.persist()?;
        Ok(UpdateOutcome::Updated(updated))
    }

    /// Drops every completed task and returns how many were removed.
    pub fn clear_completed(&mut self) -> Result<usize> {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        self.persist()?;
        Ok(removed)
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn gateway(&self) -> &S {
        &self.gateway
    }

    fn persist(&self) -> Result<()> {
        let payload = serde_json::to_string(&self.tasks)?;
        self.gateway.set(TODOS_KEY, &payload)?;
        tracing::debug!(count = self.tasks.len(), bytes = payload.len(), "task collection persisted");
        Ok(())
    }
}

/// Parses the stored collection, repairing duplicate ids by keeping the
/// first occurrence. A record holding `i64::MAX` is dropped, since no later
/// id could be allocated after it.
fn decode_tasks(raw: &str) -> Vec<Task> {
    let parsed: Vec<Task> = match serde_json::from_str(raw) {
        Ok(tasks) => tasks,
        Err(err) => {
            tracing::warn!(error = %err, "stored tasks are malformed, starting empty");
            return Vec::new();
        }
    };
    let mut seen = HashSet::new();
    let total = parsed.len();
    let tasks: Vec<Task> = parsed
        .into_iter()
        .filter(|task| seen.insert(task.id))
        .collect();
    if tasks.len() != total {
        tracing::warn!(dropped = total - tasks.len(), "dropped tasks with duplicate ids");
    }
    let unique = tasks.len();
    let tasks: Vec<Task> = tasks.into_iter().filter(|task| task.id != i64::MAX).collect();
    if tasks.len() != unique {
        tracing::warn!(id = i64::MAX, "dropped task whose id leaves no room for new ids");
    }
    tasks
}

/// Hands out creation-timestamp ids (epoch millis), bumped past the last
/// issued id when the clock has not advanced. Unique within one process;
/// two processes sharing a database can still collide.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: Option<i64>,
}

impl IdAllocator {
    pub fn seeded(last: Option<i64>) -> Self {
        Self { last }
    }

    pub fn next_at(&mut self, now_ms: i64) -> Result<i64> {
        let id = match self.last {
            Some(last) if now_ms <= last => last
                .checked_add(1)
                .ok_or(TodoError::IdsExhausted { last })?,
            _ => now_ms,
        };
        self.last = Some(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TodoError;
    use crate::storage::MemoryKeyValueStore;
    use crate::types::{Category, Priority};
    use chrono::NaiveDate;

    fn empty_store() -> TaskStore<MemoryKeyValueStore> {
        TaskStore::load(MemoryKeyValueStore::new()).unwrap()
    }

    fn persisted(store: &TaskStore<MemoryKeyValueStore>) -> Vec<Task> {
        let raw = store.gateway().get(TODOS_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(TodoError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            )))
        }
    }

    #[test]
    fn create_trims_and_appends() {
        let mut store = empty_store();
        let first = store.create(TaskDraft::new("  Buy milk  ")).unwrap().unwrap();
        let second = store
            .create(
                TaskDraft::new("Run")
                    .category(Category::Health)
                    .priority(Priority::High),
            )
            .unwrap()
            .unwrap();
        assert_eq!(first.text, "Buy milk");
        assert!(!first.completed);
        assert_eq!(first.category, Category::Work);
        assert_eq!(first.priority, Priority::Medium);
        assert_eq!(store.all().len(), 2);
        assert_eq!(store.all()[1].id, second.id);
        assert_eq!(persisted(&store), store.all());
    }

    #[test]
    fn create_with_blank_text_is_a_noop() {
        let mut store = empty_store();
        assert_eq!(store.create(TaskDraft::new("")).unwrap(), None);
        assert_eq!(store.create(TaskDraft::new("   ")).unwrap(), None);
        assert!(store.all().is_empty());
        assert_eq!(store.gateway().get(TODOS_KEY).unwrap(), None);
    }

    #[test]
    fn rapid_creation_yields_unique_increasing_ids() {
        let mut store = empty_store();
        let ids: Vec<i64> = (0..50)
            .map(|i| store.create(TaskDraft::new(format!("task {i}"))).unwrap().unwrap().id)
            .collect();
        let unique: HashSet<i64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn id_allocator_bumps_past_stalled_clock() {
        let mut ids = IdAllocator::seeded(Some(1000));
        assert_eq!(ids.next_at(900).unwrap(), 1001);
        assert_eq!(ids.next_at(1001).unwrap(), 1002);
        assert_eq!(ids.next_at(5000).unwrap(), 5000);
        assert_eq!(IdAllocator::default().next_at(42).unwrap(), 42);
    }

    #[test]
    fn id_allocator_reports_exhaustion_instead_of_wrapping() {
        let mut ids = IdAllocator::seeded(Some(i64::MAX - 1));
        assert_eq!(ids.next_at(0).unwrap(), i64::MAX);
        let err = ids.next_at(0).unwrap_err();
        assert!(matches!(err, TodoError::IdsExhausted { last } if last == i64::MAX));
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let mut store = empty_store();
        let task = store.create(TaskDraft::new("Walk dog")).unwrap().unwrap();
        assert!(store.toggle_completed(task.id).unwrap().unwrap().completed);
        assert!(!store.toggle_completed(task.id).unwrap().unwrap().completed);
        assert_eq!(store.find(task.id).unwrap(), &task);
    }

    #[test]
    fn toggle_unknown_id_is_a_noop() {
        let mut store = empty_store();
        store.create(TaskDraft::new("a")).unwrap();
        let before = store.all().to_vec();
        assert_eq!(store.toggle_completed(-1).unwrap(), None);
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn delete_removes_matching_task_only() {
        let mut store = empty_store();
        let a = store.create(TaskDraft::new("a")).unwrap().unwrap();
        let b = store.create(TaskDraft::new("b")).unwrap().unwrap();
        assert!(store.delete(a.id).unwrap());
        assert!(!store.delete(a.id).unwrap());
        assert_eq!(store.all(), &[b]);
        assert_eq!(persisted(&store).len(), 1);
    }

    #[test]
    fn update_overwrites_fields_and_keeps_identity() {
        let mut store = empty_store();
        let task = store.create(TaskDraft::new("draft")).unwrap().unwrap();
        store.toggle_completed(task.id).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 5, 2);
        let outcome = store
            .update(
                task.id,
                TaskDraft::new(" final ")
                    .category(Category::Personal)
                    .priority(Priority::Low)
                    .due(due),
            )
            .unwrap();
        let UpdateOutcome::Updated(updated) = outcome else {
            panic!("expected update, got {outcome:?}");
        };
        assert_eq!(updated.id, task.id);
        assert!(updated.completed);
        assert_eq!(updated.text, "final");
        assert_eq!(updated.category, Category::Personal);
        assert_eq!(updated.priority, Priority::Low);
        assert_eq!(updated.due_date, due);
        assert_eq!(persisted(&store), vec![updated]);
    }

    #[test]
    fn update_rejects_empty_text_and_missing_target() {
        let mut store = empty_store();
        let task = store.create(TaskDraft::new("keep")).unwrap().unwrap();
        assert_eq!(
            store.update(task.id, TaskDraft::new("  ")).unwrap(),
            UpdateOutcome::EmptyText
        );
        assert_eq!(
            store.update(task.id + 1, TaskDraft::new("x")).unwrap(),
            UpdateOutcome::NotFound
        );
        assert_eq!(store.all(), &[task]);
    }

    #[test]
    fn clear_completed_removes_only_completed() {
        let mut store = empty_store();
        let a = store.create(TaskDraft::new("a")).unwrap().unwrap();
        let b = store.create(TaskDraft::new("b")).unwrap().unwrap();
        store.toggle_completed(a.id).unwrap();
        assert_eq!(store.clear_completed().unwrap(), 1);
        assert_eq!(store.all(), &[b]);
    }

    #[test]
    fn persisted_collection_round_trips() {
        let mut store = empty_store();
        store
            .create(TaskDraft::new("a").due(NaiveDate::from_ymd_opt(2024, 1, 1)))
            .unwrap();
        let b = store
            .create(TaskDraft::new("b").category(Category::Other))
            .unwrap()
            .unwrap();
        store.toggle_completed(b.id).unwrap();
        let raw = store.gateway().get(TODOS_KEY).unwrap().unwrap();

        let reloaded = TaskStore::load(MemoryKeyValueStore::with_entry(TODOS_KEY, &raw)).unwrap();
        assert_eq!(reloaded.all(), store.all());
    }

    #[test]
    fn malformed_payload_loads_empty() {
        for raw in ["not json", "{\"id\":1}", "[{\"text\":\"no id\"}]", ""] {
            let store = TaskStore::load(MemoryKeyValueStore::with_entry(TODOS_KEY, raw)).unwrap();
            assert!(store.all().is_empty(), "payload {raw:?} should decode empty");
        }
    }

    #[test]
    fn duplicate_ids_are_dropped_on_load() {
        let raw = r#"[
            {"id": 7, "text": "first", "completed": false, "category": "work", "priority": "low", "dueDate": ""},
            {"id": 7, "text": "second", "completed": true, "category": "work", "priority": "low", "dueDate": ""}
        ]"#;
        let mut store = TaskStore::load(MemoryKeyValueStore::with_entry(TODOS_KEY, raw)).unwrap();
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].text, "first");
        let created = store.create(TaskDraft::new("new")).unwrap().unwrap();
        assert_ne!(created.id, 7);
    }

    #[test]
    fn max_id_record_is_dropped_on_load() {
        let raw = r#"[
            {"id": 9223372036854775807, "text": "ceiling", "completed": false, "category": "work", "priority": "low", "dueDate": ""},
            {"id": 5, "text": "kept", "completed": false, "category": "work", "priority": "low", "dueDate": ""}
        ]"#;
        let mut store = TaskStore::load(MemoryKeyValueStore::with_entry(TODOS_KEY, raw)).unwrap();
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].text, "kept");
        let created = store.create(TaskDraft::new("new")).unwrap().unwrap();
        assert!(created.id > 5);
        assert_eq!(persisted(&store).len(), 2);
    }

    #[test]
    fn write_failure_propagates() {
        let mut store = TaskStore::load(FailingStore).unwrap();
        let err = store.create(TaskDraft::new("a")).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
