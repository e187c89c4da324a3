use crate::types::{Category, Task};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub completed_count: usize,
    pub active_count: usize,
    /// Whole percent, rounded half up.
    pub completion_rate: u32,
    pub active_by_category: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub active: usize,
}

impl Stats {
    /// Always computed over the full collection, never a filtered view.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed_count = tasks.iter().filter(|task| task.completed).count();
        let active_count = total - completed_count;
        let active_by_category = Category::ALL
            .iter()
            .map(|&category| CategoryCount {
                category,
                active: tasks
                    .iter()
                    .filter(|task| task.category == category && !task.completed)
                    .count(),
            })
            .collect();
        Self {
            total,
            completed_count,
            active_count,
            completion_rate: completion_rate(completed_count, total),
            active_by_category,
        }
    }

    pub fn active_in(&self, category: Category) -> usize {
        self.active_by_category
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.active)
            .unwrap_or(0)
    }

    pub fn remaining_label(&self) -> String {
        let noun = if self.active_count == 1 { "task" } else { "tasks" };
        format!("{} {} remaining", self.active_count, noun)
    }
}

fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed * 200 + total) / (2 * total)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    fn task(id: i64, category: Category, completed: bool) -> Task {
        Task {
            id,
            text: format!("task {id}"),
            completed,
            category,
            priority: Priority::Medium,
            due_date: None,
        }
    }

    #[test]
    fn empty_collection() {
        let stats = Stats::from_tasks(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.active_by_category.len(), 5);
        assert!(stats.active_by_category.iter().all(|entry| entry.active == 0));
        assert_eq!(stats.remaining_label(), "0 tasks remaining");
    }

    #[test]
    fn counts_reconcile() {
        let tasks = vec![
            task(1, Category::Work, false),
            task(2, Category::Work, true),
            task(3, Category::Health, false),
            task(4, Category::Other, false),
            task(5, Category::Shopping, true),
        ];
        let stats = Stats::from_tasks(&tasks);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.completed_count, 2);
        assert_eq!(stats.active_count, 3);
        assert_eq!(stats.completed_count + stats.active_count, stats.total);
        assert_eq!(stats.completion_rate, 40);
        assert_eq!(stats.active_in(Category::Work), 1);
        assert_eq!(stats.active_in(Category::Shopping), 0);
        assert_eq!(stats.active_in(Category::Personal), 0);
        let per_category: usize = stats.active_by_category.iter().map(|e| e.active).sum();
        assert_eq!(per_category, stats.active_count);
    }

    #[test]
    fn rate_rounds_to_nearest_percent() {
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 8), 13);
        assert_eq!(completion_rate(1, 200), 1);
        assert_eq!(completion_rate(3, 3), 100);
    }

    #[test]
    fn remaining_label_pluralizes() {
        let stats = Stats::from_tasks(&[task(1, Category::Work, false)]);
        assert_eq!(stats.remaining_label(), "1 task remaining");
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(Stats::from_tasks(&[])).unwrap();
        assert_eq!(value["completionRate"], 0);
        assert_eq!(value["activeByCategory"][0]["category"], "work");
    }
}
