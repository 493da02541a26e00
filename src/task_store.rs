use chrono::Local;
use tracing::debug;

use crate::error::ValidationError;
use crate::task::{require_text, NewTask, Priority, Status, Task, TaskId, TaskPatch};

/// Per-status totals for one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed
    }
}

/// In-memory task collection in insertion order.
///
/// Every view (`by_priority`, `count_by_status`, ...) is computed from the
/// collection on each call, so it always agrees with `snapshot()`.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends a new pending task. Ids come from a counter that is never
    /// rewound, so they stay unique across deletes and clears.
    pub fn create(&mut self, input: NewTask) -> Result<&Task, ValidationError> {
        require_text("title", &input.title)?;
        require_text("description", &input.description)?;

        let id = TaskId(self.next_id);
        self.next_id += 1;
        debug!("Creating task {} with priority {}", id, input.priority);

        self.tasks.push(Task {
            id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: Status::Pending,
            created_at: Local::now(),
        });
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Removes the task if present. A missing id is not an error.
    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let index = self.position(id)?;
        debug!("Deleting task {}", id);
        Some(self.tasks.remove(index))
    }

    /// Empties the collection and returns how many tasks were removed.
    pub fn delete_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        debug!("Deleted all tasks ({} removed)", removed);
        removed
    }

    /// Returns `false` when no task has this id.
    pub fn update_status(&mut self, id: TaskId, status: Status) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                debug!("Task {} status {} -> {}", id, task.status, status);
                task.status = status;
                true
            }
            None => false,
        }
    }

    /// Merges `patch` into the task. Status, creation time and position are
    /// untouched. Returns `Ok(false)` when no task has this id.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<bool, ValidationError> {
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        if let Some(description) = &patch.description {
            require_text("description", description)?;
        }

        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        debug!("Updating task {}", id);
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        Ok(true)
    }

    pub fn snapshot(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn by_priority(&self, priority: Priority) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.priority == priority).collect()
    }

    pub fn count_by_status(&self, status: Status) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.tasks
            .iter()
            .fold(StatusCounts::default(), |mut counts, task| {
                match task.status {
                    Status::Pending => counts.pending += 1,
                    Status::InProgress => counts.in_progress += 1,
                    Status::Completed => counts.completed += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn new_task(title: &str, priority: Priority) -> NewTask {
        NewTask::new(title, "d", priority)
    }

    fn ids(tasks: &[&Task]) -> Vec<TaskId> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn assert_partition(store: &TaskStore) {
        let mut seen = HashSet::new();
        for priority in Priority::ALL {
            let lane = store.by_priority(priority);
            // lane keeps snapshot order
            let expected: Vec<TaskId> = store
                .snapshot()
                .iter()
                .filter(|t| t.priority == priority)
                .map(|t| t.id)
                .collect();
            assert_eq!(ids(&lane), expected);
            for task in lane {
                assert!(seen.insert(task.id), "task {} in two lanes", task.id);
            }
        }
        assert_eq!(seen.len(), store.total());
    }

    fn assert_counts(store: &TaskStore) {
        let sum: usize = Status::ALL.iter().map(|s| store.count_by_status(*s)).sum();
        assert_eq!(sum, store.total());
        let counts = store.status_counts();
        assert_eq!(counts.pending, store.count_by_status(Status::Pending));
        assert_eq!(counts.in_progress, store.count_by_status(Status::InProgress));
        assert_eq!(counts.completed, store.count_by_status(Status::Completed));
        assert_eq!(counts.total(), store.total());
    }

    #[test]
    fn test_create_starts_pending_in_its_lane() {
        let mut store = TaskStore::new();
        let id = store
            .create(NewTask::new("A", "d", Priority::Highest))
            .unwrap()
            .id;

        let task = store.get(id).unwrap();
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.title, "A");
        assert_eq!(ids(&store.by_priority(Priority::Highest)), vec![id]);
        assert!(store.by_priority(Priority::Medium).is_empty());
        assert_eq!(store.count_by_status(Status::Pending), 1);
        assert_eq!(store.total(), 1);
    }

    #[test]
    fn test_create_appends_duplicates_as_distinct_tasks() {
        let mut store = TaskStore::new();
        let first = store.create(new_task("same", Priority::Medium)).unwrap().id;
        let second = store.create(new_task("same", Priority::Medium)).unwrap().id;

        assert_ne!(first, second);
        let order: Vec<TaskId> = store.snapshot().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![first, second]);
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        let mut store = TaskStore::new();
        store.create(new_task("keep", Priority::Lowest)).unwrap();

        let err = store
            .create(NewTask::new("", "d", Priority::Medium))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("title"));

        let err = store
            .create(NewTask::new("t", "   ", Priority::Medium))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("description"));

        assert_eq!(store.total(), 1);
        assert!(store.by_priority(Priority::Medium).is_empty());
    }

    #[test]
    fn test_rejected_create_does_not_consume_an_id() {
        let mut store = TaskStore::new();
        assert!(store.create(new_task("", Priority::Medium)).is_err());
        let id = store.create(new_task("ok", Priority::Medium)).unwrap().id;
        assert_eq!(id, TaskId(1));
    }

    #[test]
    fn test_delete_removes_only_the_target() {
        let mut store = TaskStore::new();
        let a = store.create(new_task("a", Priority::Highest)).unwrap().id;
        let b = store.create(new_task("b", Priority::Highest)).unwrap().id;
        let c = store.create(new_task("c", Priority::Highest)).unwrap().id;

        let removed = store.delete(b).unwrap();
        assert_eq!(removed.title, "b");
        assert_eq!(ids(&store.by_priority(Priority::Highest)), vec![a, c]);
    }

    #[test]
    fn test_delete_missing_id_is_a_no_op() {
        let mut store = TaskStore::new();
        store.create(new_task("a", Priority::Medium)).unwrap();
        let before = store.snapshot().to_vec();

        assert!(store.delete(TaskId(99)).is_none());
        assert_eq!(store.snapshot(), before.as_slice());
    }

    #[test]
    fn test_delete_all_clears_every_lane() {
        let mut store = TaskStore::new();
        store.create(new_task("h", Priority::Highest)).unwrap();
        store.create(new_task("m", Priority::Medium)).unwrap();
        store.create(new_task("l", Priority::Lowest)).unwrap();

        assert_eq!(store.delete_all(), 3);
        assert_eq!(store.total(), 0);
        for priority in Priority::ALL {
            assert!(store.by_priority(priority).is_empty());
        }
    }

    #[test]
    fn test_delete_all_is_idempotent() {
        let mut store = TaskStore::new();
        store.create(new_task("a", Priority::Medium)).unwrap();

        store.delete_all();
        assert_eq!(store.total(), 0);
        assert_eq!(store.delete_all(), 0);
        assert_eq!(store.total(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut store = TaskStore::new();
        let first = store.create(new_task("a", Priority::Medium)).unwrap().id;
        store.delete_all();
        let second = store.create(new_task("a", Priority::Medium)).unwrap().id;
        assert_ne!(first, second);
    }

    #[test]
    fn test_update_status_changes_only_status() {
        let mut store = TaskStore::new();
        let a = store.create(new_task("a", Priority::Highest)).unwrap().id;
        let b = store.create(new_task("b", Priority::Lowest)).unwrap().id;
        let before = store.snapshot().to_vec();

        assert!(store.update_status(a, Status::Completed));

        let after = store.snapshot();
        assert_eq!(after[0].status, Status::Completed);
        assert_eq!(
            Task {
                status: Status::Pending,
                ..after[0].clone()
            },
            before[0]
        );
        assert_eq!(after[1], before[1]);
        assert_eq!(store.get(b).unwrap().status, Status::Pending);
    }

    #[test]
    fn test_update_status_allows_any_transition() {
        let mut store = TaskStore::new();
        let id = store.create(new_task("a", Priority::Medium)).unwrap().id;

        for from in Status::ALL {
            for to in Status::ALL {
                assert!(store.update_status(id, from));
                assert!(store.update_status(id, to));
                assert_eq!(store.get(id).unwrap().status, to);
            }
        }
    }

    #[test]
    fn test_update_status_missing_id_is_a_no_op() {
        let mut store = TaskStore::new();
        store.create(new_task("a", Priority::Medium)).unwrap();
        let before = store.snapshot().to_vec();

        assert!(!store.update_status(TaskId(42), Status::Completed));
        assert_eq!(store.snapshot(), before.as_slice());
    }

    #[test]
    fn test_update_keeps_status() {
        let mut store = TaskStore::new();
        let id = store.create(new_task("A", Priority::Medium)).unwrap().id;
        store.update_status(id, Status::Completed);

        assert!(store.update(id, TaskPatch::default().title("B")).unwrap());

        let task = store.get(id).unwrap();
        assert_eq!(task.title, "B");
        assert_eq!(task.description, "d");
        assert_eq!(task.status, Status::Completed);
    }

    #[test]
    fn test_update_priority_moves_lane_without_reordering_snapshot() {
        let mut store = TaskStore::new();
        let a = store.create(new_task("a", Priority::Highest)).unwrap().id;
        let b = store.create(new_task("b", Priority::Lowest)).unwrap().id;
        let c = store.create(new_task("c", Priority::Lowest)).unwrap().id;
        let created_at = store.get(a).unwrap().created_at;

        store
            .update(a, TaskPatch::default().priority(Priority::Lowest))
            .unwrap();

        assert!(store.by_priority(Priority::Highest).is_empty());
        assert_eq!(ids(&store.by_priority(Priority::Lowest)), vec![a, b, c]);
        assert_eq!(store.get(a).unwrap().created_at, created_at);
        assert_partition(&store);
    }

    #[test]
    fn test_update_rejects_empty_fields_without_mutating() {
        let mut store = TaskStore::new();
        let id = store.create(new_task("a", Priority::Medium)).unwrap().id;

        let err = store
            .update(
                id,
                TaskPatch::default()
                    .title("new")
                    .description("")
                    .priority(Priority::Highest),
            )
            .unwrap_err();

        assert_eq!(err, ValidationError::MissingField("description"));
        let task = store.get(id).unwrap();
        assert_eq!(task.title, "a");
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_update_missing_id_is_a_no_op() {
        let mut store = TaskStore::new();
        assert!(!store
            .update(TaskId(7), TaskPatch::default().title("x"))
            .unwrap());
        assert_eq!(store.total(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create(String, Priority),
        Delete(usize),
        DeleteAll,
        UpdateStatus(usize, Status),
        UpdatePriority(usize, Priority),
    }

    fn priority_strategy() -> impl Strategy<Value = Priority> {
        prop_oneof![
            Just(Priority::Highest),
            Just(Priority::Medium),
            Just(Priority::Lowest)
        ]
    }

    fn status_strategy() -> impl Strategy<Value = Status> {
        prop_oneof![
            Just(Status::Pending),
            Just(Status::InProgress),
            Just(Status::Completed)
        ]
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => ("[a-z ]{0,6}", priority_strategy()).prop_map(|(t, p)| Op::Create(t, p)),
            1 => any::<usize>().prop_map(Op::Delete),
            1 => Just(Op::DeleteAll),
            2 => (any::<usize>(), status_strategy()).prop_map(|(i, s)| Op::UpdateStatus(i, s)),
            2 => (any::<usize>(), priority_strategy()).prop_map(|(i, p)| Op::UpdatePriority(i, p)),
        ]
    }

    // Picks an existing id most of the time, occasionally a missing one.
    fn target(store: &TaskStore, pick: usize) -> TaskId {
        let tasks = store.snapshot();
        if tasks.is_empty() || pick % 5 == 0 {
            TaskId(u64::MAX)
        } else {
            tasks[pick % tasks.len()].id
        }
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_after_every_op(ops in prop::collection::vec(op_strategy(), 0..60)) {
            let mut store = TaskStore::new();
            let mut issued = HashSet::new();

            for op in ops {
                match op {
                    Op::Create(title, priority) => {
                        let before = store.total();
                        match store.create(NewTask::new(title.clone(), "d", priority)) {
                            Ok(task) => {
                                let id = task.id;
                                prop_assert!(issued.insert(id), "id {} reused", id);
                                prop_assert_eq!(store.snapshot().last().map(|t| t.id), Some(id));
                            }
                            Err(_) => {
                                prop_assert!(title.trim().is_empty());
                                prop_assert_eq!(store.total(), before);
                            }
                        }
                    }
                    Op::Delete(pick) => {
                        let id = target(&store, pick);
                        store.delete(id);
                        prop_assert!(store.get(id).is_none());
                    }
                    Op::DeleteAll => {
                        store.delete_all();
                        prop_assert_eq!(store.total(), 0);
                    }
                    Op::UpdateStatus(pick, status) => {
                        let id = target(&store, pick);
                        let before: Vec<Task> = store.snapshot().to_vec();
                        let applied = store.update_status(id, status);
                        for (old, new) in before.iter().zip(store.snapshot()) {
                            if old.id == id {
                                prop_assert!(applied);
                                prop_assert_eq!(new.status, status);
                                prop_assert_eq!(&Task { status: old.status, ..new.clone() }, old);
                            } else {
                                prop_assert_eq!(old, new);
                            }
                        }
                    }
                    Op::UpdatePriority(pick, priority) => {
                        let id = target(&store, pick);
                        let status = store.get(id).map(|t| t.status);
                        store.update(id, TaskPatch::default().priority(priority)).unwrap();
                        prop_assert_eq!(store.get(id).map(|t| t.status), status);
                    }
                }

                assert_partition(&store);
                assert_counts(&store);
            }
        }
    }
}
