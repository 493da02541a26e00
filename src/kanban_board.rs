use crate::task::{Priority, Task, TaskId};
use crate::task_store::TaskStore;

/// The store plus the cursor the user moves across the three lanes.
#[derive(Debug, Default)]
pub struct KanbanBoard {
    store: TaskStore,
    pub selected_lane: usize,
    pub selected_task: usize,
}

impl KanbanBoard {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            selected_lane: 0,
            selected_task: 0,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Callers must run `clamp_selection` after mutating through this.
    pub fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.selected_lane]
    }

    pub fn lane(&self, priority: Priority) -> Vec<&Task> {
        self.store.by_priority(priority)
    }

    pub fn selected(&self) -> Option<&Task> {
        self.lane(self.selected_priority())
            .get(self.selected_task)
            .copied()
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.selected().map(|t| t.id)
    }

    pub fn select_left(&mut self) {
        if self.selected_lane > 0 {
            self.selected_lane -= 1;
            self.clamp_selection();
        }
    }

    pub fn select_right(&mut self) {
        if self.selected_lane < Priority::ALL.len() - 1 {
            self.selected_lane += 1;
            self.clamp_selection();
        }
    }

    pub fn select_up(&mut self) {
        self.selected_task = self.selected_task.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        let len = self.lane(self.selected_priority()).len();
        if self.selected_task + 1 < len {
            self.selected_task += 1;
        }
    }

    /// Moves the cursor onto `id`, whichever lane it is in.
    pub fn focus_task(&mut self, id: TaskId) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        let priority = task.priority;
        let index = self.lane(priority).iter().position(|t| t.id == id);
        if let Some(index) = index {
            self.selected_lane = priority.index();
            self.selected_task = index;
        }
    }

    pub fn clamp_selection(&mut self) {
        let len = self.lane(self.selected_priority()).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }
}
