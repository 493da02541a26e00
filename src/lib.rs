//! Terminal task board: tasks in three priority lanes with an independent
//! progress status.

pub mod app;
pub mod config;
pub mod error;
pub mod form;
pub mod kanban_board;
pub mod task;
pub mod task_store;
pub mod ui;

pub use error::{PlannerError, ValidationError};
pub use kanban_board::KanbanBoard;
pub use task::{NewTask, Priority, Status, Task, TaskId, TaskPatch};
pub use task_store::{StatusCounts, TaskStore};
