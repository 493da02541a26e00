use crate::error::ValidationError;
use crate::task::{NewTask, Priority, Task, TaskId, TaskPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Create,
    Edit(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Priority,
            FormField::Priority => FormField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Priority,
            FormField::Description => FormField::Title,
            FormField::Priority => FormField::Description,
        }
    }
}

/// State of the new/edit task popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub target: FormTarget,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub focus: FormField,
    pub error: Option<String>,
}

impl TaskForm {
    pub fn create(default_priority: Option<Priority>) -> Self {
        Self {
            target: FormTarget::Create,
            title: String::new(),
            description: String::new(),
            priority: default_priority,
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            target: FormTarget::Edit(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: Some(task.priority),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.target {
            FormTarget::Create => " New task ",
            FormTarget::Edit(_) => " Edit task ",
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn insert_char(&mut self, c: char) {
        match self.focus {
            FormField::Title => self.title.push(c),
            FormField::Description => self.description.push(c),
            FormField::Priority => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::Title => {
                self.title.pop();
            }
            FormField::Description => {
                self.description.pop();
            }
            FormField::Priority => self.priority = None,
        }
    }

    /// Left/Right on the priority row. An unset priority starts at `Highest`.
    pub fn cycle_priority(&mut self, forward: bool) {
        self.priority = Some(match (self.priority, forward) {
            (None, _) => Priority::Highest,
            (Some(p), true) => p.next(),
            (Some(p), false) => p.prev(),
        });
    }

    fn check_fields(&self) -> Result<Priority, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        self.priority.ok_or(ValidationError::MissingField("priority"))
    }

    pub fn to_new_task(&self) -> Result<NewTask, ValidationError> {
        let priority = self.check_fields()?;
        Ok(NewTask::new(self.title.clone(), self.description.clone(), priority))
    }

    /// The edit form always submits every field, like the create form.
    pub fn to_patch(&self) -> Result<TaskPatch, ValidationError> {
        let priority = self.check_fields()?;
        Ok(TaskPatch::default()
            .title(self.title.clone())
            .description(self.description.clone())
            .priority(priority))
    }
}
