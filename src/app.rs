//! Interaction state: maps key presses onto board and store operations.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

use crate::config::Config;
use crate::form::{FormField, FormTarget, TaskForm};
use crate::kanban_board::KanbanBoard;
use crate::task::{Status, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Form(TaskForm),
    ConfirmDelete(TaskId),
    ConfirmDeleteAll,
}

#[derive(Debug)]
pub struct App {
    pub board: KanbanBoard,
    pub config: Config,
    pub mode: Mode,
    /// Result of the last action, shown in the footer.
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(board: KanbanBoard, config: Config) -> Self {
        Self {
            board,
            config,
            mode: Mode::Normal,
            notice: None,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Form(form) => self.handle_form_key(form, key),
            Mode::ConfirmDelete(id) => self.handle_confirm_key(key, Mode::ConfirmDelete(id)),
            Mode::ConfirmDeleteAll => self.handle_confirm_key(key, Mode::ConfirmDeleteAll),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => self.board.select_left(),
            KeyCode::Right | KeyCode::Char('l') => self.board.select_right(),
            KeyCode::Up | KeyCode::Char('k') => self.board.select_up(),
            KeyCode::Down | KeyCode::Char('j') => self.board.select_down(),
            KeyCode::Char('a') => {
                self.mode = Mode::Form(TaskForm::create(self.config.default_priority));
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.board.selected() {
                    self.mode = Mode::Form(TaskForm::edit(task));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.board.selected_task_id() {
                    if self.config.confirm_deletes {
                        self.mode = Mode::ConfirmDelete(id);
                    } else {
                        self.delete(id);
                    }
                }
            }
            KeyCode::Char('D') => {
                if self.config.confirm_deletes {
                    self.mode = Mode::ConfirmDeleteAll;
                } else {
                    self.delete_all();
                }
            }
            KeyCode::Char('s') => {
                if let Some(task) = self.board.selected() {
                    let (id, status) = (task.id, task.status.next());
                    self.set_status(id, status);
                }
            }
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(id) = self.board.selected_task_id() {
                    let status = Status::ALL[c as usize - '1' as usize];
                    self.set_status(id, status);
                }
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, mut form: TaskForm, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                if let Err(err) = self.submit(&form) {
                    warn!("Rejected task form: {}", err);
                    form.error = Some(err);
                } else {
                    return;
                }
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left if form.focus == FormField::Priority => form.cycle_priority(false),
            KeyCode::Right if form.focus == FormField::Priority => form.cycle_priority(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.insert_char(c),
            _ => {}
        }
        self.mode = Mode::Form(form);
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, pending: Mode) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => match pending {
                Mode::ConfirmDelete(id) => self.delete(id),
                Mode::ConfirmDeleteAll => self.delete_all(),
                _ => {}
            },
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
            _ => self.mode = pending,
        }
    }

    /// Applies the form to the store. The error string is shown in the form.
    fn submit(&mut self, form: &TaskForm) -> Result<(), String> {
        match form.target {
            FormTarget::Create => {
                let input = form.to_new_task().map_err(|e| e.to_string())?;
                let store = self.board.store_mut();
                let id = store.create(input).map_err(|e| e.to_string())?.id;
                info!("Created task {}", id);
                self.board.focus_task(id);
                self.notice = Some(format!("Task {} created", id));
            }
            FormTarget::Edit(id) => {
                let patch = form.to_patch().map_err(|e| e.to_string())?;
                let applied = self
                    .board
                    .store_mut()
                    .update(id, patch)
                    .map_err(|e| e.to_string())?;
                if applied {
                    self.board.focus_task(id);
                    self.notice = Some(format!("Task {} updated", id));
                } else {
                    self.board.clamp_selection();
                }
            }
        }
        Ok(())
    }

    fn set_status(&mut self, id: TaskId, status: Status) {
        if self.board.store_mut().update_status(id, status) {
            self.notice = Some(format!("Task {} is now {}", id, status));
        }
    }

    fn delete(&mut self, id: TaskId) {
        if let Some(task) = self.board.store_mut().delete(id) {
            info!("Deleted task {}", task.id);
            self.notice = Some(format!("Task {} deleted", task.id));
        }
        self.board.clamp_selection();
    }

    fn delete_all(&mut self) {
        let removed = self.board.store_mut().delete_all();
        info!("Cleared board ({} tasks)", removed);
        self.board.clamp_selection();
        self.notice = Some(format!("Cleared {} tasks", removed));
    }
}
