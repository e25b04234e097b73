//! The form controller: a tagged state machine mediating task creation and
//! editing. `Idle` means no form is open; `Creating` binds no task;
//! `Editing` binds the id of an existing task. Submission runs the
//! validation gate before the store is touched.

use crate::error::AppError;
use crate::model::{Priority, Task};
use crate::store::TaskStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Idle,
    Creating,
    Editing(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Created(Task),
    Updated(Task),
    /// The edited task no longer exists; the store was left untouched.
    Missed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    mode: FormMode,
    title: String,
    deadline: String,
    priority: Option<Priority>,
    comment: String,
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            mode: FormMode::Idle,
            title: String::new(),
            deadline: String::new(),
            priority: None,
            comment: String::new(),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn deadline(&self) -> &str {
        &self.deadline
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Opens a cleared form bound to no task.
    pub fn open_for_new(&mut self) {
        self.clear_fields();
        self.mode = FormMode::Creating;
    }

    /// Opens the form pre-populated from the task's persisted fields. The
    /// comment draft is not persisted on tasks, so it stays blank no matter
    /// what the form held before.
    pub fn open_for_edit(&mut self, task: &Task) {
        self.clear_fields();
        self.title = task.title.clone();
        self.deadline = task.deadline.clone().unwrap_or_default();
        self.priority = task.priority;
        self.mode = FormMode::Editing(task.id.clone());
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_deadline(&mut self, deadline: &str) {
        self.deadline = deadline.to_string();
    }

    pub fn set_priority(&mut self, priority: Option<Priority>) {
        self.priority = priority;
    }

    pub fn set_comment(&mut self, comment: &str) {
        self.comment = comment.to_string();
    }

    /// Validation gate first: a blank title leaves the machine in its
    /// current state with the store untouched. A valid submission performs
    /// the bound store operation and closes the form.
    pub fn submit(&mut self, store: &mut TaskStore) -> Result<Submission, AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("title is required"));
        }

        let deadline = match self.deadline.trim() {
            "" => None,
            value => Some(value),
        };

        let outcome = match &self.mode {
            FormMode::Idle => return Err(AppError::validation("no form is open")),
            FormMode::Creating => {
                Submission::Created(store.create(&self.title, deadline, self.priority)?)
            }
            FormMode::Editing(id) => {
                match store.update(id, &self.title, deadline, self.priority)? {
                    Some(task) => Submission::Updated(task),
                    None => Submission::Missed,
                }
            }
        };

        self.close();
        Ok(outcome)
    }

    /// Discards the in-progress draft without touching the store.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.clear_fields();
        self.mode = FormMode::Idle;
    }

    fn clear_fields(&mut self) {
        self.title.clear();
        self.deadline.clear();
        self.priority = None;
        self.comment.clear();
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}
