//! The canonical task collection and its synchronization with the store
//! file. Every mutation rewrites the full collection immediately; there is
//! no batching and no partial update.

use std::path::{Path, PathBuf};

use log::debug;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::model::{Priority, Task};
use crate::storage::json_store;

#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Opens the store at `path`. A missing file materializes the seed
    /// collection and persists it; an unreadable or unparseable file is an
    /// error, not a silent reset.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let tasks = if path.exists() {
            json_store::load_tasks(path)?
        } else {
            let seeded = seed_tasks();
            json_store::save_tasks(path, &seeded)?;
            debug!(
                "seeded store at {} with {} example tasks",
                path.display(),
                seeded.len()
            );
            seeded
        };

        Ok(Self {
            path: path.to_path_buf(),
            tasks,
        })
    }

    pub fn open_default() -> Result<Self, AppError> {
        let path = json_store::store_path()?;
        Self::open(&path)
    }

    /// Collection order is most-recently-created first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn create(
        &mut self,
        title: &str,
        deadline: Option<&str>,
        priority: Option<Priority>,
    ) -> Result<Task, AppError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("title is required"));
        }

        let task = Task {
            id: next_task_id(&self.tasks),
            title: trimmed.to_string(),
            deadline: normalize_deadline(deadline),
            priority,
            completed: false,
        };

        self.tasks.insert(0, task.clone());
        self.save()?;
        debug!("created task {}", task.id);

        Ok(task)
    }

    /// Overwrites title, deadline and priority, leaving `completed`
    /// untouched. An unknown id is a silent no-op and nothing is persisted.
    pub fn update(
        &mut self,
        id: &str,
        title: &str,
        deadline: Option<&str>,
        priority: Option<Priority>,
    ) -> Result<Option<Task>, AppError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("title is required"));
        }

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("update of unknown task {id} ignored");
            return Ok(None);
        };

        task.title = trimmed.to_string();
        task.deadline = normalize_deadline(deadline);
        task.priority = priority;
        let updated = task.clone();
        self.save()?;

        Ok(Some(updated))
    }

    /// Idempotent; an unknown id is a silent no-op.
    pub fn set_completed(&mut self, id: &str, value: bool) -> Result<Option<Task>, AppError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("completion toggle of unknown task {id} ignored");
            return Ok(None);
        };

        task.completed = value;
        let updated = task.clone();
        self.save()?;

        Ok(Some(updated))
    }

    /// Removes the task; an unknown id is a silent no-op and the collection
    /// is left unchanged.
    pub fn remove(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("removal of unknown task {id} ignored");
            return Ok(None);
        };

        let removed = self.tasks.remove(index);
        self.save()?;
        debug!("removed task {}", removed.id);

        Ok(Some(removed))
    }

    fn save(&self) -> Result<(), AppError> {
        json_store::save_tasks(&self.path, &self.tasks)
    }
}

fn normalize_deadline(deadline: Option<&str>) -> Option<String> {
    deadline
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn next_task_id(existing: &[Task]) -> String {
    let mut nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    loop {
        let id = format!("task-{nanos}");
        if !existing.iter().any(|task| task.id == id) {
            return id;
        }
        nanos += 1;
    }
}

/// The example collection a fresh store starts with, one task pre-completed.
fn seed_tasks() -> Vec<Task> {
    let seeds = [
        ("Draft Project Proposal", "2025-10-17T10:00", Priority::High, false),
        ("Take Trash Out", "2025-10-18T18:00", Priority::Low, false),
        ("Get Groceries", "2025-10-19T14:30", Priority::Medium, true),
        ("Send Mail", "2025-10-25T11:00", Priority::Low, false),
    ];

    let mut tasks = Vec::with_capacity(seeds.len());
    for (title, deadline, priority, completed) in seeds {
        let id = next_task_id(&tasks);
        tasks.push(Task {
            id,
            title: title.to_string(),
            deadline: Some(deadline.to_string()),
            priority: Some(priority),
            completed,
        });
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::TaskStore;
    use crate::model::{Priority, Task};
    use crate::storage::json_store;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tasklist-{nanos}-{file_name}"))
    }

    fn seeded(path: &PathBuf, tasks: &[Task]) -> TaskStore {
        json_store::save_tasks(path, tasks).unwrap();
        TaskStore::open(path).unwrap()
    }

    fn plain_task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            deadline: None,
            priority: None,
            completed: false,
        }
    }

    #[test]
    fn open_on_missing_file_seeds_four_example_tasks() {
        let path = temp_path("seed.json");
        let store = TaskStore::open(&path).unwrap();
        let persisted = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(store.tasks().len(), 4);
        assert_eq!(persisted, store.tasks());

        let completed: Vec<&Task> = store.tasks().iter().filter(|t| t.completed).collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "Get Groceries");

        let mut ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn open_round_trips_persisted_collection_unchanged() {
        let path = temp_path("round-trip.json");
        let first = TaskStore::open(&path).unwrap();
        let reopened = TaskStore::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(first.tasks(), reopened.tasks());
    }

    #[test]
    fn open_propagates_corruption() {
        let path = temp_path("corrupt.json");
        std::fs::write(&path, "][").unwrap();

        let err = TaskStore::open(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "corrupt_store");
    }

    #[test]
    fn create_inserts_at_front_with_unique_id_and_not_completed() {
        let path = temp_path("create.json");
        let mut store = seeded(&path, &[plain_task("task-1", "existing")]);

        let first = store.create("Buy milk", Some("2025-10-20T09:00"), Some(Priority::Low)).unwrap();
        let second = store.create("Buy eggs", None, None).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(!first.completed);
        assert!(!second.completed);
        assert_ne!(first.id, second.id);
        assert_ne!(first.id, "task-1");
        assert_eq!(store.tasks()[0].id, second.id);
        assert_eq!(store.tasks()[1].id, first.id);
        assert_eq!(store.tasks()[2].id, "task-1");
    }

    #[test]
    fn create_rejects_blank_title_without_touching_store() {
        let path = temp_path("create-blank.json");
        let mut store = seeded(&path, &[plain_task("task-1", "existing")]);

        let err = store.create("   ", None, None).unwrap_err();
        let persisted = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "validation");
        assert_eq!(persisted.len(), 1);
    }

    #[test]
    fn create_trims_title_and_blank_deadline_becomes_none() {
        let path = temp_path("create-trim.json");
        let mut store = seeded(&path, &[]);

        let task = store.create("  Buy milk  ", Some("  "), None).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.deadline, None);
    }

    #[test]
    fn update_overwrites_fields_but_never_completed() {
        let path = temp_path("update.json");
        let mut completed_task = plain_task("task-1", "old");
        completed_task.completed = true;
        let mut store = seeded(&path, &[completed_task]);

        let updated = store
            .update("task-1", "new", Some("2025-10-20T09:00"), Some(Priority::High))
            .unwrap()
            .unwrap();
        let persisted = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(updated.title, "new");
        assert_eq!(updated.deadline.as_deref(), Some("2025-10-20T09:00"));
        assert_eq!(updated.priority, Some(Priority::High));
        assert!(updated.completed);
        assert!(persisted[0].completed);
    }

    #[test]
    fn update_of_unknown_id_is_silent_noop() {
        let path = temp_path("update-missing.json");
        let mut store = seeded(&path, &[plain_task("task-1", "old")]);

        let outcome = store.update("task-2", "new", None, None).unwrap();
        let persisted = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(outcome.is_none());
        assert_eq!(persisted[0].title, "old");
    }

    #[test]
    fn update_rejects_blank_title() {
        let path = temp_path("update-blank.json");
        let mut store = seeded(&path, &[plain_task("task-1", "old")]);

        let err = store.update("task-1", "  ", None, None).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "validation");
        assert_eq!(store.get("task-1").unwrap().title, "old");
    }

    #[test]
    fn set_completed_is_idempotent() {
        let path = temp_path("complete.json");
        let mut store = seeded(&path, &[plain_task("task-1", "demo")]);

        let once = store.set_completed("task-1", true).unwrap().unwrap();
        let twice = store.set_completed("task-1", true).unwrap().unwrap();
        let persisted = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(once.completed);
        assert_eq!(once, twice);
        assert!(persisted[0].completed);
    }

    #[test]
    fn set_completed_false_reopens_task() {
        let path = temp_path("reopen.json");
        let mut done = plain_task("task-1", "demo");
        done.completed = true;
        let mut store = seeded(&path, &[done]);

        let reopened = store.set_completed("task-1", false).unwrap().unwrap();
        std::fs::remove_file(&path).ok();

        assert!(!reopened.completed);
    }

    #[test]
    fn set_completed_of_unknown_id_is_silent_noop() {
        let path = temp_path("complete-missing.json");
        let mut store = seeded(&path, &[]);

        let outcome = store.set_completed("task-1", true).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(outcome.is_none());
    }

    #[test]
    fn remove_deletes_exactly_one_task() {
        let path = temp_path("remove.json");
        let mut store = seeded(
            &path,
            &[plain_task("task-1", "first"), plain_task("task-2", "second")],
        );

        let removed = store.remove("task-1").unwrap().unwrap();
        let persisted = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(removed.id, "task-1");
        assert!(store.get("task-1").is_none());
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, "task-2");
    }

    #[test]
    fn remove_of_unknown_id_leaves_collection_unchanged() {
        let path = temp_path("remove-missing.json");
        let mut store = seeded(&path, &[plain_task("task-1", "demo")]);

        let outcome = store.remove("task-2").unwrap();
        std::fs::remove_file(&path).ok();

        assert!(outcome.is_none());
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn create_update_complete_lifecycle_keeps_id_stable() {
        let path = temp_path("lifecycle.json");
        let mut store = seeded(&path, &[]);

        let created = store.create("Buy milk", None, Some(Priority::Low)).unwrap();
        store
            .update(&created.id, "Buy milk and eggs", None, Some(Priority::Low))
            .unwrap()
            .unwrap();
        let done = store.set_completed(&created.id, true).unwrap().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(done.id, created.id);
        assert_eq!(done.title, "Buy milk and eggs");
        assert!(done.completed);
    }
}
