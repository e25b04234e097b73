pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod status;
pub mod storage;
pub mod store;
pub mod view;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Priority, Task};

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: "task-1".to_string(),
            title: "demo".to_string(),
            deadline: Some("2025-10-17T10:00".to_string()),
            priority: Some(Priority::High),
            completed: false,
        };

        assert_eq!(task.id, "task-1");
        assert_eq!(task.title, "demo");
        assert_eq!(task.deadline.as_deref(), Some("2025-10-17T10:00"));
        assert_eq!(task.priority, Some(Priority::High));
        assert!(!task.completed);
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::validation("title is required");
        assert_eq!(err.code(), "validation");
    }
}
