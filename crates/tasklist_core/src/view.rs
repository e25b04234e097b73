//! Projection of the task collection into the rendered groupings: an
//! active group subject to the date filter and a completed group that the
//! filter never touches.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::model::Task;
use crate::status::{Status, classify};

/// The three mutually exclusive visibility buckets for active tasks.
/// There is no "all" filter and no combinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    Today,
    Pending,
    Overdue,
}

impl Filter {
    pub fn status(&self) -> Status {
        match self {
            Self::Today => Status::Today,
            Self::Pending => Status::Pending,
            Self::Overdue => Status::Overdue,
        }
    }

    pub fn label(&self) -> &'static str {
        self.status().label()
    }
}

/// Partitions the collection into (active, completed), both preserving
/// collection order, which is most-recently-created first.
pub fn split_groups(tasks: &[Task]) -> (Vec<&Task>, Vec<&Task>) {
    let mut active = Vec::new();
    let mut completed = Vec::new();

    for task in tasks {
        if task.completed {
            completed.push(task);
        } else {
            active.push(task);
        }
    }

    (active, completed)
}

/// A task is visible under a filter iff it is not completed and its
/// classified status equals the filter's bucket.
pub fn is_visible(task: &Task, filter: Filter, today: Date) -> bool {
    !task.completed && classify(task.deadline.as_deref(), today) == filter.status()
}

/// The visible subset of the active group, in collection order.
pub fn project<'a>(tasks: &'a [Task], filter: Filter, today: Date) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| is_visible(task, filter, today))
        .collect()
}
