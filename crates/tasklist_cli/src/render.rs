//! Terminal projection of the task board. Every invocation re-renders the
//! world from the store: the active grouping filtered by date status, then
//! the collapsible completed grouping, omitted entirely when empty.

use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::Date;
use time::macros::format_description;

use tasklist_core::config::Palette;
use tasklist_core::model::{Priority, Task};
use tasklist_core::status::{Status, classify};
use tasklist_core::view::{Filter, project, split_groups};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Task")]
    title: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Id")]
    id: String,
}

pub fn render_board(
    tasks: &[Task],
    filter: Filter,
    today: Date,
    palette: &Palette,
    hide_completed: bool,
) -> String {
    let (_, completed) = split_groups(tasks);
    let visible = project(tasks, filter, today);

    let mut out = String::new();
    out.push_str(&format!("Active — {}\n", filter.label()));
    if visible.is_empty() {
        out.push_str("  (no tasks match this filter)\n");
    } else {
        let rows: Vec<TaskRow> = visible
            .iter()
            .map(|task| active_row(task, today, palette))
            .collect();
        out.push_str(&Table::new(rows).with(Style::sharp()).to_string());
        out.push('\n');
    }

    if !completed.is_empty() && !hide_completed {
        out.push_str(&format!("\nCompleted ({})\n", completed.len()));
        let rows: Vec<TaskRow> = completed
            .iter()
            .map(|task| completed_row(task, palette))
            .collect();
        out.push_str(&Table::new(rows).with(Style::sharp()).to_string());
        out.push('\n');
    }

    out
}

fn active_row(task: &Task, today: Date, palette: &Palette) -> TaskRow {
    let status = classify(task.deadline.as_deref(), today);
    let status_cell = match status {
        Status::Overdue => palette.paint(palette.overdue, status.label()),
        _ => status.label().to_string(),
    };

    TaskRow {
        title: task.title.clone(),
        deadline: format_deadline(task.deadline.as_deref()),
        priority: priority_cell(task, palette),
        status: status_cell,
        id: task.id.clone(),
    }
}

fn completed_row(task: &Task, palette: &Palette) -> TaskRow {
    TaskRow {
        title: task.title.clone(),
        deadline: format_deadline(task.deadline.as_deref()),
        priority: priority_cell(task, palette),
        status: "done".to_string(),
        id: task.id.clone(),
    }
}

fn priority_cell(task: &Task, palette: &Palette) -> String {
    match task.priority {
        Some(priority) => {
            let code = match priority {
                Priority::High => palette.high,
                Priority::Medium => palette.medium,
                Priority::Low => palette.low,
            };
            palette.paint(code, priority.label())
        }
        None => "-".to_string(),
    }
}

/// `Fri, Oct 17 2025` for a parseable deadline; mirrors the stored value's
/// calendar date only.
pub fn format_deadline(deadline: Option<&str>) -> String {
    let raw = match deadline {
        Some(value) if !value.trim().is_empty() => value.trim(),
        _ => return "No deadline".to_string(),
    };

    let date_part = raw.split('T').next().unwrap_or(raw);
    let parse_format = format_description!("[year]-[month]-[day]");
    let display_format =
        format_description!("[weekday repr:short], [month repr:short] [day] [year]");

    let date = match Date::parse(date_part, parse_format) {
        Ok(date) => date,
        Err(_) => return "Invalid date".to_string(),
    };

    date.format(display_format)
        .unwrap_or_else(|_| "Invalid date".to_string())
}
