use clap::{Parser, Subcommand};
use time::macros::format_description;
use time::{Date, Time};

use tasklist_core::error::AppError;
use tasklist_core::model::Priority;
use tasklist_core::view::Filter;

#[derive(Parser, Debug)]
#[command(name = "tasklist", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasklist add "Buy milk" --deadline 2025-10-20T09:00 --priority High
    Add {
        title: String,
        /// Deadline as YYYY-MM-DDTHH:MM (a bare date means midnight)
        #[arg(long)]
        deadline: Option<String>,
        /// High, Medium or Low
        #[arg(long)]
        priority: Option<String>,
    },
    /// Overwrite a task's title, deadline and priority (omitted flags clear the field)
    ///
    /// Example: tasklist edit task-17 "Buy oat milk" --priority Low
    Edit {
        id: String,
        title: String,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Mark a task as completed
    ///
    /// Example: tasklist done task-17
    Done {
        id: String,
    },
    /// Move a completed task back to the active list
    ///
    /// Example: tasklist reopen task-17
    Reopen {
        id: String,
    },
    /// Delete a task (asks for confirmation)
    ///
    /// Example: tasklist delete task-17 --yes
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Render the task board under a date filter
    ///
    /// Example: tasklist list overdue
    List {
        #[command(subcommand)]
        filter: Option<ListCommand>,
        /// Collapse the completed section
        #[arg(long, global = true)]
        hide_completed: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// Tasks due today
    Today,
    /// Tasks due later, or with no deadline
    Pending,
    /// Tasks past their deadline
    Overdue,
}

impl ListCommand {
    pub fn filter(&self) -> Filter {
        match self {
            Self::Today => Filter::Today,
            Self::Pending => Filter::Pending,
            Self::Overdue => Filter::Overdue,
        }
    }
}

/// Validates a deadline argument. A bare date normalizes to midnight; blank
/// input means no deadline. Only CLI input is validated here — whatever is
/// already in the store is taken as-is.
pub fn parse_deadline_arg(raw: &str) -> Result<Option<String>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let date_format = format_description!("[year]-[month]-[day]");
    match trimmed.split_once('T') {
        Some((date_part, time_part)) => {
            if Date::parse(date_part, date_format).is_ok() && parse_time_part(time_part).is_some() {
                Ok(Some(trimmed.to_string()))
            } else {
                Err(deadline_error(trimmed))
            }
        }
        None => {
            if Date::parse(trimmed, date_format).is_ok() {
                Ok(Some(format!("{trimmed}T00:00")))
            } else {
                Err(deadline_error(trimmed))
            }
        }
    }
}

pub fn parse_priority_arg(raw: Option<&str>) -> Result<Option<Priority>, AppError> {
    match raw {
        Some(value) if !value.trim().is_empty() => Ok(Some(value.parse()?)),
        _ => Ok(None),
    }
}

fn parse_time_part(raw: &str) -> Option<Time> {
    let (hour, minute) = raw.split_once(':')?;
    let hour: u8 = hour.parse().ok()?;
    let minute: u8 = minute.parse().ok()?;
    Time::from_hms(hour, minute, 0).ok()
}

fn deadline_error(raw: &str) -> AppError {
    AppError::validation(format!(
        "deadline must be YYYY-MM-DD or YYYY-MM-DDTHH:MM, got '{raw}'"
    ))
}
