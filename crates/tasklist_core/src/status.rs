//! Deadline classification relative to the current calendar date.

use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Overdue,
    Today,
    Pending,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::Pending => "pending",
        }
    }
}

/// Compares the deadline's calendar date against `today`, time of day
/// stripped. Absent, blank and unparseable deadlines classify as pending.
pub fn classify(deadline: Option<&str>, today: Date) -> Status {
    let raw = match deadline {
        Some(value) if !value.trim().is_empty() => value.trim(),
        _ => return Status::Pending,
    };

    let date_part = raw.split('T').next().unwrap_or(raw);
    let format = format_description!("[year]-[month]-[day]");
    match Date::parse(date_part, format) {
        Ok(due) if due < today => Status::Overdue,
        Ok(due) if due == today => Status::Today,
        Ok(_) | Err(_) => Status::Pending,
    }
}

/// The current calendar date in the local offset, UTC when the offset
/// cannot be determined.
pub fn today_local() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}
