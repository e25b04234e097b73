use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AppError;

/// A single to-do item. The id is assigned once at creation and never
/// reassigned; `completed` only ever changes through an explicit toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Local datetime `YYYY-MM-DDTHH:MM`; `None` means no deadline.
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(AppError::validation(format!(
                "priority must be High, Medium or Low, got '{other}'"
            ))),
        }
    }
}
