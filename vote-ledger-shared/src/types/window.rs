use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time range over vote creation timestamps.
///
/// `start_at` is inclusive and `end_at` is exclusive. A missing bound leaves
/// that side of the window open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// A window covering every timestamp.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn since(start_at: DateTime<Utc>) -> Self {
        Self {
            start_at: Some(start_at),
            end_at: None,
        }
    }

    pub fn until(end_at: DateTime<Utc>) -> Self {
        Self {
            start_at: None,
            end_at: Some(end_at),
        }
    }

    pub fn between(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self {
            start_at: Some(start_at),
            end_at: Some(end_at),
        }
    }

    /// Returns true if `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_at.is_none_or(|start| at >= start) && self.end_at.is_none_or(|end| at < end)
    }
}
