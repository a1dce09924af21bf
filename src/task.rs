//! Task data structure.
//!
//! A task is a flat record: no hierarchy, no links, just the text plus the
//! metadata the list view displays (due date, priority, category, completion).

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::fields::Priority;

/// A single to-do item.
///
/// `id` is the creation time in milliseconds since the epoch, which makes
/// newest-first ordering and uniqueness cheap to maintain (the store bumps
/// the id past the current maximum on a same-millisecond collision).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    pub completed: bool,
    pub created_at: String,
}

impl Task {
    /// Build a task from already-validated input. Callers trim and reject
    /// empty text before constructing; see `Store::add`.
    pub fn new(
        id: u64,
        text: impl Into<String>,
        due: Option<NaiveDate>,
        priority: Priority,
        category: impl Into<String>,
    ) -> Self {
        Task {
            id,
            text: text.into(),
            due,
            priority,
            category: category.into(),
            completed: false,
            created_at: Local::now().to_rfc3339(),
        }
    }
}
