//! Application state and intent dispatch.
//!
//! User interactions from either surface are expressed as a closed set of
//! intents and applied through a single reducer on `AppState`. Deleting is
//! the one deferred mutation: the intent only schedules the removal, and the
//! event loop drains expired schedules on its tick so the exit animation on
//! the row can finish before the task disappears.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::fields::{FilterMode, Priority};
use crate::store::Store;
use crate::task::Task;
use crate::view::{self, Stats};

/// Delay between a delete request and the actual removal.
pub const DELETE_DELAY: Duration = Duration::from_millis(300);

/// Everything a surface can ask the application to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    AddTask {
        text: String,
        due: Option<NaiveDate>,
        priority: Priority,
        category: String,
    },
    ToggleTask(u64),
    DeleteTask(u64),
    SetFilter(FilterMode),
    SetSearch(String),
    ClearCompleted,
}

/// What an intent did, so surfaces can react without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// A task was created with this id.
    Added(u64),
    /// Empty text, nothing created.
    RejectedEmptyText,
    /// The store changed and was persisted.
    Mutated,
    /// The intent named an absent id; nothing changed.
    NoOp,
    /// A removal was scheduled; it fires on a later tick.
    DeleteScheduled(DeleteToken),
    /// Only the filter/search state changed; nothing persisted.
    ViewChanged,
}

/// Handle for cancelling a scheduled delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteToken(u64);

#[derive(Debug)]
struct PendingDelete {
    token: DeleteToken,
    task_id: u64,
    fire_at: Instant,
}

/// Pending deferred removals, drained from the event loop.
///
/// Removal is by id and removing an absent id is a no-op, so a schedule that
/// outlives its task (or fires twice) is harmless.
#[derive(Debug, Default)]
pub struct DeleteScheduler {
    pending: Vec<PendingDelete>,
    next_token: u64,
}

impl DeleteScheduler {
    /// Schedule `task_id` for removal `DELETE_DELAY` after `now`.
    pub fn schedule(&mut self, task_id: u64, now: Instant) -> DeleteToken {
        let token = DeleteToken(self.next_token);
        self.next_token += 1;
        self.pending.push(PendingDelete {
            token,
            task_id,
            fire_at: now + DELETE_DELAY,
        });
        token
    }

    /// Cancel a scheduled removal. Returns false if it already fired.
    pub fn cancel(&mut self, token: DeleteToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.token != token);
        self.pending.len() != before
    }

    /// True while a removal for this task is still waiting to fire.
    /// The TUI keeps the row on screen in its exit style until then.
    pub fn is_pending(&self, task_id: u64) -> bool {
        self.pending.iter().any(|p| p.task_id == task_id)
    }

    /// Remove and return the task ids whose deadline has passed.
    pub fn drain_expired(&mut self, now: Instant) -> Vec<u64> {
        let mut fired = Vec::new();
        self.pending.retain(|p| {
            if p.fire_at <= now {
                fired.push(p.task_id);
                false
            } else {
                true
            }
        });
        fired
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// The full application state: the store plus the two view axes and the
/// delete schedule. Surfaces own one of these and feed it intents.
pub struct AppState {
    pub store: Store,
    pub db_path: PathBuf,
    pub filter: FilterMode,
    pub search_term: String,
    pub deletes: DeleteScheduler,
}

impl AppState {
    /// Load state from the database file. Filter starts at All, search empty.
    pub fn load(db_path: &std::path::Path) -> Self {
        AppState {
            store: Store::load(db_path),
            db_path: db_path.to_path_buf(),
            filter: FilterMode::All,
            search_term: String::new(),
            deletes: DeleteScheduler::default(),
        }
    }

    /// Apply one intent. Store mutations persist before this returns;
    /// `DeleteTask` only schedules and persists nothing yet.
    pub fn apply(&mut self, intent: Intent) -> io::Result<Effect> {
        match intent {
            Intent::AddTask { text, due, priority, category } => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Ok(Effect::RejectedEmptyText);
                }
                let id = self.store.next_id();
                let task = Task::new(id, text, due, priority, category);
                self.store.add(task, &self.db_path)?;
                Ok(Effect::Added(id))
            }
            Intent::ToggleTask(id) => {
                if self.store.toggle(id, &self.db_path)? {
                    Ok(Effect::Mutated)
                } else {
                    Ok(Effect::NoOp)
                }
            }
            Intent::DeleteTask(id) => {
                let token = self.deletes.schedule(id, Instant::now());
                Ok(Effect::DeleteScheduled(token))
            }
            Intent::SetFilter(mode) => {
                self.filter = mode;
                Ok(Effect::ViewChanged)
            }
            Intent::SetSearch(term) => {
                self.search_term = term.to_lowercase();
                Ok(Effect::ViewChanged)
            }
            Intent::ClearCompleted => {
                if self.store.clear_completed(&self.db_path)? > 0 {
                    Ok(Effect::Mutated)
                } else {
                    Ok(Effect::NoOp)
                }
            }
        }
    }

    /// Apply scheduled deletes whose delay has elapsed. Returns how many
    /// tasks were removed from the store.
    pub fn tick(&mut self, now: Instant) -> io::Result<usize> {
        let mut removed = 0;
        for id in self.deletes.drain_expired(now) {
            if self.store.remove(id, &self.db_path)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// The subsequence the list view shows under the current filter/search.
    pub fn visible(&self) -> Vec<&Task> {
        view::filter_and_search(&self.store.tasks, self.filter, &self.search_term)
    }

    /// Stats over the unfiltered list.
    pub fn stats(&self) -> Stats {
        view::stats(&self.store.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_state() -> AppState {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path: PathBuf = std::env::temp_dir()
            .join(format!("todo_ctrl_test_{}_{}.json", std::process::id(), n));
        std::fs::remove_file(&path).ok();
        AppState::load(&path)
    }

    fn add_intent(text: &str, category: &str) -> Intent {
        Intent::AddTask {
            text: text.into(),
            due: None,
            priority: Priority::Low,
            category: category.into(),
        }
    }

    #[test]
    fn test_add_then_toggle_scenario() {
        let mut state = temp_state();
        let effect = state
            .apply(Intent::AddTask {
                text: "Buy milk".into(),
                due: NaiveDate::from_ymd_opt(2099, 1, 1),
                priority: Priority::Low,
                category: "errand".into(),
            })
            .unwrap();
        let id = match effect {
            Effect::Added(id) => id,
            other => panic!("expected Added, got {:?}", other),
        };

        assert_eq!(state.store.tasks.len(), 1);
        assert_eq!(state.stats(), Stats { total: 1, completed: 0 });

        assert_eq!(state.apply(Intent::ToggleTask(id)).unwrap(), Effect::Mutated);
        assert_eq!(state.stats(), Stats { total: 1, completed: 1 });

        state.apply(Intent::SetFilter(FilterMode::Active)).unwrap();
        assert!(state.visible().is_empty());
        state.apply(Intent::SetFilter(FilterMode::Completed)).unwrap();
        assert_eq!(state.visible().len(), 1);

        std::fs::remove_file(&state.db_path).ok();
    }

    #[test]
    fn test_empty_text_rejected() {
        let mut state = temp_state();
        assert_eq!(
            state.apply(add_intent("   ", "work")).unwrap(),
            Effect::RejectedEmptyText
        );
        assert!(state.store.tasks.is_empty());
    }

    #[test]
    fn test_search_by_category() {
        let mut state = temp_state();
        state.apply(add_intent("buy stamps", "errand")).unwrap();
        state.apply(add_intent("standup notes", "work")).unwrap();

        state.apply(Intent::SetSearch("err".into())).unwrap();
        let visible = state.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].category, "errand");

        state.apply(Intent::SetSearch(String::new())).unwrap();
        assert_eq!(state.visible().len(), 2);

        std::fs::remove_file(&state.db_path).ok();
    }

    #[test]
    fn test_delete_fires_after_delay() {
        let mut state = temp_state();
        state.apply(add_intent("short-lived", "")).unwrap();
        let id = state.store.tasks[0].id;

        state.apply(Intent::DeleteTask(id)).unwrap();
        // Still present until the schedule expires.
        assert_eq!(state.store.tasks.len(), 1);
        assert!(state.deletes.is_pending(id));

        let now = Instant::now();
        assert_eq!(state.tick(now).unwrap(), 0);
        assert_eq!(state.tick(now + DELETE_DELAY).unwrap(), 1);
        assert!(state.store.tasks.is_empty());
        assert!(state.deletes.is_empty());

        std::fs::remove_file(&state.db_path).ok();
    }

    #[test]
    fn test_cancelled_delete_never_fires() {
        let mut state = temp_state();
        state.apply(add_intent("survivor", "")).unwrap();
        let id = state.store.tasks[0].id;

        let token = match state.apply(Intent::DeleteTask(id)).unwrap() {
            Effect::DeleteScheduled(token) => token,
            other => panic!("expected DeleteScheduled, got {:?}", other),
        };
        assert!(state.deletes.cancel(token));
        assert!(!state.deletes.cancel(token));

        assert_eq!(state.tick(Instant::now() + DELETE_DELAY).unwrap(), 0);
        assert_eq!(state.store.tasks.len(), 1);

        std::fs::remove_file(&state.db_path).ok();
    }

    #[test]
    fn test_stale_delete_schedule_is_safe() {
        let mut state = temp_state();
        state.apply(add_intent("doomed", "")).unwrap();
        let id = state.store.tasks[0].id;

        // Two delete requests for the same task: the second schedule fires
        // against an already-removed id and must be a no-op.
        state.apply(Intent::DeleteTask(id)).unwrap();
        state.apply(Intent::DeleteTask(id)).unwrap();
        assert_eq!(state.tick(Instant::now() + DELETE_DELAY).unwrap(), 1);
        assert!(state.store.tasks.is_empty());

        std::fs::remove_file(&state.db_path).ok();
    }

    #[test]
    fn test_clear_completed_effects() {
        let mut state = temp_state();
        state.apply(add_intent("done soon", "")).unwrap();
        let id = state.store.tasks[0].id;
        assert_eq!(state.apply(Intent::ClearCompleted).unwrap(), Effect::NoOp);
        state.apply(Intent::ToggleTask(id)).unwrap();
        assert_eq!(state.apply(Intent::ClearCompleted).unwrap(), Effect::Mutated);
        assert!(state.store.tasks.is_empty());

        std::fs::remove_file(&state.db_path).ok();
    }
}
