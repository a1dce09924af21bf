//! Command implementations for the CLI interface.
//!
//! Each subcommand builds an intent, feeds it through the shared reducer and
//! prints the outcome. The CLI shares every code path with the TUI, including
//! the delete schedule (drained immediately since there is no animation to
//! wait for on a one-shot command).

use std::path::Path;
use std::time::Instant;

use chrono::{Duration, Local, NaiveDate};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::controller::{AppState, Effect, Intent, DELETE_DELAY};
use crate::fields::{format_filter, FilterMode, Priority};
use crate::tui::run::run_tui;
use crate::view;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive terminal UI.
    Ui,

    /// Add a new task.
    Add {
        /// The task text.
        text: String,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Free-text category, searched alongside the task text.
        #[arg(long, default_value = "")]
        category: String,
    },

    /// List tasks, newest first.
    List {
        /// Filter mode: all | active | completed.
        #[arg(long, value_enum, default_value_t = FilterMode::All)]
        filter: FilterMode,
        /// Case-insensitive search over text and category.
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Flip a task between active and completed.
    Toggle {
        /// Task id (shown by `list`).
        id: u64,
    },

    /// Delete a task by id.
    Delete {
        /// Task id to delete.
        id: u64,
    },

    /// Delete every completed task.
    ClearCompleted,

    /// Show total and completed counts.
    Stats,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse a due date: ISO format plus a few relative spellings.
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Launch the terminal user interface.
pub fn cmd_ui(db_path: &Path) {
    if let Err(e) = run_tui(db_path) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the store.
pub fn cmd_add(state: &mut AppState, text: String, due: Option<String>, priority: Priority, category: String) {
    let due = match due {
        Some(raw) => match parse_due_input(&raw) {
            Some(d) => Some(d),
            None => {
                eprintln!("Could not parse due date '{raw}'. Use YYYY-MM-DD, today, tomorrow, or 'in Nd'.");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let intent = Intent::AddTask { text, due, priority, category };
    match apply(state, intent) {
        Effect::Added(id) => println!("Added task {id}."),
        Effect::RejectedEmptyText => {
            eprintln!("Task text cannot be empty.");
            std::process::exit(1);
        }
        _ => {}
    }
}

/// List tasks under a filter mode and search term.
pub fn cmd_list(state: &mut AppState, filter: FilterMode, search: String) {
    apply(state, Intent::SetFilter(filter));
    apply(state, Intent::SetSearch(search));

    let visible = state.visible();
    view::print_table(&visible, Local::now().date_naive());
    if state.filter != FilterMode::All || !state.search_term.is_empty() {
        println!(
            "{} of {} tasks shown ({})",
            visible.len(),
            state.store.tasks.len(),
            format_filter(state.filter)
        );
    }
}

/// Toggle a task's completed flag.
pub fn cmd_toggle(state: &mut AppState, id: u64) {
    match apply(state, Intent::ToggleTask(id)) {
        Effect::Mutated => {
            let done = state.store.get(id).map(|t| t.completed).unwrap_or(false);
            println!("Task {id} is now {}.", if done { "completed" } else { "active" });
        }
        _ => {
            eprintln!("No task with id {id}.");
            std::process::exit(1);
        }
    }
}

/// Delete a task. The schedule is drained right away: the delay only exists
/// for the TUI's exit animation.
pub fn cmd_delete(state: &mut AppState, id: u64) {
    if state.store.get(id).is_none() {
        eprintln!("No task with id {id}.");
        std::process::exit(1);
    }
    apply(state, Intent::DeleteTask(id));
    match state.tick(Instant::now() + DELETE_DELAY) {
        Ok(_) => println!("Deleted task {id}."),
        Err(e) => {
            eprintln!("Error saving: {e}");
            std::process::exit(1);
        }
    }
}

/// Remove all completed tasks.
pub fn cmd_clear_completed(state: &mut AppState) {
    let before = state.store.tasks.len();
    match apply(state, Intent::ClearCompleted) {
        Effect::Mutated => println!("Cleared {} completed task(s).", before - state.store.tasks.len()),
        _ => println!("No completed tasks to clear."),
    }
}

/// Print the stats counters.
pub fn cmd_stats(state: &AppState) {
    view::print_stats(state.stats());
}

/// Generate shell completion scripts to stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

fn apply(state: &mut AppState, intent: Intent) -> Effect {
    match state.apply(intent) {
        Ok(effect) => effect,
        Err(e) => {
            eprintln!("Error saving: {e}");
            std::process::exit(1);
        }
    }
}
