//! # todo - file-backed to-do list
//!
//! A small to-do list for the terminal: add, search, filter, complete and
//! delete tasks, persisted to a single JSON file.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive UI
//! todo ui
//!
//! # Add a task via CLI
//! todo add "Buy milk" --due tomorrow --priority high --category errand
//!
//! # List active tasks matching a search term
//! todo list --filter active --search errand
//!
//! # Complete / delete by id
//! todo toggle 1700000000000
//! todo delete 1700000000000
//! ```
//!
//! The store is a JSON array of task records, newest first, written after
//! every mutation. Data lives in `~/.todo/todos.json` by default; pass
//! `--db <path>` to use another file.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod controller;
pub mod fields;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod form;
    pub mod input;
    pub mod run;
}

use cli::Cli;
use cmd::*;
use controller::AppState;

fn main() {
    let cli = Cli::parse();

    // Completions need no storage at all.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let todo_dir = PathBuf::from(home).join(".todo");
        if let Err(e) = std::fs::create_dir_all(&todo_dir) {
            eprintln!("Failed to create todo directory {}: {}", todo_dir.display(), e);
            std::process::exit(1);
        }
        todo_dir.join("todos.json")
    });

    if let Commands::Ui = cli.command {
        cmd_ui(&db_path);
        return;
    }

    let mut state = AppState::load(&db_path);

    match cli.command {
        Commands::Ui | Commands::Completions { .. } => unreachable!("handled above"),
        Commands::Add { text, due, priority, category } =>
            cmd_add(&mut state, text, due, priority, category),
        Commands::List { filter, search } => cmd_list(&mut state, filter, search),
        Commands::Toggle { id } => cmd_toggle(&mut state, id),
        Commands::Delete { id } => cmd_delete(&mut state, id),
        Commands::ClearCompleted => cmd_clear_completed(&mut state),
        Commands::Stats => cmd_stats(&state),
    }
}
