//! Derived views over the task list.
//!
//! Everything here is a pure function of the store contents plus the current
//! filter/search state: the filtered subsequence, the stats counters, the
//! overdue classification and the display formatting. Both the CLI table and
//! the TUI render from these.

use chrono::NaiveDate;

use crate::fields::{format_priority, FilterMode};
use crate::task::Task;

/// Total and completed counters, always computed over the unfiltered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
}

/// Count tasks for the stats line.
pub fn stats(tasks: &[Task]) -> Stats {
    Stats {
        total: tasks.len(),
        completed: tasks.iter().filter(|t| t.completed).count(),
    }
}

/// Apply the search term, then the filter mode, preserving input order.
///
/// The search matches case-insensitively against task text and category.
/// With an empty term and `FilterMode::All` this is the identity.
pub fn filter_and_search<'a>(
    tasks: &'a [Task],
    filter: FilterMode,
    search_term: &str,
) -> Vec<&'a Task> {
    let term = search_term.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| {
            term.is_empty()
                || t.text.to_lowercase().contains(&term)
                || t.category.to_lowercase().contains(&term)
        })
        .filter(|t| match filter {
            FilterMode::All => true,
            FilterMode::Active => !t.completed,
            FilterMode::Completed => t.completed,
        })
        .collect()
}

/// An incomplete task is overdue once its due date is strictly in the past.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    match task.due {
        Some(due) => !task.completed && due < today,
        None => false,
    }
}

/// Format a due date for display: short month name, day, year.
pub fn format_due(due: Option<NaiveDate>) -> String {
    match due {
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => "-".into(),
    }
}

/// Print a filtered task list as a table, with a placeholder when empty.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    if tasks.is_empty() {
        println!("No tasks found");
        return;
    }
    println!(
        "{:<15} {:<4} {:<8} {:<13} {:<14} {}",
        "ID", "Done", "Pri", "Due", "Category", "Text"
    );
    for t in tasks {
        let done = if t.completed { "x" } else { "" };
        let due = if is_overdue(t, today) {
            format!("{}!", format_due(t.due))
        } else {
            format_due(t.due)
        };
        let category = if t.category.is_empty() { "-" } else { t.category.as_str() };
        println!(
            "{:<15} {:<4} {:<8} {:<13} {:<14} {}",
            t.id,
            done,
            format_priority(t.priority),
            due,
            truncate(category, 14),
            t.text
        );
    }
}

/// Print the stats line the way the list footer shows it.
pub fn print_stats(s: Stats) {
    println!("Total: {}", s.total);
    println!("Completed: {}", s.completed);
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;

    fn task(id: u64, text: &str, category: &str, completed: bool) -> Task {
        let mut t = Task::new(id, text, None, Priority::Medium, category);
        t.completed = completed;
        t
    }

    #[test]
    fn test_all_with_empty_search_is_identity() {
        let tasks = vec![
            task(3, "newest", "work", false),
            task(2, "middle", "home", true),
            task(1, "oldest", "work", false),
        ];
        let filtered = filter_and_search(&tasks, FilterMode::All, "");
        let ids: Vec<u64> = filtered.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_filter_modes_split_by_completion() {
        let tasks = vec![
            task(2, "open", "work", false),
            task(1, "done", "work", true),
        ];
        let active = filter_and_search(&tasks, FilterMode::Active, "");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 2);

        let completed = filter_and_search(&tasks, FilterMode::Completed, "");
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, 1);
    }

    #[test]
    fn test_search_matches_text_and_category() {
        let tasks = vec![
            task(2, "Buy milk", "errand", false),
            task(1, "Write report", "work", false),
        ];
        // Category match.
        let hits = filter_and_search(&tasks, FilterMode::All, "err");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "errand");
        // Case-insensitive text match.
        let hits = filter_and_search(&tasks, FilterMode::All, "MILK");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
        // No match.
        assert!(filter_and_search(&tasks, FilterMode::All, "zzz").is_empty());
    }

    #[test]
    fn test_search_composes_with_filter() {
        let tasks = vec![
            task(2, "call plumber", "home", true),
            task(1, "call dentist", "home", false),
        ];
        let hits = filter_and_search(&tasks, FilterMode::Active, "call");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_overdue_requires_past_due_and_incomplete() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let past = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();

        let mut t = Task::new(1, "late", Some(past), Priority::High, "");
        assert!(is_overdue(&t, today));
        t.completed = true;
        assert!(!is_overdue(&t, today));

        let due_today = Task::new(2, "today", Some(today), Priority::Low, "");
        assert!(!is_overdue(&due_today, today));

        let undated = Task::new(3, "whenever", None, Priority::Low, "");
        assert!(!is_overdue(&undated, today));
    }

    #[test]
    fn test_format_due() {
        let d = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        assert_eq!(format_due(Some(d)), "Jan 1, 2099");
        assert_eq!(format_due(None), "-");
    }

    #[test]
    fn test_stats_counts_unfiltered() {
        let tasks = vec![
            task(1, "a", "", true),
            task(2, "b", "", false),
            task(3, "c", "", true),
        ];
        let s = stats(&tasks);
        assert_eq!(s.total, 3);
        assert_eq!(s.completed, 2);
    }
}
