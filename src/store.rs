//! Persistence and mutation of the task list.
//!
//! The whole list lives in one JSON file whose content is the serialized
//! array of tasks, newest first. Every mutating operation rewrites the file
//! immediately, so the on-disk value always mirrors the in-memory sequence.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::Utc;

use crate::task::Task;

/// In-memory task list backed by a single JSON file.
#[derive(Debug, Default)]
pub struct Store {
    pub tasks: Vec<Task>,
}

impl Store {
    /// Load the task list from a JSON file.
    ///
    /// A missing file and malformed content both yield an empty list: the
    /// stored value is best-effort state, not something worth failing over.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Store::default();
        }
        let mut buf = String::new();
        let tasks = File::open(path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .ok()
            .and_then(|_| serde_json::from_str(&buf).ok())
            .unwrap_or_default();
        Store { tasks }
    }

    /// Save the full task list using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(&self.tasks)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate an id for a task created now: milliseconds since the epoch,
    /// bumped past the current maximum so two adds in the same millisecond
    /// still get distinct ids.
    pub fn next_id(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let max = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        now.max(max + 1)
    }

    /// Get a task by id.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Prepend a task so the list stays newest-first, then persist.
    /// Whitespace-only text is rejected and nothing is written.
    pub fn add(&mut self, task: Task, path: &Path) -> std::io::Result<bool> {
        if task.text.trim().is_empty() {
            return Ok(false);
        }
        self.tasks.insert(0, task);
        self.save(path)?;
        Ok(true)
    }

    /// Flip the completed flag on the matching task, then persist.
    /// A missing id is a no-op and skips the write.
    pub fn toggle(&mut self, id: u64, path: &Path) -> std::io::Result<bool> {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                self.save(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the matching task, then persist. Removing an absent id is a
    /// no-op, which keeps deferred deletes safe to re-apply.
    pub fn remove(&mut self, id: u64, path: &Path) -> std::io::Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.save(path)?;
        Ok(true)
    }

    /// Drop every completed task, then persist.
    pub fn clear_completed(&mut self, path: &Path) -> std::io::Result<usize> {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.save(path)?;
        }
        Ok(removed)
    }
}
