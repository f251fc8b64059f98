//! Personal task list, persisted as a JSON file next to the dashboard.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("no task with id {0}")]
    NotFound(u64),

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid task file {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type TaskResult<T> = Result<T, TaskError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Open and due strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_at.is_some_and(|d| d < today)
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub due_at: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    next_id: u64,
    tasks: Vec<Task>,
}

impl TaskList {
    /// Read the list from `path`; a missing file is an empty list.
    pub fn load(path: &Path) -> TaskResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(TaskError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let list: TaskList = serde_json::from_str(&text).map_err(|source| TaskError::Format {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loaded {} tasks from {}", list.tasks.len(), path.display());
        Ok(list)
    }

    pub fn save(&self, path: &Path) -> TaskResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| TaskError::Format {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| TaskError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Saved {} tasks to {}", self.tasks.len(), path.display());
        Ok(())
    }

    pub fn create(
        &mut self,
        title: &str,
        description: Option<String>,
        due_at: Option<NaiveDate>,
    ) -> TaskResult<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        self.next_id += 1;
        let now = Utc::now();
        self.tasks.push(Task {
            id: self.next_id,
            title: title.to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            completed: false,
            due_at,
            created_at: now,
            updated_at: now,
        });
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn update(&mut self, id: u64, update: TaskUpdate) -> TaskResult<&Task> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(TaskError::EmptyTitle);
            }
        }
        let task = self.get_mut(id)?;
        if let Some(title) = update.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(completed) = update.completed {
            task.completed = completed;
        }
        if let Some(due_at) = update.due_at {
            task.due_at = due_at;
        }
        task.updated_at = Utc::now();
        Ok(task)
    }

    /// Flip the completed flag.
    pub fn toggle(&mut self, id: u64) -> TaskResult<&Task> {
        let completed = self.get(id)?.completed;
        self.update(
            id,
            TaskUpdate {
                completed: Some(!completed),
                ..Default::default()
            },
        )
    }

    pub fn delete(&mut self, id: u64) -> TaskResult<Task> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        Ok(self.tasks.remove(idx))
    }

    pub fn get(&self, id: u64) -> TaskResult<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    fn get_mut(&mut self, id: u64) -> TaskResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    /// All tasks, newest first.
    pub fn list(&self) -> Vec<&Task> {
        let mut out: Vec<&Task> = self.tasks.iter().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        out
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn create_assigns_increasing_ids_and_lists_newest_first() {
        let mut list = TaskList::default();
        let a = list.create("Clean data", None, None).unwrap().id;
        let b = list.create("  Write report ", Some("   ".into()), None).unwrap().id;
        assert!(b > a);
        let listed = list.list();
        assert_eq!(listed[0].id, b);
        assert_eq!(listed[0].title, "Write report");
        assert_eq!(listed[0].description, None);
        assert_eq!(list.pending_count(), 2);
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut list = TaskList::default();
        assert!(matches!(list.create("  ", None, None), Err(TaskError::EmptyTitle)));
        let id = list.create("x", None, None).unwrap().id;
        let err = list
            .update(id, TaskUpdate { title: Some(String::new()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, TaskError::EmptyTitle));
    }

    #[test]
    fn toggle_update_delete() {
        let mut list = TaskList::default();
        let id = list.create("Review", None, None).unwrap().id;
        assert!(list.toggle(id).unwrap().completed);
        assert_eq!(list.pending_count(), 0);
        assert!(!list.toggle(id).unwrap().completed);

        let due = day(2026, 1, 31);
        let task = list
            .update(
                id,
                TaskUpdate {
                    description: Some(Some("quarterly".into())),
                    due_at: Some(Some(due)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(task.due_at, Some(due));
        assert_eq!(task.description.as_deref(), Some("quarterly"));
        assert!(task.updated_at >= task.created_at);

        assert_eq!(list.delete(id).unwrap().id, id);
        assert!(list.is_empty());
        assert!(matches!(list.delete(id), Err(TaskError::NotFound(i)) if i == id));
        assert!(matches!(list.toggle(99), Err(TaskError::NotFound(99))));
    }

    #[test]
    fn overdue_only_when_open_and_past_due() {
        let mut list = TaskList::default();
        let id = list.create("Ship", None, Some(day(2026, 3, 1))).unwrap().id;
        let task = list.get(id).unwrap().clone();
        assert!(task.is_overdue(day(2026, 3, 2)));
        assert!(!task.is_overdue(day(2026, 3, 1)));
        let done = list.toggle(id).unwrap();
        assert!(!done.is_overdue(day(2026, 3, 2)));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        assert!(TaskList::load(&path).unwrap().is_empty());

        let mut list = TaskList::default();
        list.create("One", Some("first".into()), Some(day(2026, 5, 4))).unwrap();
        let id = list.create("Two", None, None).unwrap().id;
        list.toggle(id).unwrap();
        list.save(&path).unwrap();

        let mut loaded = TaskList::load(&path).unwrap();
        assert_eq!(loaded, list);
        // ids keep increasing after a reload
        assert!(loaded.create("Three", None, None).unwrap().id > id);
    }

    #[test]
    fn corrupt_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(TaskList::load(&path), Err(TaskError::Format { .. })));
    }
}
