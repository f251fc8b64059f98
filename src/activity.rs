//! Session activity log.
//!
//! Every user-visible action (loads, exports, task edits, failures) lands
//! here as well as in the `log` stream, so it can be reviewed in the UI and
//! exported as JSON.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Version tag written into exported logs.
pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Info,
    Warn,
    Error,
}

impl ActivityLevel {
    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Info => "INFO",
            ActivityLevel::Warn => "WARN",
            ActivityLevel::Error => "ERROR",
        }
    }
}

impl From<ActivityLevel> for log::Level {
    fn from(level: ActivityLevel) -> Self {
        match level {
            ActivityLevel::Info => log::Level::Info,
            ActivityLevel::Warn => log::Level::Warn,
            ActivityLevel::Error => log::Level::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: u64,
    pub level: ActivityLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// The document written by [`ActivityLog::write_json`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityExport<'a> {
    pub logs: Vec<&'a ActivityEntry>,
    pub export_date: DateTime<Utc>,
    pub version: &'static str,
}

/// Bounded, in-memory log; the oldest entries drop off past `capacity`.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
    next_id: u64,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    pub fn record(&mut self, level: ActivityLevel, message: impl Into<String>) {
        let message = message.into();
        log::log!(level.into(), "{message}");
        self.next_id += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry {
            id: self.next_id,
            level,
            message,
            created_at: Utc::now(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(ActivityLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(ActivityLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(ActivityLevel::Error, message);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn export(&self) -> ActivityExport<'_> {
        ActivityExport {
            logs: self.entries().collect(),
            export_date: Utc::now(),
            version: EXPORT_VERSION,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.export()).context("serializing activity log")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(500)
    }
}

/// `datadeck-activity-<YYYY-MM-DD>.json`
pub fn default_export_name(day: NaiveDate) -> String {
    format!("datadeck-activity-{}.json", day.format("%Y-%m-%d"))
}
