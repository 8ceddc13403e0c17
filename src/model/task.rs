use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};

use super::config::BoardConfig;
use super::fields::{Priority, Status, TaskType};

/// A task with its typed fields, free-form body and source tracking
#[derive(Debug, Clone)]
pub struct Task {
    /// Short opaque ID like `T-001`
    pub id: String,
    /// Single-line title
    pub title: String,
    pub status: Status,
    pub task_type: TaskType,
    pub priority: Priority,
    pub assignee: Option<String>,
    /// Estimation units
    pub points: Option<u32>,
    /// Tags, kept sorted
    pub tags: BTreeSet<String>,
    /// Markdown body below the frontmatter
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Frontmatter keys this crate does not interpret, re-emitted on write
    pub extra: BTreeMap<String, serde_yaml::Value>,

    // --- Source tracking ---
    /// Backing file. Set only by the store.
    pub source_path: Option<PathBuf>,
}

/// Equality ignores `source_path`: two tasks read from different copies of
/// the same document compare equal.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.status == other.status
            && self.task_type == other.task_type
            && self.priority == other.priority
            && self.assignee == other.assignee
            && self.points == other.points
            && self.tags == other.tags
            && self.description == other.description
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
            && self.extra == other.extra
    }
}

/// A field value that breaks a task invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {field}: {value:?}")]
pub struct InvalidField {
    pub field: &'static str,
    pub value: String,
}

impl InvalidField {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        InvalidField {
            field,
            value: value.into(),
        }
    }
}

impl Task {
    /// Check every per-task invariant against the board schema.
    ///
    /// ID uniqueness and the location of `source_path` are checked by the
    /// store, which is the only place that knows about other tasks and the
    /// tasks directory.
    pub fn validate(&self, board: &BoardConfig) -> Result<(), InvalidField> {
        if !is_valid_id(&self.id) {
            return Err(InvalidField::new("id", &self.id));
        }
        if self.title.trim().is_empty() || self.title.contains(['\n', '\r']) {
            return Err(InvalidField::new("title", &self.title));
        }
        if !board.has_column(self.status) {
            return Err(InvalidField::new("status", self.status.label()));
        }
        if !board.allows_type(self.task_type) {
            return Err(InvalidField::new("type", self.task_type.label()));
        }
        if self.updated_at < self.created_at {
            return Err(InvalidField::new(
                "updated_at",
                self.updated_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ));
        }
        Ok(())
    }
}

/// IDs are printable and contain no whitespace
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| !c.is_whitespace() && !c.is_control())
}

/// The caller-supplied part of a new task. The store fills in the ID,
/// timestamps and backing file.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    /// Defaults to the first board column
    pub status: Option<Status>,
    pub task_type: Option<TaskType>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub points: Option<u32>,
    pub tags: BTreeSet<String>,
    pub description: String,
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, status: Status) -> Self {
        TaskDraft {
            title: title.into(),
            status: Some(status),
            ..Default::default()
        }
    }

    /// Materialize the draft into a task with the given identity and timestamp
    pub fn into_task(self, id: String, board: &BoardConfig, now: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            status: self.status.unwrap_or_else(|| board.first_column()),
            task_type: self.task_type.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            assignee: self.assignee,
            points: self.points,
            tags: self.tags,
            description: self.description,
            created_at: now,
            updated_at: now,
            extra: self.extra,
            source_path: None,
        }
    }
}
