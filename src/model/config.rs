use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path};

use super::fields::{Status, TaskType};

/// Settings from `.tiki/config.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Tasks directory, relative to `.tiki/`
    #[serde(default = "default_dir")]
    pub dir: String,
    /// Prefix for generated IDs (`T` gives `T-001`)
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    /// Upper bound on startup load time
    #[serde(default)]
    pub load_timeout_ms: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            dir: default_dir(),
            id_prefix: default_id_prefix(),
            load_timeout_ms: None,
        }
    }
}

impl StoreConfig {
    /// `dir` must name one directory inside `.tiki/`. `id_prefix` becomes the
    /// start of every task file name, so it may not hide the file or leave
    /// the tasks directory.
    pub fn check(&self) -> Result<(), String> {
        if Path::new(&self.dir).components().count() != 1
            || !matches!(Path::new(&self.dir).components().next(), Some(Component::Normal(_)))
        {
            return Err("store.dir must be a single directory name inside .tiki/".into());
        }
        let prefix = self.id_prefix.as_str();
        if prefix.is_empty()
            || prefix.starts_with('.')
            || prefix
                .chars()
                .any(|c| c.is_whitespace() || c.is_control() || c == '/' || c == '\\')
        {
            return Err(format!(
                "store.id_prefix {:?} must be non-empty, must not start with '.', \
                 and may not contain whitespace or path separators",
                prefix
            ));
        }
        Ok(())
    }
}

fn default_dir() -> String {
    "tasks".to_string()
}

fn default_id_prefix() -> String {
    "T".to_string()
}

/// The enum domains a project allows, and the column order of the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_columns")]
    pub columns: Vec<Status>,
    #[serde(default = "default_types")]
    pub types: Vec<TaskType>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            columns: default_columns(),
            types: default_types(),
        }
    }
}

fn default_columns() -> Vec<Status> {
    Status::ALL.to_vec()
}

fn default_types() -> Vec<TaskType> {
    TaskType::ALL.to_vec()
}

impl BoardConfig {
    pub fn has_column(&self, status: Status) -> bool {
        self.columns.contains(&status)
    }

    pub fn allows_type(&self, task_type: TaskType) -> bool {
        self.types.contains(&task_type)
    }

    /// Position of a status on the board, left to right
    pub fn column_index(&self, status: Status) -> Option<usize> {
        self.columns.iter().position(|s| *s == status)
    }

    pub fn first_column(&self) -> Status {
        self.columns.first().copied().unwrap_or(Status::Backlog)
    }

    /// Column to the right of `status`, if any
    pub fn next_column(&self, status: Status) -> Option<Status> {
        let idx = self.column_index(status)?;
        self.columns.get(idx + 1).copied()
    }

    /// Column to the left of `status`, if any
    pub fn prev_column(&self, status: Status) -> Option<Status> {
        let idx = self.column_index(status)?;
        idx.checked_sub(1).and_then(|i| self.columns.get(i).copied())
    }

    /// Reject empty or repeated domains. `types` must keep the default
    /// type, which tasks get when they name none.
    pub fn check(&self) -> Result<(), String> {
        if self.columns.is_empty() {
            return Err("board.columns must list at least one status".into());
        }
        if !self.allows_type(TaskType::default()) {
            return Err(format!(
                "board.types must include {}, the type of tasks that name none",
                TaskType::default()
            ));
        }
        for (i, status) in self.columns.iter().enumerate() {
            if self.columns[..i].contains(status) {
                return Err(format!("board.columns lists {} twice", status));
            }
        }
        Ok(())
    }
}

/// How the detail view renders task descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownStyle {
    /// Verbatim markdown source
    Plain,
    /// Markup stripped for terminal reading
    #[default]
    Text,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub markdown: MarkdownStyle,
    /// Hex color overrides keyed by theme slot (`accent = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Display labels keyed by wire label (`InProgress = "Doing"`).
    /// These only change what the UI shows, never what is written to disk.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl UiConfig {
    /// Column header text for a status
    pub fn status_label(&self, status: Status) -> String {
        self.labels
            .get(status.label())
            .cloned()
            .unwrap_or_else(|| status.title().to_string())
    }
}
