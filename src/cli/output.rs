use serde::Serialize;

use crate::model::fields::{Priority, Status, TaskType};
use crate::model::task::Task;
use crate::parse::task_serializer::format_timestamp;
use crate::store::PartialLoadError;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub status: Status,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub status: Status,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct CheckJson {
    pub valid: bool,
    pub loaded: usize,
    /// Files never read because the load deadline passed
    pub unread: usize,
    pub failures: Vec<FailureJson>,
}

#[derive(Serialize)]
pub struct FailureJson {
    pub file: String,
    pub error: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        status: task.status,
        task_type: task.task_type,
        priority: task.priority,
        assignee: task.assignee.clone(),
        points: task.points,
        tags: task.tags.iter().cloned().collect(),
        description: task.description.clone(),
        created_at: format_timestamp(&task.created_at),
        updated_at: format_timestamp(&task.updated_at),
        file: task
            .source_path
            .as_ref()
            .map(|p| p.display().to_string()),
    }
}

/// A load is valid only when every file was read and none failed
pub fn check_to_json(
    loaded: usize,
    partial: Option<&PartialLoadError>,
    unread: usize,
) -> CheckJson {
    let failures: Vec<FailureJson> = partial
        .map(|p| {
            p.failures
                .iter()
                .map(|f| FailureJson {
                    file: f.path.display().to_string(),
                    error: f.error.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    CheckJson {
        valid: failures.is_empty() && unread == 0,
        loaded,
        unread,
        failures,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn format_tags(task: &Task) -> String {
    task.tags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One-line summary: `T-001 ▲ Fix login #auth`
pub fn format_task_line(task: &Task) -> String {
    let tags = if task.tags.is_empty() {
        String::new()
    } else {
        format!(" {}", format_tags(task))
    };
    format!(
        "{} {} {}{}",
        task.id,
        task.priority.marker(),
        task.title,
        tags
    )
}

/// Column header for the text listing
pub fn format_column_header(label: &str, count: usize) -> String {
    format!("== {} ({}) ==", label, count)
}

/// Full task: header, one `key: value` line per field, then the description
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![format!("{} {}", task.id, task.title)];
    lines.push(format!("status: {}", task.status));
    lines.push(format!("type: {}", task.task_type));
    lines.push(format!("priority: {}", task.priority));
    if let Some(assignee) = &task.assignee {
        lines.push(format!("assignee: {}", assignee));
    }
    if let Some(points) = task.points {
        lines.push(format!("points: {}", points));
    }
    if !task.tags.is_empty() {
        lines.push(format!("tags: {}", format_tags(task)));
    }
    lines.push(format!("created: {}", format_timestamp(&task.created_at)));
    lines.push(format!("updated: {}", format_timestamp(&task.updated_at)));
    if !task.description.is_empty() {
        lines.push(String::new());
        lines.extend(task.description.lines().map(str::to_string));
    }
    lines
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

/// `in-progress`, `in_progress`, `InProgress` and `inprogress` all name the same label
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_label<T: Copy>(
    kind: &str,
    s: &str,
    all: &[T],
    label: fn(T) -> &'static str,
) -> Result<T, String> {
    let wanted = normalize(s);
    all.iter()
        .copied()
        .find(|v| normalize(label(*v)) == wanted)
        .ok_or_else(|| {
            let expected: Vec<&str> = all.iter().map(|v| label(*v)).collect();
            format!(
                "unknown {} '{}' (expected: {})",
                kind,
                s,
                expected.join(", ")
            )
        })
}

pub fn parse_status(s: &str) -> Result<Status, String> {
    parse_label("status", s, &Status::ALL, Status::label)
}

pub fn parse_task_type(s: &str) -> Result<TaskType, String> {
    parse_label("type", s, &TaskType::ALL, TaskType::label)
}

pub fn parse_priority(s: &str) -> Result<Priority, String> {
    parse_label("priority", s, &Priority::ALL, Priority::label)
}
