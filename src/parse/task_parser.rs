use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_yaml::Value;

use crate::model::fields::{Priority, Status, TaskType, UnknownLabel};
use crate::model::task::Task;

use super::frontmatter::{FrontmatterError, split_frontmatter};

/// Why a task document could not be decoded
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frontmatter is missing its closing `---` delimiter")]
    MissingClosingDelimiter,
    #[error("frontmatter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("frontmatter is not a key-value mapping")]
    NotAMapping,
    #[error("frontmatter key is not a string: {0}")]
    InvalidKey(String),
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("invalid value for {field}: {value:?}")]
    InvalidFieldValue { field: &'static str, value: String },
}

impl From<FrontmatterError> for DecodeError {
    fn from(err: FrontmatterError) -> Self {
        match err {
            FrontmatterError::MissingClosingDelimiter => DecodeError::MissingClosingDelimiter,
        }
    }
}

impl From<UnknownLabel> for DecodeError {
    fn from(err: UnknownLabel) -> Self {
        DecodeError::InvalidFieldValue {
            field: err.field,
            value: err.value,
        }
    }
}

/// Decode a task document. Missing timestamps fall back to the file's
/// modification time, or the current time if the file cannot be stat'ed.
pub fn decode(path: &Path, content: &str) -> Result<Task, DecodeError> {
    let fallback = file_mtime(path).unwrap_or_else(Utc::now);
    decode_with_fallback(path, content, fallback)
}

/// Modification time of a file, if available
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Decode a task document with an explicit fallback for missing timestamps.
///
/// Keys map case-sensitively onto task fields. Keys this crate does not
/// know are kept in `Task::extra`. The body becomes the description as-is.
pub fn decode_with_fallback(
    path: &Path,
    content: &str,
    fallback: DateTime<Utc>,
) -> Result<Task, DecodeError> {
    let (frontmatter, body) = split_frontmatter(content)?;
    let mut fields = parse_mapping(frontmatter)?;

    let id = required_string(&mut fields, "id")?;
    let title = required_string(&mut fields, "title")?;
    let status = required_string(&mut fields, "status")?.parse::<Status>()?;
    let task_type = optional_label::<TaskType>(&mut fields, "type")?.unwrap_or_default();
    let priority = optional_label::<Priority>(&mut fields, "priority")?.unwrap_or_default();
    let assignee = optional_string(&mut fields, "assignee")?;
    let points = optional_points(&mut fields)?;
    let tags = take_tags(&mut fields)?;
    let created = optional_timestamp(&mut fields, "created_at")?;
    let updated = optional_timestamp(&mut fields, "updated_at")?;

    // Fill gaps so the fallback never inverts the pair
    let (created_at, updated_at) = match (created, updated) {
        (Some(c), Some(u)) => (c, u),
        (Some(c), None) => (c, fallback.max(c)),
        (None, Some(u)) => (fallback.min(u), u),
        (None, None) => (fallback, fallback),
    };

    Ok(Task {
        id,
        title,
        status,
        task_type,
        priority,
        assignee,
        points,
        tags,
        description: body.to_string(),
        created_at,
        updated_at,
        extra: fields,
        source_path: Some(path.to_path_buf()),
    })
}

fn parse_mapping(frontmatter: &str) -> Result<BTreeMap<String, Value>, DecodeError> {
    if frontmatter.is_empty() {
        return Ok(BTreeMap::new());
    }
    let mapping = match serde_yaml::from_str::<Value>(frontmatter)? {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(BTreeMap::new()),
        _ => return Err(DecodeError::NotAMapping),
    };

    let mut fields = BTreeMap::new();
    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s,
            other => return Err(DecodeError::InvalidKey(describe(&other))),
        };
        fields.insert(key, value);
    }
    Ok(fields)
}

/// Remove a key, treating an explicit null (`key:`) as absent
fn take(fields: &mut BTreeMap<String, Value>, key: &str) -> Option<Value> {
    match fields.remove(key) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    }
}

fn required_string(
    fields: &mut BTreeMap<String, Value>,
    key: &'static str,
) -> Result<String, DecodeError> {
    optional_string(fields, key)?.ok_or(DecodeError::MissingRequiredField(key))
}

fn optional_string(
    fields: &mut BTreeMap<String, Value>,
    key: &'static str,
) -> Result<Option<String>, DecodeError> {
    match take(fields, key) {
        None => Ok(None),
        Some(value) => scalar_string(&value)
            .map(Some)
            .ok_or_else(|| invalid(key, &value)),
    }
}

fn optional_label<T>(
    fields: &mut BTreeMap<String, Value>,
    key: &'static str,
) -> Result<Option<T>, DecodeError>
where
    T: FromStr<Err = UnknownLabel>,
{
    match optional_string(fields, key)? {
        None => Ok(None),
        Some(label) => Ok(Some(label.parse()?)),
    }
}

fn optional_points(fields: &mut BTreeMap<String, Value>) -> Result<Option<u32>, DecodeError> {
    let Some(value) = take(fields, "points") else {
        return Ok(None);
    };
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| invalid("points", &value))
}

fn take_tags(fields: &mut BTreeMap<String, Value>) -> Result<BTreeSet<String>, DecodeError> {
    match take(fields, "tags") {
        None => Ok(BTreeSet::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| scalar_string(item).ok_or_else(|| invalid("tags", item)))
            .collect(),
        // A lone scalar is a single tag
        Some(value) => scalar_string(&value)
            .map(|tag| BTreeSet::from([tag]))
            .ok_or_else(|| invalid("tags", &value)),
    }
}

fn optional_timestamp(
    fields: &mut BTreeMap<String, Value>,
    key: &'static str,
) -> Result<Option<DateTime<Utc>>, DecodeError> {
    let Some(value) = take(fields, key) else {
        return Ok(None);
    };
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|t| Some(t.with_timezone(&Utc)))
        .ok_or_else(|| invalid(key, &value))
}

/// Strings, numbers and booleans all read as text (`id: 42` is the ID "42")
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn invalid(field: &'static str, value: &Value) -> DecodeError {
    DecodeError::InvalidFieldValue {
        field,
        value: describe(value),
    }
}

/// Compact textual form of a YAML value for error messages
fn describe(value: &Value) -> String {
    scalar_string(value).unwrap_or_else(|| {
        serde_yaml::to_string(value)
            .map(|s| s.trim_end().replace('\n', " "))
            .unwrap_or_else(|_| format!("{:?}", value))
    })
}
