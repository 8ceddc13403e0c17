use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_yaml::Value;

use crate::model::task::Task;

use super::frontmatter::DELIMITER;

/// Serialize a task to its canonical document form.
///
/// Known fields come first in a fixed order, absent optionals are omitted,
/// tags are written as a sorted block sequence and timestamps as RFC 3339
/// UTC. Unknown keys follow in ascending key order. The description is
/// written verbatim, with a final newline added if it lacks one.
pub fn encode(task: &Task) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');

    push_field(&mut out, "id", &task.id);
    push_field(&mut out, "title", &task.title);
    push_field(&mut out, "status", task.status.label());
    push_field(&mut out, "type", task.task_type.label());
    push_field(&mut out, "priority", task.priority.label());
    if let Some(ref assignee) = task.assignee {
        push_field(&mut out, "assignee", assignee);
    }
    if let Some(points) = task.points {
        out.push_str(&format!("points: {}\n", points));
    }
    if !task.tags.is_empty() {
        out.push_str("tags:\n");
        for tag in &task.tags {
            out.push_str(&format!("  - {}\n", yaml_scalar(tag)));
        }
    }
    out.push_str(&format!("created_at: {}\n", format_timestamp(&task.created_at)));
    out.push_str(&format!("updated_at: {}\n", format_timestamp(&task.updated_at)));

    for (key, value) in &task.extra {
        push_extra(&mut out, key, value);
    }

    out.push_str(DELIMITER);
    out.push('\n');

    out.push_str(&task.description);
    if !task.description.is_empty() && !task.description.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// RFC 3339 in UTC with a `Z` suffix; sub-second digits only when present
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn push_field(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(&yaml_scalar(value));
    out.push('\n');
}

fn push_extra(out: &mut String, key: &str, value: &Value) {
    let mut entry = BTreeMap::new();
    entry.insert(key, value);
    match serde_yaml::to_string(&entry) {
        Ok(yaml) => out.push_str(&yaml),
        Err(e) => tracing::warn!(key, error = %e, "dropping unserializable frontmatter field"),
    }
}

/// Emit a string as a plain YAML scalar when it reads back unchanged,
/// otherwise as a double-quoted scalar.
fn yaml_scalar(s: &str) -> String {
    let reads_back = !s.contains(['\n', '\r', '"'])
        && matches!(serde_yaml::from_str::<Value>(s), Ok(Value::String(ref parsed)) if parsed == s);
    if reads_back {
        return s.to_string();
    }
    // JSON string syntax is a valid YAML double-quoted scalar
    serde_json::to_string(s).unwrap_or_else(|_| format!("{:?}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::BoardConfig;
    use crate::model::fields::{Priority, Status, TaskType};
    use crate::model::task::TaskDraft;
    use crate::parse::task_parser::decode_with_fallback;
    use chrono::TimeZone;
    use std::path::Path;

    fn example_task() -> Task {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap();
        let mut task =
            TaskDraft::new("Example", Status::Todo).into_task("T-001".into(), &BoardConfig::default(), created);
        task.task_type = TaskType::Feature;
        task.priority = Priority::High;
        task.assignee = Some("alice".into());
        task.points = Some(3);
        task.tags.insert("urgent".into());
        task.tags.insert("backend".into());
        task.updated_at = Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap();
        task.description = "Free-form markdown description...\n".into();
        task
    }

    #[test]
    fn test_encode_canonical_layout() {
        insta::assert_snapshot!(encode(&example_task()), @r"
        ---
        id: T-001
        title: Example
        status: Todo
        type: Feature
        priority: High
        assignee: alice
        points: 3
        tags:
          - backend
          - urgent
        created_at: 2024-01-02T15:04:05Z
        updated_at: 2024-01-03T09:00:00Z
        ---
        Free-form markdown description...
        ");
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let mut task = example_task();
        task.assignee = None;
        task.points = None;
        task.tags.clear();
        let doc = encode(&task);
        assert!(!doc.contains("assignee"));
        assert!(!doc.contains("points"));
        assert!(!doc.contains("tags"));
    }

    #[test]
    fn test_empty_description_ends_at_delimiter() {
        let mut task = example_task();
        task.description.clear();
        assert!(encode(&task).ends_with("updated_at: 2024-01-03T09:00:00Z\n---\n"));
    }

    #[test]
    fn test_missing_final_newline_is_added() {
        let mut task = example_task();
        task.description = "no newline".into();
        assert!(encode(&task).ends_with("---\nno newline\n"));
    }

    #[test]
    fn test_subsecond_timestamps_survive() {
        let t = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(format_timestamp(&t), "2023-11-14T22:13:20.123456789Z");
        let whole = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(format_timestamp(&whole), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        assert_eq!(yaml_scalar("plain title"), "plain title");
        assert_eq!(yaml_scalar("true"), "\"true\"");
        assert_eq!(yaml_scalar("42"), "\"42\"");
        assert_eq!(yaml_scalar("key: value"), "\"key: value\"");
        assert_eq!(yaml_scalar("- dash"), "\"- dash\"");
        assert_eq!(yaml_scalar("has # hash"), "\"has # hash\"");
        assert_eq!(yaml_scalar(""), "\"\"");
        assert_eq!(yaml_scalar("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_tricky_values_round_trip() {
        let mut task = example_task();
        task.title = "Fix: parser [v2] #1 'quoted' \"double\"".into();
        task.assignee = Some("null".into());
        task.tags.insert("2024".into());
        task.tags.insert("a: b".into());
        let doc = encode(&task);
        let decoded = decode_with_fallback(Path::new("T-001.md"), &doc, Utc::now()).unwrap();
        assert_eq!(decoded.title, task.title);
        assert_eq!(decoded.assignee, task.assignee);
        assert_eq!(decoded.tags, task.tags);
    }

    #[test]
    fn test_extra_fields_follow_known_fields_sorted() {
        let mut task = example_task();
        task.description.clear();
        task.extra
            .insert("zeta".into(), Value::String("last".into()));
        task.extra.insert(
            "epic".into(),
            serde_yaml::from_str("[billing, q3]").unwrap(),
        );
        let doc = encode(&task);
        let epic = doc.find("epic:").unwrap();
        let zeta = doc.find("zeta: last").unwrap();
        let updated = doc.find("updated_at:").unwrap();
        assert!(updated < epic && epic < zeta);

        let decoded = decode_with_fallback(Path::new("T-001.md"), &doc, Utc::now()).unwrap();
        assert_eq!(decoded.extra, task.extra);
    }
}
