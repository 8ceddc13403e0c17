use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A frontmatter label that does not name any variant of the field's enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} {value:?}")]
pub struct UnknownLabel {
    pub field: &'static str,
    pub value: String,
}

/// Board column a task sits in.
///
/// The wire label (what goes into the frontmatter) is the variant name.
/// Which statuses appear on the board, and in what order, comes from
/// `[board] columns` in the project config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Backlog,
        Status::Todo,
        Status::InProgress,
        Status::Review,
        Status::Done,
    ];

    /// Frontmatter label
    pub fn label(self) -> &'static str {
        match self {
            Status::Backlog => "Backlog",
            Status::Todo => "Todo",
            Status::InProgress => "InProgress",
            Status::Review => "Review",
            Status::Done => "Done",
        }
    }

    /// Human-readable default used by the UI when no label override is configured
    pub fn title(self) -> &'static str {
        match self {
            Status::InProgress => "In Progress",
            other => other.label(),
        }
    }
}

impl FromStr for Status {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| UnknownLabel {
                field: "status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of work a task represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskType {
    Bug,
    Feature,
    #[default]
    Chore,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Bug, TaskType::Feature, TaskType::Chore];

    pub fn label(self) -> &'static str {
        match self {
            TaskType::Bug => "Bug",
            TaskType::Feature => "Feature",
            TaskType::Chore => "Chore",
        }
    }
}

impl FromStr for TaskType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| UnknownLabel {
                field: "type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Task priority. Variants are declared lowest first so the derived `Ord`
/// ranks `Critical` highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }

    /// Single-cell marker shown on board cards
    pub fn marker(self) -> char {
        match self {
            Priority::Low => '▽',
            Priority::Medium => '◇',
            Priority::High => '▲',
            Priority::Critical => '‼',
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.label() == s)
            .ok_or_else(|| UnknownLabel {
                field: "priority",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_back() {
        for status in Status::ALL {
            assert_eq!(status.label().parse::<Status>(), Ok(status));
        }
        for kind in TaskType::ALL {
            assert_eq!(kind.label().parse::<TaskType>(), Ok(kind));
        }
        for priority in Priority::ALL {
            assert_eq!(priority.label().parse::<Priority>(), Ok(priority));
        }
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let err = "todo".parse::<Status>().unwrap_err();
        assert_eq!(err.field, "status");
        assert_eq!(err.value, "todo");
        assert!("high".parse::<Priority>().is_err());
        assert!("In Progress".parse::<Status>().is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(TaskType::default(), TaskType::Chore);
    }

    #[test]
    fn test_status_title() {
        assert_eq!(Status::InProgress.title(), "In Progress");
        assert_eq!(Status::Todo.title(), "Todo");
    }
}
