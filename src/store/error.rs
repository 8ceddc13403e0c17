use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::task::InvalidField;
use crate::parse::DecodeError;

/// Error type for task store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("invalid value for {field}: {value:?}")]
    InvalidFieldValue { field: &'static str, value: String },
    #[error("could not decode {}: {source}", path.display())]
    Decode { path: PathBuf, source: DecodeError },
    #[error("duplicate task id {id} in {} (first loaded from {})", path.display(), first.display())]
    DuplicateId {
        id: String,
        path: PathBuf,
        first: PathBuf,
    },
    #[error("could not access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    PartialLoad(#[from] PartialLoadError),
    #[error(
        "load deadline passed after {loaded} files ({remaining} not read, {} failed)",
        .skipped.failures.len()
    )]
    LoadTimedOut {
        loaded: usize,
        remaining: usize,
        /// Files that failed before the deadline
        skipped: PartialLoadError,
    },
}

impl From<InvalidField> for StoreError {
    fn from(err: InvalidField) -> Self {
        StoreError::InvalidFieldValue {
            field: err.field,
            value: err.value,
        }
    }
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Load errors that leave the store usable
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            StoreError::PartialLoad(_) | StoreError::LoadTimedOut { .. }
        )
    }
}

/// One task file that `load` skipped
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: StoreError,
}

/// Every file that failed during a load. The files that decoded are loaded.
#[derive(Debug, Default)]
pub struct PartialLoadError {
    pub failures: Vec<LoadFailure>,
}

impl PartialLoadError {
    /// The failure recorded for a file, matched by file name
    pub fn failure_for(&self, file_name: &str) -> Option<&StoreError> {
        self.failures
            .iter()
            .find(|f| f.path.file_name().is_some_and(|n| n == file_name))
            .map(|f| &f.error)
    }
}

impl fmt::Display for PartialLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.failures.len();
        write!(
            f,
            "{} task file{} failed to load",
            count,
            if count == 1 { "" } else { "s" }
        )?;
        for failure in &self.failures {
            let name = failure
                .path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| failure.path.to_string_lossy());
            write!(f, "\n  {}: {}", name, failure_reason(&failure.error))?;
        }
        Ok(())
    }
}

impl std::error::Error for PartialLoadError {}

/// The part of an error worth showing next to a file name that is already printed
fn failure_reason(error: &StoreError) -> String {
    match error {
        StoreError::Decode { source, .. } => source.to_string(),
        StoreError::Io { source, .. } => source.to_string(),
        StoreError::DuplicateId { id, first, .. } => format!(
            "duplicate id {} (already loaded from {})",
            id,
            first
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| first.to_string_lossy())
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_load_display() {
        let err = PartialLoadError {
            failures: vec![
                LoadFailure {
                    path: PathBuf::from("/tasks/T-003.md"),
                    error: StoreError::Decode {
                        path: PathBuf::from("/tasks/T-003.md"),
                        source: DecodeError::MissingRequiredField("title"),
                    },
                },
                LoadFailure {
                    path: PathBuf::from("/tasks/T-009.md"),
                    error: StoreError::DuplicateId {
                        id: "T-001".into(),
                        path: PathBuf::from("/tasks/T-009.md"),
                        first: PathBuf::from("/tasks/T-001.md"),
                    },
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 task files failed to load\n  T-003.md: missing required field: title\n  T-009.md: duplicate id T-001 (already loaded from T-001.md)"
        );
        assert!(matches!(
            err.failure_for("T-003.md"),
            Some(StoreError::Decode {
                source: DecodeError::MissingRequiredField("title"),
                ..
            })
        ));
        assert!(err.failure_for("T-004.md").is_none());
    }

    #[test]
    fn test_invalid_field_converts() {
        let err: StoreError = InvalidField::new("title", "").into();
        assert!(matches!(
            err,
            StoreError::InvalidFieldValue { field: "title", .. }
        ));
        assert!(!err.is_partial());
    }
}
