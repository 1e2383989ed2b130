use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no lodestar project found (missing .lodestar directory)")]
    ProjectNotFound,

    #[error("lodestar project already initialized at {path}")]
    ProjectExists { path: PathBuf },

    #[error("issue not found: {id}")]
    IssueNotFound { id: String },

    #[error("invalid issue id {id:?} (expected PREFIX-NUMBER, e.g. LDS-1)")]
    InvalidId { id: String },

    #[error("invalid status {status:?} (allowed: {allowed:?})")]
    InvalidStatus {
        status: String,
        allowed: Vec<String>,
    },

    #[error("invalid priority {priority:?} (allowed: {allowed:?})")]
    InvalidPriority {
        priority: String,
        allowed: Vec<String>,
    },

    #[error("issue title must not be empty")]
    EmptyTitle,

    #[error("{reason}")]
    Frontmatter { reason: &'static str },

    #[error("invalid YAML in {what}: {source}")]
    Yaml {
        what: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse issue file {path}: {source}")]
    IssueParse {
        path: PathBuf,
        #[source]
        source: Box<StoreError>,
    },

    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn yaml(what: &'static str, source: serde_yaml::Error) -> Self {
        Self::Yaml { what, source }
    }
}
