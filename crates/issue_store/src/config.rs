use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Project configuration stored at `.lodestar/config.yaml`.
///
/// The status list defines the kanban columns in order; both lists are fixed
/// for the lifetime of an interactive session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub project: String,
    pub prefix: String,
    pub statuses: Vec<String>,
    pub priorities: Vec<String>,
}

impl Config {
    /// Returns the default configuration for a freshly-initialized project.
    #[must_use]
    pub fn default_for(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            prefix: "LDS".to_string(),
            statuses: vec![
                "todo".to_string(),
                "in-progress".to_string(),
                "done".to_string(),
            ],
            priorities: vec![
                "low".to_string(),
                "medium".to_string(),
                "high".to_string(),
                "critical".to_string(),
            ],
        }
    }

    pub fn parse(data: &str) -> Result<Self, StoreError> {
        serde_yaml::from_str(data).map_err(|source| StoreError::yaml("config", source))
    }

    pub fn to_yaml(&self) -> Result<String, StoreError> {
        serde_yaml::to_string(self).map_err(|source| StoreError::yaml("config", source))
    }
}
