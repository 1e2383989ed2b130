use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::StoreError;

static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+-\d+$").expect("id pattern is a valid regex"));

/// A structured comment held in issue frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub date: String,
    pub body: String,
}

/// YAML frontmatter of an issue file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMeta {
    pub format_version: u32,
    pub id: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    pub created: String,
    pub updated: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

/// Frontmatter metadata plus the markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub meta: IssueMeta,
    pub body: String,
}

/// Parses an issue file: `---` delimited YAML frontmatter followed by the
/// markdown body.
pub fn parse_issue(data: &str) -> Result<Issue, StoreError> {
    let rest = data.strip_prefix("---\n").ok_or(StoreError::Frontmatter {
        reason: "missing opening frontmatter delimiter",
    })?;

    let (yaml, body) = match rest.find("\n---\n") {
        Some(index) => (&rest[..index + 1], &rest[index + 5..]),
        None => match rest.strip_suffix("\n---") {
            // Frontmatter-only file with no body after the closing delimiter.
            Some(yaml) => (&rest[..yaml.len() + 1], ""),
            None => {
                return Err(StoreError::Frontmatter {
                    reason: "missing closing frontmatter delimiter",
                })
            }
        },
    };

    let meta: IssueMeta =
        serde_yaml::from_str(yaml).map_err(|source| StoreError::yaml("issue frontmatter", source))?;

    Ok(Issue {
        meta,
        body: body.to_string(),
    })
}

/// Serializes an issue back to frontmatter + body form. Labels are sorted for
/// deterministic output.
pub fn serialize_issue(issue: &Issue) -> Result<String, StoreError> {
    let mut meta = issue.meta.clone();
    meta.labels.sort();

    let yaml = serde_yaml::to_string(&meta)
        .map_err(|source| StoreError::yaml("issue frontmatter", source))?;

    let mut out = String::with_capacity(yaml.len() + issue.body.len() + 8);
    out.push_str("---\n");
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(&issue.body);
    Ok(out)
}

impl Issue {
    /// Checks id format, non-empty title, and status/priority membership in
    /// the configured lists.
    pub fn validate(&self, config: &Config) -> Result<(), StoreError> {
        if self.meta.title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        if !ID_PATTERN.is_match(&self.meta.id) {
            return Err(StoreError::InvalidId {
                id: self.meta.id.clone(),
            });
        }

        if !config.statuses.contains(&self.meta.status) {
            return Err(StoreError::InvalidStatus {
                status: self.meta.status.clone(),
                allowed: config.statuses.clone(),
            });
        }

        if !config.priorities.contains(&self.meta.priority) {
            return Err(StoreError::InvalidPriority {
                priority: self.meta.priority.clone(),
                allowed: config.priorities.clone(),
            });
        }

        Ok(())
    }
}

/// Extracts the numeric suffix of an issue id (`"LDS-3"` → `3`).
pub fn id_number(id: &str) -> Result<u64, StoreError> {
    let (_, number) = id.split_once('-').ok_or_else(|| StoreError::InvalidId {
        id: id.to_string(),
    })?;
    number.parse().map_err(|_| StoreError::InvalidId {
        id: id.to_string(),
    })
}
