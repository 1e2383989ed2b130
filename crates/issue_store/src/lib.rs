//! Filesystem-backed issue storage.
//!
//! A project is a directory containing `.lodestar/` with a YAML config and an
//! `issues/` directory of markdown files carrying YAML frontmatter. All writes
//! are atomic (temp file + rename) and mutations that race with other
//! processes take an advisory file lock.

mod atomic;
mod config;
mod error;
mod issue;
mod store;

pub use atomic::atomic_write;
pub use config::Config;
pub use error::StoreError;
pub use issue::{id_number, parse_issue, serialize_issue, Comment, Issue, IssueMeta};
pub use store::{find_project_root, FileStore, ISSUE_FILE_SUFFIX, META_DIR_NAME};
