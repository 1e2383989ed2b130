use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::atomic::atomic_write;
use crate::config::Config;
use crate::error::StoreError;
use crate::issue::{id_number, parse_issue, serialize_issue, Issue};

/// Directory that marks a project root.
pub const META_DIR_NAME: &str = ".lodestar";

/// File suffix of issue files; the watcher filters on this too.
pub const ISSUE_FILE_SUFFIX: &str = ".md";

const CONFIG_FILE_NAME: &str = "config.yaml";
const LOCK_FILE_NAME: &str = ".lock";

/// Store implementation over the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

/// Walks up from `start` looking for a `.lodestar/` directory, stopping at
/// `$HOME` or the filesystem root.
pub fn find_project_root(start: &Path) -> Result<PathBuf, StoreError> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut dir = start
        .canonicalize()
        .map_err(|source| StoreError::io("resolving start directory", start, source))?;

    loop {
        if dir.join(META_DIR_NAME).is_dir() {
            return Ok(dir);
        }
        if home.as_deref() == Some(dir.as_path()) {
            break;
        }
        if !dir.pop() {
            break;
        }
    }

    Err(StoreError::ProjectNotFound)
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.root
    }

    fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR_NAME)
    }

    #[must_use]
    pub fn issues_dir(&self) -> PathBuf {
        self.meta_dir().join("issues")
    }

    fn config_path(&self) -> PathBuf {
        self.meta_dir().join(CONFIG_FILE_NAME)
    }

    fn lock_path(&self) -> PathBuf {
        self.meta_dir().join(LOCK_FILE_NAME)
    }

    #[must_use]
    pub fn issue_path(&self, id: &str) -> PathBuf {
        self.issues_dir().join(format!("{id}{ISSUE_FILE_SUFFIX}"))
    }

    /// Runs `body` while holding the project's advisory file lock. The lock
    /// serializes writers across processes; readers go without it.
    fn with_lock<T>(&self, body: impl FnOnce() -> Result<T, StoreError>) -> Result<T, StoreError> {
        let path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| StoreError::io("opening lock file", &path, source))?;
        lock_file
            .lock_exclusive()
            .map_err(|source| StoreError::io("acquiring lock", &path, source))?;

        let result = body();
        let _ = FileExt::unlock(&lock_file);
        result
    }

    /// Creates `.lodestar/` with a default config and an empty issues
    /// directory. Fails when the project already exists.
    pub fn init_project(&self, project_name: &str) -> Result<Config, StoreError> {
        let meta_dir = self.meta_dir();
        if meta_dir.exists() {
            return Err(StoreError::ProjectExists { path: meta_dir });
        }

        let issues_dir = self.issues_dir();
        fs::create_dir_all(&issues_dir)
            .map_err(|source| StoreError::io("creating issues directory", &issues_dir, source))?;

        let config = Config::default_for(project_name);
        self.save_config(&config)?;
        Ok(config)
    }

    pub fn load_config(&self) -> Result<Config, StoreError> {
        let path = self.config_path();
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::ProjectNotFound)
            }
            Err(source) => return Err(StoreError::io("reading config", &path, source)),
        };
        Config::parse(&data)
    }

    pub fn save_config(&self, config: &Config) -> Result<(), StoreError> {
        let yaml = config.to_yaml()?;
        atomic_write(&self.config_path(), yaml.as_bytes())
    }

    pub fn load_issue(&self, id: &str) -> Result<Issue, StoreError> {
        let path = self.issue_path(id);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::IssueNotFound { id: id.to_string() })
            }
            Err(source) => return Err(StoreError::io("reading issue", &path, source)),
        };
        parse_issue(&data).map_err(|source| StoreError::IssueParse {
            path,
            source: Box::new(source),
        })
    }

    pub fn save_issue(&self, issue: &Issue) -> Result<(), StoreError> {
        let data = serialize_issue(issue)?;
        let path = self.issue_path(&issue.meta.id);
        self.with_lock(|| atomic_write(&path, data.as_bytes()))
    }

    /// Loads every issue file, sorted ascending by numeric id suffix. A
    /// missing issues directory yields an empty list.
    pub fn list_issues(&self) -> Result<Vec<Issue>, StoreError> {
        let dir = self.issues_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::io("reading issues directory", &dir, source)),
        };

        let mut issues = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|source| StoreError::io("reading issues directory", &dir, source))?;
            let path = entry.path();
            if !is_issue_file(&path) {
                continue;
            }
            let data = fs::read_to_string(&path)
                .map_err(|source| StoreError::io("reading issue", &path, source))?;
            let issue = parse_issue(&data).map_err(|source| StoreError::IssueParse {
                path: path.clone(),
                source: Box::new(source),
            })?;
            issues.push(issue);
        }

        issues.sort_by_key(|issue| id_number(&issue.meta.id).unwrap_or(0));
        Ok(issues)
    }

    /// Allocates the next issue id (`<prefix>-<max+1>`) under the advisory
    /// lock so concurrent creators never collide.
    pub fn next_id(&self) -> Result<String, StoreError> {
        let config = self.load_config()?;
        self.with_lock(|| {
            let dir = self.issues_dir();
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(format!("{}-1", config.prefix))
                }
                Err(source) => {
                    return Err(StoreError::io("reading issues directory", &dir, source))
                }
            };

            let mut max_number = 0;
            for entry in entries {
                let entry = entry
                    .map_err(|source| StoreError::io("reading issues directory", &dir, source))?;
                let path = entry.path();
                if !is_issue_file(&path) {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                    continue;
                };
                if let Ok(number) = id_number(stem) {
                    max_number = max_number.max(number);
                }
            }

            Ok(format!("{}-{}", config.prefix, max_number + 1))
        })
    }
}

fn is_issue_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(ISSUE_FILE_SUFFIX))
}
