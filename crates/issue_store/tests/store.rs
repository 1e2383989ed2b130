use std::fs;

use issue_store::{
    atomic_write, find_project_root, FileStore, Issue, IssueMeta, StoreError,
};
use pretty_assertions::assert_eq;

fn issue(id: &str, status: &str) -> Issue {
    Issue {
        meta: IssueMeta {
            format_version: 1,
            id: id.to_string(),
            title: format!("issue {id}"),
            status: status.to_string(),
            priority: "medium".to_string(),
            labels: Vec::new(),
            parent: None,
            blocked_by: Vec::new(),
            docs: Vec::new(),
            created: "2026-08-01".to_string(),
            updated: "2026-08-01".to_string(),
            comments: Vec::new(),
        },
        body: String::new(),
    }
}

fn init_store() -> (tempfile::TempDir, FileStore) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FileStore::new(dir.path());
    store.init_project("demo").expect("init project");
    (dir, store)
}

#[test]
fn init_creates_config_and_rejects_reinit() {
    let (_dir, store) = init_store();
    let config = store.load_config().expect("load config");
    assert_eq!(config.project, "demo");
    assert_eq!(config.prefix, "LDS");

    assert!(matches!(
        store.init_project("demo"),
        Err(StoreError::ProjectExists { .. })
    ));
}

#[test]
fn save_and_load_issue_round_trip() {
    let (_dir, store) = init_store();
    let mut original = issue("LDS-1", "todo");
    original.body = "\nA body.\n".to_string();

    store.save_issue(&original).expect("save issue");
    let loaded = store.load_issue("LDS-1").expect("load issue");
    assert_eq!(loaded, original);
}

#[test]
fn load_missing_issue_is_not_found() {
    let (_dir, store) = init_store();
    assert!(matches!(
        store.load_issue("LDS-99"),
        Err(StoreError::IssueNotFound { .. })
    ));
}

#[test]
fn list_issues_sorts_by_numeric_id_suffix() {
    let (_dir, store) = init_store();
    for id in ["LDS-10", "LDS-2", "LDS-1"] {
        store.save_issue(&issue(id, "todo")).expect("save issue");
    }

    let ids: Vec<String> = store
        .list_issues()
        .expect("list issues")
        .into_iter()
        .map(|issue| issue.meta.id)
        .collect();
    assert_eq!(ids, vec!["LDS-1", "LDS-2", "LDS-10"]);
}

#[test]
fn list_issues_ignores_non_issue_files_and_missing_dir() {
    let (dir, store) = init_store();
    fs::write(store.issues_dir().join("notes.txt"), "not an issue").expect("write stray file");
    assert!(store.list_issues().expect("list issues").is_empty());

    let empty = FileStore::new(dir.path().join("elsewhere"));
    assert!(empty.list_issues().expect("empty list").is_empty());
}

#[test]
fn next_id_allocates_past_the_maximum_suffix() {
    let (_dir, store) = init_store();
    assert_eq!(store.next_id().expect("first id"), "LDS-1");

    store.save_issue(&issue("LDS-4", "todo")).expect("save issue");
    store.save_issue(&issue("LDS-2", "todo")).expect("save issue");
    assert_eq!(store.next_id().expect("next id"), "LDS-5");
}

#[test]
fn find_project_root_walks_up_from_nested_directories() {
    let (dir, store) = init_store();
    let nested = dir.path().join("src").join("deep");
    fs::create_dir_all(&nested).expect("create nested dirs");

    let root = find_project_root(&nested).expect("find root");
    assert_eq!(
        root.canonicalize().expect("canonicalize root"),
        store
            .project_root()
            .canonicalize()
            .expect("canonicalize store root")
    );
}

#[test]
fn find_project_root_fails_outside_a_project() {
    let dir = tempfile::tempdir().expect("create temp dir");
    assert!(matches!(
        find_project_root(dir.path()),
        Err(StoreError::ProjectNotFound)
    ));
}

#[test]
fn atomic_write_replaces_content_without_leftovers() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("target.md");

    atomic_write(&path, b"first").expect("first write");
    atomic_write(&path, b"second").expect("second write");
    assert_eq!(fs::read_to_string(&path).expect("read back"), "second");

    // No temp files left behind in the directory.
    let names: Vec<String> = fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["target.md"]);
}
