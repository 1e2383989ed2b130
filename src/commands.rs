//! Implementations of the scripted subcommands.

use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;
use std::process::Command as ProcessCommand;

use anyhow::{bail, Context};
use issue_store::{
    find_project_root, parse_issue, serialize_issue, Comment, FileStore, Issue, IssueMeta,
};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::cli::Command;
use crate::render;
use crate::tui;

const DATE_FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Init => init(),
        Command::Create {
            title,
            priority,
            labels,
            parent,
            body_file,
        } => create(&title, priority, labels, parent, body_file.as_deref()),
        Command::List { status, json } => list(status.as_deref(), json),
        Command::Show { id, json } => show(&id, json),
        Command::Context { id, json } => context(&id, json),
        Command::Update {
            id,
            status,
            priority,
            title,
            labels,
            parent,
            blocked_by,
        } => update(&id, status, priority, title, labels, parent, blocked_by),
        Command::Comment {
            id,
            message,
            author,
            file,
        } => comment(&id, message, author, file.as_deref()),
        Command::Edit { id } => edit(&id),
        Command::Board => {
            let store = open_store()?;
            tui::run_board(store)
        }
        Command::Session { prompt } => {
            let store = open_store()?;
            let prompt = prompt.unwrap_or_else(default_session_prompt);
            tui::run_session(store, prompt)
        }
    }
}

/// Locates the enclosing project from the working directory.
fn open_store() -> anyhow::Result<FileStore> {
    let cwd = std::env::current_dir().context("getting working directory")?;
    let root = find_project_root(&cwd)?;
    Ok(FileStore::new(root))
}

fn today() -> anyhow::Result<String> {
    OffsetDateTime::now_utc()
        .date()
        .format(DATE_FORMAT)
        .context("formatting date")
}

fn init() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("getting working directory")?;
    let project_name = cwd
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("project")
        .to_string();

    let store = FileStore::new(&cwd);
    store.init_project(&project_name)?;
    println!("Initialized lodestar project in {}", cwd.display());
    Ok(())
}

fn create(
    title: &str,
    priority: String,
    labels: Vec<String>,
    parent: Option<String>,
    body_file: Option<&str>,
) -> anyhow::Result<()> {
    let store = open_store()?;
    let id = store.next_id()?;
    let today = today()?;

    let mut body = match body_file {
        Some("-") => read_stdin()?,
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading body file {path}"))?,
        None => String::new(),
    };
    // A leading newline keeps the body visually separated from the
    // frontmatter delimiter.
    if !body.is_empty() && !body.starts_with('\n') {
        body.insert(0, '\n');
    }

    let issue = Issue {
        meta: IssueMeta {
            format_version: 1,
            id: id.clone(),
            title: title.to_string(),
            status: "todo".to_string(),
            priority,
            labels,
            parent,
            blocked_by: Vec::new(),
            docs: Vec::new(),
            created: today.clone(),
            updated: today,
            comments: Vec::new(),
        },
        body,
    };

    let config = store.load_config()?;
    issue.validate(&config)?;
    store.save_issue(&issue)?;

    println!("{id}");
    Ok(())
}

fn list(status: Option<&str>, json: bool) -> anyhow::Result<()> {
    let store = open_store()?;
    let mut issues = store.list_issues()?;
    if let Some(status) = status {
        issues.retain(|issue| issue.meta.status == status);
    }

    let mut stdout = io::stdout();
    if json {
        render::json(&mut stdout, &issues)
    } else {
        render::issue_table(&mut stdout, &issues).context("writing issue table")
    }
}

fn show(id: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store()?;
    let issue = store.load_issue(id)?;

    let mut stdout = io::stdout();
    if json {
        render::json(&mut stdout, &issue)
    } else {
        render::issue_detail(&mut stdout, &issue).context("writing issue detail")
    }
}

fn context(id: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store()?;
    let data = build_context(&store, id)?;

    let mut stdout = io::stdout();
    if json {
        render::json(&mut stdout, &data)
    } else {
        render::context_markdown(&mut stdout, &data).context("writing issue context")
    }
}

/// Gathers everything related to an issue: config, the issue, its blockers
/// and parent, and linked documents. References to missing issues or files
/// are skipped rather than failing the whole command.
fn build_context(store: &FileStore, id: &str) -> anyhow::Result<render::ContextData> {
    let project = store.load_config()?;
    let issue = store.load_issue(id)?;

    let blocking_issues = issue
        .meta
        .blocked_by
        .iter()
        .filter_map(|blocker| store.load_issue(blocker).ok())
        .collect();
    let parent_issue = issue
        .meta
        .parent
        .as_deref()
        .and_then(|parent| store.load_issue(parent).ok());
    let documents = render::load_documents(&issue, store);

    Ok(render::ContextData {
        project,
        issue,
        blocking_issues,
        parent_issue,
        documents,
    })
}

#[allow(clippy::too_many_arguments)]
fn update(
    id: &str,
    status: Option<String>,
    priority: Option<String>,
    title: Option<String>,
    labels: Option<Vec<String>>,
    parent: Option<String>,
    blocked_by: Option<Vec<String>>,
) -> anyhow::Result<()> {
    let store = open_store()?;
    let mut issue = store.load_issue(id)?;

    let mut changed = false;
    if let Some(status) = status {
        issue.meta.status = status;
        changed = true;
    }
    if let Some(priority) = priority {
        issue.meta.priority = priority;
        changed = true;
    }
    if let Some(title) = title {
        issue.meta.title = title;
        changed = true;
    }
    if let Some(labels) = labels {
        issue.meta.labels = labels;
        changed = true;
    }
    if let Some(parent) = parent {
        issue.meta.parent = Some(parent);
        changed = true;
    }
    if let Some(blocked_by) = blocked_by {
        issue.meta.blocked_by = blocked_by;
        changed = true;
    }
    if !changed {
        bail!("no update flags provided");
    }

    let config = store.load_config()?;
    issue.validate(&config)?;
    issue.meta.updated = today()?;
    store.save_issue(&issue)?;

    println!("Updated {}", issue.meta.id);
    Ok(())
}

fn comment(
    id: &str,
    message: Option<String>,
    author: Option<String>,
    file: Option<&str>,
) -> anyhow::Result<()> {
    let store = open_store()?;
    let mut issue = store.load_issue(id)?;

    let body = match (file, message) {
        (Some("-"), _) => read_stdin()?,
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("reading comment file {path}"))?,
        (None, Some(message)) => message,
        (None, None) => bail!("comment message required (as argument or via --file)"),
    };

    let today = today()?;
    issue.meta.comments.push(Comment {
        author: resolve_author(author),
        date: today.clone(),
        body,
    });
    issue.meta.updated = today;
    store.save_issue(&issue)?;

    println!("Added comment to {}", issue.meta.id);
    Ok(())
}

/// Author precedence: flag, `LODESTAR_AUTHOR`, git identity, `anonymous`.
fn resolve_author(flag: Option<String>) -> String {
    if let Some(author) = flag.filter(|author| !author.is_empty()) {
        return author;
    }
    if let Ok(author) = std::env::var("LODESTAR_AUTHOR") {
        if !author.is_empty() {
            return author;
        }
    }
    if let Ok(output) = ProcessCommand::new("git")
        .args(["config", "user.name"])
        .output()
    {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }
    "anonymous".to_string()
}

const EDIT_HINT: &str = "# Values with special characters (: ! { } [ ]) must be quoted\n";

fn edit(id: &str) -> anyhow::Result<()> {
    let editor = std::env::var("EDITOR").ok().filter(|value| !value.is_empty());
    let Some(editor) = editor else {
        bail!("$EDITOR is not set");
    };

    let store = open_store()?;
    let issue = store.load_issue(id)?;

    if !io::stdin().is_terminal() {
        bail!("stdin is not a terminal");
    }

    let data = serialize_issue(&issue)?;
    let mut tmp = tempfile::Builder::new()
        .prefix("lodestar-edit-")
        .suffix(".md")
        .tempfile()
        .context("creating temp file")?;
    tmp.write_all(insert_edit_hint(&data).as_bytes())
        .context("writing temp file")?;
    tmp.flush().context("flushing temp file")?;

    run_editor(&editor, tmp.path())?;

    let edited = std::fs::read_to_string(tmp.path()).context("reading edited file")?;
    let mut new_issue = parse_issue(&edited).context("parsing edited issue")?;

    let config = store.load_config()?;
    // The id is not editable; whatever the user typed, the file keeps its
    // original identity.
    new_issue.meta.id = issue.meta.id.clone();
    new_issue.validate(&config)?;
    store.save_issue(&new_issue)?;

    println!("Updated {}", issue.meta.id);
    Ok(())
}

fn run_editor(editor: &str, path: &Path) -> anyhow::Result<()> {
    let status = ProcessCommand::new(editor)
        .arg(path)
        .status()
        .with_context(|| format!("launching editor {editor}"))?;
    if !status.success() {
        bail!("editor exited with {status}");
    }
    Ok(())
}

/// Inserts a YAML editing hint right after the opening frontmatter delimiter.
fn insert_edit_hint(data: &str) -> String {
    match data.strip_prefix("---\n") {
        Some(rest) => format!("---\n{EDIT_HINT}{rest}"),
        None => data.to_string(),
    }
}

fn read_stdin() -> anyhow::Result<String> {
    let mut body = String::new();
    io::stdin()
        .read_to_string(&mut body)
        .context("reading stdin")?;
    Ok(body)
}

fn default_session_prompt() -> String {
    "You are working inside a lodestar project. Use the `lodestar` CLI to inspect \
     and update issues as you work."
        .to_string()
}

#[cfg(test)]
mod tests {
    use issue_store::{FileStore, Issue, IssueMeta};
    use pretty_assertions::assert_eq;

    use super::{build_context, insert_edit_hint};

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store.init_project("demo").expect("init project");
        (dir, store)
    }

    fn issue(id: &str, title: &str) -> Issue {
        Issue {
            meta: IssueMeta {
                format_version: 1,
                id: id.to_string(),
                title: title.to_string(),
                status: "todo".to_string(),
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

    #[test]
    fn context_gathers_blockers_parent_and_linked_docs() {
        let (dir, store) = store();
        store.save_issue(&issue("LDS-1", "Provision CI")).expect("save blocker");
        store.save_issue(&issue("LDS-2", "Release epic")).expect("save parent");

        std::fs::create_dir_all(dir.path().join(".lodestar/docs")).expect("docs dir");
        std::fs::write(dir.path().join(".lodestar/docs/plan.md"), "steps").expect("write doc");

        let mut subject = issue("LDS-3", "Ship it");
        subject.meta.blocked_by = vec!["LDS-1".to_string()];
        subject.meta.parent = Some("LDS-2".to_string());
        subject.meta.docs = vec!["docs/plan.md".to_string()];
        store.save_issue(&subject).expect("save subject");

        let data = build_context(&store, "LDS-3").expect("build context");
        assert_eq!(data.project.project, "demo");
        assert_eq!(data.issue.meta.id, "LDS-3");
        assert_eq!(data.blocking_issues.len(), 1);
        assert_eq!(data.blocking_issues[0].meta.id, "LDS-1");
        assert_eq!(
            data.parent_issue.as_ref().map(|p| p.meta.id.as_str()),
            Some("LDS-2")
        );
        assert_eq!(data.documents.len(), 1);
        assert_eq!(data.documents[0].content, "steps");
    }

    #[test]
    fn context_skips_dangling_references_instead_of_failing() {
        let (_dir, store) = store();
        let mut subject = issue("LDS-1", "Ship it");
        subject.meta.blocked_by = vec!["LDS-9".to_string()];
        subject.meta.parent = Some("LDS-8".to_string());
        subject.meta.docs = vec!["docs/missing.md".to_string()];
        store.save_issue(&subject).expect("save subject");

        let data = build_context(&store, "LDS-1").expect("build context");
        assert!(data.blocking_issues.is_empty());
        assert!(data.parent_issue.is_none());
        assert!(data.documents.is_empty());
    }

    #[test]
    fn context_for_an_unknown_issue_is_an_error() {
        let (_dir, store) = store();
        assert!(build_context(&store, "LDS-404").is_err());
    }

    #[test]
    fn edit_hint_lands_after_the_opening_delimiter() {
        let hinted = insert_edit_hint("---\nid: LDS-1\n---\nbody\n");
        assert!(hinted.starts_with("---\n# Values"));
        assert!(hinted.contains("id: LDS-1"));
    }

    #[test]
    fn content_without_frontmatter_is_untouched() {
        assert_eq!(insert_edit_hint("plain"), "plain");
    }
}
