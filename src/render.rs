//! Static text and JSON renderers for the scripted command surface.

use std::io::{self, Write};

use issue_store::{Config, FileStore, Issue, META_DIR_NAME};
use serde::Serialize;

/// Writes an aligned table of issues: id, status, priority, title, labels.
pub fn issue_table(w: &mut impl Write, issues: &[Issue]) -> io::Result<()> {
    if issues.is_empty() {
        return writeln!(w, "No issues found.");
    }

    let mut rows: Vec<[String; 5]> = vec![[
        "ID".to_string(),
        "STATUS".to_string(),
        "PRIORITY".to_string(),
        "TITLE".to_string(),
        "LABELS".to_string(),
    ]];
    for issue in issues {
        rows.push([
            issue.meta.id.clone(),
            issue.meta.status.clone(),
            issue.meta.priority.clone(),
            issue.meta.title.clone(),
            issue.meta.labels.join(", "),
        ]);
    }

    let mut widths = [0usize; 5];
    for row in &rows {
        for (column, cell) in row.iter().enumerate() {
            widths[column] = widths[column].max(cell.chars().count());
        }
    }

    for row in &rows {
        let mut line = String::new();
        for (column, cell) in row.iter().enumerate() {
            line.push_str(cell);
            // Last column carries no trailing padding.
            if column < row.len() - 1 {
                let pad = widths[column] - cell.chars().count() + 2;
                line.push_str(&" ".repeat(pad));
            }
        }
        writeln!(w, "{}", line.trim_end())?;
    }
    Ok(())
}

/// Writes the full text form of one issue: metadata, body, comments.
pub fn issue_detail(w: &mut impl Write, issue: &Issue) -> io::Result<()> {
    let meta = &issue.meta;
    writeln!(w, "ID:       {}", meta.id)?;
    writeln!(w, "Title:    {}", meta.title)?;
    writeln!(w, "Status:   {}", meta.status)?;
    writeln!(w, "Priority: {}", meta.priority)?;
    if !meta.labels.is_empty() {
        writeln!(w, "Labels:   {}", meta.labels.join(", "))?;
    }
    if let Some(parent) = &meta.parent {
        writeln!(w, "Parent:   {parent}")?;
    }
    if !meta.blocked_by.is_empty() {
        writeln!(w, "Blocked:  {}", meta.blocked_by.join(", "))?;
    }
    writeln!(w, "Created:  {}", meta.created)?;
    writeln!(w, "Updated:  {}", meta.updated)?;

    if !issue.body.is_empty() {
        writeln!(w)?;
        write!(w, "{}", issue.body)?;
    }

    if !meta.comments.is_empty() {
        writeln!(w, "\nComments ({}):", meta.comments.len())?;
        for comment in &meta.comments {
            writeln!(w, "[{} {}] {}", comment.date, comment.author, comment.body.trim())?;
        }
    }
    Ok(())
}

/// Everything an agent needs to work on one issue: the project config, the
/// issue itself, and whatever related records exist.
#[derive(Debug, Serialize)]
pub struct ContextData {
    pub project: Config,
    pub issue: Issue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocking_issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_issue: Option<Issue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<DocContent>,
}

/// A linked document with its content inlined.
#[derive(Debug, Serialize)]
pub struct DocContent {
    pub path: String,
    pub content: String,
}

/// Writes issue context as markdown sections: project, issue with body and
/// comments, blockers, parent, linked documents.
pub fn context_markdown(w: &mut impl Write, data: &ContextData) -> io::Result<()> {
    writeln!(w, "# Project: {}", data.project.project)?;
    writeln!(w)?;

    let meta = &data.issue.meta;
    writeln!(w, "# Issue: {} — {}", meta.id, meta.title)?;
    write!(w, "Status: {} | Priority: {}", meta.status, meta.priority)?;
    if !meta.labels.is_empty() {
        write!(w, " | Labels: {}", meta.labels.join(", "))?;
    }
    writeln!(w)?;

    if !data.issue.body.is_empty() {
        write!(w, "{}", data.issue.body)?;
    }

    if !meta.comments.is_empty() {
        writeln!(w, "\n## Comments ({})", meta.comments.len())?;
        for comment in &meta.comments {
            writeln!(w, "[{} {}] {}", comment.date, comment.author, comment.body.trim())?;
        }
    }

    if !data.blocking_issues.is_empty() {
        writeln!(w, "\n# Blocking Issues")?;
        for blocker in &data.blocking_issues {
            writeln!(w, "## {} — {}", blocker.meta.id, blocker.meta.title)?;
            writeln!(
                w,
                "Status: {} | Priority: {}",
                blocker.meta.status, blocker.meta.priority
            )?;
        }
    }

    if let Some(parent) = &data.parent_issue {
        writeln!(w, "\n# Related Issues (parent)")?;
        writeln!(w, "## {} — {}", parent.meta.id, parent.meta.title)?;
        writeln!(
            w,
            "Status: {} | Priority: {}",
            parent.meta.status, parent.meta.priority
        )?;
    }

    if !data.documents.is_empty() {
        writeln!(w, "\n# Documents")?;
        for doc in &data.documents {
            writeln!(w, "## {}", doc.path)?;
            writeln!(w, "{}", doc.content)?;
        }
    }
    Ok(())
}

/// Reads the documents an issue links to, relative to the project's meta
/// directory. Missing files are skipped.
pub fn load_documents(issue: &Issue, store: &FileStore) -> Vec<DocContent> {
    let base = store.project_root().join(META_DIR_NAME);
    issue
        .meta
        .docs
        .iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(base.join(path)).ok()?;
            Some(DocContent {
                path: path.clone(),
                content,
            })
        })
        .collect()
}

/// Writes `value` as indented JSON with a trailing newline.
pub fn json<T: Serialize>(w: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

/// Writes a structured error object for `--json` consumers.
pub fn json_error(w: &mut impl Write, message: &str, code: i32) {
    let payload = serde_json::json!({ "error": message, "code": code });
    let rendered = serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|_| format!("{{\"error\": \"{message}\"}}"));
    let _ = writeln!(w, "{rendered}");
}

/// Writes a plain-text error line.
pub fn text_error(w: &mut impl Write, message: &str) {
    let _ = writeln!(w, "Error: {message}");
}
