use clap::{Parser, Subcommand};

/// Filesystem-based issue tracking for developers and AI agents.
#[derive(Debug, Parser)]
#[command(name = "lodestar", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize a project in the current directory
    Init,

    /// Create a new issue
    Create {
        /// Issue title
        title: String,
        /// Issue priority
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Label, repeatable
        #[arg(long = "label")]
        labels: Vec<String>,
        /// Parent issue id
        #[arg(long)]
        parent: Option<String>,
        /// Read the body from a file, `-` for stdin
        #[arg(long)]
        body_file: Option<String>,
    },

    /// List issues
    List {
        /// Only issues with this status
        #[arg(long)]
        status: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one issue in full
    Show {
        /// Issue id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assemble full context for an issue (issue + parent + blockers + docs)
    Context {
        /// Issue id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update issue metadata
    Update {
        /// Issue id
        id: String,
        /// Set the status
        #[arg(long)]
        status: Option<String>,
        /// Set the priority
        #[arg(long)]
        priority: Option<String>,
        /// Set the title
        #[arg(long)]
        title: Option<String>,
        /// Replace the label set, repeatable
        #[arg(long = "label")]
        labels: Option<Vec<String>>,
        /// Set the parent issue id
        #[arg(long)]
        parent: Option<String>,
        /// Replace the blocked-by set, repeatable
        #[arg(long = "blocked-by")]
        blocked_by: Option<Vec<String>>,
    },

    /// Add a comment to an issue
    Comment {
        /// Issue id
        id: String,
        /// Comment text; omit when using --file
        message: Option<String>,
        /// Comment author
        #[arg(long)]
        author: Option<String>,
        /// Read the comment from a file, `-` for stdin
        #[arg(long)]
        file: Option<String>,
    },

    /// Edit an issue in $EDITOR
    Edit {
        /// Issue id
        id: String,
    },

    /// Open the interactive kanban board
    Board,

    /// Open the agent chat + kanban session
    Session {
        /// Initial prompt for the agent
        prompt: Option<String>,
    },
}

impl Command {
    /// True when the subcommand was asked for JSON output, so error reporting
    /// can match.
    #[must_use]
    pub fn wants_json(&self) -> bool {
        matches!(
            self,
            Self::List { json: true, .. }
                | Self::Show { json: true, .. }
                | Self::Context { json: true, .. }
        )
    }
}
