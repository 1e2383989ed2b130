//! Filesystem-backed issue tracking with a kanban TUI and agent sessions.
//!
//! Issues live as frontmatter-markdown files managed by [`issue_store`]; the
//! agent subprocess and its streaming protocol live in [`agent_stream`]. This
//! crate adds the scripted command surface and the interactive terminal
//! views on top.

pub mod cli;
pub mod commands;
pub mod render;
pub mod tui;
