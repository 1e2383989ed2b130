//! Interactive terminal surfaces: the standalone kanban board and the
//! chat + board session.
//!
//! Everything here follows one scheduling rule: a single thread owns the UI
//! state and processes one message at a time; blocking work (store reads,
//! the file watcher, agent pipes) runs on one-shot command threads that each
//! post a single message back.

pub mod app;
pub mod board;
pub mod chat;
pub mod detail;
pub mod messages;
pub mod runtime;
pub mod session;
pub mod text;
pub mod theme;
pub mod watcher;

use issue_store::FileStore;

use crate::tui::app::AppModel;
use crate::tui::runtime::{run, RuntimeContext};
use crate::tui::session::SessionModel;

/// Runs the standalone board until the user quits.
pub fn run_board(store: FileStore) -> anyhow::Result<()> {
    let ctx = RuntimeContext::new(store.clone());
    let mut model = AppModel::new(store);
    run(&mut model, &ctx)
}

/// Runs the chat + board session, launching the agent with `initial_prompt`.
pub fn run_session(store: FileStore, initial_prompt: String) -> anyhow::Result<()> {
    let ctx = RuntimeContext::new(store.clone());
    let mut model = SessionModel::new(store, initial_prompt);
    run(&mut model, &ctx)
}
