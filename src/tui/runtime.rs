use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use agent_stream::{Agent, AgentConfig};
use anyhow::Context;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use issue_store::FileStore;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::{debug, warn};

use crate::tui::messages::{Cmd, Msg};
use crate::tui::theme::Theme;
use crate::tui::watcher::{watch_once, WatchConfig, WatchOutcome};

/// A scheduler-driven model: `update` handles one message at a time and never
/// blocks; anything slow is returned as a command and executed off-thread.
pub trait Model {
    fn init(&mut self) -> Vec<Cmd>;
    fn update(&mut self, msg: Msg) -> Vec<Cmd>;
    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme);
}

/// Shared handles the command executors need.
#[derive(Clone)]
pub struct RuntimeContext {
    pub store: FileStore,
    pub watch_config: WatchConfig,
    pub agent_config: AgentConfig,
}

impl RuntimeContext {
    #[must_use]
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            watch_config: WatchConfig::default(),
            agent_config: AgentConfig::default(),
        }
    }
}

/// Runs the message loop until the model emits `Cmd::Quit`.
///
/// Exactly one message is processed at a time; every command runs on its own
/// named thread and posts exactly one message back into the inbox.
pub fn run(model: &mut dyn Model, ctx: &RuntimeContext) -> anyhow::Result<()> {
    let mut terminal = TerminalGuard::enter()?;
    let theme = Theme::default();

    let (tx, rx): (Sender<Msg>, Receiver<Msg>) = mpsc::channel();
    spawn_input_thread(tx.clone());

    let size = terminal.inner.size().context("querying terminal size")?;
    let init_cmds = model.init();
    dispatch(model.update(Msg::Resize(size.width, size.height)), &tx, ctx);
    dispatch(init_cmds, &tx, ctx);

    loop {
        terminal
            .inner
            .draw(|frame| {
                let area = frame.area();
                model.render(area, frame.buffer_mut(), &theme);
            })
            .context("drawing frame")?;

        let Ok(msg) = rx.recv() else {
            // Every sender is gone; nothing can ever wake us again.
            break;
        };
        let cmds = model.update(msg);
        if cmds.iter().any(|cmd| matches!(cmd, Cmd::Quit)) {
            break;
        }
        dispatch(cmds, &tx, ctx);
    }

    Ok(())
}

fn dispatch(cmds: Vec<Cmd>, tx: &Sender<Msg>, ctx: &RuntimeContext) {
    for cmd in cmds {
        spawn_cmd(cmd, tx.clone(), ctx.clone());
    }
}

/// Executes one command on a background thread. Each thread posts exactly one
/// message and terminates; one-shot listeners are re-armed by the model.
fn spawn_cmd(cmd: Cmd, tx: Sender<Msg>, ctx: RuntimeContext) {
    let (name, task): (&str, Box<dyn FnOnce() -> Msg + Send>) = match cmd {
        Cmd::LoadConfig => (
            "load-config",
            Box::new(move || Msg::ConfigLoaded(ctx.store.load_config())),
        ),
        Cmd::LoadIssues => (
            "load-issues",
            Box::new(move || Msg::IssuesLoaded(ctx.store.list_issues())),
        ),
        Cmd::Watch => (
            "issue-watch",
            Box::new(move || {
                match watch_once(&ctx.store.issues_dir(), ctx.watch_config) {
                    WatchOutcome::Changed => Msg::FilesChanged,
                    WatchOutcome::Error(error) => Msg::WatchFailed(error),
                }
            }),
        ),
        Cmd::StartAgent { prompt } => (
            "agent-start",
            Box::new(move || match Agent::start(&ctx.agent_config, &prompt) {
                Ok(agent) => Msg::AgentStarted(agent),
                Err(error) => Msg::AgentFailed(error.to_string()),
            }),
        ),
        Cmd::ListenAgent(agent) => (
            "agent-listen",
            Box::new(move || match agent.next_event() {
                Some(event) => Msg::AgentEvent(event),
                None => Msg::AgentClosed,
            }),
        ),
        Cmd::Quit => return,
    };

    let spawned = thread::Builder::new()
        .name(format!("cmd-{name}"))
        .spawn(move || {
            let msg = task();
            if tx.send(msg).is_err() {
                debug!(name, "scheduler inbox closed before command completion");
            }
        });
    if let Err(error) = spawned {
        warn!(%error, name, "command thread spawn failed");
    }
}

/// Reads terminal events and forwards them as messages until the inbox
/// closes. Repeat (held-key) events are filtered out.
fn spawn_input_thread(tx: Sender<Msg>) {
    let spawned = thread::Builder::new()
        .name("terminal-input".to_string())
        .spawn(move || loop {
            let msg = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Msg::Key(key),
                Ok(Event::Resize(width, height)) => Msg::Resize(width, height),
                Ok(_) => continue,
                Err(error) => {
                    warn!(%error, "terminal input read failed");
                    return;
                }
            };
            if tx.send(msg).is_err() {
                return;
            }
        });
    if let Err(error) = spawned {
        warn!(%error, "input thread spawn failed");
    }
}

/// Raw-mode + alternate-screen terminal whose `Drop` restores the user's
/// shell even on panic or early return.
struct TerminalGuard {
    inner: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = io::stdout();
        if let Err(error) = crossterm::execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(error).context("entering alternate screen");
        }
        let inner = Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")?;
        Ok(Self { inner })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
        let _ = self.inner.show_cursor();
    }
}
