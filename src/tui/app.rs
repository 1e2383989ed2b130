use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use issue_store::{FileStore, Issue};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use tracing::warn;

use crate::tui::board::BoardModel;
use crate::tui::detail::DetailModel;
use crate::tui::messages::{Cmd, Msg};
use crate::tui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Board,
    Detail,
}

/// Board + detail composition: owns the project snapshot and the perpetual
/// reload/watch cycle.
///
/// The board cannot exist before the config arrives (columns come from the
/// configured statuses), so issues that land first are cached and applied
/// once it does.
pub struct AppModel {
    store: FileStore,
    board: Option<BoardModel>,
    pending_issues: Option<Vec<Issue>>,
    detail: DetailModel,
    view: View,
    show_help: bool,
    banner: Option<String>,
}

impl AppModel {
    #[must_use]
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            board: None,
            pending_issues: None,
            detail: DetailModel::new(),
            view: View::Board,
            show_help: false,
            banner: None,
        }
    }

    /// Initial command fan-out: config, issues, and the watcher race freely.
    pub fn init(&mut self) -> Vec<Cmd> {
        vec![Cmd::LoadConfig, Cmd::LoadIssues, Cmd::Watch]
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.detail
            .set_size(width, height.saturating_sub(STATUS_BAR_HEIGHT));
    }

    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Cmd> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Resize(width, height) => {
                self.set_size(width, height);
                Vec::new()
            }
            Msg::ConfigLoaded(Ok(config)) => {
                let mut board = BoardModel::new(&config.statuses);
                if let Some(issues) = self.pending_issues.take() {
                    board.set_issues(issues);
                }
                self.board = Some(board);
                Vec::new()
            }
            Msg::ConfigLoaded(Err(error)) => {
                warn!(%error, "config load failed");
                self.banner = Some(format!("config error: {error}"));
                Vec::new()
            }
            Msg::IssuesLoaded(Ok(issues)) => {
                match &mut self.board {
                    Some(board) => board.set_issues(issues),
                    None => self.pending_issues = Some(issues),
                }
                Vec::new()
            }
            Msg::IssuesLoaded(Err(error)) => {
                warn!(%error, "issue reload failed");
                self.banner = Some(format!("load error: {error}"));
                Vec::new()
            }
            Msg::FilesChanged => {
                // Reload and immediately put the one-shot watch back up.
                vec![Cmd::LoadIssues, Cmd::Watch]
            }
            Msg::WatchFailed(error) => {
                warn!(%error, "file watch failed");
                self.banner = Some(format!("watch error: {error}"));
                Vec::new()
            }
            // Agent traffic belongs to the session composer.
            Msg::AgentStarted(_)
            | Msg::AgentFailed(_)
            | Msg::AgentEvent(_)
            | Msg::AgentClosed => Vec::new(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Cmd> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Cmd::Quit];
        }
        if key.code == KeyCode::Char('?') {
            self.show_help = !self.show_help;
            return Vec::new();
        }

        match self.view {
            View::Board => self.handle_board_key(key),
            View::Detail => self.handle_detail_key(key),
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Vec<Cmd> {
        let Some(board) = &mut self.board else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => board.move_up(),
            KeyCode::Down | KeyCode::Char('j') => board.move_down(),
            KeyCode::Left | KeyCode::Char('h') => board.move_left(),
            KeyCode::Right | KeyCode::Char('l') => board.move_right(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('q') => return vec![Cmd::Quit],
            _ => {}
        }
        Vec::new()
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Vec<Cmd> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.detail.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.detail.scroll_down(),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => {
                self.view = View::Board;
            }
            _ => {}
        }
        Vec::new()
    }

    /// Loads the selected issue's full content and switches to the detail
    /// view. The read is small and local, so it runs inline.
    fn open_selected(&mut self) {
        let Some(id) = self
            .board
            .as_ref()
            .and_then(BoardModel::selected_issue)
            .map(|issue| issue.meta.id.clone())
        else {
            return;
        };
        match self.store.load_issue(&id) {
            Ok(issue) => {
                self.detail.set_issue(issue);
                self.view = View::Detail;
            }
            Err(error) => {
                warn!(%error, %id, "issue open failed");
                self.banner = Some(format!("open error: {error}"));
            }
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.height <= STATUS_BAR_HEIGHT {
            return;
        }
        let main = Rect {
            height: area.height - STATUS_BAR_HEIGHT,
            ..area
        };
        let bar = Rect {
            y: main.bottom(),
            height: STATUS_BAR_HEIGHT,
            ..area
        };

        match (&self.board, self.view) {
            (None, _) => {
                Paragraph::new("Loading project...")
                    .style(theme.muted)
                    .render(main, buf);
            }
            (Some(board), View::Board) => board.render(main, buf, theme),
            (Some(_), View::Detail) => self.detail.render(main, buf, theme),
        }

        let bar_text = if let Some(banner) = &self.banner {
            Line::styled(banner.clone(), theme.error)
        } else if self.show_help {
            Line::styled(self.help_text(), theme.help)
        } else {
            Line::styled("? help", theme.help)
        };
        Paragraph::new(bar_text).render(bar, buf);
    }

    fn help_text(&self) -> &'static str {
        match self.view {
            View::Board => "↑↓←→/hjkl move  enter open  q quit  ? close help",
            View::Detail => "↑↓/jk scroll  esc/q/b back  ? close help",
        }
    }
}

const STATUS_BAR_HEIGHT: u16 = 1;

impl crate::tui::runtime::Model for AppModel {
    fn init(&mut self) -> Vec<Cmd> {
        AppModel::init(self)
    }

    fn update(&mut self, msg: Msg) -> Vec<Cmd> {
        AppModel::update(self, msg)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        AppModel::render(self, area, buf, theme);
    }
}
