use agent_stream::Agent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use issue_store::FileStore;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use tracing::warn;

use crate::tui::app::AppModel;
use crate::tui::chat::ChatModel;
use crate::tui::messages::{Cmd, Msg};
use crate::tui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Chat,
    Board,
}

/// Dual-pane session: chat transcript on the left, the board application on
/// the right, split at half width.
///
/// The composer owns the agent lifecycle; everything else is routed to
/// whichever child it concerns.
pub struct SessionModel {
    chat: ChatModel,
    app: AppModel,
    agent: Option<Agent>,
    focus: Pane,
    initial_prompt: String,
    agent_banner: Option<String>,
}

impl SessionModel {
    #[must_use]
    pub fn new(store: FileStore, initial_prompt: String) -> Self {
        Self {
            chat: ChatModel::new(),
            app: AppModel::new(store),
            agent: None,
            focus: Pane::Chat,
            initial_prompt,
            agent_banner: None,
        }
    }

    pub fn init(&mut self) -> Vec<Cmd> {
        let mut cmds = self.app.init();
        cmds.push(Cmd::StartAgent {
            prompt: self.initial_prompt.clone(),
        });
        cmds
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Cmd> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Resize(width, height) => {
                let board_width = width - width / 2;
                self.app
                    .update(Msg::Resize(board_width, height.saturating_sub(1)))
            }
            Msg::AgentStarted(agent) => {
                let listener = agent.clone();
                self.agent = Some(agent);
                vec![Cmd::ListenAgent(listener)]
            }
            Msg::AgentFailed(error) => {
                warn!(%error, "agent start failed");
                self.agent_banner = Some(format!("agent error: {error}"));
                Vec::new()
            }
            Msg::AgentEvent(event) => {
                self.chat.handle_event(&event);
                // Each delivered event re-arms the one-shot listener.
                match &self.agent {
                    Some(agent) => vec![Cmd::ListenAgent(agent.clone())],
                    None => Vec::new(),
                }
            }
            Msg::AgentClosed => {
                self.agent = None;
                Vec::new()
            }
            other => self.app.update(other),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Cmd> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if let Some(agent) = self.agent.take() {
                agent.stop();
            }
            return vec![Cmd::Quit];
        }
        if key.code == KeyCode::Tab {
            self.toggle_focus();
            return Vec::new();
        }

        match self.focus {
            Pane::Chat => self.handle_chat_key(key),
            Pane::Board => self.app.handle_key(key),
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Chat => {
                self.chat.blur();
                Pane::Board
            }
            Pane::Board => {
                self.chat.focus();
                Pane::Chat
            }
        };
    }

    fn handle_chat_key(&mut self, key: KeyEvent) -> Vec<Cmd> {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => self.chat.pop_input_char(),
            KeyCode::Char(ch) => self.chat.push_input_char(ch),
            _ => {}
        }
        Vec::new()
    }

    fn submit_input(&mut self) {
        let text = self.chat.input_value().trim().to_string();
        if text.is_empty() {
            return;
        }
        self.chat.add_user_message(&text);
        self.chat.reset_input();

        if let Some(agent) = &self.agent {
            if let Err(error) = agent.send(&text) {
                warn!(%error, "agent send failed");
                self.agent_banner = Some(format!("agent error: {error}"));
            }
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.height < 2 {
            return;
        }
        let main = Rect {
            height: area.height - 1,
            ..area
        };
        let chat_width = main.width / 2;
        let chat_area = Rect {
            width: chat_width,
            ..main
        };
        let board_area = Rect {
            x: main.x + chat_width,
            width: main.width - chat_width,
            ..main
        };

        self.chat.render(chat_area, buf, theme);
        self.app.render(board_area, buf, theme);

        let bar = Rect {
            y: main.bottom(),
            height: 1,
            ..area
        };
        let bar_text = match &self.agent_banner {
            Some(banner) => Line::styled(banner.clone(), theme.error),
            None => Line::styled("tab switch pane  ? help  ctrl+c quit", theme.help),
        };
        Paragraph::new(bar_text).render(bar, buf);
    }
}

impl crate::tui::runtime::Model for SessionModel {
    fn init(&mut self) -> Vec<Cmd> {
        SessionModel::init(self)
    }

    fn update(&mut self, msg: Msg) -> Vec<Cmd> {
        SessionModel::update(self, msg)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        SessionModel::render(self, area, buf, theme);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use issue_store::FileStore;
    use pretty_assertions::assert_eq;

    use super::{Pane, SessionModel};
    use crate::tui::chat::Role;
    use crate::tui::messages::{Cmd, Msg};

    fn session() -> (tempfile::TempDir, SessionModel) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store.init_project("demo").expect("init project");
        (dir, SessionModel::new(store, "triage the board".to_string()))
    }

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn init_starts_the_agent_alongside_the_board_commands() {
        let (_dir, mut session) = session();
        let cmds = session.init();
        assert!(matches!(cmds[0], Cmd::LoadConfig));
        assert!(matches!(cmds[1], Cmd::LoadIssues));
        assert!(matches!(cmds[2], Cmd::Watch));
        assert!(
            matches!(&cmds[3], Cmd::StartAgent { prompt } if prompt == "triage the board")
        );
        assert_eq!(cmds.len(), 4);
    }

    #[test]
    fn tab_toggles_pane_focus_and_chat_input_focus() {
        let (_dir, mut session) = session();
        assert_eq!(session.focus, Pane::Chat);
        assert!(session.chat.is_focused());

        session.update(key(KeyCode::Tab));
        assert_eq!(session.focus, Pane::Board);
        assert!(!session.chat.is_focused());

        session.update(key(KeyCode::Tab));
        assert_eq!(session.focus, Pane::Chat);
        assert!(session.chat.is_focused());
    }

    #[test]
    fn enter_submits_the_input_as_a_user_message() {
        let (_dir, mut session) = session();
        for ch in "hi".chars() {
            session.update(key(KeyCode::Char(ch)));
        }
        session.update(key(KeyCode::Enter));

        let messages = session.chat.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text, "hi");
        assert_eq!(session.chat.input_value(), "");
    }

    #[test]
    fn empty_input_submits_nothing() {
        let (_dir, mut session) = session();
        session.update(key(KeyCode::Enter));
        assert!(session.chat.messages().is_empty());
    }

    #[test]
    fn whitespace_only_input_submits_nothing() {
        let (_dir, mut session) = session();
        for ch in "   ".chars() {
            session.update(key(KeyCode::Char(ch)));
        }
        session.update(key(KeyCode::Enter));
        assert!(session.chat.messages().is_empty());
    }

    #[test]
    fn submitted_input_is_trimmed() {
        let (_dir, mut session) = session();
        for ch in "  hi  ".chars() {
            session.update(key(KeyCode::Char(ch)));
        }
        session.update(key(KeyCode::Enter));

        let messages = session.chat.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hi");
        assert_eq!(session.chat.input_value(), "");
    }

    #[test]
    fn agent_failure_banners_but_leaves_the_session_usable() {
        let (_dir, mut session) = session();
        let cmds = session.update(Msg::AgentFailed("no such program".to_string()));
        assert!(cmds.is_empty());
        assert!(session.agent_banner.as_deref().expect("banner").contains("no such program"));

        // Board keys still route.
        session.update(key(KeyCode::Tab));
        assert_eq!(session.focus, Pane::Board);
    }

    #[test]
    fn agent_events_without_a_handle_do_not_rearm() {
        let (_dir, mut session) = session();
        let cmds = session.update(Msg::AgentEvent(agent_stream::AgentEvent::System {
            message: "ready".to_string(),
        }));
        assert!(cmds.is_empty());
        assert_eq!(session.chat.messages().len(), 1);
    }

    #[test]
    fn stream_close_clears_the_agent_handle() {
        let (_dir, mut session) = session();
        let cmds = session.update(Msg::AgentClosed);
        assert!(cmds.is_empty());
        assert!(session.agent.is_none());
    }

    #[cfg(unix)]
    mod with_agent {
        use agent_stream::{Agent, AgentConfig};
        use pretty_assertions::assert_eq;

        use super::{key, session};
        use crate::tui::messages::{Cmd, Msg};
        use crossterm::event::KeyCode;

        fn cat_agent() -> Agent {
            let config = AgentConfig {
                program: "cat".to_string(),
                ..AgentConfig::default()
            };
            Agent::start(&config, "ignored").expect("spawn cat")
        }

        #[test]
        fn each_event_rearms_the_listener_while_the_handle_lives() {
            let (_dir, mut session) = session();
            session.update(Msg::AgentStarted(cat_agent()));

            let cmds = session.update(Msg::AgentEvent(agent_stream::AgentEvent::System {
                message: "ready".to_string(),
            }));
            assert_eq!(cmds.len(), 1);
            assert!(matches!(cmds[0], Cmd::ListenAgent(_)));

            session.update(Msg::AgentClosed);
            let cmds = session.update(Msg::AgentEvent(agent_stream::AgentEvent::System {
                message: "late".to_string(),
            }));
            assert!(cmds.is_empty());
        }

        #[test]
        fn ctrl_c_stops_the_agent_and_quits() {
            let (_dir, mut session) = session();
            session.update(Msg::AgentStarted(cat_agent()));

            let cmds = session.update(Msg::Key(crossterm::event::KeyEvent::new(
                KeyCode::Char('c'),
                crossterm::event::KeyModifiers::CONTROL,
            )));
            assert!(matches!(cmds[0], Cmd::Quit));
            assert!(session.agent.is_none());
        }

        #[test]
        fn submitted_messages_reach_the_agent_input() {
            let (_dir, mut session) = session();
            session.update(Msg::AgentStarted(cat_agent()));

            for ch in "hello".chars() {
                session.update(key(KeyCode::Char(ch)));
            }
            session.update(key(KeyCode::Enter));
            assert_eq!(session.chat.messages().len(), 1);
        }
    }
}
