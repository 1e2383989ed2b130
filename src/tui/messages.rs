use agent_stream::{Agent, AgentEvent};
use crossterm::event::KeyEvent;
use issue_store::{Config, Issue, StoreError};

/// One message in the scheduler's inbox. Exactly one message is processed at
/// a time; handlers never block.
pub enum Msg {
    Key(KeyEvent),
    Resize(u16, u16),
    ConfigLoaded(Result<Config, StoreError>),
    IssuesLoaded(Result<Vec<Issue>, StoreError>),
    FilesChanged,
    WatchFailed(String),
    AgentStarted(Agent),
    AgentFailed(String),
    AgentEvent(AgentEvent),
    AgentClosed,
}

/// One unit of background work. Each command runs on its own thread, posts
/// exactly one `Msg`, and terminates; one-shot listeners (watcher, agent
/// events) must be explicitly reissued by the model that consumed them.
pub enum Cmd {
    LoadConfig,
    LoadIssues,
    Watch,
    StartAgent { prompt: String },
    ListenAgent(Agent),
    Quit,
}
