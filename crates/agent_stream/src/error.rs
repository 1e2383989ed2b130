use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to spawn agent program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("agent child process is missing its {pipe} pipe")]
    MissingPipe { pipe: &'static str },

    #[error("agent input pipe is closed")]
    InputClosed,

    #[error("failed to write to agent input pipe: {0}")]
    Write(#[source] std::io::Error),
}
