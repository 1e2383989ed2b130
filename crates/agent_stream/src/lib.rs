//! Streaming wire protocol and subprocess lifecycle for an external coding
//! agent.
//!
//! The agent is an opaque program that emits one JSON object per stdout line.
//! This crate decodes that stream into a closed set of event variants and owns
//! the child process: spawn with a filtered environment, line-oriented stdin
//! writes, a bounded event queue, and a dedicated exit waiter.

mod error;
mod events;
mod parser;
mod process;

pub use error::AgentError;
pub use events::{AgentEvent, ContentBlock, Envelope, RunResult};
pub use parser::{parse_events, parse_line, DEFAULT_QUEUE_CAPACITY};
pub use process::{filter_env, Agent, AgentConfig};
