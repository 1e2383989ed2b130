use serde::Deserialize;
use serde_json::Value;

/// Raw JSON envelope shared by every stream line before type dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// One unit of agent output inside a message: a text span or a tool
/// invocation. Unknown block kinds are preserved for forward compatibility.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text { text: String },
    ToolUse { name: String, input: Value },
    Other { kind: String },
}

/// Final accounting emitted when the agent completes a turn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunResult {
    #[serde(default)]
    pub duration_ms: f64,
    #[serde(default)]
    pub cost_usd: f64,
    #[serde(default)]
    pub is_error: bool,
    #[serde(rename = "result", default)]
    pub message: Option<String>,
}

/// Parsed stream event. `Other` carries the envelope of any line whose `type`
/// discriminator is not recognized.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Assistant { content: Vec<ContentBlock> },
    BlockStart { index: u64, block: ContentBlock },
    BlockDelta { index: u64, text: String },
    BlockStop { index: u64 },
    Result(RunResult),
    System { message: String },
    Other(Envelope),
}

impl AgentEvent {
    /// Returns the wire-level `type` string for this event.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Assistant { .. } => "assistant",
            Self::BlockStart { .. } => "content_block_start",
            Self::BlockDelta { .. } => "content_block_delta",
            Self::BlockStop { .. } => "content_block_stop",
            Self::Result(_) => "result",
            Self::System { .. } => "system",
            Self::Other(envelope) => &envelope.kind,
        }
    }
}
