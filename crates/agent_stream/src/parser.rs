use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use serde::Deserialize;
use serde_json::Value;

use crate::events::{AgentEvent, ContentBlock, Envelope, RunResult};

/// Default bound of the parsed-event queue. Large enough that the reader does
/// not stall under normal streaming rates while the UI drains one event per
/// scheduler turn.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
struct WireBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}

impl From<WireBlock> for ContentBlock {
    fn from(block: WireBlock) -> Self {
        match block.kind.as_str() {
            "text" => ContentBlock::Text {
                text: block.text.unwrap_or_default(),
            },
            "tool_use" => ContentBlock::ToolUse {
                name: block.name.unwrap_or_default(),
                input: block.input.unwrap_or(Value::Null),
            },
            _ => ContentBlock::Other { kind: block.kind },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireAssistant {
    message: WireAssistantMessage,
}

#[derive(Debug, Deserialize)]
struct WireAssistantMessage {
    #[serde(default)]
    content: Vec<WireBlock>,
}

#[derive(Debug, Deserialize)]
struct WireBlockStart {
    #[serde(default)]
    index: u64,
    content_block: WireBlock,
}

#[derive(Debug, Deserialize)]
struct WireBlockDelta {
    #[serde(default)]
    index: u64,
    delta: WireDelta,
}

#[derive(Debug, Deserialize)]
struct WireDelta {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct WireBlockStop {
    #[serde(default)]
    index: u64,
}

#[derive(Debug, Deserialize)]
struct WireSystem {
    #[serde(default)]
    message: String,
}

/// Decodes a single stream line into an event.
///
/// Returns `None` for empty lines, malformed JSON, and lines whose recognized
/// discriminator fails the richer decode. Protocol errors are never fatal; the
/// caller simply moves to the next line.
#[must_use]
pub fn parse_line(line: &str) -> Option<AgentEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let envelope: Envelope = serde_json::from_str(line).ok()?;
    match envelope.kind.as_str() {
        "assistant" => serde_json::from_str::<WireAssistant>(line)
            .ok()
            .map(|wire| AgentEvent::Assistant {
                content: wire.message.content.into_iter().map(Into::into).collect(),
            }),
        "content_block_start" => {
            serde_json::from_str::<WireBlockStart>(line)
                .ok()
                .map(|wire| AgentEvent::BlockStart {
                    index: wire.index,
                    block: wire.content_block.into(),
                })
        }
        "content_block_delta" => {
            serde_json::from_str::<WireBlockDelta>(line)
                .ok()
                .map(|wire| AgentEvent::BlockDelta {
                    index: wire.index,
                    text: wire.delta.text,
                })
        }
        "content_block_stop" => serde_json::from_str::<WireBlockStop>(line)
            .ok()
            .map(|wire| AgentEvent::BlockStop { index: wire.index }),
        "result" => serde_json::from_str::<RunResult>(line)
            .ok()
            .map(AgentEvent::Result),
        "system" => serde_json::from_str::<WireSystem>(line)
            .ok()
            .map(|wire| AgentEvent::System {
                message: wire.message,
            }),
        _ => Some(AgentEvent::Other(envelope)),
    }
}

/// Spawns a background reader that decodes newline-delimited JSON from
/// `reader` and delivers events on a bounded channel in input order.
///
/// The channel closes when the reader is exhausted or fails mid-stream; stream
/// closure means "agent finished", not success or failure.
pub fn parse_events<R>(reader: R, capacity: usize) -> Receiver<AgentEvent>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));

    let spawned = thread::Builder::new()
        .name("agent-stream-reader".to_string())
        .spawn(move || {
            let reader = BufReader::new(reader);
            for line in reader.lines() {
                let Ok(line) = line else {
                    break;
                };
                let Some(event) = parse_line(&line) else {
                    continue;
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

    // A failed spawn drops the sender, which the caller observes as an
    // immediately-closed stream.
    drop(spawned);
    rx
}
