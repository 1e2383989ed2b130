use agent_stream::{AgentEvent, ContentBlock, RunResult};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use crate::tui::text::word_wrap;
use crate::tui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Tool,
    Result,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

/// Chat transcript plus the in-flight streaming buffer and the input line.
///
/// Streamed assistant text accumulates in `buffer` until a block boundary
/// commits it as a finished message; the buffer is rendered live in the
/// meantime.
pub struct ChatModel {
    messages: Vec<ChatMessage>,
    streaming: bool,
    buffer: String,
    input: String,
    focused: bool,
}

impl ChatModel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            streaming: false,
            buffer: String::new(),
            input: String::new(),
            focused: true,
        }
    }

    pub fn add_user_message(&mut self, text: &str) {
        self.messages.push(ChatMessage {
            role: Role::User,
            text: text.to_string(),
        });
    }

    #[must_use]
    pub fn input_value(&self) -> &str {
        &self.input
    }

    pub fn reset_input(&mut self) {
        self.input.clear();
    }

    pub fn push_input_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Commits the streaming buffer as a finished assistant message, if it
    /// holds anything.
    fn flush_buffer(&mut self) {
        if self.streaming && !self.buffer.is_empty() {
            let text = std::mem::take(&mut self.buffer);
            self.messages.push(ChatMessage {
                role: Role::Assistant,
                text,
            });
        }
        self.streaming = false;
        self.buffer.clear();
    }

    pub fn handle_event(&mut self, event: &AgentEvent) {
        match event {
            AgentEvent::BlockStart { block, .. } => match block {
                ContentBlock::ToolUse { name, .. } => {
                    self.flush_buffer();
                    self.messages.push(ChatMessage {
                        role: Role::Tool,
                        text: format!("⚡ {name}"),
                    });
                }
                ContentBlock::Text { .. } => {
                    self.streaming = true;
                    self.buffer.clear();
                }
                ContentBlock::Other { .. } => {}
            },
            AgentEvent::BlockDelta { text, .. } => {
                if self.streaming {
                    self.buffer.push_str(text);
                }
            }
            AgentEvent::BlockStop { .. } => self.flush_buffer(),
            AgentEvent::Assistant { content } => {
                for block in content {
                    match block {
                        ContentBlock::Text { text } => {
                            if !text.is_empty() {
                                self.messages.push(ChatMessage {
                                    role: Role::Assistant,
                                    text: text.clone(),
                                });
                            }
                        }
                        ContentBlock::ToolUse { name, input } => {
                            self.messages.push(ChatMessage {
                                role: Role::Tool,
                                text: format!("⚡ {name} {input}"),
                            });
                        }
                        ContentBlock::Other { .. } => {}
                    }
                }
            }
            AgentEvent::Result(result) => self.push_result(result),
            AgentEvent::System { message } => {
                if !message.is_empty() {
                    self.messages.push(ChatMessage {
                        role: Role::Assistant,
                        text: message.clone(),
                    });
                }
            }
            AgentEvent::Other(_) => {}
        }
    }

    fn push_result(&mut self, result: &RunResult) {
        self.flush_buffer();
        let seconds = result.duration_ms / 1000.0;
        let (role, text) = if result.is_error {
            (
                Role::Error,
                format!("✗ Error ({seconds:.1}s, ${:.2})", result.cost_usd),
            )
        } else {
            (
                Role::Result,
                format!("✓ Completed ({seconds:.1}s, ${:.2})", result.cost_usd),
            )
        };
        self.messages.push(ChatMessage { role, text });
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let border_style = if self.focused {
            theme.focus_border
        } else {
            theme.border
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 {
            return;
        }

        let wrap_width = (inner.width as usize).max(1);
        let mut lines: Vec<Line<'_>> = Vec::new();
        for message in &self.messages {
            lines.extend(message_lines(message, wrap_width, theme));
        }
        if self.streaming && !self.buffer.is_empty() {
            for wrapped in word_wrap(&self.buffer, wrap_width).split('\n') {
                lines.push(Line::raw(wrapped.to_string()));
            }
        }

        // Transcript pins to the bottom; the last row is the input line.
        let transcript_height = inner.height - 1;
        let offset = bottom_scroll_offset(lines.len(), transcript_height);
        let transcript_area = Rect {
            height: transcript_height,
            ..inner
        };
        Paragraph::new(lines)
            .scroll((offset, 0))
            .render(transcript_area, buf);

        let prompt = if self.focused { "> " } else { "  " };
        let input_area = Rect {
            y: inner.y + transcript_height,
            height: 1,
            ..inner
        };
        Paragraph::new(Line::from(vec![
            Span::styled(prompt, theme.header),
            Span::raw(self.input.clone()),
        ]))
        .render(input_area, buf);
    }
}

impl Default for ChatModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Scroll offset that keeps the newest line visible. Saturates at the widget
/// coordinate limit instead of wrapping when the transcript outgrows `u16`.
fn bottom_scroll_offset(total_lines: usize, viewport_height: u16) -> u16 {
    u16::try_from(total_lines)
        .unwrap_or(u16::MAX)
        .saturating_sub(viewport_height)
}

fn message_lines<'a>(message: &'a ChatMessage, width: usize, theme: &Theme) -> Vec<Line<'a>> {
    let (prefix, style) = match message.role {
        Role::User => ("you: ", theme.user),
        Role::Assistant => ("", ratatui::style::Style::default()),
        Role::Tool => ("", theme.tool),
        Role::Result => ("", theme.result),
        Role::Error => ("", theme.error),
    };
    let text = format!("{prefix}{}", message.text);
    word_wrap(&text, width)
        .split('\n')
        .map(|line| Line::styled(line.to_string(), style))
        .collect()
}
