use issue_store::Issue;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use crate::tui::text::word_wrap;
use crate::tui::theme::Theme;

/// Scrollable single-issue viewer: a fixed metadata header above a wrapped
/// body and comment list.
pub struct DetailModel {
    issue: Option<Issue>,
    scroll: usize,
    width: u16,
    height: u16,
}

impl DetailModel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            issue: None,
            scroll: 0,
            width: 0,
            height: 0,
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp_scroll();
    }

    pub fn set_issue(&mut self, issue: Issue) {
        self.issue = Some(issue);
        self.scroll = 0;
    }

    #[must_use]
    pub fn issue_id(&self) -> Option<&str> {
        self.issue.as_ref().map(|issue| issue.meta.id.as_str())
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll += 1;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    /// Highest valid line offset for the scrollable region at the current
    /// size.
    fn max_scroll(&self) -> usize {
        let Some(issue) = &self.issue else { return 0 };
        let wrap_width = self.inner_width();
        let viewport = self.body_viewport_height(issue);
        let content = body_lines(issue, wrap_width).len();
        content.saturating_sub(viewport)
    }

    fn inner_width(&self) -> usize {
        // Border plus one column of padding on each side.
        (self.width as usize).saturating_sub(4).max(1)
    }

    fn body_viewport_height(&self, issue: &Issue) -> usize {
        (self.height as usize)
            .saturating_sub(2) // border
            .saturating_sub(header_line_count(issue))
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme.border)
            .padding(Padding::horizontal(1));

        let Some(issue) = &self.issue else {
            Paragraph::new("No issue selected.")
                .style(theme.muted)
                .block(block)
                .render(area, buf);
            return;
        };

        let inner = block.inner(area);
        block.render(area, buf);

        let header = header_lines(issue, theme);
        let header_height = (header.len() as u16).min(inner.height);
        let header_area = Rect {
            height: header_height,
            ..inner
        };
        Paragraph::new(header).render(header_area, buf);

        let body_area = Rect {
            y: inner.y + header_height,
            height: inner.height.saturating_sub(header_height),
            ..inner
        };
        if body_area.height == 0 {
            return;
        }
        let wrap_width = (area.width as usize).saturating_sub(4).max(1);
        let body: Vec<Line<'_>> = body_lines(issue, wrap_width)
            .into_iter()
            .map(Line::raw)
            .collect();
        Paragraph::new(body)
            .scroll((self.scroll as u16, 0))
            .render(body_area, buf);
    }
}

impl Default for DetailModel {
    fn default() -> Self {
        Self::new()
    }
}

fn header_line_count(issue: &Issue) -> usize {
    let meta = &issue.meta;
    let optional = usize::from(!meta.labels.is_empty())
        + usize::from(meta.parent.is_some())
        + usize::from(!meta.blocked_by.is_empty());
    // id/title, status/priority, created/updated, trailing blank.
    4 + optional
}

fn header_lines<'a>(issue: &'a Issue, theme: &Theme) -> Vec<Line<'a>> {
    let meta = &issue.meta;
    let mut lines = vec![
        Line::from(vec![
            Span::styled(meta.id.clone(), theme.header),
            Span::raw(" "),
            Span::styled(meta.title.clone(), theme.column_title),
        ]),
        Line::from(vec![
            Span::styled("status: ", theme.label),
            Span::raw(meta.status.clone()),
            Span::styled("  priority: ", theme.label),
            Span::raw(meta.priority.clone()),
        ]),
    ];

    if !meta.labels.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("labels: ", theme.label),
            Span::raw(meta.labels.join(", ")),
        ]));
    }
    if let Some(parent) = &meta.parent {
        lines.push(Line::from(vec![
            Span::styled("parent: ", theme.label),
            Span::raw(parent.clone()),
        ]));
    }
    if !meta.blocked_by.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("blocked by: ", theme.label),
            Span::raw(meta.blocked_by.join(", ")),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("created: ", theme.label),
        Span::raw(meta.created.clone()),
        Span::styled("  updated: ", theme.label),
        Span::raw(meta.updated.clone()),
    ]));
    lines.push(Line::raw(""));
    lines
}

/// Wrapped body plus enumerated comments, as plain scrollable lines.
fn body_lines(issue: &Issue, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    let body = issue.body.trim();
    if !body.is_empty() {
        lines.extend(word_wrap(body, width).split('\n').map(str::to_string));
    }

    if !issue.meta.comments.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Comments:".to_string());
        for comment in &issue.meta.comments {
            let entry = format!(
                "[{} {}] {}",
                comment.date,
                comment.author,
                comment.body.trim()
            );
            lines.extend(word_wrap(&entry, width).split('\n').map(str::to_string));
        }
    }

    lines
}
