use issue_store::Issue;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use crate::tui::text::truncate;
use crate::tui::theme::Theme;

/// Width of one column given the total width and column count: one-character
/// gaps between columns, integer division of the remainder.
#[must_use]
pub fn column_width(total_width: usize, num_columns: usize) -> usize {
    if num_columns == 0 {
        return 0;
    }
    let gaps = num_columns - 1;
    let Some(available) = total_width.checked_sub(gaps) else {
        return 1;
    };
    if available < num_columns {
        return 1;
    }
    available / num_columns
}

struct Column {
    status: String,
    issues: Vec<Issue>,
}

/// Kanban board state machine over an in-memory issue snapshot.
///
/// Columns are fixed to the configured status list for the process lifetime;
/// their contents are rebuilt wholesale on every reload.
pub struct BoardModel {
    columns: Vec<Column>,
    focused: usize,
    cursors: Vec<usize>,
}

impl BoardModel {
    #[must_use]
    pub fn new(statuses: &[String]) -> Self {
        Self {
            columns: statuses
                .iter()
                .map(|status| Column {
                    status: status.clone(),
                    issues: Vec::new(),
                })
                .collect(),
            focused: 0,
            cursors: vec![0; statuses.len()],
        }
    }

    /// Rebuilds every column from the full snapshot. Issues with an
    /// unconfigured status are dropped. The cursor follows the previously
    /// selected issue id where possible, otherwise it clamps.
    pub fn set_issues(&mut self, issues: Vec<Issue>) {
        let selected_ids: Vec<Option<String>> = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                column
                    .issues
                    .get(self.cursors[index])
                    .map(|issue| issue.meta.id.clone())
            })
            .collect();

        for column in &mut self.columns {
            column.issues.clear();
        }
        for issue in issues {
            if let Some(column) = self
                .columns
                .iter_mut()
                .find(|column| column.status == issue.meta.status)
            {
                column.issues.push(issue);
            }
        }

        for (index, column) in self.columns.iter().enumerate() {
            let restored = selected_ids[index].as_ref().and_then(|id| {
                column
                    .issues
                    .iter()
                    .position(|issue| &issue.meta.id == id)
            });
            self.cursors[index] = match restored {
                Some(position) => position,
                None => self.cursors[index].min(column.issues.len().saturating_sub(1)),
            };
        }
    }

    /// Returns the highlighted issue in the focused column, if any.
    #[must_use]
    pub fn selected_issue(&self) -> Option<&Issue> {
        let column = self.columns.get(self.focused)?;
        column.issues.get(self.cursors[self.focused])
    }

    pub fn move_up(&mut self) {
        if self.column_is_empty(self.focused) {
            return;
        }
        self.cursors[self.focused] = self.cursors[self.focused].saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let len = match self.columns.get(self.focused) {
            Some(column) if !column.issues.is_empty() => column.issues.len(),
            _ => return,
        };
        self.cursors[self.focused] = (self.cursors[self.focused] + 1).min(len - 1);
    }

    pub fn move_left(&mut self) {
        self.focused = self.focused.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.focused + 1 < self.columns.len() {
            self.focused += 1;
        }
    }

    fn column_is_empty(&self, index: usize) -> bool {
        self.columns
            .get(index)
            .map_or(true, |column| column.issues.is_empty())
    }

    /// One rendered card line: priority glyph, id, truncated title.
    fn card_line<'a>(&self, issue: &'a Issue, inner_width: usize, theme: &Theme) -> Line<'a> {
        let (glyph, glyph_style) = theme.priority_indicator(&issue.meta.priority);
        let title = truncate(&issue.meta.title, inner_width.saturating_sub(4).max(1));
        Line::from(vec![
            Span::styled(glyph, glyph_style),
            Span::raw(" "),
            Span::styled(issue.meta.id.clone(), theme.card_id),
            Span::raw(" "),
            Span::raw(title),
        ])
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if self.columns.is_empty() {
            Paragraph::new("No statuses configured.")
                .style(theme.muted)
                .render(area, buf);
            return;
        }

        let col_width = column_width(area.width as usize, self.columns.len());
        let inner_width = col_width.saturating_sub(4).max(1);

        let mut x = area.x;
        for (index, column) in self.columns.iter().enumerate() {
            let focused = index == self.focused;
            let column_area = Rect {
                x,
                y: area.y,
                width: (col_width as u16).min(area.right().saturating_sub(x)),
                height: area.height,
            };
            if column_area.width == 0 {
                break;
            }

            let border_style = if focused {
                theme.focus_border
            } else {
                theme.border
            };
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(border_style)
                .padding(Padding::horizontal(1));

            let title_style = if focused {
                theme.focused_column_title
            } else {
                theme.column_title
            };
            let title = truncate(
                &format!("{} ({})", column.status.to_uppercase(), column.issues.len()),
                inner_width,
            );

            let mut lines = vec![Line::styled(title, title_style), Line::raw("")];
            if column.issues.is_empty() {
                lines.push(Line::styled("No issues", theme.muted));
            }
            for (card_index, issue) in column.issues.iter().enumerate() {
                let mut line = self.card_line(issue, inner_width, theme);
                if focused && card_index == self.cursors[index] {
                    line = line.style(theme.selected_card);
                }
                lines.push(line);
                lines.push(Line::raw(""));
            }

            Paragraph::new(lines).block(block).render(column_area, buf);
            x = x.saturating_add(col_width as u16 + 1);
            if x >= area.right() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use issue_store::{Issue, IssueMeta};
    use pretty_assertions::assert_eq;

    use super::{column_width, BoardModel};

    fn issue(id: &str, status: &str) -> Issue {
        Issue {
            meta: IssueMeta {
                format_version: 1,
                id: id.to_string(),
                title: format!("title {id}"),
                status: status.to_string(),
                priority: "medium".to_string(),
                labels: Vec::new(),
                parent: None,
                blocked_by: Vec::new(),
                docs: Vec::new(),
                created: "2026-08-01".to_string(),
                updated: "2026-08-01".to_string(),
                comments: Vec::new(),
            },
            body: String::new(),
        }
    }

    fn statuses() -> Vec<String> {
        vec!["todo".to_string(), "done".to_string()]
    }

    #[test]
    fn column_width_formula_matches_contract() {
        assert_eq!(column_width(120, 3), 39);
        assert_eq!(column_width(80, 3), 26);
        assert_eq!(column_width(100, 2), 49);
        assert_eq!(column_width(80, 1), 80);
        assert_eq!(column_width(40, 3), 12);
        assert_eq!(column_width(20, 3), 6);
        assert_eq!(column_width(80, 0), 0);
        // Degenerate: less than one cell per column.
        assert_eq!(column_width(2, 3), 1);
    }

    #[test]
    fn bucketing_drops_unknown_statuses_silently() {
        let mut board = BoardModel::new(&statuses());
        board.set_issues(vec![
            issue("LDS-1", "todo"),
            issue("LDS-2", "archived"),
            issue("LDS-3", "done"),
        ]);

        assert_eq!(board.columns[0].issues.len(), 1);
        assert_eq!(board.columns[1].issues.len(), 1);
    }

    #[test]
    fn cursor_follows_selected_issue_across_reloads() {
        let mut board = BoardModel::new(&statuses());
        board.set_issues(vec![
            issue("LDS-1", "todo"),
            issue("LDS-2", "todo"),
            issue("LDS-3", "todo"),
        ]);
        board.move_down();
        assert_eq!(board.selected_issue().map(|i| i.meta.id.as_str()), Some("LDS-2"));

        // Unchanged reload keeps the selection.
        board.set_issues(vec![
            issue("LDS-1", "todo"),
            issue("LDS-2", "todo"),
            issue("LDS-3", "todo"),
        ]);
        assert_eq!(board.selected_issue().map(|i| i.meta.id.as_str()), Some("LDS-2"));
    }

    #[test]
    fn cursor_clamps_when_the_selected_issue_disappears() {
        let mut board = BoardModel::new(&statuses());
        board.set_issues(vec![
            issue("LDS-1", "todo"),
            issue("LDS-2", "todo"),
            issue("LDS-3", "todo"),
        ]);
        board.move_down();

        board.set_issues(vec![issue("LDS-1", "todo"), issue("LDS-3", "todo")]);
        assert_eq!(board.selected_issue().map(|i| i.meta.id.as_str()), Some("LDS-3"));
    }

    #[test]
    fn navigation_clamps_without_wraparound() {
        let mut board = BoardModel::new(&statuses());
        board.set_issues(vec![issue("LDS-1", "todo"), issue("LDS-2", "todo")]);

        board.move_up();
        assert_eq!(board.selected_issue().map(|i| i.meta.id.as_str()), Some("LDS-1"));
        board.move_down();
        board.move_down();
        assert_eq!(board.selected_issue().map(|i| i.meta.id.as_str()), Some("LDS-2"));

        board.move_left();
        assert_eq!(board.focused, 0);
        board.move_right();
        board.move_right();
        assert_eq!(board.focused, 1);
    }

    #[test]
    fn empty_column_has_no_selection_and_ignores_vertical_moves() {
        let mut board = BoardModel::new(&statuses());
        board.set_issues(vec![issue("LDS-1", "done")]);

        assert!(board.selected_issue().is_none());
        board.move_up();
        board.move_down();
        assert!(board.selected_issue().is_none());
    }
}
