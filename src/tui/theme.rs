use ratatui::style::{Color, Modifier, Style};

/// Immutable style table constructed once at startup and passed by reference
/// into render calls.
#[derive(Debug, Clone)]
pub struct Theme {
    pub border: Style,
    pub focus_border: Style,
    pub column_title: Style,
    pub focused_column_title: Style,
    pub card_id: Style,
    pub selected_card: Style,
    pub muted: Style,
    pub header: Style,
    pub label: Style,
    pub user: Style,
    pub tool: Style,
    pub result: Style,
    pub error: Style,
    pub help: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let muted = Style::default().fg(Color::DarkGray);
        Self {
            border: Style::default().fg(Color::DarkGray),
            focus_border: Style::default().fg(Color::Blue),
            column_title: Style::default().add_modifier(Modifier::BOLD),
            focused_column_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            card_id: muted,
            selected_card: Style::default()
                .add_modifier(Modifier::REVERSED)
                .add_modifier(Modifier::BOLD),
            muted,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            label: muted,
            user: Style::default().fg(Color::Cyan),
            tool: Style::default().fg(Color::Yellow),
            result: Style::default().fg(Color::Green),
            error: Style::default().fg(Color::Red),
            help: muted,
        }
    }
}

impl Theme {
    /// Returns the card glyph and color tier for a priority value. Unknown
    /// priorities get a neutral hollow glyph.
    #[must_use]
    pub fn priority_indicator(&self, priority: &str) -> (&'static str, Style) {
        match priority {
            "critical" => ("●", Style::default().fg(Color::Red)),
            "high" => ("●", Style::default().fg(Color::Yellow)),
            "medium" => ("●", Style::default().fg(Color::Blue)),
            "low" => ("●", Style::default().fg(Color::Green)),
            _ => ("○", self.muted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;

    #[test]
    fn unknown_priority_gets_the_neutral_glyph() {
        let theme = Theme::default();
        let (glyph, style) = theme.priority_indicator("unheard-of");
        assert_eq!(glyph, "○");
        assert_eq!(style, theme.muted);
    }

    #[test]
    fn known_priorities_get_the_solid_glyph() {
        let theme = Theme::default();
        for priority in ["critical", "high", "medium", "low"] {
            let (glyph, _) = theme.priority_indicator(priority);
            assert_eq!(glyph, "●");
        }
    }
}
