//! Width-constrained text primitives shared by the board, detail, and chat
//! views.

/// Truncates to at most `max_len` characters, appending `...` when the text
/// was cut and there is room for the ellipsis.
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text.to_string();
    }
    if max_len <= 3 {
        return chars[..max_len].iter().collect();
    }

    let mut cut: String = chars[..max_len - 3].iter().collect();
    cut.push_str("...");
    cut
}

/// Word-wraps to `width` columns. Existing newlines are preserved; a line with
/// no space before the limit is hard-broken. A non-positive width returns the
/// input unchanged.
#[must_use]
pub fn word_wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut out = String::new();
    for line in text.split('\n') {
        let mut rest: Vec<char> = line.chars().collect();
        if rest.len() <= width {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        while rest.len() > width {
            let head = &rest[..width];
            let break_at = match head.iter().rposition(|ch| *ch == ' ') {
                Some(0) | None => width,
                Some(index) => index,
            };

            out.extend(rest[..break_at].iter());
            out.push('\n');
            rest.drain(..break_at);
            while rest.first() == Some(&' ') {
                rest.remove(0);
            }
        }

        if !rest.is_empty() {
            out.extend(rest.iter());
            out.push('\n');
        }
    }

    out.trim_end_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{truncate, word_wrap};

    #[test]
    fn truncate_returns_short_text_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_cuts_with_ellipsis() {
        assert_eq!(truncate("hello world", 6), "hel...");
    }

    #[test]
    fn truncate_hard_cuts_tiny_widths() {
        assert_eq!(truncate("hello", 3), "hel");
    }

    #[test]
    fn truncate_zero_width_is_empty() {
        assert_eq!(truncate("hello", 0), "");
    }

    #[test]
    fn word_wrap_breaks_at_last_space() {
        assert_eq!(word_wrap("hello world foo", 11), "hello\nworld foo");
    }

    #[test]
    fn word_wrap_zero_width_returns_input() {
        assert_eq!(word_wrap("anything at all", 0), "anything at all");
    }

    #[test]
    fn word_wrap_preserves_existing_newlines() {
        assert_eq!(word_wrap("one\ntwo", 10), "one\ntwo");
    }

    #[test]
    fn word_wrap_hard_breaks_unbroken_runs() {
        assert_eq!(word_wrap("abcdefgh", 4), "abcd\nefgh");
    }

    #[test]
    fn word_wrap_trims_trailing_blank_lines() {
        assert_eq!(word_wrap("hello   ", 5), "hello");
    }
}
