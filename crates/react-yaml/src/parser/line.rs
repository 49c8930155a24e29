//! Line-level helpers for the state machine.
//!
//! Widths are counted in whitespace characters, so a tab counts as one
//! column, the same way the model's indentation is compared against the
//! reasoning key line.

/// How the reasoning key line introduces its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyLine<'a> {
    /// `thinking: |` (or `>`, with optional chomping/indent indicators).
    Block { indent: usize },
    /// `thinking: some text` on a single line. The value is trimmed.
    Inline { value: &'a str },
}

/// Match `line` (without terminator) against `<ws>*<key><ws>*:<rest>`.
pub(crate) fn match_key_line<'a>(line: &'a str, key: &str) -> Option<KeyLine<'a>> {
    let indent = leading_width(line);
    let rest = line.trim_start().strip_prefix(key)?;
    let rest = rest.trim_start().strip_prefix(':')?;
    let value = rest.trim();
    if is_block_indicator(value) {
        Some(KeyLine::Block { indent })
    } else {
        Some(KeyLine::Inline {
            value: unquote(value),
        })
    }
}

/// `|`, `|-`, `>+2`, `|  # comment`, ...
fn is_block_indicator(value: &str) -> bool {
    let mut chars = value.chars();
    if !matches!(chars.next(), Some('|' | '>')) {
        return false;
    }
    let tail = chars.as_str();
    let (raw_indicators, comment) = match tail.find('#') {
        Some(pos) => tail.split_at(pos),
        None => (tail, ""),
    };
    // A comment must be separated from the indicator by whitespace.
    let comment_ok = comment.is_empty() || raw_indicators.ends_with(char::is_whitespace);
    let indicators = raw_indicators.trim_end();
    comment_ok
        && indicators.chars().count() <= 2
        && indicators
            .chars()
            .all(|c| c == '+' || c == '-' || c.is_ascii_digit())
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Number of leading whitespace characters.
pub(crate) fn leading_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Drop up to `width` leading whitespace characters.
pub(crate) fn strip_indent(line: &str, width: usize) -> &str {
    let offset = line
        .char_indices()
        .take(width)
        .take_while(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    line.split_at(offset).1
}

/// `line` without its `\n` / `\r\n` terminator.
pub(crate) fn line_body(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}
