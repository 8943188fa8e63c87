//! Linebreak and blank line rules.

use std::ops::Range;

use super::formatter::Formatter;
use crate::parser::Token;

/// Normalize every linebreak token to the configured style
pub(super) fn linebreaks(f: &mut Formatter) {
    let linebreak = f.options().linebreak.as_str();
    for i in 0..f.len() {
        if matches!(f.token(i), Some(Token::Linebreak(text)) if text != linebreak) {
            f.replace_token(i, Token::Linebreak(linebreak.to_string()));
        }
    }
}

/// Limit runs of blank lines to `options.max_blank_lines`
pub(super) fn consecutive_blank_lines(f: &mut Formatter) {
    let max = f.options().max_blank_lines;
    let lines = f.lines();
    let mut excess: Vec<Range<usize>> = Vec::new();
    let mut run = 0;
    for line in &lines {
        // The segment after the final linebreak is not a line of its own
        let terminated = line.end < f.len();
        if terminated && f.is_blank(line.clone()) {
            run += 1;
            if run > max {
                excess.push(line.start..line.end + 1);
            }
        } else {
            run = 0;
        }
    }
    for range in excess.into_iter().rev() {
        f.remove_tokens(range);
    }
}

/// Remove blank lines directly after a `{`
pub(super) fn blank_lines_at_start_of_scope(f: &mut Formatter) {
    let mut i = 0;
    while i < f.len() {
        if f.token(i).is_some_and(|t| t.is_start_of_scope("{")) {
            // Linebreak ending the brace's own line
            let first_break = f
                .index_of_next(i, |t| !t.is_space())
                .filter(|&j| f.token(j).is_some_and(Token::is_linebreak));
            if let Some(first_break) = first_break {
                loop {
                    let next = f.index_of_next(first_break, |t| !t.is_space());
                    match next {
                        Some(blank_end) if f.token(blank_end).is_some_and(Token::is_linebreak) => {
                            f.remove_tokens(first_break + 1..blank_end + 1);
                        }
                        _ => break,
                    }
                }
            }
        }
        i += 1;
    }
}

/// Remove blank lines directly before a `}` that starts its line
pub(super) fn blank_lines_at_end_of_scope(f: &mut Formatter) {
    let mut i = 0;
    while i < f.len() {
        if f.token(i).is_some_and(|t| t.is_end_of_scope("}")) {
            let mut line_start = f.start_of_line(i);
            while line_start > 0 && f.is_blank(line_start..i) {
                // `line_start - 1` is the linebreak ending the previous line
                let previous_break = line_start - 1;
                let previous_start = f.start_of_line(previous_break);
                if previous_start == 0 || !f.is_blank(previous_start..previous_break) {
                    break;
                }
                let removed = line_start - previous_start;
                f.remove_tokens(previous_start..line_start);
                i -= removed;
                line_start = previous_start;
            }
        }
        i += 1;
    }
}

/// End the file with exactly one linebreak
///
/// Fragments are left alone: they are often spliced into other text.
pub(super) fn linebreak_at_end_of_file(f: &mut Formatter) {
    if f.options().fragment {
        return;
    }
    let Some(last) = f.index_of_previous(f.len(), |t| !t.is_space_or_linebreak()) else {
        return;
    };
    let linebreak = f.options().linebreak.as_str();
    f.replace_tokens(last + 1..f.len(), vec![Token::Linebreak(linebreak.to_string())]);
}
