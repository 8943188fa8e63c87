//! Horizontal whitespace rules
//!
//! Spacing around operators, commas, brackets and braces, collapsing of
//! interior runs of blanks, and trailing-space removal. Leading whitespace
//! belongs to the indent rule and is never touched here.

use super::formatter::Formatter;
use crate::options::TrimWhitespace;
use crate::parser::Token;

/// Operators that are always infix and get a space on both sides
const INFIX_OPERATORS: &[&str] = &[
    "=", "==", "!=", "===", "!==", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
    "&&", "||", "->", "??", "<=", ">=",
];

fn space() -> Token {
    Token::Space(" ".to_string())
}

/// True if the token directly before `index` exists and is code on the same line
fn touches_previous(f: &Formatter, index: usize) -> bool {
    index > 0 && f.token(index - 1).is_some_and(|t| !t.is_space_or_linebreak())
}

/// `a=b` -> `a = b`
pub(super) fn space_around_operators(f: &mut Formatter) {
    let mut i = 0;
    while i < f.len() {
        let is_infix = matches!(
            f.token(i),
            Some(Token::Operator(op)) if INFIX_OPERATORS.contains(&op.as_str())
        );
        if is_infix {
            let needs_after = f.token(i + 1).is_some_and(|t| {
                !t.is_space_or_linebreak() && !matches!(t, Token::EndOfScope(_) | Token::Delimiter(_))
            });
            if needs_after {
                f.insert_token(i + 1, space());
            }
            let needs_before = touches_previous(f, i)
                && !matches!(f.token(i - 1), Some(Token::StartOfScope(_)));
            if needs_before {
                f.insert_token(i, space());
                i += 1;
            }
        }
        i += 1;
    }
}

/// `a ,b` -> `a, b`
pub(super) fn space_around_commas(f: &mut Formatter) {
    let mut i = 0;
    while i < f.len() {
        if matches!(f.token(i), Some(Token::Delimiter(d)) if d == ",") {
            // Space before the comma, unless it is the line's indentation
            if i >= 2
                && f.token(i - 1).is_some_and(Token::is_space)
                && f.token(i - 2).is_some_and(|t| !t.is_linebreak())
            {
                f.remove_token(i - 1);
                i -= 1;
            }
            let needs_after = f.token(i + 1).is_some_and(|t| {
                !t.is_space_or_linebreak() && !matches!(t, Token::EndOfScope(_))
            });
            if needs_after {
                f.insert_token(i + 1, space());
            }
        }
        i += 1;
    }
}

/// `( a )` -> `(a)`, `[ 1 ]` -> `[1]`
pub(super) fn space_inside_parens(f: &mut Formatter) {
    let mut i = 0;
    while i < f.len() {
        let is_opener =
            f.token(i).is_some_and(|t| t.is_start_of_scope("(") || t.is_start_of_scope("["));
        let is_closer =
            f.token(i).is_some_and(|t| t.is_end_of_scope(")") || t.is_end_of_scope("]"));
        if is_opener
            && f.token(i + 1).is_some_and(Token::is_space)
            && f.token(i + 2).is_some_and(|t| !t.is_linebreak() && !t.is_comment())
        {
            f.remove_token(i + 1);
        } else if is_closer
            && i >= 2
            && f.token(i - 1).is_some_and(Token::is_space)
            && f.token(i - 2).is_some_and(|t| !t.is_linebreak() && !t.is_comment())
        {
            f.remove_token(i - 1);
            i -= 1;
        }
        i += 1;
    }
}

/// `if x{` -> `if x {`, `}else` -> `} else`
pub(super) fn space_around_braces(f: &mut Formatter) {
    let mut i = 0;
    while i < f.len() {
        let Some(token) = f.token(i) else { break };
        if token.is_start_of_scope("{") {
            if i > 0 && f.token(i - 1).is_some_and(Token::is_block_head_end) {
                f.insert_token(i, space());
                i += 1;
            }
        } else if token.is_end_of_scope("}")
            && f.token(i + 1)
                .is_some_and(|t| matches!(t, Token::Keyword(_) | Token::Identifier(_)))
        {
            f.insert_token(i + 1, space());
        }
        i += 1;
    }
}

/// Collapse interior runs of blanks to one space
pub(super) fn consecutive_spaces(f: &mut Formatter) {
    let mut i = 0;
    while i < f.len() {
        if let Some(Token::Space(text)) = f.token(i) {
            let mut text = text.clone();
            // Merge neighbours left behind by other rules' removals
            while let Some(Token::Space(next)) = f.token(i + 1) {
                text.push_str(next);
                f.remove_token(i + 1);
            }
            let leading = i == 0 || f.token(i - 1).is_some_and(Token::is_linebreak);
            let trailing = f.token(i + 1).is_none_or(Token::is_linebreak);
            if !leading && !trailing {
                text = " ".to_string();
            }
            f.replace_token(i, Token::Space(text));
        }
        i += 1;
    }
}

/// Remove whitespace before a linebreak or at end of file
pub(super) fn trailing_space(f: &mut Formatter) {
    let keep_blank_lines = f.options().trim_whitespace == TrimWhitespace::NonblankLines;
    let mut i = 0;
    while i < f.len() {
        let is_trailing = f.token(i).is_some_and(Token::is_space)
            && f.token(i + 1).is_none_or(Token::is_linebreak);
        if is_trailing {
            let blank_line = i == 0 || f.token(i - 1).is_some_and(Token::is_linebreak);
            if !(keep_blank_lines && blank_line) {
                f.remove_token(i);
                continue;
            }
        }
        i += 1;
    }
}
