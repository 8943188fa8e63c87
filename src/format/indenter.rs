//! Scope-based indentation
//!
//! Every line is indented one unit deeper than the line that opened the
//! innermost enclosing scope. Several scopes opened on one line
//! (`foo({`) only add a single level, and a line starting with a closer
//! lines up with the line that opened it.

use super::formatter::Formatter;
use crate::parser::Token;

/// Re-indent every non-blank line
pub(super) fn indent(f: &mut Formatter) {
    let unit = f.options().indent.unit();
    // Indent level of the line that opened each enclosing scope
    let mut scope_levels: Vec<usize> = Vec::new();
    let mut line_start = 0;

    loop {
        let mut line_end = f.end_of_line(line_start);
        let first = (line_start..line_end).find(|&i| f.token(i).is_some_and(|t| !t.is_space()));

        // Blank lines are left to the trailing space rule
        if let Some(first) = first {
            let starts_with_closer = matches!(f.token(first), Some(Token::EndOfScope(_)));
            let level = if starts_with_closer {
                scope_levels.last().copied().unwrap_or(0)
            } else {
                scope_levels.last().map_or(0, |level| level + 1)
            };

            let desired = unit.repeat(level);
            let has_indent = first > line_start;
            match (has_indent, desired.is_empty()) {
                (true, true) => {
                    f.remove_token(line_start);
                    line_end -= 1;
                }
                (true, false) => f.replace_token(line_start, Token::Space(desired)),
                (false, false) => {
                    f.insert_token(line_start, Token::Space(desired));
                    line_end += 1;
                }
                (false, true) => {}
            }

            for i in line_start..line_end {
                match f.token(i) {
                    Some(Token::StartOfScope(_)) => scope_levels.push(level),
                    Some(Token::EndOfScope(_)) => {
                        scope_levels.pop();
                    }
                    _ => {}
                }
            }
        }

        if line_end >= f.len() {
            break;
        }
        line_start = line_end + 1;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::options::{FormatOptions, Indent};
    use crate::parser::{source_code, tokenize};

    fn run(source: &str, options: FormatOptions) -> String {
        let mut f = Formatter::new(tokenize(source), options);
        indent(&mut f);
        source_code(f.tokens())
    }

    #[test]
    fn test_indent_nested_blocks() {
        let input = "if a {\nif b {\nc()\n}\n}\n";
        let expected = "if a {\n    if b {\n        c()\n    }\n}\n";
        assert_eq!(run(input, FormatOptions::default()), expected);
    }

    #[test]
    fn test_indent_removes_excess_at_top_level() {
        assert_eq!(run("   let x = 1\n", FormatOptions::default()), "let x = 1\n");
    }

    #[test]
    fn test_multiple_openers_on_one_line_add_one_level() {
        let input = "foo({\nbar()\n})\n";
        let expected = "foo({\n    bar()\n})\n";
        assert_eq!(run(input, FormatOptions::default()), expected);
    }

    #[test]
    fn test_closing_paren_lines_up_with_opener() {
        let input = "  let x = f(\na,\nb\n    )\n";
        let expected = "let x = f(\n    a,\n    b\n)\n";
        assert_eq!(run(input, FormatOptions::default()), expected);
    }

    #[test]
    fn test_tab_indent() {
        let options = FormatOptions {
            indent: Indent::Tab,
            ..Default::default()
        };
        assert_eq!(run("{\nx\n}", options), "{\n\tx\n}");
    }

    #[test]
    fn test_blank_lines_untouched() {
        let input = "{\n  \n\nx\n}";
        assert_eq!(run(input, FormatOptions::default()), "{\n  \n\n    x\n}");
    }

    #[test]
    fn test_multiline_comment_interior_untouched() {
        let input = "{\n/*\n  keep\n*/\nx\n}";
        assert_eq!(
            run(input, FormatOptions::default()),
            "{\n    /*\n  keep\n*/\n    x\n}"
        );
    }
}
