//! Opening brace placement (K&R or Allman).

use super::formatter::Formatter;
use crate::parser::Token;

/// Place every block-opening `{` according to `options.allman`
pub(super) fn braces(f: &mut Formatter) {
    if f.options().allman {
        allman(f);
    } else {
        knr(f);
    }
}

/// `if x\n{` -> `if x {`
fn knr(f: &mut Formatter) {
    let mut i = 0;
    while i < f.len() {
        if f.token(i).is_some_and(|t| t.is_start_of_scope("{")) {
            let head = f.index_of_previous(i, |t| !t.is_space_or_linebreak());
            if let Some(head) = head {
                let wrapped = (head + 1..i).any(|j| f.token(j).is_some_and(Token::is_linebreak));
                if wrapped && f.token(head).is_some_and(Token::is_block_head_end) {
                    f.replace_tokens(head + 1..i, vec![Token::Space(" ".to_string())]);
                    i = head + 2;
                }
            }
        }
        i += 1;
    }
}

/// `if x {\n` -> `if x\n{\n`
///
/// Single-line blocks such as `map { $0 }` stay where they are.
fn allman(f: &mut Formatter) {
    let linebreak = f.options().linebreak.as_str();
    let mut i = 0;
    while i < f.len() {
        if f.token(i).is_some_and(|t| t.is_start_of_scope("{")) {
            let head = f.index_of_previous(i, |t| !t.is_space_or_linebreak());
            let opens_block = f
                .index_of_next(i, |t| !t.is_space())
                .is_some_and(|next| f.token(next).is_some_and(Token::is_linebreak));
            if let Some(head) = head {
                let same_line = !(head + 1..i).any(|j| f.token(j).is_some_and(Token::is_linebreak));
                if opens_block && same_line && f.token(head).is_some_and(Token::is_block_head_end) {
                    // Indentation of the new line is left to the indent rule
                    f.replace_tokens(head + 1..i, vec![Token::Linebreak(linebreak.to_string())]);
                    i = head + 2;
                }
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::options::FormatOptions;
    use crate::parser::{source_code, tokenize};

    fn run(source: &str, allman: bool) -> String {
        let options = FormatOptions {
            allman,
            ..Default::default()
        };
        let mut f = Formatter::new(tokenize(source), options);
        braces(&mut f);
        source_code(f.tokens())
    }

    #[test]
    fn test_knr_joins_wrapped_brace() {
        assert_eq!(run("if x\n{\n}\n", false), "if x {\n}\n");
        assert_eq!(run("func f()\n\n   {\n}\n", false), "func f() {\n}\n");
    }

    #[test]
    fn test_knr_leaves_brace_after_comment() {
        let input = "if x // why\n{\n}\n";
        assert_eq!(run(input, false), input);
    }

    #[test]
    fn test_knr_leaves_brace_after_closer() {
        let input = "{\n}\n{\n}\n";
        assert_eq!(run(input, false), input);
    }

    #[test]
    fn test_allman_moves_brace_to_own_line() {
        assert_eq!(run("if x {\n  y\n}\n", true), "if x\n{\n  y\n}\n");
    }

    #[test]
    fn test_allman_keeps_single_line_closure() {
        let input = "let y = xs.map { $0 }\n";
        assert_eq!(run(input, true), input);
    }

    #[test]
    fn test_allman_is_stable() {
        let once = run("if x {\n}\n", true);
        assert_eq!(run(&once, true), once);
    }
}
