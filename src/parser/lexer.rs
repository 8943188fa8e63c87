//! Lossless tokenizer for brace-delimited source
//!
//! The lexer is total: it never fails. When it cannot continue it appends a
//! single [`Token::Error`] holding the unconsumed remainder (empty when the
//! source simply ended too early) and stops, so the token texts always
//! concatenate back to the exact input.

use std::collections::HashSet;
use std::sync::LazyLock;

use super::token::Token;

/// Reserved words recognised as [`Token::Keyword`]
static KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "as", "associatedtype", "async", "await", "break", "case", "catch", "class", "continue",
        "default", "defer", "deinit", "do", "else", "enum", "extension", "fallthrough", "false",
        "fileprivate", "final", "for", "func", "guard", "if", "import", "in", "init", "inout",
        "internal", "is", "lazy", "let", "mutating", "nil", "open", "operator", "override",
        "private", "protocol", "public", "repeat", "rethrows", "return", "self", "Self", "static",
        "struct", "subscript", "super", "switch", "throw", "throws", "true", "try", "typealias",
        "var", "weak", "where", "while",
    ]
    .into_iter()
    .collect()
});

const OPERATOR_CHARS: &str = "/=-+!*%<>&|^~?.";

/// Tokenize source text
///
/// Never fails; lexical errors are reported in-band by a trailing
/// [`Token::Error`].
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

/// Whether a keyword string is reserved
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    /// Open scope characters awaiting their closer
    scopes: Vec<char>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Take `len` bytes from the current position
    fn take(&mut self, len: usize) -> String {
        let text = self.source[self.pos..self.pos + len].to_string();
        self.pos += len;
        text
    }

    /// Byte length of the longest prefix of the remainder matching `pred`
    fn prefix_len(&self, pred: impl Fn(char) -> bool) -> usize {
        self.rest()
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(self.rest().len(), |(i, _)| i)
    }

    /// Stop lexing: everything left becomes the error payload
    fn fail_here(&mut self) {
        let len = self.rest().len();
        let rest = self.take(len);
        self.tokens.push(Token::Error(rest));
    }

    /// Stop lexing at end of input with an empty error payload
    fn fail_at_end(&mut self, partial: Token) {
        self.tokens.push(partial);
        self.tokens.push(Token::Error(String::new()));
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            if !self.next_token(c) {
                return self.tokens;
            }
        }
        if !self.scopes.is_empty() {
            self.tokens.push(Token::Error(String::new()));
        }
        self.tokens
    }

    /// Lex one token starting with `c`. Returns false once an error token
    /// has been emitted.
    fn next_token(&mut self, c: char) -> bool {
        match c {
            ' ' | '\t' | '\u{0B}' | '\u{0C}' => {
                let len = self.prefix_len(|c| matches!(c, ' ' | '\t' | '\u{0B}' | '\u{0C}'));
                let text = self.take(len);
                self.tokens.push(Token::Space(text));
            }
            '\n' => {
                let text = self.take(1);
                self.tokens.push(Token::Linebreak(text));
            }
            '\r' => {
                let len = if self.rest().starts_with("\r\n") { 2 } else { 1 };
                let text = self.take(len);
                self.tokens.push(Token::Linebreak(text));
            }
            '/' if self.rest().starts_with("//") => {
                let len = self.prefix_len(|c| c != '\n' && c != '\r');
                let text = self.take(len);
                self.tokens.push(Token::Comment(text));
            }
            '/' if self.rest().starts_with("/*") => return self.block_comment(),
            '"' if self.rest().starts_with("\"\"\"") => return self.multiline_string(),
            '"' => return self.string(),
            '`' => return self.escaped_identifier(),
            '0'..='9' => self.number(),
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let len = self.prefix_len(|c| c.is_alphanumeric() || c == '_' || c == '$');
                let text = self.take(len);
                if is_keyword(&text) {
                    self.tokens.push(Token::Keyword(text));
                } else {
                    self.tokens.push(Token::Identifier(text));
                }
            }
            '#' | '@' => {
                let name_len = self.rest()[1..]
                    .char_indices()
                    .find(|&(_, c)| !(c.is_alphanumeric() || c == '_'))
                    .map_or(self.rest().len() - 1, |(i, _)| i);
                if name_len == 0 {
                    self.fail_here();
                    return false;
                }
                let text = self.take(name_len + 1);
                self.tokens.push(Token::Keyword(text));
            }
            c if OPERATOR_CHARS.contains(c) => self.operator(),
            '(' | '[' | '{' => {
                self.scopes.push(c);
                let text = self.take(1);
                self.tokens.push(Token::StartOfScope(text));
            }
            ')' | ']' | '}' => {
                let opener = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if self.scopes.last() != Some(&opener) {
                    self.fail_here();
                    return false;
                }
                self.scopes.pop();
                let text = self.take(1);
                self.tokens.push(Token::EndOfScope(text));
            }
            ',' | ';' | ':' => {
                let text = self.take(1);
                self.tokens.push(Token::Delimiter(text));
            }
            _ => {
                self.fail_here();
                return false;
            }
        }
        true
    }

    fn block_comment(&mut self) -> bool {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut depth = 0usize;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i..].starts_with(b"/*") {
                depth += 1;
                i += 2;
            } else if bytes[i..].starts_with(b"*/") {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    let text = self.take(i);
                    self.tokens.push(Token::Comment(text));
                    return true;
                }
            } else {
                i += 1;
            }
        }
        let text = self.take(rest.len());
        self.fail_at_end(Token::Comment(text));
        false
    }

    fn multiline_string(&mut self) -> bool {
        let rest = self.rest();
        let mut chars = rest.char_indices().skip(3);
        while let Some((i, c)) = chars.next() {
            if c == '\\' {
                chars.next();
            } else if rest[i..].starts_with("\"\"\"") {
                let text = self.take(i + 3);
                self.tokens.push(Token::StringLiteral(text));
                return true;
            }
        }
        let text = self.take(rest.len());
        self.fail_at_end(Token::StringLiteral(text));
        false
    }

    fn string(&mut self) -> bool {
        let rest = self.rest();
        let mut chars = rest.char_indices().skip(1).peekable();
        'scan: while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    let text = self.take(i + 1);
                    self.tokens.push(Token::StringLiteral(text));
                    return true;
                }
                '\\' => {
                    if chars.peek().map(|&(_, c)| c) == Some('(') {
                        // Interpolation: skip to the matching paren
                        chars.next();
                        let mut depth = 1usize;
                        for (_, c) in chars.by_ref() {
                            match c {
                                '(' => depth += 1,
                                ')' => depth -= 1,
                                '\n' | '\r' => break 'scan,
                                _ => {}
                            }
                            if depth == 0 {
                                break;
                            }
                        }
                    } else {
                        chars.next();
                    }
                }
                '\n' | '\r' => break,
                _ => {}
            }
        }
        self.fail_here();
        false
    }

    fn escaped_identifier(&mut self) -> bool {
        let rest = self.rest();
        for (i, c) in rest.char_indices().skip(1) {
            match c {
                '`' if i > 1 => {
                    let text = self.take(i + 1);
                    self.tokens.push(Token::Identifier(text));
                    return true;
                }
                '`' | '\n' | '\r' => break,
                _ => {}
            }
        }
        self.fail_here();
        false
    }

    fn number(&mut self) {
        let rest = self.rest();
        let mut chars = rest.char_indices().peekable();
        let mut len = rest.len();
        while let Some((i, c)) = chars.next() {
            let continues = if c == '.' {
                // `1.5` continues the literal, `1..<5` and `1.description` do not
                chars.peek().is_some_and(|&(_, next)| next.is_ascii_digit())
            } else {
                c.is_alphanumeric() || c == '_'
            };
            if !continues {
                len = i;
                break;
            }
        }
        let text = self.take(len);
        self.tokens.push(Token::Number(text));
    }

    fn operator(&mut self) {
        let rest = self.rest();
        let mut len = 0;
        for (i, c) in rest.char_indices() {
            if !OPERATOR_CHARS.contains(c) {
                break;
            }
            // A comment opener ends the operator
            if i > 0 && (rest[i..].starts_with("//") || rest[i..].starts_with("/*")) {
                break;
            }
            len = i + c.len_utf8();
        }
        let text = self.take(len);
        self.tokens.push(Token::Operator(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::source_code;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::text).collect()
    }

    #[test]
    fn test_round_trip_reconstruction() {
        let sources = [
            "",
            "let x = 1\n",
            "func foo(a: Int, b: Int) -> Int {\r\n    return a+b // sum\r\n}\r\n",
            "/* outer /* nested */ still */ let s = \"a \\(b + (c)) \\\" d\"\n",
            "let m = \"\"\"\n  multi\n  line\n  \"\"\"\n",
            "x = 1..<5 ; y = 0x1F.description\n\t\n",
            "@objc #if DEBUG\nlet `class` = 3.14\n#endif\n",
            "func f() {",
            "let s = \"unterminated\nnext\n",
            "let x = 1 }\n",
            "/* never closed",
        ];
        for source in sources {
            let tokens = tokenize(source);
            assert_eq!(source_code(&tokens), source, "round trip failed for {source:?}");
        }
    }

    #[test]
    fn test_basic_kinds() {
        let tokens = tokenize("let x=foo(1, y)\n");
        assert_eq!(
            tokens,
            vec![
                Token::Keyword("let".to_string()),
                Token::Space(" ".to_string()),
                Token::Identifier("x".to_string()),
                Token::Operator("=".to_string()),
                Token::Identifier("foo".to_string()),
                Token::StartOfScope("(".to_string()),
                Token::Number("1".to_string()),
                Token::Delimiter(",".to_string()),
                Token::Space(" ".to_string()),
                Token::Identifier("y".to_string()),
                Token::EndOfScope(")".to_string()),
                Token::Linebreak("\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_operator_stops_before_comment() {
        let tokens = tokenize("a =// note\n");
        assert_eq!(texts(&tokens), vec!["a", " ", "=", "// note", "\n"]);
    }

    #[test]
    fn test_range_operator_after_number() {
        let tokens = tokenize("0..<10");
        assert_eq!(texts(&tokens), vec!["0", "..<", "10"]);
        let tokens = tokenize("1.5");
        assert_eq!(texts(&tokens), vec!["1.5"]);
    }

    #[test]
    fn test_crlf_is_one_linebreak() {
        let tokens = tokenize("a\r\nb\rc\n");
        let breaks: Vec<_> = tokens.iter().filter(|t| t.is_linebreak()).collect();
        assert_eq!(breaks.len(), 3);
        assert_eq!(breaks[0].text(), "\r\n");
    }

    #[test]
    fn test_unclosed_scope_is_end_of_file_error() {
        let tokens = tokenize("func f() {\n");
        assert_eq!(tokens.last(), Some(&Token::Error(String::new())));
    }

    #[test]
    fn test_unbalanced_closer_is_error_with_payload() {
        let tokens = tokenize("let x = 1 }\n");
        assert_eq!(tokens.last(), Some(&Token::Error("}\n".to_string())));
    }

    #[test]
    fn test_mismatched_closer() {
        let tokens = tokenize("foo(]");
        assert_eq!(tokens.last(), Some(&Token::Error("]".to_string())));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let tokens = tokenize("x /* open");
        assert_eq!(
            &tokens[tokens.len() - 2..],
            &[
                Token::Comment("/* open".to_string()),
                Token::Error(String::new())
            ]
        );
    }

    #[test]
    fn test_unterminated_string_stops_lexing() {
        let tokens = tokenize("let s = \"abc\nlet t = 1\n");
        assert_eq!(
            tokens.last(),
            Some(&Token::Error("\"abc\nlet t = 1\n".to_string()))
        );
    }

    #[test]
    fn test_unknown_character() {
        let tokens = tokenize("let a = 1\n\\");
        assert_eq!(tokens.last(), Some(&Token::Error("\\".to_string())));
    }

    #[test]
    fn test_keywords_and_attributes() {
        let tokens = tokenize("@available #if return value");
        assert_eq!(tokens[0], Token::Keyword("@available".to_string()));
        assert_eq!(tokens[2], Token::Keyword("#if".to_string()));
        assert_eq!(tokens[4], Token::Keyword("return".to_string()));
        assert_eq!(tokens[6], Token::Identifier("value".to_string()));
    }
}
