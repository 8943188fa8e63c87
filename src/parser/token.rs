//! Lexical units produced by the lexer and rewritten by the rules.

use std::fmt;

/// A lexical unit carrying its exact source text
///
/// Concatenating the text of every token reproduces the source byte for
/// byte, both straight out of the lexer and after any number of rule passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Horizontal whitespace (spaces, tabs)
    Space(String),
    /// A single line terminator (`\n`, `\r\n` or `\r`)
    Linebreak(String),
    Identifier(String),
    /// Reserved word, `#directive` or `@attribute`
    Keyword(String),
    Number(String),
    /// Complete string literal including its delimiters
    StringLiteral(String),
    /// Line or block comment including its delimiters
    Comment(String),
    /// `(`, `[` or `{`
    StartOfScope(String),
    /// `)`, `]` or `}`
    EndOfScope(String),
    Operator(String),
    /// `,`, `;` or `:`
    Delimiter(String),
    /// Lexing stopped here. Only ever the last token; the text is the
    /// unconsumed remainder of the source and may be empty.
    Error(String),
}

impl Token {
    /// The literal source text of the token
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Token::Space(s)
            | Token::Linebreak(s)
            | Token::Identifier(s)
            | Token::Keyword(s)
            | Token::Number(s)
            | Token::StringLiteral(s)
            | Token::Comment(s)
            | Token::StartOfScope(s)
            | Token::EndOfScope(s)
            | Token::Operator(s)
            | Token::Delimiter(s)
            | Token::Error(s) => s,
        }
    }

    #[must_use]
    pub fn is_space(&self) -> bool {
        matches!(self, Token::Space(_))
    }

    #[must_use]
    pub fn is_linebreak(&self) -> bool {
        matches!(self, Token::Linebreak(_))
    }

    #[must_use]
    pub fn is_space_or_linebreak(&self) -> bool {
        matches!(self, Token::Space(_) | Token::Linebreak(_))
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::Comment(_))
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Token::Error(_))
    }

    /// True for a scope opener with the given text, e.g. `"{"`
    #[must_use]
    pub fn is_start_of_scope(&self, text: &str) -> bool {
        matches!(self, Token::StartOfScope(s) if s == text)
    }

    /// True for a scope closer with the given text, e.g. `"}"`
    #[must_use]
    pub fn is_end_of_scope(&self, text: &str) -> bool {
        matches!(self, Token::EndOfScope(s) if s == text)
    }

    /// True for tokens that can end an expression or a declaration head
    /// (`foo`, `else`, `)`, `]`), i.e. things a block brace can follow.
    #[must_use]
    pub fn is_block_head_end(&self) -> bool {
        match self {
            Token::Identifier(_) | Token::Keyword(_) => true,
            Token::EndOfScope(s) => s == ")" || s == "]",
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Reconstruct source text from tokens
///
/// This is plain concatenation: no separators are inserted and nothing is
/// re-lexed.
#[must_use]
pub fn source_code(tokens: &[Token]) -> String {
    let capacity = tokens.iter().map(|t| t.text().len()).sum();
    let mut output = String::with_capacity(capacity);
    for token in tokens {
        output.push_str(token.text());
    }
    output
}
