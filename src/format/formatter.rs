//! Mutable formatting context handed to each rule.

use std::ops::Range;

use crate::options::FormatOptions;
use crate::parser::Token;

/// Token buffer plus the options of the current run
///
/// Rules read and rewrite the buffer through these methods. Every mutation
/// that actually changes the buffer sets a modified flag, which the engine
/// uses to report which rules are still active.
#[derive(Debug, Clone)]
pub struct Formatter {
    tokens: Vec<Token>,
    options: FormatOptions,
    modified: bool,
}

impl Formatter {
    #[must_use]
    pub fn new(tokens: Vec<Token>, options: FormatOptions) -> Self {
        Self {
            tokens,
            options,
            modified: false,
        }
    }

    #[must_use]
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub(crate) fn reset_modified(&mut self) {
        self.modified = false;
    }

    pub(crate) fn was_modified(&self) -> bool {
        self.modified
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replace the token at `index`; a no-op if it is already equal
    pub fn replace_token(&mut self, index: usize, token: Token) {
        if self.tokens[index] != token {
            self.tokens[index] = token;
            self.modified = true;
        }
    }

    pub fn insert_token(&mut self, index: usize, token: Token) {
        self.tokens.insert(index, token);
        self.modified = true;
    }

    pub fn remove_token(&mut self, index: usize) {
        self.tokens.remove(index);
        self.modified = true;
    }

    pub fn remove_tokens(&mut self, range: Range<usize>) {
        if !range.is_empty() {
            self.tokens.drain(range);
            self.modified = true;
        }
    }

    /// Replace a range of tokens; a no-op if the replacement is identical
    pub fn replace_tokens(&mut self, range: Range<usize>, tokens: Vec<Token>) {
        if self.tokens[range.clone()] != tokens[..] {
            self.tokens.splice(range, tokens);
            self.modified = true;
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Index of the first token after `index` matching `pred`
    pub fn index_of_next(&self, index: usize, pred: impl Fn(&Token) -> bool) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, t)| pred(t))
            .map(|(i, _)| i)
    }

    /// Index of the last token before `index` matching `pred`
    pub fn index_of_previous(
        &self,
        index: usize,
        pred: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        self.tokens[..index.min(self.tokens.len())]
            .iter()
            .rposition(|t| pred(t))
    }

    /// Index of the first token on the line containing `index`
    #[must_use]
    pub fn start_of_line(&self, index: usize) -> usize {
        self.index_of_previous(index, Token::is_linebreak)
            .map_or(0, |i| i + 1)
    }

    /// Index of the linebreak ending the line containing `index`, or the
    /// buffer length on the last line
    #[must_use]
    pub fn end_of_line(&self, index: usize) -> usize {
        self.tokens[index..]
            .iter()
            .position(Token::is_linebreak)
            .map_or(self.tokens.len(), |i| index + i)
    }

    /// Token ranges of every line, excluding the terminating linebreak
    #[must_use]
    pub fn lines(&self) -> Vec<Range<usize>> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (i, token) in self.tokens.iter().enumerate() {
            if token.is_linebreak() {
                lines.push(start..i);
                start = i + 1;
            }
        }
        lines.push(start..self.tokens.len());
        lines
    }

    /// True if the tokens in `range` are all horizontal space
    #[must_use]
    pub fn is_blank(&self, range: Range<usize>) -> bool {
        self.tokens[range].iter().all(Token::is_space)
    }

    /// Leading whitespace of the line starting at `line_start`
    #[must_use]
    pub fn indent_of_line(&self, line_start: usize) -> &str {
        match self.tokens.get(line_start) {
            Some(Token::Space(s)) => s,
            _ => "",
        }
    }
}
