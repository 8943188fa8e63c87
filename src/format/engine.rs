//! Fixed-point rule application
//!
//! Rules run in the caller's order, once each per pass, over a single
//! buffer owned by the current file. Passes repeat until one leaves the
//! buffer unchanged.

use tracing::trace;

use super::formatter::Formatter;
use super::rules::FormatRule;
use crate::error::FormatError;
use crate::options::FormatOptions;
use crate::parser::{source_code, tokenize, Token};

/// Upper bound on full passes before giving up
///
/// The shipped rules settle in two or three passes. A rule set that is
/// still rewriting after this many passes is treated as oscillating.
pub const MAX_PASSES: usize = 10;

/// Apply `rules` to `tokens` until a full pass changes nothing
///
/// Unless `options.fragment` is set, a trailing [`Token::Error`] is
/// rejected before any rule runs.
pub fn apply_rules(
    tokens: Vec<Token>,
    rules: &[FormatRule],
    options: &FormatOptions,
) -> Result<Vec<Token>, FormatError> {
    if !options.fragment {
        if let Some(Token::Error(payload)) = tokens.last() {
            return Err(unexpected(payload));
        }
    }

    let mut formatter = Formatter::new(tokens, options.clone());
    let mut pass = 0;
    loop {
        pass += 1;
        let before = formatter.tokens().to_vec();
        let mut changed_by = Vec::new();
        for rule in rules {
            formatter.reset_modified();
            rule.apply(&mut formatter);
            if formatter.was_modified() {
                changed_by.push(rule.name);
            }
        }
        if formatter.tokens() == before.as_slice() {
            trace!(passes = pass, "rules converged");
            return Ok(formatter.into_tokens());
        }
        if pass >= MAX_PASSES {
            return Err(FormatError::Parsing(format!(
                "rules failed to converge after {MAX_PASSES} passes (still changing: {})",
                changed_by.join(", ")
            )));
        }
    }
}

/// Tokenize, converge and reconstruct a complete source text
pub fn format(
    source: &str,
    rules: &[FormatRule],
    options: &FormatOptions,
) -> Result<String, FormatError> {
    let tokens = apply_rules(tokenize(source), rules, options)?;
    Ok(source_code(&tokens))
}

/// Parsing error for a trailing error token
fn unexpected(payload: &str) -> FormatError {
    match payload.split_whitespace().next() {
        None => FormatError::Parsing("unexpected end of file".to_string()),
        Some(token) => FormatError::Parsing(format!("unexpected token '{token}'")),
    }
}
