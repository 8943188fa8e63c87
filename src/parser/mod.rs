//! Source tokenization.
//!
//! This module provides the lexical layer consumed by the rules:
//! - [`Token`]: A lexical unit carrying its exact source text
//! - [`tokenize`]: Total, lossless lexer; failures show up as a trailing [`Token::Error`]
//! - [`source_code`]: Rebuilds source text by concatenating token texts
//!
//! The lexer understands brace-delimited languages well enough to keep
//! strings, comments and scopes intact. It does not build a syntax tree;
//! rules work directly on the flat token sequence.

pub mod lexer;
pub mod token;

pub use lexer::{is_keyword, tokenize};
pub use token::{source_code, Token};
