//! Rule-based source formatting.
//!
//! This module contains the rewrite rules and the engine that runs them:
//! - [`engine`]: Applies an ordered rule list until a full pass changes nothing
//! - [`formatter`]: The mutable token buffer and navigation helpers rules work through
//! - [`rules`]: [`FormatRule`] and the built-in catalog
//! - `whitespace`: Spacing around operators, commas, brackets and braces
//! - `indenter`: Scope-depth indentation
//! - `braces`: K&R or Allman brace placement
//! - `linebreaks`: Linebreak style, blank lines and end-of-file handling
//! - `semicolons`: Trailing semicolon removal (experimental)

mod braces;
pub mod engine;
pub mod formatter;
mod indenter;
mod linebreaks;
pub mod rules;
mod semicolons;
mod whitespace;

pub use engine::{apply_rules, format, MAX_PASSES};
pub use formatter::Formatter;
pub use rules::{default_rules, rule_named, select_rules, FormatRule, ALL_RULES};
