//! Rule definitions and the default rule catalog.

use std::fmt;

use super::formatter::Formatter;
use super::{braces, indenter, linebreaks, semicolons, whitespace};
use crate::error::FormatError;
use crate::options::FormatOptions;

/// A named token rewrite
///
/// A rule may inspect and rewrite any part of the buffer, but must leave it
/// text-reconstructible. Rules are expected to terminate on their own; the
/// engine handles repetition.
#[derive(Clone, Copy)]
pub struct FormatRule {
    pub name: &'static str,
    pub help: &'static str,
    /// Only part of the default set when experimental rules are enabled
    pub experimental: bool,
    apply: fn(&mut Formatter),
}

impl FormatRule {
    #[must_use]
    pub const fn new(name: &'static str, help: &'static str, apply: fn(&mut Formatter)) -> Self {
        Self {
            name,
            help,
            experimental: false,
            apply,
        }
    }

    #[must_use]
    pub const fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }

    pub fn apply(&self, formatter: &mut Formatter) {
        (self.apply)(formatter);
    }
}

impl fmt::Debug for FormatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRule")
            .field("name", &self.name)
            .field("experimental", &self.experimental)
            .finish_non_exhaustive()
    }
}

/// Every built-in rule, in execution order
pub const ALL_RULES: &[FormatRule] = &[
    FormatRule::new(
        "linebreaks",
        "Use the configured linebreak character for every line",
        linebreaks::linebreaks,
    ),
    FormatRule::new(
        "braces",
        "Wrap braces in accordance with the selected style (K&R or Allman)",
        braces::braces,
    ),
    FormatRule::new(
        "spaceAroundBraces",
        "Add a space between a brace and the code it follows or precedes",
        whitespace::space_around_braces,
    ),
    FormatRule::new(
        "spaceAroundOperators",
        "Add a single space around infix assignment, comparison and logical operators",
        whitespace::space_around_operators,
    ),
    FormatRule::new(
        "spaceAroundCommas",
        "Remove space before commas and add a space after them",
        whitespace::space_around_commas,
    ),
    FormatRule::new(
        "spaceInsideParens",
        "Remove space just inside parentheses and square brackets",
        whitespace::space_inside_parens,
    ),
    FormatRule::new(
        "semicolons",
        "Remove semicolons at the end of a line",
        semicolons::semicolons,
    )
    .experimental(),
    FormatRule::new(
        "consecutiveSpaces",
        "Replace consecutive spaces with a single space",
        whitespace::consecutive_spaces,
    ),
    FormatRule::new(
        "blankLinesAtStartOfScope",
        "Remove blank lines at the start of a scope",
        linebreaks::blank_lines_at_start_of_scope,
    ),
    FormatRule::new(
        "blankLinesAtEndOfScope",
        "Remove blank lines at the end of a scope",
        linebreaks::blank_lines_at_end_of_scope,
    ),
    FormatRule::new(
        "consecutiveBlankLines",
        "Limit runs of blank lines to the configured maximum",
        linebreaks::consecutive_blank_lines,
    ),
    FormatRule::new(
        "indent",
        "Indent code in accordance with its scope depth",
        indenter::indent,
    ),
    FormatRule::new(
        "trailingSpace",
        "Remove trailing space at the end of a line",
        whitespace::trailing_space,
    ),
    FormatRule::new(
        "linebreakAtEndOfFile",
        "End the file with exactly one linebreak",
        linebreaks::linebreak_at_end_of_file,
    ),
];

/// Look a built-in rule up by name
#[must_use]
pub fn rule_named(name: &str) -> Option<FormatRule> {
    ALL_RULES.iter().find(|rule| rule.name == name).copied()
}

/// The default rule set for `options`
#[must_use]
pub fn default_rules(options: &FormatOptions) -> Vec<FormatRule> {
    ALL_RULES
        .iter()
        .filter(|rule| options.experimental_rules || !rule.experimental)
        .copied()
        .collect()
}

/// Resolve the rules to run from explicit selections
///
/// With `enabled` set, exactly those rules run (experimental or not);
/// otherwise the default set does. `disabled` is subtracted either way.
/// Catalog order is kept regardless of the order names are given in.
pub fn select_rules(
    enabled: Option<&[String]>,
    disabled: &[String],
    options: &FormatOptions,
) -> Result<Vec<FormatRule>, FormatError> {
    let named = enabled.unwrap_or_default().iter().chain(disabled);
    for name in named {
        if rule_named(name).is_none() {
            return Err(FormatError::Options(format!("Unknown rule '{name}'")));
        }
    }
    let base = match enabled {
        Some(names) => ALL_RULES
            .iter()
            .filter(|rule| names.iter().any(|n| n == rule.name))
            .copied()
            .collect(),
        None => default_rules(options),
    };
    Ok(base
        .into_iter()
        .filter(|rule| !disabled.iter().any(|n| n == rule.name))
        .collect())
}
