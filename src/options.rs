//! Formatting and traversal options.
//!
//! [`FormatOptions`] is the immutable style configuration handed to the rules
//! and folded into cache keys. Its fields are described by the closed
//! [`OptionField`] schema, which gives each field a command-line name, a
//! parser and a serialized form. Adding a field without extending every
//! `match` in this file is a compile error.
//!
//! [`FileOptions`] controls which files the tree enumerator visits.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path};

use glob::Pattern;

use crate::error::FormatError;

/// Indentation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
    Tab,
}

impl Indent {
    /// Text of one indentation level
    #[must_use]
    pub fn unit(self) -> String {
        match self {
            Indent::Spaces(n) => " ".repeat(n),
            Indent::Tab => "\t".to_string(),
        }
    }
}

impl fmt::Display for Indent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indent::Spaces(n) => write!(f, "{n}"),
            Indent::Tab => f.write_str("tab"),
        }
    }
}

/// Line terminator style, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Linebreak {
    Lf,
    Crlf,
    Cr,
}

impl Linebreak {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Linebreak::Lf => "\n",
            Linebreak::Crlf => "\r\n",
            Linebreak::Cr => "\r",
        }
    }

    /// Recognise a linebreak token's text
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "\n" => Some(Linebreak::Lf),
            "\r\n" => Some(Linebreak::Crlf),
            "\r" => Some(Linebreak::Cr),
            _ => None,
        }
    }
}

impl fmt::Display for Linebreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Linebreak::Lf => "lf",
            Linebreak::Crlf => "crlf",
            Linebreak::Cr => "cr",
        })
    }
}

/// Which lines get trailing whitespace removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimWhitespace {
    Always,
    /// Leave indentation-only blank lines untouched
    NonblankLines,
}

impl fmt::Display for TrimWhitespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrimWhitespace::Always => "always",
            TrimWhitespace::NonblankLines => "nonblank-lines",
        })
    }
}

/// Style configuration shared by the rules and the cache
///
/// Constructed once per run and never mutated afterwards. Two option sets
/// are equal iff every field matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub indent: Indent,
    pub linebreak: Linebreak,
    /// Opening braces on their own line instead of K&R style
    pub allman: bool,
    /// Maximum number of consecutive blank lines kept
    pub max_blank_lines: usize,
    pub trim_whitespace: TrimWhitespace,
    /// Run rules marked experimental
    pub experimental_rules: bool,
    /// Input may be an incomplete snippet; trailing lexer errors are not fatal
    pub fragment: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            indent: Indent::Spaces(4),
            linebreak: Linebreak::Lf,
            allman: false,
            max_blank_lines: 1,
            trim_whitespace: TrimWhitespace::Always,
            experimental_rules: false,
            fragment: false,
        }
    }
}

impl FormatOptions {
    /// Maximum indent width in spaces
    pub(crate) const MAX_INDENT: usize = 16;
    /// Maximum number of consecutive blank lines that can be requested
    const MAX_BLANK_LINES: usize = 10;

    /// Validate that values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if let Indent::Spaces(n) = self.indent {
            if n == 0 {
                return Some("indent must be at least 1".to_string());
            }
            if n > Self::MAX_INDENT {
                return Some(format!(
                    "indent {n} exceeds maximum of {}",
                    Self::MAX_INDENT
                ));
            }
        }
        if self.max_blank_lines > Self::MAX_BLANK_LINES {
            return Some(format!(
                "maxblanklines {} exceeds maximum of {}",
                self.max_blank_lines,
                Self::MAX_BLANK_LINES
            ));
        }
        None
    }

    /// Serialize every field as command-line arguments
    ///
    /// The result is stable for equal option sets and is used as the
    /// options component of cache values.
    #[must_use]
    pub fn serialized(&self) -> String {
        OptionField::ALL
            .iter()
            .map(|field| format!("--{} {}", field.name(), field.value(self)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Closed schema of the recognised [`FormatOptions`] fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionField {
    Indent,
    Linebreaks,
    Allman,
    MaxBlankLines,
    TrimWhitespace,
    Experimental,
    Fragment,
}

impl OptionField {
    /// Every field, in serialization order
    pub const ALL: [OptionField; 7] = [
        OptionField::Indent,
        OptionField::Linebreaks,
        OptionField::Allman,
        OptionField::MaxBlankLines,
        OptionField::TrimWhitespace,
        OptionField::Experimental,
        OptionField::Fragment,
    ];

    /// Argument name, used for `--name` flags and config file keys
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OptionField::Indent => "indent",
            OptionField::Linebreaks => "linebreaks",
            OptionField::Allman => "allman",
            OptionField::MaxBlankLines => "maxblanklines",
            OptionField::TrimWhitespace => "trimwhitespace",
            OptionField::Experimental => "experimental",
            OptionField::Fragment => "fragment",
        }
    }

    #[must_use]
    pub fn value_name(self) -> &'static str {
        match self {
            OptionField::Indent => "N|tab",
            OptionField::Linebreaks => "lf|crlf|cr",
            OptionField::MaxBlankLines => "N",
            OptionField::TrimWhitespace => "always|nonblank-lines",
            OptionField::Allman | OptionField::Experimental | OptionField::Fragment => "BOOL",
        }
    }

    #[must_use]
    pub fn help(self) -> &'static str {
        match self {
            OptionField::Indent => "Number of spaces to indent, or \"tab\" [default: 4]",
            OptionField::Linebreaks => "Linebreak character to use [default: lf]",
            OptionField::Allman => "Place opening braces on their own line [default: false]",
            OptionField::MaxBlankLines => "Maximum consecutive blank lines [default: 1]",
            OptionField::TrimWhitespace => {
                "Trim trailing space on all lines or non-blank lines only [default: always]"
            }
            OptionField::Experimental => "Enable experimental rules [default: false]",
            OptionField::Fragment => "Input is a fragment of a file [default: false]",
        }
    }

    /// Look a field up by its argument name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Serialized value of this field in `options`
    #[must_use]
    pub fn value(self, options: &FormatOptions) -> String {
        match self {
            OptionField::Indent => options.indent.to_string(),
            OptionField::Linebreaks => options.linebreak.to_string(),
            OptionField::Allman => options.allman.to_string(),
            OptionField::MaxBlankLines => options.max_blank_lines.to_string(),
            OptionField::TrimWhitespace => options.trim_whitespace.to_string(),
            OptionField::Experimental => options.experimental_rules.to_string(),
            OptionField::Fragment => options.fragment.to_string(),
        }
    }

    /// Parse `value` and store it in `options`
    pub fn apply(self, options: &mut FormatOptions, value: &str) -> Result<(), FormatError> {
        let value = value.trim();
        let invalid = || {
            FormatError::Options(format!(
                "Unsupported --{} value '{value}', expected {}",
                self.name(),
                self.value_name()
            ))
        };
        match self {
            OptionField::Indent => {
                options.indent = match value.to_ascii_lowercase().as_str() {
                    "tab" | "tabs" | "\t" => Indent::Tab,
                    n => Indent::Spaces(n.parse().map_err(|_| invalid())?),
                };
            }
            OptionField::Linebreaks => {
                options.linebreak = match value.to_ascii_lowercase().as_str() {
                    "lf" => Linebreak::Lf,
                    "crlf" => Linebreak::Crlf,
                    "cr" => Linebreak::Cr,
                    _ => return Err(invalid()),
                };
            }
            OptionField::Allman => options.allman = parse_bool(value).ok_or_else(invalid)?,
            OptionField::MaxBlankLines => {
                options.max_blank_lines = value.parse().map_err(|_| invalid())?;
            }
            OptionField::TrimWhitespace => {
                options.trim_whitespace = match value.to_ascii_lowercase().as_str() {
                    "always" => TrimWhitespace::Always,
                    "nonblank-lines" => TrimWhitespace::NonblankLines,
                    _ => return Err(invalid()),
                };
            }
            OptionField::Experimental => {
                options.experimental_rules = parse_bool(value).ok_or_else(invalid)?;
            }
            OptionField::Fragment => options.fragment = parse_bool(value).ok_or_else(invalid)?,
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "enabled" | "yes" | "on" => Some(true),
        "false" | "disabled" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Traversal configuration for the tree enumerator
#[derive(Debug, Clone)]
pub struct FileOptions {
    /// Recurse into symlink targets instead of skipping them
    pub follow_symlinks: bool,
    /// File extensions (without the dot) that are eligible for formatting
    pub supported_extensions: BTreeSet<String>,
    /// Dispatch per-file work onto the worker pool
    pub concurrently: bool,
    /// Glob patterns for files/directories to leave alone
    pub excluded: Vec<Pattern>,
}

impl Default for FileOptions {
    fn default() -> Self {
        FileOptions {
            follow_symlinks: false,
            supported_extensions: BTreeSet::from(["swift".to_string()]),
            concurrently: true,
            excluded: Vec::new(),
        }
    }
}

impl FileOptions {
    /// Check if a path has a supported extension
    #[must_use]
    pub fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.supported_extensions.contains(ext))
    }

    /// Check if a path matches any exclusion pattern
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        let path_str = path.to_string_lossy();
        self.excluded.iter().any(|pattern| {
            // Full path, then each component (covers file and directory names)
            pattern.matches(&path_str)
                || path.components().any(|component| match component {
                    Component::Normal(c) => pattern.matches(&c.to_string_lossy()),
                    _ => false,
                })
        })
    }
}
