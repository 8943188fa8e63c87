//! rulefmt - Rule-based batch source formatter
//!
//! Tokenizes brace-delimited source files, runs an ordered list of rewrite
//! rules over each until nothing changes, and writes the results back across
//! whole directory trees on a worker pool, skipping files an incremental
//! cache knows to be up to date.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod infer;
pub mod options;
pub mod parser;
pub mod process;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::{Config, SymlinkMode};
pub use error::{FormatError, Result};
pub use options::{FileOptions, FormatOptions, OptionField};
