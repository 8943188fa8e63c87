//! Command-line interface for rulefmt.
//!
//! Defines CLI arguments using clap builder API. The style options are
//! generated from [`OptionField::ALL`], so every field has a matching flag.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::options::OptionField;

/// CLI arguments parsed from command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Files or directories to format; empty or `-` reads stdin
    pub inputs: Vec<PathBuf>,

    /// Mirror output under this path instead of formatting in place
    pub output: Option<PathBuf>,

    /// Config file path (disables discovery)
    pub config: Option<PathBuf>,

    /// Cache file path, `ignore` or `clear`
    pub cache: Option<String>,

    /// `follow` or `ignore`
    pub symlinks: Option<String>,

    /// Eligible file extensions
    pub extensions: Vec<String>,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Run only these rules
    pub rules: Option<Vec<String>>,

    /// Skip these rules
    pub disable: Vec<String>,

    /// Style options given on the command line, in schema order
    pub options: Vec<(OptionField, String)>,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Process files one at a time
    pub sequential: bool,

    /// Report what would change without writing anything
    pub dry_run: bool,

    /// Print options inferred from the inputs instead of formatting
    pub infer_options: bool,

    pub verbose: bool,

    pub quiet: bool,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("rulefmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rule-based source formatter for brace-delimited languages")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to format (reads stdin when omitted or \"-\")")
                .value_name("PATH")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write output under this path instead of in place")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a config file (disables config discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("cache")
                .long("cache")
                .help("Cache file path, \"ignore\" to disable or \"clear\" to reset")
                .value_name("PATH|ignore|clear"),
        )
        .arg(
            Arg::new("symlinks")
                .long("symlinks")
                .help("How symbolic links are treated [default: ignore]")
                .value_name("MODE")
                .value_parser(["follow", "ignore"]),
        )
        .arg(
            Arg::new("exts")
                .long("exts")
                .help("Comma-delimited list of file extensions to format [default: swift]")
                .value_name("EXTS")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching glob pattern (can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("rules")
                .long("rules")
                .help("Comma-delimited list of rules to run instead of the defaults")
                .value_name("RULES")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("disable")
                .long("disable")
                .help("Comma-delimited list of rules to skip")
                .value_name("RULES")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .args(OptionField::ALL.into_iter().map(option_arg))
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("sequential")
                .long("sequential")
                .help("Format files one at a time")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Report files that would change without writing them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("infer-options")
                .long("infer-options")
                .help("Print the style options that best match the inputs")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every file as it is processed")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print errors")
                .action(ArgAction::SetTrue),
        )
}

/// One `--name value` argument per style option
fn option_arg(field: OptionField) -> Arg {
    Arg::new(field.name())
        .long(field.name())
        .help(field.help())
        .value_name(field.value_name())
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|vals| vals.map(|v| v.trim().to_string()).collect())
            .unwrap_or_default()
    };

    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        output: matches.get_one::<PathBuf>("output").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        cache: matches.get_one::<String>("cache").cloned(),
        symlinks: matches.get_one::<String>("symlinks").cloned(),
        extensions: strings("exts"),
        exclude: strings("exclude"),
        rules: matches.contains_id("rules").then(|| strings("rules")),
        disable: strings("disable"),
        options: OptionField::ALL
            .into_iter()
            .filter_map(|field| {
                matches
                    .get_one::<String>(field.name())
                    .map(|value| (field, value.clone()))
            })
            .collect(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        sequential: matches.get_flag("sequential"),
        dry_run: matches.get_flag("dry-run"),
        infer_options: matches.get_flag("infer-options"),
        verbose: matches.get_flag("verbose"),
        quiet: matches.get_flag("quiet"),
    }
}
