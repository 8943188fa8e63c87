//! rulefmt - Rule-based batch source formatter

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{self, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use rulefmt::format::{format, select_rules, FormatRule};
use rulefmt::infer::infer_from_paths;
use rulefmt::options::FormatOptions;
use rulefmt::process::{Batch, Cache};
use rulefmt::{build_cli, parse_args, CliArgs, Config, FormatError, Result, SymlinkMode};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let args = parse_args();
    init_tracing(&args);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `-v`/`-q` win over `RULEFMT_LOG`
fn init_tracing(args: &CliArgs) {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else if args.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_env("RULEFMT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false).without_time())
        .with(filter)
        .init();
}

fn run(args: &CliArgs) -> Result<ExitCode> {
    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    // No inputs and nothing piped in: show usage instead of waiting on stdin
    if args.inputs.is_empty() && io::stdin().is_terminal() {
        build_cli().print_help()?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = build_config(args)?;
    if let Some(msg) = config.options.validate() {
        bail!("invalid options: {msg}");
    }
    let rules = select_rules(config.rules.as_deref(), &config.disable, &config.options)?;
    debug!(
        rules = %rules.iter().map(|rule| rule.name).collect::<Vec<_>>().join(","),
        options = %config.options.serialized(),
        "configured"
    );

    if use_stdin {
        return process_stdin(&rules, &config.options);
    }

    if let Some(jobs) = args.jobs.filter(|&jobs| jobs > 0) {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
        {
            warn!("failed to configure thread pool: {e}");
        }
    }
    let concurrently = !args.sequential && args.jobs != Some(1);
    let file_options = config.file_options(concurrently)?;

    // Absolute paths keep cache keys independent of the working directory
    let inputs = args
        .inputs
        .iter()
        .map(path::absolute)
        .collect::<io::Result<Vec<_>>>()?;

    if args.infer_options {
        let (options, errors) = infer_from_paths(&inputs, &file_options);
        println!("{}", options.serialized());
        return Ok(report_errors(&errors));
    }

    let (cache_path, clear_cache) = cache_location(args.cache.as_deref())?;
    let output = args.output.as_deref().map(path::absolute).transpose()?;

    let batch = Batch {
        rules: &rules,
        options: &config.options,
        file_options: &file_options,
        cache_path: cache_path.as_deref(),
        clear_cache,
        dry_run: args.dry_run,
    };
    let report = batch.run(&inputs, output.as_deref());

    if !args.quiet {
        let verb = if args.dry_run { "Would format" } else { "Formatted" };
        eprintln!(
            "{verb} {} of {} files.",
            report.files_written, report.files_checked
        );
    }
    Ok(report_errors(&report.errors))
}

/// Merge config files with CLI overrides
fn build_config(args: &CliArgs) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        debug!(path = %config_path.display(), "using explicit config file");
        Config::from_toml_file(config_path)?
    } else {
        let start = match args.inputs.first() {
            Some(input) if input.as_os_str() != "-" => input.clone(),
            _ => std::env::current_dir()?,
        };
        Config::from_discovered_files(&start)
    };

    if !args.extensions.is_empty() {
        config.extensions = args
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();
    }
    config.exclude.extend(args.exclude.iter().cloned());
    if let Some(mode) = &args.symlinks {
        config.symlinks = SymlinkMode::from_name(mode)?;
    }
    if let Some(rules) = &args.rules {
        config.rules = Some(rules.clone());
    }
    config.disable.extend(args.disable.iter().cloned());
    for (field, value) in &args.options {
        field.apply(&mut config.options, value)?;
    }
    Ok(config)
}

/// Resolve `--cache` into a path and whether to start from scratch
fn cache_location(mode: Option<&str>) -> Result<(Option<PathBuf>, bool)> {
    let (path, clear) = match mode {
        Some("ignore") => return Ok((None, false)),
        Some("clear") => (Cache::default_path(), true),
        Some(explicit) => return Ok((Some(path::absolute(explicit)?), false)),
        None => (Cache::default_path(), false),
    };
    let Some(path) = path else {
        warn!("no cache directory available, caching disabled");
        return Ok((None, false));
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create cache directory {}", dir.display()))?;
    }
    Ok((Some(path), clear))
}

fn process_stdin(rules: &[FormatRule], options: &FormatOptions) -> Result<ExitCode> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("failed to read stdin")?;

    match format(&source, rules, options) {
        Ok(output) => {
            io::stdout().write_all(output.as_bytes())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => Ok(report_errors(&[error])),
    }
}

fn report_errors(errors: &[FormatError]) -> ExitCode {
    for error in errors {
        eprintln!("error: {error}");
    }
    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
