//! Batch formatting of file trees.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::cache::Cache;
use super::enumerate::{enumerate_files, Commit};
use crate::error::FormatError;
use crate::format::{format, FormatRule};
use crate::options::{FileOptions, FormatOptions};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a batch run needs besides its input roots
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub rules: &'a [FormatRule],
    pub options: &'a FormatOptions,
    pub file_options: &'a FileOptions,
    /// Cache file to consult and update; `None` disables caching
    pub cache_path: Option<&'a Path>,
    /// Ignore existing cache contents (the file is still rewritten)
    pub clear_cache: bool,
    /// Report what would change without writing files or the cache
    pub dry_run: bool,
}

/// Outcome of [`Batch::run`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Files whose output was (or, in a dry run, would be) written
    pub files_written: usize,
    /// Files that were read and considered, including failed ones
    pub files_checked: usize,
    pub errors: Vec<FormatError>,
}

/// Aggregation state mutated only by commits
struct BatchState {
    cache: Option<Cache>,
    files_written: usize,
    files_checked: usize,
}

impl<'a> Batch<'a> {
    /// A run with no cache that writes its output
    #[must_use]
    pub fn new(
        rules: &'a [FormatRule],
        options: &'a FormatOptions,
        file_options: &'a FileOptions,
    ) -> Self {
        Batch {
            rules,
            options,
            file_options,
            cache_path: None,
            clear_cache: false,
            dry_run: false,
        }
    }

    /// Format every eligible file below each of `inputs`
    ///
    /// With `output` set, results are mirrored under it instead of being
    /// written in place. A failure in one file never affects the others.
    #[must_use]
    pub fn run(&self, inputs: &[PathBuf], output: Option<&Path>) -> BatchReport {
        let snapshot = self.cache_path.map(|path| {
            if self.clear_cache {
                Cache::empty(path)
            } else {
                Cache::load(path)
            }
        });
        let prefix = format!("{VERSION};{}", self.options.serialized());

        let mut state = BatchState {
            cache: snapshot.clone(),
            files_written: 0,
            files_checked: 0,
        };
        let mut errors = Vec::new();

        for input in inputs {
            if let Err(error) = self.validate_root(input) {
                errors.push(error);
                continue;
            }
            errors.extend(enumerate_files(
                input,
                output,
                self.file_options,
                &mut state,
                |input, output| self.process_file(input, output, snapshot.as_ref(), &prefix),
            ));
        }

        if state.files_checked == 0 {
            let roots = inputs
                .iter()
                .map(|input| input.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            errors.push(FormatError::Options(format!(
                "No eligible files found at {roots}"
            )));
        } else if let (Some(path), Some(cache)) = (self.cache_path, &state.cache) {
            if !self.dry_run {
                if let Err(error) = cache.save(path) {
                    errors.push(error);
                }
            }
        }

        BatchReport {
            files_written: state.files_written,
            files_checked: state.files_checked,
            errors,
        }
    }

    /// Reject roots that can never produce output
    fn validate_root(&self, input: &Path) -> Result<(), FormatError> {
        let Ok(metadata) = fs::symlink_metadata(input) else {
            // Missing roots are reported by the enumerator
            return Ok(());
        };
        let is_dir = if metadata.file_type().is_symlink() {
            if !self.file_options.follow_symlinks {
                return Err(FormatError::Options(format!(
                    "Symbolic link at {} was ignored",
                    input.display()
                )));
            }
            input.is_dir()
        } else {
            metadata.is_dir()
        };
        if !is_dir && !self.file_options.supports(input) {
            return Err(FormatError::Options(format!(
                "Unsupported file type '{}'",
                input.display()
            )));
        }
        Ok(())
    }

    /// Per-file work: everything except bookkeeping happens here
    fn process_file(
        &self,
        input: &Path,
        output: &Path,
        cache: Option<&Cache>,
        prefix: &str,
    ) -> Commit<BatchState> {
        let source = match fs::read_to_string(input) {
            Ok(source) => source,
            Err(e) => {
                return failed(FormatError::Reading(format!(
                    "Failed to read file {}: {e}",
                    input.display()
                )));
            }
        };

        let key = cache.map(|cache| cache.key(input));
        let fresh = format!("{prefix};{}", source.len());
        let cached = cache
            .zip(key.as_deref())
            .and_then(|(cache, key)| cache.get(key))
            .is_some_and(|value| value == fresh);

        let formatted = if cached {
            debug!(path = %input.display(), "unchanged since last run");
            source.clone()
        } else {
            debug!(path = %input.display(), "formatting");
            match format(&source, self.rules, self.options) {
                Ok(formatted) => formatted,
                Err(FormatError::Parsing(msg)) => {
                    return failed(FormatError::Parsing(format!(
                        "{msg} in {}",
                        input.display()
                    )));
                }
                Err(error) => return failed(error),
            }
        };

        let entry = key.map(|key| (key, format!("{prefix};{}", formatted.len())));
        let up_to_date = if output == input {
            formatted == source
        } else {
            fs::read_to_string(output).is_ok_and(|existing| existing == formatted)
        };

        if up_to_date {
            return Box::new(move |state: &mut BatchState| {
                state.files_checked += 1;
                state.refresh(entry);
                Ok(())
            });
        }

        if self.dry_run {
            debug!(path = %output.display(), "would rewrite");
            return Box::new(|state: &mut BatchState| {
                state.files_checked += 1;
                state.files_written += 1;
                Ok(())
            });
        }

        let written = write_output(output, &formatted);
        if written.is_ok() {
            debug!(path = %output.display(), "rewrote");
        }
        Box::new(move |state: &mut BatchState| {
            state.files_checked += 1;
            written?;
            state.files_written += 1;
            state.refresh(entry);
            Ok(())
        })
    }
}

impl BatchState {
    fn refresh(&mut self, entry: Option<(String, String)>) {
        if let (Some(cache), Some((key, value))) = (self.cache.as_mut(), entry) {
            cache.insert(key, value);
        }
    }
}

/// Commit for a file that failed before producing output
fn failed(error: FormatError) -> Commit<BatchState> {
    Box::new(move |state: &mut BatchState| {
        state.files_checked += 1;
        Err(error)
    })
}

fn write_output(path: &Path, contents: &str) -> Result<(), FormatError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            FormatError::Writing(format!(
                "Failed to create directory at {}: {e}",
                parent.display()
            ))
        })?;
    }
    fs::write(path, contents).map_err(|e| {
        FormatError::Writing(format!("Failed to write file {}: {e}", path.display()))
    })
}
