//! Tree enumeration and per-file work dispatch
//!
//! [`enumerate_files`] walks an input root and hands every eligible file to
//! a work callback. The callback does the expensive part (read, format,
//! write) and returns a [`Commit`]: a deferred closure that records the
//! outcome in the caller's aggregation state.
//!
//! In concurrent mode the callbacks run on the rayon pool and their commits
//! are funnelled through a channel. Commits only ever run on the calling
//! thread, after every worker has finished, so the aggregation state needs
//! no locking.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::FormatError;
use crate::options::FileOptions;

/// Deferred side effect produced by per-file work
pub type Commit<S> = Box<dyn FnOnce(&mut S) -> Result<(), FormatError> + Send>;

/// Walk `input` and run `work` for every eligible file
///
/// `output` is the root that output paths are mirrored under; `None` means
/// files are rewritten in place. Errors from the walk and from commits are
/// collected and returned; none of them stop the traversal.
///
/// A call made from inside a rayon worker never forks again: only the
/// top-level enumeration dispatches to the pool.
pub fn enumerate_files<S, F>(
    input: &Path,
    output: Option<&Path>,
    options: &FileOptions,
    state: &mut S,
    work: F,
) -> Vec<FormatError>
where
    F: Fn(&Path, &Path) -> Commit<S> + Sync,
{
    let output = output.unwrap_or(input);
    let concurrent = options.concurrently && rayon::current_thread_index().is_none();

    if !concurrent {
        return walk(input, output, options, &mut |input, output| {
            work(input, output)(state)
        });
    }

    // Discovery: collect every pair first, without side effects
    let mut pairs: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut errors = walk(input, output, options, &mut |input, output| {
        pairs.push((input.to_path_buf(), output.to_path_buf()));
        Ok(())
    });
    debug!(root = %input.display(), files = pairs.len(), "dispatching to worker pool");

    let (sender, receiver) = crossbeam_channel::unbounded::<Commit<S>>();
    pairs.par_iter().for_each(|(input, output)| {
        // The receiver outlives every worker, so this cannot fail
        let _ = sender.send(work(input.as_path(), output.as_path()));
    });
    drop(sender);

    for commit in receiver.try_iter() {
        if let Err(error) = commit(state) {
            errors.push(error);
        }
    }
    errors
}

/// Visit every eligible file under `input`, mirroring paths under `output`
fn walk(
    input: &Path,
    output: &Path,
    options: &FileOptions,
    visit: &mut dyn FnMut(&Path, &Path) -> Result<(), FormatError>,
) -> Vec<FormatError> {
    let mut errors = Vec::new();

    let metadata = match fs::symlink_metadata(input) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return vec![FormatError::Reading(format!(
                "File not found at {}",
                input.display()
            ))];
        }
        Err(e) => {
            return vec![FormatError::Reading(format!(
                "Failed to read attributes for {}: {e}",
                input.display()
            ))];
        }
    };

    let metadata = if metadata.file_type().is_symlink() {
        if !options.follow_symlinks {
            return errors;
        }
        match fs::metadata(input) {
            Ok(resolved) => resolved,
            Err(e) => {
                return vec![FormatError::Reading(format!(
                    "Failed to read attributes for {}: {e}",
                    input.display()
                ))];
            }
        }
    } else {
        metadata
    };

    if metadata.is_file() {
        if options.supports(input) {
            // A single file written into an existing directory keeps its name
            let target = match input.file_name() {
                Some(name) if output != input && output.is_dir() => output.join(name),
                _ => output.to_path_buf(),
            };
            if let Err(error) = visit(input, target.as_path()) {
                errors.push(error);
            }
        }
        return errors;
    }

    if !metadata.is_dir() {
        return errors;
    }

    let entries = WalkDir::new(input)
        .follow_links(options.follow_symlinks)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry) && !is_excluded(entry, input, options));

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(input).to_path_buf();
                errors.push(FormatError::Reading(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
                continue;
            }
        };
        // Symlinks only show up here when they are not being followed
        if !entry.file_type().is_file() || !options.supports(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(input) else {
            continue;
        };
        let target = output.join(relative);
        if let Err(error) = visit(entry.path(), target.as_path()) {
            errors.push(error);
        }
    }
    errors
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Exclusion globs match against the path below the root, so a pattern
/// never rejects an explicitly requested root because of its ancestors
fn is_excluded(entry: &DirEntry, root: &Path, options: &FileOptions) -> bool {
    entry
        .path()
        .strip_prefix(root)
        .is_ok_and(|relative| options.is_excluded(relative))
}
