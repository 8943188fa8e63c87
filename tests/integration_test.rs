//! Integration tests for rulefmt
//!
//! These tests run whole batches over scratch directory trees and check the
//! files, counters, errors and cache they leave behind.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rulefmt::format::{default_rules, format};
use rulefmt::parser::tokenize;
use rulefmt::process::{Batch, BatchReport};
use rulefmt::{FileOptions, FormatError, FormatOptions};
use tempfile::TempDir;
use walkdir::WalkDir;

const MESSY: &str = "func f( a:Int ){\nreturn a\n}";
const CLEAN: &str = "func f(a:Int) {\n    return a\n}\n";

fn write(root: &Path, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

fn run(
    inputs: &[PathBuf],
    output: Option<&Path>,
    cache_path: Option<&Path>,
    concurrently: bool,
) -> BatchReport {
    let options = FormatOptions::default();
    let rules = default_rules(&options);
    let file_options = FileOptions {
        concurrently,
        ..Default::default()
    };
    let batch = Batch {
        cache_path,
        ..Batch::new(&rules, &options, &file_options)
    };
    batch.run(inputs, output)
}

/// Relative path and contents of every file below `root`
fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(Result::unwrap)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            (
                entry.path().strip_prefix(root).unwrap().to_path_buf(),
                fs::read(entry.path()).unwrap(),
            )
        })
        .collect()
}

#[test]
fn test_formats_tree_in_place() {
    let tmp = TempDir::new().unwrap();
    let a = write(tmp.path(), "a.swift", MESSY);
    let b = write(tmp.path(), "nested/b.swift", CLEAN);
    let notes = write(tmp.path(), "notes.txt", MESSY);

    let report = run(&[tmp.path().to_path_buf()], None, None, true);
    assert_eq!(report.errors, vec![]);
    assert_eq!(report.files_checked, 2);
    assert_eq!(report.files_written, 1);
    assert_eq!(fs::read_to_string(a).unwrap(), CLEAN);
    assert_eq!(fs::read_to_string(b).unwrap(), CLEAN);
    assert_eq!(fs::read_to_string(notes).unwrap(), MESSY);
}

#[test]
fn test_output_tree_is_mirrored() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("out");
    write(&src, "a.swift", MESSY);
    write(&src, "sub/deeper/b.swift", MESSY);

    let report = run(&[src.clone()], Some(&out), None, true);
    assert_eq!(report.errors, vec![]);
    assert_eq!(report.files_written, 2);
    assert_eq!(fs::read_to_string(out.join("a.swift")).unwrap(), CLEAN);
    assert_eq!(
        fs::read_to_string(out.join("sub/deeper/b.swift")).unwrap(),
        CLEAN
    );
    // Inputs are untouched
    assert_eq!(fs::read_to_string(src.join("a.swift")).unwrap(), MESSY);

    // Outputs already up to date: nothing to write the second time
    let report = run(&[src], Some(&out), None, true);
    assert_eq!((report.files_checked, report.files_written), (2, 0));
}

#[test]
fn test_cache_skips_unchanged_files() {
    let tmp = TempDir::new().unwrap();
    let file = write(tmp.path(), "src/a.swift", MESSY);
    let cache = tmp.path().join("cache.json");

    let first = run(&[tmp.path().join("src")], None, Some(&cache), false);
    assert_eq!(first.errors, vec![]);
    assert_eq!(first.files_written, 1);
    assert!(cache.is_file());

    // Same length as the cached output, so the file is not even tokenized
    let unparseable = "}".repeat(CLEAN.len());
    fs::write(&file, &unparseable).unwrap();

    let second = run(&[tmp.path().join("src")], None, Some(&cache), false);
    assert_eq!(second.errors, vec![]);
    assert_eq!((second.files_checked, second.files_written), (1, 0));
    assert_eq!(fs::read_to_string(&file).unwrap(), unparseable);
}

#[test]
fn test_cache_miss_after_length_change() {
    let tmp = TempDir::new().unwrap();
    let file = write(tmp.path(), "a.swift", MESSY);
    let cache = tmp.path().join("cache.json");

    run(&[file.clone()], None, Some(&cache), false);
    fs::write(&file, format!("{CLEAN}let x=1\n")).unwrap();

    let report = run(&[file.clone()], None, Some(&cache), false);
    assert_eq!(report.files_written, 1);
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        format!("{CLEAN}let x = 1\n")
    );
}

#[test]
fn test_one_bad_file_does_not_affect_the_others() {
    let tmp = TempDir::new().unwrap();
    let a = write(tmp.path(), "a.swift", MESSY);
    let b = write(tmp.path(), "b.swift", [0xff, 0xfe, 0x00, 0x80]);
    let c = write(tmp.path(), "c.swift", MESSY);

    let report = run(&[tmp.path().to_path_buf()], None, None, true);
    assert_eq!(report.files_checked, 3);
    assert_eq!(report.files_written, 2);
    assert_eq!(report.errors.len(), 1);
    let FormatError::Reading(message) = &report.errors[0] else {
        panic!("expected a reading error, got {:?}", report.errors[0]);
    };
    assert!(message.contains("b.swift"), "{message}");
    assert_eq!(fs::read_to_string(a).unwrap(), CLEAN);
    assert_eq!(fs::read(b).unwrap(), vec![0xff, 0xfe, 0x00, 0x80]);
    assert_eq!(fs::read_to_string(c).unwrap(), CLEAN);
}

#[test]
fn test_parse_error_is_reported_per_file() {
    let tmp = TempDir::new().unwrap();
    let good = write(tmp.path(), "good.swift", MESSY);
    let bad = write(tmp.path(), "bad.swift", "let x = 1\n}\n");

    let report = run(&[tmp.path().to_path_buf()], None, None, true);
    assert_eq!(
        report.errors,
        vec![FormatError::Parsing(format!(
            "unexpected token '}}' in {}",
            bad.display()
        ))]
    );
    assert_eq!(fs::read_to_string(good).unwrap(), CLEAN);
    assert_eq!(fs::read_to_string(bad).unwrap(), "let x = 1\n}\n");
}

#[test]
fn test_concurrent_and_sequential_runs_match() {
    let sources = [
        MESSY,
        CLEAN,
        "let a=[ 1 ,2 ]\n\n\n\nlet b = a",
        "if a\n{\nb()\n}\nelse\n{\nc()\n}\n",
        "struct S {\n\n  var x: Int\n\n}\n",
    ];
    let trees: Vec<TempDir> = (0..2).map(|_| TempDir::new().unwrap()).collect();
    for tree in &trees {
        for i in 0..20 {
            let name = format!("src/mod{}/file{i}.swift", i % 4);
            write(tree.path(), &name, sources[i % sources.len()]);
        }
    }

    let reports: Vec<BatchReport> = trees
        .iter()
        .zip([false, true])
        .map(|(tree, concurrently)| {
            let cache = tree.path().join("cache.json");
            run(&[tree.path().join("src")], None, Some(&cache), concurrently)
        })
        .collect();

    assert_eq!(reports[0], reports[1]);
    assert_eq!(reports[0].files_checked, 20);
    assert_eq!(snapshot(trees[0].path()), snapshot(trees[1].path()));
}

#[test]
fn test_no_eligible_files() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "readme.md", "# hi\n");
    let cache = tmp.path().join("cache.json");

    let report = run(&[tmp.path().to_path_buf()], None, Some(&cache), true);
    assert_eq!(
        report.errors,
        vec![FormatError::Options(format!(
            "No eligible files found at {}",
            tmp.path().display()
        ))]
    );
    assert!(!cache.exists());
}

#[test]
fn test_missing_root_is_reported() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing.swift");
    let present = write(tmp.path(), "present.swift", MESSY);

    let report = run(&[missing.clone(), present.clone()], None, None, true);
    assert_eq!(
        report.errors,
        vec![FormatError::Reading(format!(
            "File not found at {}",
            missing.display()
        ))]
    );
    assert_eq!(fs::read_to_string(present).unwrap(), CLEAN);
}

#[test]
fn test_cache_directory_missing() {
    let tmp = TempDir::new().unwrap();
    let file = write(tmp.path(), "a.swift", MESSY);
    let dir = tmp.path().join("no-such-dir");

    let report = run(&[file], None, Some(&dir.join("cache.json")), true);
    assert_eq!(report.files_written, 1);
    assert_eq!(
        report.errors,
        vec![FormatError::Reading(format!(
            "Cache directory does not exist: {}",
            dir.display()
        ))]
    );
}

#[cfg(unix)]
#[test]
fn test_symlink_root_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let real = tmp.path().join("real");
    write(&real, "a.swift", MESSY);
    let link = tmp.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let report = run(&[link.clone()], None, None, true);
    assert_eq!(
        report.errors,
        vec![
            FormatError::Options(format!("Symbolic link at {} was ignored", link.display())),
            FormatError::Options(format!("No eligible files found at {}", link.display())),
        ]
    );
    assert_eq!(fs::read_to_string(real.join("a.swift")).unwrap(), MESSY);
}

#[test]
fn test_format_is_idempotent() {
    let options = FormatOptions::default();
    let rules = default_rules(&options);
    let inputs = [
        MESSY,
        "",
        "\n\n\n",
        "// just a comment",
        "let s = \"a  ,b\"\nlet t=s",
        "func   f( ){\n\n\n\nif a{\nb=c;\n\n}\n\n\n}",
        "foo({\nbar( 1 ,2 )\n})\n",
        "let x = [\n1,\n2,\n]\n",
        "/* block\n   comment */\nclass A{}\r\nclass B {}\r\n",
    ];
    for input in inputs {
        let once = format(input, &rules, &options)
            .unwrap_or_else(|e| panic!("failed on {input:?}: {e}"));
        let twice = format(&once, &rules, &options).unwrap();
        assert_eq!(once, twice, "not idempotent for {input:?}");
    }
}

/// Several thousand tokens of inconsistent spacing, bracing and blank lines
fn messy_source(blocks: usize) -> String {
    (0..blocks)
        .map(|i| {
            format!(
                "// block {i}\nfunc f{i}( a:Int ,b:Int )->Int{{\n\n\n\
                 if a>b{{\nreturn a;\n}}\nelse\n{{\n  let s = \"x  ,y\"   \n\
                 let x=[ 1 ,2 ]\n\n\n\nreturn foo( b ,{{\nbar( x )\n}} )\n}}\n\n}}\n\n\n"
            )
        })
        .collect()
}

#[test]
fn test_default_rules_converge_on_large_input() {
    let source = messy_source(80);
    assert!(tokenize(&source).len() > 5_000);

    for allman in [false, true] {
        let options = FormatOptions {
            allman,
            experimental_rules: true,
            ..FormatOptions::default()
        };
        let rules = default_rules(&options);
        let once = format(&source, &rules, &options)
            .unwrap_or_else(|e| panic!("allman={allman}: {e}"));
        let twice = format(&once, &rules, &options).unwrap();
        assert_eq!(once, twice, "not idempotent with allman={allman}");
    }
}
