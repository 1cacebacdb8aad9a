//! Hygiene: source-tree scans for patterns the client must not grow.
//!
//! Each pattern has a budget. Lowering a budget is welcome; raising one means
//! fixing an existing hit first.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

// Panics. A client library must not take the host process down.
const MAX_UNWRAP: usize = 0;
const MAX_EXPECT: usize = 0;
const MAX_PANIC: usize = 0;
const MAX_UNREACHABLE: usize = 0;
const MAX_TODO: usize = 0;
const MAX_UNIMPLEMENTED: usize = 0;

// Silent loss.
const MAX_SILENT_DISCARD: usize = 0;
// config env lookup, status coercion in ErrorInfo, error-envelope sniffing.
const MAX_DOT_OK: usize = 3;

// Style / structure.
const MAX_ALLOW_DEAD_CODE: usize = 0;
// Library code reports through tracing or the Notifier, never the terminal.
const MAX_LIBRARY_PRINT: usize = 0;

/// Binary entry point; the only file allowed to write to the terminal.
const BIN_ENTRY: &str = "main.rs";

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`. Unit-test siblings and test scaffolding are skipped.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn library_files() -> Vec<SourceFile> {
    source_files()
        .into_iter()
        .filter(|f| !f.path.ends_with(BIN_ENTRY))
        .collect()
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") || path_str.ends_with("test_helpers.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn count_in_source(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn assert_budget(files: &[SourceFile], pattern: &str, max: usize) {
    let hits = count_in_source(files, pattern);
    let count: usize = hits.iter().map(|(_, c)| c).sum();
    let listing = hits
        .iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(count <= max, "`{pattern}` budget exceeded: found {count}, max {max}.\n{listing}");
}

#[test]
fn source_tree_is_found() {
    assert!(
        source_files().iter().any(|f| f.path.ends_with("lib.rs")),
        "hygiene scan found no sources; run from the crate root"
    );
}

#[test]
fn unwrap_budget() {
    assert_budget(&source_files(), ".unwrap()", MAX_UNWRAP);
}

#[test]
fn expect_budget() {
    assert_budget(&source_files(), ".expect(", MAX_EXPECT);
}

#[test]
fn panic_budget() {
    assert_budget(&source_files(), "panic!(", MAX_PANIC);
}

#[test]
fn unreachable_budget() {
    assert_budget(&source_files(), "unreachable!(", MAX_UNREACHABLE);
}

#[test]
fn todo_budget() {
    assert_budget(&source_files(), "todo!(", MAX_TODO);
}

#[test]
fn unimplemented_budget() {
    assert_budget(&source_files(), "unimplemented!(", MAX_UNIMPLEMENTED);
}

#[test]
fn silent_discard_budget() {
    assert_budget(&source_files(), "let _ =", MAX_SILENT_DISCARD);
}

#[test]
fn dot_ok_budget() {
    assert_budget(&source_files(), ".ok()", MAX_DOT_OK);
}

#[test]
fn allow_dead_code_budget() {
    assert_budget(&source_files(), "#[allow(dead_code)]", MAX_ALLOW_DEAD_CODE);
}

#[test]
fn library_print_budget() {
    let files = library_files();
    assert_budget(&files, "println!(", MAX_LIBRARY_PRINT);
    assert_budget(&files, "eprintln!(", MAX_LIBRARY_PRINT);
}
