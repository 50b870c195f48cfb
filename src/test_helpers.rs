//! Shared test utilities for the distpress test suite.
//!
//! Provides a canonical dist-directory fixture plus lookup helpers over
//! compress reports. Tests get an isolated temp copy they can mutate without
//! affecting other tests.

use crate::compress::CompressReport;
use crate::types::Derivative;
use std::fs;
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Build a small finished-bundle directory covering every eligibility case:
///
/// ```text
/// dist/
/// ├── index.html       # eligible, compressible
/// ├── main.css         # eligible, compressible
/// ├── empty.css        # eligible extension, zero-length → skipped
/// ├── logo.png         # binary, ineligible extension → skipped
/// └── assets/
///     └── app.js       # eligible, 10 000 bytes of repetitive text
/// ```
pub fn setup_dist() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("assets")).unwrap();
    fs::write(
        tmp.path().join("index.html"),
        "<!doctype html><html><head><title>home</title></head><body><main><p>hello</p><p>hello</p><p>hello</p></main></body></html>",
    )
    .unwrap();
    fs::write(
        tmp.path().join("main.css"),
        ".card{margin:0;padding:0}\n".repeat(12),
    )
    .unwrap();
    fs::write(tmp.path().join("empty.css"), "").unwrap();
    fs::write(tmp.path().join("logo.png"), [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a]).unwrap();
    fs::write(tmp.path().join("assets/app.js"), repetitive_js(10_000)).unwrap();
    tmp
}

/// Exactly `len` bytes of highly repetitive JS-looking text.
pub fn repetitive_js(len: usize) -> String {
    let mut body = "export const answer = 42; // the answer to everything\n"
        .repeat(len / 50 + 1);
    body.truncate(len);
    body
}

// =========================================================================
// Report lookups — panics with a clear message on miss
// =========================================================================

/// Derivative file names in report order.
pub fn derivative_names(report: &CompressReport) -> Vec<&str> {
    report
        .derivatives
        .iter()
        .map(|d| d.file_name.as_str())
        .collect()
}

/// Find a derivative by file name. Panics if not found.
pub fn find_derivative<'a>(report: &'a CompressReport, file_name: &str) -> &'a Derivative {
    report
        .derivatives
        .iter()
        .find(|d| d.file_name == file_name)
        .unwrap_or_else(|| {
            let names = derivative_names(report);
            panic!("derivative '{file_name}' not found. Available: {names:?}")
        })
}
