//! CLI output formatting for both pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**: every artifact leads
//! with its positional index and name, with sizes and per-codec outcomes as
//! indented context lines.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Bundle
//! 001 assets/app.js (code, 9.8 KiB)
//! 002 index.html (asset, 13 B)
//! 003 logo.png (asset, 2.4 KiB)
//!
//! Eligible: 2 of 3 artifacts
//! ```
//!
//! ## Compress
//!
//! ```text
//! 001 assets/app.js (9.8 KiB)
//!     gz: 1.2 KiB (87% smaller)
//!     br: 1.0 KiB (89% smaller)
//!     zst: 1.1 KiB (88% smaller)
//! 002 index.html (13 B)
//!     gz: not smaller
//!     br: not smaller
//!     zst: not smaller
//!
//! Wrote 3 derivatives for 2 eligible artifacts (1 skipped), 3.3 KiB from 9.8 KiB
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::compress::{CompressEvent, CompressReport, DerivativeStatus};
use crate::snapshot::Manifest;
use crate::types::ArtifactKind;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte count: exact below 1 KiB, one decimal above.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

/// Percentage saved by a derivative, floored. `original` is non-zero for any
/// eligible artifact.
fn percent_smaller(original: u64, compressed: u64) -> u64 {
    ((original - compressed) * 100) / original
}

fn kind_label(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Asset => "asset",
        ArtifactKind::Code => "code",
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the discovered bundle.
pub fn format_scan_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Bundle".to_string());

    for (i, artifact) in manifest.artifacts.iter().enumerate() {
        lines.push(format!(
            "{} {} ({}, {})",
            format_index(i + 1),
            artifact.file_name,
            kind_label(artifact.kind),
            format_bytes(artifact.size)
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Eligible: {} of {} artifacts",
        manifest.eligible_artifacts().len(),
        manifest.artifacts.len()
    ));
    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest) {
    for line in format_scan_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Compress output
// ============================================================================

/// Format one compress progress event.
pub fn format_compress_event(event: &CompressEvent) -> Vec<String> {
    let CompressEvent::ArtifactCompressed {
        index,
        file_name,
        original_size,
        outcomes,
    } = event;

    let mut lines = vec![format!(
        "{} {} ({})",
        format_index(*index),
        file_name,
        format_bytes(*original_size)
    )];
    for outcome in outcomes {
        let line = match outcome.status {
            DerivativeStatus::Written { size } => format!(
                "    {}: {} ({}% smaller)",
                outcome.codec.label(),
                format_bytes(size),
                percent_smaller(*original_size, size)
            ),
            DerivativeStatus::NotSmaller => {
                format!("    {}: not smaller", outcome.codec.label())
            }
        };
        lines.push(line);
    }
    lines
}

/// Format the compress summary line.
///
/// The size pair compares total derivative bytes against the originals they
/// were derived from (each source counted once).
pub fn format_compress_summary(report: &CompressReport) -> Vec<String> {
    let derivative_total: u64 = report.derivatives.iter().map(|d| d.size).sum();
    let mut seen = std::collections::BTreeSet::new();
    let source_total: u64 = report
        .derivatives
        .iter()
        .filter(|d| seen.insert(d.source_file_name.as_str()))
        .map(|d| d.original_size)
        .sum();

    vec![
        String::new(),
        format!(
            "Wrote {} derivatives for {} eligible artifacts ({} skipped), {} from {}",
            report.derivatives.len(),
            report.eligible,
            report.skipped,
            format_bytes(derivative_total),
            format_bytes(source_total)
        ),
    ]
}

/// Print one compress event to stdout.
pub fn print_compress_event(event: &CompressEvent) {
    for line in format_compress_event(event) {
        println!("{}", line);
    }
}

/// Print the compress summary to stdout.
pub fn print_compress_summary(report: &CompressReport) {
    for line in format_compress_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
