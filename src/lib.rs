//! # distpress
//!
//! A post-build output compressor for static sites. Point it at a finished
//! build directory and it writes `.gz`, `.br`, and `.zst` siblings next to
//! every compressible file, keeping a derivative only when it is strictly
//! smaller than the original.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! distpress processes a bundle through two independent stages, the first
//! producing a JSON manifest the second consumes:
//!
//! ```text
//! 1. Scan      dist/     →  manifest.json      (output dir → bundle snapshot)
//! 2. Compress  manifest  →  *.gz/*.br/*.zst    (+ compressed.json)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Host integration**: a build tool that already holds the bundle in
//!   memory calls [`compress::compress_snapshot`] directly and skips the scan.
//! - **Debuggability**: the snapshot manifest is human-readable JSON you can
//!   inspect before any derivative is written.
//! - **Testability**: the compress stage is driven entirely by the manifest,
//!   so pipeline logic is exercised without re-walking the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`snapshot`] | Stage 1 — walks the output directory, produces the bundle manifest |
//! | [`compress`] | Stage 2 — emits compressed derivatives and the merged manifest |
//! | [`codec`] | The three codecs (gzip, Brotli, Zstandard) at fixed maximum levels |
//! | [`eligible`] | Eligibility rules: non-empty content, extension in the eligible set |
//! | [`config`] | `config.toml` loading, validation, merging |
//! | [`types`] | Shared types serialized between stages |
//! | [`output`] | CLI output formatting — per-artifact display of compression results |
//!
//! # Design Decisions
//!
//! ## Keep Only Strictly Smaller
//!
//! Serving a compressed representation that is not smaller than the original
//! wastes both storage and decode time, so a derivative is discarded unless
//! its byte length beats the source. Each codec decides independently: gzip's
//! container overhead can lose on a file where Brotli still wins, and that is
//! intended behavior, not an inconsistency.
//!
//! ## Maximum Levels, Once Per Build
//!
//! Derivatives are produced once at build time and served many times, so all
//! three codecs run at their maximum settings (gzip 9, Brotli quality 11,
//! Zstandard 22). Encode time is the wrong thing to optimize at this point in
//! the lifecycle.
//!
//! ## Explicit Registration
//!
//! The compress stage returns accepted derivatives as a value; callers merge
//! them into their manifest. Nothing mutates shared registration state behind
//! the caller's back, which keeps host-tool embedding and testing honest.
//!
//! ## Originals Stay Untouched
//!
//! The bundle is read-only input. A failed compress run leaves a fully
//! servable uncompressed site on disk; derivative writes go through
//! write-then-rename so a partial file is never visible.

pub mod codec;
pub mod compress;
pub mod config;
pub mod eligible;
pub mod output;
pub mod snapshot;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
