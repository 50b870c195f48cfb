//! Derivative generation — the post-build compression stage.
//!
//! Stage 2 of the distpress pipeline. Takes the bundle manifest from the scan
//! stage (or an in-memory snapshot from a host build tool) and, for every
//! eligible artifact, emits compressed sibling files next to the originals:
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── index.html.gz            # gzip level 9
//! ├── index.html.br            # Brotli quality 11
//! ├── index.html.zst           # Zstandard level 22
//! └── assets/
//!     ├── app.js
//!     ├── app.js.gz
//!     └── ...
//! ```
//!
//! A derivative is kept only when strictly smaller than its source; each
//! codec decides independently, so gzip may be skipped for a file while
//! Brotli is kept. Originals are never touched.
//!
//! Accepted derivatives are returned as an explicit list (no hidden mutable
//! registration side-channel); the CLI merges them into the compressed
//! manifest.
//!
//! ## Invocation Contract
//!
//! Runs once per build, after all originals are on disk. Processes the full
//! snapshot before returning; there is no cancellation mid-run. Codec and
//! filesystem failures abort the run — derivatives are optional, but a failed
//! write means the environment is broken (disk full, permissions).
//!
//! ## Parallel Processing
//!
//! [`compress_bundle`] fans out across artifacts using
//! [rayon](https://docs.rs/rayon). Derivative files are written via
//! write-then-rename so a partial file is never visible, and registration is
//! merged single-threaded after all workers finish.

use crate::codec::Codec;
use crate::config::PressConfig;
use crate::eligible;
use crate::snapshot::Manifest;
use crate::types::{Artifact, BuildArtifact, Derivative};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source artifact not found: {0}")]
    SourceNotFound(PathBuf),
}

/// Result of one compress run: the accepted derivatives plus counts for
/// reporting. Registration happens by consuming `derivatives`.
#[derive(Debug)]
pub struct CompressReport {
    /// Accepted derivatives in artifact order, codec order within an artifact
    pub derivatives: Vec<Derivative>,
    /// Artifacts that passed the eligibility filter
    pub eligible: usize,
    /// Artifacts skipped: ineligible extension or empty content
    pub skipped: usize,
}

/// Manifest output from the compress stage: the original bundle plus every
/// registered derivative.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompressedManifest {
    pub artifacts: Vec<Artifact>,
    pub derivatives: Vec<Derivative>,
}

impl CompressedManifest {
    /// Merge accepted derivatives into the bundle's artifact list.
    pub fn merge(manifest: &Manifest, report: &CompressReport) -> Self {
        let mut artifacts = manifest.artifacts.clone();
        artifacts.extend(report.derivatives.iter().map(Derivative::as_artifact));
        artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Self {
            artifacts,
            derivatives: report.derivatives.clone(),
        }
    }
}

/// Progress event streamed while compressing, one per eligible artifact.
#[derive(Debug)]
pub enum CompressEvent {
    ArtifactCompressed {
        /// 1-based position within the eligible set
        index: usize,
        file_name: String,
        original_size: u64,
        outcomes: Vec<CodecOutcome>,
    },
}

/// What one codec did with one artifact.
#[derive(Debug, Clone)]
pub struct CodecOutcome {
    pub codec: Codec,
    pub status: DerivativeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivativeStatus {
    /// Derivative written and registered
    Written { size: u64 },
    /// Compressed output was not strictly smaller — discarded, not an error
    NotSmaller,
}

/// Compress an in-memory bundle snapshot, as handed over by a host build
/// tool after its own write step.
///
/// Artifacts are processed sequentially in snapshot order; originals are
/// expected to already exist under `output_dir`, and derivative files are
/// written next to them. Returns the accepted derivatives for the host to
/// merge into its manifest.
pub fn compress_snapshot(
    artifacts: &[BuildArtifact],
    output_dir: &Path,
    config: &PressConfig,
) -> Result<CompressReport, CompressError> {
    let codecs = config.enabled_codecs();
    let mut derivatives = Vec::new();
    let mut eligible_count = 0;

    for artifact in artifacts {
        let bytes = artifact.content.as_bytes();
        if !eligible::is_eligible(&artifact.file_name, bytes.len() as u64, &config.extensions) {
            continue;
        }
        eligible_count += 1;
        let (mut derived, _) = derive_artifact(&artifact.file_name, bytes, output_dir, &codecs)?;
        derivatives.append(&mut derived);
    }

    Ok(CompressReport {
        derivatives,
        eligible: eligible_count,
        skipped: artifacts.len() - eligible_count,
    })
}

/// Compress a bundle described by a scan manifest, reading artifact content
/// from the output directory.
///
/// Eligible artifacts are compressed in parallel; per-artifact progress is
/// reported through `events` as workers finish (arrival order is not the
/// bundle order). The returned report is deterministic regardless of worker
/// scheduling.
pub fn compress_bundle(
    manifest: &Manifest,
    output_dir: &Path,
    events: Option<Sender<CompressEvent>>,
) -> Result<CompressReport, CompressError> {
    let codecs = manifest.config.enabled_codecs();
    let eligible: Vec<&Artifact> = manifest.eligible_artifacts();
    let eligible_count = eligible.len();

    let per_artifact: Vec<Vec<Derivative>> = eligible
        .par_iter()
        .enumerate()
        .map_with(events, |tx, (index, artifact)| {
            let source_path = output_dir.join(&artifact.file_name);
            if !source_path.exists() {
                return Err(CompressError::SourceNotFound(source_path));
            }
            let bytes = std::fs::read(&source_path)?;
            let (derived, outcomes) =
                derive_artifact(&artifact.file_name, &bytes, output_dir, &codecs)?;
            if let Some(tx) = tx {
                // Receiver may be gone; progress is best-effort
                tx.send(CompressEvent::ArtifactCompressed {
                    index: index + 1,
                    file_name: artifact.file_name.clone(),
                    original_size: bytes.len() as u64,
                    outcomes,
                })
                .ok();
            }
            Ok(derived)
        })
        .collect::<Result<_, _>>()?;

    Ok(CompressReport {
        derivatives: per_artifact.into_iter().flatten().collect(),
        eligible: eligible_count,
        skipped: manifest.artifacts.len() - eligible_count,
    })
}

/// Run every codec over one artifact's normalized bytes, writing each
/// strictly-smaller result next to the original.
fn derive_artifact(
    file_name: &str,
    bytes: &[u8],
    output_dir: &Path,
    codecs: &[Codec],
) -> Result<(Vec<Derivative>, Vec<CodecOutcome>), CompressError> {
    let mut derivatives = Vec::new();
    let mut outcomes = Vec::new();

    for codec in codecs {
        match codec.encode_smaller(bytes)? {
            Some(compressed) => {
                let derived_name = format!("{file_name}{}", codec.suffix());
                write_atomic(&output_dir.join(&derived_name), &compressed)?;
                outcomes.push(CodecOutcome {
                    codec: *codec,
                    status: DerivativeStatus::Written {
                        size: compressed.len() as u64,
                    },
                });
                derivatives.push(Derivative {
                    file_name: derived_name,
                    source_file_name: file_name.to_string(),
                    codec: *codec,
                    size: compressed.len() as u64,
                    original_size: bytes.len() as u64,
                });
            }
            None => outcomes.push(CodecOutcome {
                codec: *codec,
                status: DerivativeStatus::NotSmaller,
            }),
        }
    }

    Ok((derivatives, outcomes))
}

/// Write via a temporary sibling and rename, so readers never observe a
/// partially written derivative.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}
