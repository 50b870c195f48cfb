//! Output directory scanning and bundle manifest generation.
//!
//! Stage 1 of the distpress pipeline. Walks a finished build output directory
//! to record every artifact the bundler emitted, producing a structured
//! manifest that the compress stage consumes.
//!
//! When distpress is embedded as a library the host build tool supplies the
//! bundle snapshot directly and this stage is skipped; the CLI uses it to
//! reconstruct the snapshot from disk.
//!
//! ## Artifact Kinds
//!
//! The manifest mirrors the host bundler's chunk/asset distinction:
//! `.js`/`.mjs` files are recorded as `code`, everything else as `asset`.
//! Kind is informational — compression eligibility is decided by extension.
//!
//! ## Prior Derivatives
//!
//! A re-scan after a compress run would otherwise pick up `*.gz`/`*.br`/`*.zst`
//! files as sources. A file ending in a codec suffix is skipped when the file
//! it derives from sits next to it; a lone `.gz` with no sibling source is
//! treated as an ordinary artifact.
//!
//! ## Invariant
//!
//! File names are unique within a snapshot. The walk cannot produce
//! duplicates, but manifests loaded from JSON are validated before use.

use crate::codec::Codec;
use crate::config::PressConfig;
use crate::eligible;
use crate::types::{Artifact, ArtifactKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Output directory not found: {0}")]
    MissingOutputDir(PathBuf),
    #[error("Duplicate artifact name in snapshot: {0}")]
    DuplicateArtifact(String),
}

/// Manifest output from the scan stage: one completed build's bundle.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub artifacts: Vec<Artifact>,
    pub config: PressConfig,
}

impl Manifest {
    /// Enforce the snapshot invariant: artifact names are unique.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = BTreeSet::new();
        for artifact in &self.artifacts {
            if !seen.insert(artifact.file_name.as_str()) {
                return Err(SnapshotError::DuplicateArtifact(artifact.file_name.clone()));
            }
        }
        Ok(())
    }

    /// Artifacts that qualify for compression under this manifest's config.
    pub fn eligible_artifacts(&self) -> Vec<&Artifact> {
        self.artifacts
            .iter()
            .filter(|a| eligible::is_eligible(&a.file_name, a.size, &self.config.extensions))
            .collect()
    }
}

/// Scan a build output directory into a bundle manifest.
///
/// Artifacts are listed sorted by file name so manifests are stable across
/// runs and platforms.
pub fn snapshot(output_dir: &Path, config: PressConfig) -> Result<Manifest, SnapshotError> {
    if !output_dir.is_dir() {
        return Err(SnapshotError::MissingOutputDir(output_dir.to_path_buf()));
    }

    let mut artifacts = Vec::new();
    for entry in walkdir::WalkDir::new(output_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_prior_derivative(entry.path()) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(output_dir)
            .expect("walk entries live under the walk root");
        let file_name = relative_name(rel);
        let size = entry.metadata()?.len();
        artifacts.push(Artifact {
            kind: kind_for(&file_name),
            file_name,
            size,
        });
    }
    artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    let manifest = Manifest { artifacts, config };
    manifest.validate()?;
    Ok(manifest)
}

/// Load and validate a snapshot manifest written by the scan stage.
pub fn load_manifest(path: &Path) -> Result<Manifest, SnapshotError> {
    let content = std::fs::read_to_string(path)?;
    let manifest: Manifest = serde_json::from_str(&content)?;
    manifest.validate()?;
    Ok(manifest)
}

/// Join path components with `/` regardless of platform separator.
fn relative_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// The bundler's chunk/asset distinction: emitted JS chunks are code.
fn kind_for(file_name: &str) -> ArtifactKind {
    match eligible::file_extension(file_name).as_deref() {
        Some(".js") | Some(".mjs") => ArtifactKind::Code,
        _ => ArtifactKind::Asset,
    }
}

/// A leftover derivative from an earlier compress run: codec suffix plus the
/// source file sitting right next to it.
fn is_prior_derivative(path: &Path) -> bool {
    let Some(name) = path.to_str() else {
        return false;
    };
    Codec::ALL.iter().any(|codec| {
        name.strip_suffix(codec.suffix())
            .is_some_and(|source| Path::new(source).is_file())
    })
}
