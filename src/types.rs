//! Shared types used across both pipeline stages.
//!
//! These types are serialized to JSON between stages (scan → compress) and
//! must be identical across both modules.

use serde::{Deserialize, Serialize};

/// What the host bundler considers an artifact to be.
///
/// `Code` covers emitted chunks (`.js`/`.mjs`); everything else — documents,
/// stylesheets, images, fonts — is an `Asset`. The distinction is
/// informational: eligibility for compression is decided by extension, not
/// kind, and every derivative is registered as an `Asset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Asset,
    Code,
}

/// One named file produced by a build, as recorded in the snapshot manifest.
///
/// The manifest carries metadata only; content stays on disk until the
/// compress stage reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Path relative to the output directory, `/`-separated, unique per bundle
    pub file_name: String,
    pub kind: ArtifactKind,
    /// Content length in bytes
    pub size: u64,
}

/// Artifact content as handed over by a host build tool.
///
/// Bundlers emit chunks as source text and assets as raw bytes. Codecs only
/// operate on byte sequences, so text is normalized to UTF-8 via
/// [`ArtifactContent::as_bytes`] before compression.
#[derive(Debug, Clone)]
pub enum ArtifactContent {
    Text(String),
    Binary(Vec<u8>),
}

impl ArtifactContent {
    /// The normalized byte view used for compression and size accounting.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ArtifactContent::Text(s) => s.as_bytes(),
            ArtifactContent::Binary(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// A build output unit with its content, as supplied by an embedding host
/// tool (or loaded from disk by the CLI pipeline).
#[derive(Debug, Clone)]
pub struct BuildArtifact {
    /// Path relative to the output directory, unique within the bundle
    pub file_name: String,
    pub kind: ArtifactKind,
    pub content: ArtifactContent,
}

impl BuildArtifact {
    pub fn text(file_name: impl Into<String>, kind: ArtifactKind, body: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            content: ArtifactContent::Text(body.into()),
        }
    }

    pub fn binary(file_name: impl Into<String>, kind: ArtifactKind, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            content: ArtifactContent::Binary(bytes),
        }
    }
}

/// A compressed copy of an artifact, kept only when strictly smaller than
/// its source. Terminal build output: written next to the original and
/// registered in the compressed manifest as an `Asset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Derivative {
    /// Original file name plus the codec suffix (`index.html` → `index.html.gz`)
    pub file_name: String,
    /// Back-reference to the artifact this was derived from (informational)
    pub source_file_name: String,
    pub codec: crate::codec::Codec,
    /// Compressed length in bytes
    pub size: u64,
    /// Source length in bytes
    pub original_size: u64,
}

impl Derivative {
    /// Manifest entry for this derivative. Derivatives are always assets.
    pub fn as_artifact(&self) -> Artifact {
        Artifact {
            file_name: self.file_name.clone(),
            kind: ArtifactKind::Asset,
            size: self.size,
        }
    }
}
