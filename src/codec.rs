//! The three compression codecs applied to eligible artifacts.
//!
//! Levels are fixed at each algorithm's maximum: derivatives are produced
//! once per build and served many times, so encode time is spent freely in
//! exchange for the smallest possible transfer size. Output is the native
//! container format of each algorithm, no extra framing.
//!
//! The application order is fixed (gzip, Brotli, Zstandard) and each codec's
//! keep/skip decision is independent of the others — gzip may be skipped for
//! a file while Brotli is kept.

use serde::{Deserialize, Serialize};
use std::io::Write;

// Brotli encoder buffer size, quality (11 = max) and window size (lgwin)
const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_LGWIN: u32 = 22;

// Zstandard ultra maximum
const ZSTD_LEVEL: i32 = 22;

/// A compression algorithm with its fixed encoding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Gzip,
    Brotli,
    Zstd,
}

impl Codec {
    /// All codecs in application order.
    pub const ALL: [Codec; 3] = [Codec::Gzip, Codec::Brotli, Codec::Zstd];

    /// File name suffix appended to the original name, leading dot included.
    pub fn suffix(&self) -> &'static str {
        match self {
            Codec::Gzip => ".gz",
            Codec::Brotli => ".br",
            Codec::Zstd => ".zst",
        }
    }

    /// Short label used in CLI output lines.
    pub fn label(&self) -> &'static str {
        match self {
            Codec::Gzip => "gz",
            Codec::Brotli => "br",
            Codec::Zstd => "zst",
        }
    }

    /// Compress `bytes` with this codec at its fixed maximum level.
    pub fn encode(&self, bytes: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            Codec::Gzip => {
                let mut encoder =
                    flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::best());
                encoder.write_all(bytes)?;
                encoder.finish()
            }
            Codec::Brotli => {
                let mut out = Vec::new();
                {
                    let mut encoder = brotli::CompressorWriter::new(
                        &mut out,
                        BROTLI_BUFFER,
                        BROTLI_QUALITY,
                        BROTLI_LGWIN,
                    );
                    encoder.write_all(bytes)?;
                    // Dropping the writer finalizes the stream
                }
                Ok(out)
            }
            Codec::Zstd => zstd::encode_all(bytes, ZSTD_LEVEL),
        }
    }

    /// Compress `bytes`, keeping the result only if strictly smaller.
    ///
    /// `None` means the codec ran fine but the output was not smaller than
    /// the input — the derivative is discarded, not an error.
    pub fn encode_smaller(&self, bytes: &[u8]) -> std::io::Result<Option<Vec<u8>>> {
        let compressed = self.encode(bytes)?;
        if compressed.len() < bytes.len() {
            Ok(Some(compressed))
        } else {
            Ok(None)
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Codec::Gzip => "gzip",
            Codec::Brotli => "brotli",
            Codec::Zstd => "zstd",
        };
        write!(f, "{name}")
    }
}
