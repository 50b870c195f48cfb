//! Centralized eligibility rules for compressible artifacts.
//!
//! All call sites (scan reporting, check command, the compress stage) decide
//! eligibility through this module so the rules stay consistent:
//!
//! - content length must be non-zero
//! - the file extension — lower-cased, including the leading dot — must be in
//!   the eligible set
//!
//! The stock set is `.html`, `.css`, `.js`, `.svg`: text-like content that
//! compresses well and is served with content-encoding negotiation. Sites can
//! widen or narrow the set via `config.toml`.

/// Extensions compressed by default.
pub const STOCK_EXTENSIONS: [&str; 4] = [".html", ".css", ".js", ".svg"];

/// Extract the extension of a file name, lower-cased, with the leading dot.
///
/// Only the final component counts, so `app.tar.gz` yields `.gz`. Dotfiles
/// and extension-less names yield `None`:
///
/// - `"index.html"` → `Some(".html")`
/// - `"assets/App.JS"` → `Some(".js")`
/// - `"LICENSE"` → `None`
/// - `".htaccess"` → `None`
pub fn file_extension(file_name: &str) -> Option<String> {
    let ext = std::path::Path::new(file_name).extension()?;
    Some(format!(".{}", ext.to_str()?.to_ascii_lowercase()))
}

/// Whether an artifact qualifies for compression.
///
/// `extensions` entries are expected lower-cased with a leading dot, as
/// enforced by config validation.
pub fn is_eligible(file_name: &str, size: u64, extensions: &[String]) -> bool {
    if size == 0 {
        return false;
    }
    match file_extension(file_name) {
        Some(ext) => extensions.iter().any(|e| *e == ext),
        None => false,
    }
}
