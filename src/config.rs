//! Tool configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Configuration is
//! sparse: stock defaults are overridden by a user config file in the project
//! root, and only the keys being changed need to appear.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # Extensions eligible for compression (lowercase, leading dot)
//! extensions = [".html", ".css", ".js", ".svg"]
//!
//! [codecs]
//! gzip = true               # gzip at level 9, writes *.gz
//! brotli = true             # Brotli at quality 11, writes *.br
//! zstd = true               # Zstandard at level 22, writes *.zst
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::codec::Codec;
use crate::eligible;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PressConfig {
    /// File extensions eligible for compression, lowercase with leading dot.
    pub extensions: Vec<String>,
    /// Which codecs run. Enabled codecs always apply in the fixed order
    /// gzip → brotli → zstd.
    pub codecs: CodecsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            extensions: eligible::STOCK_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            codecs: CodecsConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl PressConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        for ext in &self.extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(ConfigError::Validation(format!(
                    "extension '{ext}' must start with a dot and name a suffix"
                )));
            }
            if *ext != ext.to_ascii_lowercase() {
                return Err(ConfigError::Validation(format!(
                    "extension '{ext}' must be lowercase"
                )));
            }
        }
        if !self.codecs.gzip && !self.codecs.brotli && !self.codecs.zstd {
            return Err(ConfigError::Validation(
                "at least one codec must be enabled".into(),
            ));
        }
        Ok(())
    }

    /// Enabled codecs in the fixed application order.
    pub fn enabled_codecs(&self) -> Vec<Codec> {
        Codec::ALL
            .into_iter()
            .filter(|codec| match codec {
                Codec::Gzip => self.codecs.gzip,
                Codec::Brotli => self.codecs.brotli,
                Codec::Zstd => self.codecs.zstd,
            })
            .collect()
    }
}

/// Per-codec enable switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecsConfig {
    pub gzip: bool,
    pub brotli: bool,
    pub zstd: bool,
}

impl Default for CodecsConfig {
    fn default() -> Self {
        Self {
            gzip: true,
            brotli: true,
            zstd: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compression workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PressConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PressConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PressConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<PressConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# distpress Configuration
# =======================
#
# All options are optional. Omit a key to keep its default. Unknown keys
# are rejected.

# File extensions eligible for compression. Lowercase, leading dot.
# Files with any other extension, and empty files, are left alone.
extensions = [".html", ".css", ".js", ".svg"]

# Which codecs run. Enabled codecs always apply in the fixed order
# gzip -> brotli -> zstd, each at its maximum level. A derivative is only
# kept when it is strictly smaller than the original file.
[codecs]
gzip = true                  # level 9, writes *.gz
brotli = true                # quality 11, writes *.br
zstd = true                  # level 22, writes *.zst

[processing]
# Maximum number of parallel compression workers.
# Omit for auto (number of CPU cores). Values above the core count are
# clamped down.
# max_processes = 4
"##
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_extensions_are_the_stock_set() {
        let config = PressConfig::default();
        assert_eq!(config.extensions, vec![".html", ".css", ".js", ".svg"]);
    }

    #[test]
    fn default_enables_all_codecs() {
        let config = PressConfig::default();
        assert_eq!(
            config.enabled_codecs(),
            vec![Codec::Gzip, Codec::Brotli, Codec::Zstd]
        );
    }

    #[test]
    fn default_config_validates() {
        PressConfig::default().validate().unwrap();
    }

    #[test]
    fn disabled_codec_drops_out_of_order() {
        let config = PressConfig {
            codecs: CodecsConfig {
                gzip: true,
                brotli: false,
                zstd: true,
            },
            ..Default::default()
        };
        assert_eq!(config.enabled_codecs(), vec![Codec::Gzip, Codec::Zstd]);
    }

    #[test]
    fn empty_extensions_rejected() {
        let config = PressConfig {
            extensions: vec![],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn extension_without_dot_rejected() {
        let config = PressConfig {
            extensions: vec!["html".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bare_dot_extension_rejected() {
        let config = PressConfig {
            extensions: vec![".".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn uppercase_extension_rejected() {
        let config = PressConfig {
            extensions: vec![".HTML".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn all_codecs_disabled_rejected() {
        let config = PressConfig {
            codecs: CodecsConfig {
                gzip: false,
                brotli: false,
                zstd: false,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_overlay_overrides_scalar() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("extensions = [\".html\"]").unwrap();
        let merged = merge_toml(base, overlay);
        let config: PressConfig = merged.try_into().unwrap();
        assert_eq!(config.extensions, vec![".html"]);
        // untouched sections keep their defaults
        assert!(config.codecs.brotli);
    }

    #[test]
    fn merge_partial_table() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[codecs]\nbrotli = false").unwrap();
        let config: PressConfig = merge_toml(base, overlay).try_into().unwrap();
        assert!(config.codecs.gzip);
        assert!(!config.codecs.brotli);
        assert!(config.codecs.zstd);
    }

    #[test]
    fn unknown_key_rejected() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("compresion = true").unwrap();
        let result: Result<PressConfig, _> = merge_toml(base, overlay).try_into();
        assert!(result.is_err());
    }

    #[test]
    fn load_config_without_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.extensions, PressConfig::default().extensions);
    }

    #[test]
    fn load_config_applies_overrides() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "extensions = [\".html\", \".css\", \".js\", \".svg\", \".json\"]\n\n[processing]\nmax_processes = 2\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert!(config.extensions.contains(&".json".to_string()));
        assert_eq!(config.processing.max_processes, Some(2));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "extensions = [").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn effective_threads_auto_uses_cores() {
        let cores = std::thread::available_parallelism().unwrap().get();
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism().unwrap().get();
        let config = ProcessingConfig {
            max_processes: Some(cores + 64),
        };
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_can_constrain_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let parsed: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config: PressConfig = merge_toml(stock_defaults_value(), parsed)
            .try_into()
            .unwrap();
        config.validate().unwrap();
        assert_eq!(config.extensions, PressConfig::default().extensions);
        assert!(config.codecs.gzip && config.codecs.brotli && config.codecs.zstd);
    }
}
