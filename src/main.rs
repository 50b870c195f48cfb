use clap::{Parser, Subcommand};
use distpress::{compress, config, output, snapshot};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "distpress")]
#[command(about = "Post-build output compressor for static sites")]
#[command(long_about = "\
Post-build output compressor for static sites

Run it after your bundler finishes: every compressible output file gets
.gz, .br, and .zst siblings, each kept only when strictly smaller than
the original. Originals are never modified, so the site stays servable
whether or not the server negotiates content encoding.

Eligible by default: .html, .css, .js, .svg (non-empty files).

Pipeline:

  dist/
  ├── index.html                   # original, untouched
  ├── index.html.gz                # gzip level 9
  ├── index.html.br                # Brotli quality 11
  ├── index.html.zst               # Zstandard level 22
  └── assets/
      ├── app.js
      └── app.js.gz ...

A derivative that would not be smaller is simply not written — a tiny
HTML file may end up with no siblings at all, and that is fine.

Run 'distpress gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Build output directory to compress
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate manifests
    #[arg(long, default_value = ".distpress-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the output directory into a bundle manifest
    Scan,
    /// Compress eligible artifacts from an existing manifest
    Compress,
    /// Run the full pipeline: scan → compress
    Build,
    /// Report what would be compressed without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let site_config = config::load_config(std::path::Path::new("."))?;
            let manifest = snapshot::snapshot(&cli.output, site_config)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&manifest);
        }
        Command::Compress => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let manifest = snapshot::load_manifest(&manifest_path)?;
            init_thread_pool(&manifest.config.processing);
            let report = run_compress(&manifest, &cli.output, &cli.temp_dir)?;
            output::print_compress_summary(&report);
        }
        Command::Build => {
            let site_config = config::load_config(std::path::Path::new("."))?;

            println!("==> Stage 1: Scanning {}", cli.output.display());
            let manifest = snapshot::snapshot(&cli.output, site_config)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&manifest);

            println!("==> Stage 2: Compressing eligible artifacts");
            init_thread_pool(&manifest.config.processing);
            let report = run_compress(&manifest, &cli.output, &cli.temp_dir)?;
            output::print_compress_summary(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(std::path::Path::new("."))?;
            println!("==> Checking {}", cli.output.display());
            let manifest = snapshot::snapshot(&cli.output, site_config)?;
            output::print_scan_output(&manifest);
            println!("==> Bundle is valid, nothing written");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Compress with progress streamed to stdout, then write the compressed
/// manifest to the temp dir.
fn run_compress(
    manifest: &snapshot::Manifest,
    output_dir: &std::path::Path,
    temp_dir: &std::path::Path,
) -> Result<compress::CompressReport, Box<dyn std::error::Error>> {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_compress_event(&event);
        }
    });
    let report = compress::compress_bundle(manifest, output_dir, Some(tx))?;
    printer.join().unwrap();

    let merged = compress::CompressedManifest::merge(manifest, &report);
    std::fs::create_dir_all(temp_dir)?;
    let compressed_path = temp_dir.join("compressed.json");
    let json = serde_json::to_string_pretty(&merged)?;
    std::fs::write(&compressed_path, json)?;

    Ok(report)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
