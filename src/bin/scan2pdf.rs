//! CLI binary for scan2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessorConfig` / `ServerConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use scan2pdf::server::{self, ServerConfig};
use scan2pdf::{
    parse_override, CollisionPolicy, FileKind, Input, OcrmypdfEngine, OptionOverrides, Processor,
    ProcessorConfig, ProgressCallback, WorkflowProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that follows the download and OCR steps of one run.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl WorkflowProgressCallback for CliProgressCallback {
    fn on_download_start(&self, url: &str) {
        self.bar.set_prefix("Downloading");
        self.bar.set_message(url.to_string());
    }

    fn on_download_complete(&self, path: &Path, bytes: u64) {
        self.bar.println(format!(
            "  {} downloaded {}  {}",
            green("✓"),
            path.display(),
            dim(&format!("{bytes} bytes"))
        ));
    }

    fn on_download_error(&self, _url: &str, error: &str) {
        self.bar.finish_and_clear();
        eprintln!("  {} {}", red("✗"), red(error));
    }

    fn on_ocr_start(&self, input: &Path, kind: FileKind) {
        self.bar.set_prefix("OCR");
        self.bar.set_message(format!("{} ({kind})", input.display()));
    }

    fn on_ocr_complete(&self, _output: &Path) {
        self.bar.finish_and_clear();
    }

    fn on_ocr_error(&self, error: &str) {
        self.bar.finish_and_clear();
        let first_line = error.lines().next().unwrap_or(error);
        eprintln!("  {} {}", red("✗"), red(first_line));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR a local scan → output/scan_OCR.pdf
  scan2pdf ocr scan.jpg

  # OCR a PDF from a URL
  scan2pdf ocr https://example.com/files/report.pdf

  # Explicit output path and extra ocrmypdf options
  scan2pdf ocr sample.pdf -o custom_output.pdf --set remove_background=true --set optimize=3

  # Never overwrite: write scan_OCR_1.pdf, scan_OCR_2.pdf, …
  scan2pdf ocr scan.png --on-collision version

  # Web form on http://127.0.0.1:8000/
  scan2pdf serve --media-root media

DEFAULT OPTIONS:
  deskew=true  rotate_pages=true  remove_background=false  progress_indicator=true

ENVIRONMENT VARIABLES:
  OCRMYPDF_BIN               Path to the ocrmypdf executable
  SCAN2PDF_OUTPUT_DIR        Output directory for `ocr`
  SCAN2PDF_DOWNLOAD_TIMEOUT  Download timeout in seconds
  RUST_LOG                   tracing filter (overrides -v / -q)
"#;

/// Turn scanned images and PDFs into searchable PDFs with ocrmypdf.
#[derive(Parser, Debug)]
#[command(
    name = "scan2pdf",
    version,
    about = "Turn scanned images and PDFs into searchable PDFs with ocrmypdf",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Path or name of the ocrmypdf executable.
    #[arg(long, global = true, env = "OCRMYPDF_BIN", default_value = "ocrmypdf")]
    engine: String,

    /// HTTP download timeout in seconds.
    #[arg(long, global = true, env = "SCAN2PDF_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// What to do when a derived output or download path already exists.
    #[arg(long, global = true, env = "SCAN2PDF_ON_COLLISION", value_enum, default_value = "overwrite")]
    on_collision: CollisionArg,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "SCAN2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "SCAN2PDF_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// OCR one local file or URL.
    Ocr(OcrArgs),
    /// Run the web form.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct OcrArgs {
    /// Local image/PDF path or HTTP/HTTPS URL.
    input: String,

    /// Write the searchable PDF here instead of <output-dir>/<stem>_OCR.pdf.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for derived outputs (and downloads).
    #[arg(long, env = "SCAN2PDF_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Directory for downloads, if different from the output directory.
    #[arg(long, env = "SCAN2PDF_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,

    /// Option override as key=value (repeatable). A bare key means true.
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Largest accepted download, in MiB.
    #[arg(long, env = "SCAN2PDF_MAX_DOWNLOAD_MB", default_value_t = 50)]
    max_download_mb: u64,

    /// Disable the progress spinner.
    #[arg(long, env = "SCAN2PDF_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Interface to bind.
    #[arg(long, env = "SCAN2PDF_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind.
    #[arg(long, env = "SCAN2PDF_PORT", default_value_t = 8000)]
    port: u16,

    /// Root directory for uploads and outputs.
    #[arg(long, env = "SCAN2PDF_MEDIA_ROOT", default_value = "media")]
    media_root: PathBuf,

    /// Largest accepted upload, in MiB.
    #[arg(long, env = "SCAN2PDF_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CollisionArg {
    Overwrite,
    Fail,
    Version,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(v: CollisionArg) -> Self {
        match v {
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
            CollisionArg::Fail => CollisionPolicy::Fail,
            CollisionArg::Version => CollisionPolicy::Version,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = match &cli.command {
        Command::Ocr(args) => !cli.common.quiet && !args.no_progress,
        Command::Serve(_) => false,
    };
    let filter = if cli.common.verbose {
        "debug"
    } else if cli.common.quiet || show_progress {
        "error"
    } else {
        "info,tower_http=debug"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Ocr(ref args) => run_ocr(&cli.common, args, show_progress).await,
        Command::Serve(ref args) => run_serve(&cli.common, args).await,
    }
}

async fn run_ocr(common: &CommonArgs, args: &OcrArgs, show_progress: bool) -> Result<()> {
    let overrides = parse_overrides(&args.set)?;

    let mut builder = base_config(common)
        .output_dir(&args.output_dir)
        .max_download_bytes(args.max_download_mb.saturating_mul(1024 * 1024));
    if let Some(ref dir) = args.download_dir {
        builder = builder.download_dir(dir);
    }
    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new() as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;
    let processor = Processor::new(config).context("Failed to prepare output directory")?;

    let input = Input::parse(&args.input);
    let start = Instant::now();
    let output = processor
        .process(&input, args.output.as_deref(), &overrides)
        .await
        .context("OCR failed")?;

    if !common.quiet {
        eprintln!(
            "{}  {}ms  →  {}",
            green("✔"),
            start.elapsed().as_millis(),
            bold(&output.display().to_string()),
        );
    }
    println!("{}", output.display());
    Ok(())
}

async fn run_serve(common: &CommonArgs, args: &ServeArgs) -> Result<()> {
    let server_config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        media_root: args.media_root.clone(),
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
    };

    let engine = OcrmypdfEngine::new(common.engine.clone());
    match engine.version() {
        Some(v) => tracing::info!("Using ocrmypdf {}", v),
        None => tracing::warn!(
            "'{}' is not runnable; every OCR request will fail until it is installed",
            common.engine
        ),
    }

    let config = base_config(common)
        .output_dir(server_config.output_dir())
        .max_download_bytes(server_config.max_upload_bytes as u64)
        .build()
        .context("Invalid configuration")?;
    let processor = Processor::new(config).context("Failed to prepare output directory")?;

    server::serve(&server_config, processor)
        .await
        .context("Web server failed")
}

fn base_config(common: &CommonArgs) -> scan2pdf::ProcessorConfigBuilder {
    ProcessorConfig::builder()
        .engine_binary(&common.engine)
        .download_timeout_secs(common.download_timeout)
        .collision_policy(common.on_collision.into())
}

/// Parse repeated `--set key=value` flags into overrides.
fn parse_overrides(specs: &[String]) -> Result<OptionOverrides> {
    let mut overrides = OptionOverrides::new();
    for spec in specs {
        let (key, value) = parse_override(spec)
            .with_context(|| format!("Invalid option '{spec}': expected KEY=VALUE"))?;
        overrides.insert(key, value);
    }
    Ok(overrides)
}
