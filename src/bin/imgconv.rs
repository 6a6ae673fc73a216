//! CLI binary for imgconv.
//!
//! A thin shim over the library crate: it feeds the command line into an
//! [`InputController`] exactly as the widget would receive clicks, then
//! prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use imgconv::{
    inspect, ConversionConfig, ConversionProgressCallback, ConversionReport, ConversionStage,
    InputController, ProgressCallback, SelectedFile, TargetFormat,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

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

/// Spinner that follows the conversion through its stages.
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

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, file_name: &str, format: &str) {
        self.bar.set_prefix("Converting");
        self.bar.set_message(format!("{file_name} → {format}"));
    }

    fn on_stage(&self, stage: ConversionStage) {
        if !stage.is_terminal() {
            self.bar.set_prefix(format!("{stage}"));
        }
    }

    fn on_conversion_complete(&self, download_name: &str, bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(download_name),
            dim(&format!("{bytes} bytes"))
        );
    }

    fn on_conversion_error(&self, stage: ConversionStage, _error: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} failed while {stage}", red("✘"));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert to WebP in the current directory (writes ./img.webp)
  imgconv photo.png --to webp

  # Convert into another directory
  imgconv scan.jpg --to png -o converted/

  # Print a data: URL instead of writing a file
  imgconv icon.png --to jpeg --data-url

  # Show declared and detected type without converting
  imgconv --inspect-only mystery.png

  # JSON report of the conversion
  imgconv photo.png --to jpeg --json

ENVIRONMENT VARIABLES:
  IMGCONV_TO              Default target format (png, webp, jpeg)
  IMGCONV_OUTPUT_DIR      Default output directory
  IMGCONV_DECODE_TIMEOUT  Decode timeout in seconds
  RUST_LOG                Override log filtering
"#;

/// Convert an image to PNG, WebP or JPEG.
#[derive(Parser, Debug)]
#[command(
    name = "imgconv",
    version,
    about = "Convert an image to PNG, WebP or JPEG",
    long_about = "Convert an image file to PNG, WebP or JPEG. The result is always named \
img.<format>; the source name is not carried over.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image file to convert.
    input: PathBuf,

    /// Target format: png, webp or jpeg.
    #[arg(short, long, env = "IMGCONV_TO")]
    to: Option<TargetFormat>,

    /// Directory to write the converted image into.
    #[arg(short, long, env = "IMGCONV_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Print the result as a data: URL instead of writing a file.
    #[arg(long, env = "IMGCONV_DATA_URL", conflicts_with = "json")]
    data_url: bool,

    /// Print a JSON report instead of the summary line.
    #[arg(long, env = "IMGCONV_JSON")]
    json: bool,

    /// Print image information only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMGCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMGCONV_QUIET")]
    quiet: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "IMGCONV_NO_PROGRESS")]
    no_progress: bool,

    /// Give up decoding after this many seconds.
    #[arg(long, env = "IMGCONV_DECODE_TIMEOUT")]
    decode_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO logs; failures are still logged in full.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let file = SelectedFile::from_path(&cli.input);
        let info = inspect(&file, &config)
            .await
            .context("Failed to inspect image")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize image info")?
            );
        } else {
            println!("File:          {}", info.name);
            println!("Declared type: {}", info.declared_mime);
            println!(
                "Detected type: {}",
                info.detected_mime.as_deref().unwrap_or("unknown")
            );
            println!("Dimensions:    {}x{}", info.width, info.height);
            println!("Size:          {} bytes", info.size_bytes);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Drive the controller ─────────────────────────────────────────────
    let mut controller = InputController::new().with_config(config);
    if !cli.data_url {
        controller = controller.with_output_dir(&cli.output_dir);
    }

    controller.on_file_chosen(Some(SelectedFile::from_path(&cli.input)));
    if let Some(message) = controller.error() {
        eprintln!("{}", red(message));
        return Ok(ExitCode::FAILURE);
    }
    controller.on_format_chosen(cli.to);

    let Some(output) = controller.on_convert().await else {
        let message = controller.error().unwrap_or_default();
        eprintln!("{}", red(message));
        return Ok(ExitCode::FAILURE);
    };

    // ── Report ───────────────────────────────────────────────────────────
    if cli.data_url {
        println!("{}", output.download.data_url());
    }

    if cli.json {
        let report = ConversionReport::new(&cli.input.display().to_string(), &output);
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet && !show_progress {
        let (w, h) = output.download.dimensions;
        let target = output
            .saved_to
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| output.download.file_name.clone());
        eprintln!(
            "Converted {}x{} image in {}ms → {}",
            w, h, output.stats.total_duration_ms, target
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder();
    if let Some(secs) = cli.decode_timeout {
        builder = builder.decode_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn data_url_and_json_are_exclusive() {
        let err = Cli::try_parse_from(["imgconv", "a.png", "--to", "png", "--data-url", "--json"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn data_url_alone_parses() {
        let cli = Cli::try_parse_from(["imgconv", "a.png", "--to", "webp", "--data-url"]).unwrap();
        assert!(cli.data_url && !cli.json);
        assert_eq!(cli.to, Some(TargetFormat::Webp));
    }
}
