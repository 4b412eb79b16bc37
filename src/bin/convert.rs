//! CLI binary for graphical-abstract.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, prints one status line per artifact, and exits 1 on
//! any failure.

use anyhow::{Context, Result};
use clap::Parser;
use graphical_abstract::{
    convert, detect_renderer, plan, ConversionConfig, ConversionMode, ConversionReport,
    ConvertError, ErrorKind, RenderBackend,
};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    if io::stderr().is_terminal() {
        format!("\x1b[31m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn dim(s: &str) -> String {
    if io::stderr().is_terminal() {
        format!("\x1b[2m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # PNG, TIFF and PDF next to the input
  convert figure.png

  # Rasterise page 1 of a PDF, PDF output only
  convert --pdf-only figure.pdf

  # Keep text and line art as vectors (PDF input, PDF output only)
  convert --preserve-vector --pdf-only figure.pdf

  # Machine-readable report
  convert --json figure.tif > report.json

OUTPUT:
  Every artifact is 1200×1200 px at 300 dpi (a 4×4 inch, 288 pt page),
  written next to the input as <name>_1200px_300dpi.{tiff,png,pdf}.

PDF RENDERING:
  Rasterising a PDF needs PDFium or poppler's pdftoppm. --renderer auto
  tries PDFium first, then pdftoppm. Without either, PDF input only works
  with --preserve-vector --pdf-only.

ENVIRONMENT VARIABLES:
  GA_RENDERER               Default for --renderer
  PDFIUM_LIB_PATH           Path to an existing libpdfium
  PDFIUM_LOCATE_CACHE_DIR   Directory searched for a cached libpdfium
  RUST_LOG                  Overrides the log filter (e.g. graphical_abstract=debug)
"#;

/// Normalise figures into 1200×1200 px, 300 dpi graphical abstracts.
#[derive(Parser, Debug)]
#[command(
    name = "convert",
    version,
    about = "Normalise a TIFF, PDF, JPEG or PNG figure into a 1200x1200 px, 300 dpi graphical abstract",
    long_about = "Scale a figure to fit a 1200x1200 px square at 300 dpi, centred on white, \
and save it as TIFF, PNG and PDF. PDF input is rasterised from page 1, or repositioned as \
vectors with --preserve-vector --pdf-only.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file (TIFF, PDF, JPEG or PNG).
    input: PathBuf,

    /// Keep PDF vector content instead of rasterising (requires --pdf-only).
    #[arg(long, env = "GA_PRESERVE_VECTOR")]
    preserve_vector: bool,

    /// Write only the PDF output; skip TIFF and PNG.
    #[arg(long, env = "GA_PDF_ONLY")]
    pdf_only: bool,

    /// PDF rasteriser to use for PDF input.
    #[arg(long, env = "GA_RENDERER", value_enum, default_value = "auto")]
    renderer: RendererArg,

    /// Print the conversion report as JSON instead of status lines.
    #[arg(long, env = "GA_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GA_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum RendererArg {
    Auto,
    Pdfium,
    Pdftoppm,
    None,
}

impl From<RendererArg> for RenderBackend {
    fn from(v: RendererArg) -> Self {
        match v {
            RendererArg::Auto => RenderBackend::Auto,
            RendererArg::Pdfium => RenderBackend::Pdfium,
            RendererArg::Pdftoppm => RenderBackend::Pdftoppm,
            RendererArg::None => RenderBackend::None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(report) => {
            if let Err(e) = print_report(&cli, &report) {
                eprintln!("{} {e:#}", red("Error:"));
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e:#}", red("Error:"));
            if let Some(ConvertError::RenderingUnavailable { .. }) = e.downcast_ref::<ConvertError>() {
                eprintln!("{}", dim("(use --preserve-vector --pdf-only to skip rasterisation)"));
            }
            if !cli.json && !cli.quiet {
                println!("Conversion failed.");
            }
            ExitCode::FAILURE
        }
    }
}

/// Build the config and run the conversion.
fn run(cli: &Cli) -> Result<ConversionReport> {
    // ── Build config ─────────────────────────────────────────────────────
    // The flag combination is checked before the input file is looked at.
    let mut config = ConversionConfig::builder()
        .preserve_vector(cli.preserve_vector)
        .pdf_only(cli.pdf_only)
        .build()?;

    // Only probe for a renderer when this input will be rasterised.
    let mode = plan(&cli.input, &config)?;
    if mode == ConversionMode::RasterizedPdf {
        config.renderer = detect_renderer(cli.renderer.into());
    }
    debug!(?config, ?mode, "Configured");

    // ── Run conversion ───────────────────────────────────────────────────
    convert(&cli.input, &config).map_err(|e| {
        let context = match e.kind() {
            ErrorKind::InvalidInput => "Invalid input",
            ErrorKind::UnsupportedCombination => "Invalid options",
            ErrorKind::RenderingUnavailable => "PDF rendering unavailable",
            ErrorKind::ProcessingFailure => "Processing failed",
        };
        anyhow::Error::new(e).context(context)
    })
}

fn print_report(cli: &Cli, report: &ConversionReport) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
        println!("{json}");
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    for artifact in &report.artifacts {
        if artifact.vector {
            println!(
                "PDF saved with vector elements preserved: {}",
                artifact.path.display()
            );
        } else {
            println!("{} saved: {}", artifact.format, artifact.path.display());
        }
    }
    println!("Conversion completed successfully!");
    Ok(())
}
