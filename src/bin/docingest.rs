//! CLI binary for docingest.
//!
//! A thin shim over the library crate: maps flags to `IngestConfig`, drives
//! the batch with a progress bar, and renders the viewer's reconciled
//! artifacts for the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docingest::{
    run_batch_with, FileKind, IngestConfig, MistralOcrClient, ProcessingOutcome, ViewerPaths,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Ingest every PDF/DOCX in the default input directory
  export MISTRAL_API_KEY=...
  docingest run

  # Explicit directories
  docingest run --input-dir ./inbox --output-root ./ocr_output

  # List documents across both pipelines
  docingest list --partition-dir ./partition_output

  # Inspect one document's artifacts
  docingest view quarterly_report --partition-dir ./partition_output

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY         OCR service API key (required for `run`)
  DOCINGEST_INPUT_DIR     Default input directory
  DOCINGEST_OUTPUT_ROOT   Default output root
"#;

/// Batch-OCR PDF/DOCX documents into a stable artifact tree.
#[derive(Parser, Debug)]
#[command(
    name = "docingest",
    version,
    about = "Batch-OCR PDF/DOCX documents into markdown, images, and JSON artifacts",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCINGEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCINGEST_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest every recognised document in the input directory.
    Run(RunArgs),
    /// List document names across the OCR and partition pipelines.
    List(ViewerArgs),
    /// Show every artifact available for one document name.
    View {
        /// Document base name (artifact subdirectory / file stem).
        name: String,
        #[command(flatten)]
        viewer: ViewerArgs,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Directory scanned (non-recursively) for *.pdf / *.docx / *.doc.
    #[arg(long, env = "DOCINGEST_INPUT_DIR", default_value = "scanned_pdf_data")]
    input_dir: PathBuf,

    /// Root of the artifact tree (json/, markdown/, images/, archives).
    #[arg(
        long,
        env = "DOCINGEST_OUTPUT_ROOT",
        default_value = "mistral_scanned_pdf_output"
    )]
    output_root: PathBuf,

    /// OCR service API key.
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OCR service base URL.
    #[arg(long, env = "DOCINGEST_API_BASE", default_value = docingest::config::DEFAULT_API_BASE)]
    api_base: String,

    /// OCR model identifier.
    #[arg(long, env = "DOCINGEST_MODEL", default_value = docingest::config::DEFAULT_OCR_MODEL)]
    model: String,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "DOCINGEST_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Disable the progress bar.
    #[arg(long, env = "DOCINGEST_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(clap::Args, Debug)]
struct ViewerArgs {
    /// Root of the OCR artifact tree.
    #[arg(
        long,
        env = "DOCINGEST_OUTPUT_ROOT",
        default_value = "mistral_scanned_pdf_output"
    )]
    output_root: PathBuf,

    /// Directory of the partition pipeline's per-document JSON exports.
    #[arg(long, env = "DOCINGEST_PARTITION_DIR")]
    partition_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar owns the terminal during `run`; keep library logs
    // at warn unless the user explicitly asks for more.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Run(args) => run(args, cli.quiet).await,
        Command::List(args) => list(&args),
        Command::View { name, viewer } => view(&name, &viewer),
    }
}

// ── run ──────────────────────────────────────────────────────────────────────

async fn run(args: RunArgs, quiet: bool) -> Result<()> {
    let config = IngestConfig::builder()
        .input_dir(args.input_dir)
        .output_root(args.output_root)
        .api_key(args.api_key.unwrap_or_default())
        .api_base(args.api_base)
        .ocr_model(args.model)
        .timeout_secs(args.timeout)
        .build()
        .context("Invalid configuration")?;

    let client = MistralOcrClient::new(&config).context("Could not build OCR client")?;

    let total = docingest::discover_documents(&config.input_dir)
        .with_context(|| format!("Could not read input directory {}", config.input_dir.display()))?
        .len();

    let show_progress = !quiet && !args.no_progress;
    let bar = if show_progress {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} documents  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Ingesting");
        Some(bar)
    } else {
        None
    };

    let outcomes = run_batch_with(&config, &client, |outcome| {
        if let Some(bar) = &bar {
            let line = match outcome {
                ProcessingOutcome::Success { meta, summary } => format!(
                    "  {} {:<40} {}",
                    green("✓"),
                    meta.file_name,
                    dim(&format!(
                        "{} pages, {} images, {:.1}s",
                        summary.pages, summary.total_images, summary.processing_time_seconds
                    )),
                ),
                ProcessingOutcome::Failure { meta, reason } => {
                    format!("  {} {:<40} {}", red("✗"), meta.file_name, red(&ellipsize(reason, 80)))
                }
            };
            bar.println(line);
            bar.inc(1);
        }
    })
    .await
    .context("Batch aborted")?;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    if !quiet {
        print_batch_summary(&outcomes);
    }
    Ok(())
}

/// End-of-batch report: per-type counts, then successes and failures by name.
fn print_batch_summary(outcomes: &[ProcessingOutcome]) {
    let by_kind = |kind: FileKind| {
        let total = outcomes.iter().filter(|o| o.meta().kind == kind).count();
        let ok = outcomes
            .iter()
            .filter(|o| o.meta().kind == kind && o.is_success())
            .count();
        (ok, total)
    };
    let (pdf_ok, pdf_total) = by_kind(FileKind::Pdf);
    let (docx_ok, docx_total) = by_kind(FileKind::Docx);
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();

    eprintln!();
    eprintln!("{}", bold("Processing summary"));
    eprintln!("  PDF:       {pdf_ok}/{pdf_total} succeeded");
    eprintln!("  DOCX/DOC:  {docx_ok}/{docx_total} succeeded");

    for outcome in outcomes {
        match outcome {
            ProcessingOutcome::Success { meta, summary } => eprintln!(
                "  {} {}  {}",
                green("✓"),
                meta.file_name,
                dim(&format!("{} pages, {} images", summary.pages, summary.total_images)),
            ),
            ProcessingOutcome::Failure { meta, reason } => {
                eprintln!("  {} {}  {}", red("✗"), meta.file_name, red(reason));
            }
        }
    }

    eprintln!();
    if failed == 0 {
        eprintln!(
            "{} {} documents processed successfully",
            green("✔"),
            bold(&outcomes.len().to_string())
        );
    } else {
        eprintln!(
            "{} {}/{} documents processed  ({} failed)",
            if failed == outcomes.len() { red("✘") } else { cyan("⚠") },
            bold(&(outcomes.len() - failed).to_string()),
            outcomes.len(),
            red(&failed.to_string()),
        );
    }
}

// ── list ─────────────────────────────────────────────────────────────────────

fn list(args: &ViewerArgs) -> Result<()> {
    let paths = ViewerPaths::new(&args.output_root, args.partition_dir.clone());
    let listing = paths.list_documents();

    if listing.is_empty() {
        println!("{}", dim("no documents found"));
        return Ok(());
    }

    // Pad before colouring: ANSI escapes would count toward the width.
    println!(
        "{}",
        bold(&format!("{:<40} {:>5} {:>10}", "document", "ocr", "partition"))
    );
    for (name, presence) in &listing {
        let mark = |present: bool, width: usize| {
            let cell = format!("{:>width$}", if present { "✓" } else { "-" });
            if present {
                green(&cell)
            } else {
                dim(&cell)
            }
        };
        println!(
            "{name:<40} {} {}",
            mark(presence.ocr, 5),
            mark(presence.partition, 10)
        );
    }
    println!("{}", dim(&format!("{} documents", listing.len())));
    Ok(())
}

// ── view ─────────────────────────────────────────────────────────────────────

fn view(name: &str, args: &ViewerArgs) -> Result<()> {
    let paths = ViewerPaths::new(&args.output_root, args.partition_dir.clone());
    let doc = paths.load_document(name);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", bold(&format!("── {name} ──")))?;

    section(&mut out, "Summary")?;
    match &doc.summary {
        Some(s) => {
            writeln!(out, "  file:     {} ({}, {})", s.file_name, s.file_type, s.file_size)?;
            writeln!(
                out,
                "  ocr:      {} pages, {} images, {:.2}s",
                s.pages, s.total_images, s.processing_time_seconds
            )?;
            writeln!(out, "  markdown: {}", s.markdown_path)?;
            writeln!(out, "  images:   {}", s.images_dir)?;
        }
        None => writeln!(out, "  {}", dim("no data"))?,
    }

    section(&mut out, "Partition text")?;
    match &doc.partition_text {
        Some(text) => writeln!(out, "{text}")?,
        None => writeln!(out, "  {}", dim("no data"))?,
    }

    section(&mut out, "Markdown")?;
    match &doc.markdown {
        Some(md) => writeln!(out, "{md}")?,
        None => writeln!(out, "  {}", dim("no data"))?,
    }

    section(&mut out, "Images")?;
    if doc.images.is_empty() {
        writeln!(out, "  {}", dim("no data"))?;
    } else {
        for image in &doc.images {
            writeln!(
                out,
                "  {}  {}",
                image.file_name,
                dim(&format!("{} bytes", image.size_bytes))
            )?;
        }
    }

    section(&mut out, "Raw OCR response")?;
    match &doc.ocr_json {
        Some(value) => {
            let pretty = serde_json::to_string_pretty(value)
                .context("Could not render OCR response")?;
            writeln!(out, "{pretty}")?;
        }
        None => writeln!(out, "  {}", dim("no data"))?,
    }

    Ok(())
}

fn section(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", cyan(&format!("▸ {title}")))
}

/// Shorten long failure reasons for the per-document log line. Counts
/// chars, not bytes — reasons carry file paths and service snippets that
/// may be non-ASCII.
fn ellipsize(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 1).collect();
        format!("{head}\u{2026}")
    }
}
