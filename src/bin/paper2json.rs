//! CLI binary for paper-docx2json.
//!
//! A thin shim over the library crate: maps flags to `ConversionConfig` /
//! `UploadConfig`, prints the result lines, and renders upload progress.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use paper_docx2json::{
    convert_to_file, upload_document, validate_document, ConversionConfig, ProgressCallback,
    RecordId, SupabaseStore, UploadConfig, UploadProgressCallback, UploadReport,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress for the upload: a spinner while the paper is upserted,
/// then a bar counting inserted questions.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: ProgressBar::new(0),
        })
    }
}

impl UploadProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, total_questions: usize) {
        self.bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        self.bar.set_length(total_questions as u64);
        self.bar.set_prefix("Uploading");
        self.bar.set_message("Upserting paper…");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_paper_upserted(&self, id: &RecordId, created: bool) {
        self.bar.println(format!(
            "  {} Paper {} {}",
            green("✓"),
            bold(&id.to_string()),
            dim(if created { "created" } else { "updated" }),
        ));
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>4}/{len} questions  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
    }

    fn on_batch_complete(&self, inserted: usize, _total: usize) {
        self.bar.set_position(inserted as u64);
    }

    fn on_upload_complete(&self, report: &UploadReport) {
        self.bar.finish_and_clear();
        if report.published {
            eprintln!("  {} Paper {} published", green("✓"), report.paper_id);
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert only (writes data/cat-2024.json)
  paper2json --docx "CAT 2024 metadata.docx"

  # Convert to a custom path
  paper2json --docx paper.docx -o data/cat-2023-slot-1.json

  # Convert, upload and publish
  paper2json --docx paper.docx --upload --publish

  # Refuse to upload a document with structural problems
  paper2json --docx paper.docx --upload --strict

DOCUMENT LAYOUT:
  Table 1        two columns: key | value
                 (Slug, Title, Description, Year, Total Questions,
                  Total Marks, Duration Minutes, Sections, Difficulty Level)
  Tables 2..n    question tables; header row needs a question column
                 (Question / Question Text / Question Number / QNo / SNo)
                 and an answer column. Other tables are ignored.

  Sections value: one section per line or separated by ';'
                  NAME | questions | minutes | marks   e.g. VARC | 24 | 40 | 72

ENVIRONMENT VARIABLES (only read with --upload):
  NEXT_PUBLIC_SUPABASE_URL   Supabase project URL (or SUPABASE_URL)
  SUPABASE_SERVICE_ROLE_KEY  Service-role key used for every request
  RUST_LOG                   Override log filter (e.g. paper_docx2json=debug)
"#;

/// Convert a paper-metadata DOCX into the practice-app JSON schema.
#[derive(Parser, Debug)]
#[command(
    name = "paper2json",
    version,
    about = "Convert a paper-metadata DOCX to JSON and optionally upload it to Supabase",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the source DOCX file.
    #[arg(long, env = "PAPER2JSON_DOCX")]
    docx: PathBuf,

    /// Where to write the JSON document.
    #[arg(short, long, env = "PAPER2JSON_OUT", default_value = "data/cat-2024.json")]
    out: PathBuf,

    /// Push the converted paper and its questions to Supabase.
    #[arg(long)]
    upload: bool,

    /// Mark the paper as published after uploading. Ignored without --upload.
    #[arg(long)]
    publish: bool,

    /// Treat validation warnings as errors; nothing is uploaded.
    #[arg(long, env = "PAPER2JSON_STRICT")]
    strict: bool,

    /// Questions per insert request.
    #[arg(long, env = "PAPER2JSON_BATCH_SIZE", default_value_t = 50,
          value_parser = clap::value_parser!(u32).range(1..=1000))]
    batch_size: u32,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "PAPER2JSON_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Disable the upload progress bar.
    #[arg(long, env = "PAPER2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAPER2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAPER2JSON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
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

    // ── Resolve upload settings before touching the document ─────────────
    let show_progress = cli.upload && !cli.quiet && !cli.no_progress;
    let upload_config = if cli.upload {
        Some(build_upload_config(&cli, show_progress)?)
    } else {
        None
    };

    // ── Convert ──────────────────────────────────────────────────────────
    let doc = convert_to_file(&cli.docx, &cli.out, &ConversionConfig::default())
        .with_context(|| format!("Failed to convert {}", cli.docx.display()))?;
    if !cli.quiet {
        println!("✅ JSON written to {}", cli.out.display());
        eprintln!(
            "   {} questions  {}  {} sections",
            bold(&doc.questions.len().to_string()),
            dim("·"),
            doc.paper.sections.len(),
        );
    }

    // ── Validate ─────────────────────────────────────────────────────────
    let issues = validate_document(&doc);
    for issue in &issues {
        warn!("{}", issue);
    }
    if !issues.is_empty() && !cli.quiet {
        eprintln!(
            "{} {} validation warning(s)",
            yellow("⚠"),
            bold(&issues.len().to_string())
        );
    }
    if cli.strict {
        if let Some(first) = issues.first() {
            anyhow::bail!(
                "Refusing to continue in strict mode: {} issue(s), first: {}",
                issues.len(),
                first
            );
        }
    }

    // ── Upload ───────────────────────────────────────────────────────────
    let Some(upload_config) = upload_config else {
        if !cli.quiet {
            println!("ℹ️ Skipped upload (run with --upload to push to Supabase)");
        }
        return Ok(());
    };

    let store = SupabaseStore::new(&upload_config).context("Failed to create Supabase client")?;
    let report = upload_document(&store, &doc, &upload_config)
        .await
        .context("Upload failed")?;

    if !cli.quiet {
        println!(
            "✅ Uploaded paper id={} with {} questions; published={}",
            report.paper_id,
            report.questions_inserted,
            report.published,
        );
        if report.created {
            eprintln!("   {}", cyan("new paper record"));
        }
    }

    Ok(())
}

/// Read credentials from the environment and map CLI flags onto them.
fn build_upload_config(cli: &Cli, show_progress: bool) -> Result<UploadConfig> {
    let mut builder = UploadConfig::from_env()
        .context("Supabase credentials are required for --upload")?
        .batch_size(cli.batch_size as usize)
        .publish(cli.publish)
        .timeout_secs(cli.timeout);

    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid upload configuration")
}
