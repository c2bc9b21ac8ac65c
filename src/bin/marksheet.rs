//! CLI binary for marksheet-report.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessingConfig`, drives a `Session` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use marksheet_report::{
    BatchProgressCallback, DuplicatePolicy, ProcessingConfig, ProgressCallback, ResultStatus,
    Session, StudentData, TotalPolicy,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per report.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-student wall-clock start times, keyed by batch index.
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Binding PDF engine…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} reports  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total} student reports…"))
        ));
    }

    fn on_student_start(&self, index: usize, _total: usize, reg_no: &str) {
        self.start_times.lock().unwrap().insert(index, Instant::now());
        self.bar.set_message(reg_no.to_string());
    }

    fn on_student_complete(&self, index: usize, total: usize, reg_no: &str, bytes: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:>4}/{:<4}  {:<14}  {}  {}",
            green("✓"),
            index,
            total,
            reg_no,
            dim(&format!("{:>7} bytes", bytes)),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_student_error(&self, index: usize, total: usize, reg_no: &str, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>4}/{:<4}  {:<14}  {}  {}",
            red("✗"),
            index,
            total,
            reg_no,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, completed: usize) {
        self.bar.finish_and_clear();
        if completed == total {
            eprintln!("{} {} reports written", green("✔"), bold(&completed.to_string()));
        } else {
            eprintln!(
                "{} {}/{} reports written before the batch stopped",
                red("✘"),
                bold(&completed.to_string()),
                total
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Preview a result sheet
  marksheet results.xlsx

  # Search the preview
  marksheet results.csv --search "computer"

  # One PDF report per student
  marksheet results.pdf --reports out/

  # A single student's report
  marksheet results.csv --report 1RV20CS001 --reports out/

  # Master JSON export, then reprocess it with a different threshold
  marksheet results.xlsx --export students.json
  marksheet students.json --threshold 35

  # Try it without a file
  marksheet --sample --reports demo/

INPUT FORMATS:
  .csv .xlsx .xls   first row is the header; a registration-number column
                    (RegNo, Reg No, USN, Roll No, …) is required
  .pdf              text is extracted and records are recovered from lines
                    holding a registration number (best effort)
  .json             a master export written by --export

GRADING:
  AB / ABSENT → ABSENT, F / FAIL → FAIL, scores ≥ threshold (40) → PASS.
  A student passes only when every subject passes.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory). Needed for PDF
                    input and PDF reports; CSV/XLSX/JSON work without it.
  RUST_LOG          Overrides the log filter (e.g. marksheet_report=debug)
"#;

/// Parse result sheets and produce per-student reports.
#[derive(Parser, Debug)]
#[command(
    name = "marksheet",
    version,
    about = "Parse academic result sheets (PDF, XLSX, CSV) and produce student reports",
    long_about = "Read a result sheet, grade every subject as PASS / FAIL / ABSENT, print a \
preview with batch statistics, and optionally render one PDF report per student or a master \
JSON export.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Result file: .csv, .xlsx, .xls, .pdf or a .json master export.
    #[arg(required_unless_present = "sample", conflicts_with = "sample")]
    input: Option<PathBuf>,

    /// Use the built-in sample batch instead of a file.
    #[arg(long, env = "MARKSHEET_SAMPLE")]
    sample: bool,

    /// Only show students whose reg no, name or department contains this text.
    #[arg(long, env = "MARKSHEET_SEARCH")]
    search: Option<String>,

    /// Directory for PDF reports. Without --report, every student gets one.
    #[arg(long, env = "MARKSHEET_REPORTS")]
    reports: Option<PathBuf>,

    /// Render only this student's report (into --reports, or the current directory).
    #[arg(long, env = "MARKSHEET_REPORT")]
    report: Option<String>,

    /// Write the master JSON export to this file.
    #[arg(long, env = "MARKSHEET_EXPORT")]
    export: Option<PathBuf>,

    /// Print students and stats as JSON instead of a table.
    #[arg(long, env = "MARKSHEET_JSON")]
    json: bool,

    /// Pass threshold for numeric marks.
    #[arg(long, env = "MARKSHEET_THRESHOLD", default_value_t = 40.0)]
    threshold: f64,

    /// Which marks count towards a student's total.
    #[arg(long, env = "MARKSHEET_TOTAL_POLICY", value_enum, default_value = "passed-only")]
    total_policy: TotalPolicyArg,

    /// Fail when a registration number appears twice.
    #[arg(long, env = "MARKSHEET_REJECT_DUPLICATES")]
    reject_duplicates: bool,

    /// Regex a PDF word must match to be read as a registration number.
    #[arg(long, env = "MARKSHEET_REG_PATTERN")]
    reg_pattern: Option<String>,

    /// Column to ignore (repeatable), e.g. --skip-column Total --skip-column SGPA.
    #[arg(long = "skip-column", env = "MARKSHEET_SKIP_COLUMNS", value_delimiter = ',')]
    skip_columns: Vec<String>,

    /// PDF user password for encrypted result documents.
    #[arg(long, env = "MARKSHEET_PASSWORD")]
    password: Option<String>,

    /// Title printed at the top of every report.
    #[arg(long, env = "MARKSHEET_TITLE")]
    title: Option<String>,

    /// Disable progress bar.
    #[arg(long, env = "MARKSHEET_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MARKSHEET_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MARKSHEET_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum TotalPolicyArg {
    PassedOnly,
    AllScores,
}

impl From<TotalPolicyArg> for TotalPolicy {
    fn from(v: TotalPolicyArg) -> Self {
        match v {
            TotalPolicyArg::PassedOnly => TotalPolicy::PassedOnly,
            TotalPolicyArg::AllScores => TotalPolicy::AllScores,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active.
    let batch = cli.reports.is_some() && cli.report.is_none();
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && batch;
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
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;
    let mut session = Session::new(config);

    // ── Load ─────────────────────────────────────────────────────────────
    let start = Instant::now();
    if cli.sample {
        session.load_sample();
    } else if let Some(ref input) = cli.input {
        session
            .upload(input)
            .await
            .with_context(|| format!("Failed to load '{}'", input.display()))?;
    }

    // ── Preview ──────────────────────────────────────────────────────────
    let shown: Vec<&StudentData> = session.search(cli.search.as_deref().unwrap_or(""));
    if cli.json {
        let out = serde_json::json!({
            "source": session.source(),
            "stats": session.stats(),
            "students": shown,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        print_preview(&shown);
        let stats = session.stats();
        eprintln!(
            "{} {} students  {} passed  {} failed  average {:.2}  {}",
            cyan("◆"),
            bold(&stats.total_students.to_string()),
            green(&stats.total_passed.to_string()),
            red(&stats.total_failed.to_string()),
            stats.average_score,
            dim(&format!("{}ms", start.elapsed().as_millis())),
        );
    }

    // ── Reports ──────────────────────────────────────────────────────────
    if let Some(ref reg_no) = cli.report {
        let dir = cli.reports.clone().unwrap_or_else(|| PathBuf::from("."));
        let path = session
            .download_report(reg_no, &dir)
            .await
            .with_context(|| format!("Failed to render report for '{}'", reg_no))?;
        if !cli.quiet {
            eprintln!("{} {}", green("✔"), bold(&path.display().to_string()));
        }
    } else if let Some(ref dir) = cli.reports {
        let summary = session
            .download_all(dir)
            .await
            .context("Batch report rendering failed")?;
        if !cli.quiet && !show_progress {
            eprintln!(
                "Wrote {}/{} reports ({} bytes) to {}",
                summary.written.len(),
                summary.total,
                summary.bytes,
                dir.display()
            );
        }
    }

    // ── Export ───────────────────────────────────────────────────────────
    if let Some(ref path) = cli.export {
        session
            .export_master(path)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{} {} records  →  {}",
                green("✔"),
                session.students().len(),
                bold(&path.display().to_string())
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ProcessingConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ProcessingConfig> {
    let mut builder = ProcessingConfig::builder()
        .pass_threshold(cli.threshold)
        .total_policy(cli.total_policy.clone().into())
        .duplicate_policy(if cli.reject_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Keep
        });

    for column in &cli.skip_columns {
        builder = builder.skip_column(column.clone());
    }
    if let Some(ref pattern) = cli.reg_pattern {
        builder = builder.reg_no_pattern(pattern.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref title) = cli.title {
        builder = builder.report_title(title.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_preview(students: &[&StudentData]) {
    println!(
        "{:<14} {:<24} {:<20} {:>8} {:>9} {:>6}  {}",
        "REG NO", "NAME", "DEPARTMENT", "SUBJECTS", "TOTAL", "ABSENT", "RESULT"
    );
    for s in students {
        let result = match s.result_status {
            ResultStatus::Pass => green("PASS"),
            ResultStatus::Fail => red("FAIL"),
        };
        println!(
            "{:<14} {:<24} {:<20} {:>8} {:>9} {:>6}  {}",
            clip(&s.reg_no, 14),
            clip(&s.name, 24),
            clip(&s.department, 20),
            s.subjects.len(),
            marksheet_report::model::format_number(s.total_marks),
            s.absent_count,
            result
        );
    }
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let kept: String = s.chars().take(width - 1).collect();
        format!("{kept}…")
    }
}
