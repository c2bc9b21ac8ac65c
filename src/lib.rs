//! # marksheet-report
//!
//! Turn academic result sheets into per-student records, pass/fail
//! statistics and printable reports.
//!
//! Universities publish results as spreadsheets, CSV dumps or PDF
//! marksheets. This crate reads all of them into one record shape,
//! [`StudentData`], grades every subject as PASS / FAIL / ABSENT and
//! renders a PDF report per student or a JSON dump of the whole batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Input      choose the format by extension (.csv .xlsx .xls .pdf .json)
//!  ├─ 2. Parse      csv / calamine rows, or pdfium text + tokenizer (spawn_blocking)
//!  ├─ 3. Normalise  identity columns, one graded subject per remaining column
//!  ├─ 4. Aggregate  total / passed / failed / average
//!  └─ 5. Report     per-student PDF (pdfium), batch directory, master JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use marksheet_report::{load_students, ProcessingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessingConfig::default();
//!     let output = load_students("results.xlsx", &config).await?;
//!     for s in &output.students {
//!         println!("{} {} {}", s.reg_no, s.name, s.result_status);
//!     }
//!     eprintln!("{} of {} passed", output.stats.total_passed, output.stats.total_students);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `marksheet` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! marksheet-report = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! PDF input and PDF reports need the pdfium shared library at run time; see
//! [`engine`]. CSV, spreadsheet and JSON input work without it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod load;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod sample;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DuplicatePolicy, GradingRules, ProcessingConfig, ProcessingConfigBuilder, TotalPolicy};
pub use error::{MarksheetError, ParseError, RenderError};
pub use load::{
    load_students, load_students_from_bytes, load_students_sync, render_reports_to_dir,
    render_student_report, write_master_export, LoadOutput,
};
pub use model::{ColorTag, Mark, ParsingStats, ResultStatus, StudentData, SubjectMark, SubjectStatus};
pub use pipeline::input::InputFormat;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{export_master, report_file_name, BatchSummary, PdfReportRenderer, ReportRenderer};
pub use session::Session;
