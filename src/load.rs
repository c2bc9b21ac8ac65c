//! Library entry points: load a result file, render reports, export.
//!
//! Parsing, pdfium work and spreadsheet decoding are CPU-bound and pdfium is
//! not async-safe, so each operation moves its work onto a blocking thread
//! exactly once with `tokio::task::spawn_blocking`.

use crate::config::ProcessingConfig;
use crate::engine::bind_pdfium;
use crate::error::MarksheetError;
use crate::model::{ParsingStats, StudentData};
use crate::pipeline::extract::PdfiumTextExtractor;
use crate::pipeline::input::{self, InputFormat};
use crate::pipeline::{import, normalize, parse_document, tabular};
use crate::report::{self, BatchSummary, PdfReportRenderer, ReportRenderer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Records parsed from one input, with their statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutput {
    pub students: Vec<StudentData>,
    pub stats: ParsingStats,
    pub format: InputFormat,
    /// Path or declared file name of the input.
    pub source: String,
}

/// Load student records from a result file.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - `FileNotFound` / `PermissionDenied` / `UnsupportedFormat` / `NotAPdf`
///   for file-level problems
/// - `Parse(_)` when the content cannot be turned into records
/// - `PdfiumBindingFailed` for PDF input without a pdfium library
pub async fn load_students(
    path: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<LoadOutput, MarksheetError> {
    let start = Instant::now();
    let path = path.as_ref();
    info!("Loading results: {}", path.display());

    let resolved = input::resolve_input(path, config.max_file_size_bytes)?;
    let bytes = tokio::fs::read(&resolved.path)
        .await
        .map_err(|e| MarksheetError::ReadFailed {
            path: resolved.path.clone(),
            source: e,
        })?;

    let output = parse_in_background(
        resolved.format,
        bytes,
        resolved.path.display().to_string(),
        config,
    )
    .await?;

    info!(
        "Loaded {} students ({} passed) in {}ms",
        output.stats.total_students,
        output.stats.total_passed,
        start.elapsed().as_millis()
    );
    Ok(output)
}

/// Load student records from bytes already in memory.
///
/// `file_name` only selects the format and labels the output.
///
/// # Example
/// ```rust,no_run
/// use marksheet_report::{load_students_from_bytes, ProcessingConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let csv = b"RegNo,Name,Math,Science\nS001,Alice,AB,55\n".to_vec();
/// let output = load_students_from_bytes("marks.csv", csv, &ProcessingConfig::default()).await?;
/// assert_eq!(output.students[0].absent_count, 1);
/// # Ok(())
/// # }
/// ```
pub async fn load_students_from_bytes(
    file_name: &str,
    bytes: Vec<u8>,
    config: &ProcessingConfig,
) -> Result<LoadOutput, MarksheetError> {
    let name = Path::new(file_name);
    let format = input::detect_format(name)?;
    if format == InputFormat::Pdf {
        input::check_pdf_magic(name, &bytes)?;
    }
    input::check_size(name, bytes.len() as u64, config.max_file_size_bytes);
    parse_in_background(format, bytes, file_name.to_string(), config).await
}

/// Synchronous wrapper around [`load_students`].
///
/// Creates a temporary tokio runtime internally.
pub fn load_students_sync(
    path: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<LoadOutput, MarksheetError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| MarksheetError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(load_students(path, config))
}

/// Render one student's PDF report and return its bytes.
pub async fn render_student_report(
    student: &StudentData,
    config: &ProcessingConfig,
) -> Result<Vec<u8>, MarksheetError> {
    let student = student.clone();
    let config = config.clone();
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>, MarksheetError> {
        let renderer = PdfReportRenderer::from_config(&config)?;
        Ok(renderer.render_student(&student)?)
    })
    .await
    .map_err(|e| MarksheetError::Internal(format!("Render task panicked: {}", e)))?
}

/// Render every student's report into `out_dir` as `<reg no>.pdf`.
///
/// Progress events go to `config.progress_callback`. An empty list writes
/// nothing and does not need pdfium.
pub async fn render_reports_to_dir(
    students: &[StudentData],
    out_dir: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<BatchSummary, MarksheetError> {
    if students.is_empty() {
        info!("No students to render");
        return Ok(BatchSummary::default());
    }

    let students = students.to_vec();
    let out_dir: PathBuf = out_dir.as_ref().to_path_buf();
    let config = config.clone();
    tokio::task::spawn_blocking(move || -> Result<BatchSummary, MarksheetError> {
        let renderer = PdfReportRenderer::from_config(&config)?;
        let progress = config.progress_callback.as_deref();
        Ok(report::render_batch(&renderer, &students, &out_dir, progress)?)
    })
    .await
    .map_err(|e| MarksheetError::Internal(format!("Batch task panicked: {}", e)))?
}

/// Write the master JSON export of `students` to `path`.
pub fn write_master_export(students: &[StudentData], path: impl AsRef<Path>) -> Result<(), MarksheetError> {
    Ok(report::write_master_export(students, path.as_ref())?)
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn parse_in_background(
    format: InputFormat,
    bytes: Vec<u8>,
    source: String,
    config: &ProcessingConfig,
) -> Result<LoadOutput, MarksheetError> {
    let config = config.clone();
    let students = tokio::task::spawn_blocking(move || parse_bytes(format, &bytes, &config))
        .await
        .map_err(|e| MarksheetError::Internal(format!("Parse task panicked: {}", e)))??;

    let stats = ParsingStats::from_students(&students);
    Ok(LoadOutput {
        students,
        stats,
        format,
        source,
    })
}

/// Blocking parse of `bytes` in `format` into normalised records.
fn parse_bytes(
    format: InputFormat,
    bytes: &[u8],
    config: &ProcessingConfig,
) -> Result<Vec<StudentData>, MarksheetError> {
    let students = match format {
        InputFormat::Csv => normalize::normalize_rows(&tabular::parse_csv(bytes, config)?, config)?,
        InputFormat::Spreadsheet => {
            normalize::normalize_rows(&tabular::parse_spreadsheet(bytes, config)?, config)?
        }
        InputFormat::Pdf => {
            let extractor = PdfiumTextExtractor::new(bind_pdfium(config)?);
            parse_document(&extractor, bytes, config)?
        }
        InputFormat::Json => import::parse_master_json(bytes, config)?,
    };
    Ok(students)
}
