//! Report artifacts: per-student PDFs and the master JSON export.
//!
//! * [`pdf`]    — pdfium-backed single-student report layout
//! * [`batch`]  — one report per student, written sequentially to a directory
//! * [`export`] — the master JSON dump and atomic file writes

pub mod batch;
pub mod export;
pub mod pdf;

use crate::error::RenderError;
use crate::model::StudentData;

/// Produces the bytes of one student's report.
///
/// The batch writer only depends on this trait, so it can be driven by the
/// pdfium renderer or by any other implementation.
pub trait ReportRenderer {
    fn render_student(&self, student: &StudentData) -> Result<Vec<u8>, RenderError>;
}

pub use batch::{render_batch, report_file_name, BatchSummary};
pub use export::{export_master, write_master_export};
pub use pdf::PdfReportRenderer;
