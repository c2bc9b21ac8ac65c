//! Error types for the marksheet-report library.
//!
//! Three error types map onto the three ways an operation can fail:
//!
//! * [`ParseError`] — the uploaded file could not be turned into student
//!   records (corrupt archive, bad encoding, no extractable table). A
//!   session that sees this clears its previous results.
//!
//! * [`RenderError`] — producing a report artifact failed. Artifacts that
//!   were already written stay on disk; nothing is rolled back.
//!
//! * [`MarksheetError`] — the fatal error returned by every public entry
//!   point. It wraps the two above plus file-level and setup failures
//!   (missing file, unsupported extension, pdfium not available).
//!
//! No error is retried by the library. Callers re-invoke the operation.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the marksheet-report library.
#[derive(Debug, Error)]
pub enum MarksheetError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Result file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension is not one of the accepted formats.
    #[error("Unsupported file type '{extension}' for '{path}'\nAccepted: .pdf, .csv, .xlsx, .xls, .json")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The file has a `.pdf` extension but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// The file content could not be parsed into student records.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A report artifact could not be produced.
    #[error(transparent)]
    Render(#[from] RenderError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the input file after it was resolved.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF input and PDF reports need the pdfium shared library.\n\
  • Install libpdfium system-wide, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    /// No student with the requested registration number is loaded.
    #[error("No student with registration number '{reg_no}'")]
    StudentNotFound { reg_no: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarksheetError {
    /// True for failures of the "input not understood" kind.
    ///
    /// File-level rejections (unsupported type, not a PDF) count as parse
    /// failures: the user picked a file the parser cannot read.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            MarksheetError::Parse(_)
                | MarksheetError::UnsupportedFormat { .. }
                | MarksheetError::NotAPdf { .. }
        )
    }

    /// True when report generation failed.
    pub fn is_render_error(&self) -> bool {
        matches!(self, MarksheetError::Render(_))
    }
}

/// The uploaded file does not have a structure the parsers understand.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    /// The CSV reader rejected the content.
    #[error("Malformed CSV at line {line}: {detail}")]
    Csv { line: u64, detail: String },

    /// The content is not valid UTF-8 text.
    #[error("Input is not valid UTF-8 text: {detail}")]
    Encoding { detail: String },

    /// The spreadsheet archive could not be opened or decoded.
    #[error("Spreadsheet could not be read: {detail}")]
    Spreadsheet { detail: String },

    /// The workbook contains no worksheet.
    #[error("Spreadsheet has no worksheet")]
    NoWorksheet,

    /// The header row lacks a required identity column.
    #[error("No '{column}' column found in header row {header:?}")]
    MissingColumn { column: String, header: Vec<String> },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF")]
    WrongPassword,

    /// Text extraction failed for a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtraction { page: usize, detail: String },

    /// The document text contains no registration numbers at all.
    #[error("No student records found in {pages} page(s) of extracted text")]
    NoRecordsFound { pages: usize },

    /// A re-imported master export is not valid JSON for the record schema.
    #[error("Invalid master export JSON at line {line}, column {column}: {detail}")]
    InvalidJson {
        line: usize,
        column: usize,
        detail: String,
    },

    /// A registration number appeared twice and duplicates are rejected.
    #[error("Registration number '{reg_no}' appears more than once (rows {first} and {second})")]
    DuplicateRegistration {
        reg_no: String,
        first: usize,
        second: usize,
    },
}

/// Report generation failed.
#[derive(Debug, Error)]
pub enum RenderError {
    /// pdfium failed while building the document.
    #[error("PDF rendering failed for '{reg_no}': {detail}")]
    Pdf { reg_no: String, detail: String },

    /// The records could not be serialised.
    #[error("Failed to serialise records: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An artifact could not be written to disk.
    #[error("Failed to write report '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch stopped at its first failing student.
    ///
    /// The `completed` artifacts written before the failure remain on disk.
    #[error("Batch stopped at '{reg_no}' after {completed}/{total} reports: {source}")]
    BatchAborted {
        reg_no: String,
        completed: usize,
        total: usize,
        #[source]
        source: Box<RenderError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_aborted_display() {
        let e = RenderError::BatchAborted {
            reg_no: "S003".into(),
            completed: 2,
            total: 5,
            source: Box::new(RenderError::Pdf {
                reg_no: "S003".into(),
                detail: "font missing".into(),
            }),
        };
        let msg = e.to_string();
        assert!(msg.contains("2/5"), "got: {msg}");
        assert!(msg.contains("S003"));
        assert!(msg.contains("font missing"));
    }

    #[test]
    fn parse_error_is_transparent() {
        let e: MarksheetError = ParseError::NoRecordsFound { pages: 3 }.into();
        assert_eq!(
            e.to_string(),
            "No student records found in 3 page(s) of extracted text"
        );
        assert!(e.is_parse_error());
        assert!(!e.is_render_error());
    }

    #[test]
    fn unsupported_format_counts_as_parse_error() {
        let e = MarksheetError::UnsupportedFormat {
            path: PathBuf::from("marks.docx"),
            extension: "docx".into(),
        };
        assert!(e.is_parse_error());
        assert!(e.to_string().contains(".xlsx"));
    }

    #[test]
    fn missing_column_lists_header() {
        let e = ParseError::MissingColumn {
            column: "registration number".into(),
            header: vec!["Name".into(), "Math".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("registration number"));
        assert!(msg.contains("Math"));
    }

    #[test]
    fn render_error_wraps_into_fatal() {
        let e: MarksheetError = RenderError::Pdf {
            reg_no: "S1".into(),
            detail: "boom".into(),
        }
        .into();
        assert!(e.is_render_error());
    }
}
