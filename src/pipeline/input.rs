//! Input resolution: validate a user-supplied path and pick its format.
//!
//! The format is chosen from the file extension. PDFs are additionally
//! checked for the `%PDF` magic bytes so a mislabelled file fails with a
//! meaningful error instead of a pdfium one. The size limit is advisory:
//! an oversized file is logged and still processed.

use crate::error::MarksheetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    Csv,
    /// XLSX or XLS workbook; only the first sheet is read.
    Spreadsheet,
    Pdf,
    /// A master export being re-imported.
    Json,
}

impl InputFormat {
    /// Detect the format from a file name's extension (case-insensitive).
    pub fn from_file_name(name: &Path) -> Option<Self> {
        let ext = name.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(InputFormat::Csv),
            "xlsx" | "xls" => Some(InputFormat::Spreadsheet),
            "pdf" => Some(InputFormat::Pdf),
            "json" => Some(InputFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InputFormat::Csv => "csv",
            InputFormat::Spreadsheet => "spreadsheet",
            InputFormat::Pdf => "pdf",
            InputFormat::Json => "json",
        };
        f.write_str(s)
    }
}

/// A local input file whose format is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub format: InputFormat,
    pub size_bytes: u64,
}

/// Pick the format of `path` or fail with `UnsupportedFormat`.
pub fn detect_format(path: &Path) -> Result<InputFormat, MarksheetError> {
    InputFormat::from_file_name(path).ok_or_else(|| MarksheetError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension: path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default(),
    })
}

/// Resolve a local file path, validating existence, permissions and format.
pub fn resolve_input(path: impl AsRef<Path>, max_size: u64) -> Result<ResolvedInput, MarksheetError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(MarksheetError::FileNotFound { path });
    }

    let format = detect_format(&path)?;

    // Check read permission by attempting to open
    match std::fs::File::open(&path) {
        Ok(mut f) if format == InputFormat::Pdf => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(MarksheetError::NotAPdf { path, magic });
            }
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(MarksheetError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(MarksheetError::FileNotFound { path });
        }
    }

    let size_bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    check_size(&path, size_bytes, max_size);

    debug!("Resolved {} input: {}", format, path.display());
    Ok(ResolvedInput {
        path,
        format,
        size_bytes,
    })
}

/// Log a warning when `size` exceeds the advisory limit. Never fails.
pub fn check_size(path: &Path, size: u64, max_size: u64) -> bool {
    let over = size > max_size;
    if over {
        warn!(
            "{} is {} bytes, above the advised {} bytes; processing anyway",
            path.display(),
            size,
            max_size
        );
    }
    over
}

/// Check in-memory bytes declared as PDF for the magic header.
pub fn check_pdf_magic(path: &Path, bytes: &[u8]) -> Result<(), MarksheetError> {
    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(MarksheetError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}
