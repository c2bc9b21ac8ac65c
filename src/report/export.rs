//! Master JSON export and atomic artifact writes.

use crate::error::RenderError;
use crate::model::StudentData;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Default file name of the master export.
pub const MASTER_EXPORT_FILE: &str = "students.json";

/// Serialise every record, in order, as a pretty-printed JSON array.
pub fn export_master(students: &[StudentData]) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(students)?)
}

/// Write the master export to `path`.
pub fn write_master_export(students: &[StudentData], path: &Path) -> Result<(), RenderError> {
    let json = export_master(students)?;
    write_atomic(path, json.as_bytes())?;
    info!("Master export written: {} records → {}", students.len(), path.display());
    Ok(())
}

/// Write `bytes` to `path` through a temp file in the same directory and a
/// rename, so readers never see a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let write_failed = |source: std::io::Error| RenderError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_failed)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(bytes).map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
