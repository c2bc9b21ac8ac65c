//! Batch rendering: one report file per student.
//!
//! Students are rendered and written strictly one after another. The first
//! failure stops the batch; files written before it are left in place.

use crate::error::RenderError;
use crate::model::StudentData;
use crate::progress::BatchProgressCallback;
use crate::report::export::write_atomic;
use crate::report::ReportRenderer;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a completed batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Number of students in the batch.
    pub total: usize,
    /// Files written, in student order.
    pub written: Vec<PathBuf>,
    /// Total bytes written.
    pub bytes: u64,
}

/// File name of a student's report: `<reg no>.pdf`.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`; a blank registration
/// number gives `student.pdf`.
pub fn report_file_name(student: &StudentData) -> String {
    format!("{}.pdf", file_stem(&student.reg_no))
}

fn file_stem(reg_no: &str) -> String {
    let stem: String = reg_no
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "student".to_string()
    } else {
        stem.to_string()
    }
}

/// Pick a name not yet used in this batch by appending `-2`, `-3`, ….
fn unique_name(stem: &str, used: &mut HashSet<String>) -> String {
    let mut name = format!("{}.pdf", stem);
    let mut n = 2;
    while !used.insert(name.to_ascii_lowercase()) {
        name = format!("{}-{}.pdf", stem, n);
        n += 1;
    }
    name
}

/// Render every student and write `<reg no>.pdf` files into `out_dir`.
///
/// An empty list is a no-op: nothing is created and an empty summary is
/// returned.
pub fn render_batch(
    renderer: &dyn ReportRenderer,
    students: &[StudentData],
    out_dir: &Path,
    progress: Option<&dyn BatchProgressCallback>,
) -> Result<BatchSummary, RenderError> {
    let total = students.len();
    let mut summary = BatchSummary {
        total,
        ..BatchSummary::default()
    };
    if students.is_empty() {
        info!("No students to render");
        return Ok(summary);
    }

    std::fs::create_dir_all(out_dir).map_err(|e| RenderError::WriteFailed {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    if let Some(cb) = progress {
        cb.on_batch_start(total);
    }

    let mut used = HashSet::new();
    for (idx, student) in students.iter().enumerate() {
        let index = idx + 1;
        if let Some(cb) = progress {
            cb.on_student_start(index, total, &student.reg_no);
        }

        let name = unique_name(&file_stem(&student.reg_no), &mut used);
        let path = out_dir.join(&name);
        let result = renderer
            .render_student(student)
            .and_then(|bytes| write_atomic(&path, &bytes).map(|_| bytes.len()));

        match result {
            Ok(len) => {
                debug!("Wrote {} ({} bytes)", path.display(), len);
                if let Some(cb) = progress {
                    cb.on_student_complete(index, total, &student.reg_no, len);
                }
                summary.bytes += len as u64;
                summary.written.push(path);
            }
            Err(e) => {
                warn!("Report for '{}' failed: {}", student.reg_no, e);
                if let Some(cb) = progress {
                    cb.on_student_error(index, total, &student.reg_no, &e.to_string());
                    cb.on_batch_complete(total, summary.written.len());
                }
                return Err(RenderError::BatchAborted {
                    reg_no: student.reg_no.clone(),
                    completed: summary.written.len(),
                    total,
                    source: Box::new(e),
                });
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_batch_complete(total, summary.written.len());
    }
    info!("Rendered {} reports into {}", summary.written.len(), out_dir.display());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TotalPolicy;

    fn student(reg_no: &str) -> StudentData {
        StudentData::from_subjects(reg_no, "", "", Vec::new(), TotalPolicy::PassedOnly)
    }

    #[test]
    fn file_names_are_sanitised() {
        assert_eq!(report_file_name(&student("1RV20CS001")), "1RV20CS001.pdf");
        assert_eq!(report_file_name(&student("S/001 A")), "S_001_A.pdf");
        assert_eq!(report_file_name(&student("../etc")), "_etc.pdf");
        assert_eq!(report_file_name(&student("")), "student.pdf");
        assert_eq!(report_file_name(&student("  ")), "student.pdf");
    }

    #[test]
    fn collisions_get_suffixes() {
        let mut used = HashSet::new();
        assert_eq!(unique_name("S1", &mut used), "S1.pdf");
        assert_eq!(unique_name("S1", &mut used), "S1-2.pdf");
        assert_eq!(unique_name("s1", &mut used), "s1-3.pdf");
        assert_eq!(unique_name("S2", &mut used), "S2.pdf");
    }
}
