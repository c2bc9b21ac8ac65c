//! Pipeline stages for result-sheet ingestion.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own and a format can change without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ tabular (csv / calamine) ───────────────┐
//! input ─────┤                                            ├─▶ normalize ─▶ aggregate
//! (format)   └─▶ extract (pdfium) ─▶ document (tokens) ──┘   (evaluate)
//!
//! input ─▶ import (master JSON) ─▶ aggregate
//! ```
//!
//! 1. [`input`]     — validate the path and choose the format by extension
//! 2. [`tabular`]   — CSV and XLSX/XLS → header-keyed [`row::RawRow`]s
//! 3. [`extract`]   — page text through pdfium; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 4. [`document`]  — best-effort tokeniser that recovers rows from PDF text
//! 5. [`normalize`] — rows → `StudentData`, grading every subject via
//!    [`evaluate`]
//! 6. [`aggregate`] — batch statistics
//!
//! [`import`] re-reads a master export and re-derives every record.

pub mod aggregate;
pub mod document;
pub mod evaluate;
pub mod extract;
pub mod import;
pub mod input;
pub mod normalize;
pub mod row;
pub mod tabular;

use crate::config::ProcessingConfig;
use crate::error::ParseError;
use crate::model::StudentData;
use extract::TextExtractor;

/// Extract, tokenise and normalise a result PDF.
pub fn parse_document(
    extractor: &dyn TextExtractor,
    bytes: &[u8],
    config: &ProcessingConfig,
) -> Result<Vec<StudentData>, ParseError> {
    let pages = extractor.extract_pages(bytes, config.password.as_deref())?;
    let rows = document::parse_document_text(&pages, config)?;
    normalize::normalize_rows(&rows, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubjectStatus;

    struct Pages(Vec<&'static str>);

    impl TextExtractor for Pages {
        fn extract_pages(&self, _bytes: &[u8], _password: Option<&str>) -> Result<Vec<String>, ParseError> {
            Ok(self.0.iter().map(|p| p.to_string()).collect())
        }
    }

    #[test]
    fn document_text_becomes_students() {
        let extractor = Pages(vec![
            "Department: CSE\nUSN Name 21CS51 21CS52\n1RV21CS001 Asha Rao 78 AB\n1RV21CS002 Ravi 35 66",
        ]);
        let students = parse_document(&extractor, b"%PDF", &ProcessingConfig::default()).unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].reg_no, "1RV21CS001");
        assert_eq!(students[0].name, "Asha Rao");
        assert_eq!(students[0].department, "CSE");
        assert_eq!(students[0].subjects[1].status, SubjectStatus::Absent);
        assert_eq!(students[1].subjects[0].status, SubjectStatus::Fail);
    }

    #[test]
    fn extraction_errors_propagate() {
        struct Locked;
        impl TextExtractor for Locked {
            fn extract_pages(&self, _: &[u8], _: Option<&str>) -> Result<Vec<String>, ParseError> {
                Err(ParseError::PasswordRequired)
            }
        }
        let err = parse_document(&Locked, b"%PDF", &ProcessingConfig::default()).unwrap_err();
        assert_eq!(err, ParseError::PasswordRequired);
    }
}
