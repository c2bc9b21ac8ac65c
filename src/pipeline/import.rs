//! Re-import of a master export.
//!
//! Only the identity fields and the raw marks are trusted. Statuses,
//! colours, totals and absent counts are derived again with the active
//! grading rules, so a file exported under one threshold can be
//! reprocessed under another.

use crate::config::ProcessingConfig;
use crate::error::ParseError;
use crate::model::{Mark, StudentData};
use crate::pipeline::evaluate::grade_subject;
use crate::pipeline::normalize::check_duplicates;
use crate::pipeline::row::CellValue;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedStudent {
    #[serde(default)]
    reg_no: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    subjects: Vec<ImportedSubject>,
}

#[derive(Debug, Deserialize)]
struct ImportedSubject {
    subject: String,
    marks: Mark,
}

/// Parse a master export (a JSON array of student records).
pub fn parse_master_json(bytes: &[u8], config: &ProcessingConfig) -> Result<Vec<StudentData>, ParseError> {
    let imported: Vec<ImportedStudent> =
        serde_json::from_slice(bytes).map_err(|e| ParseError::InvalidJson {
            line: e.line(),
            column: e.column(),
            detail: e.to_string(),
        })?;

    let students: Vec<StudentData> = imported
        .into_iter()
        .map(|s| {
            let subjects = s
                .subjects
                .iter()
                .filter_map(|sub| {
                    let cell = match &sub.marks {
                        Mark::Score(n) => CellValue::Number(*n),
                        Mark::Token(t) => CellValue::text(t),
                    };
                    grade_subject(&sub.subject, &cell, &config.grading)
                })
                .collect();
            StudentData::from_subjects(s.reg_no, s.name, s.department, subjects, config.total_policy)
        })
        .collect();

    check_duplicates(&students, config.duplicate_policy)?;
    info!("Master export imported: {} students", students.len());
    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResultStatus, SubjectStatus};

    const EXPORT: &str = r#"[
      {
        "regNo": "S001",
        "name": "Alice",
        "department": "CSE",
        "subjects": [
          {"subject": "Math", "marks": "AB", "status": "ABSENT", "color": "amber"},
          {"subject": "Science", "marks": 55, "status": "PASS", "color": "green"}
        ],
        "totalMarks": 55.0,
        "resultStatus": "FAIL",
        "absentCount": 1
      }
    ]"#;

    #[test]
    fn statuses_are_rederived() {
        let students = parse_master_json(EXPORT.as_bytes(), &ProcessingConfig::default()).unwrap();
        assert_eq!(students.len(), 1);
        let alice = &students[0];
        assert_eq!(alice.subjects[0].status, SubjectStatus::Absent);
        assert_eq!(alice.subjects[1].mark, Mark::Score(55.0));
        assert_eq!(alice.total_marks, 55.0);
        assert_eq!(alice.result_status, ResultStatus::Fail);
    }

    #[test]
    fn new_threshold_applies_on_reimport() {
        let config = ProcessingConfig::builder().pass_threshold(60.0).build().unwrap();
        let students = parse_master_json(EXPORT.as_bytes(), &config).unwrap();
        assert_eq!(students[0].subjects[1].status, SubjectStatus::Fail);
        assert_eq!(students[0].total_marks, 0.0);
    }

    #[test]
    fn stale_derived_fields_are_ignored() {
        let json = r#"[{"regNo":"S9","subjects":[{"subject":"Art","marks":90,"status":"FAIL"}],"resultStatus":"FAIL"}]"#;
        let students = parse_master_json(json.as_bytes(), &ProcessingConfig::default()).unwrap();
        assert_eq!(students[0].result_status, ResultStatus::Pass);
        assert_eq!(students[0].name, "");
    }

    #[test]
    fn malformed_json_reports_position() {
        let err = parse_master_json(b"[\n  {\"regNo\": }\n]", &ProcessingConfig::default()).unwrap_err();
        match err {
            ParseError::InvalidJson { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn object_instead_of_array_is_rejected() {
        let err = parse_master_json(b"{\"regNo\": \"S1\"}", &ProcessingConfig::default()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }
}
