//! Row normalisation: generic rows → [`StudentData`].
//!
//! Identity columns are recognised by name (case and punctuation are
//! ignored, so `Reg No`, `REG_NO` and `regno` are the same column).
//! Serial-number columns (`S.No`, `Sl. No`, ...) are ignored. Every other
//! non-blank column is a subject. The normalizer never drops a row:
//! N input rows give N records in the same order.

use crate::config::{DuplicatePolicy, ProcessingConfig};
use crate::error::ParseError;
use crate::model::StudentData;
use crate::pipeline::evaluate::grade_subject;
use crate::pipeline::row::RawRow;
use std::collections::HashMap;
use tracing::{debug, info, warn};

const REG_NO_ALIASES: &[&str] = &[
    "regno",
    "regnumber",
    "registrationno",
    "registrationnumber",
    "registerno",
    "registernumber",
    "rollno",
    "rollnumber",
    "usn",
    "studentid",
    "enrollmentno",
    "enrollmentnumber",
    "enrolmentno",
    "hallticketno",
];

const NAME_ALIASES: &[&str] = &["name", "studentname", "fullname", "candidatename"];

const DEPARTMENT_ALIASES: &[&str] = &["department", "dept", "branch", "program", "programme"];

const SERIAL_ALIASES: &[&str] = &["sno", "slno", "srno", "serialno", "serialnumber"];

/// Column name the document parser uses for registration numbers.
pub const REG_NO_COLUMN: &str = "RegNo";
/// Column name the document parser uses for student names.
pub const NAME_COLUMN: &str = "Name";
/// Column name the document parser uses for departments.
pub const DEPARTMENT_COLUMN: &str = "Department";

/// Role a header plays in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    RegNo,
    Name,
    Department,
    Subject,
    Ignored,
}

fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Classify one header.
pub fn column_role(header: &str, config: &ProcessingConfig) -> ColumnRole {
    let key = header_key(header);
    if key.is_empty() || SERIAL_ALIASES.contains(&key.as_str()) || config.is_skipped_column(header) {
        ColumnRole::Ignored
    } else if REG_NO_ALIASES.contains(&key.as_str()) {
        ColumnRole::RegNo
    } else if NAME_ALIASES.contains(&key.as_str()) {
        ColumnRole::Name
    } else if DEPARTMENT_ALIASES.contains(&key.as_str()) {
        ColumnRole::Department
    } else {
        ColumnRole::Subject
    }
}

/// Fail unless `header` contains a registration-number column.
pub fn require_reg_no_column(header: &[String], config: &ProcessingConfig) -> Result<(), ParseError> {
    if header
        .iter()
        .any(|h| column_role(h, config) == ColumnRole::RegNo)
    {
        Ok(())
    } else {
        Err(ParseError::MissingColumn {
            column: "registration number".into(),
            header: header.to_vec(),
        })
    }
}

/// Map one row to a student record.
///
/// The first column of each identity role wins; later duplicates are ignored.
pub fn normalize_row(row: &RawRow, config: &ProcessingConfig) -> StudentData {
    let mut reg_no: Option<String> = None;
    let mut name: Option<String> = None;
    let mut department: Option<String> = None;
    let mut subjects = Vec::new();

    for (column, value) in row.iter() {
        match column_role(column, config) {
            ColumnRole::RegNo => {
                reg_no.get_or_insert_with(|| value.as_text());
            }
            ColumnRole::Name => {
                name.get_or_insert_with(|| value.as_text());
            }
            ColumnRole::Department => {
                department.get_or_insert_with(|| value.as_text());
            }
            ColumnRole::Subject => {
                if let Some(mark) = grade_subject(column.trim(), value, &config.grading) {
                    subjects.push(mark);
                }
            }
            ColumnRole::Ignored => {}
        }
    }

    let student = StudentData::from_subjects(
        reg_no.unwrap_or_default(),
        name.unwrap_or_default(),
        department.unwrap_or_default(),
        subjects,
        config.total_policy,
    );
    debug!(
        "Normalised {} → {} subjects, {}",
        student.reg_no,
        student.subjects.len(),
        student.result_status
    );
    student
}

/// Normalise every row, preserving order, then apply the duplicate policy.
pub fn normalize_rows(rows: &[RawRow], config: &ProcessingConfig) -> Result<Vec<StudentData>, ParseError> {
    let students: Vec<StudentData> = rows.iter().map(|r| normalize_row(r, config)).collect();

    let missing = students.iter().filter(|s| s.reg_no.is_empty()).count();
    if missing > 0 {
        warn!("{} row(s) have no registration number", missing);
    }

    check_duplicates(&students, config.duplicate_policy)?;
    info!("Normalised {} student records", students.len());
    Ok(students)
}

/// Apply the duplicate policy. Blank registration numbers are never duplicates.
pub fn check_duplicates(students: &[StudentData], policy: DuplicatePolicy) -> Result<(), ParseError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, s) in students.iter().enumerate() {
        if s.reg_no.is_empty() {
            continue;
        }
        if let Some(&first) = seen.get(s.reg_no.as_str()) {
            match policy {
                DuplicatePolicy::Keep => {
                    warn!(
                        "Registration number '{}' repeats (rows {} and {}); keeping both",
                        s.reg_no,
                        first + 1,
                        i + 1
                    );
                }
                DuplicatePolicy::Reject => {
                    return Err(ParseError::DuplicateRegistration {
                        reg_no: s.reg_no.clone(),
                        first: first + 1,
                        second: i + 1,
                    });
                }
            }
        } else {
            seen.insert(s.reg_no.as_str(), i);
        }
    }
    Ok(())
}
