//! Built-in sample batch, for demos and for exercising reports without an
//! input file.

use crate::config::ProcessingConfig;
use crate::model::{ParsingStats, StudentData};
use crate::pipeline::evaluate::grade_subject;
use crate::pipeline::row::CellValue;

const SUBJECTS: [&str; 4] = ["Mathematics", "Physics", "Chemistry", "English"];

// reg no, name, department, one mark per subject
const ROWS: [(&str, &str, &str, [&str; 4]); 5] = [
    ("1RV23CS001", "Aarav Sharma", "Computer Science", ["88", "76", "91", "69"]),
    ("1RV23CS002", "Diya Nair", "Computer Science", ["35", "62", "AB", "58"]),
    ("1RV23CS003", "Kabir Mehta", "Computer Science", ["72", "F", "64", "81"]),
    ("1RV23EC001", "Meera Iyer", "Electronics", ["94", "89", "85", "90"]),
    ("1RV23EC002", "Rohan Das", "Electronics", ["AB", "AB", "47", "52"]),
];

/// The sample students, graded and totalled as `config` says.
pub fn sample_students(config: &ProcessingConfig) -> Vec<StudentData> {
    let rules = &config.grading;
    ROWS.iter()
        .map(|(reg_no, name, department, marks)| {
            let subjects = SUBJECTS
                .iter()
                .zip(marks.iter())
                .filter_map(|(subject, mark)| grade_subject(subject, &CellValue::text(mark), rules))
                .collect();
            StudentData::from_subjects(*reg_no, *name, *department, subjects, config.total_policy)
        })
        .collect()
}

/// Statistics of the sample batch under the default configuration.
pub fn sample_stats() -> ParsingStats {
    ParsingStats::from_students(&sample_students(&ProcessingConfig::default()))
}
