//! Canonical student records and the batch summary.
//!
//! Every input format ends up as a list of [`StudentData`]. Records are
//! built once through [`StudentData::from_subjects`], which derives the
//! total, overall result and absent count from the subject marks, and are
//! never mutated afterwards.

use crate::config::TotalPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-subject outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubjectStatus {
    Pass,
    Fail,
    Absent,
}

impl SubjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectStatus::Pass => "PASS",
            SubjectStatus::Fail => "FAIL",
            SubjectStatus::Absent => "ABSENT",
        }
    }

    /// Display colour tag for this status.
    pub fn color(&self) -> ColorTag {
        match self {
            SubjectStatus::Pass => ColorTag::Green,
            SubjectStatus::Fail => ColorTag::Red,
            SubjectStatus::Absent => ColorTag::Amber,
        }
    }
}

impl fmt::Display for SubjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall result of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    Pass,
    Fail,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Pass => "PASS",
            ResultStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display tag consumed by presentation layers (table cell colour, badge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Green,
    Red,
    Amber,
}

impl ColorTag {
    /// RGB triple used by the PDF renderer.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            ColorTag::Green => (22, 163, 74),
            ColorTag::Red => (220, 38, 38),
            ColorTag::Amber => (217, 119, 6),
        }
    }
}

/// A subject mark: a numeric score or a non-numeric token such as `AB` or `F`.
///
/// Serialises untagged, so a score is a JSON number and a token a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Mark {
    Score(f64),
    Token(String),
}

impl Mark {
    /// The numeric score, if this mark is one.
    pub fn score(&self) -> Option<f64> {
        match self {
            Mark::Score(s) => Some(*s),
            Mark::Token(_) => None,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Score(s) => f.write_str(&format_number(*s)),
            Mark::Token(t) => f.write_str(t),
        }
    }
}

/// Format a score without a trailing `.0` for whole numbers.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// One subject row of a student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMark {
    pub subject: String,
    #[serde(rename = "marks")]
    pub mark: Mark,
    pub status: SubjectStatus,
    pub color: ColorTag,
}

impl SubjectMark {
    /// Build a subject row; the colour follows from the status.
    pub fn new(subject: impl Into<String>, mark: Mark, status: SubjectStatus) -> Self {
        Self {
            subject: subject.into(),
            mark,
            status,
            color: status.color(),
        }
    }
}

/// A normalised student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentData {
    pub reg_no: String,
    pub name: String,
    pub department: String,
    pub subjects: Vec<SubjectMark>,
    pub total_marks: f64,
    pub result_status: ResultStatus,
    pub absent_count: usize,
}

impl StudentData {
    /// Build a record, deriving total, result and absent count from `subjects`.
    pub fn from_subjects(
        reg_no: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
        subjects: Vec<SubjectMark>,
        policy: TotalPolicy,
    ) -> Self {
        let total_marks = subjects
            .iter()
            .filter(|s| policy.counts(s.status))
            .filter_map(|s| s.mark.score())
            .sum();

        let result_status = if subjects.iter().all(|s| s.status == SubjectStatus::Pass) {
            ResultStatus::Pass
        } else {
            ResultStatus::Fail
        };

        let absent_count = subjects
            .iter()
            .filter(|s| s.status == SubjectStatus::Absent)
            .count();

        Self {
            reg_no: reg_no.into(),
            name: name.into(),
            department: department.into(),
            subjects,
            total_marks,
            result_status,
            absent_count,
        }
    }

    pub fn passed(&self) -> bool {
        self.result_status == ResultStatus::Pass
    }
}

/// Summary counts over one batch of students.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsingStats {
    pub total_students: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub average_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(name: &str, mark: Mark, status: SubjectStatus) -> SubjectMark {
        SubjectMark::new(name, mark, status)
    }

    #[test]
    fn derived_fields_passed_only() {
        let s = StudentData::from_subjects(
            "S1",
            "Alice",
            "CSE",
            vec![
                subject("Math", Mark::Score(72.0), SubjectStatus::Pass),
                subject("Physics", Mark::Score(30.0), SubjectStatus::Fail),
                subject("Chem", Mark::Token("AB".into()), SubjectStatus::Absent),
            ],
            TotalPolicy::PassedOnly,
        );
        assert_eq!(s.total_marks, 72.0);
        assert_eq!(s.result_status, ResultStatus::Fail);
        assert_eq!(s.absent_count, 1);
    }

    #[test]
    fn all_scores_policy_counts_failed_numbers() {
        let s = StudentData::from_subjects(
            "S1",
            "",
            "",
            vec![
                subject("Math", Mark::Score(72.0), SubjectStatus::Pass),
                subject("Physics", Mark::Score(30.0), SubjectStatus::Fail),
                subject("Chem", Mark::Token("F".into()), SubjectStatus::Fail),
            ],
            TotalPolicy::AllScores,
        );
        assert_eq!(s.total_marks, 102.0);
    }

    #[test]
    fn zero_subjects_is_a_pass() {
        let s = StudentData::from_subjects("S1", "", "", vec![], TotalPolicy::PassedOnly);
        assert!(s.passed());
        assert_eq!(s.total_marks, 0.0);
        assert_eq!(s.absent_count, 0);
    }

    #[test]
    fn color_follows_status() {
        let m = SubjectMark::new("Math", Mark::Token("AB".into()), SubjectStatus::Absent);
        assert_eq!(m.color, ColorTag::Amber);
    }

    #[test]
    fn json_shape() {
        let s = StudentData::from_subjects(
            "S001",
            "Alice",
            "",
            vec![
                subject("Math", Mark::Token("AB".into()), SubjectStatus::Absent),
                subject("Science", Mark::Score(55.0), SubjectStatus::Pass),
            ],
            TotalPolicy::PassedOnly,
        );
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["regNo"], "S001");
        assert_eq!(v["resultStatus"], "FAIL");
        assert_eq!(v["absentCount"], 1);
        assert_eq!(v["subjects"][0]["marks"], "AB");
        assert_eq!(v["subjects"][0]["status"], "ABSENT");
        assert_eq!(v["subjects"][0]["color"], "amber");
        assert_eq!(v["subjects"][1]["marks"], 55.0);
    }

    #[test]
    fn mark_display() {
        assert_eq!(Mark::Score(55.0).to_string(), "55");
        assert_eq!(Mark::Score(67.5).to_string(), "67.5");
        assert_eq!(Mark::Token("AB".into()).to_string(), "AB");
        assert_eq!(format_number(60.0), "60");
        assert_eq!(format_number(61.333), "61.33");
    }
}
