//! Stats aggregation over a batch of student records.

use crate::model::{ParsingStats, ResultStatus, StudentData};

impl ParsingStats {
    /// Summarise `students`. An empty slice gives all zeros.
    pub fn from_students(students: &[StudentData]) -> Self {
        let total_students = students.len();
        let total_passed = students
            .iter()
            .filter(|s| s.result_status == ResultStatus::Pass)
            .count();
        let total_failed = total_students - total_passed;
        let average_score = if total_students == 0 {
            0.0
        } else {
            students.iter().map(|s| s.total_marks).sum::<f64>() / total_students as f64
        };

        Self {
            total_students,
            total_passed,
            total_failed,
            average_score,
        }
    }

    /// Share of students that passed, in percent. 0 for an empty batch.
    pub fn pass_rate(&self) -> f64 {
        if self.total_students == 0 {
            0.0
        } else {
            self.total_passed as f64 * 100.0 / self.total_students as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TotalPolicy;
    use crate::model::{Mark, SubjectMark, SubjectStatus};

    fn student(total: f64, status: SubjectStatus) -> StudentData {
        StudentData::from_subjects(
            "S",
            "",
            "",
            vec![SubjectMark::new("Math", Mark::Score(total), status)],
            TotalPolicy::AllScores,
        )
    }

    #[test]
    fn empty_list_is_all_zero() {
        let s = ParsingStats::from_students(&[]);
        assert_eq!(s.total_students, 0);
        assert_eq!(s.total_passed, 0);
        assert_eq!(s.total_failed, 0);
        assert_eq!(s.average_score, 0.0);
        assert!(!s.average_score.is_nan());
        assert_eq!(s.pass_rate(), 0.0);
    }

    #[test]
    fn average_of_forty_and_eighty() {
        let s = ParsingStats::from_students(&[
            student(40.0, SubjectStatus::Pass),
            student(80.0, SubjectStatus::Pass),
        ]);
        assert_eq!(s.average_score, 60.0);
        assert_eq!(s.total_passed, 2);
    }

    #[test]
    fn counts_pass_and_fail() {
        let s = ParsingStats::from_students(&[
            student(70.0, SubjectStatus::Pass),
            student(20.0, SubjectStatus::Fail),
            student(0.0, SubjectStatus::Absent),
        ]);
        assert_eq!(s.total_students, 3);
        assert_eq!(s.total_passed, 1);
        assert_eq!(s.total_failed, 2);
        assert_eq!(s.average_score, 30.0);
        assert!((s.pass_rate() - 33.333).abs() < 0.01);
    }
}
