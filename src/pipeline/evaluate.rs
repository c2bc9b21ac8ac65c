//! Result evaluation: mark → PASS / FAIL / ABSENT.
//!
//! Sentinel tokens win over the threshold: an absent token is ABSENT and a
//! fail token is FAIL whatever the threshold is. Numeric scores pass when
//! they reach the threshold. Any other text is kept verbatim and graded
//! FAIL.

use crate::config::GradingRules;
use crate::model::{Mark, SubjectMark, SubjectStatus};
use crate::pipeline::row::CellValue;

/// Turn a raw cell into a [`Mark`]. Returns `None` for an empty cell.
///
/// Text that parses as a finite non-negative number becomes a score;
/// everything else (sentinels, negative numbers, garbage) becomes a token.
pub fn classify(value: &CellValue) -> Option<Mark> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) if n.is_finite() && *n >= 0.0 => Some(Mark::Score(*n)),
        CellValue::Number(n) => Some(Mark::Token(n.to_string())),
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            match parse_score(s) {
                Some(n) => Some(Mark::Score(n)),
                None => Some(Mark::Token(s.to_string())),
            }
        }
    }
}

/// Parse a non-negative decimal score.
pub fn parse_score(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Grade a mark against the rules.
pub fn evaluate(mark: &Mark, rules: &GradingRules) -> SubjectStatus {
    match mark {
        Mark::Score(s) if *s >= rules.pass_threshold => SubjectStatus::Pass,
        Mark::Score(_) => SubjectStatus::Fail,
        Mark::Token(t) if rules.is_absent_token(t) => SubjectStatus::Absent,
        Mark::Token(_) => SubjectStatus::Fail,
    }
}

/// Classify and grade one subject cell. `None` when the cell is empty.
pub fn grade_subject(subject: &str, value: &CellValue, rules: &GradingRules) -> Option<SubjectMark> {
    let mark = classify(value)?;
    if let Mark::Token(t) = &mark {
        if !rules.is_sentinel(t) {
            tracing::warn!("Unrecognised mark '{}' for subject '{}' graded FAIL", t, subject);
        }
    }
    let status = evaluate(&mark, rules);
    Some(SubjectMark::new(subject, mark, status))
}
