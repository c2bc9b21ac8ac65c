//! Batch rendering with a stand-in renderer, so no pdfium is needed.

use marksheet_report::report::render_batch;
use marksheet_report::sample::sample_students;
use marksheet_report::{
    BatchProgressCallback, ProcessingConfig, RenderError, ReportRenderer, StudentData, TotalPolicy,
};
use std::sync::Mutex;

/// Writes the registration number as the "report"; fails for one student.
struct FakeRenderer {
    fail_on: Option<&'static str>,
}

impl ReportRenderer for FakeRenderer {
    fn render_student(&self, student: &StudentData) -> Result<Vec<u8>, RenderError> {
        if self.fail_on == Some(student.reg_no.as_str()) {
            return Err(RenderError::Pdf {
                reg_no: student.reg_no.clone(),
                detail: "boom".into(),
            });
        }
        Ok(student.reg_no.as_bytes().to_vec())
    }
}

#[derive(Default)]
struct Events(Mutex<Vec<String>>);

impl BatchProgressCallback for Events {
    fn on_batch_start(&self, total: usize) {
        self.0.lock().unwrap().push(format!("start {total}"));
    }
    fn on_student_complete(&self, index: usize, _total: usize, reg_no: &str, _bytes: usize) {
        self.0.lock().unwrap().push(format!("ok {index} {reg_no}"));
    }
    fn on_student_error(&self, index: usize, _total: usize, reg_no: &str, _error: &str) {
        self.0.lock().unwrap().push(format!("err {index} {reg_no}"));
    }
    fn on_batch_complete(&self, total: usize, completed: usize) {
        self.0.lock().unwrap().push(format!("done {completed}/{total}"));
    }
}

fn student(reg_no: &str) -> StudentData {
    StudentData::from_subjects(reg_no, "", "", Vec::new(), TotalPolicy::PassedOnly)
}

#[test]
fn empty_batch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reports");
    let summary = render_batch(&FakeRenderer { fail_on: None }, &[], &out, None).unwrap();
    assert_eq!(summary.total, 0);
    assert!(summary.written.is_empty());
    assert!(!out.exists());
}

#[test]
fn every_student_gets_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let students = sample_students(&ProcessingConfig::default());
    let events = Events::default();

    let summary = render_batch(&FakeRenderer { fail_on: None }, &students, dir.path(), Some(&events)).unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.written.len(), 5);
    for s in &students {
        let path = dir.path().join(format!("{}.pdf", s.reg_no));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), s.reg_no);
    }

    let events = events.0.lock().unwrap();
    assert_eq!(events.first().map(String::as_str), Some("start 5"));
    assert_eq!(events.last().map(String::as_str), Some("done 5/5"));
}

#[test]
fn first_failure_aborts_and_keeps_earlier_files() {
    let dir = tempfile::tempdir().unwrap();
    let students = vec![student("S1"), student("S2"), student("S3"), student("S4")];
    let events = Events::default();

    let err = render_batch(&FakeRenderer { fail_on: Some("S3") }, &students, dir.path(), Some(&events))
        .unwrap_err();
    match err {
        RenderError::BatchAborted { reg_no, completed, total, .. } => {
            assert_eq!(reg_no, "S3");
            assert_eq!(completed, 2);
            assert_eq!(total, 4);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(dir.path().join("S1.pdf").exists());
    assert!(dir.path().join("S2.pdf").exists());
    assert!(!dir.path().join("S3.pdf").exists());
    assert!(!dir.path().join("S4.pdf").exists());

    let events = events.0.lock().unwrap();
    assert!(events.contains(&"err 3 S3".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("done 2/4"));
}

#[test]
fn duplicate_and_blank_reg_nos_do_not_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let students = vec![student("S1"), student("S1"), student(""), student("")];

    let summary = render_batch(&FakeRenderer { fail_on: None }, &students, dir.path(), None).unwrap();

    let names: Vec<String> = summary
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["S1.pdf", "S1-2.pdf", "student.pdf", "student-2.pdf"]);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
}
