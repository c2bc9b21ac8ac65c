//! CSV input through the whole pipeline: parse, normalise, grade, aggregate.

use marksheet_report::{
    load_students, load_students_from_bytes, Mark, MarksheetError, ParseError, ProcessingConfig,
    ResultStatus, SubjectStatus, TotalPolicy,
};
use std::path::PathBuf;

fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn alice_absent_in_math() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "marks.csv", "RegNo,Name,Math,Science\nS001,Alice,AB,55\n");

    let output = load_students(&path, &ProcessingConfig::default()).await.unwrap();
    assert_eq!(output.students.len(), 1);

    let alice = &output.students[0];
    assert_eq!(alice.reg_no, "S001");
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.subjects[0].subject, "Math");
    assert_eq!(alice.subjects[0].mark, Mark::Token("AB".into()));
    assert_eq!(alice.subjects[0].status, SubjectStatus::Absent);
    assert_eq!(alice.subjects[1].mark, Mark::Score(55.0));
    assert_eq!(alice.subjects[1].status, SubjectStatus::Pass);
    assert_eq!(alice.result_status, ResultStatus::Fail);
    assert_eq!(alice.absent_count, 1);
    assert_eq!(alice.total_marks, 55.0);
}

#[tokio::test]
async fn n_rows_give_n_records_in_order() {
    let csv = "\
Reg No,Student Name,Dept,CS501,CS502,MA501
1RV20CS010,Zed,CSE,45,50,60
1RV20CS002,Amy,CSE,F,70,80
,Nameless,ECE,90,90,90
1RV20CS010,Zed Again,CSE,10,AB,ab
1RV20CS005,Eve,ECE,39.5,40,100
";
    let output = load_students_from_bytes("batch.csv", csv.as_bytes().to_vec(), &ProcessingConfig::default())
        .await
        .unwrap();

    let reg_nos: Vec<&str> = output.students.iter().map(|s| s.reg_no.as_str()).collect();
    assert_eq!(
        reg_nos,
        vec!["1RV20CS010", "1RV20CS002", "", "1RV20CS010", "1RV20CS005"]
    );

    for s in &output.students {
        let all_pass = s.subjects.iter().all(|m| m.status == SubjectStatus::Pass);
        assert_eq!(s.passed(), all_pass, "{}", s.reg_no);

        let absent = s.subjects.iter().filter(|m| m.status == SubjectStatus::Absent).count();
        assert_eq!(s.absent_count, absent, "{}", s.reg_no);

        let passed_total: f64 = s
            .subjects
            .iter()
            .filter(|m| m.status == SubjectStatus::Pass)
            .filter_map(|m| m.mark.score())
            .sum();
        assert_eq!(s.total_marks, passed_total, "{}", s.reg_no);
    }

    assert_eq!(output.students[2].department, "ECE");
    assert_eq!(output.students[3].absent_count, 2);
    assert_eq!(output.students[4].subjects[0].status, SubjectStatus::Fail);

    let stats = &output.stats;
    assert_eq!(stats.total_students, 5);
    assert_eq!(stats.total_passed, 2);
    assert_eq!(stats.total_failed, 3);
    // totals: 155, 150, 270, 0, 140
    assert!((stats.average_score - 143.0).abs() < 1e-9);
}

#[tokio::test]
async fn all_scores_policy_and_threshold() {
    let config = ProcessingConfig::builder()
        .pass_threshold(50.0)
        .total_policy(TotalPolicy::AllScores)
        .build()
        .unwrap();
    let output = load_students_from_bytes(
        "marks.csv",
        b"RegNo,Math,Physics,Chem\nS1,45,60,AB\n".to_vec(),
        &config,
    )
    .await
    .unwrap();
    let s = &output.students[0];
    assert_eq!(s.subjects[0].status, SubjectStatus::Fail);
    assert_eq!(s.total_marks, 105.0);
}

#[tokio::test]
async fn skipped_and_blank_columns_are_not_subjects() {
    let config = ProcessingConfig::builder().skip_column("SGPA").build().unwrap();
    let output = load_students_from_bytes(
        "marks.csv",
        b"RegNo,Name,,Math,SGPA\nS1,Ann,x,70,8.2\n".to_vec(),
        &config,
    )
    .await
    .unwrap();
    let subjects: Vec<&str> = output.students[0].subjects.iter().map(|s| s.subject.as_str()).collect();
    assert_eq!(subjects, vec!["Math"]);
}

#[tokio::test]
async fn empty_cells_and_unknown_tokens() {
    let output = load_students_from_bytes(
        "marks.csv",
        b"RegNo,Math,Physics,Chem\nS1,,75,Withheld\n".to_vec(),
        &ProcessingConfig::default(),
    )
    .await
    .unwrap();
    let s = &output.students[0];
    assert_eq!(s.subjects.len(), 2);
    assert_eq!(s.subjects[1].mark, Mark::Token("Withheld".into()));
    assert_eq!(s.subjects[1].status, SubjectStatus::Fail);
    assert_eq!(s.result_status, ResultStatus::Fail);
}

#[tokio::test]
async fn header_only_file_is_an_empty_batch() {
    let output = load_students_from_bytes("marks.csv", b"RegNo,Name,Math\n".to_vec(), &ProcessingConfig::default())
        .await
        .unwrap();
    assert!(output.students.is_empty());
    assert_eq!(output.stats.total_students, 0);
    assert_eq!(output.stats.average_score, 0.0);
}

#[tokio::test]
async fn duplicates_can_be_rejected() {
    let config = ProcessingConfig::builder()
        .duplicate_policy(marksheet_report::DuplicatePolicy::Reject)
        .build()
        .unwrap();
    let err = load_students_from_bytes("marks.csv", b"RegNo,Math\nS1,50\nS2,60\nS1,70\n".to_vec(), &config)
        .await
        .unwrap_err();
    match err {
        MarksheetError::Parse(ParseError::DuplicateRegistration { reg_no, first, second }) => {
            assert_eq!(reg_no, "S1");
            assert_eq!((first, second), (1, 3));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_file_and_missing_column() {
    let err = load_students("/no/such/results.csv", &ProcessingConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MarksheetError::FileNotFound { .. }));

    let err = load_students_from_bytes("marks.csv", b"Name,Math\nAnn,50\n".to_vec(), &ProcessingConfig::default())
        .await
        .unwrap_err();
    assert!(err.is_parse_error());
    assert!(matches!(err, MarksheetError::Parse(ParseError::MissingColumn { .. })));
}
