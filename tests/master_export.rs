//! Master JSON export and its re-import.

use marksheet_report::{
    export_master, load_students, load_students_from_bytes, write_master_export, InputFormat,
    ProcessingConfig, StudentData,
};

const CSV: &str = "RegNo,Name,Department,Math,Science,English\n\
S001,Alice,CSE,AB,55,72.5\n\
S002,Bob,ECE,88,F,40\n";

async fn two_students() -> Vec<StudentData> {
    load_students_from_bytes("marks.csv", CSV.as_bytes().to_vec(), &ProcessingConfig::default())
        .await
        .unwrap()
        .students
}

#[tokio::test]
async fn export_reimport_is_lossless() {
    let students = two_students().await;
    assert_eq!(students.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.json");
    write_master_export(&students, &path).unwrap();

    let output = load_students(&path, &ProcessingConfig::default()).await.unwrap();
    assert_eq!(output.format, InputFormat::Json);
    assert_eq!(output.students.len(), 2);
    assert_eq!(output.students, students);
}

#[test]
fn export_is_a_json_array_of_records() {
    let students = tokio_test::block_on(two_students());
    let json = export_master(&students).unwrap();

    let parsed: Vec<StudentData> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, students);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["regNo"], "S002");
    assert_eq!(records[1]["subjects"][1]["marks"], "F");
    assert_eq!(records[1]["subjects"][1]["status"], "FAIL");
    assert_eq!(records[1]["resultStatus"], "FAIL");
}

#[tokio::test]
async fn malformed_export_is_a_parse_error() {
    let err = load_students_from_bytes("students.json", b"[{\"regNo\": 1,}]".to_vec(), &ProcessingConfig::default())
        .await
        .unwrap_err();
    assert!(err.is_parse_error());
}
