//! XLSX input, with fixtures authored by rust_xlsxwriter.

use marksheet_report::{
    load_students, load_students_from_bytes, InputFormat, Mark, MarksheetError, ParseError,
    ProcessingConfig, SubjectStatus,
};
use rust_xlsxwriter::Workbook;

fn results_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let header = ["USN", "Name", "Branch", "Data Structures", "Algorithms", "Networks"];
    for (col, h) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *h).unwrap();
    }

    sheet.write_string(1, 0, "1RV20CS001").unwrap();
    sheet.write_string(1, 1, "Alice Smith").unwrap();
    sheet.write_string(1, 2, "CSE").unwrap();
    sheet.write_number(1, 3, 78).unwrap();
    sheet.write_string(1, 4, "AB").unwrap();
    sheet.write_number(1, 5, 64.5).unwrap();

    // row 2 left blank on purpose

    sheet.write_string(3, 0, "1RV20CS002").unwrap();
    sheet.write_string(3, 1, "Bob Jones").unwrap();
    sheet.write_string(3, 2, "CSE").unwrap();
    sheet.write_number(3, 3, 41).unwrap();
    sheet.write_number(3, 4, 90).unwrap();
    // Networks left empty: not recorded for Bob

    sheet.write_string(4, 0, "1RV20CS003").unwrap();
    sheet.write_string(4, 1, "Carol White").unwrap();
    sheet.write_number(4, 3, 12).unwrap();
    sheet.write_string(4, 4, "F").unwrap();
    sheet.write_number(4, 5, 55).unwrap();

    workbook.save_to_buffer().unwrap()
}

#[tokio::test]
async fn first_sheet_is_parsed() {
    let output = load_students_from_bytes("results.xlsx", results_workbook(), &ProcessingConfig::default())
        .await
        .unwrap();
    assert_eq!(output.format, InputFormat::Spreadsheet);
    assert_eq!(output.students.len(), 3);

    let alice = &output.students[0];
    assert_eq!(alice.reg_no, "1RV20CS001");
    assert_eq!(alice.department, "CSE");
    assert_eq!(alice.subjects[0].mark, Mark::Score(78.0));
    assert_eq!(alice.subjects[1].status, SubjectStatus::Absent);
    assert_eq!(alice.subjects[2].mark, Mark::Score(64.5));
    assert_eq!(alice.total_marks, 142.5);

    let bob = &output.students[1];
    assert_eq!(bob.subjects.len(), 2);
    assert!(bob.passed());
    assert_eq!(bob.total_marks, 131.0);

    let carol = &output.students[2];
    assert_eq!(carol.department, "");
    assert_eq!(carol.subjects[1].status, SubjectStatus::Fail);
    assert_eq!(carol.total_marks, 55.0);

    assert_eq!(output.stats.total_passed, 1);
}

#[tokio::test]
async fn workbook_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("RESULTS.XLSX");
    std::fs::write(&path, results_workbook()).unwrap();

    let output = load_students(&path, &ProcessingConfig::default()).await.unwrap();
    assert_eq!(output.students.len(), 3);
}

#[tokio::test]
async fn sheet_without_reg_no_column() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_string(0, 1, "Math").unwrap();
    sheet.write_string(1, 0, "Alice").unwrap();
    sheet.write_number(1, 1, 50).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let err = load_students_from_bytes("results.xlsx", bytes, &ProcessingConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MarksheetError::Parse(ParseError::MissingColumn { .. })));
}

#[tokio::test]
async fn corrupt_workbook() {
    let err = load_students_from_bytes("results.xls", b"not a workbook".to_vec(), &ProcessingConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MarksheetError::Parse(ParseError::Spreadsheet { .. })));
}
