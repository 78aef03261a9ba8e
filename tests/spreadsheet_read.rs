//! Spreadsheet reader tests against real xlsx files built on the fly.

use std::fs;
use std::path::Path;

use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

use docmerge::error::ParseError;
use docmerge::spreadsheet::read_records;

fn write_workbook(path: &Path, rows: &[Vec<&str>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (row, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            worksheet
                .write_string(row as u32, col as u16, *cell)
                .expect("write cell");
        }
    }
    workbook.save(path).expect("save workbook");
}

#[test]
fn header_row_defines_field_names() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("people.xlsx");
    write_workbook(
        &path,
        &[
            vec!["name", "date"],
            vec!["Alice", "2024-01-01"],
            vec!["Bob", "2024-01-02"],
        ],
    );

    let records = read_records(&path).expect("read records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("name"), Some("Alice"));
    assert_eq!(records[0].get("date"), Some("2024-01-01"));
    assert_eq!(records[1].get("name"), Some("Bob"));
}

#[test]
fn blank_rows_are_skipped() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("gaps.xlsx");
    write_workbook(
        &path,
        &[
            vec!["name"],
            vec!["Alice"],
            vec![""],
            vec!["Bob"],
        ],
    );

    let records = read_records(&path).expect("read records");
    let names: Vec<_> = records.iter().filter_map(|r| r.get("name")).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);

    // Row numbers stay anchored to the worksheet, not the surviving records.
    let rows: Vec<_> = records.iter().map(|r| r.row()).collect();
    assert_eq!(rows, vec![2, 4]);
}

#[test]
fn numbers_are_stringified_without_trailing_zero() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("numbers.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "count").expect("header");
    worksheet.write_number(1, 0, 42.0).expect("integral");
    worksheet.write_number(2, 0, 1.5).expect("fractional");
    workbook.save(&path).expect("save workbook");

    let records = read_records(&path).expect("read records");
    assert_eq!(records[0].get("count"), Some("42"));
    assert_eq!(records[1].get("count"), Some("1.5"));
}

#[test]
fn repeated_reads_yield_identical_records() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("stable.xlsx");
    write_workbook(
        &path,
        &[
            vec!["name", "city"],
            vec!["Alice", "Lyon"],
            vec!["Bob", "Nantes"],
        ],
    );

    let first = read_records(&path).expect("first read");
    let second = read_records(&path).expect("second read");
    assert_eq!(first, second);
}

#[test]
fn invalid_file_is_a_parse_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("not-a-workbook.xlsx");
    fs::write(&path, b"this is not a zip archive").expect("write garbage");

    let err = read_records(&path).expect_err("garbage must not parse");
    assert!(matches!(err, ParseError::Open { .. }));
}

#[test]
fn workbook_without_rows_is_missing_its_header() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("empty.xlsx");
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    workbook.save(&path).expect("save workbook");

    let err = read_records(&path).expect_err("empty sheet has no header");
    assert!(matches!(err, ParseError::MissingHeader(_)));
}
