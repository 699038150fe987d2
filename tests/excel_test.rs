use std::fs;
use std::path::Path;

use arrow::array::Array;
use arrow::datatypes::DataType;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;
use tsframe::utils::io::{excel_to_csv, read_excel};

fn write_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["name", "count", "ratio", "ok"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "a").unwrap();
    sheet.write_number(1, 1, 1).unwrap();
    sheet.write_number(1, 2, 0.5).unwrap();
    sheet.write_boolean(1, 3, true).unwrap();
    sheet.write_string(2, 0, "b").unwrap();
    sheet.write_number(2, 1, 2).unwrap();
    sheet.write_boolean(2, 3, false).unwrap();
    workbook.save(path).unwrap();
}

#[test]
fn test_read_excel_infers_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.xlsx");
    write_workbook(&path);

    let frame = read_excel(&path).unwrap();
    assert_eq!(frame.columns(), vec!["name", "count", "ratio", "ok"]);
    assert_eq!(frame.num_rows(), 2);
    assert_eq!(frame.column("name").unwrap().data_type(), &DataType::Utf8);
    assert_eq!(frame.column("count").unwrap().data_type(), &DataType::Int64);
    assert_eq!(frame.column("ratio").unwrap().data_type(), &DataType::Float64);
    assert!(frame.column("ratio").unwrap().is_null(1));
    assert_eq!(frame.column("ok").unwrap().data_type(), &DataType::Boolean);
}

#[test]
fn test_excel_to_csv_mirrors_parent_folder() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let site = src.path().join("site_a");
    fs::create_dir_all(&site).unwrap();
    write_workbook(&site.join("report.xlsx"));
    // lock files are hidden and not workbooks
    fs::write(site.join(".~lock.report.xlsx"), "not a workbook").unwrap();

    let out = dst.path().join("csv");
    let written = excel_to_csv(src.path(), &out).unwrap();
    let expected = out.join("site_a").join("report.csv");
    assert_eq!(written, vec![expected.clone()]);

    let bytes = fs::read(&expected).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert_eq!(text, "name,count,ratio,ok\na,1,0.5,true\nb,2,,false\n");
}

#[test]
fn test_excel_to_csv_reports_broken_workbook() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("broken.xlsx"), "not a zip archive").unwrap();
    assert!(excel_to_csv(src.path(), dst.path()).is_err());
}
