mod utils;

use std::fs;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use tempfile::TempDir;
use tsframe::time::Zone;
use tsframe::utils::io::{FileFormat, read_frame, write_frame};
use tsframe::utils::test::frames_equal;
use tsframe::{Error, Frame};
use utils::hourly_frame;

fn shanghai_frame() -> Frame {
    Frame::from_columns(
        vec![
            ("v", Arc::new(Float64Array::from(vec![Some(1.5), None, Some(f64::NAN)])) as ArrayRef),
            ("time", utils::hours(&[0, 1, 2], Zone::parse("Asia/Shanghai").ok())),
            ("id", Arc::new(StringArray::from(vec!["a", "b", "c"])) as ArrayRef),
        ],
        Some("time"),
    )
    .unwrap()
}

#[test]
fn test_binary_formats_keep_the_index() {
    let dir = TempDir::new().unwrap();
    let frame = shanghai_frame();
    for name in ["table.feather", "table.parquet", "TABLE.PARQUET"] {
        let path = dir.path().join(name);
        write_frame(&frame, &path, None).unwrap();
        let back = read_frame(&path).unwrap();
        assert!(frames_equal(&frame, &back), "{name} changed the frame");
        assert_eq!(back.index_name(), Some("time"));
    }
}

#[test]
fn test_index_can_be_left_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("values.parquet");
    write_frame(&shanghai_frame(), &path, Some(false)).unwrap();
    let back = read_frame(&path).unwrap();
    assert!(back.index_name().is_none());
    assert_eq!(back.columns(), vec!["v", "id"]);
}

#[test]
fn test_csv_round_trip_without_index() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.csv");
    let frame = Frame::from_columns(
        vec![
            ("id", Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef),
            ("v", Arc::new(Float64Array::from(vec![Some(1.5), None])) as ArrayRef),
        ],
        None,
    )
    .unwrap();
    write_frame(&frame, &path, None).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let back = read_frame(&path).unwrap();
    assert!(frames_equal(&frame, &back));
}

#[test]
fn test_csv_writes_named_index() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("indexed.csv");
    write_frame(&hourly_frame(&[0], vec![Some(2.0)]), &path, None).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.trim_start_matches('\u{feff}').starts_with("time,v\n"));
}

#[test]
fn test_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.xls");
    let err = write_frame(&shanghai_frame(), &path, None).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { ref suffix, .. } if suffix == ".xls"));
    assert!(read_frame(dir.path().join("no_extension")).is_err());
    assert_eq!(
        FileFormat::from_path(std::path::Path::new("a/b.Feather")).unwrap(),
        FileFormat::Feather
    );
}
