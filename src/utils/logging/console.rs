//! Console output for the command line tool

use std::time::Duration;

use arrow::util::pretty::pretty_format_batches;

use crate::error::Result;
use crate::frame::Frame;

/// Print row and column counts of a frame
pub fn print_frame_summary(frame: &Frame, elapsed: Duration) {
    println!(
        "{} rows x {} columns in {:?}",
        frame.num_rows(),
        frame.num_columns(),
        elapsed
    );
    if let Some(index) = frame.index_name() {
        println!("Index: {index}");
    }
}

/// Print the schema, index column first
pub fn print_schema_info(frame: &Frame) {
    println!("Schema:");
    for field in frame.schema().fields() {
        println!("  - {} ({})", field.name(), field.data_type());
    }
}

/// Render the first `num_rows` rows as a table
///
/// # Errors
/// Returns an Arrow error if a value cannot be formatted
pub fn format_head(frame: &Frame, num_rows: usize) -> Result<String> {
    let head = frame.batch().slice(0, num_rows.min(frame.num_rows()));
    Ok(pretty_format_batches(&[head])?.to_string())
}
