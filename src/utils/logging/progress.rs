//! Progress bars for batch conversions

use indicatif::{ProgressBar, ProgressStyle};

/// Template of the bar shown while converting a set of files
pub const DEFAULT_MAIN_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Create a progress bar with the standard style
///
/// # Arguments
/// * `length` - Total number of steps
/// * `description` - Optional description to display as the initial message
///
/// # Returns
/// A configured `ProgressBar`
#[must_use]
pub fn create_main_progress_bar(length: u64, description: Option<&str>) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(DEFAULT_MAIN_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    let pb = ProgressBar::new(length).with_style(style);
    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }
    pb
}

/// Finish a progress bar with an optional completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    match message {
        Some(msg) => pb.finish_with_message(msg.to_string()),
        None => pb.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_length_and_message() {
        let pb = create_main_progress_bar(3, Some("Converting"));
        assert_eq!(pb.length(), Some(3));
        assert_eq!(pb.message(), "Converting");
        pb.inc(3);
        finish_progress_bar(&pb, Some("done"));
        assert!(pb.is_finished());
    }
}
