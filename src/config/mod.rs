//! Configuration for tsframe.

use std::path::PathBuf;

use crate::utils::logging::{Level, RotateWhen};

/// Default batch size for reading tabular files
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Configuration for tabular file reading and writing
#[derive(Debug, Clone)]
pub struct IoConfig {
    /// Number of rows per batch when reading
    pub batch_size: usize,
    /// Field delimiter for CSV files
    pub csv_delimiter: u8,
    /// Prefix written CSV files with a UTF-8 byte order mark
    pub csv_bom: bool,
    /// Number of rows used to infer a CSV schema (`None` reads the whole file)
    pub infer_rows: Option<usize>,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            csv_delimiter: b',',
            csv_bom: true,
            infer_rows: None,
        }
    }
}

impl IoConfig {
    /// Build a configuration from `TSFRAME_BATCH_SIZE` and
    /// `TSFRAME_CSV_DELIMITER`, falling back to the defaults
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(batch_size) = std::env::var("TSFRAME_BATCH_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            config.batch_size = batch_size;
        }
        if let Some(delimiter) = std::env::var("TSFRAME_CSV_DELIMITER")
            .ok()
            .and_then(|s| s.bytes().next())
        {
            config.csv_delimiter = delimiter;
        }
        config
    }
}

/// Formats tried, in order, when a string has to become a timestamp
#[derive(Debug, Clone)]
pub struct TimeParseConfig {
    /// Formats carrying a UTC offset
    pub offset_formats: Vec<String>,
    /// Formats without zone information
    pub naive_formats: Vec<String>,
    /// Date-only formats, read as midnight
    pub date_formats: Vec<String>,
}

impl Default for TimeParseConfig {
    fn default() -> Self {
        Self {
            offset_formats: vec![
                "%Y-%m-%dT%H:%M:%S%.f%:z".to_string(), // 2021-06-15T12:30:00.5+08:00
                "%Y-%m-%d %H:%M:%S%.f%:z".to_string(),
                "%Y-%m-%dT%H:%M:%S%.f%z".to_string(), // 2021-06-15T12:30:00+0800
                "%Y-%m-%d %H:%M:%S%.f%z".to_string(),
            ],
            naive_formats: vec![
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
                "%Y-%m-%dT%H:%M".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
                "%Y/%m/%d %H:%M:%S%.f".to_string(),
                "%Y%m%d%H%M%S".to_string(),
            ],
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%Y/%m/%d".to_string(),
                "%Y%m%d".to_string(),
            ],
        }
    }
}

/// Logging setup used by the command line tool
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level written by every handler
    pub level: Level,
    /// Size-rotated log file
    pub file: Option<PathBuf>,
    /// Rollover threshold in bytes, 0 disables rollover
    pub max_bytes: u64,
    /// Number of rotated files kept
    pub backup_count: usize,
    /// Calendar-rotated log file
    pub timed_file: Option<PathBuf>,
    /// Rollover unit for the calendar-rotated file
    pub when: RotateWhen,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            file: None,
            max_bytes: 10 * 1024 * 1024,
            backup_count: 5,
            timed_file: None,
            when: RotateWhen::Day,
        }
    }
}
