use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::info;
use serde_json::Value;

use tsframe::frame::{set_index, set_timeidx};
use tsframe::time::{complete_timeindex, try_parse_iso8601};
use tsframe::utils::foldermeta::FolderMeta;
use tsframe::utils::io::{excel_to_csv, read_frame, write_frame};
use tsframe::utils::logging::{self, Level, RotateWhen, format_head, print_frame_summary};
use tsframe::{Frequency, LogConfig, Zone, to_iso8601};

/// Time-series table utilities
#[derive(Debug, Parser)]
#[command(name = "tsframe", version, about)]
struct Cli {
    /// Size-rotated log file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Calendar-rotated log file
    #[arg(long, global = true)]
    timed_log_file: Option<PathBuf>,

    /// Rollover unit for the calendar-rotated file (S, M, H, D, midnight, W0-W6)
    #[arg(long, global = true, default_value = "D")]
    when: RotateWhen,

    /// Rollover threshold of the size-rotated file
    #[arg(long, global = true, default_value_t = 10 * 1024 * 1024)]
    max_bytes: u64,

    /// Number of rotated log files kept
    #[arg(long, global = true, default_value_t = 5)]
    backup_count: usize,

    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert every .xlsx workbook below SRC to CSV under DST
    Excel2csv { src: PathBuf, dst: PathBuf },

    /// Convert a table between CSV, Feather and Parquet
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Column to use as index
        #[arg(long)]
        key: Option<String>,
        /// Write the index (`true`/`false`); by default only a named index is written
        #[arg(long)]
        index: Option<bool>,
    },

    /// Fill gaps in a time-indexed table
    Complete {
        input: PathBuf,
        output: PathBuf,
        /// Time column to index on
        #[arg(long)]
        key: String,
        /// Step of the completed index, e.g. 5min or 1h
        #[arg(long)]
        freq: Frequency,
        /// Timezone the index is converted to
        #[arg(long)]
        tz: Option<Zone>,
        /// Snap the ends of the index to midnight
        #[arg(long)]
        normalize: bool,
    },

    /// Convert between ISO-8601 text and epoch milliseconds
    Iso {
        /// An ISO-8601 timestamp or epoch milliseconds
        value: String,
    },

    /// Show or edit folder metadata
    Meta {
        #[command(subcommand)]
        action: MetaAction,
    },

    /// Print the first rows of a table
    Head {
        input: PathBuf,
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,
    },
}

#[derive(Debug, Subcommand)]
enum MetaAction {
    /// Print the metadata of a folder
    Show { folder: PathBuf },
    /// Set a key, reading the value as JSON and falling back to a string
    Set {
        folder: PathBuf,
        key: String,
        value: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = LogConfig {
        level: if cli.verbose { Level::Debug } else { Level::Info },
        file: cli.log_file.clone(),
        max_bytes: cli.max_bytes,
        backup_count: cli.backup_count,
        timed_file: cli.timed_log_file.clone(),
        when: cli.when,
    };
    let _log = logging::init(env!("CARGO_PKG_NAME"), &config).context("Failed to set up logging")?;

    match cli.command {
        Command::Excel2csv { src, dst } => {
            let start = Instant::now();
            let written = excel_to_csv(&src, &dst)
                .with_context(|| format!("Failed to convert workbooks in {}", src.display()))?;
            info!("Wrote {} CSV files in {:?}", written.len(), start.elapsed());
        }
        Command::Convert {
            input,
            output,
            key,
            index,
        } => {
            let start = Instant::now();
            let mut frame = read_frame(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            if let Some(key) = key {
                if !set_index(&mut frame, &key)? {
                    bail!("Column '{key}' not found in {}", input.display());
                }
            }
            write_frame(&frame, &output, index)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_frame_summary(&frame, start.elapsed());
        }
        Command::Complete {
            input,
            output,
            key,
            freq,
            tz,
            normalize,
        } => {
            let start = Instant::now();
            let mut frame = read_frame(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            if !set_timeidx(&mut frame, &key, tz.as_ref())? {
                bail!("Column '{key}' not found in {}", input.display());
            }
            let completed = complete_timeindex(&frame, freq, normalize)
                .with_context(|| format!("Failed to complete the index of {}", input.display()))?;
            write_frame(&completed, &output, None)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_frame_summary(&completed, start.elapsed());
        }
        Command::Iso { value } => {
            if let Ok(millis) = value.trim().parse::<i64>() {
                match to_iso8601(millis) {
                    Some(text) => println!("{text}"),
                    None => bail!("{millis} is out of range"),
                }
            } else {
                match try_parse_iso8601(&value) {
                    Some(millis) => println!("{millis}"),
                    None => bail!("No ISO-8601 timestamp found in '{value}'"),
                }
            }
        }
        Command::Meta { action } => match action {
            MetaAction::Show { folder } => {
                let mut meta = FolderMeta::new(&folder);
                meta.load();
                println!("{}", tsframe::utils::json::dumps(&*meta)?);
            }
            MetaAction::Set { folder, key, value } => {
                let mut meta = FolderMeta::new(&folder);
                meta.load();
                let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
                meta.insert(key, value);
                let path = meta.dump().context("Failed to write metadata")?;
                info!("Updated {}", path.display());
            }
        },
        Command::Head { input, rows } => {
            let frame = read_frame(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            println!("{}", format_head(&frame, rows)?);
        }
    }

    Ok(())
}
