//! Named logging context with console and rotating file handlers
//!
//! A [`Log`] is created by the caller and shared by cloning. Handlers are
//! attached per kind at most once. The context implements [`log::Log`], so it
//! can also be installed as the global backend for the `log` macros.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Datelike, Local, NaiveTime, TimeDelta, TimeZone};

use crate::error::{Error, Result};

/// Record layout written by every handler
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a record, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Matching filter for the `log` facade
    #[must_use]
    pub const fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Debug => log::LevelFilter::Debug,
            Self::Info => log::LevelFilter::Info,
            Self::Warning => log::LevelFilter::Warn,
            Self::Error | Self::Critical => log::LevelFilter::Error,
        }
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => Self::Debug,
            log::Level::Info => Self::Info,
            log::Level::Warn => Self::Warning,
            log::Level::Error => Self::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        })
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            _ => Err(Error::type_mismatch("log level", s)),
        }
    }
}

/// When a timed handler starts a new file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateWhen {
    Second,
    Minute,
    Hour,
    Day,
    /// At midnight, local time
    Midnight,
    /// At midnight before the given weekday, 0 being Monday
    Weekday(u8),
}

impl RotateWhen {
    fn unit_seconds(self) -> i64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3600,
            Self::Day | Self::Midnight => 86_400,
            Self::Weekday(_) => 7 * 86_400,
        }
    }

    /// Suffix appended to rotated file names
    const fn suffix_format(self) -> &'static str {
        match self {
            Self::Second => "%Y-%m-%d_%H-%M-%S",
            Self::Minute => "%Y-%m-%d_%H-%M",
            Self::Hour => "%Y-%m-%d_%H",
            Self::Day | Self::Midnight | Self::Weekday(_) => "%Y-%m-%d",
        }
    }
}

impl FromStr for RotateWhen {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "S" => Ok(Self::Second),
            "M" => Ok(Self::Minute),
            "H" => Ok(Self::Hour),
            "D" => Ok(Self::Day),
            "MIDNIGHT" => Ok(Self::Midnight),
            _ => match upper.strip_prefix('W').and_then(|d| d.parse::<u8>().ok()) {
                Some(day) if day <= 6 => Ok(Self::Weekday(day)),
                _ => Err(Error::type_mismatch("S, M, H, D, midnight or W0-W6", s)),
            },
        }
    }
}

/// Kinds of handler a context can carry, one of each at most
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Console,
    RotatingFile,
    TimedRotatingFile,
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Size-based rotation: `f` becomes `f.1`, `f.1` becomes `f.2` and so on
#[derive(Debug)]
pub(crate) struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    size: u64,
}

impl RotatingFile {
    pub(crate) fn open(path: &Path, max_bytes: u64, backup_count: usize) -> io::Result<Self> {
        let (file, size) = open_append(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            max_bytes,
            backup_count,
            file,
            size,
        })
    }

    fn should_rollover(&self, incoming: u64) -> bool {
        self.max_bytes > 0 && self.backup_count > 0 && self.size + incoming >= self.max_bytes
    }

    fn rollover(&mut self) -> io::Result<()> {
        self.file.flush()?;
        for i in (1..self.backup_count).rev() {
            let src = with_suffix(&self.path, &i.to_string());
            if src.exists() {
                let dst = with_suffix(&self.path, &(i + 1).to_string());
                if dst.exists() {
                    fs::remove_file(&dst)?;
                }
                fs::rename(&src, &dst)?;
            }
        }
        let first = with_suffix(&self.path, "1");
        if first.exists() {
            fs::remove_file(&first)?;
        }
        if self.path.exists() {
            fs::rename(&self.path, &first)?;
        }
        let (file, size) = open_append(&self.path)?;
        self.file = file;
        self.size = size;
        Ok(())
    }

    pub(crate) fn write_line(&mut self, line: &str) -> io::Result<()> {
        let incoming = line.len() as u64 + 1;
        if self.should_rollover(incoming) {
            self.rollover()?;
        }
        writeln!(self.file, "{line}")?;
        self.size += incoming;
        Ok(())
    }
}

/// Time-based rotation with dated suffixes
#[derive(Debug)]
pub(crate) struct TimedRotatingFile {
    path: PathBuf,
    when: RotateWhen,
    interval: i64,
    backup_count: usize,
    file: File,
    rollover_at: DateTime<Local>,
}

impl TimedRotatingFile {
    pub(crate) fn open(
        path: &Path,
        when: RotateWhen,
        interval: u32,
        backup_count: usize,
        now: DateTime<Local>,
    ) -> io::Result<Self> {
        let (file, _) = open_append(path)?;
        let interval = i64::from(interval.max(1)) * when.unit_seconds();
        let mut handler = Self {
            path: path.to_path_buf(),
            when,
            interval,
            backup_count,
            file,
            rollover_at: now,
        };
        handler.rollover_at = handler.next_rollover(now);
        Ok(handler)
    }

    fn next_rollover(&self, now: DateTime<Local>) -> DateTime<Local> {
        let step = TimeDelta::seconds(self.interval);
        let midnight = |days: i64| {
            let date = now.date_naive() + TimeDelta::days(days);
            Local
                .from_local_datetime(&date.and_time(NaiveTime::MIN))
                .earliest()
                .unwrap_or(now + TimeDelta::days(days))
        };
        match self.when {
            RotateWhen::Midnight => midnight(self.interval / 86_400),
            RotateWhen::Weekday(day) => {
                let today = i64::from(now.weekday().num_days_from_monday());
                let mut days = (i64::from(day) - today).rem_euclid(7);
                if days == 0 {
                    days = 7;
                }
                midnight(days)
            }
            _ => now + step,
        }
    }

    fn rollover(&mut self, now: DateTime<Local>) -> io::Result<()> {
        self.file.flush()?;
        let period_start = self.rollover_at - TimeDelta::seconds(self.interval);
        let stamp = period_start.format(self.when.suffix_format()).to_string();
        let target = with_suffix(&self.path, &stamp);
        if target.exists() {
            fs::remove_file(&target)?;
        }
        if self.path.exists() {
            fs::rename(&self.path, &target)?;
        }
        for old in self.expired_backups()? {
            fs::remove_file(old)?;
        }
        let (file, _) = open_append(&self.path)?;
        self.file = file;
        self.rollover_at = self.next_rollover(now);
        Ok(())
    }

    /// Rotated files beyond `backup_count`, oldest first
    fn expired_backups(&self) -> io::Result<Vec<PathBuf>> {
        if self.backup_count == 0 {
            return Ok(Vec::new());
        }
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let Some(base) = self.path.file_name().and_then(|n| n.to_str()) else {
            return Ok(Vec::new());
        };
        let prefix = format!("{base}.");
        let shape = suffix_shape(self.when);

        let mut backups: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_prefix(&prefix))
                    .is_some_and(|suffix| matches_shape(suffix, &shape))
            })
            .collect();
        backups.sort();
        let excess = backups.len().saturating_sub(self.backup_count);
        backups.truncate(excess);
        Ok(backups)
    }

    pub(crate) fn write_line(&mut self, line: &str, now: DateTime<Local>) -> io::Result<()> {
        if now >= self.rollover_at {
            self.rollover(now)?;
        }
        writeln!(self.file, "{line}")
    }
}

/// Rendered suffix with every digit replaced by `d`
fn suffix_shape(when: RotateWhen) -> String {
    let sample = Local
        .with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .earliest()
        .map(|t| t.format(when.suffix_format()).to_string())
        .unwrap_or_default();
    sample
        .chars()
        .map(|c| if c.is_ascii_digit() { 'd' } else { c })
        .collect()
}

fn matches_shape(suffix: &str, shape: &str) -> bool {
    suffix.len() == shape.len()
        && suffix.chars().zip(shape.chars()).all(|(c, s)| match s {
            'd' => c.is_ascii_digit(),
            other => c == other,
        })
}

#[derive(Debug)]
enum Sink {
    Console,
    Rotating(RotatingFile),
    Timed(TimedRotatingFile),
}

#[derive(Debug)]
struct Handler {
    level: Level,
    sink: Sink,
}

impl Handler {
    fn emit(&mut self, line: &str, now: DateTime<Local>) -> io::Result<()> {
        match &mut self.sink {
            Sink::Console => writeln!(io::stderr().lock(), "{line}"),
            Sink::Rotating(file) => file.write_line(line),
            Sink::Timed(file) => file.write_line(line, now),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::Console => io::stderr().flush(),
            Sink::Rotating(file) => file.file.flush(),
            Sink::Timed(file) => file.file.flush(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    name: String,
    default_path: PathBuf,
    level: Level,
    handlers: Vec<Handler>,
    attached: HashSet<HandlerKind>,
}

/// Cloneable logging context
///
/// Clones share the same handlers.
#[derive(Debug, Clone)]
pub struct Log {
    inner: Arc<Mutex<Inner>>,
}

impl Log {
    /// Create a context with no handlers
    ///
    /// # Arguments
    /// * `name` - Name of the context
    /// * `default_path` - File used by file handlers given an empty path
    pub fn new(name: impl Into<String>, default_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                name: name.into(),
                default_path: default_path.into(),
                level: Level::Debug,
                handlers: Vec::new(),
                attached: HashSet::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    /// Records below `level` are dropped before reaching any handler
    pub fn set_level(&self, level: Level) {
        self.lock().level = level;
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.lock().level
    }

    /// Kinds of handler currently attached
    #[must_use]
    pub fn handler_kinds(&self) -> Vec<HandlerKind> {
        self.lock()
            .handlers
            .iter()
            .map(|h| match h.sink {
                Sink::Console => HandlerKind::Console,
                Sink::Rotating(_) => HandlerKind::RotatingFile,
                Sink::Timed(_) => HandlerKind::TimedRotatingFile,
            })
            .collect()
    }

    fn resolve(inner: &Inner, path: &Path) -> PathBuf {
        if path.as_os_str().is_empty() {
            inner.default_path.clone()
        } else {
            path.to_path_buf()
        }
    }

    fn attach(
        &self,
        kind: HandlerKind,
        level: Level,
        make: impl FnOnce(&Inner) -> io::Result<Sink>,
    ) -> Result<bool> {
        let mut inner = self.lock();
        if inner.attached.contains(&kind) {
            return Ok(false);
        }
        let sink = make(&inner)?;
        inner.handlers.push(Handler { level, sink });
        inner.attached.insert(kind);
        Ok(true)
    }

    /// Attach a handler writing to standard error
    ///
    /// Returns `false` if a console handler was already attached.
    pub fn add_console(&self, level: Level) -> bool {
        self.attach(HandlerKind::Console, level, |_| Ok(Sink::Console))
            .unwrap_or(false)
    }

    /// Attach a size-rotated file handler
    ///
    /// # Arguments
    /// * `path` - Log file; an empty path means the default path
    /// * `max_bytes` - Rotate before a write would reach this size, 0 to never rotate
    /// * `backup_count` - Number of numbered backups kept
    /// * `level` - Minimum level written
    ///
    /// # Returns
    /// `false` if a handler of this kind was already attached
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be opened
    pub fn add_rotating_file(
        &self,
        path: impl AsRef<Path>,
        max_bytes: u64,
        backup_count: usize,
        level: Level,
    ) -> Result<bool> {
        self.attach(HandlerKind::RotatingFile, level, |inner| {
            let path = Self::resolve(inner, path.as_ref());
            RotatingFile::open(&path, max_bytes, backup_count).map(Sink::Rotating)
        })
    }

    /// Attach a time-rotated file handler
    ///
    /// # Arguments
    /// * `path` - Log file; an empty path means the default path
    /// * `when` - Rotation unit
    /// * `interval` - Number of units per file
    /// * `backup_count` - Number of dated backups kept, 0 to keep all
    /// * `level` - Minimum level written
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be opened
    pub fn add_timed_rotating_file(
        &self,
        path: impl AsRef<Path>,
        when: RotateWhen,
        interval: u32,
        backup_count: usize,
        level: Level,
    ) -> Result<bool> {
        self.attach(HandlerKind::TimedRotatingFile, level, |inner| {
            let path = Self::resolve(inner, path.as_ref());
            TimedRotatingFile::open(&path, when, interval, backup_count, Local::now())
                .map(Sink::Timed)
        })
    }

    /// Write a record to every handler accepting `level`
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        let mut inner = self.lock();
        if level < inner.level {
            return;
        }
        let now = Local::now();
        let line = format!("[{}] [{level}] {message}", now.format(TIME_FORMAT));
        for handler in inner.handlers.iter_mut().filter(|h| level >= h.level) {
            if let Err(e) = handler.emit(&line, now) {
                eprintln!("failed to write log record: {e}");
            }
        }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: impl fmt::Display) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, message);
    }

    pub fn critical(&self, message: impl fmt::Display) {
        self.log(Level::Critical, message);
    }

    /// Install a clone of this context as the global `log` backend
    ///
    /// # Errors
    /// Returns an error if a global logger is already set
    pub fn install(&self) -> std::result::Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.level().to_level_filter());
        Ok(())
    }
}

impl log::Log for Log {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        Level::from(metadata.level()) >= self.level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            Self::log(self, Level::from(record.level()), record.args());
        }
    }

    fn flush(&self) {
        for handler in &mut self.lock().handlers {
            let _ = handler.flush();
        }
    }
}
