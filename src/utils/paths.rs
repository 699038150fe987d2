//! Filesystem path helpers
//!
//! Paths that do not exist yet are classified by their suffix: a path with
//! an extension is taken to be a file, one without a directory.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use glob::Pattern;
use regex::Regex;

use crate::error::{Error, Result};

/// Characters that are not allowed in file names on common platforms
static RESERVED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("reserved character class is valid"));

/// Which entries [`get_paths`] returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathKind {
    #[default]
    All,
    Dir,
    File,
}

impl FromStr for PathKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "dir" => Ok(Self::Dir),
            "file" => Ok(Self::File),
            other => Err(Error::type_mismatch("'all', 'dir' or 'file'", other)),
        }
    }
}

/// The current working directory
///
/// # Errors
/// Returns an IO error if the directory cannot be determined
pub fn curdir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}

fn has_suffix(path: &Path) -> bool {
    path.extension().is_some()
}

/// Make sure the directory for `path` exists
///
/// A path with a suffix is taken to be a file and its parent is created;
/// anything else is created as a directory. Existing paths are left alone.
///
/// # Returns
/// `path` itself
///
/// # Errors
/// Returns an IO error if a directory cannot be created
pub fn create_dir(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if !path.exists() {
        let dir = if has_suffix(path) {
            path.parent().unwrap_or(path)
        } else {
            path
        };
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(path.to_path_buf())
}

/// Remove a directory and everything in it, if it exists
///
/// # Errors
/// Returns an IO error if the removal fails
pub fn delete_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

/// Keep only the alphabetic characters of `s`, lowercased
#[must_use]
pub fn convert_lowstr(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `path` is, or would be, a file
#[must_use]
pub fn is_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if path.exists() {
        path.is_file()
    } else {
        has_suffix(path)
    }
}

/// Whether `path` is, or would be, a directory
#[must_use]
pub fn is_dir(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if path.exists() {
        path.is_dir()
    } else {
        !has_suffix(path)
    }
}

fn is_hidden(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| matches!(c, Component::Normal(part) if part.to_string_lossy().starts_with('.')))
}

/// Paths under `dir` matching a glob pattern
///
/// `**` matches any number of nested directories. Entries with a hidden
/// component below `dir` are skipped unless `include_hidden` is set.
///
/// # Arguments
/// * `dir` - Directory the pattern is relative to
/// * `pattern` - Glob pattern such as `**/*.csv`
/// * `include_hidden` - Keep entries whose name starts with a dot
/// * `kind` - Restrict results to files or directories
///
/// # Errors
/// Returns [`Error::InvalidPattern`] if the pattern does not compile, or an
/// IO error if a directory cannot be read
pub fn get_paths(dir: &Path, pattern: &str, include_hidden: bool, kind: PathKind) -> Result<Vec<PathBuf>> {
    let full = format!(
        "{}/{}",
        Pattern::escape(&dir.to_string_lossy()),
        pattern.trim_start_matches('/')
    );
    let entries = glob::glob(&full).map_err(|e| Error::InvalidPattern(format!("{pattern}: {e}")))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if !include_hidden && is_hidden(&path, dir) {
            continue;
        }
        let keep = match kind {
            PathKind::All => true,
            PathKind::Dir => path.is_dir(),
            PathKind::File => path.is_file(),
        };
        if keep {
            paths.push(path);
        }
    }
    Ok(paths)
}

fn children(path: &Path, keep: fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| keep(p))
        .collect();
    entries.sort();
    Ok(entries)
}

/// Immediate subdirectories of `path`, sorted
///
/// # Errors
/// Returns an IO error if `path` cannot be read
pub fn subdirs(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    children(path.as_ref(), Path::is_dir)
}

/// Files directly inside `path`, sorted
///
/// # Errors
/// Returns an IO error if `path` cannot be read
pub fn subfiles(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    children(path.as_ref(), Path::is_file)
}

/// Replace the characters `<>:"/\|?*` in a file name with `repl`
#[must_use]
pub fn sanitize_filename(filename: &str, repl: &str) -> String {
    RESERVED_CHARS
        .replace_all(filename, regex::NoExpand(repl))
        .into_owned()
}
