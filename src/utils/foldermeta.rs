//! Per-folder metadata sidecar
//!
//! A folder `D` keeps its metadata in the hidden JSON file
//! `D/.{D's name}.meta.json`.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::utils::json;

/// File name suffix of the sidecar
pub const META_SUFFIX: &str = ".meta.json";

/// JSON object stored next to a folder's content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderMeta {
    path: PathBuf,
    map: Map<String, Value>,
}

impl FolderMeta {
    /// Metadata for a folder, or for an explicit sidecar file
    ///
    /// The map starts empty; call [`FolderMeta::load`] to read it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let path = if is_sidecar(path) {
            path.to_path_buf()
        } else {
            Self::metadata_path(path)
        };
        Self {
            path,
            map: Map::new(),
        }
    }

    /// Sidecar location for `dir`
    #[must_use]
    pub fn metadata_path(dir: &Path) -> PathBuf {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        dir.join(format!(".{name}{META_SUFFIX}"))
    }

    /// Path of the sidecar file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `value` as the metadata of a folder or to a sidecar file
    ///
    /// A folder is created when missing.
    ///
    /// # Returns
    /// The path written
    ///
    /// # Errors
    /// Returns an IO error if the folder or file cannot be created, or a JSON
    /// error if `value` cannot be serialized
    pub fn write_to<T: Serialize + ?Sized>(value: &T, folder_or_file: &Path) -> Result<PathBuf> {
        let target = if is_sidecar(folder_or_file) {
            folder_or_file.to_path_buf()
        } else {
            std::fs::create_dir_all(folder_or_file)?;
            Self::metadata_path(folder_or_file)
        };
        json::dump(value, &target)?;
        Ok(target)
    }

    /// Write the map to the sidecar file
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be written
    pub fn dump(&self) -> Result<PathBuf> {
        Self::write_to(&self.map, &self.path)
    }

    /// Read the metadata of `folder`
    ///
    /// A missing or unreadable sidecar is logged as an error and gives
    /// `None`.
    #[must_use]
    pub fn load_json(folder: &Path) -> Option<Value> {
        read_sidecar(&Self::metadata_path(folder))
    }

    /// Merge the sidecar content into the map
    ///
    /// Keys in the file overwrite keys already in the map. Nothing changes
    /// when the file is missing or does not hold a JSON object.
    pub fn load(&mut self) -> &mut Self {
        match read_sidecar(&self.path) {
            Some(Value::Object(stored)) => self.map.extend(stored),
            Some(other) => log::error!(
                "Metadata file {} holds {} instead of an object",
                self.path.display(),
                kind_of(&other)
            ),
            None => {}
        }
        self
    }

    /// Consume the metadata and return the map
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.map
    }
}

impl Deref for FolderMeta {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.map
    }
}

impl DerefMut for FolderMeta {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.map
    }
}

fn is_sidecar(path: &Path) -> bool {
    path.is_file()
        || path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(META_SUFFIX))
}

fn read_sidecar(path: &Path) -> Option<Value> {
    if !path.exists() {
        log::error!("Metadata file {} not found.", path.display());
        return None;
    }
    match json::load(path) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Metadata file {} could not be read: {e}", path.display());
            None
        }
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_path() {
        let path = FolderMeta::metadata_path(Path::new("/data/station_a"));
        assert_eq!(path, PathBuf::from("/data/station_a/.station_a.meta.json"));
    }

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("station_a");
        let written = FolderMeta::write_to(&json!({"rows": 10, "tz": "UTC"}), &folder).unwrap();
        assert_eq!(written, FolderMeta::metadata_path(&folder));

        let mut meta = FolderMeta::new(&folder);
        meta.insert("rows".to_string(), json!(0));
        meta.insert("owner".to_string(), json!("ops"));
        meta.load();
        assert_eq!(meta["rows"], json!(10));
        assert_eq!(meta["owner"], json!("ops"));
        assert_eq!(meta.len(), 3);
    }

    #[test]
    fn test_dump_creates_folder() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("new");
        let mut meta = FolderMeta::new(&folder);
        meta.insert("k".to_string(), json!([1, 2]));
        meta.dump().unwrap();
        assert_eq!(
            FolderMeta::load_json(&folder),
            Some(json!({"k": [1, 2]}))
        );
    }

    #[test]
    fn test_missing_metadata() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FolderMeta::load_json(dir.path()), None);
        let mut meta = FolderMeta::new(dir.path());
        assert!(meta.load().is_empty());
    }
}
