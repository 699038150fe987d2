use serde_json::json;
use tempfile::TempDir;
use tsframe::utils::foldermeta::FolderMeta;
use tsframe::utils::paths::{PathKind, get_paths, sanitize_filename};

#[test]
fn test_metadata_follows_folder() {
    let root = TempDir::new().unwrap();
    let folder = root.path().join("station_a");
    FolderMeta::write_to(&json!({"tz": "Asia/Shanghai"}), &folder).unwrap();

    let mut meta = FolderMeta::new(&folder);
    meta.load();
    meta.insert("rows".to_string(), json!(24));
    let written = meta.dump().unwrap();
    assert!(written.ends_with(".station_a.meta.json"));

    assert_eq!(
        FolderMeta::load_json(&folder),
        Some(json!({"tz": "Asia/Shanghai", "rows": 24}))
    );

    // the sidecar is hidden, so listing the folder skips it
    let listed = get_paths(&folder, "*", false, PathKind::File).unwrap();
    assert!(listed.is_empty());
}

#[test]
fn test_explicit_sidecar_path() {
    let root = TempDir::new().unwrap();
    let sidecar = root.path().join("custom.meta.json");
    let mut meta = FolderMeta::new(&sidecar);
    assert_eq!(meta.path(), sidecar.as_path());
    meta.insert("k".to_string(), json!(sanitize_filename("a/b", "-")));
    meta.dump().unwrap();

    let mut again = FolderMeta::new(&sidecar);
    assert_eq!(again.load().get("k"), Some(&json!("a-b")));
}
