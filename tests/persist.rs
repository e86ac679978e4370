use std::fs;

use serde_json::json;

use liga_snapshot::persist::{load_previous, write_if_changed};

#[test]
fn second_write_of_same_value_is_a_noop() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("artifact.json");
    let value = json!({"season": "2025-2026", "counts": {"fixtures": 3}});

    assert!(write_if_changed(&path, &value).unwrap());
    let bytes = fs::read(&path).unwrap();
    assert!(!write_if_changed(&path, &value).unwrap());
    assert_eq!(fs::read(&path).unwrap(), bytes);
}

#[test]
fn reordered_keys_and_formatting_do_not_trigger_a_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("artifact.json");

    // Same logical value, different key order and compact formatting.
    fs::write(&path, r#"{"counts":{"fixtures":3},"season":"2025-2026"}"#).unwrap();
    let value = json!({"season": "2025-2026", "counts": {"fixtures": 3}});
    assert!(!write_if_changed(&path, &value).unwrap());
}

#[test]
fn changed_value_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("artifact.json");

    assert!(write_if_changed(&path, &json!({"n": 1})).unwrap());
    assert!(write_if_changed(&path, &json!({"n": 2})).unwrap());
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("2"));
}

#[test]
fn corrupt_existing_file_is_overwritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("artifact.json");
    fs::write(&path, "not json {").unwrap();
    assert!(write_if_changed(&path, &json!({"ok": true})).unwrap());
}

#[test]
fn missing_parent_directories_are_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("a").join("b").join("artifact.json");
    assert!(write_if_changed(&path, &json!([1, 2, 3])).unwrap());
    let loaded: Option<Vec<u32>> = load_previous(&path);
    assert_eq!(loaded, Some(vec![1, 2, 3]));
}

#[test]
fn load_previous_is_best_effort() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing: Option<Vec<u32>> = load_previous(&dir.path().join("nope.json"));
    assert!(missing.is_none());

    let path = dir.path().join("bad.json");
    fs::write(&path, "garbage").unwrap();
    let bad: Option<Vec<u32>> = load_previous(&path);
    assert!(bad.is_none());
}
