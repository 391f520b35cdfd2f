use json_stores::{Registry, Store};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn scratch(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{name}.json"));
    (dir, path)
}

fn on_disk(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

fn assert_synced(store: &Store) {
    assert_eq!(on_disk(store.identifier()), store.document().snapshot());
}

#[test]
fn every_mutation_hits_the_disk() {
    let (_dir, path) = scratch("every");
    let store = Registry::new().open(&path).unwrap();
    let cfg = store.at(["config"]);

    store.set("a", 1).unwrap();
    assert_synced(&store);
    cfg.set("mode", "fast").unwrap();
    assert_synced(&store);
    cfg.set_as("limits", &[1, 2, 3]).unwrap();
    assert_synced(&store);
    cfg.child("limits").append(4).unwrap();
    assert_synced(&store);
    cfg.update("mode", |v| *v = json!("slow")).unwrap();
    assert_synced(&store);
    store.get_or_insert("b", json!(null)).unwrap();
    assert_synced(&store);
    store.extend([("c", 3), ("d", 4)]).unwrap();
    assert_synced(&store);
    cfg.delete("limits").unwrap();
    assert_synced(&store);
    cfg.replace(json!({"reset": true})).unwrap();
    assert_synced(&store);
    cfg.clear().unwrap();
    assert_synced(&store);

    assert_eq!(
        on_disk(&path),
        json!({"a": 1, "b": null, "c": 3, "d": 4, "config": {}})
    );
}

#[test]
fn reopening_in_a_new_registry_sees_everything() {
    let (_dir, path) = scratch("reopen");
    {
        let store = Registry::new().open(&path).unwrap();
        store.at(["users", "alice"]).set("age", 30).unwrap();
        store.at(["users", "bob"]).set("age", 25).unwrap();
    }
    let store = Registry::new().open_at(&path, ["users"]).unwrap();
    assert_eq!(store.keys().unwrap(), vec!["alice", "bob"]);
    assert_eq!(store.child("bob").get("age").unwrap(), json!(25));
}

// ---- on-disk format ---------------------------------------------------------

#[test]
fn default_format_is_sorted_four_space_indent() {
    let (_dir, path) = scratch("format_default");
    let store = Registry::new().open(&path).unwrap();
    store.set("zeta", 1).unwrap();
    store.set("alpha", json!({"inner": true})).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        raw,
        "{\n    \"alpha\": {\n        \"inner\": true\n    },\n    \"zeta\": 1\n}"
    );
}

#[test]
fn compact_format() {
    let (_dir, path) = scratch("format_compact");
    let store = Registry::builder()
        .pretty(false)
        .build()
        .open(&path)
        .unwrap();
    store.set("hello", 1).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw, r#"{"hello":1}"#);
}

#[test]
fn custom_indent() {
    let (_dir, path) = scratch("format_indent");
    let store = Registry::builder().indent(2).build().open(&path).unwrap();
    store.set("k", 1).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw, "{\n  \"k\": 1\n}");
}

#[test]
fn reads_do_not_write() {
    let (_dir, path) = scratch("reads");
    let store = Registry::new().open(&path).unwrap();
    store.set("k", 1).unwrap();
    std::fs::write(&path, "sentinel").unwrap();

    store.get("k").unwrap();
    store.keys().unwrap();
    store.items().unwrap();
    store.len().unwrap();
    store.get_or_insert("k", 5).unwrap();
    assert!(!store.update("absent", |_| {}).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "sentinel");
}
