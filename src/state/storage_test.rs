use super::*;

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("papermatch-store-{}", uuid::Uuid::new_v4()))
}

// =============================================================
// MemoryStore
// =============================================================

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get("token").unwrap(), None);

    store.set("token", "abc").unwrap();
    assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));

    store.remove("token").unwrap();
    assert_eq!(store.get("token").unwrap(), None);
    store.remove("token").unwrap();
}

#[test]
fn remove_prefixed_only_touches_matching_keys() {
    let store = MemoryStore::new();
    store.set("matchHistory_1", "[]").unwrap();
    store.set("matchHistory_alice", "[]").unwrap();
    store.set("matchHistory", "kept").unwrap();
    store.set("token", "t").unwrap();

    let removed = remove_prefixed(&store, "matchHistory_").unwrap();
    assert_eq!(removed, 2);

    let mut keys = store.keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["matchHistory".to_owned(), "token".to_owned()]);
}

#[test]
fn load_json_discards_garbage() {
    let store = MemoryStore::new();
    store.set("userInfo", "{not json").unwrap();
    let loaded: Option<serde_json::Value> = load_json(&store, "userInfo").unwrap();
    assert!(loaded.is_none());
}

#[test]
fn save_then_load_json() {
    let store = MemoryStore::new();
    save_json(&store, "smartMatchState", &serde_json::json!({"step": 2})).unwrap();
    let loaded: Option<serde_json::Value> = load_json(&store, "smartMatchState").unwrap();
    assert_eq!(loaded, Some(serde_json::json!({"step": 2})));
}

// =============================================================
// FileStore
// =============================================================

#[test]
fn file_store_missing_file_opens_empty() {
    let dir = scratch_dir();
    let store = FileStore::open(&dir).unwrap();
    assert!(store.keys().unwrap().is_empty());
    assert!(!store.path().exists());
}

#[test]
fn file_store_persists_across_reopen() {
    let dir = scratch_dir();
    {
        let store = FileStore::open(&dir).unwrap();
        store.set("token", "persisted").unwrap();
        store.set("matchHistory_7", "[1]").unwrap();
        store.remove("matchHistory_7").unwrap();
    }

    let reopened = FileStore::open(&dir).unwrap();
    assert_eq!(reopened.get("token").unwrap().as_deref(), Some("persisted"));
    assert_eq!(reopened.get("matchHistory_7").unwrap(), None);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn file_store_rejects_corrupt_file() {
    let dir = scratch_dir();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(FileStore::FILE_NAME), "[1, 2, 3]").unwrap();

    assert!(matches!(FileStore::open(&dir), Err(StorageError::Json(_))));

    std::fs::remove_dir_all(&dir).unwrap();
}
