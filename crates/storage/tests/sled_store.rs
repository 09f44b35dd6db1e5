//! Integration tests for the sled-backed store view.
//! Covers named trees, owner-side writes after registration and
//! reopening a database that a view was taken from.

use kvweb_storage::{SledStore, Store};
use tempfile::TempDir;

fn collect_keys(store: &dyn Store) -> Vec<String> {
    store
        .keys()
        .map(|k| String::from_utf8(k.unwrap()).unwrap())
        .collect()
}

#[test]
fn test_named_tree_is_isolated_from_default_tree() {
    let dir = TempDir::new().unwrap();
    let db = sled::open(dir.path()).unwrap();
    db.insert("root-key", "root").unwrap();

    let tree = db.open_tree("sessions").unwrap();
    tree.insert("s1", "alice").unwrap();
    tree.insert("s0", "bob").unwrap();

    let sessions = SledStore::from(tree);
    assert_eq!(collect_keys(&sessions), vec!["s0", "s1"]);
    assert!(!sessions.contains_key(b"root-key").unwrap());

    let root = SledStore::from_db(&db);
    assert_eq!(collect_keys(&root), vec!["root-key"]);
}

#[test]
fn test_owner_writes_are_visible_through_view() {
    let dir = TempDir::new().unwrap();
    let db = sled::open(dir.path()).unwrap();
    let view = SledStore::from_db(&db);

    assert!(collect_keys(&view).is_empty());

    db.insert("a", "b").unwrap();
    assert_eq!(view.get(b"a").unwrap(), Some(b"b".to_vec()));

    db.remove("a").unwrap();
    assert!(!view.contains_key(b"a").unwrap());
    assert_eq!(view.get(b"a").unwrap(), None);
}

#[test]
fn test_view_does_not_own_database() {
    let dir = TempDir::new().unwrap();
    {
        let db = sled::open(dir.path()).unwrap();
        let view = SledStore::from_db(&db);
        db.insert("persisted", "yes").unwrap();
        db.flush().unwrap();
        drop(view);
        assert_eq!(db.get("persisted").unwrap().as_deref(), Some(&b"yes"[..]));
    }

    let reopened = sled::open(dir.path()).unwrap();
    let view = SledStore::from_db(&reopened);
    assert_eq!(view.get(b"persisted").unwrap(), Some(b"yes".to_vec()));
}

#[test]
fn test_binary_keys_keep_byte_order() {
    let dir = TempDir::new().unwrap();
    let db = sled::open(dir.path()).unwrap();
    db.insert([0xffu8, 0x00], "hi").unwrap();
    db.insert([0x00u8, 0xff], "lo").unwrap();

    let view = SledStore::from_db(&db);
    let keys: Vec<Vec<u8>> = view.keys().map(|k| k.unwrap()).collect();
    assert_eq!(keys, vec![vec![0x00, 0xff], vec![0xff, 0x00]]);
}
