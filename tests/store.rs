use limpet::core::error::LimpetError;
use limpet::core::store::Store;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn set_then_get_round_trip() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::open_at(tmp.path().join("cache")).expect("open");

    store.set("key", "value", Duration::ZERO).expect("set");
    let val = store.get("key").expect("get");
    assert_eq!(val, "value");
}

#[test]
fn get_unwritten_key_returns_empty_without_error() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::open_at(tmp.path().join("cache")).expect("open");

    let val = store.get("never-set").expect("get should not error on a miss");
    assert_eq!(val, "");
}

#[test]
fn entry_with_ttl_expires() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::open_at(tmp.path().join("cache")).expect("open");

    store
        .set("key", "value", Duration::from_millis(500))
        .expect("set");
    assert_eq!(store.get("key").expect("get before expiry"), "value");

    std::thread::sleep(Duration::from_millis(900));
    assert_eq!(store.get("key").expect("get after expiry"), "");
}

#[test]
fn overwrite_replaces_value_and_ttl() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::open_at(tmp.path().join("cache")).expect("open");

    store
        .set("key", "first", Duration::from_millis(400))
        .expect("set with ttl");
    store.set("key", "second", Duration::ZERO).expect("re-set");
    assert_eq!(store.get("key").expect("get"), "second");

    // The original ttl must not survive the overwrite.
    std::thread::sleep(Duration::from_millis(700));
    assert_eq!(store.get("key").expect("get after old ttl"), "second");
}

#[test]
fn flush_erases_every_key() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::open_at(tmp.path().join("cache")).expect("open");

    store.set("a", "1", Duration::ZERO).expect("set a");
    store.set("b", "2", Duration::ZERO).expect("set b");
    store.flush().expect("flush");

    assert_eq!(store.get("a").expect("get a"), "");
    assert_eq!(store.get("b").expect("get b"), "");
}

#[test]
fn operations_after_disconnect_return_not_connected() {
    let tmp = tempdir().expect("tempdir");
    let mut store = Store::open_at(tmp.path().join("cache")).expect("open");
    store.disconnect().expect("disconnect");
    assert!(!store.is_connected());

    assert!(matches!(
        store.set("key", "value", Duration::ZERO),
        Err(LimpetError::NotConnected)
    ));
    assert!(matches!(store.get("key"), Err(LimpetError::NotConnected)));
    assert!(matches!(store.flush(), Err(LimpetError::NotConnected)));
    assert!(matches!(
        store.garbage_collection(),
        Err(LimpetError::NotConnected)
    ));
}

#[test]
fn disconnect_is_one_way() {
    let tmp = tempdir().expect("tempdir");
    let mut store = Store::open_at(tmp.path().join("cache")).expect("open");

    assert!(store.is_connected());
    store.disconnect().expect("first disconnect");
    assert!(matches!(
        store.disconnect(),
        Err(LimpetError::NotConnected)
    ));
    assert!(!store.is_connected());
}

#[test]
fn second_connect_on_held_path_fails() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("cache");
    let mut first = Store::open_at(&root).expect("first open");

    let second = Store::open_at(&root);
    assert!(matches!(second, Err(LimpetError::Open { .. })));

    // Releasing the handle releases the lock.
    first.disconnect().expect("disconnect");
    let third = Store::open_at(&root).expect("open after release");
    assert!(third.is_connected());
}

#[test]
fn gc_on_fresh_store_is_a_no_op() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::open_at(tmp.path().join("cache")).expect("open");
    store
        .garbage_collection()
        .expect("gc with nothing to reclaim should succeed");
}

#[test]
fn gc_succeeds_after_bulk_delete() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::open_at(tmp.path().join("cache")).expect("open");

    let filler = "x".repeat(1024);
    for i in 0..100 {
        store
            .set(&format!("key-{}", i), &filler, Duration::ZERO)
            .expect("set");
    }
    store.flush().expect("flush");
    store.garbage_collection().expect("gc after flush");

    assert_eq!(store.get("key-0").expect("get"), "");
}

#[test]
fn empty_key_is_stored_like_any_other() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::open_at(tmp.path().join("cache")).expect("open");

    store.set("", "value", Duration::ZERO).expect("set empty key");
    assert_eq!(store.get("").expect("get empty key"), "value");
}

#[test]
fn values_survive_reconnect() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("cache");

    let mut store = Store::open_at(&root).expect("open");
    store.set("key", "value", Duration::ZERO).expect("set");
    store.disconnect().expect("disconnect");

    let reopened = Store::open_at(&root).expect("reopen");
    assert_eq!(reopened.get("key").expect("get"), "value");
}

#[test]
fn end_to_end_lifecycle() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("cache");
    let mut store = Store::open_at(&root).expect("open");

    store
        .set("key", "value", Duration::from_secs(60))
        .expect("set");
    assert_eq!(store.get("key").expect("get"), "value");

    let status = store.status();
    assert!(status.connected);
    assert_eq!(status.path, root.display().to_string());

    store.garbage_collection().expect("gc");
    store.disconnect().expect("disconnect");
    assert!(!store.is_connected());
    assert!(!store.status().connected);
}

#[test]
fn journal_mode_is_wal_on_disk() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("cache");

    let mut store = Store::open_at(&root).expect("open");
    store.set("key", "value", Duration::ZERO).expect("set");
    store.disconnect().expect("disconnect");

    let conn = rusqlite::Connection::open(root.join("cache.db")).expect("raw open");
    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .expect("pragma journal_mode");
    assert_eq!(mode.to_lowercase(), "wal");
}
