//! Tests for the in-memory brick store.

use keyssi::BrickStorage;
use test_utils::MemoryStore;

#[tokio::test]
async fn brick_round_trip() {
    let store = MemoryStore::new();

    let hash = store.put_brick("default", b"brick data").await.expect("should put");
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

    let brick = store.get_brick("default", &hash).await.expect("should get");
    assert_eq!(brick.as_deref(), Some(b"brick data".as_slice()));

    // content addressed: same bytes, same hash
    let again = store.put_brick("default", b"brick data").await.expect("should put");
    assert_eq!(again, hash);
}

#[tokio::test]
async fn bricks_are_scoped_by_domain() {
    let store = MemoryStore::new();
    let hash = store.put_brick("default", b"brick data").await.expect("should put");

    assert_eq!(store.get_brick("other", &hash).await.expect("should get"), None);
    assert_eq!(store.get_brick("default", "unknown").await.expect("should get"), None);
}

#[tokio::test]
async fn alias_versions_accumulate() {
    let store = MemoryStore::new();
    assert!(store.alias_versions("alias").await.expect("should list").is_empty());

    store.update_alias("alias", "v1").await.expect("should update");
    store.update_alias("alias", "v2").await.expect("should update");
    assert_eq!(store.alias_versions("alias").await.expect("should list"), ["v1", "v2"]);
}
