use infraviz_stack_store::{unix_ms_now, DeployStatus, StackRecord, StackStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;

fn record(store: &StackStore, stack_id: &str) -> StackRecord {
    StackRecord {
        stack_id: stack_id.to_string(),
        code: "import * as aws from \"@pulumi/aws\";".to_string(),
        work_dir: store.stack_dir(stack_id).to_string_lossy().into_owned(),
        nodes: Vec::new(),
        edges: Vec::new(),
        deploy_status: DeployStatus::Idle,
        created_at: unix_ms_now(),
    }
}

#[tokio::test]
async fn set_then_get_round_trips_through_cache() {
    let dir = tempdir().unwrap();
    let store = StackStore::with_base_dir(dir.path());

    let rec = record(&store, "aaaa000001");
    store.set(rec.clone()).await;
    assert_eq!(store.get("aaaa000001").await, Some(rec));
}

#[tokio::test]
async fn fresh_process_hydrates_from_durable_document() {
    let dir = tempdir().unwrap();

    let writer = StackStore::with_base_dir(dir.path());
    let rec = record(&writer, "bbbb000002");
    writer.set(rec.clone()).await;

    // A second store over the same base dir has an empty cache, like a
    // restarted process; the durable document must satisfy the read.
    let reader = StackStore::with_base_dir(dir.path());
    assert_eq!(reader.get("bbbb000002").await, Some(rec));
}

#[tokio::test]
async fn unknown_stack_is_none_not_error() {
    let dir = tempdir().unwrap();
    let store = StackStore::with_base_dir(dir.path());
    assert_eq!(store.get("ffff00000f").await, None);
}

#[tokio::test]
async fn corrupted_durable_document_reads_as_not_found() {
    let dir = tempdir().unwrap();
    let store = StackStore::with_base_dir(dir.path());

    let stack_dir = store.stack_dir("cccc000003");
    std::fs::create_dir_all(&stack_dir).unwrap();
    std::fs::write(stack_dir.join("state.json"), b"{not json").unwrap();

    assert_eq!(store.get("cccc000003").await, None);
}

#[tokio::test]
async fn durable_write_failure_is_swallowed_and_cache_serves_reads() {
    let dir = tempdir().unwrap();
    // Base "directory" is actually a file, so create_dir_all fails.
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, b"").unwrap();

    let store = StackStore::with_base_dir(&blocker);
    let rec = record(&store, "dddd000004");
    store.set(rec.clone()).await;

    assert_eq!(store.get("dddd000004").await, Some(rec));
}

#[tokio::test]
async fn lock_handles_are_shared_per_stack_id() {
    let dir = tempdir().unwrap();
    let store = StackStore::with_base_dir(dir.path());

    let a1 = store.lock("aaaa000001");
    let a2 = store.lock("aaaa000001");
    let b = store.lock("bbbb000002");

    assert!(Arc::ptr_eq(&a1, &a2));
    assert!(!Arc::ptr_eq(&a1, &b));

    // Holding one stack's lock must not block another stack's.
    let _guard = a1.lock().await;
    assert!(b.try_lock().is_ok());
    assert!(a2.try_lock().is_err());
}

#[tokio::test]
async fn set_replaces_record_in_place() {
    let dir = tempdir().unwrap();
    let store = StackStore::with_base_dir(dir.path());

    let mut rec = record(&store, "eeee000005");
    store.set(rec.clone()).await;

    rec.deploy_status = DeployStatus::Deploying;
    rec.code = "// updated".to_string();
    store.set(rec.clone()).await;

    let loaded = store.get("eeee000005").await.unwrap();
    assert_eq!(loaded.deploy_status, DeployStatus::Deploying);
    assert_eq!(loaded.code, "// updated");
    assert_eq!(loaded.stack_id, "eeee000005");
}
