mod common;

use common::{concurrent_distinct_creates, concurrent_same_email_creates, concurrent_same_email_updates, crud_scenario};
use person_api::{PersonStore, SqlitePersonStore};
use std::sync::Arc;
use tempfile::TempDir;

const WRITERS: usize = 40;

async fn file_store(dir: &TempDir) -> Arc<dyn PersonStore> {
    let url = format!("sqlite://{}", dir.path().join("people.db").display());
    let store = SqlitePersonStore::connect(&url, 5).await.unwrap();
    store.ensure_schema().await.unwrap();
    Arc::new(store)
}

#[tokio::test]
async fn crud_scenario_in_memory() {
    let store = SqlitePersonStore::in_memory().await.unwrap();
    crud_scenario(&store).await;
}

#[tokio::test]
async fn crud_scenario_on_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir).await;
    crud_scenario(store.as_ref()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_creates_with_distinct_emails_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    concurrent_distinct_creates(file_store(&dir).await, WRITERS).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_creates_with_one_email_leave_one_row() {
    let dir = tempfile::tempdir().unwrap();
    concurrent_same_email_creates(file_store(&dir).await, WRITERS).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_updates_to_one_email_leave_one_holder() {
    let dir = tempfile::tempdir().unwrap();
    concurrent_same_email_updates(file_store(&dir).await, WRITERS).await;
}
