//! End-to-end behavior of a ResourceManager against mock collaborators.

use list_client::{
    Extractor, FetchExclusion, FetchOptions, FetchOutcome, FetchStatus, KeyExtractor, MockRemote,
    MockService, MutationError, RecordId, RemoteError, RemoteOps, ResourceManager,
    ResourceOptions,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn records(ids: &[i64]) -> Vec<Value> {
    ids.iter().map(|id| json!({ "id": id })).collect()
}

fn ids(manager: &ResourceManager) -> Vec<i64> {
    manager
        .state()
        .records
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect()
}

fn manager_with(service: &MockService, remote: &MockRemote) -> ResourceManager {
    ResourceManager::builder(service.clone())
        .remote(RemoteOps::from_crud(Arc::new(remote.clone())))
        .build()
}

// ===========================================
// Fetch Properties
// ===========================================

#[tokio::test]
async fn next_page_without_more_pages_never_calls_service() {
    let service = MockService::paged(records(&[1, 2]), 2);
    let manager = manager_with(&service, &MockRemote::new());
    manager.start().await;
    assert!(!manager.state().has_next_page);

    for _ in 0..3 {
        assert_eq!(manager.queries().fetch_next_page().await, FetchOutcome::Skipped);
    }

    assert_eq!(service.call_count(), 1);
    assert_eq!(ids(&manager), vec![1, 2]);
}

#[tokio::test]
async fn duplicate_initial_fetch_is_a_no_op() {
    let service = MockService::paged(records(&[1, 2]), 2);
    let manager = manager_with(&service, &MockRemote::new());
    service.pause();

    let first = tokio::spawn({
        let manager = manager.clone();
        async move { manager.start().await }
    });
    service.wait_for_calls(1).await;
    let before = manager.state();
    assert!(before.is_fetching());

    let second = manager.queries().fetch_data(FetchOptions::initial()).await;

    assert_eq!(second, FetchOutcome::Skipped);
    assert_eq!(manager.state(), before);
    service.resume();
    first.await.unwrap();
    assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn more_appends_and_refresh_replaces() {
    let service = MockService::new();
    service.set_page(1, json!({ "data": [{ "id": "a" }, { "id": "b" }] }));
    service.set_page(2, json!({ "data": [{ "id": "c" }, { "id": "d" }] }));
    let manager = manager_with(&service, &MockRemote::new());
    manager.start().await;

    manager.queries().fetch_data(FetchOptions::more()).await;
    let names: Vec<Value> = manager.state().records.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(names, vec![json!("a"), json!("b"), json!("c"), json!("d")]);
    assert_eq!(manager.state().page, 2);

    service.set_page(1, json!({ "data": [{ "id": "x" }] }));
    manager.queries().fetch_data(FetchOptions::refresh()).await;

    assert_eq!(manager.state().records, vec![json!({ "id": "x" })]);
    assert_eq!(manager.state().page, 1);
}

#[tokio::test]
async fn extractor_tolerates_missing_pagination() {
    let extracted = KeyExtractor::default().extract(&json!({ "data": [{ "id": 1 }] }));
    assert_eq!(extracted.total_results, None);
    assert_eq!(extracted.total_pages, None);

    let service = MockService::new();
    service.set_page(1, json!({ "data": [{ "id": 1 }] }));
    let manager = manager_with(&service, &MockRemote::new());
    manager.start().await;

    let state = manager.state();
    assert_eq!(state.total_results, None);
    assert_eq!(state.total_pages, None);
    assert!(state.has_next_page);
}

#[tokio::test]
async fn failed_refresh_keeps_collection() {
    let service = MockService::paged(records(&[1, 2, 3]), 2);
    let manager = manager_with(&service, &MockRemote::new());
    manager.start().await;
    manager.queries().fetch_next_page().await;

    service.fail_next(RemoteError::Transport("timeout".into()));
    let outcome = manager.queries().refetch_data().await;

    assert!(matches!(outcome, FetchOutcome::Failed { .. }));
    let state = manager.state();
    assert_eq!(ids(&manager), vec![1, 2, 3]);
    assert_eq!(state.page, 2);
    assert_eq!(state.status, FetchStatus::Idle);
    assert_eq!(state.last_error.as_deref(), Some("transport error: timeout"));
}

#[tokio::test]
async fn dropping_a_fetch_releases_its_flag() {
    let service = MockService::paged(records(&[1]), 1);
    let manager = manager_with(&service, &MockRemote::new());
    service.pause();

    tokio::select! {
        _ = manager.queries().refetch_data() => panic!("paused fetch completed"),
        _ = service.wait_for_calls(1) => {}
    }

    assert_eq!(manager.state().status, FetchStatus::Idle);
    service.resume();
    assert!(matches!(manager.queries().refetch_data().await, FetchOutcome::Loaded { .. }));
}

#[tokio::test]
async fn second_refresh_reaches_service_while_first_in_flight() {
    let service = MockService::paged(records(&[1, 2]), 2);
    let manager = manager_with(&service, &MockRemote::new());
    manager.start().await;
    service.pause();

    let first = tokio::spawn({
        let manager = manager.clone();
        async move { manager.queries().refetch_data().await }
    });
    service.wait_for_calls(2).await;
    let second = tokio::spawn({
        let manager = manager.clone();
        async move { manager.queries().refetch_data().await }
    });
    service.wait_for_calls(3).await;
    assert_eq!(manager.state().status, FetchStatus::Refreshing);

    service.release(1);
    assert!(matches!(first.await.unwrap(), FetchOutcome::Loaded { .. }));
    assert_eq!(manager.state().status, FetchStatus::Refreshing);

    service.resume();
    assert!(matches!(second.await.unwrap(), FetchOutcome::Loaded { .. }));
    assert_eq!(manager.state().status, FetchStatus::Idle);
    assert_eq!(service.call_count(), 3);
    assert_eq!(ids(&manager), vec![1, 2]);
}

// ===========================================
// Overlapping Modes
// ===========================================

#[tokio::test]
async fn per_mode_results_apply_in_completion_order() {
    let service = MockService::paged(records(&[1, 2, 3, 4]), 2);
    let manager = manager_with(&service, &MockRemote::new());
    manager.start().await;
    service.pause();

    let more = tokio::spawn({
        let manager = manager.clone();
        async move { manager.queries().fetch_data(FetchOptions::more()).await }
    });
    service.wait_for_calls(2).await;
    service.set_page(1, json!({ "data": [{ "id": 9 }] }));
    let refresh = tokio::spawn({
        let manager = manager.clone();
        async move { manager.queries().refetch_data().await }
    });
    service.wait_for_calls(3).await;
    assert_eq!(manager.state().status, FetchStatus::Refreshing);

    service.release(1);
    assert!(matches!(more.await.unwrap(), FetchOutcome::Loaded { .. }));
    service.resume();
    assert!(matches!(refresh.await.unwrap(), FetchOutcome::Loaded { .. }));

    assert_eq!(ids(&manager), vec![9]);
}

#[tokio::test]
async fn global_exclusion_lets_refresh_supersede_loads() {
    let service = MockService::paged(records(&[1, 2, 3, 4]), 2);
    let manager = ResourceManager::builder(service.clone())
        .options(ResourceOptions {
            fetch_exclusion: FetchExclusion::Global,
            ..ResourceOptions::default()
        })
        .build();
    manager.start().await;
    service.pause();

    let more = tokio::spawn({
        let manager = manager.clone();
        async move { manager.queries().fetch_next_page().await }
    });
    service.wait_for_calls(2).await;

    assert_eq!(
        manager.queries().fetch_data(FetchOptions::initial()).await,
        FetchOutcome::Skipped
    );

    service.set_page(1, json!({ "data": [{ "id": 9 }] }));
    let refresh = tokio::spawn({
        let manager = manager.clone();
        async move { manager.queries().refetch_data().await }
    });
    service.wait_for_calls(3).await;

    service.release(1);
    assert_eq!(more.await.unwrap(), FetchOutcome::Superseded);
    assert_eq!(ids(&manager), vec![1, 2]);

    service.resume();
    assert_eq!(
        refresh.await.unwrap(),
        FetchOutcome::Loaded { records: 1, page: 1 }
    );
    assert_eq!(ids(&manager), vec![9]);
    assert_eq!(manager.state().status, FetchStatus::Idle);
}

// ===========================================
// Mutation Properties
// ===========================================

#[tokio::test]
async fn add_inserts_the_returned_entity() {
    let service = MockService::new();
    let remote = MockRemote::new();
    remote.respond_to_insert(json!({ "id": 1, "name": "x" }));
    let manager = manager_with(&service, &remote);
    manager.start().await;
    assert!(!manager.state().is_adding);
    remote.pause();

    let add = tokio::spawn({
        let manager = manager.clone();
        async move { manager.crud().add_item(json!({ "name": "x" }), None).await }
    });
    remote.wait_for_calls(1).await;
    assert!(manager.state().is_adding);

    remote.resume();
    add.await.unwrap().unwrap();

    assert!(!manager.state().is_adding);
    assert_eq!(manager.state().records, vec![json!({ "id": 1, "name": "x" })]);
}

#[tokio::test]
async fn missing_update_is_loud_missing_insert_is_silent() {
    let service = MockService::paged(records(&[1]), 1);
    let manager = ResourceManager::builder(service).build();
    manager.start().await;

    let update = manager
        .crud()
        .update_item(&RecordId::Int(1), json!({ "name": "y" }), None)
        .await;
    assert!(matches!(update, Err(MutationError::MissingCapability { .. })));

    let add = manager.crud().add_item(json!({ "name": "x" }), None).await;
    assert_eq!(add, Ok(None));
    assert_eq!(ids(&manager), vec![1]);
}

#[tokio::test]
async fn missing_result_field_leaves_collection_untouched() {
    let service = MockService::paged(records(&[1, 2]), 2);
    let remote = MockRemote::new();
    remote.respond_to_insert(json!({ "id": 7 }));
    remote.respond_to_update(json!({ "id": 1, "name": "y" }));
    let manager = manager_with(&service, &remote);
    manager.start().await;
    let before = manager.state().records;

    let mut called = false;
    let add = manager
        .crud()
        .add_item_then(json!({ "name": "x" }), Some("item"), |_| called = true)
        .await;
    let update = manager
        .crud()
        .update_item(&RecordId::Int(1), json!({ "name": "y" }), Some("item"))
        .await;

    assert!(matches!(add, Err(MutationError::MissingResultField { .. })));
    assert!(matches!(update, Err(MutationError::MissingResultField { .. })));
    assert!(!called);
    assert_eq!(remote.call_count(), 2);
    let state = manager.state();
    assert_eq!(state.records, before);
    assert!(!state.is_adding && !state.is_updating);
}

#[tokio::test]
async fn rejected_delete_releases_flag() {
    let service = MockService::paged(records(&[1, 2]), 2);
    let remote = MockRemote::new();
    remote.fail_next_delete(RemoteError::Status {
        code: 500,
        message: "down".into(),
    });
    let manager = manager_with(&service, &remote);
    manager.start().await;

    let result = manager.crud().delete_item(&RecordId::Int(1)).await;

    assert!(matches!(result, Err(MutationError::Remote(RemoteError::Status { code: 500, .. }))));
    assert!(!manager.state().is_deleting);
    assert_eq!(ids(&manager), vec![1, 2]);
}

#[tokio::test]
async fn add_and_delete_run_concurrently() {
    let service = MockService::paged(records(&[1, 2]), 2);
    let remote = MockRemote::new();
    let manager = manager_with(&service, &remote);
    manager.start().await;
    remote.pause();

    let add = tokio::spawn({
        let manager = manager.clone();
        async move { manager.crud().add_item(json!({ "name": "x" }), None).await }
    });
    let delete = tokio::spawn({
        let manager = manager.clone();
        async move { manager.crud().delete_item(&RecordId::Int(2)).await }
    });
    remote.wait_for_calls(2).await;

    let state = manager.state();
    assert!(state.is_adding && state.is_deleting);
    assert!(!state.is_updating);

    remote.resume();
    add.await.unwrap().unwrap();
    assert!(delete.await.unwrap().unwrap());

    let state = manager.state();
    assert!(!state.is_adding && !state.is_deleting);
    assert_eq!(state.records.len(), 2);
}
