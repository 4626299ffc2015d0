//! Integration tests for view fetching, searching and reconciliation.
//!
//! Each test mounts a store over the scripted `MockCatalogApi`, which
//! starts with `a`, `b` active, `c` inactive and `d` soft-deleted.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use bazaar_client::ApiError;
use bazaar_core::{ListParams, ModerationStatus, ViewKind};
use bazaar_events::StoreChange;
use bazaar_store::{ModerationStateStore, StoreError};
use common::{id_list, ids, mounted_store, named, seed_records, test_config, MockCatalogApi};

// ---------------------------------------------------------------------------
// Test: mounting fetches every view with the default first page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_initialize_fetches_every_view() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;

    assert_eq!(ids(&store, ViewKind::All).await, id_list(&["a", "b", "c"]));
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b"]));
    assert_eq!(ids(&store, ViewKind::Inactive).await, id_list(&["c"]));
    assert_eq!(ids(&store, ViewKind::Deleted).await, id_list(&["d"]));

    let snapshot = store.snapshot().await;
    for kind in ViewKind::ALL_VIEWS {
        let view = snapshot.views.get(kind);
        assert!(view.loaded, "{kind} should be loaded");
        assert!(!view.loading);
        assert_eq!(view.params, Some(ListParams::default()));
    }
    assert_eq!(snapshot.views.all.pagination.total, 3);

    // `active` is served by the default listing with an isActive filter.
    let active_calls: Vec<_> = api
        .list_log()
        .into_iter()
        .filter(|(method, params)| {
            *method == "list_all" && params.filters.get("isActive").map(String::as_str) == Some("true")
        })
        .collect();
    assert_eq!(active_calls.len(), 1);
    assert_eq!(api.calls("list_all"), 2);
    assert_eq!(api.calls("list_inactive"), 1);
    assert_eq!(api.calls("list_deleted"), 1);
}

#[tokio::test]
async fn test_auto_fetch_disabled_leaves_views_empty() {
    let api = MockCatalogApi::with_records(seed_records());
    let store =
        ModerationStateStore::mount(api.clone(), test_config().with_auto_fetch(false)).await;

    assert_eq!(api.calls("list_all"), 0);
    assert!(!store.view(ViewKind::All).await.loaded);
}

#[tokio::test]
async fn test_initialize_only_fetches_configured_views() {
    let api = MockCatalogApi::with_records(seed_records());
    let config = test_config().with_initial_views(vec![ViewKind::Deleted]);
    let store = ModerationStateStore::mount(api.clone(), config).await;

    assert_eq!(api.calls("list_deleted"), 1);
    assert_eq!(api.calls("list_all"), 0);
    assert!(!store.view(ViewKind::All).await.loaded);
    assert_eq!(ids(&store, ViewKind::Deleted).await, id_list(&["d"]));
}

// ---------------------------------------------------------------------------
// Test: errors during fetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unauthorized_initial_fetch_is_not_surfaced() {
    let api = MockCatalogApi::with_records(seed_records());
    api.fail_lists(Some(ApiError::http(401, "Unauthorized")));
    let store = mounted_store(api.clone()).await;

    let snapshot = store.snapshot().await;
    for kind in ViewKind::ALL_VIEWS {
        let view = snapshot.views.get(kind);
        assert!(view.error.is_none(), "{kind} should not carry the 401");
        assert!(!view.loaded);
        assert!(!view.loading);
    }

    // Outside of mount a 401 is an ordinary failure.
    let err = store
        .fetch(ViewKind::All, ListParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(
        store.view(ViewKind::All).await.error.as_deref(),
        Some("Unauthorized")
    );
}

#[tokio::test]
async fn test_fetch_failure_keeps_previous_records() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;
    api.fail_lists(Some(ApiError::http(503, "Database unavailable")));

    let err = store
        .fetch(ViewKind::Active, ListParams::default())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Api(_));

    let view = store.view(ViewKind::Active).await;
    assert_eq!(view.error.as_deref(), Some("Database unavailable"));
    assert!(!view.loading);
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b"]));

    api.fail_lists(None);
    store
        .fetch(ViewKind::Active, ListParams::default())
        .await
        .unwrap();
    assert!(store.view(ViewKind::Active).await.error.is_none());
}

// ---------------------------------------------------------------------------
// Test: fetch parameters and refetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fetch_is_idempotent() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api).await;

    store.fetch(ViewKind::All, ListParams::new(1, 2)).await.unwrap();
    let first = store.snapshot().await;
    store.fetch(ViewKind::All, ListParams::new(1, 2)).await.unwrap();

    assert_eq!(store.snapshot().await, first);
}

#[tokio::test]
async fn test_fetch_replaces_page_and_refetch_reuses_params() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;

    let pagination = store.fetch(ViewKind::All, ListParams::new(2, 2)).await.unwrap();
    assert_eq!(pagination.total, 3);
    assert_eq!(pagination.pages, 2);
    assert_eq!(ids(&store, ViewKind::All).await, id_list(&["c"]));

    api.reset_calls();
    store.refetch().await;

    assert_eq!(api.calls("list_all"), 2);
    assert_eq!(api.calls("list_inactive"), 1);
    assert_eq!(api.calls("list_deleted"), 1);
    assert!(api
        .list_log()
        .iter()
        .any(|(method, params)| *method == "list_all" && params.page == 2 && params.limit == 2));
    assert_eq!(ids(&store, ViewKind::All).await, id_list(&["c"]));
}

#[tokio::test]
async fn test_out_of_range_params_are_clamped() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;

    store.fetch(ViewKind::Deleted, ListParams { page: 0, limit: 500, ..Default::default() })
        .await
        .unwrap();

    let params = store.view(ViewKind::Deleted).await.params.unwrap();
    assert_eq!(params.page, 1);
    assert_eq!(params.limit, 100);
}

#[tokio::test]
async fn test_rows_outside_the_view_are_dropped_from_total() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;
    api.ignore_filters(true);

    store.fetch(ViewKind::Inactive, ListParams::default()).await.unwrap();

    let view = store.view(ViewKind::Inactive).await;
    assert_eq!(ids(&store, ViewKind::Inactive).await, id_list(&["c"]));
    assert_eq!(view.pagination.total, 1);
    assert_eq!(view.pagination.pages, 1);
}

// ---------------------------------------------------------------------------
// Test: status changes move records between views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_toggle_moves_record_from_active_to_inactive() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;
    let mut events = store.subscribe();

    let record = store.toggle_status("a").await.unwrap();
    assert!(!record.is_active);

    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["b"]));
    assert_eq!(ids(&store, ViewKind::Inactive).await, id_list(&["a", "c"]));
    assert_eq!(ids(&store, ViewKind::All).await, id_list(&["a", "b", "c"]));
    assert!(!store.records(ViewKind::All).await[0].is_active);

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.views.active.pagination.total, 1);
    assert_eq!(snapshot.views.inactive.pagination.total, 2);
    assert!(snapshot.actions.update.success);

    let mut removed_from_active = false;
    while let Ok(event) = events.try_recv() {
        if let StoreChange::RecordRemoved { id, views } = event.change {
            removed_from_active |= id == "a" && views.contains(&ViewKind::Active);
        }
    }
    assert!(removed_from_active);

    // No toggle call reached the list endpoints.
    assert_eq!(api.calls("toggle_active"), 1);
}

#[tokio::test]
async fn test_off_page_changes_keep_page_and_total_in_step() {
    let records = ["a", "b", "c", "d", "e"]
        .into_iter()
        .map(|id| named(id, &format!("Trade {id}")))
        .collect();
    let api = MockCatalogApi::with_records(records);
    let store =
        ModerationStateStore::mount(api.clone(), test_config().with_auto_fetch(false)).await;
    store.fetch(ViewKind::Active, ListParams::new(1, 2)).await.unwrap();

    store.approve("e", None).await.unwrap();

    let active = store.view(ViewKind::Active).await;
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b"]));
    assert_eq!(active.pagination.total, 5);

    store.toggle_status("d").await.unwrap();

    let active = store.view(ViewKind::Active).await;
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b"]));
    assert_eq!(active.pagination.total, 4);
    let inactive = store.view(ViewKind::Inactive).await;
    assert!(!inactive.loaded);
    assert!(inactive.records.is_empty());

    // The local total agrees with what the server now reports.
    let server = store.fetch(ViewKind::Active, ListParams::new(1, 2)).await.unwrap();
    assert_eq!(server.total, 4);
}

#[tokio::test]
async fn test_toggle_back_restores_membership() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api).await;

    store.toggle_status("c").await.unwrap();
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["c", "a", "b"]));
    assert!(store.records(ViewKind::Inactive).await.is_empty());

    store.toggle_status("c").await.unwrap();
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b"]));
    assert_eq!(ids(&store, ViewKind::Inactive).await, id_list(&["c"]));
}

#[tokio::test]
async fn test_moderation_patches_every_copy_in_place() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api).await;
    store.search("elec").await.unwrap();

    store
        .approve("b", Some("Looks good".into()))
        .await
        .unwrap();

    let snapshot = store.snapshot().await;
    for records in [
        &snapshot.views.all.records,
        &snapshot.views.active.records,
        &snapshot.views.search.records,
    ] {
        let b = records.iter().find(|r| r.id == "b").unwrap();
        assert_eq!(b.moderation_status, ModerationStatus::Approved);
        assert_eq!(b.moderation_notes.as_deref(), Some("Looks good"));
    }
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b"]));
    assert!(snapshot.actions.moderate.success);
}

#[tokio::test]
async fn test_reject_does_not_delete() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;

    store.reject("a", None).await.unwrap();

    assert_eq!(api.calls("soft_delete"), 0);
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b"]));
    assert_eq!(
        store.records(ViewKind::All).await[0].moderation_status,
        ModerationStatus::Rejected
    );
}

// ---------------------------------------------------------------------------
// Test: delete and restore
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_removes_from_live_views_and_refetches_deleted() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;
    api.reset_calls();

    store.delete("b").await.unwrap();

    assert_eq!(ids(&store, ViewKind::All).await, id_list(&["a", "c"]));
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a"]));
    assert_eq!(ids(&store, ViewKind::Deleted).await, id_list(&["b", "d"]));
    assert_eq!(api.calls("list_deleted"), 1);
    assert_eq!(api.calls("list_all"), 0);

    // Deletion metadata comes from the server, not from local synthesis.
    let deleted = store.records(ViewKind::Deleted).await;
    assert_eq!(deleted[0].deleted_by.as_ref().map(|u| u.id()), Some("admin-1"));
    assert!(store.snapshot().await.actions.delete.success);
}

#[tokio::test]
async fn test_delete_keeps_flagged_entry_when_all_includes_deleted() {
    let api = MockCatalogApi::with_records(seed_records());
    let config = test_config().with_all_includes_deleted(true);
    let store = ModerationStateStore::mount(api, config).await;

    store.delete("a").await.unwrap();

    let all = store.records(ViewKind::All).await;
    assert_eq!(all[0].id, "a");
    assert!(all[0].is_deleted);
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["b"]));
}

#[tokio::test]
async fn test_restore_patches_locally_then_refetches_live_views() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;
    api.reset_calls();

    let restored = store.restore("d").await.unwrap();
    assert!(!restored.is_deleted);

    assert!(store.records(ViewKind::Deleted).await.is_empty());
    assert_eq!(ids(&store, ViewKind::All).await, id_list(&["a", "b", "c", "d"]));
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b", "d"]));
    assert!(store.records(ViewKind::All).await.iter().all(|r| !r.is_deleted));

    assert_eq!(api.calls("restore"), 1);
    assert_eq!(api.calls("list_all"), 2);
    assert_eq!(api.calls("list_inactive"), 1);
    assert_eq!(api.calls("list_deleted"), 0);
    assert!(store.snapshot().await.actions.update.success);
}

#[tokio::test]
async fn test_restore_picks_up_server_side_cascade() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;

    // The server re-activates `c` as a side effect of restoring `d`.
    api.edit("c", |r| r.is_active = true);
    store.restore("d").await.unwrap();

    assert!(store.records(ViewKind::Inactive).await.is_empty());
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b", "c", "d"]));
}

// ---------------------------------------------------------------------------
// Test: search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_and_clear() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;

    let results = store.search("  Plumb ").await.unwrap();
    assert_eq!(results.len(), 1);
    let search = store.search_results().await;
    assert_eq!(search.query, "Plumb");
    assert_eq!(search.records[0].id, "a");
    assert!(search.is_searching());

    let results = store.search("   ").await.unwrap();
    assert!(results.is_empty());
    assert_eq!(api.calls("search"), 1, "blank query must not hit the API");
    let search = store.search_results().await;
    assert!(!search.is_searching());
    assert!(search.records.is_empty());
}

#[tokio::test]
async fn test_search_never_returns_deleted_records() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api).await;

    let results = store.search("roof").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_stale_search_result_is_dropped() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;
    let gate = api.gate_search("plum");

    let (slow, fast) = tokio::join!(store.search("plum"), async {
        let fast = store.search("elec").await;
        gate.notify_one();
        fast
    });

    // Both calls return their own results...
    assert_eq!(slow.unwrap()[0].id, "a");
    assert_eq!(fast.unwrap()[0].id, "b");
    // ...but only the current query's results are kept.
    let search = store.search_results().await;
    assert_eq!(search.query, "elec");
    assert_eq!(search.records.len(), 1);
    assert_eq!(search.records[0].id, "b");
}

#[tokio::test]
async fn test_search_failure_keeps_previous_results() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;
    store.search("paint").await.unwrap();

    api.fail_search(Some(ApiError::http(500, "Search backend down")));
    store.search("paint").await.unwrap_err();

    let search = store.search_results().await;
    assert_eq!(search.records[0].id, "c");
    assert_eq!(search.error.as_deref(), Some("Search backend down"));
    assert!(!search.loading);
}

#[tokio::test]
async fn test_refetch_repeats_active_search() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;
    store.search("paint").await.unwrap();
    api.reset_calls();

    store.refetch().await;

    assert_eq!(api.calls("search"), 1);
    assert_eq!(store.search_results().await.query, "paint");
}

// ---------------------------------------------------------------------------
// Test: load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_load_patches_record_into_views() {
    let api = MockCatalogApi::with_records(seed_records());
    let store = mounted_store(api.clone()).await;
    api.edit("b", |r| {
        r.payload.insert("name".into(), "Electrical & Lighting".into());
    });

    let record = store.load("b").await.unwrap();

    assert_eq!(record.name(), Some("Electrical & Lighting"));
    let all = store.records(ViewKind::All).await;
    assert_eq!(all[1].name(), Some("Electrical & Lighting"));
    assert_eq!(ids(&store, ViewKind::Active).await, id_list(&["a", "b"]));
}

#[tokio::test]
async fn test_stores_are_independent() {
    let api = MockCatalogApi::with_records(seed_records());
    let first = mounted_store(api.clone()).await;
    let second: Arc<ModerationStateStore> = mounted_store(api).await;

    first.toggle_status("a").await.unwrap();

    assert_eq!(ids(&first, ViewKind::Active).await, id_list(&["b"]));
    assert_eq!(ids(&second, ViewKind::Active).await, id_list(&["a", "b"]));
}
