//! Scripted in-memory catalog used by the store integration tests.
//!
//! `MockCatalogApi` behaves like the catalog server for one resource: it
//! keeps records in insertion order, applies soft delete/restore/toggle and
//! moderation to them, and paginates list calls. Tests can make individual
//! ids fail, make every list call fail, and hold a search open until
//! released.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use bazaar_client::{ApiError, ApiResult, CatalogApi, ListPage};
use bazaar_core::types::Payload;
use bazaar_core::{
    CatalogKind, ListParams, ModerationRequest, Pagination, Record, UserRef, ViewKind,
};
use bazaar_store::{ModerationStateStore, StoreConfig};

#[derive(Default)]
struct MockState {
    records: Vec<Record>,
    calls: HashMap<&'static str, usize>,
    list_log: Vec<(&'static str, ListParams)>,
    failing: HashSet<String>,
    list_error: Option<ApiError>,
    search_error: Option<ApiError>,
    search_gates: HashMap<String, Arc<Notify>>,
    ignore_filters: bool,
    next_id: usize,
}

#[derive(Default)]
pub struct MockCatalogApi {
    state: Mutex<MockState>,
}

impl MockCatalogApi {
    pub fn with_records(records: Vec<Record>) -> Arc<Self> {
        let api = Self::default();
        api.state.lock().unwrap().records = records;
        Arc::new(api)
    }

    /// Number of times `method` has been called.
    pub fn calls(&self, method: &'static str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    /// Every list call so far, as `(method, params)`.
    pub fn list_log(&self) -> Vec<(&'static str, ListParams)> {
        self.state.lock().unwrap().list_log.clone()
    }

    pub fn reset_calls(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.clear();
        state.list_log.clear();
    }

    /// Make every mutating call on `id` fail with a 500.
    pub fn fail_id(&self, id: &str) {
        self.state.lock().unwrap().failing.insert(id.to_string());
    }

    pub fn fail_lists(&self, error: Option<ApiError>) {
        self.state.lock().unwrap().list_error = error;
    }

    /// Make list endpoints return every record, as a misbehaving server
    /// would.
    pub fn ignore_filters(&self, ignore: bool) {
        self.state.lock().unwrap().ignore_filters = ignore;
    }

    pub fn fail_search(&self, error: Option<ApiError>) {
        self.state.lock().unwrap().search_error = error;
    }

    /// Hold searches for `query` until the returned handle is notified.
    pub fn gate_search(&self, query: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .search_gates
            .insert(query.to_string(), gate.clone());
        gate
    }

    /// Server-side copy of a record.
    pub fn record(&self, id: &str) -> Option<Record> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Change a record behind the store's back, e.g. a server-side cascade.
    pub fn edit(&self, id: &str, f: impl FnOnce(&mut Record)) {
        let mut state = self.state.lock().unwrap();
        if let Some(record) = state.records.iter_mut().find(|r| r.id == id) {
            f(record);
        }
    }

    fn record_call(&self, method: &'static str) {
        *self.state.lock().unwrap().calls.entry(method).or_default() += 1;
    }

    fn list(&self, method: &'static str, params: &ListParams, filter: impl Fn(&Record) -> bool) -> ApiResult<ListPage> {
        self.record_call(method);
        let mut state = self.state.lock().unwrap();
        state.list_log.push((method, params.clone()));
        if let Some(err) = &state.list_error {
            return Err(err.clone());
        }

        let ignore = state.ignore_filters;
        let matching: Vec<Record> = state
            .records
            .iter()
            .filter(|r| ignore || filter(*r))
            .cloned()
            .collect();
        let page = params.page.max(1);
        let limit = params.limit.max(1);
        let start = ((page - 1) * limit) as usize;
        let records = matching
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(ListPage {
            records,
            pagination: Pagination::from_total(page, limit, matching.len() as u64),
        })
    }

    fn mutate(&self, method: &'static str, id: &str, f: impl FnOnce(&mut Record)) -> ApiResult<Record> {
        self.record_call(method);
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(id) {
            return Err(ApiError::http(500, format!("Failed to {method} {id}")));
        }
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ApiError::http(404, "Category not found"))?;
        f(record);
        Ok(record.clone())
    }
}

#[async_trait]
impl CatalogApi for MockCatalogApi {
    async fn get(&self, id: &str) -> ApiResult<Record> {
        self.mutate("get", id, |_| {})
    }

    async fn list_all(&self, params: &ListParams) -> ApiResult<ListPage> {
        let active_only = params.filters.get("isActive").map(String::as_str) == Some("true");
        self.list("list_all", params, |r| {
            !r.is_deleted && (!active_only || r.is_active)
        })
    }

    async fn list_inactive(&self, params: &ListParams) -> ApiResult<ListPage> {
        self.list("list_inactive", params, |r| !r.is_active && !r.is_deleted)
    }

    async fn list_deleted(&self, params: &ListParams) -> ApiResult<ListPage> {
        self.list("list_deleted", params, |r| r.is_deleted)
    }

    async fn search(&self, query: &str, limit: u32) -> ApiResult<Vec<Record>> {
        self.record_call("search");
        let gate = self.state.lock().unwrap().search_gates.get(query).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let state = self.state.lock().unwrap();
        if let Some(err) = &state.search_error {
            return Err(err.clone());
        }
        let needle = query.to_lowercase();
        Ok(state
            .records
            .iter()
            .filter(|r| !r.is_deleted)
            .filter(|r| {
                r.name()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, data: &Payload) -> ApiResult<Record> {
        self.record_call("create");
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let mut record = Record::new(format!("new-{}", state.next_id));
        record.payload = data.clone();
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, data: &Payload) -> ApiResult<Record> {
        self.mutate("update", id, |r| {
            for (key, value) in data {
                r.payload.insert(key.clone(), value.clone());
            }
        })
    }

    async fn soft_delete(&self, id: &str) -> ApiResult<()> {
        self.mutate("soft_delete", id, |r| {
            r.is_deleted = true;
            r.deleted_by = Some(UserRef::Id("admin-1".into()));
        })
        .map(|_| ())
    }

    async fn restore(&self, id: &str) -> ApiResult<Record> {
        self.mutate("restore", id, |r| {
            r.is_deleted = false;
            r.deleted_by = None;
        })
    }

    async fn toggle_active(&self, id: &str) -> ApiResult<Record> {
        self.mutate("toggle_active", id, |r| r.is_active = !r.is_active)
    }

    async fn moderate(&self, id: &str, request: &ModerationRequest) -> ApiResult<Record> {
        let request = request.clone();
        self.mutate("moderate", id, move |r| {
            r.moderation_status = request.status;
            r.moderation_notes = request.notes;
        })
    }
}

pub fn named(id: &str, name: &str) -> Record {
    Record::new(id).with_field("name", name)
}

/// Seed catalog: `a`, `b` active, `c` inactive, `d` deleted.
pub fn seed_records() -> Vec<Record> {
    vec![
        named("a", "Plumbing"),
        named("b", "Electrical"),
        named("c", "Painting").with_active(false),
        named("d", "Roofing").with_deleted(true),
    ]
}

pub fn test_config() -> StoreConfig {
    StoreConfig::new(CatalogKind::Category)
}

/// A mounted store over `api` with every view fetched.
pub async fn mounted_store(api: Arc<MockCatalogApi>) -> Arc<ModerationStateStore> {
    ModerationStateStore::mount(api, test_config()).await
}

pub async fn ids(store: &ModerationStateStore, kind: ViewKind) -> Vec<String> {
    store
        .records(kind)
        .await
        .into_iter()
        .map(|r| r.id)
        .collect()
}

pub fn id_list(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
