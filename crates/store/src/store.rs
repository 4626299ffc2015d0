//! The moderation state store.
//!
//! Every operation follows the same shape: mark the action class loading,
//! await the catalog API without holding the state lock, then either
//! reconcile the confirmed result into the views or record the error.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use bazaar_client::CatalogApi;
use bazaar_core::moderation::validate_request;
use bazaar_core::search::{clamp_search_limit, normalize_query};
use bazaar_core::types::{Payload, RecordId};
use bazaar_core::{
    ActionClass, CoreError, ListParams, ModerationRequest, Pagination, Record, ViewKind,
};
use bazaar_events::{StoreChange, StoreEvent, StoreEventBus};

use crate::action::{ActionState, ActionStates};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::reconcile::{self, Reconcile};
use crate::selection::prune_selection;
use crate::view::{CollectionView, SearchResults, Views};

/// Filter sent with `list_all` when fetching the `active` view.
const ACTIVE_FILTER: &str = "isActive";

/// Everything the store holds, as handed to readers by
/// [`ModerationStateStore::snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreState {
    pub views: Views,
    pub actions: ActionStates,
}

/// In-memory cache of catalog records for one admin session.
pub struct ModerationStateStore {
    api: Arc<dyn CatalogApi>,
    config: StoreConfig,
    state: RwLock<StoreState>,
    events: StoreEventBus,
    mounted: AtomicBool,
}

impl ModerationStateStore {
    /// Create an empty store. Nothing is fetched until [`initialize`] or
    /// [`fetch`] is called.
    ///
    /// [`initialize`]: Self::initialize
    /// [`fetch`]: Self::fetch
    pub fn new(api: Arc<dyn CatalogApi>, config: StoreConfig) -> Self {
        let events = StoreEventBus::new(config.event_capacity);
        Self {
            api,
            config,
            state: RwLock::new(StoreState::default()),
            events,
            mounted: AtomicBool::new(true),
        }
    }

    /// Create a shared store and run the mount-time fetch.
    pub async fn mount(api: Arc<dyn CatalogApi>, config: StoreConfig) -> Arc<Self> {
        let store = Arc::new(Self::new(api, config));
        store.initialize().await;
        store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Detach the store from its owner. In-flight calls still complete on
    /// the server, but their results are no longer written into state, and
    /// new operations fail with [`StoreError::Disposed`].
    pub fn dispose(&self) {
        self.mounted.store(false, Ordering::Release);
        tracing::debug!(kind = self.kind_name(), "Moderation store disposed");
    }

    // ---- reads ----

    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    pub async fn view(&self, kind: ViewKind) -> CollectionView {
        self.state.read().await.views.get(kind).clone()
    }

    pub async fn records(&self, kind: ViewKind) -> Vec<Record> {
        self.state.read().await.views.get(kind).records.clone()
    }

    pub async fn search_results(&self) -> SearchResults {
        self.state.read().await.views.search.clone()
    }

    pub async fn action_state(&self, class: ActionClass) -> ActionState {
        self.state.read().await.actions.get(class).clone()
    }

    /// Intersect a caller-held selection with the ids currently in `kind`.
    /// Returns how many ids were dropped.
    pub async fn retain_selection(
        &self,
        kind: ViewKind,
        selection: &mut HashSet<RecordId>,
    ) -> usize {
        let state = self.state.read().await;
        prune_selection(selection, state.views.get(kind))
    }

    /// Return one action class to idle.
    pub async fn reset_action(&self, class: ActionClass) {
        if self
            .write(|s| s.actions.get_mut(class).reset())
            .await
            .is_some()
        {
            self.publish(StoreChange::ActionChanged { class });
        }
    }

    /// Clear every action, view and search error.
    pub async fn clear_errors(&self) {
        self.write(|s| {
            s.actions.clear_errors();
            for kind in ViewKind::ALL_VIEWS {
                s.views.get_mut(kind).error = None;
            }
            s.views.search.error = None;
        })
        .await;
    }

    // ---- fetching ----

    /// Mount-time fetch of the configured initial views.
    ///
    /// Does nothing unless `auto_fetch` is enabled. A 401 here means the
    /// session is not authenticated yet and is kept out of the view errors.
    pub async fn initialize(&self) {
        if !self.config.auto_fetch || !self.is_mounted() {
            return;
        }
        tracing::info!(
            kind = self.kind_name(),
            views = ?self.config.initial_views,
            "Initial moderation fetch"
        );
        let params = self.config.default_params();
        join_all(
            self.config
                .initial_views
                .iter()
                .map(|kind| self.fetch_view(*kind, params.clone(), true)),
        )
        .await;
    }

    /// Fetch one view, replacing its records and pagination wholesale.
    ///
    /// On failure the error is recorded on the view and the previous
    /// contents are kept. Completions are applied in arrival order, so a
    /// slow earlier fetch can overwrite a faster later one.
    pub async fn fetch(&self, kind: ViewKind, params: ListParams) -> StoreResult<Pagination> {
        self.ensure_mounted()?;
        self.fetch_view(kind, params, false).await
    }

    /// Re-run the last fetch of every loaded view, and the active search.
    pub async fn refetch(&self) {
        if !self.is_mounted() {
            return;
        }
        let (loaded, query) = {
            let state = self.state.read().await;
            let loaded: Vec<ViewKind> = ViewKind::ALL_VIEWS
                .into_iter()
                .filter(|kind| state.views.get(*kind).loaded)
                .collect();
            let search = &state.views.search;
            (loaded, search.is_searching().then(|| search.query.clone()))
        };
        self.refetch_views(&loaded).await;
        if let Some(query) = query {
            // Failures are recorded on the search results.
            let _ = self.search(&query).await;
        }
    }

    /// Replace the search results for `query`.
    ///
    /// An empty or whitespace-only query clears the results without a
    /// network call. Results that arrive after the query has changed are
    /// discarded.
    pub async fn search(&self, query: &str) -> StoreResult<Vec<Record>> {
        self.ensure_mounted()?;
        let Some(query) = normalize_query(query) else {
            self.clear_search().await;
            return Ok(Vec::new());
        };

        self.write(|s| {
            s.views.search.query = query.clone();
            s.views.search.loading = true;
        })
        .await;

        let limit = clamp_search_limit(self.config.search_limit);
        match self.api.search(&query, limit).await {
            Ok(records) => {
                let applied = self
                    .write(|s| {
                        let search = &mut s.views.search;
                        if search.query != query {
                            return false;
                        }
                        search.records = records.clone();
                        search.loading = false;
                        search.error = None;
                        true
                    })
                    .await
                    .unwrap_or(false);
                if applied {
                    self.publish(StoreChange::SearchUpdated {
                        query,
                        len: records.len(),
                    });
                } else {
                    tracing::debug!(kind = self.kind_name(), query = %query, "Stale search result dropped");
                }
                Ok(records)
            }
            Err(err) => {
                tracing::error!(kind = self.kind_name(), query = %query, error = %err, "Search failed");
                let message = err.message.clone();
                self.write(|s| {
                    let search = &mut s.views.search;
                    if search.query == query {
                        search.loading = false;
                        search.error = Some(message);
                    }
                })
                .await;
                Err(err.into())
            }
        }
    }

    /// Leave search mode: empty query, no results.
    pub async fn clear_search(&self) {
        if self.write(|s| s.views.search.clear()).await.is_some() {
            self.publish(StoreChange::SearchUpdated {
                query: String::new(),
                len: 0,
            });
        }
    }

    /// Fetch a single record and patch it into every view that holds it.
    pub async fn load(&self, id: &str) -> StoreResult<Record> {
        self.ensure_mounted()?;
        let record = self.api.get(id).await?;
        self.reconcile(Reconcile::Updated(record.clone())).await;
        Ok(record)
    }

    // ---- mutations ----

    pub async fn create(&self, data: Payload) -> StoreResult<Record> {
        self.ensure_mounted()?;
        self.begin(ActionClass::Create).await;
        let result = async {
            let record = self.api.create(&data).await?;
            tracing::info!(kind = self.kind_name(), id = %record.id, "Record created");
            self.reconcile(Reconcile::Created(record.clone())).await;
            Ok::<_, StoreError>(record)
        }
        .await;
        self.finish(ActionClass::Create, result).await
    }

    pub async fn update(&self, id: &str, data: Payload) -> StoreResult<Record> {
        self.ensure_mounted()?;
        self.begin(ActionClass::Update).await;
        let result = async {
            let record = self.api.update(id, &data).await?;
            tracing::info!(kind = self.kind_name(), id, "Record updated");
            self.reconcile(Reconcile::Updated(record.clone())).await;
            Ok::<_, StoreError>(record)
        }
        .await;
        self.finish(ActionClass::Update, result).await
    }

    /// Set the moderation status (and notes) of a record.
    ///
    /// Moderation never implies deletion; deleting is a separate action.
    pub async fn moderate(&self, id: &str, request: ModerationRequest) -> StoreResult<Record> {
        self.ensure_mounted()?;
        self.begin(ActionClass::Moderate).await;
        let result = self.moderate_inner(id, &request).await;
        self.finish(ActionClass::Moderate, result).await
    }

    pub async fn approve(&self, id: &str, notes: Option<String>) -> StoreResult<Record> {
        self.moderate(id, ModerationRequest::approve(notes)).await
    }

    pub async fn reject(&self, id: &str, notes: Option<String>) -> StoreResult<Record> {
        self.moderate(id, ModerationRequest::reject(notes)).await
    }

    /// Flip `isActive` and move the record between `active` and `inactive`.
    pub async fn toggle_status(&self, id: &str) -> StoreResult<Record> {
        self.ensure_mounted()?;
        self.begin(ActionClass::Update).await;
        let result = self.toggle_status_inner(id).await;
        self.finish(ActionClass::Update, result).await
    }

    /// Soft-delete a record, drop it from the live views and refetch
    /// `deleted` so server-assigned deletion fields are picked up.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.ensure_mounted()?;
        self.begin(ActionClass::Delete).await;
        let result = self.delete_inner(id, true).await;
        self.finish(ActionClass::Delete, result).await
    }

    /// Restore a soft-deleted record.
    ///
    /// Restoring can cascade to child records on the server, so `all`,
    /// `active` and `inactive` are refetched after the local patch.
    pub async fn restore(&self, id: &str) -> StoreResult<Record> {
        self.ensure_mounted()?;
        self.begin(ActionClass::Update).await;
        let result = self.restore_inner(id, true).await;
        self.finish(ActionClass::Update, result).await
    }

    // ---- single-record steps shared with bulk operations ----

    pub(crate) async fn moderate_inner(
        &self,
        id: &str,
        request: &ModerationRequest,
    ) -> StoreResult<Record> {
        validate_request(request)?;
        let record = self.api.moderate(id, request).await?;
        tracing::info!(
            kind = self.kind_name(),
            id,
            status = %record.moderation_status,
            "Record moderated"
        );
        self.reconcile(Reconcile::Moderated(record.clone())).await;
        Ok(record)
    }

    pub(crate) async fn toggle_status_inner(&self, id: &str) -> StoreResult<Record> {
        let record = self.api.toggle_active(id).await?;
        tracing::info!(kind = self.kind_name(), id, is_active = record.is_active, "Record toggled");
        self.reconcile(Reconcile::Toggled(record.clone())).await;
        Ok(record)
    }

    pub(crate) async fn delete_inner(&self, id: &str, refetch: bool) -> StoreResult<()> {
        self.check_deletable(id).await?;
        self.api.soft_delete(id).await?;
        tracing::info!(kind = self.kind_name(), id, "Record soft-deleted");
        self.reconcile(Reconcile::Deleted(id.to_string())).await;
        if refetch {
            self.refetch_views(&[ViewKind::Deleted]).await;
        }
        Ok(())
    }

    pub(crate) async fn restore_inner(&self, id: &str, refetch: bool) -> StoreResult<Record> {
        self.check_restorable(id).await?;
        let record = self.api.restore(id).await?;
        tracing::info!(kind = self.kind_name(), id, "Record restored");
        self.reconcile(Reconcile::Restored(record.clone())).await;
        if refetch {
            self.refetch_views(&[ViewKind::All, ViewKind::Active, ViewKind::Inactive])
                .await;
        }
        Ok(record)
    }

    // ---- private helpers ----

    pub(crate) fn kind_name(&self) -> &'static str {
        self.config.kind.entity_name()
    }

    fn ensure_mounted(&self) -> StoreResult<()> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(StoreError::Disposed)
        }
    }

    /// Run `f` under the write lock, unless the store has been disposed.
    async fn write<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> Option<R> {
        if !self.is_mounted() {
            tracing::debug!(kind = self.kind_name(), "Store disposed, dropping state write");
            return None;
        }
        let mut state = self.state.write().await;
        Some(f(&mut *state))
    }

    pub(crate) fn publish(&self, change: StoreChange) {
        if self.is_mounted() {
            self.events.publish(StoreEvent::new(self.config.kind, change));
        }
    }

    pub(crate) async fn begin(&self, class: ActionClass) {
        if self.write(|s| s.actions.get_mut(class).start()).await.is_some() {
            self.publish(StoreChange::ActionChanged { class });
        }
    }

    /// Record the outcome of a single-record operation and hand it back.
    async fn finish<T>(&self, class: ActionClass, result: StoreResult<T>) -> StoreResult<T> {
        let outcome = match &result {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::error!(
                    kind = self.kind_name(),
                    action = %class,
                    error = %err,
                    "Moderation action failed"
                );
                Err(err.user_message())
            }
        };
        self.settle(class, outcome).await;
        result
    }

    /// Move an action class out of loading: success, or error with `message`.
    pub(crate) async fn settle(&self, class: ActionClass, outcome: Result<(), String>) {
        let written = self
            .write(|s| {
                let action = s.actions.get_mut(class);
                match outcome {
                    Ok(()) => action.succeed(),
                    Err(message) => action.fail(message),
                }
            })
            .await;
        if written.is_some() {
            self.publish(StoreChange::ActionChanged { class });
        }
    }

    async fn reconcile(&self, action: Reconcile) {
        let id = action.id().to_string();
        let inclusive = self.config.all_includes_deleted;
        let Some(outcome) = self
            .write(move |s| reconcile::apply(&mut s.views, action, inclusive))
            .await
        else {
            return;
        };

        tracing::debug!(
            kind = self.kind_name(),
            id = %id,
            patched = outcome.patched,
            removed_from = ?outcome.removed_from,
            inserted_into = ?outcome.inserted_into,
            "Views reconciled"
        );
        if outcome.patched || !outcome.inserted_into.is_empty() {
            self.publish(StoreChange::RecordPatched { id: id.clone() });
        }
        if !outcome.removed_from.is_empty() {
            self.publish(StoreChange::RecordRemoved {
                id,
                views: outcome.removed_from,
            });
        }
    }

    async fn fetch_view(
        &self,
        kind: ViewKind,
        params: ListParams,
        initial: bool,
    ) -> StoreResult<Pagination> {
        let params = params.normalized();
        self.write(|s| s.views.get_mut(kind).loading = true).await;

        let result = match kind {
            ViewKind::All => self.api.list_all(&params).await,
            ViewKind::Active => {
                let filtered = params.clone().with_filter(ACTIVE_FILTER, "true");
                self.api.list_all(&filtered).await
            }
            ViewKind::Inactive => self.api.list_inactive(&params).await,
            ViewKind::Deleted => self.api.list_deleted(&params).await,
        };

        match result {
            Ok(mut page) => {
                if kind != ViewKind::All {
                    let received = page.records.len();
                    page.records.retain(|r| kind.admits(r));
                    let dropped = received - page.records.len();
                    if dropped > 0 {
                        tracing::warn!(
                            kind = self.kind_name(),
                            view = %kind,
                            dropped,
                            "Fetched rows did not match the view and were discarded"
                        );
                        page.pagination.adjust_total(-(dropped as i64));
                    }
                }
                let pagination = page.pagination;
                let len = page.records.len();
                self.write(|s| s.views.get_mut(kind).replace(page, params))
                    .await;
                tracing::debug!(
                    kind = self.kind_name(),
                    view = %kind,
                    len,
                    total = pagination.total,
                    "View replaced"
                );
                self.publish(StoreChange::ViewReplaced { view: kind, len });
                Ok(pagination)
            }
            Err(err) => {
                let suppress = initial && err.is_unauthorized();
                if suppress {
                    tracing::debug!(kind = self.kind_name(), view = %kind, "Not authenticated yet, fetch skipped");
                } else {
                    tracing::error!(kind = self.kind_name(), view = %kind, error = %err, "Fetch failed");
                }
                let message = err.message.clone();
                self.write(|s| {
                    let view = s.views.get_mut(kind);
                    view.loading = false;
                    if !suppress {
                        view.error = Some(message.clone());
                    }
                })
                .await;
                if !suppress {
                    self.publish(StoreChange::ViewFailed {
                        view: kind,
                        message,
                    });
                }
                Err(err.into())
            }
        }
    }

    /// Refetch `kinds` concurrently with their last params (or the default
    /// first page). Failures are recorded on each view.
    pub(crate) async fn refetch_views(&self, kinds: &[ViewKind]) {
        let requests: Vec<(ViewKind, ListParams)> = {
            let state = self.state.read().await;
            kinds
                .iter()
                .map(|kind| {
                    let params = state
                        .views
                        .get(*kind)
                        .params
                        .clone()
                        .unwrap_or_else(|| self.config.default_params());
                    (*kind, params)
                })
                .collect()
        };
        join_all(
            requests
                .into_iter()
                .map(|(kind, params)| self.fetch_view(kind, params, false)),
        )
        .await;
    }

    async fn check_deletable(&self, id: &str) -> StoreResult<()> {
        if self.state.read().await.views.deleted.contains(id) {
            return Err(CoreError::Conflict(format!(
                "{} {id} is already deleted",
                self.kind_name()
            ))
            .into());
        }
        Ok(())
    }

    async fn check_restorable(&self, id: &str) -> StoreResult<()> {
        let live = {
            let state = self.state.read().await;
            !state.views.deleted.contains(id)
                && state.views.find(id).is_some_and(|r| !r.is_deleted)
        };
        if live {
            return Err(CoreError::Conflict(format!("{} {id} is not deleted", self.kind_name())).into());
        }
        Ok(())
    }
}
