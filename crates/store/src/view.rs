//! Cached collections held by the store.

use serde::Serialize;

use bazaar_client::ListPage;
use bazaar_core::{ListParams, Pagination, Record, ViewKind};

// ---------------------------------------------------------------------------
// CollectionView
// ---------------------------------------------------------------------------

/// An ordered, paginated list of records plus its fetch status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionView {
    pub records: Vec<Record>,
    pub pagination: Pagination,
    /// Params of the last successful fetch; reused by `refetch`.
    pub params: Option<ListParams>,
    /// Set once any fetch of this view has succeeded.
    pub loaded: bool,
    pub loading: bool,
    /// Error of the most recent failed fetch, cleared by the next success.
    pub error: Option<String>,
}

impl CollectionView {
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace contents wholesale with a fetched page.
    pub(crate) fn replace(&mut self, page: ListPage, params: ListParams) {
        self.records = page.records;
        self.pagination = page.pagination;
        self.params = Some(params);
        self.loaded = true;
        self.loading = false;
        self.error = None;
    }

    /// Replace the entry with `record.id` in place. Returns whether an
    /// entry was found.
    pub(crate) fn patch(&mut self, record: &Record) -> bool {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record.clone();
                true
            }
            None => false,
        }
    }

    /// Remove the entry with `id`, shrinking the pagination total.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.records.remove(index);
                self.pagination.adjust_total(-1);
                true
            }
            None => false,
        }
    }

    /// Insert at the front, growing the pagination total.
    pub(crate) fn prepend(&mut self, record: Record) {
        self.records.insert(0, record);
        self.pagination.adjust_total(1);
    }
}

// ---------------------------------------------------------------------------
// SearchResults
// ---------------------------------------------------------------------------

/// Ephemeral search results keyed by the query that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    /// Normalized query; empty when not searching.
    pub query: String,
    pub records: Vec<Record>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SearchResults {
    pub fn is_searching(&self) -> bool {
        !self.query.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn patch(&mut self, record: &Record) -> bool {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record.clone();
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Every collection the store caches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Views {
    pub all: CollectionView,
    pub active: CollectionView,
    pub inactive: CollectionView,
    pub deleted: CollectionView,
    pub search: SearchResults,
}

impl Views {
    pub fn get(&self, kind: ViewKind) -> &CollectionView {
        match kind {
            ViewKind::All => &self.all,
            ViewKind::Active => &self.active,
            ViewKind::Inactive => &self.inactive,
            ViewKind::Deleted => &self.deleted,
        }
    }

    pub fn get_mut(&mut self, kind: ViewKind) -> &mut CollectionView {
        match kind {
            ViewKind::All => &mut self.all,
            ViewKind::Active => &mut self.active,
            ViewKind::Inactive => &mut self.inactive,
            ViewKind::Deleted => &mut self.deleted,
        }
    }

    /// First cached copy of a record, looking at live views before
    /// `deleted` and search results last.
    pub fn find(&self, id: &str) -> Option<&Record> {
        ViewKind::ALL_VIEWS
            .iter()
            .find_map(|kind| self.get(*kind).get(id))
            .or_else(|| self.search.records.iter().find(|r| r.id == id))
    }
}
