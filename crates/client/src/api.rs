//! The catalog collaborator contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bazaar_core::types::Payload;
use bazaar_core::{ListParams, ModerationRequest, Pagination, Record};

use crate::error::ApiResult;

/// One page of records plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    pub records: Vec<Record>,
    pub pagination: Pagination,
}

/// Remote catalog operations for one resource kind (categories or services).
///
/// The moderation store is written against this trait only, so tests can
/// substitute a scripted implementation for the HTTP client.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn get(&self, id: &str) -> ApiResult<Record>;

    /// Every record the API lists by default, subject to `params.filters`.
    async fn list_all(&self, params: &ListParams) -> ApiResult<ListPage>;
    async fn list_inactive(&self, params: &ListParams) -> ApiResult<ListPage>;
    async fn list_deleted(&self, params: &ListParams) -> ApiResult<ListPage>;

    async fn search(&self, query: &str, limit: u32) -> ApiResult<Vec<Record>>;

    async fn create(&self, data: &Payload) -> ApiResult<Record>;
    async fn update(&self, id: &str, data: &Payload) -> ApiResult<Record>;

    /// Soft-delete. The server assigns `deletedAt` / `deletedBy`.
    async fn soft_delete(&self, id: &str) -> ApiResult<()>;
    async fn restore(&self, id: &str) -> ApiResult<Record>;
    async fn toggle_active(&self, id: &str) -> ApiResult<Record>;
    async fn moderate(&self, id: &str, request: &ModerationRequest) -> ApiResult<Record>;
}
