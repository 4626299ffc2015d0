//! REST implementation of [`CatalogApi`] using [`reqwest`].
//!
//! Routes, relative to `{base_url}/{categories|services}`:
//!
//! ```text
//! GET    /?page=&limit=&...   -> list_all
//! GET    /inactive            -> list_inactive
//! GET    /deleted             -> list_deleted
//! GET    /search?q=&limit=    -> search
//! GET    /{id}                -> get
//! POST   /                    -> create
//! PUT    /{id}                -> update
//! DELETE /{id}                -> soft_delete
//! PATCH  /{id}/restore        -> restore
//! PATCH  /{id}/toggle-status  -> toggle_active
//! PATCH  /{id}/moderate       -> moderate
//! ```
//!
//! Successful bodies use a `{ "data": ... }` envelope; list bodies add a
//! sibling `pagination` object.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use bazaar_core::types::Payload;
use bazaar_core::{CatalogKind, ListParams, ModerationRequest, Pagination, Record};

use crate::api::{CatalogApi, ListPage};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// List response envelope: `{ "data": [...], "pagination": {...} }`.
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: Vec<Record>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// Error bodies carry either `message` or `error`, depending on the route.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// HTTP client for one catalog resource kind.
pub struct HttpCatalogApi {
    client: reqwest::Client,
    base_url: Url,
    kind: CatalogKind,
    api_token: Option<String>,
}

impl HttpCatalogApi {
    /// Create a client with its own connection pool.
    pub fn new(config: &ClientConfig, kind: CatalogKind) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(client, config, kind)
    }

    /// Create a client reusing an existing [`reqwest::Client`], e.g. to share
    /// one pool between the category and service clients.
    pub fn with_client(
        client: reqwest::Client,
        config: &ClientConfig,
        kind: CatalogKind,
    ) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::new(format!("Invalid API base URL: {e}"), None))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                format!("API base URL cannot carry a path: {}", config.base_url),
                None,
            ));
        }
        Ok(Self {
            client,
            base_url,
            kind,
            api_token: config.api_token.clone(),
        })
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    // ---- private helpers ----

    /// Resource URL with extra path segments appended (each one escaped).
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(self.kind.resource()).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        tracing::debug!(%method, %url, "Catalog API request");
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn list(&self, segments: &[&str], params: &ListParams) -> ApiResult<ListPage> {
        let params = params.normalized();
        let response = self
            .request(Method::GET, segments)
            .query(&params.query_pairs())
            .send()
            .await?;
        let envelope: ListEnvelope = Self::parse_response(response).await?;
        let pagination = envelope.pagination.unwrap_or_else(|| {
            Pagination::from_total(params.page, params.limit, envelope.data.len() as u64)
        });
        Ok(ListPage {
            records: envelope.data,
            pagination,
        })
    }

    /// Ensure the response has a success status code, converting failures
    /// into an [`ApiError`] carrying the server's message and status.
    async fn ensure_success(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body
            .message
            .or(body.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        tracing::warn!(status = status.as_u16(), message = %message, "Catalog API error");
        Err(ApiError::http(status.as_u16(), message))
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Parse a `{ "data": Record }` body.
    async fn parse_record(response: reqwest::Response) -> ApiResult<Record> {
        let envelope: DataEnvelope<Record> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn get(&self, id: &str) -> ApiResult<Record> {
        let response = self.request(Method::GET, &[id]).send().await?;
        Self::parse_record(response).await
    }

    async fn list_all(&self, params: &ListParams) -> ApiResult<ListPage> {
        self.list(&[], params).await
    }

    async fn list_inactive(&self, params: &ListParams) -> ApiResult<ListPage> {
        self.list(&["inactive"], params).await
    }

    async fn list_deleted(&self, params: &ListParams) -> ApiResult<ListPage> {
        self.list(&["deleted"], params).await
    }

    async fn search(&self, query: &str, limit: u32) -> ApiResult<Vec<Record>> {
        let response = self
            .request(Method::GET, &["search"])
            .query(&[("q", query.to_string()), ("limit", limit.to_string())])
            .send()
            .await?;
        let envelope: DataEnvelope<Vec<Record>> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    async fn create(&self, data: &Payload) -> ApiResult<Record> {
        let response = self.request(Method::POST, &[]).json(data).send().await?;
        Self::parse_record(response).await
    }

    async fn update(&self, id: &str, data: &Payload) -> ApiResult<Record> {
        let response = self.request(Method::PUT, &[id]).json(data).send().await?;
        Self::parse_record(response).await
    }

    async fn soft_delete(&self, id: &str) -> ApiResult<()> {
        let response = self.request(Method::DELETE, &[id]).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn restore(&self, id: &str) -> ApiResult<Record> {
        let response = self.request(Method::PATCH, &[id, "restore"]).send().await?;
        Self::parse_record(response).await
    }

    async fn toggle_active(&self, id: &str) -> ApiResult<Record> {
        let response = self
            .request(Method::PATCH, &[id, "toggle-status"])
            .send()
            .await?;
        Self::parse_record(response).await
    }

    async fn moderate(&self, id: &str, request: &ModerationRequest) -> ApiResult<Record> {
        let response = self
            .request(Method::PATCH, &[id, "moderate"])
            .json(request)
            .send()
            .await?;
        Self::parse_record(response).await
    }
}
