//! Catalog API collaborator for the Bazaar moderation store.
//!
//! - [`CatalogApi`]: the async contract the store is written against.
//! - [`ApiError`]: the single structured error every implementation returns.
//! - [`HttpCatalogApi`]: a [`reqwest`] implementation for the REST API.
//! - [`ClientConfig`]: base URL, timeout and token, loaded from the environment.

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::{CatalogApi, ListPage};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use http::HttpCatalogApi;
