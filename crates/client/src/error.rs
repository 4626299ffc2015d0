/// Error returned by any [`CatalogApi`](crate::CatalogApi) call.
///
/// `status_code` is `None` when the request never produced an HTTP
/// response (connection refused, timeout, malformed body).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
}

/// Convenience alias for collaborator call results.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    /// An error with an HTTP status code attached.
    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(message, Some(status_code))
    }

    /// Whether the API rejected the call because the caller is not signed in.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Unable to reach the catalog API".to_string()
        } else if err.is_decode() {
            format!("Malformed response from the catalog API: {err}")
        } else {
            format!("HTTP request failed: {err}")
        };
        Self::new(message, status_code)
    }
}
