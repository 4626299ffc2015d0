use bazaar_core::CoreError;

/// Default API base URL for local development.
const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Catalog API client configuration.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without a trailing slash (default: `http://localhost:5000/api`).
    pub base_url: String,
    /// Per-request timeout in seconds (default: `30`).
    pub timeout_secs: u64,
    /// Bearer token sent on every request, if set.
    pub api_token: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                     |
    /// |---------------------------|-----------------------------|
    /// | `BAZAAR_API_URL`          | `http://localhost:5000/api` |
    /// | `BAZAAR_API_TIMEOUT_SECS` | `30`                        |
    /// | `BAZAAR_API_TOKEN`        | unset                       |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`, so callers (and tests) can supply their own source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("BAZAAR_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup("BAZAAR_API_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CoreError::Validation(format!(
                    "BAZAAR_API_TIMEOUT_SECS must be a valid u64, got '{raw}'"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let api_token = lookup("BAZAAR_API_TOKEN").filter(|t| !t.trim().is_empty());

        Ok(Self {
            base_url,
            timeout_secs,
            api_token,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_token: None,
        }
    }
}
