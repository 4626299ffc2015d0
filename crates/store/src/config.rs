use bazaar_core::pagination::{clamp_limit, DEFAULT_PAGE_SIZE};
use bazaar_core::search::{clamp_search_limit, DEFAULT_SEARCH_LIMIT};
use bazaar_core::{CatalogKind, CoreError, ListParams, ViewKind};

/// Default broadcast capacity for store change events.
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Moderation store configuration, resolved once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Catalog managed by the store; used for log fields, events and
    /// error messages.
    pub kind: CatalogKind,
    /// Fetch `initial_views` when [`initialize`] is called (default: `true`).
    ///
    /// [`initialize`]: crate::ModerationStateStore::initialize
    pub auto_fetch: bool,
    /// Views fetched by `initialize` (default: all four list views).
    pub initial_views: Vec<ViewKind>,
    /// Page size used when a view is fetched without explicit params
    /// (default: `20`).
    pub page_size: u32,
    /// Number of search results requested (default: `10`).
    pub search_limit: u32,
    /// Whether the API's `all` listing includes soft-deleted records
    /// (default: `false`). When `false`, a confirmed delete removes the
    /// record from `all`; when `true`, the entry stays and is flagged
    /// deleted until the next fetch.
    pub all_includes_deleted: bool,
    /// Capacity of the change-event channel (default: `256`).
    pub event_capacity: usize,
}

impl StoreConfig {
    /// Defaults for the given catalog.
    pub fn new(kind: CatalogKind) -> Self {
        Self {
            kind,
            auto_fetch: true,
            initial_views: ViewKind::ALL_VIEWS.to_vec(),
            page_size: DEFAULT_PAGE_SIZE,
            search_limit: DEFAULT_SEARCH_LIMIT,
            all_includes_deleted: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                             | Default |
    /// |-------------------------------------|---------|
    /// | `BAZAAR_STORE_AUTO_FETCH`           | `true`  |
    /// | `BAZAAR_STORE_PAGE_SIZE`            | `20`    |
    /// | `BAZAAR_STORE_SEARCH_LIMIT`         | `10`    |
    /// | `BAZAAR_STORE_ALL_INCLUDES_DELETED` | `false` |
    pub fn from_env(kind: CatalogKind) -> Result<Self, CoreError> {
        Self::from_lookup(kind, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup<F>(kind: CatalogKind, lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(kind);

        if let Some(raw) = lookup("BAZAAR_STORE_AUTO_FETCH") {
            config.auto_fetch = parse_bool("BAZAAR_STORE_AUTO_FETCH", &raw)?;
        }
        if let Some(raw) = lookup("BAZAAR_STORE_PAGE_SIZE") {
            config.page_size = clamp_limit(parse_u32("BAZAAR_STORE_PAGE_SIZE", &raw)?);
        }
        if let Some(raw) = lookup("BAZAAR_STORE_SEARCH_LIMIT") {
            config.search_limit =
                clamp_search_limit(parse_u32("BAZAAR_STORE_SEARCH_LIMIT", &raw)?);
        }
        if let Some(raw) = lookup("BAZAAR_STORE_ALL_INCLUDES_DELETED") {
            config.all_includes_deleted =
                parse_bool("BAZAAR_STORE_ALL_INCLUDES_DELETED", &raw)?;
        }

        Ok(config)
    }

    pub fn with_auto_fetch(mut self, auto_fetch: bool) -> Self {
        self.auto_fetch = auto_fetch;
        self
    }

    pub fn with_initial_views(mut self, views: impl Into<Vec<ViewKind>>) -> Self {
        self.initial_views = views.into();
        self
    }

    pub fn with_all_includes_deleted(mut self, inclusive: bool) -> Self {
        self.all_includes_deleted = inclusive;
        self
    }

    /// First page at the configured page size.
    pub fn default_params(&self) -> ListParams {
        ListParams::new(1, self.page_size)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(CatalogKind::Category)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CoreError::Validation(format!(
            "{key} must be a boolean, got '{raw}'"
        ))),
    }
}

fn parse_u32(key: &str, raw: &str) -> Result<u32, CoreError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| CoreError::Validation(format!("{key} must be a valid u32, got '{raw}'")))
}
