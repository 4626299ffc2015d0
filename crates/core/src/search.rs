//! Search query helpers.

/// Default number of search results requested.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Maximum number of search results requested.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Normalize user input into a search query.
///
/// - Trims leading and trailing whitespace.
/// - Collapses inner whitespace runs into single spaces.
///
/// Returns `None` for empty or whitespace-only input, which callers treat
/// as "not searching".
///
/// # Examples
///
/// ```
/// use bazaar_core::search::normalize_query;
/// assert_eq!(normalize_query("  home   cleaning "), Some("home cleaning".to_string()));
/// assert_eq!(normalize_query(" \t "), None);
/// ```
pub fn normalize_query(query: &str) -> Option<String> {
    let terms: Vec<&str> = query.split_whitespace().collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

/// Clamp a requested search limit to valid bounds.
pub fn clamp_search_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_SEARCH_LIMIT)
}
