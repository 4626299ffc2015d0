use bazaar_client::ApiError;
use bazaar_core::CoreError;

/// Message recorded for failures that carry no user-presentable text.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Errors returned by [`ModerationStateStore`](crate::ModerationStateStore)
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The catalog API rejected or failed the call.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A local validation or precondition check failed before any network
    /// call was made.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store was disposed before the call started.
    #[error("moderation store has been disposed")]
    Disposed,
}

/// Convenience type alias for store operation results.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Text written into `ActionState::error` / view errors.
    ///
    /// API failures keep the server's message and domain failures keep
    /// their description; anything else is reported generically.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Api(err) => err.message.clone(),
            StoreError::Core(err) => err.to_string(),
            StoreError::Disposed => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }

    /// HTTP status of the underlying API failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StoreError::Api(err) => err.status_code,
            _ => None,
        }
    }
}
