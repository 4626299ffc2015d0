//! Moderation status constants and validation functions.
//!
//! Used by the store before issuing a moderation call so obviously invalid
//! requests never reach the network.

use crate::error::CoreError;
use crate::record::ModerationRequest;

/// All valid moderation status values, in wire form.
pub const VALID_STATUSES: &[&str] = &["pending", "approved", "rejected", "flagged", "hidden"];

/// Maximum length of reviewer notes, in characters.
pub const MAX_NOTES_LEN: usize = 1000;

/// Validate a moderation request.
///
/// Notes are optional, but when present they must be non-blank and no
/// longer than [`MAX_NOTES_LEN`] characters.
pub fn validate_request(request: &ModerationRequest) -> Result<(), CoreError> {
    if let Some(notes) = &request.notes {
        if notes.trim().is_empty() {
            return Err(CoreError::Validation(
                "Moderation notes must not be blank when provided".to_string(),
            ));
        }
        let len = notes.chars().count();
        if len > MAX_NOTES_LEN {
            return Err(CoreError::Validation(format!(
                "Moderation notes are {len} characters; the maximum is {MAX_NOTES_LEN}"
            )));
        }
    }
    Ok(())
}
