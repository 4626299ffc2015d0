//! Pruning of caller-held selections against view membership.

use std::collections::HashSet;

use bazaar_core::types::RecordId;

use crate::view::CollectionView;

/// Drop every selected id that is no longer present in `view`.
///
/// Returns the number of ids removed. Run after bulk actions so a selection
/// never references records that left the displayed view.
pub fn prune_selection(selection: &mut HashSet<RecordId>, view: &CollectionView) -> usize {
    let before = selection.len();
    let present: HashSet<&str> = view.ids().collect();
    selection.retain(|id| present.contains(id.as_str()));
    before - selection.len()
}
