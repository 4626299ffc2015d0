//! Confirmed-then-reconciled view updates.
//!
//! After the catalog API confirms an action, [`apply`] rewrites the cached
//! views in one synchronous step:
//!
//! 1. Every view holding the record has its entry replaced in place.
//! 2. `active` / `inactive` membership is compared before and after the
//!    action with [`ViewKind::admits`]. Only a record whose membership
//!    changed moves: it leaves the view it no longer belongs to and is
//!    prepended to the one it joined. When the record sits on another page
//!    only the pagination total of the view it left is adjusted.
//! 3. Views that were never fetched are left alone.
//! 4. `deleted` is never synthesised locally (the server owns `deletedAt` /
//!    `deletedBy`); it only loses entries on restore.
//! 5. `all` never loses entries on a status change, only on a confirmed
//!    delete when the API's `all` listing excludes deleted records.

use bazaar_core::types::RecordId;
use bazaar_core::{Record, ViewKind};

use crate::view::Views;

/// A confirmed server-side change to reconcile into the views.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconcile {
    Created(Record),
    Updated(Record),
    Moderated(Record),
    Toggled(Record),
    Deleted(RecordId),
    Restored(Record),
}

impl Reconcile {
    pub fn id(&self) -> &str {
        match self {
            Reconcile::Created(r)
            | Reconcile::Updated(r)
            | Reconcile::Moderated(r)
            | Reconcile::Toggled(r)
            | Reconcile::Restored(r) => &r.id,
            Reconcile::Deleted(id) => id,
        }
    }
}

/// Which views an [`apply`] call touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// At least one entry was replaced in place.
    pub patched: bool,
    pub removed_from: Vec<ViewKind>,
    pub inserted_into: Vec<ViewKind>,
}

/// What is known about the record before the action.
enum Prior {
    /// Did not exist before (a create).
    New,
    Known(Record),
    /// Not cached anywhere and not derivable from the action.
    Unknown,
}

impl Prior {
    fn cached(views: &Views, id: &str) -> Self {
        views
            .find(id)
            .cloned()
            .map_or(Prior::Unknown, Prior::Known)
    }

    /// Whether the record belonged in `kind` before the action, if known.
    fn admitted_by(&self, kind: ViewKind) -> Option<bool> {
        match self {
            Prior::New => Some(false),
            Prior::Known(record) => Some(kind.admits(record)),
            Prior::Unknown => None,
        }
    }
}

/// Reconcile one confirmed action into `views`.
pub fn apply(views: &mut Views, action: Reconcile, all_includes_deleted: bool) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    match action {
        Reconcile::Created(record) => {
            if views.all.patch(&record) {
                outcome.patched = true;
            } else if views.all.loaded {
                views.all.prepend(record.clone());
                outcome.inserted_into.push(ViewKind::All);
            }
            sync_membership(views, &record, &Prior::New, &mut outcome);
        }
        Reconcile::Updated(record) | Reconcile::Moderated(record) => {
            let prior = Prior::cached(views, &record.id);
            outcome.patched = patch_everywhere(views, &record, true);
            sync_membership(views, &record, &prior, &mut outcome);
        }
        Reconcile::Toggled(record) => {
            // A toggle only flips `isActive`, so the prior state is known
            // even when the record is not cached.
            let prior = Prior::Known(record.clone().with_active(!record.is_active));
            // Toggling is irrelevant once deleted; leave that entry alone.
            outcome.patched = patch_everywhere(views, &record, false);
            sync_membership(views, &record, &prior, &mut outcome);
        }
        Reconcile::Deleted(id) => {
            let prior = Prior::cached(views, &id);
            for kind in [ViewKind::Active, ViewKind::Inactive] {
                if leave(views, kind, &id, prior.admitted_by(kind)) {
                    outcome.removed_from.push(kind);
                }
            }
            if all_includes_deleted {
                outcome.patched |= mark_deleted(views, &id);
            } else {
                let was_listed = match &prior {
                    Prior::Known(record) => Some(!record.is_deleted),
                    _ => None,
                };
                if leave(views, ViewKind::All, &id, was_listed) {
                    outcome.removed_from.push(ViewKind::All);
                }
                outcome.patched |= mark_search_deleted(views, &id);
            }
        }
        Reconcile::Restored(record) => {
            let prior = Prior::Known(record.clone().with_deleted(true));
            if views.deleted.remove(&record.id) {
                outcome.removed_from.push(ViewKind::Deleted);
            }
            outcome.patched = patch_everywhere(views, &record, false);
            sync_membership(views, &record, &prior, &mut outcome);
        }
    }

    outcome
}

/// Replace the record in place wherever it is cached.
fn patch_everywhere(views: &mut Views, record: &Record, include_deleted: bool) -> bool {
    let mut patched = false;
    for kind in ViewKind::ALL_VIEWS {
        if kind == ViewKind::Deleted && !include_deleted {
            continue;
        }
        patched |= views.get_mut(kind).patch(record);
    }
    patched |= views.search.patch(record);
    patched
}

/// Move the id between `active` and `inactive` when its membership changed.
fn sync_membership(views: &mut Views, record: &Record, prior: &Prior, outcome: &mut ReconcileOutcome) {
    for kind in [ViewKind::Active, ViewKind::Inactive] {
        let belongs = kind.admits(record);
        let belonged = prior.admitted_by(kind);
        if belongs {
            let view = views.get_mut(kind);
            if view.loaded && !view.contains(&record.id) && belonged == Some(false) {
                view.prepend(record.clone());
                outcome.inserted_into.push(kind);
            }
        } else if leave(views, kind, &record.id, belonged) {
            outcome.removed_from.push(kind);
        }
    }
}

/// Take `id` out of a view it no longer belongs to. Returns whether an
/// entry was removed; when the record sat on another page and is known to
/// have been a member, only the total shrinks.
fn leave(views: &mut Views, kind: ViewKind, id: &str, was_member: Option<bool>) -> bool {
    let view = views.get_mut(kind);
    if view.remove(id) {
        return true;
    }
    if view.loaded && was_member == Some(true) {
        view.pagination.adjust_total(-1);
    }
    false
}

/// Flag cached copies in `all` and search results as deleted.
fn mark_deleted(views: &mut Views, id: &str) -> bool {
    let mut marked = false;
    if let Some(entry) = views.all.records.iter_mut().find(|r| r.id == id) {
        entry.is_deleted = true;
        marked = true;
    }
    marked | mark_search_deleted(views, id)
}

fn mark_search_deleted(views: &mut Views, id: &str) -> bool {
    match views.search.records.iter_mut().find(|r| r.id == id) {
        Some(entry) => {
            entry.is_deleted = true;
            true
        }
        None => false,
    }
}
