//! Bulk moderation actions.
//!
//! A bulk action fans its ids out concurrently through the same
//! single-record steps as the individual operations. Each confirmed item is
//! reconciled as it lands; failures are counted and logged but never abort
//! the batch.

use std::collections::HashSet;
use std::future::Future;

use futures::future::join_all;
use serde::Serialize;

use bazaar_core::types::RecordId;
use bazaar_core::{ActionClass, ModerationRequest, ViewKind};
use bazaar_events::StoreChange;

use crate::error::StoreResult;
use crate::store::ModerationStateStore;

/// Result of a bulk action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    /// Distinct ids attempted.
    pub total: usize,
    pub failed: usize,
}

impl BulkOutcome {
    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

impl ModerationStateStore {
    pub async fn bulk_approve(&self, ids: &[RecordId], notes: Option<String>) -> BulkOutcome {
        let request = ModerationRequest::approve(notes);
        self.run_bulk(ActionClass::Moderate, "approve", ids, move |id| {
            let request = request.clone();
            async move { self.moderate_inner(&id, &request).await }
        })
        .await
    }

    pub async fn bulk_reject(&self, ids: &[RecordId], notes: Option<String>) -> BulkOutcome {
        let request = ModerationRequest::reject(notes);
        self.run_bulk(ActionClass::Moderate, "reject", ids, move |id| {
            let request = request.clone();
            async move { self.moderate_inner(&id, &request).await }
        })
        .await
    }

    pub async fn bulk_toggle_status(&self, ids: &[RecordId]) -> BulkOutcome {
        self.run_bulk(ActionClass::Update, "toggle", ids, move |id| async move {
            self.toggle_status_inner(&id).await
        })
        .await
    }

    /// Soft-delete every id, then refetch `deleted` once.
    pub async fn bulk_delete(&self, ids: &[RecordId]) -> BulkOutcome {
        let outcome = self
            .run_bulk(ActionClass::Delete, "delete", ids, move |id| async move {
                self.delete_inner(&id, false).await
            })
            .await;
        if outcome.succeeded() > 0 {
            self.refetch_views(&[ViewKind::Deleted]).await;
        }
        outcome
    }

    /// Restore every id, then refetch the live views once.
    pub async fn bulk_restore(&self, ids: &[RecordId]) -> BulkOutcome {
        let outcome = self
            .run_bulk(ActionClass::Update, "restore", ids, move |id| async move {
                self.restore_inner(&id, false).await
            })
            .await;
        if outcome.succeeded() > 0 {
            self.refetch_views(&[ViewKind::All, ViewKind::Active, ViewKind::Inactive])
                .await;
        }
        outcome
    }

    async fn run_bulk<T, F, Fut>(
        &self,
        class: ActionClass,
        verb: &'static str,
        ids: &[RecordId],
        op: F,
    ) -> BulkOutcome
    where
        F: Fn(RecordId) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let ids = dedupe(ids);
        if ids.is_empty() {
            return BulkOutcome::default();
        }
        if !self.is_mounted() {
            return BulkOutcome {
                total: ids.len(),
                failed: ids.len(),
            };
        }

        self.begin(class).await;
        let results = join_all(ids.into_iter().map(|id| {
            let item = op(id.clone());
            async move { (id, item.await) }
        }))
        .await;

        let mut failed = 0;
        for (id, result) in &results {
            if let Err(err) = result {
                failed += 1;
                tracing::warn!(
                    kind = self.kind_name(),
                    id = %id,
                    verb,
                    error = %err,
                    "Bulk item failed"
                );
            }
        }
        let outcome = BulkOutcome {
            total: results.len(),
            failed,
        };

        tracing::info!(
            kind = self.kind_name(),
            verb,
            total = outcome.total,
            failed = outcome.failed,
            "Bulk action settled"
        );
        let settled = if outcome.is_complete_success() {
            Ok(())
        } else {
            Err(format!(
                "Failed to {verb} {} of {} records",
                outcome.failed, outcome.total
            ))
        };
        self.settle(class, settled).await;
        self.publish(StoreChange::BulkSettled {
            class,
            total: outcome.total,
            failed: outcome.failed,
        });
        outcome
    }
}

/// Drop repeated ids, keeping first-seen order.
fn dedupe(ids: &[RecordId]) -> Vec<RecordId> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
