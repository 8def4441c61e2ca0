//! Fans one open shift out to its candidate workers.
//!
//! Exactly-once-per-worker-per-shift is enforced by two independent dedup
//! filters read up front: notification receipts gate the push batch, and
//! existing view rows gate the Proposed view insert. A worker can therefore
//! get a view row without a push (no device token) or a push without a new
//! view row (row already present), but never a duplicate of either.
//!
//! Push delivery is best-effort. Receipts are written only after the
//! transport accepts a message, so a failed batch is retried on a later
//! tick; view rows are written regardless, because shift visibility in the
//! app must not depend on push.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{
    NotificationReceiptRecord, PushMessage, PushOutcome, PushTransport, RequestStore,
    RequestStoreError,
};
use crate::domain::shift::ShiftId;
use crate::domain::worker::CandidateWorker;

/// Prefix identifying a device token the push transport can address.
const EXPO_TOKEN_PREFIX: &str = "ExponentPushToken";

/// What one dispatch pass actually did, for the tick log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Push messages accepted by the transport and receipted.
    pub pushed: usize,
    /// New Proposed view rows inserted.
    pub proposed: usize,
}

/// Sends new-shift alerts and seeds Proposed view rows.
pub struct NotificationDispatcher<S, P: ?Sized> {
    store: Arc<S>,
    transport: Arc<P>,
}

impl<S, P> NotificationDispatcher<S, P>
where
    S: RequestStore,
    P: PushTransport + ?Sized,
{
    pub fn new(store: Arc<S>, transport: Arc<P>) -> Self {
        Self { store, transport }
    }

    /// Notify the candidates about one shift and make it visible to them.
    ///
    /// Fails only when a dedup read or the view insert fails; push problems
    /// are logged and absorbed.
    pub async fn dispatch(
        &self,
        shift_id: ShiftId,
        service_label: &str,
        candidates: &[CandidateWorker],
    ) -> Result<DispatchReport, RequestStoreError> {
        if candidates.is_empty() {
            return Ok(DispatchReport::default());
        }

        let notified: HashSet<_> = self
            .store
            .notified_workers(shift_id)
            .await?
            .into_iter()
            .collect();
        let viewed: HashSet<_> = self
            .store
            .viewed_workers(shift_id)
            .await?
            .into_iter()
            .collect();

        let pushed = self
            .push_batch(shift_id, service_label, candidates, &notified)
            .await;

        let view_targets: Vec<_> = candidates
            .iter()
            .filter(|candidate| !viewed.contains(&candidate.id))
            .map(|candidate| candidate.id.clone())
            .collect();
        let proposed = if view_targets.is_empty() {
            0
        } else {
            self.store.insert_proposed_views(shift_id, view_targets).await?
        };

        info!(shift_id, pushed, proposed, "dispatched shift notifications");
        Ok(DispatchReport { pushed, proposed })
    }

    /// Send one push per not-yet-notified, push-capable candidate and
    /// receipt what the transport accepted. Returns the receipted count.
    async fn push_batch(
        &self,
        shift_id: ShiftId,
        service_label: &str,
        candidates: &[CandidateWorker],
        notified: &HashSet<String>,
    ) -> usize {
        let eligible: Vec<(&CandidateWorker, &str)> = candidates
            .iter()
            .filter(|candidate| !notified.contains(&candidate.id))
            .filter_map(|candidate| {
                candidate
                    .device_token
                    .as_deref()
                    .filter(|token| token.starts_with(EXPO_TOKEN_PREFIX))
                    .map(|token| (candidate, token))
            })
            .collect();
        if eligible.is_empty() {
            return 0;
        }

        let batch: Vec<PushMessage> = eligible
            .iter()
            .map(|(_, token)| {
                PushMessage::new_shift_alert((*token).to_owned(), shift_id, service_label)
            })
            .collect();
        let outcomes = match self.transport.send(batch.clone()).await {
            Ok(outcomes) => outcomes,
            Err(error) => {
                warn!(shift_id, %error, "push batch failed; will retry next tick");
                return 0;
            }
        };

        let records: Vec<NotificationReceiptRecord> = eligible
            .iter()
            .zip(batch.iter().zip(outcomes))
            .filter(|(_, (_, outcome))| *outcome == PushOutcome::Accepted)
            .map(|((candidate, _), (message, _))| NotificationReceiptRecord {
                worker: candidate.id.clone(),
                shift_id,
                title: message.title.clone(),
                body: message.body.clone(),
            })
            .collect();
        if records.is_empty() {
            return 0;
        }

        let receipted = records.len();
        if let Err(error) = self.store.insert_receipts(records).await {
            // The pushes went out; without receipts the workers may be
            // pushed again next tick, which is the lesser failure.
            warn!(shift_id, %error, "receipt insert failed after push");
            return 0;
        }
        receipted
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod dispatch_tests;
