//! Port for transactional access to shift requests, worker views, receipts,
//! and refusal reasons.
//!
//! The store is the only component touching persistent state and the only
//! synchronisation primitive in the system: every mutating operation runs in
//! exactly one transaction, and transitions fetch the shift row with an
//! exclusive row lock (`FOR UPDATE`) so concurrent commands on the same
//! shift serialise on commit order. No partial write is ever observable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::assignment::{TransitionCommand, TransitionPlan, TransitionRejection};
use crate::domain::shift::{OpenShiftProfile, ShiftBoard, ShiftId, WorkerId};

/// Errors raised by request store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestStoreError {
    /// The referenced shift does not exist.
    #[error("shift {shift_id} not found")]
    NotFound { shift_id: ShiftId },

    /// The transition's state precondition failed under the row lock.
    #[error(transparent)]
    Rejected(TransitionRejection),

    /// Store connection could not be established; nothing was committed.
    #[error("request store connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution; the transaction rolled
    /// back.
    #[error("request store query failed: {message}")]
    Query { message: String },
}

impl RequestStoreError {
    /// Create a not-found error for a shift id.
    #[must_use]
    pub fn not_found(shift_id: ShiftId) -> Self {
        Self::NotFound { shift_id }
    }

    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// A receipt row recorded after a successful push delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReceiptRecord {
    pub worker: WorkerId,
    pub shift_id: ShiftId,
    pub title: String,
    pub body: String,
}

/// Port over the persistent shift state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Apply a worker transition in one transaction: fetch the shift row
    /// `FOR UPDATE`, run the pure planner against the locked snapshot, and
    /// persist the resulting plan (shift change, caller view upsert, and
    /// refusal reason when present). Returns the applied plan.
    async fn transition(
        &self,
        shift_id: ShiftId,
        command: TransitionCommand,
        now: DateTime<Utc>,
    ) -> Result<TransitionPlan, RequestStoreError>;

    /// The worker's shift board: claimable shifts (Open and future with a
    /// non-Refused view row for the worker, or currently locked by the
    /// worker) and their upcoming assigned shifts.
    async fn shift_board(
        &self,
        worker: WorkerId,
        now: DateTime<Utc>,
    ) -> Result<ShiftBoard, RequestStoreError>;

    /// Ids of Locked shifts whose lock predates `cutoff`.
    async fn expired_locks(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ShiftId>, RequestStoreError>;

    /// Release one expired lock in its own transaction: re-fetch the row
    /// `FOR UPDATE`, re-verify it is still Locked with `locked_at` before
    /// `cutoff`, then reset it to Open and demote the shift's Viewing view
    /// rows back to Proposed. Returns `false` when the re-check failed
    /// because a concurrent accept/refuse resolved the shift first.
    async fn reclaim(
        &self,
        shift_id: ShiftId,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, RequestStoreError>;

    /// Bounded batch of Open shifts scheduled after `now`, joined with their
    /// service catalogue entry, ordered by scheduled time.
    async fn open_future_shifts(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<OpenShiftProfile>, RequestStoreError>;

    /// Workers that already hold a notification receipt for the shift.
    async fn notified_workers(
        &self,
        shift_id: ShiftId,
    ) -> Result<Vec<WorkerId>, RequestStoreError>;

    /// Workers that already have a view row for the shift.
    async fn viewed_workers(&self, shift_id: ShiftId) -> Result<Vec<WorkerId>, RequestStoreError>;

    /// Record receipts for a delivered push batch, ignoring duplicates.
    async fn insert_receipts(
        &self,
        records: Vec<NotificationReceiptRecord>,
    ) -> Result<(), RequestStoreError>;

    /// Create Proposed view rows for newly targeted workers, ignoring
    /// duplicate keys (a concurrent dispatch pass may race on the same
    /// shift). Returns the number of rows actually inserted.
    async fn insert_proposed_views(
        &self,
        shift_id: ShiftId,
        workers: Vec<WorkerId>,
    ) -> Result<usize, RequestStoreError>;
}
