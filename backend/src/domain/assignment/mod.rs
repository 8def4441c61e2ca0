//! Shift assignment: the lock → accept/refuse/complete state machine.
//!
//! The pure planner lives in [`machine`]; the service here is a thin driving
//! adapter over the [`RequestStore`] port, translating store failures into
//! the domain error taxonomy. Concurrency control is entirely the store's
//! row lock; the service holds no state of its own.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::Error;
use crate::domain::ports::{RequestStore, RequestStoreError};
use crate::domain::shift::{ShiftBoard, ShiftId, WorkerId};

mod machine;

pub use machine::{
    AssignmentAction, RefusalReason, ShiftChange, TransitionCommand, TransitionPlan,
    TransitionRejection, plan,
};

/// Driving port exposed to the inbound API layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShiftAssignment: Send + Sync {
    /// The worker's current board: claimable shifts plus their own.
    async fn board(&self, worker: WorkerId) -> Result<ShiftBoard, Error>;

    /// Claim an Open shift for the lock TTL. Idempotent for the holder.
    async fn lock(&self, shift_id: ShiftId, worker: WorkerId) -> Result<(), Error>;

    /// Confirm a locked shift; fails with Conflict once the lock is gone.
    async fn accept(&self, shift_id: ShiftId, worker: WorkerId) -> Result<(), Error>;

    /// Walk away from a shift; always hides it from the caller, releasing
    /// the lock only when they hold it.
    async fn refuse(
        &self,
        shift_id: ShiftId,
        worker: WorkerId,
        reason: Option<RefusalReason>,
    ) -> Result<(), Error>;

    /// Report an assigned shift as executed; terminal.
    async fn complete(&self, shift_id: ShiftId, worker: WorkerId) -> Result<(), Error>;
}

fn map_store_error(error: RequestStoreError) -> Error {
    match error {
        RequestStoreError::NotFound { shift_id } => {
            Error::not_found(format!("shift {shift_id} not found"))
        }
        RequestStoreError::Rejected(rejection) => Error::conflict(rejection.to_string()),
        RequestStoreError::Connection { message } => {
            Error::service_unavailable(format!("request store unavailable: {message}"))
        }
        RequestStoreError::Query { message } => {
            Error::internal(format!("request store error: {message}"))
        }
    }
}

/// Store-backed implementation of the [`ShiftAssignment`] driving port.
#[derive(Clone)]
pub struct ShiftAssignmentService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ShiftAssignmentService<S> {
    /// Create a new service over the request store.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> ShiftAssignmentService<S>
where
    S: RequestStore,
{
    async fn run(
        &self,
        shift_id: ShiftId,
        worker: WorkerId,
        action: AssignmentAction,
    ) -> Result<(), Error> {
        let command = TransitionCommand { worker, action };
        self.store
            .transition(shift_id, command, self.clock.utc())
            .await
            .map(|_| ())
            .map_err(map_store_error)
    }
}

#[async_trait]
impl<S> ShiftAssignment for ShiftAssignmentService<S>
where
    S: RequestStore,
{
    async fn board(&self, worker: WorkerId) -> Result<ShiftBoard, Error> {
        self.store
            .shift_board(worker, self.clock.utc())
            .await
            .map_err(map_store_error)
    }

    async fn lock(&self, shift_id: ShiftId, worker: WorkerId) -> Result<(), Error> {
        info!(shift_id, %worker, "lock requested");
        self.run(shift_id, worker, AssignmentAction::Lock).await
    }

    async fn accept(&self, shift_id: ShiftId, worker: WorkerId) -> Result<(), Error> {
        info!(shift_id, %worker, "accept requested");
        self.run(shift_id, worker, AssignmentAction::Accept).await
    }

    async fn refuse(
        &self,
        shift_id: ShiftId,
        worker: WorkerId,
        reason: Option<RefusalReason>,
    ) -> Result<(), Error> {
        info!(shift_id, %worker, "refuse requested");
        self.run(shift_id, worker, AssignmentAction::Refuse { reason })
            .await
    }

    async fn complete(&self, shift_id: ShiftId, worker: WorkerId) -> Result<(), Error> {
        info!(shift_id, %worker, "complete requested");
        self.run(shift_id, worker, AssignmentAction::Complete).await
    }
}
