//! Pure transition planner for the shift state machine.
//!
//! The planner turns a shift snapshot plus a transition command into a
//! [`TransitionPlan`] describing exactly what the store must write, or a
//! [`TransitionRejection`] explaining why the caller's precondition failed.
//! It performs no I/O; the store adapter runs it under the shift's row lock
//! so concurrent commands serialise on commit order.

use chrono::{DateTime, Utc};

use crate::domain::shift::{ShiftRequest, ShiftStatus, WorkerId};
use crate::domain::view::ViewStatus;

/// Structured refusal reason captured for analytics; never read back by the
/// state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefusalReason {
    pub code: i16,
    pub note: Option<String>,
}

/// A worker-initiated transition request.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentAction {
    /// Claim an Open shift for the lock TTL.
    Lock,
    /// Confirm a shift the caller currently holds the lock on.
    Accept,
    /// Walk away; releases the lock when held and permanently hides the
    /// shift from the caller either way.
    Refuse { reason: Option<RefusalReason> },
    /// Report an assigned shift as executed.
    Complete,
}

/// Command object applied against the request store.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionCommand {
    pub worker: WorkerId,
    pub action: AssignmentAction,
}

/// Replacement values for the shift's assignment fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftChange {
    pub status: ShiftStatus,
    pub assigned_worker: Option<WorkerId>,
    pub locked_at: Option<DateTime<Utc>>,
}

/// What the store must persist for an admitted command.
///
/// `shift_change` is `None` for write-free outcomes (idempotent re-lock) and
/// for a refuse by a worker who never held the lock. `view_status` is the
/// caller's new view row status, upserted in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub shift_change: Option<ShiftChange>,
    pub view_status: Option<ViewStatus>,
    pub refusal_reason: Option<RefusalReason>,
}

/// State preconditions the snapshot failed to meet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejection {
    /// Lock attempt on a shift someone else holds or that is already
    /// assigned/closed.
    #[error("someone else just took this shift")]
    AlreadyTaken,
    /// Accept attempt after the lock expired or moved to another worker.
    #[error("your lock expired or the shift was reassigned; refresh and retry")]
    LockLost,
    /// Complete attempt on a shift not assigned to the caller.
    #[error("this shift is not assigned to you or is already closed")]
    NotAssignedToCaller,
}

/// Decide the outcome of `command` against the locked `shift` snapshot.
pub fn plan(
    shift: &ShiftRequest,
    command: &TransitionCommand,
    now: DateTime<Utc>,
) -> Result<TransitionPlan, TransitionRejection> {
    let held_by_caller = |status: ShiftStatus| {
        shift.status == status && shift.assigned_worker.as_deref() == Some(command.worker.as_str())
    };

    match &command.action {
        AssignmentAction::Lock => {
            if shift.status == ShiftStatus::Open {
                return Ok(TransitionPlan {
                    shift_change: Some(ShiftChange {
                        status: ShiftStatus::Locked,
                        assigned_worker: Some(command.worker.clone()),
                        locked_at: Some(now),
                    }),
                    view_status: Some(ViewStatus::Viewing),
                    refusal_reason: None,
                });
            }
            if held_by_caller(ShiftStatus::Locked) {
                // Idempotent re-lock: already theirs, nothing to write.
                return Ok(TransitionPlan {
                    shift_change: None,
                    view_status: None,
                    refusal_reason: None,
                });
            }
            Err(TransitionRejection::AlreadyTaken)
        }
        AssignmentAction::Accept => {
            if held_by_caller(ShiftStatus::Locked) {
                return Ok(TransitionPlan {
                    shift_change: Some(ShiftChange {
                        status: ShiftStatus::Assigned,
                        assigned_worker: shift.assigned_worker.clone(),
                        locked_at: shift.locked_at,
                    }),
                    view_status: Some(ViewStatus::Accepted),
                    refusal_reason: None,
                });
            }
            Err(TransitionRejection::LockLost)
        }
        AssignmentAction::Refuse { reason } => {
            // Release only when the caller actually holds the lock; the
            // Refused view row is written regardless so the worker is never
            // retargeted for this shift.
            let shift_change = held_by_caller(ShiftStatus::Locked).then(|| ShiftChange {
                status: ShiftStatus::Open,
                assigned_worker: None,
                locked_at: None,
            });
            Ok(TransitionPlan {
                shift_change,
                view_status: Some(ViewStatus::Refused),
                refusal_reason: reason.clone(),
            })
        }
        AssignmentAction::Complete => {
            if held_by_caller(ShiftStatus::Assigned) {
                return Ok(TransitionPlan {
                    shift_change: Some(ShiftChange {
                        status: ShiftStatus::Completed,
                        assigned_worker: None,
                        locked_at: None,
                    }),
                    view_status: Some(ViewStatus::Completed),
                    refusal_reason: None,
                });
            }
            Err(TransitionRejection::NotAssignedToCaller)
        }
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
