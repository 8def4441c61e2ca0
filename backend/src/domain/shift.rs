//! Shift request entities and the shift lifecycle status codes.
//!
//! A [`ShiftRequest`] is a demand for service at a fixed time and place. Its
//! assignment fields (`status`, `assigned_worker`, `locked_at`) are the only
//! mutable part and are mutated exclusively through the assignment state
//! machine and the lock reclaimer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::Coordinates;

/// Opaque numeric shift identifier.
pub type ShiftId = i64;

/// Worker identifier issued by the external profile subsystem.
pub type WorkerId = String;

/// Service type identifier from the service catalogue.
pub type ServiceTypeId = i32;

/// Global lifecycle status of a shift request.
///
/// The wire codes mirror the persisted column: `Open(1) → Locked(3) →
/// Assigned(2) → Completed(5)`, with `Locked → Open` as the only backward
/// transition (refuse or lock expiry). Code 4 is unused in this column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// Available for any eligible worker to claim.
    Open,
    /// Definitively assigned to a worker, pending execution.
    Assigned,
    /// Temporarily claimed by one worker awaiting their accept/refuse.
    Locked,
    /// Executed and closed; terminal.
    Completed,
}

impl ShiftStatus {
    /// Persisted status code.
    #[must_use]
    pub fn code(self) -> i16 {
        match self {
            Self::Open => 1,
            Self::Assigned => 2,
            Self::Locked => 3,
            Self::Completed => 5,
        }
    }

    /// Decode a persisted status code.
    #[must_use]
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::Open),
            2 => Some(Self::Assigned),
            3 => Some(Self::Locked),
            5 => Some(Self::Completed),
            _ => None,
        }
    }
}

/// A shift request row as seen by the state machine.
///
/// ## Invariant
/// `assigned_worker` and `locked_at` are both `Some` iff `status` is
/// `Locked` or `Assigned`, and both `None` iff `status` is `Open` or
/// `Completed`. [`ShiftRequest::assignment_fields_consistent`] checks this;
/// the store adapter rejects rows that violate it instead of feeding them to
/// the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftRequest {
    pub id: ShiftId,
    pub service_id: ServiceTypeId,
    pub scheduled_at: DateTime<Utc>,
    pub price: f64,
    pub city: String,
    pub address: String,
    pub contact_name: String,
    pub phone: String,
    pub notes: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub status: ShiftStatus,
    pub assigned_worker: Option<WorkerId>,
    pub locked_at: Option<DateTime<Utc>>,
}

impl ShiftRequest {
    /// Whether the assignment fields agree with the status.
    #[must_use]
    pub fn assignment_fields_consistent(&self) -> bool {
        match self.status {
            ShiftStatus::Locked | ShiftStatus::Assigned => {
                self.assigned_worker.is_some() && self.locked_at.is_some()
            }
            ShiftStatus::Open | ShiftStatus::Completed => {
                self.assigned_worker.is_none() && self.locked_at.is_none()
            }
        }
    }
}

/// An Open shift enriched with its service catalogue entry, as consumed by
/// the targeting pass.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenShiftProfile {
    pub id: ShiftId,
    pub service_id: ServiceTypeId,
    /// Human-readable service description used as the push body.
    pub service_label: String,
    /// Whether the service is the company/bulk kind that skips the
    /// per-worker capability filter.
    pub bulk_service: bool,
    pub scheduled_at: DateTime<Utc>,
    pub coordinates: Option<Coordinates>,
}

/// One worker's shift board: claimable shifts and their own upcoming work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftBoard {
    /// Open future shifts proposed to the worker (non-refused), plus shifts
    /// they currently hold a lock on.
    pub available: Vec<ShiftRequest>,
    /// Shifts assigned to the worker and still in the future.
    pub mine: Vec<ShiftRequest>,
}

#[cfg(test)]
mod tests {
    //! Status code round-trips and invariant checks.

    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn open_shift() -> ShiftRequest {
        ShiftRequest {
            id: 7,
            service_id: 2,
            scheduled_at: Utc.with_ymd_and_hms(2026, 3, 4, 15, 0, 0).single().expect("valid time"),
            price: 80.0,
            city: "Bologna".to_owned(),
            address: "Via Irnerio 12".to_owned(),
            contact_name: "Reception".to_owned(),
            phone: "+39051000000".to_owned(),
            notes: None,
            coordinates: None,
            status: ShiftStatus::Open,
            assigned_worker: None,
            locked_at: None,
        }
    }

    #[rstest]
    #[case(ShiftStatus::Open, 1)]
    #[case(ShiftStatus::Assigned, 2)]
    #[case(ShiftStatus::Locked, 3)]
    #[case(ShiftStatus::Completed, 5)]
    fn status_codes_round_trip(#[case] status: ShiftStatus, #[case] code: i16) {
        assert_eq!(status.code(), code);
        assert_eq!(ShiftStatus::from_code(code), Some(status));
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(6)]
    fn unknown_status_codes_are_rejected(#[case] code: i16) {
        assert_eq!(ShiftStatus::from_code(code), None);
    }

    #[test]
    fn open_shift_with_clear_fields_is_consistent() {
        assert!(open_shift().assignment_fields_consistent());
    }

    #[test]
    fn locked_shift_without_holder_is_inconsistent() {
        let mut shift = open_shift();
        shift.status = ShiftStatus::Locked;
        assert!(!shift.assignment_fields_consistent());
    }

    #[test]
    fn open_shift_with_stale_holder_is_inconsistent() {
        let mut shift = open_shift();
        shift.assigned_worker = Some("w1".to_owned());
        assert!(!shift.assignment_fields_consistent());
    }
}
