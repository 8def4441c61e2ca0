//! Worker directory read models.
//!
//! Workers are owned by the external profile subsystem; the core only reads
//! them for targeting. Raw role and registration codes are decoded once at
//! load time into tagged variants so eligibility checks never compare
//! integers.

use super::geo::Coordinates;
use super::shift::WorkerId;

/// Professional role recorded on a worker profile.
///
/// The legacy column stores `0` and `4` for operators and other codes for
/// pharmacy staff; only operators are targeted for shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRole {
    Operator,
    Pharmacist,
    Other,
}

impl WorkerRole {
    /// Decode the legacy role code.
    #[must_use]
    pub fn from_code(code: i16) -> Self {
        match code {
            0 | 4 => Self::Operator,
            1 => Self::Pharmacist,
            _ => Self::Other,
        }
    }

    /// Whether this role may be targeted for shifts.
    #[must_use]
    pub fn targetable(self) -> bool {
        matches!(self, Self::Operator)
    }
}

/// Registration lifecycle state of a worker account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Active,
    Inactive,
}

impl RegistrationState {
    /// Decode the legacy registration status code (2 = active).
    #[must_use]
    pub fn from_code(code: i16) -> Self {
        if code == 2 { Self::Active } else { Self::Inactive }
    }
}

/// A worker profile as read by the directory adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerProfile {
    pub id: WorkerId,
    pub role: WorkerRole,
    pub registration: RegistrationState,
    /// Weekly availability string of day+band tokens, e.g. `"M6 W14 F22"`.
    pub availability: String,
    /// Configured travel bound compared against the great-circle term.
    pub max_distance: f64,
    pub position: Option<Coordinates>,
    pub device_token: Option<String>,
}

/// A worker selected by the targeting pass, carrying what the dispatcher
/// needs to alert them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateWorker {
    pub id: WorkerId,
    pub device_token: Option<String>,
}
