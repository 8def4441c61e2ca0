//! Per-worker shift views.
//!
//! A view row records one worker's relationship to one shift independently
//! of the shift's global status. Rows are created when a worker is first
//! targeted and never deleted; a `Refused` row is permanent and bars the
//! worker from ever being retargeted for that shift.

/// Status of one worker's view on one shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// The worker was alerted that the shift exists.
    Proposed,
    /// The worker accepted the shift.
    Accepted,
    /// The worker currently holds the lock and is deciding.
    Viewing,
    /// The worker refused; permanent for this (worker, shift) pair.
    Refused,
    /// The worker completed the shift.
    Completed,
}

impl ViewStatus {
    /// Persisted status code.
    #[must_use]
    pub fn code(self) -> i16 {
        match self {
            Self::Proposed => 1,
            Self::Accepted => 2,
            Self::Viewing => 3,
            Self::Refused => 4,
            Self::Completed => 5,
        }
    }

    /// Decode a persisted status code.
    #[must_use]
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::Proposed),
            2 => Some(Self::Accepted),
            3 => Some(Self::Viewing),
            4 => Some(Self::Refused),
            5 => Some(Self::Completed),
            _ => None,
        }
    }
}
