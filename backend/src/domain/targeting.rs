//! Picks which workers hear about an open shift.
//!
//! The engine derives the shift's availability token and hands the heavy
//! filtering (role, registration, availability substring, travel range,
//! capability opt-in) to the [`WorkerDirectory`] port. A shift with no
//! coordinates cannot be range-matched and targets nobody.

use std::sync::Arc;

use chrono::Local;
use tracing::debug;

use crate::domain::availability::AvailabilityToken;
use crate::domain::ports::{CandidateQuery, WorkerDirectory, WorkerDirectoryError};
use crate::domain::shift::OpenShiftProfile;
use crate::domain::worker::CandidateWorker;

/// Matches open shifts to eligible workers.
pub struct TargetingEngine<D> {
    directory: Arc<D>,
}

impl<D> TargetingEngine<D>
where
    D: WorkerDirectory,
{
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Workers eligible to be told about this shift.
    ///
    /// The availability token uses the shift's start time in server local
    /// time, matching how workers declare their weekly availability.
    pub async fn candidates_for(
        &self,
        shift: &OpenShiftProfile,
    ) -> Result<Vec<CandidateWorker>, WorkerDirectoryError> {
        let Some(coordinates) = shift.coordinates else {
            debug!(shift_id = shift.id, "shift has no coordinates; no candidates");
            return Ok(Vec::new());
        };

        let local_start = shift.scheduled_at.with_timezone(&Local).naive_local();
        let token = AvailabilityToken::for_local_time(local_start);
        debug!(shift_id = shift.id, %token, "targeting open shift");

        self.directory
            .find_candidates(CandidateQuery {
                token,
                coordinates,
                service_id: shift.service_id,
                bulk_service: shift.bulk_service,
            })
            .await
    }
}

#[cfg(test)]
#[path = "targeting_tests.rs"]
mod targeting_tests;
