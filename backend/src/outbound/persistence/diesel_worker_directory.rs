//! PostgreSQL-backed `WorkerDirectory` implementation using Diesel.
//!
//! The availability substring match and the capability opt-in join run in
//! SQL; role/registration decoding and the travel-range comparison run in
//! Rust so the legacy code maps and the preserved distance formula live in
//! exactly one place (the domain).

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::geo::within_travel_range;
use crate::domain::ports::{CandidateQuery, WorkerDirectory, WorkerDirectoryError};
use crate::domain::worker::{CandidateWorker, RegistrationState, WorkerProfile, WorkerRole};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::{worker_services, workers};

/// Diesel-backed implementation of the [`WorkerDirectory`] port.
#[derive(Clone)]
pub struct DieselWorkerDirectory {
    pool: DbPool,
}

impl DieselWorkerDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type WorkerTuple = (
    String,
    i16,
    i16,
    Option<String>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<String>,
);

fn decode_profile(row: WorkerTuple) -> Option<WorkerProfile> {
    let (id, role, registration, availability, max_distance, latitude, longitude, device_token) =
        row;
    let position = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(crate::domain::geo::Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };
    Some(WorkerProfile {
        id,
        role: WorkerRole::from_code(role),
        registration: RegistrationState::from_code(registration),
        availability: availability?,
        // Workers without a configured travel bound cannot be range-matched.
        max_distance: max_distance?,
        position,
        device_token,
    })
}

/// Final Rust-side eligibility check over the SQL-prefiltered profile.
fn eligible(profile: &WorkerProfile, query: &CandidateQuery) -> bool {
    profile.role.targetable()
        && profile.registration == RegistrationState::Active
        && profile
            .position
            .is_some_and(|position| {
                within_travel_range(profile.max_distance, query.coordinates, position)
            })
}

#[async_trait]
impl WorkerDirectory for DieselWorkerDirectory {
    async fn find_candidates(
        &self,
        query: CandidateQuery,
    ) -> Result<Vec<CandidateWorker>, WorkerDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, WorkerDirectoryError::connection))?;

        let pattern = format!("%{}%", query.token);
        let base = workers::table
            .filter(workers::availability.like(pattern))
            .select((
                workers::id,
                workers::role,
                workers::registration_status,
                workers::availability,
                workers::max_distance,
                workers::latitude,
                workers::longitude,
                workers::device_token,
            ))
            .order(workers::id.asc());

        let rows: Vec<WorkerTuple> = if query.bulk_service {
            // Company/bulk services go to every available worker regardless
            // of their service opt-ins.
            base.load(&mut conn).await
        } else {
            let opted_in = worker_services::table
                .filter(worker_services::service_id.eq(query.service_id))
                .filter(worker_services::selected.eq(true))
                .select(worker_services::worker);
            base.filter(workers::id.eq_any(opted_in)).load(&mut conn).await
        }
        .map_err(|err| {
            map_diesel_error(err, WorkerDirectoryError::query, WorkerDirectoryError::connection)
        })?;

        Ok(rows
            .into_iter()
            .filter_map(decode_profile)
            .filter(|profile| eligible(profile, &query))
            .map(|profile| CandidateWorker {
                id: profile.id,
                device_token: profile.device_token,
            })
            .collect())
    }
}
