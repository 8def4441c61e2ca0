//! Port for candidate lookups against the external worker directory.
//!
//! The directory belongs to the excluded profile subsystem; physically it is
//! a query against shared storage, but the core only depends on this
//! contract.

use async_trait::async_trait;

use crate::domain::availability::AvailabilityToken;
use crate::domain::geo::Coordinates;
use crate::domain::shift::ServiceTypeId;
use crate::domain::worker::CandidateWorker;

/// Errors raised by worker directory adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerDirectoryError {
    /// Directory connection could not be established.
    #[error("worker directory connection failed: {message}")]
    Connection { message: String },

    /// Query failed during execution.
    #[error("worker directory query failed: {message}")]
    Query { message: String },
}

impl WorkerDirectoryError {
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

/// Candidate filter derived from one Open shift.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    /// Day+band token the worker's availability string must contain.
    pub token: AvailabilityToken,
    /// Shift location for the travel-range comparison.
    pub coordinates: Coordinates,
    /// Service the worker must have opted into, unless `bulk_service`.
    pub service_id: ServiceTypeId,
    /// Company/bulk services skip the capability opt-in filter.
    pub bulk_service: bool,
}

/// Port returning workers eligible for one shift.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkerDirectory: Send + Sync {
    /// Find active operators whose availability, travel range, and (for
    /// non-bulk services) capability opt-in match the query.
    async fn find_candidates(
        &self,
        query: CandidateQuery,
    ) -> Result<Vec<CandidateWorker>, WorkerDirectoryError>;
}
