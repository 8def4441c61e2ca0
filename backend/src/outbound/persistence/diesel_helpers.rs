//! Shared Diesel error mapping for the persistence adapters.
//!
//! Both ports (request store, worker directory) separate connection
//! failures from query failures, so the mapping is written once against a
//! pair of constructors.

use tracing::debug;

use super::pool::PoolError;

/// Fold a pool failure into a port's connection error constructor.
pub fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.into_message())
}

/// Fold a Diesel failure into a port's query or connection constructor.
///
/// Lost connections are the only variant treated as transient; everything
/// else is a query failure with the Diesel message preserved.
pub fn map_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    debug!(%error, "diesel operation failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            connection(info.message().to_owned())
        }
        other => query(other.to_string()),
    }
}
