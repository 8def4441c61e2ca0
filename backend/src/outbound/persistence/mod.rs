//! PostgreSQL persistence adapters.
//!
//! Diesel-backed implementations of the request store and worker directory
//! ports, plus the shared connection pool. Row structs stay private to this
//! module; the domain only ever sees decoded entities.

mod diesel_helpers;
mod diesel_request_store;
mod diesel_worker_directory;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_request_store::DieselRequestStore;
pub use diesel_worker_directory::DieselWorkerDirectory;
pub use pool::{DbPool, PoolConfig, PoolError};
