//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the request store, the worker directory, the push transport). Each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.

mod push_transport;
mod request_store;
mod worker_directory;

pub use push_transport::{
    LogOnlyPushTransport, PushMessage, PushOutcome, PushTransport, PushTransportError,
};
pub use request_store::{NotificationReceiptRecord, RequestStore, RequestStoreError};
pub use worker_directory::{CandidateQuery, WorkerDirectory, WorkerDirectoryError};

#[cfg(test)]
pub use push_transport::MockPushTransport;
#[cfg(test)]
pub use request_store::MockRequestStore;
#[cfg(test)]
pub use worker_directory::MockWorkerDirectory;
