//! Core shift-coordination domain.
//!
//! Everything here is storage- and transport-agnostic: the assignment state
//! machine, the background reclaim/targeting/dispatch services, and the
//! ports they drive. Adapters live under `outbound` and `inbound`.

pub mod assignment;
pub mod availability;
pub mod dispatch;
mod error;
pub mod geo;
pub mod ports;
pub mod reclaim;
pub mod scheduler;
pub mod shift;
pub mod targeting;
pub mod view;
pub mod worker;

pub use error::{Error, ErrorCode};


/// Result alias for fallible domain operations surfaced over HTTP.
pub type ApiResult<T> = Result<T, Error>;
