//! Shift coordination backend library.
//!
//! Hexagonal layout: `domain` holds the assignment state machine, the
//! background services, and the ports; `outbound` implements the ports
//! against PostgreSQL and the Expo push API; `inbound` exposes the worker
//! HTTP surface.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use doc::ApiDoc;
