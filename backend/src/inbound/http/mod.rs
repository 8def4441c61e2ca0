//! Inbound HTTP adapter: handlers, identity extraction, error mapping.

use actix_web::web;

mod error;
pub mod health;
pub mod identity;
pub mod shifts;
pub mod state;

pub use state::HttpState;

/// Mount the versioned API routes. `HttpState` and `HealthState` must be
/// registered as app data by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(shifts::board)
            .service(shifts::lock)
            .service(shifts::accept)
            .service(shifts::refuse)
            .service(shifts::complete),
    )
    .service(health::live)
    .service(health::ready);
}
