//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they depend only on
//! the driving port and stay testable with a mock.

use std::sync::Arc;

use crate::domain::assignment::ShiftAssignment;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub assignment: Arc<dyn ShiftAssignment>,
}

impl HttpState {
    pub fn new(assignment: Arc<dyn ShiftAssignment>) -> Self {
        Self { assignment }
    }
}
