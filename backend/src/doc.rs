//! OpenAPI documentation configuration.
//!
//! Generates the specification served by Swagger UI in debug builds. Worker
//! identity arrives via the `X-Worker-Id` header supplied by the upstream
//! gateway, modelled as an API key scheme.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::shifts::{RefuseRequest, ShiftBoardResponse, ShiftResponse};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "WorkerId",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-Worker-Id",
                "Worker identity asserted by the upstream auth gateway.",
            ))),
        );
    }
}

/// OpenAPI document for the shift coordination API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Shift coordination API",
        description = "Worker-facing shift board and assignment transitions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("WorkerId" = [])),
    paths(
        crate::inbound::http::shifts::board,
        crate::inbound::http::shifts::lock,
        crate::inbound::http::shifts::accept,
        crate::inbound::http::shifts::refuse,
        crate::inbound::http::shifts::complete,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(ShiftResponse, ShiftBoardResponse, RefuseRequest, Error, ErrorCode)),
    tags(
        (name = "shifts", description = "Shift board and assignment transitions"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_shift_operation() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/v1/shifts",
            "/api/v1/shifts/{id}/lock",
            "/api/v1/shifts/{id}/accept",
            "/api/v1/shifts/{id}/refuse",
            "/api/v1/shifts/{id}/complete",
            "/healthz/live",
            "/healthz/ready",
        ] {
            assert!(
                paths.iter().any(|path| path.as_str() == expected),
                "missing path {expected}"
            );
        }
    }
}
