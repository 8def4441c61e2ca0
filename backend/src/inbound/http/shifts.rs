//! Shift board and transition HTTP handlers.
//!
//! ```text
//! GET  /api/v1/shifts
//! POST /api/v1/shifts/{id}/lock
//! POST /api/v1/shifts/{id}/accept
//! POST /api/v1/shifts/{id}/refuse
//! POST /api/v1/shifts/{id}/complete
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ApiResult;
use crate::domain::Error;
use crate::domain::assignment::RefusalReason;
use crate::domain::shift::{ShiftBoard, ShiftId, ShiftRequest, ShiftStatus};
use crate::inbound::http::identity::WorkerIdentity;
use crate::inbound::http::state::HttpState;

/// One shift as returned on the board.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftResponse {
    pub id: ShiftId,
    pub service_id: i32,
    pub scheduled_at: DateTime<Utc>,
    pub price: f64,
    pub city: String,
    pub address: String,
    pub contact_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub status: ShiftStatus,
}

impl From<ShiftRequest> for ShiftResponse {
    fn from(shift: ShiftRequest) -> Self {
        let (latitude, longitude) = shift
            .coordinates
            .map_or((None, None), |c| (Some(c.latitude), Some(c.longitude)));
        Self {
            id: shift.id,
            service_id: shift.service_id,
            scheduled_at: shift.scheduled_at,
            price: shift.price,
            city: shift.city,
            address: shift.address,
            contact_name: shift.contact_name,
            phone: shift.phone,
            notes: shift.notes,
            latitude,
            longitude,
            status: shift.status,
        }
    }
}

/// The caller's shift board.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftBoardResponse {
    pub available: Vec<ShiftResponse>,
    pub mine: Vec<ShiftResponse>,
}

impl From<ShiftBoard> for ShiftBoardResponse {
    // `board` is also the route handler's generated type in this module, so
    // the binding must use another name.
    fn from(value: ShiftBoard) -> Self {
        Self {
            available: value.available.into_iter().map(Into::into).collect(),
            mine: value.mine.into_iter().map(Into::into).collect(),
        }
    }
}

/// Optional refusal payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefuseRequest {
    pub reason_code: Option<i16>,
    pub note: Option<String>,
}

impl RefuseRequest {
    fn into_reason(self) -> Option<RefusalReason> {
        self.reason_code.map(|code| RefusalReason {
            code,
            note: self.note,
        })
    }
}

/// Fetch the calling worker's shift board.
#[utoipa::path(
    get,
    path = "/api/v1/shifts",
    responses(
        (status = 200, description = "Available and assigned shifts", body = ShiftBoardResponse),
        (status = 401, description = "Missing worker identity", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    params(("X-Worker-Id" = String, Header, description = "Authenticated worker id")),
    tags = ["shifts"],
    operation_id = "getShiftBoard"
)]
#[get("/shifts")]
pub async fn board(
    state: web::Data<HttpState>,
    identity: WorkerIdentity,
) -> ApiResult<web::Json<ShiftBoardResponse>> {
    let board = state.assignment.board(identity.into_inner()).await?;
    Ok(web::Json(board.into()))
}

/// Claim an open shift for the lock TTL.
#[utoipa::path(
    post,
    path = "/api/v1/shifts/{id}/lock",
    responses(
        (status = 204, description = "Shift locked for the caller"),
        (status = 401, description = "Missing worker identity", body = Error),
        (status = 404, description = "Unknown shift", body = Error),
        (status = 409, description = "Shift already taken", body = Error)
    ),
    params(
        ("id" = i64, Path, description = "Shift identifier"),
        ("X-Worker-Id" = String, Header, description = "Authenticated worker id")
    ),
    tags = ["shifts"],
    operation_id = "lockShift"
)]
#[post("/shifts/{id}/lock")]
pub async fn lock(
    state: web::Data<HttpState>,
    identity: WorkerIdentity,
    path: web::Path<ShiftId>,
) -> ApiResult<HttpResponse> {
    state
        .assignment
        .lock(path.into_inner(), identity.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Confirm a locked shift.
#[utoipa::path(
    post,
    path = "/api/v1/shifts/{id}/accept",
    responses(
        (status = 204, description = "Shift assigned to the caller"),
        (status = 401, description = "Missing worker identity", body = Error),
        (status = 404, description = "Unknown shift", body = Error),
        (status = 409, description = "Lock expired or lost", body = Error)
    ),
    params(
        ("id" = i64, Path, description = "Shift identifier"),
        ("X-Worker-Id" = String, Header, description = "Authenticated worker id")
    ),
    tags = ["shifts"],
    operation_id = "acceptShift"
)]
#[post("/shifts/{id}/accept")]
pub async fn accept(
    state: web::Data<HttpState>,
    identity: WorkerIdentity,
    path: web::Path<ShiftId>,
) -> ApiResult<HttpResponse> {
    state
        .assignment
        .accept(path.into_inner(), identity.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Walk away from a shift, optionally recording why.
#[utoipa::path(
    post,
    path = "/api/v1/shifts/{id}/refuse",
    request_body(content = RefuseRequest, description = "Optional refusal reason"),
    responses(
        (status = 204, description = "Shift hidden from the caller"),
        (status = 401, description = "Missing worker identity", body = Error),
        (status = 404, description = "Unknown shift", body = Error)
    ),
    params(
        ("id" = i64, Path, description = "Shift identifier"),
        ("X-Worker-Id" = String, Header, description = "Authenticated worker id")
    ),
    tags = ["shifts"],
    operation_id = "refuseShift"
)]
#[post("/shifts/{id}/refuse")]
pub async fn refuse(
    state: web::Data<HttpState>,
    identity: WorkerIdentity,
    path: web::Path<ShiftId>,
    payload: Option<web::Json<RefuseRequest>>,
) -> ApiResult<HttpResponse> {
    let reason = payload.and_then(|body| body.into_inner().into_reason());
    state
        .assignment
        .refuse(path.into_inner(), identity.into_inner(), reason)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Report an assigned shift as executed.
#[utoipa::path(
    post,
    path = "/api/v1/shifts/{id}/complete",
    responses(
        (status = 204, description = "Shift closed"),
        (status = 401, description = "Missing worker identity", body = Error),
        (status = 404, description = "Unknown shift", body = Error),
        (status = 409, description = "Shift is not assigned to the caller", body = Error)
    ),
    params(
        ("id" = i64, Path, description = "Shift identifier"),
        ("X-Worker-Id" = String, Header, description = "Authenticated worker id")
    ),
    tags = ["shifts"],
    operation_id = "completeShift"
)]
#[post("/shifts/{id}/complete")]
pub async fn complete(
    state: web::Data<HttpState>,
    identity: WorkerIdentity,
    path: web::Path<ShiftId>,
) -> ApiResult<HttpResponse> {
    state
        .assignment
        .complete(path.into_inner(), identity.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "shifts_tests.rs"]
mod shifts_tests;
