//! Worker identity extraction.
//!
//! Authentication happens upstream; this service trusts the gateway-supplied
//! `X-Worker-Id` header. The extractor keeps the handlers free of header
//! plumbing and rejects requests without an identity before any handler
//! code runs.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::Error;
use crate::domain::shift::WorkerId;

/// Header carrying the authenticated worker id.
pub const WORKER_ID_HEADER: &str = "X-Worker-Id";

/// The calling worker, as asserted by the upstream gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerIdentity(pub WorkerId);

impl WorkerIdentity {
    #[must_use]
    pub fn into_inner(self) -> WorkerId {
        self.0
    }
}

fn extract(req: &HttpRequest) -> Result<WorkerIdentity, Error> {
    let value = req
        .headers()
        .get(WORKER_ID_HEADER)
        .ok_or_else(|| Error::unauthorized("missing X-Worker-Id header"))?
        .to_str()
        .map_err(|_| Error::unauthorized("malformed X-Worker-Id header"))?
        .trim();
    if value.is_empty() {
        return Err(Error::unauthorized("empty X-Worker-Id header"));
    }
    Ok(WorkerIdentity(value.to_owned()))
}

impl FromRequest for WorkerIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    fn present_header_yields_the_worker_id() {
        let req = TestRequest::default()
            .insert_header((WORKER_ID_HEADER, "worker-7"))
            .to_http_request();
        let identity = extract(&req).expect("header present");
        assert_eq!(identity.into_inner(), "worker-7");
    }

    #[rstest]
    fn missing_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let error = extract(&req).expect_err("header absent");
        assert_eq!(error.code, ErrorCode::Unauthorized);
    }

    #[rstest]
    fn blank_header_is_unauthorized() {
        let req = TestRequest::default()
            .insert_header((WORKER_ID_HEADER, "   "))
            .to_http_request();
        let error = extract(&req).expect_err("header blank");
        assert_eq!(error.code, ErrorCode::Unauthorized);
    }
}
