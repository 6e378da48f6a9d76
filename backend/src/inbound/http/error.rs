//! Renders domain errors as JSON responses.
//!
//! Every failure leaves the board as `{code, message, traceId?, details?}`
//! with the trace id echoed in the `trace-id` header. Internal failures are
//! logged in full and replaced by a generic body before they reach a client.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

pub use crate::domain::ApiResult;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Strip message and details from internal errors, keeping the trace id.
fn redact_if_internal(source: &Error) -> Error {
    if source.code() != ErrorCode::InternalError {
        return source.clone();
    }
    match source.trace_id() {
        Some(id) => Error::internal(REDACTED_MESSAGE).with_trace_id(id.to_owned()),
        None => Error::internal(REDACTED_MESSAGE),
    }
}

fn log_server_fault(source: &Error) {
    let trace_id = source.trace_id().unwrap_or_default();
    match source.code() {
        ErrorCode::InternalError => {
            error!(message = source.message(), trace_id, "request failed");
        }
        ErrorCode::ServiceUnavailable => {
            warn!(message = source.message(), trace_id, "backing store unavailable");
        }
        _ => {}
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_server_fault(self);
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(redact_if_internal(self))
    }
}
