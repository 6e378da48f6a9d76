//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path ids arrive as raw strings so malformed values produce the API error
//! envelope rather than Actix's plain-text 404. Body and query extractor
//! failures are routed through [`json_config`] and [`query_config`] for the
//! same reason.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use serde_json::json;
use tracing::debug;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidId,
    InvalidJson,
    InvalidQuery,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidJson => "invalid_json",
            ErrorCode::InvalidQuery => "invalid_query",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const ID_FIELD: FieldName = FieldName::new("id");

pub(crate) fn invalid_id_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a non-negative integer")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidId.as_str(),
    }))
}

/// Parse a numeric path id.
pub(crate) fn parse_id(value: &str, field: FieldName) -> Result<u64, Error> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| invalid_id_error(field, value))
}

fn invalid_json_error(err: &JsonPayloadError) -> Error {
    debug!(error = %err, "rejected request body");
    let message = match err {
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("invalid request body: {inner}"),
        other => format!("invalid request body: {other}"),
    };
    Error::invalid_request(message).with_details(json!({ "code": ErrorCode::InvalidJson.as_str() }))
}

fn invalid_query_error(err: &QueryPayloadError) -> Error {
    Error::invalid_request(format!("invalid query string: {err}"))
        .with_details(json!({ "code": ErrorCode::InvalidQuery.as_str() }))
}

/// JSON extractor settings answering malformed bodies with the API error
/// envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| invalid_json_error(&err).into())
}

/// Query extractor settings answering malformed query strings with the API
/// error envelope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| invalid_query_error(&err).into())
}
