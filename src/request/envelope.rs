//! Response envelope parsing.
//!
//! Every response is wrapped in `<rsp stat="ok|fail">`. On failure the
//! envelope carries an `<error>` element with a code and a message.

use serde_json::{Map, Value};
use tracing::debug;

use super::ApiError;
use super::xml::parse_xml;

/// Root element of every response.
pub const ENVELOPE_ROOT: &str = "rsp";

/// Status field on the envelope root.
pub const STATUS_FIELD: &str = "stat";

/// Status value marking a failed call.
pub const STATUS_FAIL: &str = "fail";

/// Element holding failure details.
pub const ERROR_FIELD: &str = "error";

/// Field that holds the records of a result set.
pub const RESULT_FIELD: &str = "result";

/// A classified response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `stat="ok"`; the payload with `stat` removed.
    Ok(Map<String, Value>),
    /// `stat="fail"`; the `error` element.
    Fail(Value),
}

impl Envelope {
    /// Parses a raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] carrying `raw` when the body is
    /// not XML or has no `rsp` root.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let mut document = parse_xml(raw).map_err(|reason| {
            debug!(%reason, "response body is not XML");
            ApiError::malformed(raw)
        })?;

        let mut rsp = match document.remove(ENVELOPE_ROOT) {
            Some(Value::Object(fields)) => fields,
            // `<rsp/>` or `<rsp></rsp>`: no status, no payload.
            Some(Value::String(text)) if text.is_empty() => Map::new(),
            _ => return Err(ApiError::malformed(raw)),
        };

        let status = rsp.remove(STATUS_FIELD);
        if status.as_ref().and_then(Value::as_str) == Some(STATUS_FAIL) {
            let detail = rsp.remove(ERROR_FIELD).unwrap_or(Value::Null);
            return Ok(Self::Fail(detail));
        }
        Ok(Self::Ok(rsp))
    }

    /// Returns the success payload, or the failure as [`ApiError::ApiFailure`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ApiFailure`] for a `fail` envelope.
    pub fn into_result(self) -> Result<Map<String, Value>, ApiError> {
        match self {
            Self::Ok(payload) => Ok(payload),
            Self::Fail(detail) => Err(ApiError::api_failure(detail)),
        }
    }
}

/// Parses a raw body straight to a success payload or an error.
///
/// # Errors
///
/// See [`Envelope::parse`] and [`Envelope::into_result`].
pub fn parse_envelope(raw: &str) -> Result<Map<String, Value>, ApiError> {
    Envelope::parse(raw)?.into_result()
}

/// Makes `payload[field].result` a list.
///
/// The server collapses a single record to a bare element instead of a
/// one-element list; this restores the list shape. An empty result set (the
/// field is empty text) becomes `{"result": []}`. A missing field is left
/// alone.
pub fn normalize_result_set(payload: &mut Map<String, Value>, field: &str) {
    let Some(result_set) = payload.get_mut(field) else {
        return;
    };

    match result_set {
        Value::Object(fields) => match fields.get_mut(RESULT_FIELD) {
            Some(Value::Array(_)) | None => {}
            Some(single) => {
                let record = single.take();
                *single = Value::Array(vec![record]);
            }
        },
        Value::String(text) if text.trim().is_empty() => {
            let mut empty = Map::new();
            empty.insert(RESULT_FIELD.to_string(), Value::Array(Vec::new()));
            *result_set = Value::Object(empty);
        }
        _ => {}
    }
}
