//! Typed views over common document payloads.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::request::ApiError;

/// Response of `docs.upload` / `docs.uploadFromUrl`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    pub doc_id: String,
    #[serde(default)]
    pub access_key: Option<String>,
    /// Present for private documents.
    #[serde(default)]
    pub secret_password: Option<String>,
}

impl UploadResult {
    /// Reads an upload result from a success payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] when `doc_id` is missing.
    pub fn from_payload(payload: Value) -> Result<Self, ApiError> {
        let rendered = payload.to_string();
        serde_json::from_value(payload).map_err(|_| ApiError::malformed(rendered))
    }
}

/// Conversion state reported by `docs.getConversionStatus`.
///
/// Only [`Done`](Self::Done) ends a conversion wait. `ERROR` is reported by
/// the server but treated as still in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    Displayable,
    Done,
    Error,
    Processing,
    /// Any status string not listed above.
    Other(String),
}

impl ConversionStatus {
    /// Parses a status string as sent by the server.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "DISPLAYABLE" => Self::Displayable,
            "DONE" => Self::Done,
            "ERROR" => Self::Error,
            "PROCESSING" => Self::Processing,
            other => Self::Other(other.to_string()),
        }
    }

    /// Reads the status from the value a `conversion_status` call returned.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(raw) => Self::parse(raw),
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Displayable => "DISPLAYABLE",
            Self::Done => "DONE",
            Self::Error => "ERROR",
            Self::Processing => "PROCESSING",
            Self::Other(raw) => raw,
        }
    }

    /// True only for `DONE`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
