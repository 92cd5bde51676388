//! Error types for API calls.
//!
//! Every failure a call can hit, from local pre-flight checks to server-side
//! `stat="fail"` envelopes and conversion polling, is one variant of
//! [`ApiError`]. Variants carry the context needed for diagnostics (paths,
//! URLs, raw response bodies).

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while issuing an API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The call was rejected before signing (e.g. no method name).
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },

    /// A `file` parameter points at a path that does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The upload file exists but could not be read.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// The file path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Network-level failure (DNS, connection refused, TLS, timeout).
    #[error("transport error calling {url}: {source}")]
    Transport {
        /// The endpoint URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status} calling {url}")]
    HttpStatus {
        /// The endpoint URL.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: Option<String>,
    },

    /// The response was not an XML `rsp` envelope.
    #[error("malformed response: {}", preview(body))]
    MalformedResponse {
        /// Raw response body.
        body: String,
    },

    /// The server returned `stat="fail"`.
    #[error("API failure {code}: {message}")]
    ApiFailure {
        /// Machine-readable error code (e.g. `401`, `612`).
        code: String,
        /// Human-readable message from the server.
        message: String,
        /// The whole `error` element, as parsed.
        detail: Value,
    },

    /// Conversion never reached `DONE` within the polling budget.
    #[error("conversion of document {doc_id} did not finish after {attempts} status checks")]
    ConversionTimeout {
        /// Document being polled.
        doc_id: String,
        /// Number of non-terminal statuses observed.
        attempts: u32,
    },

    /// A conversion status query itself failed.
    #[error("conversion status check failed for document {doc_id}: {source}")]
    ConversionError {
        /// Document being polled.
        doc_id: String,
        /// The failed status query.
        #[source]
        source: Box<ApiError>,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Why construction failed.
        reason: String,
    },

    /// A configuration value is out of range or unparseable.
    #[error("invalid config value for `{field}`: {reason}")]
    Config {
        /// The offending setting.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ApiError {
    /// Creates an invalid-request error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Creates a file-not-found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error, keeping the body when one was read.
    pub fn http_status(url: impl Into<String>, status: u16, body: Option<String>) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body,
        }
    }

    /// Creates a malformed-response error wrapping the raw body.
    pub fn malformed(body: impl Into<String>) -> Self {
        Self::MalformedResponse { body: body.into() }
    }

    /// Creates an API failure from a parsed `error` element.
    ///
    /// `code` and `message` are read from the element's fields; missing
    /// fields become empty strings.
    #[must_use]
    pub fn api_failure(detail: Value) -> Self {
        let field = |name: &str| {
            detail
                .get(name)
                .map(scalar_text)
                .unwrap_or_default()
        };
        Self::ApiFailure {
            code: field("code"),
            message: field("message"),
            detail,
        }
    }

    /// Creates a conversion timeout error.
    pub fn conversion_timeout(doc_id: impl Into<String>, attempts: u32) -> Self {
        Self::ConversionTimeout {
            doc_id: doc_id.into(),
            attempts,
        }
    }

    /// Wraps a failed status query for a polled document.
    pub fn conversion_error(doc_id: impl Into<String>, source: ApiError) -> Self {
        Self::ConversionError {
            doc_id: doc_id.into(),
            source: Box::new(source),
        }
    }

    /// Creates a client construction error.
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the server error code for [`ApiError::ApiFailure`].
    #[must_use]
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::ApiFailure { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns the raw response body when the error carries one.
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { body } => Some(body),
            Self::HttpStatus { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

// Like the download errors this replaces, no `From<reqwest::Error>` or
// `From<std::io::Error>`: every variant needs a URL or path for context.

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn preview(body: &str) -> String {
    const MAX_PREVIEW_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_PREVIEW_CHARS {
        let head: String = trimmed.chars().take(MAX_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
