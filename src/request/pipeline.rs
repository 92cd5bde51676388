//! The request pipeline: normalize, sign, encode, send, parse, shape.
//!
//! Every API call goes through [`RequestPipeline::call`]. Steps, in order:
//!
//! 1. canonicalize parameter keys and drop falsy values;
//! 2. sign with the *live* session key and acting-user id;
//! 3. encode (multipart when a `file` is attached; a missing file fails here,
//!    before any network I/O);
//! 4. `POST <base-url>?api_key=<key>`;
//! 5. parse the `rsp` envelope, whatever the HTTP status; a non-2xx response
//!    without an envelope is [`ApiError::HttpStatus`];
//! 6. surface `stat="fail"` as [`ApiError::ApiFailure`];
//! 7. store the session key returned by `user.login`;
//! 8. coerce collapsed result sets back into lists;
//! 9. return the declared field, or the whole payload.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::credentials::Credentials;
use crate::params::Params;
use crate::sign::{SIGNATURE_PARAM, sign};

use super::ApiError;
use super::envelope::{normalize_result_set, parse_envelope};
use super::payload::{FORM_CONTENT_TYPE, Payload, encode};

/// Method whose successful response carries a new session key.
pub const LOGIN_METHOD: &str = "user.login";

/// Response field holding the session key after login.
pub const SESSION_KEY_FIELD: &str = "session_key";

/// Parameters the pipeline owns; caller-supplied values are discarded.
const RESERVED_PARAMS: &[&str] = &[
    "method",
    "api_key",
    "session_key",
    "my_user_id",
    SIGNATURE_PARAM,
];

/// Which part of the success payload a method returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {
    /// The whole payload object.
    Payload,
    /// A single named field (e.g. `conversion_status`).
    Field(&'static str),
    /// A named result set whose `result` child is always a list.
    ResultSet(&'static str),
}

/// A method name, its parameters and its declared return shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// Dotted method identifier, e.g. `docs.upload`.
    pub method: String,
    /// Method parameters; keys may be camelCase.
    pub params: Params,
    /// Declared return shape.
    pub returns: Returns,
}

impl MethodCall {
    /// Creates a call that returns the whole payload.
    pub fn new(method: impl Into<String>, params: Params) -> Self {
        Self {
            method: method.into(),
            params,
            returns: Returns::Payload,
        }
    }

    /// Sets the declared return shape.
    #[must_use]
    pub fn returning(mut self, returns: Returns) -> Self {
        self.returns = returns;
        self
    }

    /// Merges caller options after the method's own parameters.
    #[must_use]
    pub fn with_options(mut self, options: Params) -> Self {
        self.params.merge_options(options);
        self
    }
}

/// Builds the signed transport parameters for `call` (steps 1 and 2).
///
/// Order on the wire: `method`, the canonical method parameters,
/// `session_key` and `my_user_id` when present, then `api_sig`.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] when the method name is empty.
pub fn signed_params(call: &MethodCall, credentials: &Credentials) -> Result<Params, ApiError> {
    let mut canonical = call.params.clone().canonicalize();
    for reserved in RESERVED_PARAMS {
        if canonical.remove(reserved).is_some() {
            debug!(param = reserved, "dropping caller-supplied reserved parameter");
        }
    }

    let state = credentials.signing_state();
    let signature = sign(
        &call.method,
        state.session_key.as_deref(),
        state.my_user_id.as_deref(),
        credentials.secret(),
    )?;

    let mut signed = Params::new().with("method", call.method.as_str());
    for (key, value) in canonical.iter() {
        signed.insert(key, value.clone());
    }
    signed.insert_opt("session_key", state.session_key);
    signed.insert_opt("my_user_id", state.my_user_id);
    signed.insert(SIGNATURE_PARAM, signature);
    Ok(signed)
}

/// Applies the declared return shape to a success payload (steps 8 and 9).
///
/// When the declared field is missing the whole payload is returned.
#[must_use]
pub fn shape_result(returns: Returns, mut payload: Map<String, Value>) -> Value {
    let field = match returns {
        Returns::Payload => return Value::Object(payload),
        Returns::Field(field) => field,
        Returns::ResultSet(field) => {
            normalize_result_set(&mut payload, field);
            field
        }
    };
    match payload.remove(field) {
        Some(value) => value,
        None => Value::Object(payload),
    }
}

/// Signs, sends and decodes API calls against one endpoint.
#[derive(Debug, Clone)]
pub struct RequestPipeline {
    http: Client,
    base_url: String,
    endpoint: Url,
    credentials: Arc<Credentials>,
}

impl RequestPipeline {
    /// Creates a pipeline posting to `base_url?api_key=<key>`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when `base_url` is not a valid URL.
    pub fn new(
        http: Client,
        base_url: &str,
        credentials: Arc<Credentials>,
    ) -> Result<Self, ApiError> {
        let mut endpoint =
            Url::parse(base_url).map_err(|e| ApiError::config("base_url", e.to_string()))?;
        endpoint
            .query_pairs_mut()
            .append_pair("api_key", credentials.api_key());
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            endpoint,
            credentials,
        })
    }

    /// The live credentials read on every call.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Runs one API call through the pipeline.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidRequest`] for an empty method name
    /// - [`ApiError::FileNotFound`] / [`ApiError::Io`] for an unusable `file`
    /// - [`ApiError::Transport`] for network failures
    /// - [`ApiError::HttpStatus`] for a non-2xx response without an envelope
    /// - [`ApiError::MalformedResponse`] when the body is not an `rsp` envelope
    /// - [`ApiError::ApiFailure`] when the server returns `stat="fail"`
    #[instrument(skip(self, call), fields(method = %call.method))]
    pub async fn call(&self, call: MethodCall) -> Result<Value, ApiError> {
        let params = signed_params(&call, &self.credentials)?;
        debug!(?params, "prepared request parameters");

        let payload = encode(&params).await?;
        let (status, body) = self.send(payload).await?;

        let payload = self.classify(status, body).inspect_err(|error| {
            warn!(error = %error, "API call failed");
        })?;

        if call.method == LOGIN_METHOD {
            self.store_login_session(&payload);
        }

        Ok(shape_result(call.returns, payload))
    }

    async fn send(&self, payload: Payload) -> Result<(StatusCode, Option<String>), ApiError> {
        let request = self.http.post(self.endpoint.clone());
        let request = match payload {
            Payload::UrlEncoded(body) => request.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body),
            multipart @ Payload::Multipart(_) => request.multipart(multipart.into_form()?),
        };

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "API request failed");
            ApiError::transport(&self.base_url, e)
        })?;

        let status = response.status();
        match response.text().await {
            Ok(body) => Ok((status, Some(body))),
            Err(e) if status.is_success() => Err(ApiError::transport(&self.base_url, e)),
            Err(e) => {
                debug!(error = %e, "failed to read error response body");
                Ok((status, None))
            }
        }
    }

    /// Parses the body whatever the status. A `rsp` envelope decides the
    /// outcome; a non-envelope body on a non-2xx status is `HttpStatus`.
    fn classify(
        &self,
        status: StatusCode,
        body: Option<String>,
    ) -> Result<Map<String, Value>, ApiError> {
        if let Some(body) = &body {
            match parse_envelope(body) {
                Err(ApiError::MalformedResponse { .. }) if !status.is_success() => {}
                outcome => return outcome,
            }
        }
        debug!(status = status.as_u16(), "API returned error status");
        Err(ApiError::http_status(&self.base_url, status.as_u16(), body))
    }

    fn store_login_session(&self, payload: &Map<String, Value>) {
        match payload.get(SESSION_KEY_FIELD).and_then(Value::as_str) {
            Some(session_key) if !session_key.is_empty() => {
                self.credentials.store_session_key(session_key);
                info!("login succeeded; session key stored");
            }
            _ => warn!("login response carried no session key"),
        }
    }
}
