//! The API client.
//!
//! [`ScribdClient`] owns the credentials, the HTTP client and the conversion
//! event channel. It is cheap to clone; clones share all three.
//!
//! ```no_run
//! use scribd_client::{ClientConfig, Credentials, ScribdClient};
//!
//! # async fn example() -> Result<(), scribd_client::ApiError> {
//! let client = ScribdClient::new(Credentials::new("key", "secret"), ClientConfig::default())?;
//! let mut conversions = client.subscribe_conversions();
//! let upload = client.upload("report.pdf", None, Some("private"), None).await?;
//! client.watch_conversion(&upload.doc_id);
//! let event = conversions.recv().await;
//! # let _ = event;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::documents::{ConversionStatus, UploadResult};
use crate::methods::{docs, user};
use crate::params::Params;
use crate::poller::{ConversionEvent, ConversionPoller, StatusSource};
use crate::request::{ApiError, MethodCall, RequestPipeline, build_api_http_client};

/// Buffered conversion events per subscriber before the oldest are dropped.
const CONVERSION_EVENT_CAPACITY: usize = 64;

/// Client for the Scribd platform API.
#[derive(Debug, Clone)]
pub struct ScribdClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    pipeline: RequestPipeline,
    config: ClientConfig,
    conversions: broadcast::Sender<ConversionEvent>,
}

impl ScribdClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for an invalid configuration and
    /// [`ApiError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let http = build_api_http_client(&config)?;
        let pipeline = RequestPipeline::new(http, &config.base_url, Arc::new(credentials))?;
        let (conversions, _) = broadcast::channel(CONVERSION_EVENT_CAPACITY);
        debug!(base_url = %config.base_url, "API client created");
        Ok(Self {
            inner: Arc::new(ClientInner {
                pipeline,
                config,
                conversions,
            }),
        })
    }

    /// Creates a client from `SCRIBD_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`Credentials::from_env`], [`ClientConfig::from_env`] and [`new`](Self::new).
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(Credentials::from_env()?, ClientConfig::from_env()?)
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        self.inner.pipeline.credentials()
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Sends one API call and returns the declared part of the payload.
    ///
    /// # Errors
    ///
    /// See [`RequestPipeline::call`].
    pub async fn call(&self, call: MethodCall) -> Result<Value, ApiError> {
        self.inner.pipeline.call(call).await
    }

    /// Subscribes to conversion completion events. Subscribe before starting
    /// the upload to be sure to see its event.
    #[must_use]
    pub fn subscribe_conversions(&self) -> broadcast::Receiver<ConversionEvent> {
        self.inner.conversions.subscribe()
    }

    /// A poller for `doc_id` using this client's polling settings and event
    /// channel.
    #[must_use]
    pub fn conversion_poller(&self, doc_id: &str) -> ConversionPoller<ScribdClient> {
        ConversionPoller::new(self.clone(), doc_id)
            .with_interval(self.inner.config.poll_interval)
            .with_max_attempts(self.inner.config.poll_max_attempts)
            .with_events(self.inner.conversions.clone())
    }

    /// Polls until `doc_id` finishes converting. The event is also broadcast.
    pub async fn wait_for_conversion(&self, doc_id: &str) -> ConversionEvent {
        self.conversion_poller(doc_id).run().await
    }

    /// Polls `doc_id` in a background task.
    pub fn watch_conversion(&self, doc_id: &str) -> JoinHandle<ConversionEvent> {
        debug!(doc_id, "watching conversion in background");
        tokio::spawn(self.conversion_poller(doc_id).run())
    }

    /// Uploads a local file.
    ///
    /// With [`ClientConfig::watch_conversions`] set, a background poller is
    /// started for the new document.
    ///
    /// # Errors
    ///
    /// [`ApiError::FileNotFound`] when `file` does not exist (no request is
    /// sent), otherwise any [`call`](Self::call) error.
    #[instrument(skip(self, file), fields(file = %file.as_ref().display()))]
    pub async fn upload(
        &self,
        file: impl AsRef<Path>,
        doc_type: Option<&str>,
        access: Option<&str>,
        rev_id: Option<i64>,
    ) -> Result<UploadResult, ApiError> {
        let call = docs::upload(file.as_ref(), doc_type, access, rev_id, Params::new());
        self.finish_upload(call).await
    }

    /// Uploads a document the server fetches from `url`.
    ///
    /// # Errors
    ///
    /// Any [`call`](Self::call) error.
    pub async fn upload_from_url(
        &self,
        url: &str,
        doc_type: Option<&str>,
        access: Option<&str>,
        rev_id: Option<i64>,
    ) -> Result<UploadResult, ApiError> {
        let call = docs::upload_from_url(url, doc_type, access, rev_id, Params::new());
        self.finish_upload(call).await
    }

    async fn finish_upload(&self, call: MethodCall) -> Result<UploadResult, ApiError> {
        let result = UploadResult::from_payload(self.call(call).await?)?;
        if self.inner.config.watch_conversions {
            self.watch_conversion(&result.doc_id);
        }
        Ok(result)
    }

    /// Current conversion status of `doc_id`.
    ///
    /// # Errors
    ///
    /// Any [`call`](Self::call) error.
    pub async fn conversion_status(&self, doc_id: &str) -> Result<ConversionStatus, ApiError> {
        let value = self
            .call(docs::get_conversion_status(doc_id, Params::new()))
            .await?;
        Ok(ConversionStatus::from_value(&value))
    }

    /// Searches documents and returns the result records.
    ///
    /// # Errors
    ///
    /// Any [`call`](Self::call) error.
    pub async fn search(
        &self,
        query: &str,
        num_results: Option<u32>,
        num_start: Option<u32>,
        scope: Option<&str>,
    ) -> Result<Vec<Value>, ApiError> {
        let value = self
            .call(docs::search(query, num_results, num_start, scope, Params::new()))
            .await?;
        Ok(result_records(value))
    }

    /// Logs in; later calls are signed with the returned session key.
    ///
    /// # Errors
    ///
    /// Any [`call`](Self::call) error. A failed login leaves the current
    /// session untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Value, ApiError> {
        self.call(user::login(username, password, Params::new()))
            .await
    }
}

impl StatusSource for ScribdClient {
    async fn conversion_status(&self, doc_id: &str) -> Result<ConversionStatus, ApiError> {
        ScribdClient::conversion_status(self, doc_id).await
    }
}

/// The `result` list of a normalized result set.
fn result_records(value: Value) -> Vec<Value> {
    match value {
        Value::Object(mut set) => match set.remove("result") {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig::with_base_url("ftp://example.com");
        let err = ScribdClient::new(Credentials::new("k", "s"), config).unwrap_err();
        assert!(matches!(err, ApiError::Config { .. }));
    }

    #[test]
    fn test_clones_share_credentials() {
        let client = ScribdClient::new(Credentials::new("k", "s"), ClientConfig::default()).unwrap();
        let clone = client.clone();
        client.credentials().store_session_key("abc");
        assert_eq!(clone.credentials().session_key().as_deref(), Some("abc"));
    }

    #[test]
    fn test_result_records() {
        assert_eq!(
            result_records(json!({"result": [{"doc_id": "1"}]})),
            vec![json!({"doc_id": "1"})]
        );
        assert!(result_records(json!({"result": []})).is_empty());
        assert!(result_records(json!("unexpected")).is_empty());
    }
}
