//! Conversion poller.
//!
//! After an upload the server converts the document in the background.
//! [`ConversionPoller`] queries `docs.getConversionStatus` until the status is
//! `DONE` or the attempt budget runs out, then emits exactly one
//! [`ConversionEvent`]. Each tick awaits the previous one, so at most one
//! status query is in flight per document.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::config::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_MAX_ATTEMPTS};
use crate::documents::ConversionStatus;
use crate::request::ApiError;

/// Anything that can report a document's conversion status.
pub trait StatusSource: Send + Sync {
    /// Queries the current status of `doc_id`.
    fn conversion_status(
        &self,
        doc_id: &str,
    ) -> impl Future<Output = Result<ConversionStatus, ApiError>> + Send;
}

/// Poller state. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Still waiting; `attempts` non-terminal statuses seen so far.
    Polling { attempts: u32 },
    Done,
    Failed,
}

impl PollState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Polling { .. })
    }
}

/// Completion notice for one document. `error` is `None` on success.
#[derive(Debug, Clone)]
pub struct ConversionEvent {
    pub doc_id: String,
    pub error: Option<Arc<ApiError>>,
}

impl ConversionEvent {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Converts the event into a result.
    ///
    /// # Errors
    ///
    /// Returns the shared conversion error when the wait failed.
    pub fn into_result(self) -> Result<(), Arc<ApiError>> {
        match self.error {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }
}

/// Polls one document until its conversion finishes or times out.
pub struct ConversionPoller<S> {
    source: S,
    doc_id: String,
    interval: Duration,
    max_attempts: u32,
    state: PollState,
    failure: Option<ApiError>,
    events: Option<broadcast::Sender<ConversionEvent>>,
}

impl<S: StatusSource> ConversionPoller<S> {
    /// Creates a poller with the default interval and attempt budget.
    pub fn new(source: S, doc_id: impl Into<String>) -> Self {
        Self {
            source,
            doc_id: doc_id.into(),
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            state: PollState::Polling { attempts: 0 },
            failure: None,
            events: None,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the attempt budget (at least 1).
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Broadcasts the completion event on `events`.
    #[must_use]
    pub fn with_events(mut self, events: broadcast::Sender<ConversionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    #[must_use]
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Runs one status query and advances the state. A terminal poller is
    /// left unchanged.
    pub async fn tick(&mut self) -> PollState {
        let PollState::Polling { attempts } = self.state else {
            return self.state;
        };

        self.state = match self.source.conversion_status(&self.doc_id).await {
            Err(error) => {
                warn!(doc_id = %self.doc_id, error = %error, "conversion status query failed");
                self.failure = Some(ApiError::conversion_error(&self.doc_id, error));
                PollState::Failed
            }
            Ok(status) if status.is_terminal() => PollState::Done,
            Ok(status) => {
                let attempts = attempts + 1;
                debug!(doc_id = %self.doc_id, %status, attempts, "conversion still in progress");
                if attempts >= self.max_attempts {
                    self.failure = Some(ApiError::conversion_timeout(&self.doc_id, attempts));
                    PollState::Failed
                } else {
                    PollState::Polling { attempts }
                }
            }
        };
        self.state
    }

    /// Ticks until a terminal state, sleeping the interval between ticks,
    /// then emits and returns the single completion event.
    #[instrument(skip(self), fields(doc_id = %self.doc_id))]
    pub async fn run(mut self) -> ConversionEvent {
        while !self.tick().await.is_terminal() {
            tokio::time::sleep(self.interval).await;
        }

        let event = ConversionEvent {
            doc_id: self.doc_id,
            error: self.failure.take().map(Arc::new),
        };
        match &event.error {
            None => info!("conversion finished"),
            Some(error) => warn!(error = %error, "conversion wait failed"),
        }
        if let Some(events) = &self.events
            && events.send(event.clone()).is_err()
        {
            debug!("no conversion subscribers");
        }
        event
    }
}
