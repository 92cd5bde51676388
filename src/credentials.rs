//! API credentials held by a client for its lifetime.
//!
//! The API key, secret and acting-user id are fixed at construction. The
//! session key changes only through [`Credentials::store_session_key`], which
//! the request pipeline calls after a successful `user.login`.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::request::ApiError;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "SCRIBD_API_KEY";
/// Environment variable holding the API secret.
pub const API_SECRET_ENV: &str = "SCRIBD_API_SECRET";
/// Environment variable holding the optional acting-user id.
pub const MY_USER_ID_ENV: &str = "SCRIBD_MY_USER_ID";

/// Values read from the live credentials when a call is signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningState {
    /// Current session key, if logged in.
    pub session_key: Option<String>,
    /// Acting-user id, if configured.
    pub my_user_id: Option<String>,
}

/// API key, shared secret and session state.
pub struct Credentials {
    api_key: String,
    secret: String,
    my_user_id: Option<String>,
    session_key: RwLock<Option<String>>,
}

impl Credentials {
    /// Creates credentials with no session.
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            my_user_id: None,
            session_key: RwLock::new(None),
        }
    }

    /// Sets the acting-user id sent as `my_user_id`.
    #[must_use]
    pub fn with_my_user_id(mut self, my_user_id: impl Into<String>) -> Self {
        self.my_user_id = Some(my_user_id.into()).filter(|id| !id.is_empty());
        self
    }

    /// Starts with an existing session key (e.g. obtained out of band).
    #[must_use]
    pub fn with_session_key(self, session_key: impl Into<String>) -> Self {
        self.store_session_key(session_key);
        self
    }

    /// Reads credentials from `SCRIBD_API_KEY`, `SCRIBD_API_SECRET` and the
    /// optional `SCRIBD_MY_USER_ID`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the key or secret is missing or empty.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = required_env(API_KEY_ENV)?;
        let secret = required_env(API_SECRET_ENV)?;
        let mut credentials = Self::new(api_key, secret);
        if let Ok(user_id) = std::env::var(MY_USER_ID_ENV) {
            credentials = credentials.with_my_user_id(user_id.trim());
        }
        Ok(credentials)
    }

    /// The API key sent in the endpoint query string.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The shared secret used for signing.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// The acting-user id, if configured.
    #[must_use]
    pub fn my_user_id(&self) -> Option<&str> {
        self.my_user_id.as_deref()
    }

    /// The current session key, if logged in.
    #[must_use]
    pub fn session_key(&self) -> Option<String> {
        self.session_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the values that enter a signature, read at call time.
    #[must_use]
    pub fn signing_state(&self) -> SigningState {
        SigningState {
            session_key: self.session_key(),
            my_user_id: self.my_user_id.clone(),
        }
    }

    /// Replaces the session key. This is the only write to session state.
    ///
    /// An empty key clears the session.
    pub fn store_session_key(&self, session_key: impl Into<String>) {
        let session_key = Some(session_key.into()).filter(|key| !key.is_empty());
        *self
            .session_key
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session_key;
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .field("my_user_id", &self.my_user_id)
            .field("has_session", &self.session_key().is_some())
            .finish()
    }
}

fn required_env(name: &str) -> Result<String, ApiError> {
    let value = std::env::var(name)
        .map_err(|_| ApiError::config(name, "environment variable is not set"))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ApiError::config(name, "environment variable is empty"));
    }
    Ok(value)
}
