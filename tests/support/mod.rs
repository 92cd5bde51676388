//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use scribd_client::{ClientConfig, Credentials, ScribdClient};
use wiremock::{MockServer, Respond, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const API_SECRET: &str = "test-secret";

/// Wraps `inner` in a success envelope.
pub fn ok_envelope(inner: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><rsp stat="ok">{inner}</rsp>"#)
}

/// A failure envelope with the given code and message.
pub fn fail_envelope(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rsp stat="fail"><error code="{code}" message="{message}"/></rsp>"#
    )
}

pub fn xml_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/xml")
        .set_body_string(body)
}

/// Client pointed at `server` with fast polling.
pub fn client_for(server: &MockServer) -> ScribdClient {
    client_with(server, Credentials::new(API_KEY, API_SECRET), |_| {})
}

pub fn client_with(
    server: &MockServer,
    credentials: Credentials,
    configure: impl FnOnce(&mut ClientConfig),
) -> ScribdClient {
    let mut config = ClientConfig::with_base_url(format!("{}/api", server.uri()));
    config.poll_interval = std::time::Duration::from_millis(1);
    configure(&mut config);
    ScribdClient::new(credentials, config).unwrap()
}

/// Replies with each body in turn, repeating the last one.
pub struct SequenceResponder {
    bodies: Vec<String>,
    request_count: Arc<AtomicUsize>,
}

impl SequenceResponder {
    pub fn new(bodies: Vec<String>) -> Self {
        Self {
            bodies,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn request_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.request_count)
    }
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let n = self.request_count.fetch_add(1, Ordering::SeqCst);
        let body = self
            .bodies
            .get(n)
            .or_else(|| self.bodies.last())
            .cloned()
            .unwrap_or_default();
        xml_response(body)
    }
}

/// Decodes an urlencoded request body into ordered pairs.
pub fn form_pairs(request: &wiremock::Request) -> Vec<(String, String)> {
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}
