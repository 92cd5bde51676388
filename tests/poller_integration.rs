//! Integration tests for conversion polling through a real client.

use std::sync::atomic::Ordering;
use std::time::Duration;

use scribd_client::{ApiError, Credentials};
use wiremock::Mock;
use wiremock::matchers::{body_string_contains, method};

mod support;
use support::socket_guard::start_mock_server_or_skip;
use support::{
    API_KEY, API_SECRET, SequenceResponder, client_for, client_with, fail_envelope, ok_envelope,
    xml_response,
};

fn status(value: &str) -> String {
    ok_envelope(&format!("<conversion_status>{value}</conversion_status>"))
}

#[tokio::test]
async fn test_wait_finishes_on_done_with_one_event() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let responder = SequenceResponder::new(vec![
        status("PROCESSING"),
        status("PROCESSING"),
        status("DONE"),
    ]);
    let requests = responder.request_count();
    Mock::given(method("POST"))
        .and(body_string_contains("method=docs.getConversionStatus"))
        .respond_with(responder)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut events = client.subscribe_conversions();

    let event = client.wait_for_conversion("42").await;
    assert!(event.is_success(), "unexpected error: {:?}", event.error);
    assert_eq!(requests.load(Ordering::SeqCst), 3);

    let broadcast = events.recv().await.unwrap();
    assert_eq!(broadcast.doc_id, "42");
    assert!(broadcast.is_success());
    assert!(events.try_recv().is_err(), "exactly one event per wait");
}

#[tokio::test]
async fn test_wait_times_out_after_attempt_budget() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .respond_with(xml_response(status("PROCESSING")))
        .expect(100)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let event = client.wait_for_conversion("42").await;

    let error = event.into_result().unwrap_err();
    match &*error {
        ApiError::ConversionTimeout { doc_id, attempts } => {
            assert_eq!(doc_id, "42");
            assert_eq!(*attempts, 100);
        }
        other => panic!("expected ConversionTimeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_keeps_polling() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let responder = SequenceResponder::new(vec![status("ERROR"), status("DONE")]);
    let requests = responder.request_count();
    Mock::given(method("POST"))
        .respond_with(responder)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.wait_for_conversion("42").await.is_success());
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_query_failure_ends_wait_with_conversion_error() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .respond_with(xml_response(fail_envelope("404", "Document not found")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let event = client.wait_for_conversion("42").await;

    let error = event.into_result().unwrap_err();
    match &*error {
        ApiError::ConversionError { doc_id, source } => {
            assert_eq!(doc_id, "42");
            assert_eq!(source.api_code(), Some("404"));
        }
        other => panic!("expected ConversionError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_watch_conversions_polls_after_upload() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(body_string_contains("method=docs.uploadFromUrl"))
        .respond_with(xml_response(ok_envelope("<doc_id>77</doc_id>")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("method=docs.getConversionStatus"))
        .respond_with(xml_response(status("DONE")))
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, Credentials::new(API_KEY, API_SECRET), |config| {
        config.watch_conversions = true;
    });
    let mut events = client.subscribe_conversions();

    let upload = client
        .upload_from_url("https://example.com/report.pdf", None, None, None)
        .await
        .unwrap();
    assert_eq!(upload.doc_id, "77");

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("conversion event within timeout")
        .unwrap();
    assert_eq!(event.doc_id, "77");
    assert!(event.is_success());
}
