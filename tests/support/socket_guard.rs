//! Skips socket-bound tests where loopback sockets are unavailable.
//!
//! Some sandboxes forbid binding local ports. Tests that need a mock server
//! call [`start_mock_server_or_skip`] and return early on `None`. Set
//! `SCRIBD_REQUIRE_SOCKET_TESTS=1` to turn a skip into a failure.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_SOCKET_TESTS_ENV: &str = "SCRIBD_REQUIRE_SOCKET_TESTS";

fn socket_tests_required() -> bool {
    std::env::var(REQUIRE_SOCKET_TESTS_ENV)
        .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Starts a mock server, or returns `None` when loopback binding is denied.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => drop(listener),
        Err(error) => {
            assert!(
                !socket_tests_required(),
                "{REQUIRE_SOCKET_TESTS_ENV} is set but loopback bind failed: {error}"
            );
            eprintln!("skipping socket-bound test: loopback bind failed: {error}");
            return None;
        }
    }
    Some(MockServer::start().await)
}
