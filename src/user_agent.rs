//! User-Agent string sent with every API request.

/// Default User-Agent for API requests.
///
/// Carries the package repository URL (RFC 9308) when `Cargo.toml` sets one.
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match env!("CARGO_PKG_REPOSITORY") {
        "" => format!("scribd-client/{version}"),
        repository => format!("scribd-client/{version} (+{repository})"),
    }
}
