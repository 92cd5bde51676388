//! Request plumbing: payload encoding, transport and response decoding.
//!
//! [`RequestPipeline`] is the single path every API call takes. The
//! submodules are usable on their own, e.g. to decode a captured response:
//!
//! ```
//! use scribd_client::request::parse_envelope;
//!
//! let payload = parse_envelope(r#"<rsp stat="ok"><doc_id>42</doc_id></rsp>"#).unwrap();
//! assert_eq!(payload["doc_id"], "42");
//! ```

mod envelope;
mod error;
mod http_client;
mod payload;
mod pipeline;
mod xml;

pub use envelope::{Envelope, normalize_result_set, parse_envelope};
pub use error::ApiError;
pub use http_client::build_api_http_client;
pub use payload::{MultipartPart, Payload, encode, encode_urlencoded, guess_content_type};
pub use pipeline::{
    LOGIN_METHOD, MethodCall, RequestPipeline, Returns, SESSION_KEY_FIELD, shape_result,
    signed_params,
};
pub use xml::parse_xml;

// Per-module Result aliases are not used; signatures spell out
// `Result<T, ApiError>`.
