//! `api_sig` request signatures.
//!
//! The signature covers exactly three fields, in this order: `method`,
//! `session_key` and `my_user_id`. Each present field contributes its key
//! immediately followed by its value; absent fields contribute nothing. The
//! shared secret is prepended and the MD5 digest is rendered as lowercase hex.
//!
//! # Example
//!
//! ```
//! use scribd_client::sign::sign;
//!
//! let sig = sign("docs.upload", None, None, "secret").unwrap();
//! assert_eq!(sig.len(), 32);
//! ```

use crate::request::ApiError;

/// Parameter name the signature is sent under.
pub const SIGNATURE_PARAM: &str = "api_sig";

/// Computes the `api_sig` value for a call.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] when `method` is empty.
pub fn sign(
    method: &str,
    session_key: Option<&str>,
    user_id: Option<&str>,
    secret: &str,
) -> Result<String, ApiError> {
    if method.trim().is_empty() {
        return Err(ApiError::invalid_request(
            "method name is required before signing",
        ));
    }

    let mut input = String::from(secret);
    for (key, value) in [
        ("method", Some(method)),
        ("session_key", session_key),
        ("my_user_id", user_id),
    ] {
        if let Some(value) = value {
            input.push_str(key);
            input.push_str(value);
        }
    }

    Ok(format!("{:x}", md5::compute(input.as_bytes())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_matches_md5_of_concatenation() {
        let sig = sign("docs.upload", None, None, "secret").unwrap();
        let expected = format!("{:x}", md5::compute(b"secretmethoddocs.upload"));
        assert_eq!(sig, expected);
    }

    #[test]
    fn test_sign_includes_session_and_user_in_order() {
        let sig = sign("docs.getList", Some("abc"), Some("77"), "s").unwrap();
        let expected = format!(
            "{:x}",
            md5::compute(b"smethoddocs.getListsession_keyabcmy_user_id77")
        );
        assert_eq!(sig, expected);
    }

    #[test]
    fn test_sign_omits_absent_fields_entirely() {
        let with_user_only = sign("docs.getList", None, Some("77"), "s").unwrap();
        let expected = format!("{:x}", md5::compute(b"smethoddocs.getListmy_user_id77"));
        assert_eq!(with_user_only, expected);
    }

    #[test]
    fn test_sign_is_deterministic_lowercase_hex() {
        let first = sign("docs.upload", None, None, "secret").unwrap();
        let second = sign("docs.upload", None, None, "secret").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_sign_changes_with_each_input() {
        let base = sign("docs.upload", Some("k"), Some("u"), "secret").unwrap();
        let variants = [
            sign("docs.search", Some("k"), Some("u"), "secret").unwrap(),
            sign("docs.upload", Some("k2"), Some("u"), "secret").unwrap(),
            sign("docs.upload", Some("k"), Some("u2"), "secret").unwrap(),
            sign("docs.upload", Some("k"), Some("u"), "secret2").unwrap(),
            sign("docs.upload", None, Some("u"), "secret").unwrap(),
        ];
        for variant in variants {
            assert_ne!(base, variant);
        }
    }

    #[test]
    fn test_sign_rejects_empty_method() {
        let result = sign("", None, None, "secret");
        assert!(matches!(result, Err(ApiError::InvalidRequest { .. })));
        let result = sign("   ", None, None, "secret");
        assert!(matches!(result, Err(ApiError::InvalidRequest { .. })));
    }
}
