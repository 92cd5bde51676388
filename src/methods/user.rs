//! `user.*` methods.

use crate::params::Params;
use crate::request::{LOGIN_METHOD, MethodCall, Returns};

use super::build;

/// Default `next_url` for [`get_auto_signin_url`].
pub const DEFAULT_NEXT_URL: &str = "/";

/// Logs in as a user. On success the pipeline stores the returned
/// `session_key`, and every later call is signed with it.
pub fn login(username: &str, password: &str, options: Params) -> MethodCall {
    let params = Params::new()
        .with("username", username)
        .with("password", password);
    build(LOGIN_METHOD, params, options, Returns::Payload)
}

/// Creates a user. Returns `session_key`, `name`, `username` and `user_id`.
pub fn signup(
    username: &str,
    password: &str,
    email: &str,
    name: Option<&str>,
    options: Params,
) -> MethodCall {
    let mut params = Params::new()
        .with("username", username)
        .with("password", password)
        .with("email", email);
    params.insert_opt("name", name);
    build("user.signup", params, options, Returns::Payload)
}

pub fn get_auto_signin_url(next_url: Option<&str>, options: Params) -> MethodCall {
    let next_url = next_url.filter(|url| !url.is_empty()).unwrap_or(DEFAULT_NEXT_URL);
    build(
        "user.getAutoSigninUrl",
        Params::new().with("next_url", next_url),
        options,
        Returns::Field("url"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_targets_login_method() {
        let call = login("alice", "hunter2", Params::new());
        assert_eq!(call.method, "user.login");
        assert_eq!(call.params.keys().collect::<Vec<_>>(), vec!["username", "password"]);
    }

    #[test]
    fn test_login_debug_never_shows_password() {
        let call = login("alice", "hunter2", Params::new());
        assert!(!format!("{call:?}").contains("hunter2"));
    }

    #[test]
    fn test_signup_optional_name() {
        let call = signup("bob", "pw", "bob@example.com", None, Params::new());
        assert_eq!(
            call.params.keys().collect::<Vec<_>>(),
            vec!["username", "password", "email"]
        );

        let call = signup("bob", "pw", "bob@example.com", Some("Bob"), Params::new());
        assert!(call.params.contains_key("name"));
    }

    #[test]
    fn test_auto_signin_url_defaults_to_root() {
        let call = get_auto_signin_url(None, Params::new());
        assert_eq!(
            call.params.get("next_url").map(crate::params::ParamValue::to_wire_string),
            Some("/".to_string())
        );
        assert_eq!(call.returns, Returns::Field("url"));
    }
}
