//! Method wrappers: pure builders from positional arguments to [`MethodCall`].
//!
//! Each wrapper names the remote method, places its positional arguments
//! first, merges caller `options` after them (keys converted to snake_case,
//! falsy values dropped) and declares which part of the payload it returns.
//! Nothing here touches the network.
//!
//! ```
//! use scribd_client::methods::docs;
//! use scribd_client::{Params, Returns};
//!
//! let call = docs::get_conversion_status("42", Params::new());
//! assert_eq!(call.method, "docs.getConversionStatus");
//! assert_eq!(call.returns, Returns::Field("conversion_status"));
//! ```

pub mod docs;
pub mod thumbnail;
pub mod user;

use crate::params::Params;
use crate::request::{MethodCall, Returns};

fn build(method: &str, params: Params, options: Params, returns: Returns) -> MethodCall {
    MethodCall::new(method, params)
        .with_options(options)
        .returning(returns)
}
