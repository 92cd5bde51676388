//! `thumbnail.*` methods.

use crate::params::Params;
use crate::request::{MethodCall, Returns};

use super::build;

/// Thumbnail URL for a document; `height` defaults to `width`.
pub fn get(doc_id: &str, width: u32, height: Option<u32>, options: Params) -> MethodCall {
    let params = Params::new()
        .with("doc_id", doc_id)
        .with("width", width)
        .with("height", height.filter(|h| *h > 0).unwrap_or(width));
    build(
        "thumbnail.get",
        params,
        options,
        Returns::Field("thumbnail_url"),
    )
}
