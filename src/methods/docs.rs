//! `docs.*` methods: upload, listing, settings, search and browsing.

use std::path::Path;

use crate::params::{FILE_PARAM, ParamValue, Params};
use crate::request::{MethodCall, Returns};

use super::build;

/// Default `doc_type` for [`get_download_url`].
pub const DEFAULT_DOWNLOAD_DOC_TYPE: &str = "original";

/// Uploads a local file. Returns `doc_id`, `access_key` and, for private
/// documents, `secret_password`.
pub fn upload(
    file: impl AsRef<Path>,
    doc_type: Option<&str>,
    access: Option<&str>,
    rev_id: Option<i64>,
    options: Params,
) -> MethodCall {
    let mut params = Params::new().with(FILE_PARAM, ParamValue::file(file.as_ref()));
    params.insert_opt("doc_type", doc_type);
    params.insert_opt("access", access);
    params.insert_opt("rev_id", rev_id);
    build("docs.upload", params, options, Returns::Payload)
}

/// Uploads a document the server fetches from `url`.
pub fn upload_from_url(
    url: &str,
    doc_type: Option<&str>,
    access: Option<&str>,
    rev_id: Option<i64>,
    options: Params,
) -> MethodCall {
    let mut params = Params::new().with("url", url);
    params.insert_opt("doc_type", doc_type);
    params.insert_opt("access", access);
    params.insert_opt("rev_id", rev_id);
    build("docs.uploadFromUrl", params, options, Returns::Payload)
}

/// Lists the current user's documents.
pub fn get_list(options: Params) -> MethodCall {
    build(
        "docs.getList",
        Params::new(),
        options,
        Returns::ResultSet("resultset"),
    )
}

/// Current conversion status: `DISPLAYABLE`, `DONE`, `ERROR` or `PROCESSING`.
pub fn get_conversion_status(doc_id: &str, options: Params) -> MethodCall {
    build(
        "docs.getConversionStatus",
        Params::new().with("doc_id", doc_id),
        options,
        Returns::Field("conversion_status"),
    )
}

pub fn get_settings(doc_id: &str, options: Params) -> MethodCall {
    build(
        "docs.getSettings",
        Params::new().with("doc_id", doc_id),
        options,
        Returns::Payload,
    )
}

/// Changes settings on one or more documents.
///
/// `license` is one of `by`, `by-nc`, `by-nc-nd`, `by-nc-sa`, `by-nd`,
/// `by-sa`, `c` or `pd`; `show_ads` is `default`, `true` or `false`.
#[allow(clippy::too_many_arguments)]
pub fn change_settings(
    doc_ids: &[&str],
    title: Option<&str>,
    description: Option<&str>,
    access: Option<&str>,
    license: Option<&str>,
    show_ads: Option<&str>,
    tags: &[&str],
    options: Params,
) -> MethodCall {
    let mut params = Params::new().with("doc_ids", doc_ids);
    params.insert_opt("title", title);
    params.insert_opt("description", description);
    params.insert_opt("access", access);
    params.insert_opt("license", license);
    params.insert_opt("show_ads", show_ads);
    params.insert("tags", tags);
    build("docs.changeSettings", params, options, Returns::Payload)
}

/// Download link for a document in `doc_type` format (`original` by default).
pub fn get_download_url(doc_id: &str, doc_type: Option<&str>, options: Params) -> MethodCall {
    let params = Params::new()
        .with("doc_id", doc_id)
        .with("doc_type", doc_type.unwrap_or(DEFAULT_DOWNLOAD_DOC_TYPE));
    build(
        "docs.getDownloadUrl",
        params,
        options,
        Returns::Field("download_link"),
    )
}

pub fn get_stats(doc_id: &str, options: Params) -> MethodCall {
    build(
        "docs.getStats",
        Params::new().with("doc_id", doc_id),
        options,
        Returns::Payload,
    )
}

pub fn delete(doc_id: &str, options: Params) -> MethodCall {
    build(
        "docs.delete",
        Params::new().with("doc_id", doc_id),
        options,
        Returns::Payload,
    )
}

/// Searches public documents (`scope` = `all`) or the user's own (`user`).
pub fn search(
    query: &str,
    num_results: Option<u32>,
    num_start: Option<u32>,
    scope: Option<&str>,
    options: Params,
) -> MethodCall {
    let mut params = Params::new().with("query", query);
    params.insert_opt("num_results", num_results);
    params.insert_opt("num_start", num_start);
    params.insert_opt("scope", scope);
    build("docs.search", params, options, Returns::ResultSet("result_set"))
}

/// Lists categories, or the subcategories of `category_id`.
pub fn get_categories(
    category_id: Option<i64>,
    with_subcategories: bool,
    options: Params,
) -> MethodCall {
    let mut params = Params::new();
    params.insert_opt("category_id", category_id);
    params.insert("with_subcategories", with_subcategories);
    build(
        "docs.getCategories",
        params,
        options,
        Returns::ResultSet("result_set"),
    )
}

/// Featured documents; `scope` is `new` or `hot`.
pub fn featured(
    limit: Option<u32>,
    offset: Option<u32>,
    scope: Option<&str>,
    options: Params,
) -> MethodCall {
    let mut params = Params::new();
    params.insert_opt("limit", limit);
    params.insert_opt("offset", offset);
    params.insert_opt("scope", scope);
    build("docs.featured", params, options, Returns::ResultSet("result_set"))
}

/// Documents matching filter criteria; `sort` is `popular`, `views` or `newest`.
pub fn browse(
    limit: Option<u32>,
    offset: Option<u32>,
    category_id: Option<i64>,
    sort: Option<&str>,
    options: Params,
) -> MethodCall {
    let mut params = Params::new();
    params.insert_opt("limit", limit);
    params.insert_opt("offset", offset);
    params.insert_opt("category_id", category_id);
    params.insert_opt("sort", sort);
    build("docs.browse", params, options, Returns::ResultSet("result_set"))
}

/// Attaches a thumbnail image to a document.
pub fn upload_thumb(file: impl AsRef<Path>, doc_id: &str, options: Params) -> MethodCall {
    let params = Params::new()
        .with(FILE_PARAM, ParamValue::file(file.as_ref()))
        .with("doc_id", doc_id);
    build("docs.uploadThumb", params, options, Returns::Payload)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys(call: &MethodCall) -> Vec<&str> {
        call.params.keys().collect()
    }

    #[test]
    fn test_upload_places_file_first_and_skips_absent_options() {
        let call = upload("/tmp/report.pdf", Some("pdf"), None, None, Params::new());
        assert_eq!(call.method, "docs.upload");
        assert_eq!(keys(&call), vec!["file", "doc_type"]);
        assert_eq!(
            call.params.file(),
            Some(Path::new("/tmp/report.pdf"))
        );
        assert_eq!(call.returns, Returns::Payload);
    }

    #[test]
    fn test_upload_merges_camel_case_options_after_positional_args() {
        let call = upload(
            "a.txt",
            None,
            Some("private"),
            Some(9),
            Params::new().with("secretPassword", "pw").with("isDraft", false),
        );
        assert_eq!(keys(&call), vec!["file", "access", "rev_id", "secret_password"]);
    }

    #[test]
    fn test_get_list_declares_resultset() {
        let call = get_list(Params::new());
        assert_eq!(call.method, "docs.getList");
        assert!(call.params.is_empty());
        assert_eq!(call.returns, Returns::ResultSet("resultset"));
    }

    #[test]
    fn test_get_download_url_defaults_to_original() {
        let call = get_download_url("42", None, Params::new());
        assert_eq!(
            call.params.get("doc_type").unwrap().to_wire_string(),
            DEFAULT_DOWNLOAD_DOC_TYPE
        );
        assert_eq!(call.returns, Returns::Field("download_link"));

        let call = get_download_url("42", Some("pdf"), Params::new());
        assert_eq!(call.params.get("doc_type").unwrap().to_wire_string(), "pdf");
    }

    #[test]
    fn test_change_settings_joins_lists() {
        let call = change_settings(
            &["1", "2"],
            Some("Title"),
            None,
            None,
            Some("by-sa"),
            None,
            &["rust", "api"],
            Params::new(),
        );
        assert_eq!(call.method, "docs.changeSettings");
        assert_eq!(call.params.get("doc_ids").unwrap().to_wire_string(), "1,2");
        assert_eq!(call.params.get("tags").unwrap().to_wire_string(), "rust,api");
        assert_eq!(keys(&call), vec!["doc_ids", "title", "license", "tags"]);
    }

    #[test]
    fn test_search_and_browse_declare_result_set() {
        let call = search("rust", Some(5), None, Some("all"), Params::new());
        assert_eq!(keys(&call), vec!["query", "num_results", "scope"]);
        assert_eq!(call.returns, Returns::ResultSet("result_set"));

        let call = browse(None, None, Some(3), Some("newest"), Params::new());
        assert_eq!(call.method, "docs.browse");
        assert_eq!(keys(&call), vec!["category_id", "sort"]);
        assert_eq!(call.returns, Returns::ResultSet("result_set"));

        let call = featured(Some(10), None, Some("hot"), Params::new());
        assert_eq!(call.returns, Returns::ResultSet("result_set"));
    }

    #[test]
    fn test_get_categories_keeps_true_flag_only() {
        let call = get_categories(None, true, Params::new());
        assert_eq!(keys(&call), vec!["with_subcategories"]);

        let call = get_categories(Some(7), false, Params::new());
        let canonical = call.params.canonicalize();
        assert_eq!(canonical.keys().collect::<Vec<_>>(), vec!["category_id"]);
    }

    #[test]
    fn test_upload_thumb_is_multipart_call() {
        let call = upload_thumb("thumb.png", "42", Params::new());
        assert_eq!(call.method, "docs.uploadThumb");
        assert_eq!(keys(&call), vec!["file", "doc_id"]);
    }
}
