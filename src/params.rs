//! Request parameter mapping.
//!
//! [`Params`] is an insertion-ordered name → value mapping. Callers may use
//! camelCase keys; [`Params::canonicalize`] converts them to the API's
//! lower_snake_case convention and drops falsy values, which the API treats
//! as "not supplied".

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Parameter name that marks a multipart upload.
pub const FILE_PARAM: &str = "file";

/// Lowercase letter or digit followed by a run of uppercase letters.
#[allow(clippy::expect_used)]
static CAMEL_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z\d])([A-Z]+)").expect("camel boundary regex is valid") // Static pattern, safe to panic
});

/// Keys whose values never appear in logs.
const REDACTED_KEYS: &[&str] = &["password"];

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Free text.
    Text(String),
    /// Integer (document ids, limits, offsets).
    Int(i64),
    /// Boolean flag, sent as `true`/`false`.
    Bool(bool),
    /// List of values, sent comma-joined (e.g. `doc_ids`, `tags`).
    List(Vec<String>),
    /// Local file to upload; switches the request to multipart.
    File(PathBuf),
}

impl ParamValue {
    /// Creates a file reference value.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Returns true for values the API treats as absent: empty text, `0`,
    /// `false` or an empty list. A file is never absent; an empty path is
    /// rejected when the body is encoded.
    #[must_use]
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Int(value) => *value == 0,
            Self::Bool(flag) => !flag,
            Self::List(items) => items.is_empty(),
            Self::File(_) => false,
        }
    }

    /// Returns the value as it is sent on the wire.
    #[must_use]
    pub fn to_wire_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Int(value) => value.to_string(),
            Self::Bool(flag) => flag.to_string(),
            Self::List(items) => items.join(","),
            Self::File(path) => path.display().to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(|item| (*item).to_string()).collect())
    }
}

/// Converts a camelCase key to lower_snake_case.
///
/// Keys already in snake_case pass through unchanged.
#[must_use]
pub fn to_snake_case(key: &str) -> String {
    CAMEL_BOUNDARY
        .replace_all(key.trim(), "${1}_${2}")
        .to_lowercase()
}

/// Insertion-ordered request parameters.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing an existing entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(name, _)| *name == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Sets `key` only when `value` is present.
    pub fn insert_opt<V: Into<ParamValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(name, _)| name == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns the path of the `file` parameter, if one is set.
    ///
    /// A text value under `file` is read as a path too.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        match self.get(FILE_PARAM) {
            Some(ParamValue::File(path)) => Some(path),
            Some(ParamValue::Text(text)) => Some(Path::new(text)),
            _ => None,
        }
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entries are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges caller-supplied options after the positional parameters.
    ///
    /// Option keys are converted to snake_case and falsy option values are
    /// skipped, so an option can add or override a parameter but never blank
    /// one out.
    pub fn merge_options(&mut self, options: Params) {
        for (key, value) in options.entries {
            if !value.is_falsy() {
                self.insert(to_snake_case(&key), value);
            }
        }
    }

    /// Returns the transport form of this mapping: snake_case keys, falsy
    /// values dropped, insertion order kept.
    ///
    /// When two keys collapse to the same snake_case name, the first position
    /// is kept and the later value wins.
    #[must_use]
    pub fn canonicalize(self) -> Params {
        let mut canonical = Params::new();
        for (key, value) in self.entries {
            if value.is_falsy() {
                continue;
            }
            canonical.insert(to_snake_case(&key), value);
        }
        canonical
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.entries {
            if REDACTED_KEYS.contains(&key.as_str()) {
                map.entry(key, &"<redacted>");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case_converts_camel_keys() {
        assert_eq!(to_snake_case("docType"), "doc_type");
        assert_eq!(to_snake_case("numResults"), "num_results");
        assert_eq!(to_snake_case("withSubcategories"), "with_subcategories");
        assert_eq!(to_snake_case("myUserID"), "my_user_id");
        assert_eq!(to_snake_case("rev2Id"), "rev2_id");
    }

    #[test]
    fn test_to_snake_case_leaves_snake_keys_alone() {
        assert_eq!(to_snake_case("doc_type"), "doc_type");
        assert_eq!(to_snake_case("file"), "file");
        assert_eq!(to_snake_case("  padded "), "padded");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut params = Params::new();
        params.insert("a", "1");
        params.insert("b", "2");
        params.insert("a", "3");
        let keys: Vec<&str> = params.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(params.get("a"), Some(&ParamValue::Text("3".to_string())));
    }

    #[test]
    fn test_insert_opt_skips_none() {
        let mut params = Params::new();
        params.insert_opt::<&str>("access", None);
        params.insert_opt("scope", Some("user"));
        assert!(!params.contains_key("access"));
        assert!(params.contains_key("scope"));
    }

    #[test]
    fn test_falsy_values() {
        assert!(ParamValue::from("").is_falsy());
        assert!(ParamValue::from(0).is_falsy());
        assert!(ParamValue::from(false).is_falsy());
        assert!(ParamValue::List(Vec::new()).is_falsy());
        assert!(!ParamValue::from("x").is_falsy());
        assert!(!ParamValue::from(-1).is_falsy());
        assert!(!ParamValue::from(true).is_falsy());
        assert!(!ParamValue::file("").is_falsy());
    }

    #[test]
    fn test_canonicalize_drops_falsy_and_renames() {
        let params = Params::new()
            .with("query", "rust")
            .with("numResults", 10)
            .with("numStart", 0)
            .with("scope", "");
        let canonical = params.canonicalize();
        let keys: Vec<&str> = canonical.keys().collect();
        assert_eq!(keys, vec!["query", "num_results"]);
    }

    #[test]
    fn test_canonicalize_collapsed_keys_keep_first_position() {
        let params = Params::new()
            .with("doc_type", "pdf")
            .with("access", "private")
            .with("docType", "ppt");
        let canonical = params.canonicalize();
        let keys: Vec<&str> = canonical.keys().collect();
        assert_eq!(keys, vec!["doc_type", "access"]);
        assert_eq!(canonical.get("doc_type").unwrap().to_wire_string(), "ppt");
    }

    #[test]
    fn test_merge_options_snake_cases_and_skips_falsy() {
        let mut params = Params::new().with("doc_id", 42);
        let options = Params::new()
            .with("secretPassword", "hunter2")
            .with("docId", 0);
        params.merge_options(options);
        assert_eq!(params.get("doc_id"), Some(&ParamValue::Int(42)));
        assert!(params.contains_key("secret_password"));
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(ParamValue::from(true).to_wire_string(), "true");
        assert_eq!(ParamValue::from(7).to_wire_string(), "7");
        let tags: &[&str] = &["a", "b"];
        assert_eq!(ParamValue::from(tags).to_wire_string(), "a,b");
    }

    #[test]
    fn test_file_accessor() {
        let params = Params::new().with(FILE_PARAM, ParamValue::file("/tmp/doc.pdf"));
        assert_eq!(params.file(), Some(Path::new("/tmp/doc.pdf")));
        let text_file = Params::new().with(FILE_PARAM, "./slides.ppt");
        assert_eq!(text_file.file(), Some(Path::new("./slides.ppt")));
        assert!(Params::new().with("url", "x").file().is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let params = Params::new()
            .with("username", "alice")
            .with("password", "s3cret");
        let rendered = format!("{params:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("s3cret"), "password leaked: {rendered}");
        assert!(rendered.contains("<redacted>"));
    }
}
