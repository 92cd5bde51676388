//! Request body encoding.
//!
//! A call whose parameters include `file` is sent as `multipart/form-data`;
//! everything else is sent as `application/x-www-form-urlencoded`.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::params::{FILE_PARAM, ParamValue, Params};

use super::ApiError;

/// Content type for urlencoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Content type used when the file extension is not recognized.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Form field name.
    pub name: String,
    /// Basename of the uploaded file (file part only).
    pub file_name: Option<String>,
    /// Guessed content type (file part only).
    pub content_type: Option<&'static str>,
    /// Raw part body.
    pub body: Vec<u8>,
}

impl MultipartPart {
    /// Returns the `Content-Disposition` header value for this part.
    #[must_use]
    pub fn content_disposition(&self) -> String {
        match &self.file_name {
            Some(file_name) => {
                format!(r#"form-data; name="{}"; filename="{file_name}""#, self.name)
            }
            None => format!(r#"form-data; name="{}""#, self.name),
        }
    }

    fn into_part(self) -> Result<Part, ApiError> {
        match (self.file_name, self.content_type) {
            (Some(file_name), content_type) => Part::bytes(self.body)
                .file_name(file_name)
                .mime_str(content_type.unwrap_or(FALLBACK_CONTENT_TYPE))
                .map_err(|e| {
                    ApiError::invalid_request(format!("invalid upload content type: {e}"))
                }),
            (None, _) => Ok(Part::text(String::from_utf8_lossy(&self.body).into_owned())),
        }
    }
}

/// An encoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `application/x-www-form-urlencoded` body.
    UrlEncoded(String),
    /// `multipart/form-data` parts, in parameter order.
    Multipart(Vec<MultipartPart>),
}

impl Payload {
    /// Returns true for multipart bodies.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// Converts multipart parts into a reqwest form.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if a part's content type is rejected,
    /// or if called on a urlencoded payload.
    pub fn into_form(self) -> Result<Form, ApiError> {
        let Self::Multipart(parts) = self else {
            return Err(ApiError::invalid_request(
                "urlencoded payload cannot be sent as multipart",
            ));
        };
        let mut form = Form::new();
        for part in parts {
            let name = part.name.clone();
            form = form.part(name, part.into_part()?);
        }
        Ok(form)
    }
}

/// Encodes canonical parameters into a request body.
///
/// The existence of a `file` path is checked before anything is read or
/// sent, so a missing file fails fast with [`ApiError::FileNotFound`].
///
/// # Errors
///
/// Returns [`ApiError::FileNotFound`] when the `file` path does not exist and
/// [`ApiError::Io`] when it exists but cannot be read.
pub async fn encode(params: &Params) -> Result<Payload, ApiError> {
    let Some(file_path) = params.file() else {
        return Ok(Payload::UrlEncoded(encode_urlencoded(params)));
    };

    if !file_path.is_file() {
        return Err(ApiError::file_not_found(file_path));
    }

    let file_body = tokio::fs::read(file_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::file_not_found(file_path)
        } else {
            ApiError::io(file_path, e)
        }
    })?;
    debug!(path = %file_path.display(), bytes = file_body.len(), "read upload file");

    let mut file_body = Some(file_body);
    let parts = params
        .iter()
        .map(|(name, value)| {
            if name == FILE_PARAM {
                MultipartPart {
                    name: FILE_PARAM.to_string(),
                    file_name: Some(basename(file_path)),
                    content_type: Some(guess_content_type(file_path)),
                    body: file_body.take().unwrap_or_default(),
                }
            } else {
                MultipartPart {
                    name: name.to_string(),
                    file_name: None,
                    content_type: None,
                    body: value.to_wire_string().into_bytes(),
                }
            }
        })
        .collect();

    Ok(Payload::Multipart(parts))
}

/// Encodes parameters as a urlencoded body, keys and values escaped.
#[must_use]
pub fn encode_urlencoded(params: &Params) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in params.iter() {
        if !matches!(value, ParamValue::File(_)) {
            serializer.append_pair(name, &value.to_wire_string());
        }
    }
    serializer.finish()
}

/// Guesses a content type from the file extension.
#[must_use]
pub fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" | "dot" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" | "pps" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "odt" => "application/vnd.oasis.opendocument.text",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "rtf" => "application/rtf",
        "txt" => "text/plain",
        "htm" | "html" => "text/html",
        "xml" => "application/xml",
        "ps" | "eps" => "application/postscript",
        "epub" => "application/epub+zip",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "zip" => "application/zip",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
