//! Parsed form values and uploaded files.
//!
//! [`FormData`] is the value source the binder reads from: text values from
//! the query string and request body, plus multipart file parts. Both maps
//! keep keys in first-seen order.

use http::Method;
use indexmap::IndexMap;

use crate::multipart::{parse_multipart, FilePart, MultipartConfig};
use crate::{ExtractionError, ExtractionSource, RequestContext};

/// Text values and file parts keyed by form field name.
///
/// # Example
///
/// ```rust
/// use formbind::{FormData, RequestContext};
/// use http::Uri;
///
/// let ctx = RequestContext::builder()
///     .uri(Uri::from_static("/search?q=rust&page=2&q=go"))
///     .build();
///
/// let form = FormData::from_query(&ctx).unwrap();
/// assert_eq!(form.values("q"), ["rust", "go"]);
/// assert_eq!(form.values("page"), ["2"]);
/// assert!(form.values("missing").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormData {
    values: IndexMap<String, Vec<String>>,
    files: IndexMap<String, Vec<FilePart>>,
}

impl FormData {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses only the URL query string.
    ///
    /// # Errors
    ///
    /// Returns an error if the query string is not valid URL encoding.
    pub fn from_query(ctx: &RequestContext) -> Result<Self, ExtractionError> {
        let mut form = Self::new();
        if let Some(query) = ctx.query_string() {
            form.append_urlencoded(query, ExtractionSource::Query)?;
        }
        Ok(form)
    }

    /// Parses the query string and, for `POST`, `PUT` and `PATCH`, a
    /// URL-encoded or multipart body.
    ///
    /// Body values follow query values under the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query string or body cannot be parsed, or the
    /// body exceeds the configured limits.
    pub async fn from_request(
        ctx: &RequestContext,
        config: &MultipartConfig,
    ) -> Result<Self, ExtractionError> {
        let mut form = Self::from_query(ctx)?;

        if !has_form_body(ctx.method()) {
            return Ok(form);
        }
        let Some(content_type) = ctx.content_type() else {
            return Ok(form);
        };
        let mime: mime::Mime = content_type.parse().map_err(|_| {
            ExtractionError::invalid_content_type(format!("cannot parse {content_type:?}"))
        })?;

        match (mime.type_(), mime.subtype()) {
            (mime::APPLICATION, mime::WWW_FORM_URLENCODED) => {
                let body = ctx.body();
                if body.len() > config.max_body_size {
                    return Err(ExtractionError::payload_too_large(
                        config.max_body_size,
                        body.len(),
                    ));
                }
                let body = std::str::from_utf8(body).map_err(|e| {
                    ExtractionError::malformed(ExtractionSource::Body, format!("invalid UTF-8: {e}"))
                })?;
                form.append_urlencoded(body, ExtractionSource::Body)?;
            }
            (mime::MULTIPART, mime::FORM_DATA) => {
                parse_multipart(content_type, ctx.body().clone(), config, &mut form).await?;
            }
            _ => {}
        }

        Ok(form)
    }

    /// Appends a text value under `key`.
    pub fn append_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Appends a file part under its field name.
    pub fn append_file(&mut self, part: FilePart) {
        self.files
            .entry(part.name().to_string())
            .or_default()
            .push(part);
    }

    /// Returns every text value under `key`, in arrival order.
    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }

    /// Returns the first file part under `key`.
    #[must_use]
    pub fn file(&self, key: &str) -> Option<&FilePart> {
        self.files(key).first()
    }

    /// Returns every file part under `key`.
    #[must_use]
    pub fn files(&self, key: &str) -> &[FilePart] {
        self.files.get(key).map_or(&[], Vec::as_slice)
    }

    /// Iterates text value keys in first-seen order.
    pub fn value_keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates file keys in first-seen order.
    pub fn file_keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Returns `true` if there are no values and no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.files.is_empty()
    }

    fn append_urlencoded(
        &mut self,
        input: &str,
        source: ExtractionSource,
    ) -> Result<(), ExtractionError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(input)
            .map_err(|e| ExtractionError::malformed(source, e.to_string()))?;
        for (key, value) in pairs {
            self.append_value(key, value);
        }
        Ok(())
    }
}

fn has_form_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}
