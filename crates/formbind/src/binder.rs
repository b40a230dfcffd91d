//! The field binding orchestrator.
//!
//! [`Binder`] takes a request, decodes a JSON body into the destination when
//! the content type says so, parses form values and uploads, and then walks
//! the destination's binding table writing every field that has a source.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::file::decode_file;
use crate::scalar::decode_value;
use crate::{BindError, FieldValue, FormBind, FormData, MultipartConfig, RequestContext};

/// Binder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderConfig {
    /// Limits applied while parsing form and multipart bodies.
    pub multipart: MultipartConfig,
    /// Treat `application/*+json` media types as JSON.
    pub json_suffix: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            multipart: MultipartConfig::default(),
            json_suffix: true,
        }
    }
}

impl BinderConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the multipart parsing limits.
    #[must_use]
    pub fn multipart(mut self, multipart: MultipartConfig) -> Self {
        self.multipart = multipart;
        self
    }

    /// Enables or disables `+json` suffix detection.
    #[must_use]
    pub fn json_suffix(mut self, enabled: bool) -> Self {
        self.json_suffix = enabled;
        self
    }
}

/// Binds request data onto records implementing [`FormBind`].
///
/// A bind call runs in this order:
///
/// 1. The `Content-Type` header is parsed. JSON bodies are decoded into the
///    destination. Keys present in the body overwrite the matching fields;
///    all other fields keep their current values.
/// 2. The query string and form body are parsed. A body that fails to parse is
///    ignored and only the query string is used.
/// 3. Each field in the binding table is written from its single form value,
///    or failing that from the first file part under its key.
///
/// The first failure aborts the call. Fields written before it keep their
/// new values.
///
/// # Example
///
/// ```rust
/// use formbind::{Binder, FormBind, RequestContext};
/// use http::{Method, Uri};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize, FormBind)]
/// struct Page {
///     #[form("id")]
///     id: i64,
///     #[form("name")]
///     name: String,
/// }
///
/// # tokio_test::block_on(async {
/// let ctx = RequestContext::builder()
///     .method(Method::POST)
///     .uri(Uri::from_static("/page?id=1"))
///     .header("content-type", "application/x-www-form-urlencoded")
///     .body("name=rick")
///     .build();
///
/// let mut page = Page::default();
/// Binder::default().bind(&ctx, &mut page).await.unwrap();
///
/// assert_eq!(page.id, 1);
/// assert_eq!(page.name, "rick");
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Binder {
    config: BinderConfig,
}

impl Binder {
    /// Creates a binder with the given configuration.
    #[must_use]
    pub fn new(config: BinderConfig) -> Self {
        Self { config }
    }

    /// Returns the binder configuration.
    #[must_use]
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Binds a request onto `dest`.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] for an unparseable content type, a malformed
    /// JSON body, or the first field that fails to bind.
    pub async fn bind<T>(&self, ctx: &RequestContext, dest: &mut T) -> Result<(), BindError>
    where
        T: FormBind + Serialize + DeserializeOwned,
    {
        self.decode_body(ctx, dest)?;

        let form = match FormData::from_request(ctx, &self.config.multipart).await {
            Ok(form) => form,
            Err(error) => {
                debug!(%error, "form body not parsed, binding from query string only");
                FormData::from_query(ctx).unwrap_or_default()
            }
        };

        Self::bind_fields(&form, dest)
    }

    /// Binds a request onto `dest` using form data the caller already parsed.
    ///
    /// # Errors
    ///
    /// Same as [`Binder::bind`].
    pub fn bind_form<T>(
        &self,
        ctx: &RequestContext,
        form: &FormData,
        dest: &mut T,
    ) -> Result<(), BindError>
    where
        T: FormBind + Serialize + DeserializeOwned,
    {
        self.decode_body(ctx, dest)?;
        Self::bind_fields(form, dest)
    }

    /// Runs the per-field loop only, without looking at the request body.
    ///
    /// # Errors
    ///
    /// Returns the first field-level [`BindError`].
    pub fn bind_fields<T: FormBind>(form: &FormData, dest: &mut T) -> Result<(), BindError> {
        for binding in T::bindings() {
            let directive = binding.directive();
            if directive.is_skipped() {
                trace!(field = binding.name(), "field skipped");
                continue;
            }
            let key = directive.key();

            let value = match form.values(key) {
                [] => match form.file(key) {
                    Some(part) => {
                        trace!(field = binding.name(), key, kind = %binding.kind(), "binding file part");
                        decode_file(key, binding.kind(), directive.flags(), part)?
                    }
                    None if directive.flags().required => {
                        return Err(BindError::RequiredFieldMissing {
                            field: key.to_string(),
                        });
                    }
                    None => None,
                },
                [raw] => {
                    trace!(field = binding.name(), key, kind = %binding.kind(), "binding form value");
                    let value = decode_value(binding.kind(), binding.options(), raw)
                        .map_err(|e| BindError::field_value(key, e))?;
                    Some(value)
                }
                values => {
                    return Err(BindError::MultiValueUnsupported {
                        field: key.to_string(),
                        count: values.len(),
                    });
                }
            };

            if let Some(value) = value {
                write_field(binding, key, dest, value)?;
            }
        }

        Ok(())
    }

    fn decode_body<T: Serialize + DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        dest: &mut T,
    ) -> Result<(), BindError> {
        let Some(content_type) = ctx.content_type() else {
            return Ok(());
        };

        let mime: mime::Mime = content_type.parse().map_err(|e: mime::FromStrError| {
            BindError::MediaType {
                content_type: content_type.to_string(),
                reason: e.to_string(),
            }
        })?;

        if self.is_json(&mime) {
            debug!(content_type, "decoding JSON body");
            merge_json(ctx.body(), dest)?;
        }

        Ok(())
    }

    fn is_json(&self, mime: &mime::Mime) -> bool {
        mime.type_() == mime::APPLICATION
            && (mime.subtype() == mime::JSON
                || (self.config.json_suffix && mime.suffix() == Some(mime::JSON)))
    }
}

/// Decodes a JSON body into an existing record.
///
/// Top-level object keys from the body replace the record's serialized
/// fields, then the result is deserialized back. A `null` body changes
/// nothing. Fields marked `#[serde(skip)]` come back as their default.
fn merge_json<T>(body: &[u8], dest: &mut T) -> Result<(), serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let merged = match (serde_json::from_slice::<Value>(body)?, serde_json::to_value(&*dest)?) {
        (Value::Null, _) => return Ok(()),
        (Value::Object(fields), Value::Object(mut current)) => {
            current.extend(fields);
            Value::Object(current)
        }
        (patch, _) => patch,
    };

    *dest = serde_json::from_value(merged)?;
    Ok(())
}

fn write_field<T>(
    binding: &crate::FieldBinding<T>,
    key: &str,
    dest: &mut T,
    value: FieldValue,
) -> Result<(), BindError> {
    if binding.assign(dest, value) {
        Ok(())
    } else {
        Err(BindError::UnsupportedType {
            field: key.to_string(),
            kind: binding.kind(),
        })
    }
}

/// Binds a request onto `dest` with a default [`Binder`].
///
/// # Errors
///
/// See [`Binder::bind`].
pub async fn unmarshal<T>(ctx: &RequestContext, dest: &mut T) -> Result<(), BindError>
where
    T: FormBind + Serialize + DeserializeOwned,
{
    Binder::default().bind(ctx, dest).await
}
