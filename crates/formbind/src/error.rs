//! Binding and extraction error types.
//!
//! [`BindError`] is returned by every bind call. A failure is terminal for the
//! call: the first failing field aborts the remaining fields. [`ValueError`]
//! describes why a single raw value could not be converted, and
//! [`ExtractionError`] is reported by the request parsing layer.

use http::StatusCode;
use std::fmt;
use std::io;
use thiserror::Error;

use crate::FieldKind;

/// Error converting one raw value into a field's kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value does not parse as the requested kind.
    #[error("cannot parse {value:?} as {kind}: {reason}")]
    Parse {
        /// The offending raw value.
        value: String,
        /// The destination kind.
        kind: FieldKind,
        /// Parser message.
        reason: String,
    },

    /// The `base` annotation is not a usable integer base.
    #[error("invalid int base {0:?}")]
    InvalidBase(String),

    /// The `tz` annotation does not name a known time zone.
    #[error("unknown time zone {0:?}")]
    UnknownZone(String),

    /// No decoder handles this kind for a plain form value.
    #[error("{0} cannot be decoded from a form value")]
    Unsupported(FieldKind),
}

impl ValueError {
    pub(crate) fn parse(value: &str, kind: FieldKind, reason: impl fmt::Display) -> Self {
        Self::Parse {
            value: value.to_string(),
            kind,
            reason: reason.to_string(),
        }
    }
}

/// Error returned from a bind call.
#[derive(Debug, Error)]
pub enum BindError {
    /// The `Content-Type` header could not be parsed.
    #[error("invalid media type {content_type:?}: {reason}")]
    MediaType {
        /// Raw header value.
        content_type: String,
        /// Parser message.
        reason: String,
    },

    /// The JSON body could not be decoded into the destination.
    #[error("failed to decode JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// An uploaded file could not be decoded as an image.
    #[error("failed to decode image for field [{field}]: {source}")]
    Image {
        /// Source key of the field.
        field: String,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// More than one value was submitted for a single-valued field.
    #[error("arrays not supported yet: field [{field}] has {count} values")]
    MultiValueUnsupported {
        /// Source key of the field.
        field: String,
        /// Number of submitted values.
        count: usize,
    },

    /// A form value could not be converted into the field's kind.
    #[error("invalid value for field [{field}]: {source}")]
    Field {
        /// Source key of the field.
        field: String,
        /// Conversion failure.
        #[source]
        source: ValueError,
    },

    /// The destination kind cannot receive the submitted data.
    #[error("invalid destination type {kind} for field [{field}]")]
    UnsupportedType {
        /// Source key of the field.
        field: String,
        /// Effective kind of the field.
        kind: FieldKind,
    },

    /// A required field had neither a form value nor a file part.
    #[error("missing required field [{field}]")]
    RequiredFieldMissing {
        /// Source key of the field.
        field: String,
    },

    /// An uploaded file could not be opened or read.
    #[error("failed to read upload for field [{field}]: {source}")]
    Io {
        /// Source key of the field.
        field: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl BindError {
    /// Wraps a value conversion failure for the given field.
    ///
    /// Unsupported kinds are reported as [`BindError::UnsupportedType`].
    #[must_use]
    pub fn field_value(field: impl Into<String>, source: ValueError) -> Self {
        let field = field.into();
        match source {
            ValueError::Unsupported(kind) => Self::UnsupportedType { field, kind },
            source => Self::Field { field, source },
        }
    }

    /// Returns the source key of the failing field, if the error is field scoped.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Image { field, .. }
            | Self::MultiValueUnsupported { field, .. }
            | Self::Field { field, .. }
            | Self::UnsupportedType { field, .. }
            | Self::RequiredFieldMissing { field }
            | Self::Io { field, .. } => Some(field),
            Self::MediaType { .. } | Self::Json(_) => None,
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Json(_)
            | Self::Image { .. }
            | Self::MultiValueUnsupported { .. }
            | Self::Field { .. }
            | Self::RequiredFieldMissing { .. } => StatusCode::BAD_REQUEST,
            Self::UnsupportedType { .. } | Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MediaType { .. } => "INVALID_MEDIA_TYPE",
            Self::Json(_) | Self::Image { .. } => "DECODE_FAILED",
            Self::MultiValueUnsupported { .. } => "MULTI_VALUE_UNSUPPORTED",
            Self::Field { source, .. } => match source {
                ValueError::UnknownZone(_) => "UNKNOWN_TIME_ZONE",
                _ => "INVALID_PARAMETER",
            },
            Self::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            Self::RequiredFieldMissing { .. } => "MISSING_PARAMETER",
            Self::Io { .. } => "UPLOAD_READ_FAILED",
        }
    }
}

/// Part of the request a parsing error relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Query string parameters
    Query,
    /// Request body (urlencoded or multipart)
    Body,
    /// Content-Type header
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

/// Error raised while parsing request data into [`FormData`](crate::FormData).
///
/// The binder tolerates these: a request whose body cannot be parsed as a
/// form still binds from its query string.
///
/// # Example
///
/// ```rust
/// use formbind::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::payload_too_large(1024, 2048);
/// assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
/// assert_eq!(err.extraction_source(), ExtractionSource::Body);
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Body or query string is malformed
    Malformed,
    /// Body or a single part is too large
    PayloadTooLarge,
    /// Content-Type is missing or unusable
    InvalidContentType,
    /// Spooling an upload to disk failed
    Io,
}

impl ExtractionError {
    /// Creates an error for malformed request data.
    #[must_use]
    pub fn malformed(source: ExtractionSource, details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Malformed,
            message: format!("malformed {source}: {details}"),
        }
    }

    /// Creates an error for a payload that's too large.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!(
                "payload too large: max {max_size} bytes, got {actual_size} bytes"
            ),
        }
    }

    /// Creates an error for a body or part that exceeded a configured limit.
    #[must_use]
    pub fn limit_exceeded(what: &str, limit: u64) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("{what} exceeded limit of {limit}"),
        }
    }

    /// Creates an error for a missing or unusable content type.
    #[must_use]
    pub fn invalid_content_type(details: impl Into<String>) -> Self {
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::InvalidContentType,
            message: format!("invalid content type: {}", details.into()),
        }
    }

    /// Creates an error for a failed write while spooling an upload.
    #[must_use]
    pub fn io(error: &io::Error) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::Io,
            message: format!("failed to spool upload: {error}"),
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Malformed => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractionErrorKind::InvalidContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ExtractionErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}
