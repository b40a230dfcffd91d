//! Multipart form data parsing.
//!
//! `multipart/form-data` bodies are split into text values and uploaded
//! [`FilePart`]s. Upload content is kept in memory up to
//! [`MultipartConfig::max_memory`] in total; anything beyond that is spooled to
//! a temporary file that lives as long as the part.

use bytes::{Buf, Bytes, BytesMut};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempPath};

use crate::{ExtractionError, ExtractionSource, FormData};

/// Default in-memory budget for uploaded files (32 MB).
pub const DEFAULT_MAX_MEMORY: usize = 32 << 20;

/// Default maximum total body size for multipart (50 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 50 * 1024 * 1024;

/// Default maximum size per field (10 MB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 10 * 1024 * 1024;

/// Configuration for request body parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartConfig {
    /// Upload bytes kept in memory before spooling to disk.
    pub max_memory: usize,
    /// Maximum total body size in bytes.
    pub max_body_size: usize,
    /// Maximum size per field in bytes.
    pub max_field_size: usize,
    /// Maximum number of fields allowed.
    pub max_fields: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: 100,
        }
    }
}

impl MultipartConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the in-memory upload budget.
    #[must_use]
    pub fn max_memory(mut self, size: usize) -> Self {
        self.max_memory = size;
        self
    }

    /// Set the maximum body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the maximum field size.
    #[must_use]
    pub fn max_field_size(mut self, size: usize) -> Self {
        self.max_field_size = size;
        self
    }

    /// Set the maximum number of fields.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}

#[derive(Clone)]
enum Storage {
    Memory(Bytes),
    Disk { path: Arc<TempPath>, len: u64 },
}

/// A file uploaded via a multipart form.
///
/// The content is opened as a byte stream with [`FilePart::open`]; each call
/// returns a fresh reader positioned at the start.
#[derive(Clone)]
pub struct FilePart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    storage: Storage,
}

impl FilePart {
    /// Creates an in-memory file part.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name,
            content_type,
            storage: Storage::Memory(data.into()),
        }
    }

    /// Creates a file part backed by a temporary file holding `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written.
    pub fn spooled(
        name: impl Into<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: &[u8],
    ) -> io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(data)?;
        file.flush()?;

        Ok(Self {
            name: name.into(),
            file_name,
            content_type,
            storage: Storage::Disk {
                path: Arc::new(file.into_temp_path()),
                len: data.len() as u64,
            },
        })
    }

    /// Get the form field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the original file name.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Get the MIME type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Get the file size in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        match &self.storage {
            Storage::Memory(data) => data.len() as u64,
            Storage::Disk { len, .. } => *len,
        }
    }

    /// Check if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the temporary file path if the content was spooled to disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            Storage::Memory(_) => None,
            Storage::Disk { path, .. } => Some(&**path),
        }
    }

    /// Opens the content as a byte stream.
    ///
    /// # Errors
    ///
    /// Returns an error if a spooled file cannot be opened.
    pub fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        match &self.storage {
            Storage::Memory(data) => Ok(Box::new(data.clone().reader())),
            Storage::Disk { path, .. } => Ok(Box::new(File::open(&**path)?)),
        }
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("name", &self.name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.len())
            .field("spooled", &self.path().is_some())
            .finish()
    }
}

/// Parses a `multipart/form-data` body into `form`.
///
/// Text parts are appended as values, parts with a filename as files.
pub(crate) async fn parse_multipart(
    content_type: &str,
    body: Bytes,
    config: &MultipartConfig,
    form: &mut FormData,
) -> Result<(), ExtractionError> {
    let boundary = multer::parse_boundary(content_type).map_err(|_| {
        ExtractionError::invalid_content_type("missing or invalid boundary in multipart Content-Type")
    })?;

    if body.len() > config.max_body_size {
        return Err(ExtractionError::payload_too_large(
            config.max_body_size,
            body.len(),
        ));
    }

    let constraints = multer::Constraints::new().size_limit(
        multer::SizeLimit::new()
            .whole_stream(config.max_body_size as u64)
            .per_field(config.max_field_size as u64),
    );
    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::with_constraints(stream, boundary, constraints);

    let mut field_count = 0;
    let mut memory_left = config.max_memory;

    while let Some(mut field) = multipart.next_field().await.map_err(multer_error)? {
        field_count += 1;
        if field_count > config.max_fields {
            return Err(ExtractionError::limit_exceeded(
                "multipart field count",
                config.max_fields as u64,
            ));
        }

        let Some(name) = field.name().map(String::from) else {
            continue;
        };

        let Some(file_name) = field.file_name().map(String::from) else {
            let text = field.text().await.map_err(multer_error)?;
            form.append_value(name, text);
            continue;
        };
        let content_type = field.content_type().map(ToString::to_string);

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multer_error)? {
            data.extend_from_slice(&chunk);
        }

        let part = if data.len() <= memory_left {
            memory_left -= data.len();
            FilePart::new(name, Some(file_name), content_type, data.freeze())
        } else {
            tracing::debug!(field = %name, size = data.len(), "spooling upload to disk");
            FilePart::spooled(name, Some(file_name), content_type, &data)
                .map_err(|e| ExtractionError::io(&e))?
        };
        form.append_file(part);
    }

    Ok(())
}

fn multer_error(error: multer::Error) -> ExtractionError {
    match error {
        multer::Error::FieldSizeExceeded { limit, .. } => {
            ExtractionError::limit_exceeded("multipart field size", limit)
        }
        multer::Error::StreamSizeExceeded { limit } => {
            ExtractionError::limit_exceeded("multipart body size", limit)
        }
        other => ExtractionError::malformed(
            ExtractionSource::Body,
            format!("multipart parse error: {other}"),
        ),
    }
}
