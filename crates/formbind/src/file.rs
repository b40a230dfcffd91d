//! Decoding of uploaded file parts into field values.

use std::io::{self, Read};

use base64::engine::general_purpose::STANDARD;
use base64::read::DecoderReader;

use crate::{BindError, FieldKind, FieldValue, FilePart, TagFlags};

/// Decodes a file part for a field of the given kind.
///
/// The part is opened, unwrapped from base64 when `flags.base64` is set, and
/// then read into [`FieldValue::Bytes`] or decoded into
/// [`FieldValue::Image`]. Any other kind yields `Ok(None)` and the field is
/// left alone.
///
/// `field` is the source key used in error reports.
///
/// # Errors
///
/// Returns [`BindError::Io`] if the part cannot be opened or read (including
/// malformed base64), and [`BindError::Image`] if the content is not a
/// recognised image.
pub fn decode_file(
    field: &str,
    kind: FieldKind,
    flags: TagFlags,
    part: &FilePart,
) -> Result<Option<FieldValue>, BindError> {
    let io_error = |source: io::Error| BindError::Io {
        field: field.to_string(),
        source,
    };

    let file = part.open().map_err(io_error)?;
    let mut reader: Box<dyn Read + Send> = if flags.base64 {
        Box::new(DecoderReader::new(file, &STANDARD))
    } else {
        file
    };

    match kind {
        FieldKind::Bytes => {
            let mut data = Vec::with_capacity(usize::try_from(part.len()).unwrap_or(0));
            reader.read_to_end(&mut data).map_err(io_error)?;
            Ok(Some(FieldValue::Bytes(data)))
        }
        FieldKind::Image => {
            let mut data = Vec::new();
            reader.read_to_end(&mut data).map_err(io_error)?;
            let image = image::load_from_memory(&data).map_err(|source| BindError::Image {
                field: field.to_string(),
                source,
            })?;
            Ok(Some(FieldValue::Image(image)))
        }
        _ => Ok(None),
    }
}
