//! Destination field kinds and decoded values.
//!
//! Every bindable field type reports a [`FieldKind`] when the binding table is
//! built. Decoders produce a [`FieldValue`] of that kind, which the field type
//! then accepts through [`FieldType::from_value`].

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use image::DynamicImage;
use std::fmt;

/// Bit width of an integer destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    /// Platform pointer width (`isize` / `usize`).
    Native,
    /// 8 bits.
    W8,
    /// 16 bits.
    W16,
    /// 32 bits.
    W32,
    /// 64 bits.
    W64,
}

impl IntWidth {
    /// Returns the width in bits, `0` for the native width.
    #[must_use]
    pub fn bits(self) -> u32 {
        match self {
            Self::Native => 0,
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }

    pub(crate) fn signed_range(self) -> (i64, i64) {
        match self {
            Self::Native => (isize::MIN as i64, isize::MAX as i64),
            Self::W8 => (i8::MIN.into(), i8::MAX.into()),
            Self::W16 => (i16::MIN.into(), i16::MAX.into()),
            Self::W32 => (i32::MIN.into(), i32::MAX.into()),
            Self::W64 => (i64::MIN, i64::MAX),
        }
    }

    pub(crate) fn unsigned_max(self) -> u64 {
        match self {
            Self::Native => usize::MAX as u64,
            Self::W8 => u8::MAX.into(),
            Self::W16 => u16::MAX.into(),
            Self::W32 => u32::MAX.into(),
            Self::W64 => u64::MAX,
        }
    }
}

/// Semantic kind of a destination field, after unwrapping `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `bool`
    Bool,
    /// Signed integer of the given width.
    Int(IntWidth),
    /// Unsigned integer of the given width.
    Uint(IntWidth),
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `String`
    String,
    /// Raw byte sequence.
    Bytes,
    /// Timestamp.
    Time,
    /// Decoded raster image.
    Image,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int(IntWidth::Native) => write!(f, "isize"),
            Self::Int(width) => write!(f, "i{}", width.bits()),
            Self::Uint(IntWidth::Native) => write!(f, "usize"),
            Self::Uint(width) => write!(f, "u{}", width.bits()),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Time => write!(f, "time"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// A decoded value ready to be written into a destination field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Boolean value.
    Bool(bool),
    /// Signed integer, already range-checked for the destination width.
    Int(i64),
    /// Unsigned integer, already range-checked for the destination width.
    Uint(u64),
    /// Single precision float.
    F32(f32),
    /// Double precision float.
    F64(f64),
    /// Text.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Timestamp with its parsed offset.
    Time(DateTime<FixedOffset>),
    /// Decoded image.
    Image(DynamicImage),
}

/// A type that can be the destination of a binding.
///
/// Implemented for the primitive scalars, `String`, byte buffers, chrono
/// timestamps, [`DynamicImage`], and `Option<T>` of any of those. An
/// `Option<T>` field stays `None` unless a value is written into it.
pub trait FieldType: Sized {
    /// Effective kind used to choose a decoder.
    const KIND: FieldKind;

    /// Converts a decoded value into this type.
    ///
    /// Returns `None` if the value is of a different kind.
    fn from_value(value: FieldValue) -> Option<Self>;
}

macro_rules! impl_field_type_int {
    ($($ty:ty => $variant:ident($width:ident), $value:ident;)*) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::$variant(IntWidth::$width);

                fn from_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::$value(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_field_type_int! {
    isize => Int(Native), Int;
    i8 => Int(W8), Int;
    i16 => Int(W16), Int;
    i32 => Int(W32), Int;
    i64 => Int(W64), Int;
    usize => Uint(Native), Uint;
    u8 => Uint(W8), Uint;
    u16 => Uint(W16), Uint;
    u32 => Uint(W32), Uint;
    u64 => Uint(W64), Uint;
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldType for f32 {
    const KIND: FieldKind = FieldKind::F32;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::F32(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::F64;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::F64(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::String;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldType for Vec<u8> {
    const KIND: FieldKind = FieldKind::Bytes;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bytes(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldType for Bytes {
    const KIND: FieldKind = FieldKind::Bytes;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bytes(v) => Some(Bytes::from(v)),
            _ => None,
        }
    }
}

impl FieldType for DateTime<FixedOffset> {
    const KIND: FieldKind = FieldKind::Time;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Time(v) => Some(v),
            _ => None,
        }
    }
}

impl FieldType for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Time;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Time(v) => Some(v.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl FieldType for DynamicImage {
    const KIND: FieldKind = FieldKind::Image;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Image(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn from_value(value: FieldValue) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(<i8 as FieldType>::KIND, FieldKind::Int(IntWidth::W8));
        assert_eq!(<usize as FieldType>::KIND, FieldKind::Uint(IntWidth::Native));
        assert_eq!(<Vec<u8> as FieldType>::KIND, FieldKind::Bytes);
        assert_eq!(<DynamicImage as FieldType>::KIND, FieldKind::Image);
    }

    #[test]
    fn test_option_has_effective_kind() {
        assert_eq!(<Option<u16> as FieldType>::KIND, FieldKind::Uint(IntWidth::W16));
        assert_eq!(<Option<String> as FieldType>::KIND, FieldKind::String);
        assert_eq!(
            <Option<DateTime<Utc>> as FieldType>::KIND,
            FieldKind::Time
        );
    }

    #[test]
    fn test_from_value_matching_kind() {
        assert_eq!(i16::from_value(FieldValue::Int(-300)), Some(-300));
        assert_eq!(u8::from_value(FieldValue::Uint(255)), Some(255));
        assert_eq!(
            Option::<String>::from_value(FieldValue::String("rick".into())),
            Some(Some("rick".to_string()))
        );
        assert_eq!(
            Bytes::from_value(FieldValue::Bytes(b"ABCD".to_vec())),
            Some(Bytes::from_static(b"ABCD"))
        );
    }

    #[test]
    fn test_from_value_mismatch() {
        assert_eq!(bool::from_value(FieldValue::Int(1)), None);
        assert_eq!(i8::from_value(FieldValue::Int(1000)), None);
        assert_eq!(String::from_value(FieldValue::Bytes(Vec::new())), None);
    }

    #[test]
    fn test_time_into_utc() {
        let parsed = DateTime::parse_from_rfc3339("2020-01-02T03:04:05+02:00").unwrap();
        let utc = DateTime::<Utc>::from_value(FieldValue::Time(parsed)).unwrap();
        assert_eq!(utc.to_rfc3339(), "2020-01-02T01:04:05+00:00");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FieldKind::Int(IntWidth::W32).to_string(), "i32");
        assert_eq!(FieldKind::Uint(IntWidth::Native).to_string(), "usize");
        assert_eq!(FieldKind::Image.to_string(), "image");
    }
}
