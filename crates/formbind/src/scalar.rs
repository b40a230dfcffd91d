//! Scalar decoders.
//!
//! Pure conversions from a single raw form value into a [`FieldValue`] of the
//! requested [`FieldKind`]. Auxiliary annotations (`base`, `format`, `tz`) come
//! from the field's [`FieldOptions`].

use chrono::format::ParseErrorKind;
use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

use crate::{FieldKind, FieldOptions, FieldValue, IntWidth, ValueError};

const DEFAULT_BASE: u32 = 10;

/// Decodes a raw form value into a value of the given kind.
///
/// # Errors
///
/// Returns a [`ValueError`] if the value (or an auxiliary annotation) does
/// not parse, or if the kind cannot be decoded from text.
pub fn decode_value(
    kind: FieldKind,
    options: &FieldOptions,
    raw: &str,
) -> Result<FieldValue, ValueError> {
    match kind {
        FieldKind::Bool => decode_bool(raw).map(FieldValue::Bool),
        FieldKind::Int(width) => {
            decode_int(raw, options.base.as_deref(), width).map(FieldValue::Int)
        }
        FieldKind::Uint(width) => {
            decode_uint(raw, options.base.as_deref(), width).map(FieldValue::Uint)
        }
        FieldKind::F32 => decode_float(raw, kind, f32::is_infinite).map(FieldValue::F32),
        FieldKind::F64 => decode_float(raw, kind, f64::is_infinite).map(FieldValue::F64),
        FieldKind::String => Ok(FieldValue::String(raw.to_string())),
        FieldKind::Bytes => Ok(FieldValue::Bytes(raw.as_bytes().to_vec())),
        FieldKind::Time => decode_time(raw, options.format.as_deref(), options.tz.as_deref())
            .map(FieldValue::Time),
        FieldKind::Image => Err(ValueError::Unsupported(kind)),
    }
}

/// Parses a boolean literal.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and `0`, `f`, `F`, `FALSE`,
/// `false`, `False`.
///
/// # Errors
///
/// Returns [`ValueError::Parse`] for any other spelling.
pub fn decode_bool(raw: &str) -> Result<bool, ValueError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::parse(raw, FieldKind::Bool, "invalid syntax")),
    }
}

/// Parses a float, rejecting values that overflow to infinity.
///
/// Explicit `inf`/`infinity` literals are still accepted.
fn decode_float<F>(raw: &str, kind: FieldKind, is_infinite: fn(F) -> bool) -> Result<F, ValueError>
where
    F: FromStr + Copy,
    F::Err: fmt::Display,
{
    let value = raw.parse::<F>().map_err(|e| ValueError::parse(raw, kind, e))?;
    if is_infinite(value) && !is_infinity_literal(raw) {
        return Err(ValueError::parse(raw, kind, "value out of range"));
    }
    Ok(value)
}

fn is_infinity_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Parses a signed integer in the annotated base, range-checked for `width`.
///
/// # Errors
///
/// Returns [`ValueError::InvalidBase`] for a bad `base` annotation and
/// [`ValueError::Parse`] for malformed or out-of-range values.
pub fn decode_int(raw: &str, base: Option<&str>, width: IntWidth) -> Result<i64, ValueError> {
    let kind = FieldKind::Int(width);
    let radix = parse_base(base)?;
    let Some((negative, digits, radix)) = split_number(raw, radix) else {
        return Err(ValueError::parse(raw, kind, "invalid syntax"));
    };
    if !is_unsigned_digits(&digits) {
        return Err(ValueError::parse(raw, kind, "invalid syntax"));
    }

    let signed = if negative {
        format!("-{digits}")
    } else {
        digits
    };
    let value = i64::from_str_radix(&signed, radix).map_err(|e| ValueError::parse(raw, kind, e))?;

    let (min, max) = width.signed_range();
    if value < min || value > max {
        return Err(ValueError::parse(raw, kind, "value out of range"));
    }
    Ok(value)
}

/// Parses an unsigned integer in the annotated base, range-checked for `width`.
///
/// # Errors
///
/// Returns [`ValueError::InvalidBase`] for a bad `base` annotation and
/// [`ValueError::Parse`] for malformed, signed or out-of-range values.
pub fn decode_uint(raw: &str, base: Option<&str>, width: IntWidth) -> Result<u64, ValueError> {
    let kind = FieldKind::Uint(width);
    let radix = parse_base(base)?;
    if raw.starts_with(['+', '-']) {
        return Err(ValueError::parse(raw, kind, "invalid syntax"));
    }
    let Some((_, digits, radix)) = split_number(raw, radix) else {
        return Err(ValueError::parse(raw, kind, "invalid syntax"));
    };
    if !is_unsigned_digits(&digits) {
        return Err(ValueError::parse(raw, kind, "invalid syntax"));
    }

    let value = u64::from_str_radix(&digits, radix).map_err(|e| ValueError::parse(raw, kind, e))?;
    if value > width.unsigned_max() {
        return Err(ValueError::parse(raw, kind, "value out of range"));
    }
    Ok(value)
}

/// Parses the `base` annotation. `0` means "infer from prefix".
fn parse_base(base: Option<&str>) -> Result<u32, ValueError> {
    let Some(base) = base else {
        return Ok(DEFAULT_BASE);
    };

    match base.parse::<i32>() {
        Ok(0) => Ok(0),
        Ok(b @ 2..=36) => Ok(b.unsigned_abs()),
        _ => Err(ValueError::InvalidBase(base.to_string())),
    }
}

/// Splits off the sign and, for base 0, the radix prefix and `_` separators.
///
/// Returns `None` when base 0 `_` separators are misplaced.
fn split_number(raw: &str, radix: u32) -> Option<(bool, String, u32)> {
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    if radix != 0 {
        return Some((negative, rest.to_string(), radix));
    }
    if !underscores_ok(rest) {
        return None;
    }

    let lower = rest.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &rest[2..]),
        Some("0b") => (2, &rest[2..]),
        Some("0o") => (8, &rest[2..]),
        _ if rest.len() > 1 && rest.starts_with('0') => (8, &rest[1..]),
        _ => (10, rest),
    };

    Some((negative, digits.replace('_', ""), radix))
}

/// `_` may only separate successive digits. A base prefix counts as a digit.
fn underscores_ok(unsigned: &str) -> bool {
    let bytes = unsigned.as_bytes();
    let (start, mut saw, hex) = match bytes {
        [b'0', prefix, ..] if matches!(prefix.to_ascii_lowercase(), b'b' | b'o' | b'x') => {
            (2, b'0', prefix.to_ascii_lowercase() == b'x')
        }
        _ => (0, b'^', false),
    };

    for &b in &bytes[start..] {
        if b.is_ascii_digit() || (hex && b.is_ascii_hexdigit()) {
            saw = b'0';
        } else if b == b'_' {
            if saw != b'0' {
                return false;
            }
            saw = b'_';
        } else {
            if saw == b'_' {
                return false;
            }
            saw = b'!';
        }
    }
    saw != b'_'
}

fn is_unsigned_digits(digits: &str) -> bool {
    !digits.is_empty() && !digits.starts_with(['+', '-'])
}

/// Parses a timestamp.
///
/// Without `format` the value must be RFC 3339. With a `format` (chrono
/// `strftime` syntax) a value that carries an offset keeps it; otherwise it is
/// interpreted in `tz`, or UTC when no zone is given. The zone is resolved
/// before the value is parsed.
///
/// # Errors
///
/// Returns [`ValueError::UnknownZone`] for an unknown `tz` and
/// [`ValueError::Parse`] when the value does not match the format.
pub fn decode_time(
    raw: &str,
    format: Option<&str>,
    tz: Option<&str>,
) -> Result<DateTime<FixedOffset>, ValueError> {
    let zone = tz.map(Zone::resolve).transpose()?;

    let Some(format) = format else {
        return DateTime::parse_from_rfc3339(raw)
            .map_err(|e| ValueError::parse(raw, FieldKind::Time, e));
    };

    let naive = match DateTime::parse_from_str(raw, format) {
        Ok(value) => return Ok(value),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => parse_naive(raw, format)?,
        Err(e) => return Err(ValueError::parse(raw, FieldKind::Time, e)),
    };

    match zone {
        Some(zone) => zone.localize(raw, &naive),
        None => Ok(Utc.from_utc_datetime(&naive).fixed_offset()),
    }
}

fn parse_naive(raw: &str, format: &str) -> Result<NaiveDateTime, ValueError> {
    match NaiveDateTime::parse_from_str(raw, format) {
        Ok(value) => Ok(value),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => NaiveDate::parse_from_str(raw, format)
            .map(|date| date.and_time(NaiveTime::MIN))
            .map_err(|e| ValueError::parse(raw, FieldKind::Time, e)),
        Err(e) => Err(ValueError::parse(raw, FieldKind::Time, e)),
    }
}

/// Time zone named by a `tz` annotation.
#[derive(Debug, Clone, Copy)]
enum Zone {
    Named(Tz),
    Local,
}

impl Zone {
    fn resolve(name: &str) -> Result<Self, ValueError> {
        if name == "Local" {
            return Ok(Self::Local);
        }
        name.parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| ValueError::UnknownZone(name.to_string()))
    }

    fn localize(self, raw: &str, naive: &NaiveDateTime) -> Result<DateTime<FixedOffset>, ValueError> {
        let resolved = match self {
            Self::Named(tz) => earliest(tz.from_local_datetime(naive)),
            Self::Local => earliest(Local.from_local_datetime(naive)),
        };
        resolved.ok_or_else(|| {
            ValueError::parse(raw, FieldKind::Time, "local time does not exist in zone")
        })
    }
}

fn earliest<Z: TimeZone>(result: LocalResult<DateTime<Z>>) -> Option<DateTime<FixedOffset>> {
    result.earliest().map(|value| value.fixed_offset())
}
