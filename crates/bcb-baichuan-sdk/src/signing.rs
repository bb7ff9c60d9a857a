// SPDX-License-Identifier: MIT OR Apache-2.0
//! Request signing for the Baichuan API.
//!
//! The service authenticates a request by recomputing
//! `md5(secret_key ++ body ++ timestamp)` over the exact body text it
//! received. The body therefore has to be rendered in the service's
//! canonical JSON encoding, which [`canonical_json`] produces:
//!
//! * keys in insertion / declaration order,
//! * `", "` between items and `": "` between a key and its value,
//! * every character outside printable ASCII escaped as a lowercase
//!   `\uXXXX` sequence (UTF-16 surrogate pairs outside the BMP),
//! * floats in Python `repr` form (`0.5`, `1.0`, `1e-05`, `1e+16`),
//!   integers without a decimal point.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use std::fmt;
use std::io;

use crate::error::Result;

/// Value of the `X-BC-Sign-Algo` header.
pub const SIGN_ALGO: &str = "MD5";

// ---------------------------------------------------------------------------
// SecretKey
// ---------------------------------------------------------------------------

/// A credential that must never show up in logs.
///
/// `Debug` prints a placeholder and there is no `Serialize` impl. The raw
/// value is only readable inside this crate.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wrap a raw credential.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether the credential is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

impl From<String> for SecretKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Canonical JSON
// ---------------------------------------------------------------------------

/// `serde_json` formatter emitting the service's canonical encoding.
#[derive(Debug, Clone, Copy, Default)]
struct ServiceFormatter;

impl Formatter for ServiceFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if matches!(ch, ' '..='~') {
                continue;
            }
            writer.write_all(&bytes[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&bytes[start..])
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_float_repr(writer, value.is_sign_negative(), &format!("{:e}", value.abs()))
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_float_repr(writer, value.is_sign_negative(), &format!("{:e}", value.abs()))
    }
}

/// Write a finite float in Python `repr` form: positional for decimal
/// exponents in `-4..16`, otherwise `d.ddde±XX`.
///
/// `sci` is the shortest round-trip rendering of the magnitude in `{:e}`
/// form, e.g. `1.5e-7`. serde_json never hands non-finite values to the
/// formatter.
fn write_float_repr<W>(writer: &mut W, negative: bool, sci: &str) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci, "0"));
    let exp: i32 = exp
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "malformed float exponent"))?;
    if negative {
        writer.write_all(b"-")?;
    }

    if !(-4..16).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return write!(writer, "{mantissa}e{sign}{:02}", exp.unsigned_abs());
    }

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let shift = exp.unsigned_abs() as usize;
    if exp < 0 {
        write!(writer, "0.{}{digits}", "0".repeat(shift - 1))
    } else if digits.len() > shift + 1 {
        write!(writer, "{}.{}", &digits[..=shift], &digits[shift + 1..])
    } else {
        write!(writer, "{digits}{}.0", "0".repeat(shift + 1 - digits.len()))
    }
}

/// Render `value` in the service's canonical JSON encoding.
///
/// # Errors
///
/// Returns [`BaichuanError::Serde`](crate::BaichuanError::Serde) if `value`
/// cannot be serialized.
pub fn canonical_json<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::with_capacity(256);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, ServiceFormatter);
    value.serialize(&mut ser)?;
    // The formatter only ever emits ASCII.
    String::from_utf8(buf).map_err(|e| <serde_json::Error as serde::ser::Error>::custom(e).into())
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Compute the request signature for `payload` sent at `timestamp`.
///
/// `timestamp` is in Unix epoch seconds. The result is 32 lowercase hex
/// characters.
///
/// # Errors
///
/// Returns [`BaichuanError::Serde`](crate::BaichuanError::Serde) if `payload`
/// cannot be serialized.
///
/// # Examples
///
/// ```
/// use bcb_baichuan_sdk::{SecretKey, signature};
/// use serde_json::json;
///
/// let key = SecretKey::new("YOUR_SECRET_KEY");
/// let payload = json!({
///     "model": "Baichuan2-53B",
///     "messages": [{"role": "user", "content": "Hi"}],
/// });
/// let sig = signature(&key, &payload, 1697734335).unwrap();
/// assert_eq!(sig, "24a50b2db1648e25a244c67c5ab57d3f");
/// ```
pub fn signature<T>(secret_key: &SecretKey, payload: &T, timestamp: i64) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let body = canonical_json(payload)?;
    Ok(sign_body(secret_key, &body, timestamp))
}

/// Compute the signature over an already rendered request body.
///
/// `body` must be the exact text that goes over the wire.
pub fn sign_body(secret_key: &SecretKey, body: &str, timestamp: i64) -> String {
    let mut hasher = Md5::new();
    hasher.update(secret_key.expose().as_bytes());
    hasher.update(body.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_spaces_separators() {
        let v = json!({"a": 1, "b": [true, null, "x"], "c": {}});
        assert_eq!(
            canonical_json(&v).unwrap(),
            r#"{"a": 1, "b": [true, null, "x"], "c": {}}"#
        );
    }

    #[test]
    fn canonical_json_keeps_insertion_order() {
        let v = json!({"model": "m", "messages": [], "alpha": 0});
        assert_eq!(
            canonical_json(&v).unwrap(),
            r#"{"model": "m", "messages": [], "alpha": 0}"#
        );
    }

    #[test]
    fn canonical_json_escapes_non_ascii() {
        assert_eq!(canonical_json("\u{4f60}\u{597d}").unwrap(), r#""\u4f60\u597d""#);
        assert_eq!(canonical_json("\u{e9}!").unwrap(), r#""\u00e9!""#);
    }

    #[test]
    fn canonical_json_uses_surrogate_pairs_outside_bmp() {
        assert_eq!(canonical_json("a\u{1f600}b").unwrap(), r#""a\ud83d\ude00b""#);
    }

    #[test]
    fn canonical_json_escapes_control_characters() {
        assert_eq!(
            canonical_json("x\u{1f}y\n\"").unwrap(),
            r#""x\u001fy\n\"""#
        );
    }

    #[test]
    fn canonical_json_escapes_delete() {
        assert_eq!(canonical_json("a\u{7f}b").unwrap(), r#""a\u007fb""#);
        assert_eq!(canonical_json(" ~").unwrap(), r#"" ~""#);
    }

    #[test]
    fn floats_use_python_repr() {
        let cases: &[(f64, &str)] = &[
            (0.0, "0.0"),
            (-0.0, "-0.0"),
            (1.0, "1.0"),
            (0.1, "0.1"),
            (123.456, "123.456"),
            (0.0001, "0.0001"),
            (1e-5, "1e-05"),
            (1.5e-7, "1.5e-07"),
            (-2.5e-10, "-2.5e-10"),
            (1e15, "1000000000000000.0"),
            (1e16, "1e+16"),
            (1.2345678901234568e17, "1.2345678901234568e+17"),
            (1e100, "1e+100"),
            (5e-324, "5e-324"),
        ];
        for (value, expected) in cases {
            assert_eq!(canonical_json(value).unwrap(), *expected, "{value:?}");
        }
    }

    #[test]
    fn f32_uses_its_own_shortest_digits() {
        assert_eq!(canonical_json(&0.1f32).unwrap(), "0.1");
        assert_eq!(canonical_json(&1e-5f32).unwrap(), "1e-05");
    }

    #[test]
    fn canonical_json_writes_integers_without_decimal_point() {
        assert_eq!(canonical_json(&json!([5, -7, 0.5])).unwrap(), "[5, -7, 0.5]");
    }

    #[test]
    fn signature_matches_reference_vector() {
        let key = SecretKey::new("YOUR_SECRET_KEY");
        let payload = json!({
            "model": "Baichuan2-53B",
            "messages": [{"role": "user", "content": "Hi"}],
        });
        assert_eq!(
            signature(&key, &payload, 1697734335).unwrap(),
            "24a50b2db1648e25a244c67c5ab57d3f"
        );
    }

    #[test]
    fn signature_over_non_ascii_content() {
        let key = SecretKey::new("YOUR_SECRET_KEY");
        let payload = json!({
            "model": "Baichuan2-53B",
            "messages": [{"role": "user", "content": "\u{4f60}\u{597d}"}],
        });
        assert_eq!(
            signature(&key, &payload, 1697734335).unwrap(),
            "1aac026b32d9b619c75d85e2a9cfa180"
        );
    }

    #[test]
    fn sign_body_agrees_with_signature() {
        let key = SecretKey::new("k");
        let payload = json!({"x": [1, 2]});
        let body = canonical_json(&payload).unwrap();
        assert_eq!(
            sign_body(&key, &body, 42),
            signature(&key, &payload, 42).unwrap()
        );
    }

    #[test]
    fn signature_is_32_lowercase_hex_chars() {
        let sig = signature(&SecretKey::new("k"), &json!({}), 0).unwrap();
        assert_eq!(sig.len(), 32);
        assert!(sig.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn secret_key_debug_is_redacted() {
        let key = SecretKey::new("super-secret");
        let debug = format!("{key:?}");
        assert_eq!(debug, "SecretKey([REDACTED])");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn secret_key_deserializes_from_plain_string() {
        let key: SecretKey = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(key, SecretKey::from("abc"));
        assert!(!key.is_empty());
    }
}
