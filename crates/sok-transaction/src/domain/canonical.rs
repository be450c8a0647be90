//! # Canonical Signing Payload
//!
//! Nodes on the network hash the text produced by a sorted-key JSON dump
//! with `", "` / `": "` separators, `\uXXXX` escapes for anything outside
//! printable ASCII, and shortest round-trip float literals that always
//! carry a decimal point or exponent (`4.0`, `1e+16`, `1.5e-07`).
//!
//! Strings and numbers go through `serde_json`'s serializer; [`PayloadFormatter`]
//! supplies the separators, the ASCII-only escaping and the float literals.
//! Integers keep their integer form, so a timestamp received as `1700000000`
//! hashes as `1700000000`, not `1700000000.0`.

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Number, Serializer};
use std::io::{self, Write};

/// A value that can appear in the signing payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CanonicalValue<'a> {
    /// JSON string
    Text(&'a str),
    /// JSON float
    Float(f64),
    /// JSON number in its received integer or float form
    Number(&'a Number),
}

/// `serde_json` formatter producing the network's payload text.
#[derive(Clone, Copy, Debug, Default)]
pub struct PayloadFormatter;

impl Formatter for PayloadFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }

    // Quotes, backslashes and C0 controls arrive via `write_char_escape`.
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Encode a flat object with keys in code point order.
pub fn encode_object(fields: &[(&str, CanonicalValue<'_>)]) -> String {
    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = Vec::new();
    // Writes into a Vec cannot fail.
    let _ = write_object(&mut out, &sorted);
    // Every byte written is printable ASCII or an ASCII escape.
    String::from_utf8_lossy(&out).into_owned()
}

fn write_object(out: &mut Vec<u8>, fields: &[&(&str, CanonicalValue<'_>)]) -> io::Result<()> {
    let mut formatter = PayloadFormatter;
    formatter.begin_object(out)?;
    for (i, (key, value)) in fields.iter().enumerate() {
        formatter.begin_object_key(out, i == 0)?;
        key.serialize(&mut Serializer::with_formatter(&mut *out, PayloadFormatter))?;
        formatter.end_object_key(out)?;
        formatter.begin_object_value(out)?;
        match value {
            CanonicalValue::Text(text) => {
                text.serialize(&mut Serializer::with_formatter(&mut *out, PayloadFormatter))?
            }
            // serde_json writes `null` for these; the network writes literals.
            CanonicalValue::Float(number) if !number.is_finite() => {
                out.write_all(format_float(*number).as_bytes())?
            }
            CanonicalValue::Float(number) => formatter.write_f64(out, *number)?,
            CanonicalValue::Number(number) => {
                number.serialize(&mut Serializer::with_formatter(&mut *out, PayloadFormatter))?
            }
        }
        formatter.end_object_value(out)?;
    }
    formatter.end_object(out)
}

/// Shortest round-trip float literal.
///
/// Fixed notation for decimal exponents in `-4..16`, scientific with a
/// signed two-digit exponent otherwise.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "-1.2345e3".
    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exponent) {
        let point = exponent + 1;
        if point <= 0 {
            let zeros = "0".repeat(point.unsigned_abs() as usize);
            format!("{sign}0.{zeros}{digits}")
        } else {
            let point = point as usize;
            if point >= digits.len() {
                format!("{sign}{digits}{}.0", "0".repeat(point - digits.len()))
            } else {
                format!("{sign}{}.{}", &digits[..point], &digits[point..])
            }
        }
    } else {
        let mantissa = if digits.len() == 1 {
            digits
        } else {
            format!("{}.{}", &digits[..1], &digits[1..])
        };
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        let magnitude = exponent.unsigned_abs();
        format!("{sign}{mantissa}e{exponent_sign}{magnitude:02}")
    }
}
