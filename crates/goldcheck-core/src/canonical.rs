//! Canonical serialization of golden documents.
//!
//! The canonical form of a document is its compact JSON encoding with object
//! keys sorted, every non-printable-ASCII character escaped as `\uXXXX`,
//! integers digit-for-digit, floats in shortest round-trip form, and exactly
//! one trailing newline.
//! Goldens are stored in this form so that diffs between runs are byte-level
//! meaningful.

use crate::violation::{Violation, ViolationKind};
use serde_json::{Number, Value};

/// Outcome of comparing a fixture's raw bytes with its canonical form.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalCheck {
    /// Bytes parsed. `violation` is set when they are not canonical.
    Parsed {
        document: Value,
        violation: Option<Violation>,
    },
    /// Bytes are not JSON; no further checks apply to this fixture.
    Unparseable(Violation),
}

impl CanonicalCheck {
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::Parsed { violation, .. } => violation.as_ref(),
            Self::Unparseable(violation) => Some(violation),
        }
    }
}

/// Check that `raw` is exactly the canonical encoding of what it parses to.
pub fn check_canonical(raw: &[u8], rel_path: &str) -> CanonicalCheck {
    let document: Value = match serde_json::from_slice(raw) {
        Ok(document) => document,
        Err(err) => {
            return CanonicalCheck::Unparseable(Violation::new(
                ViolationKind::NotCanonical,
                format!("JSON parse error in {rel_path}: {err}"),
            ));
        }
    };
    let violation = (canonical_bytes(&document) != raw)
        .then(|| Violation::new(ViolationKind::NotCanonical, rel_path));
    CanonicalCheck::Parsed {
        document,
        violation,
    }
}

/// The canonical file bytes for `value`, trailing newline included.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out);
    out.push(b'\n');
    out
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(number) => write_number(number, out),
        Value::String(text) => write_string(text, out),
        Value::Array(items) => {
            out.push(b'[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                write_value(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            out.push(b'{');
            for (idx, (key, child)) in entries.into_iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                write_string(key, out);
                out.push(b':');
                write_value(child, out);
            }
            out.push(b'}');
        }
    }
}

fn write_string(text: &str, out: &mut Vec<u8>) {
    out.push(b'"');
    for ch in text.chars() {
        match ch {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\u{8}' => out.extend_from_slice(b"\\b"),
            '\u{c}' => out.extend_from_slice(b"\\f"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            ' '..='~' => out.push(ch as u8),
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.extend_from_slice(format!("\\u{unit:04x}").as_bytes());
                }
            }
        }
    }
    out.push(b'"');
}

fn write_number(number: &Number, out: &mut Vec<u8>) {
    // Number keeps the source token, so integers of any width survive.
    let token = number.to_string();
    if !token.contains(['.', 'e', 'E']) {
        let token = if token == "-0" { "0" } else { token.as_str() };
        out.extend_from_slice(token.as_bytes());
        return;
    }
    match token.parse::<f64>() {
        Ok(float) => out.extend_from_slice(format_float(float).as_bytes()),
        Err(_) => out.extend_from_slice(token.as_bytes()),
    }
}

/// Shortest round-trip digits; positional for decimal exponents in
/// `[-4, 16)`, otherwise `d.ddde±XX`.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let literal = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return literal.to_string();
    }
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exponent) {
        if exponent < 0 {
            let zeros = "0".repeat((-exponent - 1) as usize);
            return format!("{sign}0.{zeros}{digits}");
        }
        let int_len = exponent as usize + 1;
        if digits.len() <= int_len {
            let pad = "0".repeat(int_len - digits.len());
            return format!("{sign}{digits}{pad}.0");
        }
        let (int_part, frac_part) = digits.split_at(int_len);
        return format!("{sign}{int_part}.{frac_part}");
    }

    let mantissa = if digits.len() == 1 {
        digits
    } else {
        format!("{}.{}", &digits[..1], &digits[1..])
    };
    let exp_sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.unsigned_abs())
}
