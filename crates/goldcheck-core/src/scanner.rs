//! Walks a document's string leaves and reports run-specific values.
//!
//! Exemption is positional: a leaf is judged under the name of the field it
//! was found in (array elements inherit the enclosing field), and a field
//! name on the allowlist is exempt at any depth.

use crate::allowlist::Allowlist;
use crate::classify::classify;
use crate::schema::SchemaId;
use crate::violation::{Violation, ViolationKind};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Field name used for string leaves that are not under any key.
pub const ROOT_FIELD: &str = "";

struct DeterminismScanner<'a> {
    exempt: Option<&'a BTreeSet<String>>,
    file_name: &'a str,
    found: Vec<Violation>,
}

impl DeterminismScanner<'_> {
    fn visit(&mut self, value: &Value, field: &str) {
        match value {
            Value::String(text) => self.visit_string(text, field),
            Value::Array(items) => {
                for item in items {
                    self.visit(item, field);
                }
            }
            Value::Object(map) => {
                for (key, child) in map {
                    self.visit(child, key);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    fn visit_string(&mut self, text: &str, field: &str) {
        if self.exempt.is_some_and(|fields| fields.contains(field)) {
            return;
        }
        if let Some(kind) = classify(text) {
            self.found.push(Violation::new(
                ViolationKind::NonDeterministic,
                format!(
                    "{}: field '{field}' contains {kind}: {}",
                    self.file_name,
                    quote_value(text)
                ),
            ));
        }
    }
}

/// Scan `document` for non-deterministic string content.
///
/// `schema` selects the allowlist entry; unmapped fixtures get no exemptions.
pub fn scan_document(
    document: &Value,
    schema: Option<SchemaId>,
    allowlist: &Allowlist,
    file_name: &str,
) -> Vec<Violation> {
    let mut scanner = DeterminismScanner {
        exempt: schema.and_then(|id| allowlist.fields_for(id)),
        file_name,
        found: Vec::new(),
    };
    scanner.visit(document, ROOT_FIELD);
    scanner.found
}

/// Code point ranges that are not printable: controls, format characters,
/// separators other than the ASCII space, private use, and noncharacters.
const NON_PRINTABLE: &[(u32, u32)] = &[
    (0x0000, 0x001f),
    (0x007f, 0x00a0),
    (0x00ad, 0x00ad),
    (0x0600, 0x0605),
    (0x061c, 0x061c),
    (0x06dd, 0x06dd),
    (0x070f, 0x070f),
    (0x0890, 0x0891),
    (0x08e2, 0x08e2),
    (0x1680, 0x1680),
    (0x180e, 0x180e),
    (0x2000, 0x200f),
    (0x2028, 0x202f),
    (0x205f, 0x2064),
    (0x2066, 0x206f),
    (0x3000, 0x3000),
    (0xe000, 0xf8ff),
    (0xfdd0, 0xfdef),
    (0xfeff, 0xfeff),
    (0xfff9, 0xfffb),
    (0x110bd, 0x110bd),
    (0x110cd, 0x110cd),
    (0x13430, 0x1343f),
    (0x1bca0, 0x1bca3),
    (0x1d173, 0x1d17a),
    (0xe0001, 0xe0001),
    (0xe0020, 0xe007f),
    (0xf0000, 0x10ffff),
];

fn is_printable(ch: char) -> bool {
    let cp = u32::from(ch);
    if cp & 0xfffe == 0xfffe {
        return false;
    }
    !NON_PRINTABLE.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Quote a value for a violation message: single quotes unless the value
/// holds `'` and no `"`, with backslash escapes for the quote, backslash and
/// non-printable characters (`\xNN`, `\uNNNN` or `\UNNNNNNNN` by width).
pub fn quote_value(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => {
                let cp = u32::from(c);
                let _ = match cp {
                    0..=0xff => write!(out, "\\x{cp:02x}"),
                    0x100..=0xffff => write!(out, "\\u{cp:04x}"),
                    _ => write!(out, "\\U{cp:08x}"),
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
