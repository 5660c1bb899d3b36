//! KeyValues writer
//!
//! Serializes a [`KeyValues`] mapping to text.

use super::{KeyValues, Value};

/// Serialize a mapping to KeyValues text
///
/// Nested blocks are indented with one tab per level. Every key and leaf is
/// quoted, so the output reads back identically regardless of content.
pub fn to_string(kv: &KeyValues) -> String {
    let mut out = String::new();
    write_block(&mut out, kv, 0);
    out
}

fn write_block(out: &mut String, kv: &KeyValues, depth: usize) {
    for (key, value) in kv.iter() {
        indent(out, depth);
        write_quoted(out, key);

        match value {
            Value::Map(inner) => {
                out.push('\n');
                indent(out, depth);
                out.push_str("{\n");
                write_block(out, inner, depth + 1);
                indent(out, depth);
                out.push_str("}\n");
            }
            Value::String(s) => {
                out.push(' ');
                write_quoted(out, s);
                out.push('\n');
            }
            Value::Int(n) => {
                out.push_str(" \"");
                out.push_str(&n.to_string());
                out.push_str("\"\n");
            }
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}
