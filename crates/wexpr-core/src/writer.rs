//! Textual writer: minified and human-readable forms.
//!
//! Minified output keeps everything on one line with single spaces between
//! tokens: `#( a b c )`, `@( k v )`. Human-readable output puts every array
//! element and map pair on its own line, indented with one tab per nesting
//! level, and ends with a newline.
//!
//! Either form parses back to a tree equal to the one written. Values are
//! re-quoted only when they have to be: when empty, when they contain a
//! reserved or whitespace byte, or when they spell the literal `null` (bare,
//! that would re-parse as the null expression).

use crate::base64;
use crate::expression::Expression;
use crate::parser::{is_reserved_byte, is_whitespace_byte};

/// Flags controlling write output. Unknown bits are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteFlags(u32);

impl WriteFlags {
    /// Minified single-line output.
    pub const NONE: WriteFlags = WriteFlags(0);
    /// Newline-and-tab indented output.
    pub const HUMAN_READABLE: WriteFlags = WriteFlags(1 << 0);

    pub fn from_bits(bits: u32) -> WriteFlags {
        WriteFlags(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: WriteFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Serialize an expression tree as text.
pub fn write(expr: &Expression, flags: WriteFlags) -> String {
    write_indented(expr, 0, flags)
}

/// Serialize with a caller-supplied starting indent level (tabs, human
/// readable mode only).
pub fn write_indented(expr: &Expression, starting_indent: usize, flags: WriteFlags) -> String {
    let human = flags.contains(WriteFlags::HUMAN_READABLE);
    let mut out = String::new();
    append_expression(expr, starting_indent, human, &mut out);
    if human && !out.is_empty() {
        out.push('\n');
    }
    out
}

fn append_expression(expr: &Expression, indent: usize, human: bool, out: &mut String) {
    match expr {
        Expression::Invalid => {}
        Expression::Null => out.push_str("null"),
        Expression::Value(text) => append_value(text, out),
        Expression::BinaryData(data) => {
            out.push('<');
            out.push_str(&base64::encode(data));
            out.push('>');
        }
        Expression::Array(children) => {
            if children.is_empty() {
                out.push_str("#()");
            } else if human {
                out.push_str("#(\n");
                for child in children {
                    append_tabs(indent + 1, out);
                    append_expression(child, indent + 1, human, out);
                    out.push('\n');
                }
                append_tabs(indent, out);
                out.push(')');
            } else {
                out.push_str("#(");
                for child in children {
                    out.push(' ');
                    append_expression(child, indent, human, out);
                }
                out.push_str(" )");
            }
        }
        Expression::Map(map) => {
            if map.is_empty() {
                out.push_str("@()");
            } else if human {
                out.push_str("@(\n");
                for (key, value) in map.iter() {
                    append_tabs(indent + 1, out);
                    append_value(key, out);
                    out.push(' ');
                    append_expression(value, indent + 1, human, out);
                    out.push('\n');
                }
                append_tabs(indent, out);
                out.push(')');
            } else {
                out.push_str("@(");
                for (key, value) in map.iter() {
                    out.push(' ');
                    append_value(key, out);
                    out.push(' ');
                    append_expression(value, indent, human, out);
                }
                out.push_str(" )");
            }
        }
    }
}

/// Emit an atom or map key, quoting and escaping only when necessary.
fn append_value(text: &str, out: &mut String) {
    if !needs_quoting(text) {
        out.push_str(text);
        return;
    }

    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn needs_quoting(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    // bare it would re-parse as the null literal
    if text == "null" {
        return true;
    }
    text.bytes()
        .any(|b| is_whitespace_byte(b) || is_reserved_byte(b))
}

fn append_tabs(count: usize, out: &mut String) {
    for _ in 0..count {
        out.push('\t');
    }
}
