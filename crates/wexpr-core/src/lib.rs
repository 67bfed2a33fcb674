//! # wexpr-core
//!
//! Pure-Rust encoder and decoder for **wexpr (W-Expressions)**, a
//! human-readable, S-expression-like data interchange format with an
//! auxiliary binary encoding.
//!
//! A wexpr document is a single expression: an atom (`asdf`, `2.3`,
//! `"quoted"`), the `null` literal, base64 binary data (`<SGVsbG8=>`), an
//! array (`#(a b c)`), or a map (`@(key1 value1 key2 value2)`). Comments
//! (`; ...` and `;(-- ... --)`) are stripped on parse. A `[name]` marker
//! binds the expression that follows it, and `*[name]` later expands to an
//! independent deep copy of it; neither survives into the parsed tree.
//!
//! ## Quick start
//!
//! ```rust
//! use wexpr_core::{parse, write, WriteFlags};
//!
//! let expr = parse("@(name \"Alice\" scores #(95 87 92))").unwrap();
//! assert_eq!(expr.map_get("name").and_then(|e| e.value()), Some("Alice"));
//! assert_eq!(expr.map_get("scores").map(|e| e.array_len()), Some(3));
//!
//! // minified text roundtrips through the parser
//! assert_eq!(write(&expr, WriteFlags::NONE), "@( name Alice scores #( 95 87 92 ) )");
//! ```
//!
//! ## Modules
//!
//! - [`expression`] — the `Expression` tree and its accessors
//! - [`parser`] — textual wexpr → `Expression`
//! - [`writer`] — `Expression` → minified or human-readable text
//! - [`binary`] — `Expression` ↔ chunked binary form and the headered file
//! - [`base64`] — the base64 codec behind `<...>` blocks
//! - [`endian`] — big-endian helpers for the binary format's 32-bit fields
//! - [`error`] — the error kind taxonomy and positioned error type

pub mod base64;
pub mod binary;
pub mod endian;
pub mod error;
pub mod expression;
pub mod parser;
pub mod writer;

pub use error::{ErrorKind, Result, WexprError};
pub use expression::{Expression, ExpressionType, Map};
pub use parser::{parse, parse_bytes, parse_with_flags, ParseFlags};
pub use writer::{write, write_indented, WriteFlags};
