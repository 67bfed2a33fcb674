//! Error types for wexpr parsing and binary decoding.

use thiserror::Error;

/// What went wrong. The textual kinds carry a source position; the
/// `Binary*` kinds come from the chunk decoder, which has no lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input (or a value chunk payload) was not valid UTF-8.
    InvalidUtf8,
    /// A quoted string ran to end of input without a closing `"`.
    StringMissingEndingQuote,
    /// A `\` escape inside a quoted string was not one we understand.
    InvalidStringEscape,
    /// A map key parsed to something other than a value.
    MapKeyMustBeAValue,
    /// A map key had no expression following it.
    MapNoValue,
    /// A map ran to end of input without its closing `)`.
    MapMissingEndParen,
    /// An array ran to end of input without its closing `)`.
    ArrayMissingEndParen,
    /// A `[name]` reference declaration was missing its `]`.
    ReferenceMissingEndBracket,
    /// A `*[name]` reference insertion was malformed.
    ReferenceInsertMissingEnd,
    /// A `*[name]` insertion named a reference that was never declared.
    ReferenceUnknownReference,
    /// A `<` binary block ran to end of input without its `>`.
    BinaryDataNoEnding,
    /// The payload of a `<...>` block was not valid base64.
    BinaryDataInvalidBase64,
    /// Non-whitespace input remained after the single root expression.
    ExtraDataAfterParsingRoot,
    /// An expression was required but none was found.
    EmptyString,
    /// The binary file header was malformed (magic, length, or reserved bytes).
    BinaryInvalidHeader,
    /// The binary file header carried a version we do not speak.
    BinaryUnknownVersion,
    /// A binary file contained more than one expression chunk.
    BinaryMultipleExpressions,
    /// A chunk's declared size ran past the end of its buffer.
    BinaryChunkOverflow,
    /// A chunk inside a container carried an unknown type code.
    BinaryUnknownType,
    /// A map chunk's payload was not key/value pairs with value-typed keys.
    BinaryChunkNotMap,
}

/// A wexpr parse or decode failure.
///
/// `line` and `column` are 1-based and point inside the offending token for
/// textual errors; both are 0 for binary-path errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct WexprError {
    pub kind: ErrorKind,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl WexprError {
    /// An error at a textual source position.
    pub fn new(kind: ErrorKind, line: usize, column: usize, message: impl Into<String>) -> Self {
        WexprError {
            kind,
            line,
            column,
            message: message.into(),
        }
    }

    /// An error from the binary path, which has no source position.
    pub fn binary(kind: ErrorKind, message: impl Into<String>) -> Self {
        WexprError::new(kind, 0, 0, message)
    }
}

/// Convenience alias used throughout wexpr-core.
pub type Result<T> = std::result::Result<T, WexprError>;
