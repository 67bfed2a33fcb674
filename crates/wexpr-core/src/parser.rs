//! Textual wexpr parser.
//!
//! A recursive-descent parser over the raw bytes of a UTF-8 document. All
//! structural characters are ASCII, so scanning is byte-oriented; atom and
//! string content passes through as UTF-8 slices of the input.
//!
//! The parser is fail-fast: the first error aborts the parse and reports a
//! 1-based line and column inside the offending token. A document holds
//! exactly one expression; an empty or whitespace-only document yields
//! [`Expression::Invalid`] without an error.
//!
//! References are the one non-local construct. `[name]` binds the expression
//! that follows it into a table scoped to this parse call (the expression
//! itself is still emitted in place), and `*[name]` expands to a deep copy
//! of the bound expression. The table dies with the parse; the returned tree
//! contains no reference markers.

use std::collections::HashMap;

use crate::base64;
use crate::error::{ErrorKind, Result, WexprError};
use crate::expression::{Expression, Map};

/// Flags controlling parse behaviour. No flags are currently defined;
/// unknown bits are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseFlags(u32);

impl ParseFlags {
    pub const NONE: ParseFlags = ParseFlags(0);

    pub fn from_bits(bits: u32) -> ParseFlags {
        ParseFlags(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Parse a wexpr document into an expression tree.
pub fn parse(input: &str) -> Result<Expression> {
    parse_with_flags(input, ParseFlags::NONE)
}

/// Parse with explicit flags.
pub fn parse_with_flags(input: &str, _flags: ParseFlags) -> Result<Expression> {
    let mut parser = Parser {
        text: input,
        pos: 0,
        refs: HashMap::new(),
    };

    parser.skip_whitespace_and_comments();
    if parser.at_end() {
        return Ok(Expression::Invalid);
    }

    let expr = parser.parse_expression()?;

    parser.skip_whitespace_and_comments();
    if !parser.at_end() {
        return Err(parser.error_here(
            ErrorKind::ExtraDataAfterParsingRoot,
            "extra data after parsing the root expression",
        ));
    }

    Ok(expr)
}

/// Parse raw bytes, validating UTF-8 first.
pub fn parse_bytes(input: &[u8], flags: ParseFlags) -> Result<Expression> {
    match std::str::from_utf8(input) {
        Ok(text) => parse_with_flags(text, flags),
        Err(err) => {
            let (line, column) = line_and_column(input, err.valid_up_to());
            Err(WexprError::new(
                ErrorKind::InvalidUtf8,
                line,
                column,
                "input is not valid UTF-8",
            ))
        }
    }
}

/// Bytes that terminate an atom and may only appear bare as structure.
const RESERVED: &[u8] = b"()#@\"<>;[]*";

pub(crate) fn is_reserved_byte(b: u8) -> bool {
    RESERVED.contains(&b)
}

pub(crate) fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// 1-based line and column of a byte offset, by scanning newlines from the
/// start of the input.
fn line_and_column(input: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let consumed = &input[..offset];
    let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = consumed
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    (line, offset - line_start + 1)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    /// Reference declarations seen so far in this parse call.
    refs: HashMap<String, Expression>,
}

impl<'a> Parser<'a> {
    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn starts_with(&self, prefix: &[u8]) -> bool {
        self.bytes()[self.pos..].starts_with(prefix)
    }

    /// Offset of `byte` at or after the current position.
    fn find_byte(&self, byte: u8) -> Option<usize> {
        self.bytes()[self.pos..]
            .iter()
            .position(|&b| b == byte)
            .map(|i| self.pos + i)
    }

    fn error_here(&self, kind: ErrorKind, message: impl Into<String>) -> WexprError {
        self.error_at(kind, self.pos, message)
    }

    fn error_at(&self, kind: ErrorKind, offset: usize, message: impl Into<String>) -> WexprError {
        let (line, column) = line_and_column(self.bytes(), offset);
        WexprError::new(kind, line, column, message)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b) if is_whitespace_byte(b) => self.pos += 1,
                Some(b';') => {
                    if self.starts_with(b";(--") {
                        // block comment, runs to the first --)
                        self.pos += 4;
                        match self.bytes()[self.pos..]
                            .windows(3)
                            .position(|w| w == b"--)")
                        {
                            Some(i) => self.pos += i + 3,
                            None => self.pos = self.text.len(),
                        }
                    } else {
                        // line comment, runs to end of line
                        match self.find_byte(b'\n') {
                            Some(i) => self.pos = i + 1,
                            None => self.pos = self.text.len(),
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Parse one expression. The caller has already skipped whitespace.
    fn parse_expression(&mut self) -> Result<Expression> {
        match self.peek() {
            None => Err(self.error_here(
                ErrorKind::EmptyString,
                "expected an expression, found end of input",
            )),
            Some(b'#') if self.starts_with(b"#(") => self.parse_array(),
            Some(b'@') if self.starts_with(b"@(") => self.parse_map(),
            Some(b'"') => self.parse_quoted_string(),
            Some(b'<') => self.parse_binary_block(),
            Some(b'[') => self.parse_reference_declaration(),
            Some(b'*') => self.parse_reference_insertion(),
            Some(b) if is_reserved_byte(b) => Err(self.error_here(
                ErrorKind::EmptyString,
                format!("expected an expression, found '{}'", b as char),
            )),
            Some(_) => self.parse_atom(),
        }
    }

    fn parse_array(&mut self) -> Result<Expression> {
        let start = self.pos;
        self.pos += 2; // #(

        let mut children = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => {
                    return Err(self.error_at(
                        ErrorKind::ArrayMissingEndParen,
                        start,
                        "array is missing its ending )",
                    ));
                }
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => children.push(self.parse_expression()?),
            }
        }
        Ok(Expression::Array(children))
    }

    fn parse_map(&mut self) -> Result<Expression> {
        let start = self.pos;
        self.pos += 2; // @(

        let mut map = Map::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => {
                    return Err(self.error_at(
                        ErrorKind::MapMissingEndParen,
                        start,
                        "map is missing its ending )",
                    ));
                }
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    let key_start = self.pos;
                    let key_expr = self.parse_expression()?;
                    let key = match key_expr.value() {
                        Some(key) => key.to_string(),
                        None => {
                            return Err(self.error_at(
                                ErrorKind::MapKeyMustBeAValue,
                                key_start,
                                "map key must be a value",
                            ));
                        }
                    };

                    self.skip_whitespace_and_comments();
                    if matches!(self.peek(), None | Some(b')')) {
                        return Err(self.error_at(
                            ErrorKind::MapNoValue,
                            key_start,
                            format!("map key '{key}' has no value"),
                        ));
                    }
                    let value = self.parse_expression()?;

                    // first occurrence of a key wins
                    if !map.contains_key(&key) {
                        map.insert(key, value);
                    }
                }
            }
        }
        Ok(Expression::Map(map))
    }

    fn parse_quoted_string(&mut self) -> Result<Expression> {
        let start = self.pos;
        self.pos += 1; // opening quote

        let mut out = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error_at(
                        ErrorKind::StringMissingEndingQuote,
                        start,
                        "quoted string is missing its ending quote",
                    ));
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    let escape_start = self.pos;
                    self.pos += 1;
                    let replacement = match self.peek() {
                        Some(b'"') => '"',
                        Some(b'\\') => '\\',
                        Some(b'n') => '\n',
                        Some(b'r') => '\r',
                        Some(b't') => '\t',
                        Some(other) => {
                            return Err(self.error_at(
                                ErrorKind::InvalidStringEscape,
                                escape_start,
                                format!("unknown string escape '\\{}'", other as char),
                            ));
                        }
                        None => {
                            return Err(self.error_at(
                                ErrorKind::StringMissingEndingQuote,
                                start,
                                "quoted string is missing its ending quote",
                            ));
                        }
                    };
                    out.push(replacement);
                    self.pos += 1;
                }
                Some(_) => {
                    // copy the run up to the next quote or escape verbatim
                    let run_start = self.pos;
                    while let Some(b) = self.peek() {
                        if b == b'"' || b == b'\\' {
                            break;
                        }
                        self.pos += 1;
                    }
                    out.push_str(&self.text[run_start..self.pos]);
                }
            }
        }
        Ok(Expression::Value(out))
    }

    fn parse_binary_block(&mut self) -> Result<Expression> {
        let start = self.pos;
        self.pos += 1; // <

        let end = match self.find_byte(b'>') {
            Some(end) => end,
            None => {
                return Err(self.error_at(
                    ErrorKind::BinaryDataNoEnding,
                    start,
                    "binary data is missing its ending >",
                ));
            }
        };

        let payload = &self.text[self.pos..end];
        let data = base64::decode(payload).map_err(|_| {
            self.error_at(
                ErrorKind::BinaryDataInvalidBase64,
                start,
                "binary data is not valid base64",
            )
        })?;
        self.pos = end + 1;
        Ok(Expression::BinaryData(data))
    }

    fn parse_reference_declaration(&mut self) -> Result<Expression> {
        let start = self.pos;
        self.pos += 1; // [

        let end = match self.find_byte(b']') {
            Some(end) => end,
            None => {
                return Err(self.error_at(
                    ErrorKind::ReferenceMissingEndBracket,
                    start,
                    "reference declaration is missing its ending ]",
                ));
            }
        };
        let name = self.text[self.pos..end].to_string();
        self.pos = end + 1;

        self.skip_whitespace_and_comments();
        if self.at_end() {
            return Err(self.error_at(
                ErrorKind::EmptyString,
                start,
                format!("expected an expression after reference declaration [{name}]"),
            ));
        }
        let expr = self.parse_expression()?;

        // the declared expression is both bound and emitted in place
        self.refs.insert(name, expr.clone());
        Ok(expr)
    }

    fn parse_reference_insertion(&mut self) -> Result<Expression> {
        let start = self.pos;
        self.pos += 1; // *

        if self.peek() != Some(b'[') {
            return Err(self.error_at(
                ErrorKind::ReferenceInsertMissingEnd,
                start,
                "reference insertion is missing its [name]",
            ));
        }
        self.pos += 1;

        let end = match self.find_byte(b']') {
            Some(end) => end,
            None => {
                return Err(self.error_at(
                    ErrorKind::ReferenceInsertMissingEnd,
                    start,
                    "reference insertion is missing its ending ]",
                ));
            }
        };
        let name = &self.text[self.pos..end];
        self.pos = end + 1;

        match self.refs.get(name) {
            Some(expr) => Ok(expr.clone()),
            None => Err(self.error_at(
                ErrorKind::ReferenceUnknownReference,
                start,
                format!("unknown reference '{name}'"),
            )),
        }
    }

    fn parse_atom(&mut self) -> Result<Expression> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace_byte(b) || is_reserved_byte(b) {
                break;
            }
            self.pos += 1;
        }

        let word = &self.text[start..self.pos];
        if word == "null" {
            Ok(Expression::Null)
        } else {
            Ok(Expression::Value(word.to_string()))
        }
    }
}
