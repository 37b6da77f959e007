//! Parser for the Python literal subset used in npy headers.
//!
//! Headers look like
//! `{'descr': [('x', '<f8', (3,))], 'fortran_order': False, 'shape': (1,), }`
//! so only dicts, lists, tuples, quoted strings, integers, booleans and
//! `None` are recognised.

use super::error::NpyError;

/// Deepest container nesting accepted; real headers use three levels.
const MAX_DEPTH: usize = 32;

/// A parsed Python literal.
#[derive(Debug, Clone, PartialEq)]
pub enum PyLiteral {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    Tuple(Vec<PyLiteral>),
    List(Vec<PyLiteral>),
    Dict(Vec<(PyLiteral, PyLiteral)>),
}

impl PyLiteral {
    /// Look up a string key in a dict literal.
    pub fn get(&self, key: &str) -> Option<&PyLiteral> {
        match self {
            PyLiteral::Dict(entries) => entries.iter().find_map(|(k, v)| match k {
                PyLiteral::Str(s) if s == key => Some(v),
                _ => None,
            }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PyLiteral::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a tuple or list.
    pub fn as_seq(&self) -> Option<&[PyLiteral]> {
        match self {
            PyLiteral::Tuple(items) | PyLiteral::List(items) => Some(items),
            _ => None,
        }
    }

    /// Interpret a tuple/list of non-negative ints (or a bare int) as a shape.
    pub fn as_shape(&self) -> Option<Vec<usize>> {
        match self {
            PyLiteral::Int(n) => usize::try_from(*n).ok().map(|n| vec![n]),
            PyLiteral::Tuple(items) | PyLiteral::List(items) => items
                .iter()
                .map(|item| match item {
                    PyLiteral::Int(n) => usize::try_from(*n).ok(),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

/// Parse a complete literal; trailing whitespace is allowed, anything else is not.
pub fn parse(input: &str) -> Result<PyLiteral, NpyError> {
    let mut parser = Parser { bytes: input.as_bytes(), cursor: 0, depth: 0 };
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.cursor != parser.bytes.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct Parser<'a> {
    bytes: &'a [u8],
    cursor: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn parse_value(&mut self) -> Result<PyLiteral, NpyError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{' | b'[' | b'(') => self.parse_container(),
            Some(b'\'') | Some(b'"') => self.parse_string().map(PyLiteral::Str),
            Some(b'0'..=b'9') | Some(b'-') | Some(b'+') => self.parse_int(),
            Some(c) if c.is_ascii_alphabetic() => self.parse_word(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of header")),
        }
    }

    fn parse_container(&mut self) -> Result<PyLiteral, NpyError> {
        if self.depth == MAX_DEPTH {
            return Err(self.error("literal nested too deeply"));
        }
        self.depth += 1;
        let value = match self.peek() {
            Some(b'{') => self.parse_dict(),
            Some(b'[') => {
                self.cursor += 1;
                self.parse_items(b']').map(PyLiteral::List)
            }
            _ => self.parse_tuple(),
        };
        self.depth -= 1;
        value
    }

    fn parse_dict(&mut self) -> Result<PyLiteral, NpyError> {
        self.cursor += 1;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(b'}') {
                return Ok(PyLiteral::Dict(entries));
            }
            let key = self.parse_value()?;
            self.skip_whitespace();
            if !self.eat(b':') {
                return Err(self.error("expected ':' in dict"));
            }
            let value = self.parse_value()?;
            entries.push((key, value));
            self.skip_whitespace();
            if self.eat(b'}') {
                return Ok(PyLiteral::Dict(entries));
            }
            if !self.eat(b',') {
                return Err(self.error("expected ',' or '}' in dict"));
            }
        }
    }

    fn parse_tuple(&mut self) -> Result<PyLiteral, NpyError> {
        self.cursor += 1;
        self.parse_items(b')').map(PyLiteral::Tuple)
    }

    /// Comma separated values up to `close`; a trailing comma is allowed.
    fn parse_items(&mut self, close: u8) -> Result<Vec<PyLiteral>, NpyError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            if self.eat(close) {
                return Ok(items);
            }
            if !self.eat(b',') {
                return Err(self.error("expected ',' between items"));
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, NpyError> {
        let quote = self.bytes[self.cursor];
        self.cursor += 1;
        let mut out = Vec::new();
        while let Some(c) = self.peek() {
            self.cursor += 1;
            match c {
                b'\\' => {
                    let escaped = self.peek().ok_or_else(|| self.error("dangling escape"))?;
                    self.cursor += 1;
                    out.push(match escaped {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'0' => 0,
                        other => other,
                    });
                }
                c if c == quote => {
                    return String::from_utf8(out)
                        .map_err(|_| self.error("string is not valid UTF-8"));
                }
                c => out.push(c),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn parse_int(&mut self) -> Result<PyLiteral, NpyError> {
        let start = self.cursor;
        if matches!(self.peek(), Some(b'-') | Some(b'+')) {
            self.cursor += 1;
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.cursor += 1;
        }
        // Python 2 headers may spell long ints as `3L`.
        let end = self.cursor;
        if self.peek() == Some(b'L') {
            self.cursor += 1;
        }
        std::str::from_utf8(&self.bytes[start..end])
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(PyLiteral::Int)
            .ok_or_else(|| self.error("invalid integer"))
    }

    fn parse_word(&mut self) -> Result<PyLiteral, NpyError> {
        let start = self.cursor;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.cursor += 1;
        }
        match &self.bytes[start..self.cursor] {
            b"True" => Ok(PyLiteral::Bool(true)),
            b"False" => Ok(PyLiteral::Bool(false)),
            b"None" => Ok(PyLiteral::None),
            _ => Err(NpyError::Header {
                message: format!(
                    "unknown identifier '{}' at offset {start}",
                    String::from_utf8_lossy(&self.bytes[start..self.cursor])
                ),
            }),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.cursor += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, what: &str) -> NpyError {
        NpyError::Header { message: format!("{what} at offset {}", self.cursor) }
    }
}
