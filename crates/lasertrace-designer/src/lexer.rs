//! Number scanning shared by the path data and transform parsers
//!
//! Both grammars allow compact numbers: a sign or a second decimal point
//! starts a new number without a separator, so `10-5` is two numbers and
//! `.5.5` is `0.5 0.5`.

use lasertrace_core::{ParseError, Vector};

/// Byte cursor over attribute text
pub(crate) struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pub(crate) pos: usize,
    /// Position of `source` inside the enclosing attribute value
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self::with_offset(source, 0)
    }

    /// Lexer over a slice starting at `offset` in a larger value; reported
    /// positions are relative to that value.
    pub(crate) fn with_offset(source: &'a str, offset: usize) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            offset,
        }
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub(crate) fn skip_separators(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    pub(crate) fn at_number(&mut self) -> bool {
        self.skip_separators();
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'+' | b'-'))
    }

    /// Run of non-separator characters starting at `start`, for error reports.
    pub(crate) fn token_at(&self, start: usize) -> &'a str {
        let rest = &self.source[start..];
        let len = rest
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_whitespace() || *c == ',' || c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..len]
    }

    fn invalid_at(&self, start: usize) -> ParseError {
        ParseError::InvalidNumber {
            token: self.token_at(start).to_string(),
            position: self.offset + start,
        }
    }

    /// Operand of `command`; a missing operand is reported against it.
    pub(crate) fn number(&mut self, command: char) -> Result<f64, ParseError> {
        if !self.at_number() {
            return Err(ParseError::MissingOperand {
                command,
                position: self.offset + self.pos,
            });
        }
        self.scan_number()
    }

    /// Every number up to the end of the source, separators allowed.
    pub(crate) fn numbers(&mut self) -> Result<Vec<f64>, ParseError> {
        let mut values = Vec::new();
        loop {
            self.skip_separators();
            if self.peek().is_none() {
                return Ok(values);
            }
            if !self.at_number() {
                return Err(self.invalid_at(self.pos));
            }
            values.push(self.scan_number()?);
        }
    }

    fn scan_number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let int_digits = self.digits();
        let mut frac_digits = 0;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            frac_digits = self.digits();
        }
        if int_digits + frac_digits == 0 {
            return Err(self.invalid_at(start));
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                // Not an exponent; leave the letter for the command reader
                self.pos = mark;
            }
        }

        let token = &self.source[start..self.pos];
        token.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
            token: token.to_string(),
            position: self.offset + start,
        })
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Arc flags are a single `0` or `1` and need no separator.
    pub(crate) fn flag(&mut self, command: char) -> Result<bool, ParseError> {
        self.skip_separators();
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            Some(_) if self.at_number() => Err(self.invalid_at(self.pos)),
            _ => Err(ParseError::MissingOperand {
                command,
                position: self.offset + self.pos,
            }),
        }
    }

    pub(crate) fn point(&mut self, command: char) -> Result<Vector, ParseError> {
        let x = self.number(command)?;
        let y = self.number(command)?;
        Ok(Vector::new(x, y))
    }
}
