//! Byte cursor over the parser input.
use std::fmt::Display;

use crate::error::{ErrorKind, ParseError, Position};

/// A read position into an input buffer.
///
/// The cursor tracks the current line so that [`Cursor::position`] is cheap;
/// positions of earlier offsets are recomputed on demand for diagnostics.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    source: &'a [u8],
    offset: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            line_start: 0,
        }
    }

    #[inline]
    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Looks `ahead` bytes past the current position without consuming.
    #[inline]
    pub fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.source.get(self.offset.checked_add(ahead)?).copied()
    }

    /// Consumes one byte. Returns `None` without moving at the end of input.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.line_start = self.offset;
        }
        Some(byte)
    }

    /// Consumes the next `len` bytes, or nothing if fewer remain.
    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.offset.checked_add(len)?;
        let slice = self.source.get(self.offset..end)?;

        if let Some(last) = slice.iter().rposition(|&b| b == b'\n') {
            self.line += slice.iter().filter(|&&b| b == b'\n').count();
            self.line_start = self.offset + last + 1;
        }

        self.offset = end;
        Some(slice)
    }

    /// Consumes bytes while `f` holds and returns them.
    pub fn take_while(&mut self, mut f: impl FnMut(u8) -> bool) -> &'a [u8] {
        let len = self.source[self.offset..]
            .iter()
            .take_while(|&&b| f(b))
            .count();
        // `len` never exceeds the remaining input.
        self.take(len).unwrap_or_default()
    }

    /// Consumes `byte` if it is next.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skips whitespace and, if `comments` is set, `;` line comments.
    pub fn skip_whitespace(&mut self, comments: bool) {
        loop {
            match self.peek() {
                Some(b) if is_whitespace(b) => {
                    self.advance();
                }
                Some(b';') if comments => self.skip_comment(),
                _ => return,
            }
        }
    }

    /// Consumes a comment through its line terminator.
    fn skip_comment(&mut self) {
        self.take_while(|b| b != b'\n' && b != b'\r');
        let terminator = match (self.peek(), self.peek_at(1)) {
            (Some(b'\r'), Some(b'\n')) => 2,
            (Some(_), _) => 1,
            (None, _) => 0,
        };
        self.take(terminator);
    }

    #[inline]
    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.offset - self.line_start + 1,
        }
    }

    /// The position of an offset at or before the current one.
    pub fn position_at(&self, offset: usize) -> Position {
        if offset >= self.line_start && offset <= self.offset {
            Position {
                offset,
                line: self.line,
                column: offset - self.line_start + 1,
            }
        } else {
            Position::locate(self.source, offset)
        }
    }

    pub fn error(&self, kind: ErrorKind, message: impl Display) -> ParseError {
        ParseError::new(kind, message, self.position())
    }

    pub fn error_at(&self, kind: ErrorKind, offset: usize, message: impl Display) -> ParseError {
        ParseError::new(kind, message, self.position_at(offset))
    }
}

/// Whitespace between grammar elements: space, tab, CR, LF, VT and FF.
#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c)
}
