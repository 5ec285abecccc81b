//! Position-annotated parse errors.
use std::fmt::{self, Display};

/// A location in the input.
///
/// `offset` counts bytes from the start of the input. `line` and `column` are
/// one-based, and `column` counts bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The position of the first byte of the input.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };

    /// Computes the position of `offset` within `source` by counting line feeds.
    ///
    /// Offsets past the end of `source` are clamped to its length.
    pub fn locate(source: &[u8], offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = 1 + before.iter().filter(|&&b| b == b'\n').count();
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);

        Position {
            offset,
            line,
            column: offset - line_start + 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (byte {})",
            self.line, self.column, self.offset
        )
    }
}

/// The class of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input ended while a list, verbatim body, or delimited atom was open.
    UnexpectedEof,
    /// A byte did not match any alternative of the grammar at its position.
    Syntax,
    /// A delimited hexadecimal or base64 body could not be decoded.
    InvalidEncoding,
    /// A single value was parsed but more input followed it.
    TrailingInput,
    /// Lists were nested deeper than the configured limit.
    DepthLimit,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::UnexpectedEof => "unexpected end of input",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::InvalidEncoding => "invalid encoding",
            ErrorKind::TrailingInput => "trailing input",
            ErrorKind::DepthLimit => "nesting too deep",
        })
    }
}

/// A parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message} at {position}")]
pub struct ParseError {
    kind: ErrorKind,
    message: String,
    position: Position,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Display, position: Position) -> Self {
        ParseError {
            kind,
            message: message.to_string(),
            position,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// Shorthand for a result specialised to parse errors.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[cfg(test)]
mod test {
    use super::{ErrorKind, ParseError, Position};
    use rstest::rstest;

    #[rstest]
    #[case(b"", 0, 1, 1)]
    #[case(b"abc", 2, 1, 3)]
    #[case(b"a\nbc", 2, 2, 1)]
    #[case(b"a\nbc\nd", 4, 2, 3)]
    #[case(b"a\r\nb", 3, 2, 1)]
    #[case(b"ab", 10, 1, 3)]
    fn test_locate(
        #[case] source: &[u8],
        #[case] offset: usize,
        #[case] line: usize,
        #[case] column: usize,
    ) {
        let position = Position::locate(source, offset);
        assert_eq!((line, column), (position.line, position.column));
    }

    #[test]
    fn test_message_includes_position() {
        let error = ParseError::new(
            ErrorKind::Syntax,
            "unexpected ')'",
            Position::locate(b"(a\n))", 4),
        );
        assert_eq!(
            "syntax error: unexpected ')' at line 2, column 2 (byte 4)",
            error.to_string()
        );
    }
}
