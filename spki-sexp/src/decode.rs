//! Decoding of atoms in the five simple-string encodings.
//!
//! ```text
//! simple-string = verbatim / quoted-string / hexadecimal / base-64 / token
//! verbatim      = decimal ":" *OCTET
//! quoted-string = [decimal] DQUOTE *(printable / escaped) DQUOTE
//! hexadecimal   = [decimal] "#" *whitespace *hexadecimals "#"
//! base-64       = [decimal] "|" *whitespace *base-64-char "|"
//! token         = (ALPHA / simple-punc) *(ALPHA / DIGIT / simple-punc)
//! ```
use base64::Engine as _;

use crate::cursor::{is_whitespace, Cursor};
use crate::error::{ErrorKind, Result};
use crate::escape::{is_token_byte, is_token_start, unescape};
use crate::parser::Options;
use crate::value::Atom;

/// Classification of the byte at which an atom or list starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookahead {
    OpenList,
    CloseList,
    Hint,
    Length,
    Quoted,
    Hex,
    Base64,
    Token,
    Other(u8),
    Eof,
}

impl Lookahead {
    pub(crate) fn of(byte: Option<u8>) -> Self {
        match byte {
            None => Lookahead::Eof,
            Some(b'(') => Lookahead::OpenList,
            Some(b')') => Lookahead::CloseList,
            Some(b'[') => Lookahead::Hint,
            Some(b'"') => Lookahead::Quoted,
            Some(b'#') => Lookahead::Hex,
            Some(b'|') => Lookahead::Base64,
            Some(b) if b.is_ascii_digit() => Lookahead::Length,
            Some(b) if is_token_start(b) => Lookahead::Token,
            Some(b) => Lookahead::Other(b),
        }
    }
}

/// Renders a byte for an error message.
pub(crate) fn describe(byte: u8) -> String {
    match byte {
        0x21..=0x7e => format!("'{}'", byte as char),
        b' ' => "space".to_string(),
        b => format!("byte 0x{b:02x}"),
    }
}

/// Decodes an atom, including its display hint if present.
pub(crate) fn atom(cursor: &mut Cursor<'_>, options: &Options) -> Result<Atom> {
    if !cursor.eat(b'[') {
        return Ok(Atom::new(simple_string(cursor, options)?));
    }

    cursor.skip_whitespace(options.allow_comments);
    let hint = simple_string(cursor, options)?;
    cursor.skip_whitespace(options.allow_comments);

    match cursor.peek() {
        Some(b']') => {
            cursor.advance();
        }
        Some(b) => {
            return Err(cursor.error(
                ErrorKind::Syntax,
                format!("expected ']' to close display hint, found {}", describe(b)),
            ))
        }
        None => {
            return Err(cursor.error(ErrorKind::UnexpectedEof, "unterminated display hint"));
        }
    }

    cursor.skip_whitespace(options.allow_comments);
    let data = simple_string(cursor, options)?;
    Ok(Atom::with_hint(hint, data))
}

/// Decodes one simple string. Display hints and lists are not accepted here.
pub(crate) fn simple_string(cursor: &mut Cursor<'_>, options: &Options) -> Result<Vec<u8>> {
    let start = cursor.offset();
    let data = encoded(cursor, options)?;

    if let Some(threshold) = options.large_atom_threshold {
        if data.len() >= threshold {
            log::warn!(
                "atom of {} bytes at {} reaches the large atom threshold of {threshold} bytes",
                data.len(),
                cursor.position_at(start),
            );
        }
    }

    Ok(data)
}

fn encoded(cursor: &mut Cursor<'_>, options: &Options) -> Result<Vec<u8>> {
    match Lookahead::of(cursor.peek()) {
        Lookahead::Length => {
            let start = cursor.offset();
            let length = decimal(cursor)?;
            match cursor.peek() {
                Some(b':') => {
                    cursor.advance();
                    verbatim(cursor, length)
                }
                Some(b'"') => check_length(cursor, options, start, length, quoted),
                Some(b'#') => check_length(cursor, options, start, length, hexadecimal),
                Some(b'|') => check_length(cursor, options, start, length, base64),
                Some(b) => Err(cursor.error(
                    ErrorKind::Syntax,
                    format!(
                        "expected ':', '\"', '#' or '|' after length, found {}",
                        describe(b)
                    ),
                )),
                None => Err(cursor.error(ErrorKind::UnexpectedEof, "expected ':' after length")),
            }
        }
        Lookahead::Quoted => quoted(cursor),
        Lookahead::Hex => hexadecimal(cursor),
        Lookahead::Base64 => base64(cursor),
        Lookahead::Token => Ok(cursor.take_while(is_token_byte).to_vec()),
        Lookahead::Hint => Err(cursor.error(ErrorKind::Syntax, "display hint not allowed here")),
        Lookahead::OpenList => Err(cursor.error(ErrorKind::Syntax, "expected atom, found list")),
        Lookahead::CloseList => Err(cursor.error(ErrorKind::Syntax, "unexpected ')'")),
        Lookahead::Other(b) => {
            Err(cursor.error(ErrorKind::Syntax, format!("unexpected {}", describe(b))))
        }
        Lookahead::Eof => Err(cursor.error(ErrorKind::UnexpectedEof, "expected atom")),
    }
}

/// Decodes a body after an advisory length prefix.
///
/// The length only binds for verbatim atoms. Elsewhere it is accepted without
/// checking unless [`Options::strict_lengths`] is set.
fn check_length(
    cursor: &mut Cursor<'_>,
    options: &Options,
    start: usize,
    length: usize,
    decode: fn(&mut Cursor<'_>) -> Result<Vec<u8>>,
) -> Result<Vec<u8>> {
    let data = decode(cursor)?;
    if options.strict_lengths && data.len() != length {
        return Err(cursor.error_at(
            ErrorKind::InvalidEncoding,
            start,
            format!("declared length {length} but decoded {} bytes", data.len()),
        ));
    }
    Ok(data)
}

/// Parses a decimal length. Leading zeros are only allowed in `0` itself.
fn decimal(cursor: &mut Cursor<'_>) -> Result<usize> {
    let start = cursor.offset();
    let digits = cursor.take_while(|b| b.is_ascii_digit());

    if digits.len() > 1 && digits[0] == b'0' {
        return Err(cursor.error_at(ErrorKind::Syntax, start, "leading zero in length"));
    }

    digits.iter().try_fold(0usize, |acc, &d| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(usize::from(d - b'0')))
            .ok_or_else(|| cursor.error_at(ErrorKind::Syntax, start, "length out of range"))
    })
}

fn verbatim(cursor: &mut Cursor<'_>, length: usize) -> Result<Vec<u8>> {
    let remaining = cursor.source().len() - cursor.offset();
    match cursor.take(length) {
        Some(bytes) => Ok(bytes.to_vec()),
        None => Err(cursor.error(
            ErrorKind::UnexpectedEof,
            format!("verbatim atom needs {length} bytes but only {remaining} remain"),
        )),
    }
}

fn quoted(cursor: &mut Cursor<'_>) -> Result<Vec<u8>> {
    let open = cursor.offset();
    cursor.advance();
    let start = cursor.offset();

    // Find the closing quote; an escaped byte is never a delimiter.
    loop {
        match cursor.peek() {
            Some(b'"') => break,
            Some(b'\\') => {
                cursor.advance();
                cursor.advance();
            }
            Some(_) => {
                cursor.advance();
            }
            None => {
                return Err(cursor.error_at(
                    ErrorKind::UnexpectedEof,
                    open,
                    "unterminated quoted string",
                ))
            }
        }
    }

    let body = &cursor.source()[start..cursor.offset()];
    cursor.advance();

    let body = std::str::from_utf8(body).map_err(|err| {
        cursor.error_at(
            ErrorKind::Syntax,
            start + err.valid_up_to(),
            "non-ASCII byte in quoted string",
        )
    })?;

    unescape(body).map_err(|span| {
        let offset = start + span.start;
        let rest = &body[span.start..];
        let message = match rest.chars().next() {
            Some('\\') => {
                let found = body.get(span).unwrap_or(rest);
                format!("invalid escape sequence {found:?}")
            }
            Some(c) => format!("unexpected {c:?} in quoted string"),
            None => "invalid quoted string".to_string(),
        };
        cursor.error_at(ErrorKind::Syntax, offset, message)
    })
}

/// Collects the body of a `#...#` or `|...|` atom without its whitespace.
fn delimited(
    cursor: &mut Cursor<'_>,
    delimiter: u8,
    what: &str,
    allowed: impl Fn(u8) -> bool,
) -> Result<Vec<u8>> {
    let open = cursor.offset();
    cursor.advance();
    let mut body = Vec::new();

    loop {
        match cursor.peek() {
            Some(b) if b == delimiter => {
                cursor.advance();
                return Ok(body);
            }
            Some(b) if is_whitespace(b) => {
                cursor.advance();
            }
            Some(b) if allowed(b) => {
                body.push(b);
                cursor.advance();
            }
            Some(b) => {
                return Err(cursor.error(
                    ErrorKind::InvalidEncoding,
                    format!("unexpected {} in {what}", describe(b)),
                ))
            }
            None => {
                return Err(cursor.error_at(
                    ErrorKind::UnexpectedEof,
                    open,
                    format!("unterminated {what}"),
                ))
            }
        }
    }
}

fn hexadecimal(cursor: &mut Cursor<'_>) -> Result<Vec<u8>> {
    let open = cursor.offset();
    let digits = delimited(cursor, b'#', "hexadecimal atom", |b| b.is_ascii_hexdigit())?;

    if digits.len() % 2 != 0 {
        return Err(cursor.error_at(
            ErrorKind::Syntax,
            open,
            "odd number of digits in hexadecimal atom",
        ));
    }

    hex::decode(&digits).map_err(|err| cursor.error_at(ErrorKind::InvalidEncoding, open, err))
}

fn base64(cursor: &mut Cursor<'_>) -> Result<Vec<u8>> {
    let open = cursor.offset();
    let chars = delimited(cursor, b'|', "base64 atom", |b| {
        b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=')
    })?;

    base64::engine::general_purpose::STANDARD
        .decode(&chars)
        .map_err(|err| cursor.error_at(ErrorKind::InvalidEncoding, open, err))
}
