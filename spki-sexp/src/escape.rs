use logos::Logos;
use std::ops::Range;

/// Lexer token for the body of a quoted string.
#[derive(Debug, Clone, Logos)]
enum EscapedToken {
    #[token(r"\b", |_| 0x08u8)]
    #[token(r"\t", |_| 0x09u8)]
    #[token(r"\v", |_| 0x0bu8)]
    #[token(r"\n", |_| 0x0au8)]
    #[token(r"\f", |_| 0x0cu8)]
    #[token(r"\r", |_| 0x0du8)]
    #[token(r#"\""#, |_| b'"')]
    #[token(r"\'", |_| b'\'')]
    #[token(r"\\", |_| b'\\')]
    #[token(r"\?", |_| b'?')]
    Escaped(u8),

    #[regex(r"\\[0-7][0-7][0-7]", |lex| parse_octal(lex.slice()))]
    Octal(u8),

    #[regex(r"\\x[0-9a-fA-F][0-9a-fA-F]", |lex| parse_hex(lex.slice()))]
    Hex(u8),

    /// Two hex digits without the `x`, the first a decimal digit so that `\b`
    /// and `\f` keep their meaning. Three octal digits lex as [`Octal`]
    /// instead, being the longer match.
    ///
    /// [`Octal`]: EscapedToken::Octal
    #[regex(r"\\[0-9][0-9a-fA-F]", |lex| parse_short_hex(lex.slice()))]
    ShortHex(u8),

    #[token("\\\r\n")]
    #[token("\\\n\r")]
    #[token("\\\r")]
    #[token("\\\n")]
    LineContinuation,

    #[regex(r#"[ !#-\[\]-~]+"#)]
    Literal,
}

/// Parses `\ddd`. Values above `\377` do not fit an octet and are rejected.
fn parse_octal(str: &str) -> Option<u8> {
    u8::from_str_radix(str.get(1..)?, 8).ok()
}

/// Parses `\xHH`.
fn parse_hex(str: &str) -> Option<u8> {
    u8::from_str_radix(str.get(2..)?, 16).ok()
}

/// Parses `\HH`.
fn parse_short_hex(str: &str) -> Option<u8> {
    u8::from_str_radix(str.get(1..)?, 16).ok()
}

/// Decodes the body of a quoted string, without its delimiting quotes.
///
/// On failure returns the span of the offending escape or character.
pub fn unescape(str: &str) -> Result<Vec<u8>, Range<usize>> {
    let mut lexer = EscapedToken::lexer(str);
    let mut output = Vec::with_capacity(str.len());

    while let Some(token) = lexer.next() {
        let token = token.map_err(|()| lexer.span())?;

        match token {
            EscapedToken::Escaped(b)
            | EscapedToken::Octal(b)
            | EscapedToken::Hex(b)
            | EscapedToken::ShortHex(b) => output.push(b),
            EscapedToken::LineContinuation => {}
            EscapedToken::Literal => output.extend_from_slice(lexer.slice().as_bytes()),
        }
    }

    Ok(output)
}

/// Writes `bytes` as a quoted string, escaping everything outside printable ASCII.
pub fn escape_quoted(bytes: &[u8], output: &mut Vec<u8>) {
    output.reserve(bytes.len() + 2);
    output.push(b'"');

    for &b in bytes {
        match b {
            b'"' => output.extend_from_slice(br#"\""#),
            b'\\' => output.extend_from_slice(br"\\"),
            0x08 => output.extend_from_slice(br"\b"),
            b'\t' => output.extend_from_slice(br"\t"),
            0x0b => output.extend_from_slice(br"\v"),
            b'\n' => output.extend_from_slice(br"\n"),
            0x0c => output.extend_from_slice(br"\f"),
            b'\r' => output.extend_from_slice(br"\r"),
            0x20..=0x7e => output.push(b),
            b => {
                output.extend_from_slice(br"\x");
                output.extend_from_slice(hex::encode([b]).as_bytes());
            }
        }
    }

    output.push(b'"');
}

/// Bytes that may appear in a token.
#[inline]
pub fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(byte, b'-' | b'.' | b'/' | b'_' | b':' | b'*' | b'+' | b'=')
}

/// Bytes that may start a token. Digits are excluded since they begin a length.
#[inline]
pub fn is_token_start(byte: u8) -> bool {
    is_token_byte(byte) && !byte.is_ascii_digit()
}

/// Whether `bytes` can be written as a bare token.
pub fn is_token(bytes: &[u8]) -> bool {
    match bytes.split_first() {
        Some((&first, rest)) => is_token_start(first) && rest.iter().all(|&b| is_token_byte(b)),
        None => false,
    }
}

/// Whether `bytes` reads as text that a quoted string can carry.
///
/// The bytes must be valid UTF-8 and the only control characters allowed are
/// those with a named escape.
pub fn is_quotable(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok()
        && bytes
            .iter()
            .all(|&b| matches!(b, 0x08..=0x0d) || (b >= 0x20 && b != 0x7f))
}

#[cfg(test)]
mod test {
    use super::{escape_quoted, is_quotable, is_token, unescape};
    use rstest::rstest;

    #[rstest]
    #[case("abc", b"abc")]
    #[case(r"a\62c", b"abc")]
    #[case(r"a\x62c", b"abc")]
    #[case(r#"\b\t\v\n\f\r\"\'\\\?"#, b"\x08\t\x0b\n\x0c\r\"'\\?")]
    #[case(r"\000\377", b"\x00\xff")]
    #[case(r"\141\62\x63", b"abc")]
    #[case(r"\0628", b"28")]
    #[case(r"\628", b"b8")]
    #[case(r"\fF\ba", b"\x0cF\x08a")]
    #[case(r"\9f", b"\x9f")]
    #[case(r"\xFf", b"\xff")]
    #[case("long\\\nline", b"longline")]
    #[case("long\\\r\nline", b"longline")]
    #[case("long\\\n\rline", b"longline")]
    #[case("long\\\rline", b"longline")]
    #[case("", b"")]
    fn test_unescape(#[case] escaped: &str, #[case] expected: &[u8]) {
        assert_eq!(expected, unescape(escaped).unwrap());
    }

    #[rstest]
    #[case(r"bad \q escape", 4)]
    #[case(r"a\X62c", 1)]
    #[case(r"\400", 0)]
    #[case(r"\x4", 0)]
    #[case(r"\6", 0)]
    #[case(r"ab\6z", 2)]
    #[case(r"\627", 0)]
    #[case(r"\Ff", 0)]
    #[case("raw\ttab", 3)]
    fn test_unescape_error_span(#[case] escaped: &str, #[case] start: usize) {
        assert_eq!(start, unescape(escaped).unwrap_err().start);
    }

    #[rstest]
    #[case(b"hello world", r#""hello world""#)]
    #[case(b"", r#""""#)]
    #[case(b"say \"hi\"", r#""say \"hi\"""#)]
    #[case(b"a\\b", r#""a\\b""#)]
    #[case(b"tab\there\n", r#""tab\there\n""#)]
    #[case("h\u{e9}".as_bytes(), r#""h\xc3\xa9""#)]
    fn test_escape_quoted(#[case] bytes: &[u8], #[case] expected: &str) {
        let mut output = Vec::new();
        escape_quoted(bytes, &mut output);
        assert_eq!(expected.as_bytes(), output);
    }

    #[rstest]
    #[case(b"hello-world", true)]
    #[case(b"text/plain", true)]
    #[case(b"*+=:._", true)]
    #[case(b"a1", true)]
    #[case(b"1a", false)]
    #[case(b"", false)]
    #[case(b"hello world", false)]
    #[case(b"caf\xc3\xa9", false)]
    fn test_is_token(#[case] bytes: &[u8], #[case] expected: bool) {
        assert_eq!(expected, is_token(bytes));
    }

    #[rstest]
    #[case(b"hello world", true)]
    #[case(b"line\nbreak", true)]
    #[case(b"", true)]
    #[case("caf\u{e9}".as_bytes(), true)]
    #[case(b"nul\x00", false)]
    #[case(b"del\x7f", false)]
    #[case(b"\xff\xfe", false)]
    fn test_is_quotable(#[case] bytes: &[u8], #[case] expected: bool) {
        assert_eq!(expected, is_quotable(bytes));
    }
}
