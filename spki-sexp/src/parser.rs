//! Parse values from s-expressions.
use delegate::delegate;

use crate::cursor::Cursor;
use crate::decode::{self, describe, Lookahead};
use crate::error::{ErrorKind, Position, Result};
use crate::value::Value;

/// Options that influence parser behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub(crate) max_depth: usize,
    pub(crate) allow_comments: bool,
    pub(crate) strict_lengths: bool,
    pub(crate) large_atom_threshold: Option<usize>,
}

impl Options {
    /// Default limit on list nesting.
    pub const DEFAULT_MAX_DEPTH: usize = 1000;

    /// Default size at which a decoded atom is logged as large.
    pub const DEFAULT_LARGE_ATOM_THRESHOLD: usize = 1 << 20;

    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            allow_comments: true,
            strict_lengths: false,
            large_atom_threshold: Some(Self::DEFAULT_LARGE_ATOM_THRESHOLD),
        }
    }

    /// Limits how deeply lists may be nested.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets whether `;` starts a comment that extends to the end of the line.
    pub fn with_comments(mut self, allow_comments: bool) -> Self {
        self.allow_comments = allow_comments;
        self
    }

    /// Sets whether the optional length prefix of quoted, hexadecimal and
    /// base64 atoms must match the decoded length.
    pub fn with_strict_lengths(mut self, strict_lengths: bool) -> Self {
        self.strict_lengths = strict_lengths;
        self
    }

    /// Logs a warning for every atom whose decoded content is at least
    /// `threshold` bytes long. `None` disables the warning.
    pub fn with_large_atom_threshold(mut self, threshold: Option<usize>) -> Self {
        self.large_atom_threshold = threshold;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn allow_comments(&self) -> bool {
        self.allow_comments
    }

    pub fn strict_lengths(&self) -> bool {
        self.strict_lengths
    }

    pub fn large_atom_threshold(&self) -> Option<usize> {
        self.large_atom_threshold
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

/// A recursive-descent parser over an in-memory input.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    options: Options,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_options(input, Options::default())
    }

    pub fn with_options(input: &'a [u8], options: Options) -> Self {
        Self {
            cursor: Cursor::new(input),
            options,
            depth: 0,
        }
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    delegate! {
        to self.cursor {
            pub fn position(&self) -> Position;
            pub fn at_end(&self) -> bool;
        }
    }

    fn skip_whitespace(&mut self) {
        self.cursor.skip_whitespace(self.options.allow_comments);
    }

    /// Parses the next value, skipping whitespace and comments before it.
    pub fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();

        match Lookahead::of(self.cursor.peek()) {
            Lookahead::OpenList => self.list(),
            Lookahead::CloseList => Err(self.cursor.error(ErrorKind::Syntax, "unexpected ')'")),
            Lookahead::Eof => Err(self
                .cursor
                .error(ErrorKind::UnexpectedEof, "expected a value")),
            Lookahead::Hint
            | Lookahead::Length
            | Lookahead::Quoted
            | Lookahead::Hex
            | Lookahead::Base64
            | Lookahead::Token => Ok(Value::Atom(decode::atom(&mut self.cursor, &self.options)?)),
            Lookahead::Other(b) => Err(self
                .cursor
                .error(ErrorKind::Syntax, format!("unexpected {}", describe(b)))),
        }
    }

    fn list(&mut self) -> Result<Value> {
        if self.depth >= self.options.max_depth {
            return Err(self.cursor.error(
                ErrorKind::DepthLimit,
                format!("lists nested deeper than {}", self.options.max_depth),
            ));
        }

        let open = self.cursor.offset();
        self.cursor.advance();
        self.depth += 1;

        let items = self.items(open);
        self.depth -= 1;
        Ok(Value::List(items?))
    }

    /// Parses list elements through the closing `)`.
    fn items(&mut self, open: usize) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.cursor.peek() {
                Some(b')') => {
                    self.cursor.advance();
                    return Ok(items);
                }
                Some(_) => items.push(self.parse_value()?),
                None => {
                    return Err(self.cursor.error_at(
                        ErrorKind::UnexpectedEof,
                        open,
                        "unclosed list",
                    ))
                }
            }
        }
    }

    /// Parses every remaining value up to the end of input.
    pub fn parse_all(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Ok(values);
            }
            values.push(self.parse_value()?);
        }
    }

    /// Checks that only whitespace and comments remain.
    pub fn finish(mut self) -> Result<()> {
        self.skip_whitespace();
        match self.cursor.peek() {
            None => Ok(()),
            Some(b) => Err(self.cursor.error(
                ErrorKind::TrailingInput,
                format!("unexpected {} after value", describe(b)),
            )),
        }
    }

    /// Iterates over the remaining values. Iteration stops after the first error.
    pub fn into_values(self) -> Values<'a> {
        Values {
            parser: self,
            failed: false,
        }
    }
}

/// Iterator over the top-level values of an input.
#[derive(Debug, Clone)]
pub struct Values<'a> {
    parser: Parser<'a>,
    failed: bool,
}

impl Iterator for Values<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.parser.skip_whitespace();
        if self.parser.at_end() {
            return None;
        }

        let result = self.parser.parse_value();
        self.failed = result.is_err();
        Some(result)
    }
}

impl std::iter::FusedIterator for Values<'_> {}

/// Parse exactly one value. Only whitespace and comments may follow it.
pub fn parse(input: impl AsRef<[u8]>) -> Result<Value> {
    parse_with(input, Options::default())
}

/// Parse exactly one value with the given options.
pub fn parse_with(input: impl AsRef<[u8]>, options: Options) -> Result<Value> {
    let mut parser = Parser::with_options(input.as_ref(), options);
    let value = parser.parse_value()?;
    parser.finish()?;
    Ok(value)
}

/// Parse all top-level values. Empty input yields no values.
pub fn parse_all(input: impl AsRef<[u8]>) -> Result<Vec<Value>> {
    parse_all_with(input, Options::default())
}

/// Parse all top-level values with the given options.
pub fn parse_all_with(input: impl AsRef<[u8]>, options: Options) -> Result<Vec<Value>> {
    let input = input.as_ref();
    let values = Parser::with_options(input, options).parse_all()?;
    log::debug!(
        "parsed {} top-level values from {} bytes",
        values.len(),
        input.len()
    );
    Ok(values)
}

#[cfg(test)]
mod test {
    use super::{parse, parse_all, parse_all_with, parse_with, Options, Parser};
    use crate::error::ErrorKind;
    use crate::value::{Atom, Value};
    use rstest::rstest;

    fn list<const N: usize>(items: [Value; N]) -> Value {
        Value::list(items)
    }

    fn atom(data: &str) -> Value {
        Value::from(data)
    }

    #[test]
    fn test_nested_lists() {
        let value = parse("( () (nested (1:1 2:22 3:333)) )").unwrap();
        let expected = list([
            list([]),
            list([
                atom("nested"),
                list([atom("1"), atom("22"), atom("333")]),
            ]),
        ]);
        assert_eq!(expected, value);
    }

    #[test]
    fn test_comments_are_whitespace() {
        assert_eq!(parse("(a b)").unwrap(), parse("(a ; comment\n b)").unwrap());
        assert_eq!(
            parse("(a b)").unwrap(),
            parse("; leading\n(a\tb) ; trailing").unwrap()
        );
    }

    #[test]
    fn test_equivalent_encodings() {
        let hex = parse("#68656c6c6f#").unwrap();
        let base64 = parse("|aGVsbG8=|").unwrap();
        assert_eq!(atom("hello"), hex);
        assert_eq!(hex, base64);
        assert_eq!(hex, parse("5:hello").unwrap());
        assert_eq!(hex, parse("\"hello\"").unwrap());
    }

    #[test]
    fn test_adjacent_atoms() {
        let value = parse("(a\"b\"#63#|ZA==|1:e)").unwrap();
        assert_eq!(
            list([atom("a"), atom("b"), atom("c"), atom("d"), atom("e")]),
            value
        );
    }

    #[test]
    fn test_display_hint_in_list() {
        let value = parse("(icon [image/png] |iVBORw==|)").unwrap();
        let expected = list([
            atom("icon"),
            Value::Atom(Atom::with_hint("image/png", vec![0x89u8, 0x50, 0x4e, 0x47])),
        ]);
        assert_eq!(expected, value);
    }

    #[test]
    fn test_trailing_input() {
        let err = parse("(a) b").unwrap_err();
        assert_eq!(ErrorKind::TrailingInput, err.kind());
        assert_eq!(4, err.position().offset);

        let values = parse_all("(a) b").unwrap();
        assert_eq!(vec![list([atom("a")]), atom("b")], values);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("; only a comment\n")]
    fn test_empty_input(#[case] input: &str) {
        assert_eq!(Vec::<Value>::new(), parse_all(input).unwrap());
        assert_eq!(ErrorKind::UnexpectedEof, parse(input).unwrap_err().kind());
    }

    #[rstest]
    #[case("(a b", ErrorKind::UnexpectedEof, 0)]
    #[case("((a)", ErrorKind::UnexpectedEof, 0)]
    #[case(")", ErrorKind::Syntax, 0)]
    #[case("(a))", ErrorKind::TrailingInput, 3)]
    #[case("(a {b})", ErrorKind::Syntax, 3)]
    #[case("(a 3:xy", ErrorKind::UnexpectedEof, 5)]
    #[case("(a #1#)", ErrorKind::Syntax, 3)]
    #[case("(a #zz#)", ErrorKind::InvalidEncoding, 4)]
    #[case("(42)", ErrorKind::Syntax, 3)]
    fn test_parse_error(#[case] input: &str, #[case] kind: ErrorKind, #[case] offset: usize) {
        let err = parse(input).unwrap_err();
        assert_eq!(kind, err.kind());
        assert_eq!(offset, err.position().offset);
    }

    #[test]
    fn test_error_line_and_column() {
        let err = parse("(a\n  b\n  \"c\\q\")").unwrap_err();
        let position = err.position();
        assert_eq!(ErrorKind::Syntax, err.kind());
        assert_eq!((3, 5), (position.line, position.column));
    }

    #[test]
    fn test_max_depth() {
        let nested = |depth: usize| format!("{}{}", "(".repeat(depth), ")".repeat(depth));
        let options = Options::default().with_max_depth(3);

        assert!(parse_with(nested(3), options).is_ok());
        let err = parse_with(nested(4), options).unwrap_err();
        assert_eq!(ErrorKind::DepthLimit, err.kind());
        assert_eq!(3, err.position().offset);

        let err = parse(nested(Options::DEFAULT_MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(ErrorKind::DepthLimit, err.kind());
    }

    #[test]
    fn test_depth_restored_after_error() {
        let options = Options::default().with_max_depth(2);
        let mut parser = Parser::with_options(b"(((x)))", options);

        let err = parser.parse_value().unwrap_err();
        assert_eq!(ErrorKind::DepthLimit, err.kind());
        assert_eq!(2, err.position().offset);

        assert_eq!(list([atom("x")]), parser.parse_value().unwrap());
    }

    #[test]
    fn test_comments_disabled() {
        let options = Options::default().with_comments(false);
        let err = parse_all_with("(a) ; note", options).unwrap_err();
        assert_eq!(ErrorKind::Syntax, err.kind());
        assert_eq!(4, err.position().offset);
    }

    #[test]
    fn test_values_iterator() {
        let mut values = Parser::new(b"a (b) #zz# c").into_values();
        assert_eq!(Some(atom("a")), values.next().transpose().unwrap());
        assert_eq!(Some(list([atom("b")])), values.next().transpose().unwrap());
        assert_eq!(
            ErrorKind::InvalidEncoding,
            values.next().unwrap().unwrap_err().kind()
        );
        assert!(values.next().is_none());
    }

    #[test]
    fn test_non_utf8_input() {
        let value = parse(b"(4:\xde\xad\xbe\xef)").unwrap();
        assert_eq!(list([Value::atom(vec![0xdeu8, 0xad, 0xbe, 0xef])]), value);
    }
}
