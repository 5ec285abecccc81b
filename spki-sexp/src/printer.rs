//! Print values into the advanced transport representation.
//!
//! Every atom is written in the shortest form that reads back unchanged:
//!
//! 1. a bare token, when the content is token characters not starting with a digit;
//! 2. a quoted string, when the content is text without stray control characters;
//! 3. otherwise as binary, in the form selected by [`BinaryStyle`].
//!
//! A display hint is written in brackets before the content, encoded by the same rules.
use base64::Engine as _;
use std::rc::Rc;
use std::sync::Arc;

use crate::escape::{escape_quoted, is_quotable, is_token};
use crate::value::Atom;

mod pretty;
mod simple;
pub use pretty::{to_string_pretty, to_string_pretty_indent};
pub use simple::{to_string, to_vec, to_vec_with};

/// Trait for types that can print s-expressions.
pub trait Printer: Sized {
    type Error;

    /// Print an atom.
    fn atom(&mut self, atom: &Atom) -> Result<(), Self::Error>;

    /// Print a list given a function that prints the contents.
    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Print a printable value.
    fn print(&mut self, value: impl Print) -> Result<(), Self::Error> {
        value.print(self)
    }
}

/// Trait for types that can be printed as an s-expression.
pub trait Print {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error>;
}

impl<T: Print + ?Sized> Print for &T {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        (**self).print(printer)
    }
}

impl<T: Print + ?Sized> Print for Box<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print + ?Sized> Print for Rc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print + ?Sized> Print for Arc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print> Print for [T] {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        for item in self {
            printer.print(item)?;
        }
        Ok(())
    }
}

impl<T: Print> Print for Vec<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_slice())
    }
}

/// Form of atoms that are neither tokens nor quotable text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BinaryStyle {
    /// Length-prefixed raw octets, such as `3:abc`. The output may not be UTF-8.
    #[default]
    Verbatim,
    /// Hexadecimal below `base64_min_len` bytes, base64 from there on.
    Encoded { base64_min_len: usize },
}

impl BinaryStyle {
    /// Default size from which encoded binary atoms switch to base64.
    pub const DEFAULT_BASE64_MIN_LEN: usize = 48;

    /// The encoded style with the default base64 threshold.
    pub const ENCODED: BinaryStyle = BinaryStyle::Encoded {
        base64_min_len: Self::DEFAULT_BASE64_MIN_LEN,
    };
}

/// The encoding chosen for a single simple string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    Token,
    Quoted,
    Verbatim,
    Hex,
    Base64,
}

impl Encoding {
    pub(crate) fn choose(data: &[u8], binary: BinaryStyle) -> Self {
        if is_token(data) {
            Encoding::Token
        } else if is_quotable(data) {
            Encoding::Quoted
        } else {
            match binary {
                BinaryStyle::Verbatim => Encoding::Verbatim,
                BinaryStyle::Encoded { base64_min_len } if data.len() >= base64_min_len => {
                    Encoding::Base64
                }
                BinaryStyle::Encoded { .. } => Encoding::Hex,
            }
        }
    }
}

/// Writes one simple string in its chosen encoding.
pub(crate) fn write_simple(data: &[u8], binary: BinaryStyle, output: &mut Vec<u8>) {
    let encoding = Encoding::choose(data, binary);
    log::trace!("writing {} byte atom as {encoding:?}", data.len());

    match encoding {
        Encoding::Token => output.extend_from_slice(data),
        Encoding::Quoted => escape_quoted(data, output),
        Encoding::Verbatim => {
            output.extend_from_slice(data.len().to_string().as_bytes());
            output.push(b':');
            output.extend_from_slice(data);
        }
        Encoding::Hex => {
            output.push(b'#');
            output.extend_from_slice(hex::encode(data).as_bytes());
            output.push(b'#');
        }
        Encoding::Base64 => {
            output.push(b'|');
            output.extend_from_slice(
                base64::engine::general_purpose::STANDARD
                    .encode(data)
                    .as_bytes(),
            );
            output.push(b'|');
        }
    }
}

/// Writes an atom with its display hint.
pub(crate) fn write_atom(atom: &Atom, binary: BinaryStyle, output: &mut Vec<u8>) {
    if let Some(hint) = atom.hint() {
        output.push(b'[');
        write_simple(hint, binary, output);
        output.push(b']');
    }
    write_simple(atom.data(), binary, output);
}

/// Converts printer output to a string.
///
/// Output written with [`BinaryStyle::Encoded`] is always UTF-8.
pub(crate) fn into_text(output: Vec<u8>) -> String {
    String::from_utf8(output)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

#[cfg(test)]
mod test {
    use super::{write_atom, BinaryStyle, Encoding};
    use crate::value::Atom;
    use rstest::rstest;

    #[rstest]
    #[case(b"hello-world", Encoding::Token)]
    #[case(b"hello world", Encoding::Quoted)]
    #[case(b"", Encoding::Quoted)]
    #[case(b"123", Encoding::Quoted)]
    #[case(b"nul\x00", Encoding::Verbatim)]
    #[case(b"\xff", Encoding::Verbatim)]
    fn test_choose_verbatim(#[case] data: &[u8], #[case] expected: Encoding) {
        assert_eq!(expected, Encoding::choose(data, BinaryStyle::Verbatim));
    }

    #[test]
    fn test_choose_encoded() {
        let style = BinaryStyle::Encoded { base64_min_len: 4 };
        assert_eq!(Encoding::Hex, Encoding::choose(b"\xff\xfe\xfd", style));
        assert_eq!(Encoding::Base64, Encoding::choose(b"\xff\xfe\xfd\xfc", style));
        assert_eq!(Encoding::Token, Encoding::choose(b"abcd", style));
    }

    #[rstest]
    #[case(Atom::new("hello"), BinaryStyle::Verbatim, "hello")]
    #[case(Atom::new(""), BinaryStyle::Verbatim, r#""""#)]
    #[case(Atom::new("2 words"), BinaryStyle::Verbatim, r#""2 words""#)]
    #[case(Atom::new(vec![0u8, 1]), BinaryStyle::Verbatim, "2:\x00\x01")]
    #[case(Atom::new(vec![0u8, 1]), BinaryStyle::ENCODED, "#0001#")]
    #[case(Atom::new(vec![0u8; 48]), BinaryStyle::ENCODED, "|AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA|")]
    #[case(Atom::with_hint("text/plain", "hi"), BinaryStyle::Verbatim, "[text/plain]hi")]
    #[case(Atom::with_hint("a b", vec![0xffu8]), BinaryStyle::ENCODED, r#"["a b"]#ff#"#)]
    fn test_write_atom(#[case] atom: Atom, #[case] style: BinaryStyle, #[case] expected: &str) {
        let mut output = Vec::new();
        write_atom(&atom, style, &mut output);
        assert_eq!(expected.as_bytes(), output);
    }
}
