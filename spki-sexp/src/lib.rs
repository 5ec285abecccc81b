//! SPKI s-expressions as a data format.
//!
//! # Syntax
//!
//! This crate implements the advanced transport representation of the
//! s-expressions described in [RFC 9804]. An s-expression is either an atom or
//! a list:
//!
//! - **Lists** are sequences of values, delimited on the outside by `(` and `)`
//!   and separated by optional whitespace.
//!
//! - **Atoms** are byte strings, written in one of five encodings:
//!
//!    - *verbatim*: `5:hello`, a decimal length, a colon and exactly that many raw bytes.
//!    - *quoted string*: `"hello\n"`, printable ASCII with the escapes `\b \t \v \n \f \r
//!      \" \' \\ \?`, `\ddd` (octal), `\xHH` (hexadecimal) and backslash-newline
//!      line continuations.
//!    - *hexadecimal*: `#68656c6c6f#`, pairs of hex digits, optionally separated by whitespace.
//!    - *base64*: `|aGVsbG8=|`, base64 with whitespace allowed between characters.
//!    - *token*: `hello`, letters, digits and `- . / _ : * + =`, not starting with a digit.
//!
//!   Quoted, hexadecimal and base64 atoms may carry a decimal length prefix
//!   (`5"hello"`). An atom may be preceded by a display hint in brackets, as in
//!   `[text/plain]hello`; the hint is kept on the [`Atom`].
//!
//! - **Comments** begin with a `;` and extend to the end of the line.
//!
//! Printing chooses the shortest of these forms that reads back to the same
//! bytes; see [`printer`].
//!
//! [RFC 9804]: https://www.rfc-editor.org/rfc/rfc9804

pub(crate) mod cursor;
pub(crate) mod decode;
pub mod error;
pub(crate) mod escape;
pub mod parser;
pub mod printer;
pub mod spelling;
pub mod stream;
pub mod value;

pub use error::{ErrorKind, ParseError, Position};
pub use parser::{parse, parse_all, parse_all_with, parse_with, Options, Parser};
pub use printer::{
    to_string, to_string_pretty, to_string_pretty_indent, to_vec, to_vec_with, BinaryStyle,
};
pub use value::{Atom, Value};
