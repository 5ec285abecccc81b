//! Reading and writing s-expressions through `std::io`.
//!
//! These wrappers buffer the whole input before parsing, so parse errors are
//! exactly those of the in-memory functions.
use std::io::{self, Read, Write};

use crate::error::ParseError;
use crate::parser::{parse, parse_all};
use crate::printer::{to_vec, Print};
use crate::value::Value;

/// An error while reading an s-expression from a stream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

fn read_to_end(mut reader: impl Read) -> Result<Vec<u8>, Error> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    log::debug!("read {} bytes of input", input.len());
    Ok(input)
}

/// Read a single value from `reader`.
pub fn from_reader(reader: impl Read) -> Result<Value, Error> {
    Ok(parse(read_to_end(reader)?)?)
}

/// Read every top-level value from `reader`.
pub fn from_reader_all(reader: impl Read) -> Result<Vec<Value>, Error> {
    Ok(parse_all(read_to_end(reader)?)?)
}

/// Write the canonical advanced form of `value` to `writer`.
pub fn to_writer<T: Print + ?Sized>(mut writer: impl Write, value: &T) -> io::Result<()> {
    writer.write_all(&to_vec(value))
}

#[cfg(test)]
mod test {
    use super::{from_reader, from_reader_all, to_writer, Error};
    use crate::error::ErrorKind;
    use crate::parse_all;
    use std::io::{self, Read};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_round_trip_through_io() {
        let values = parse_all("(a #ff#) [text/plain]\"b c\"").unwrap();
        let mut output = Vec::new();
        to_writer(&mut output, &values).unwrap();
        assert_eq!(values, from_reader_all(output.as_slice()).unwrap());
    }

    #[test]
    fn test_parse_errors_pass_through() {
        let err = from_reader("(a) b".as_bytes()).unwrap_err();
        match err {
            Error::Parse(err) => {
                assert_eq!(ErrorKind::TrailingInput, err.kind());
                assert_eq!(4, err.position().offset);
            }
            Error::Io(err) => panic!("unexpected io error: {err}"),
        }
    }

    #[test]
    fn test_io_errors() {
        assert!(matches!(from_reader(FailingReader), Err(Error::Io(_))));
    }
}
