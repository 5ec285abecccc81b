use std::convert::Infallible;

use super::{into_text, write_atom, BinaryStyle, Print, Printer};
use crate::value::Atom;

/// A printer that writes the compact single-line form.
struct SimplePrinter {
    needs_whitespace: bool,
    output: Vec<u8>,
    binary: BinaryStyle,
}

impl SimplePrinter {
    pub fn new(binary: BinaryStyle) -> Self {
        Self {
            needs_whitespace: false,
            output: Vec::new(),
            binary,
        }
    }

    #[inline]
    fn separate(&mut self) {
        if self.needs_whitespace {
            self.output.push(b' ');
        }
    }
}

impl Printer for SimplePrinter {
    type Error = Infallible;

    fn atom(&mut self, atom: &Atom) -> Result<(), Self::Error> {
        self.separate();
        self.needs_whitespace = true;
        write_atom(atom, self.binary, &mut self.output);
        Ok(())
    }

    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.separate();
        self.output.push(b'(');
        self.needs_whitespace = false;
        f(self)?;
        self.output.push(b')');
        self.needs_whitespace = true;
        Ok(())
    }
}

/// Print a `T` in the canonical advanced form.
///
/// This function does not produce any line breaks, indentation, or unnecessary
/// whitespace. Binary atoms are written verbatim, so the output is only UTF-8
/// if every atom is; use [`to_string`] where text is required.
pub fn to_vec<T: Print + ?Sized>(value: &T) -> Vec<u8> {
    to_vec_with(value, BinaryStyle::Verbatim)
}

/// Print a `T` in the canonical advanced form with the given binary style.
pub fn to_vec_with<T: Print + ?Sized>(value: &T, binary: BinaryStyle) -> Vec<u8> {
    let mut printer = SimplePrinter::new(binary);
    let _ = value.print(&mut printer);
    log::debug!("printed {} bytes", printer.output.len());
    printer.output
}

/// Print a `T` into an s-expression string.
///
/// Atoms that are neither tokens nor text are written in hexadecimal, or in
/// base64 once they reach [`BinaryStyle::DEFAULT_BASE64_MIN_LEN`] bytes.
/// Where human readability is a concern, consider using the
/// [`to_string_pretty`] function instead.
///
/// [`to_string_pretty`]: `crate::printer::to_string_pretty`
pub fn to_string<T: Print + ?Sized>(value: &T) -> String {
    into_text(to_vec_with(value, BinaryStyle::ENCODED))
}
