use std::convert::Infallible;

use super::{into_text, write_atom, BinaryStyle, Print, Printer};
use crate::value::Atom;
use pretty::DocAllocator as _;

/// A pretty printer that uses the `pretty` crate to format the output.
struct PrettyPrinter<'a> {
    arena: &'a pretty::Arena<'a>,
    items: Vec<pretty::DocBuilder<'a, pretty::Arena<'a>>>,
    indent: isize,
}

impl<'a> Printer for PrettyPrinter<'a> {
    type Error = Infallible;

    fn atom(&mut self, atom: &Atom) -> Result<(), Self::Error> {
        let mut output = Vec::new();
        write_atom(atom, BinaryStyle::ENCODED, &mut output);
        let doc = self.arena.text(into_text(output));
        self.items.push(doc);
        Ok(())
    }

    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        let position = self.items.len();
        f(self)?;
        let items = self.items.drain(position..);

        let docs = self
            .arena
            .intersperse(items, self.arena.line())
            .nest(self.indent)
            .group();

        self.items.push(
            self.arena
                .text("(")
                .append(docs)
                .append(self.arena.text(")")),
        );

        Ok(())
    }
}

/// Pretty print a `T` into an s-expression string.
///
/// Lists that fit within `width` columns stay on one line; longer lists put
/// each element on its own line, aligned one column past the opening
/// parenthesis. Binary atoms are encoded as in [`to_string`], and top-level
/// values are separated by blank lines.
///
/// [`to_string`]: `crate::printer::to_string`
pub fn to_string_pretty<T: Print + ?Sized>(value: &T, width: usize) -> String {
    to_string_pretty_indent(value, width, 1)
}

/// Like [`to_string_pretty`], but indents the elements of a broken list by
/// `indent` columns relative to its opening parenthesis.
pub fn to_string_pretty_indent<T: Print + ?Sized>(
    value: &T,
    width: usize,
    indent: usize,
) -> String {
    let arena = pretty::Arena::new();
    let mut printer = PrettyPrinter {
        items: vec![],
        arena: &arena,
        indent: isize::try_from(indent).unwrap_or(isize::MAX),
    };

    let _ = value.print(&mut printer);

    let double_line = arena.hardline().append(arena.hardline());
    let doc = arena.intersperse(printer.items, double_line);

    let mut string = String::new();
    let _ = doc.render_fmt(width, &mut string);
    string
}

#[cfg(test)]
mod test {
    use super::{to_string_pretty, to_string_pretty_indent};
    use crate::{parse, parse_all};
    use rstest::rstest;

    #[test]
    fn test_fits_on_one_line() {
        let value = parse("(key (rsa (e #010001#) (n |AQAB|)))").unwrap();
        assert_eq!(
            "(key (rsa (e #010001#) (n #010001#)))",
            to_string_pretty(&value, 80)
        );
    }

    #[test]
    fn test_breaks_long_lists() {
        let value = parse("(public-key (rsa (e \"3\") (n \"two words\")))").unwrap();
        let expected = "(public-key\n (rsa\n  (e \"3\")\n  (n \"two words\")))";
        assert_eq!(expected, to_string_pretty(&value, 20));
        assert_eq!(value, parse(expected).unwrap());
    }

    #[rstest]
    #[case(0, "(public-key\n(rsa\n(e \"3\")\n(n \"two words\")))")]
    #[case(2, "(public-key\n  (rsa\n    (e \"3\")\n    (n \"two words\")))")]
    fn test_indent(#[case] indent: usize, #[case] expected: &str) {
        let value = parse("(public-key (rsa (e \"3\") (n \"two words\")))").unwrap();
        assert_eq!(expected, to_string_pretty_indent(&value, 24, indent));
        assert_eq!(value, parse(expected).unwrap());
    }

    #[test]
    fn test_top_level_values() {
        let values = parse_all("a (b c)").unwrap();
        assert_eq!("a\n\n(b c)", to_string_pretty(&values, 80));
    }
}
