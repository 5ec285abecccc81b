//! Strategies that write a [`Value`] in any of its valid spellings.
//!
//! Printing always produces one canonical text. The strategies here cover the
//! rest of the grammar: every atom encoding, advisory length prefixes, escapes
//! in quoted strings, whitespace inside hexadecimal and base64 bodies, and
//! comments between elements. Every generated text parses back to the value it
//! was built from.
use base64::Engine as _;
use proptest::prelude::*;
use proptest::sample::select;
use proptest::strategy::Union;

use crate::escape::is_token;
use crate::value::{Atom, Value};

/// Separators between list elements. Never empty, so adjacent tokens stay apart.
const SEPARATORS: &[&str] = &[" ", "  ", "\n", "\t", "\r\n", " \x0b\x0c ", " ; note\n", "\n;\n"];

/// Whitespace allowed inside hexadecimal and base64 bodies.
const GAPS: &[&str] = &["", "", "", " ", "\n", "\t"];

/// Text for `value`, with optional leading and trailing whitespace or comments.
pub fn spellings(value: &Value) -> BoxedStrategy<Vec<u8>> {
    let around = prop_oneof![Just(""), select(SEPARATORS)];
    (around.clone(), value_spelling(value), around)
        .prop_map(|(before, body, after)| concat([before.as_bytes(), &body, after.as_bytes()]))
        .boxed()
}

fn value_spelling(value: &Value) -> BoxedStrategy<Vec<u8>> {
    match value {
        Value::Atom(atom) => atom_spelling(atom),
        Value::List(items) => {
            let items: Vec<_> = items.iter().map(value_spelling).collect();
            let separators = proptest::collection::vec(select(SEPARATORS), items.len() + 1);
            (items, separators)
                .prop_map(|(items, separators)| {
                    let mut output = vec![b'('];
                    for (separator, item) in separators.iter().zip(&items) {
                        output.extend_from_slice(separator.as_bytes());
                        output.extend_from_slice(item);
                    }
                    if let Some(last) = separators.last() {
                        output.extend_from_slice(last.as_bytes());
                    }
                    output.push(b')');
                    output
                })
                .boxed()
        }
    }
}

fn atom_spelling(atom: &Atom) -> BoxedStrategy<Vec<u8>> {
    let data = bytes_spelling(atom.data());
    let Some(hint) = atom.hint() else {
        return data;
    };

    let gap = select(SEPARATORS);
    (bytes_spelling(hint), data, gap.clone(), gap)
        .prop_map(|(hint, data, inner, outer)| {
            concat([b"[", inner.as_bytes(), &hint, b"]", outer.as_bytes(), &data])
        })
        .boxed()
}

/// Every encoding that can carry `data`.
fn bytes_spelling(data: &[u8]) -> BoxedStrategy<Vec<u8>> {
    let mut verbatim = format!("{}:", data.len()).into_bytes();
    verbatim.extend_from_slice(data);

    let mut choices = vec![
        Just(verbatim).boxed(),
        with_length(data.len(), hex_spelling(data)),
        with_length(data.len(), base64_spelling(data)),
        with_length(data.len(), quoted_spelling(data)),
    ];
    if is_token(data) {
        choices.push(Just(data.to_vec()).boxed());
    }

    Union::new(choices).boxed()
}

/// Optionally prefixes `body` with its decoded length.
fn with_length(length: usize, body: BoxedStrategy<Vec<u8>>) -> BoxedStrategy<Vec<u8>> {
    (any::<bool>(), body)
        .prop_map(move |(prefixed, body)| match prefixed {
            true => concat([length.to_string().as_bytes(), &body]),
            false => body,
        })
        .boxed()
}

fn hex_spelling(data: &[u8]) -> BoxedStrategy<Vec<u8>> {
    let lower = hex::encode(data);
    let upper = hex::encode_upper(data);
    let gaps = proptest::collection::vec(select(GAPS), lower.len() + 1);

    (any::<bool>(), gaps)
        .prop_map(move |(uppercase, gaps)| {
            let digits = if uppercase { &upper } else { &lower };
            delimited(b'#', digits, &gaps)
        })
        .boxed()
}

fn base64_spelling(data: &[u8]) -> BoxedStrategy<Vec<u8>> {
    let chars = base64::engine::general_purpose::STANDARD.encode(data);
    let gaps = proptest::collection::vec(select(GAPS), chars.len() + 1);
    gaps.prop_map(move |gaps| delimited(b'|', &chars, &gaps)).boxed()
}

/// Interleaves `gaps` with the characters of `body` inside `delimiter`s.
fn delimited(delimiter: u8, body: &str, gaps: &[&str]) -> Vec<u8> {
    let mut output = vec![delimiter];
    for (gap, c) in gaps.iter().zip(body.bytes()) {
        output.extend_from_slice(gap.as_bytes());
        output.push(c);
    }
    if let Some(last) = gaps.last() {
        output.extend_from_slice(last.as_bytes());
    }
    output.push(delimiter);
    output
}

/// How one byte of a quoted string is written.
#[derive(Debug, Clone, Copy)]
enum Escape {
    Literal,
    Octal,
    Hex,
}

fn quoted_spelling(data: &[u8]) -> BoxedStrategy<Vec<u8>> {
    let data = data.to_vec();
    let escape = prop_oneof![Just(Escape::Literal), Just(Escape::Octal), Just(Escape::Hex)];
    let continuation = prop_oneof![
        8 => Just(""),
        1 => Just("\\\n"),
        1 => Just("\\\r\n"),
    ];
    let choices = proptest::collection::vec((escape, continuation), data.len());

    choices
        .prop_map(move |choices| {
            let mut output = vec![b'"'];
            for (&b, (escape, continuation)) in data.iter().zip(choices) {
                output.extend_from_slice(continuation.as_bytes());
                match escape {
                    Escape::Literal if is_plain(b) => output.push(b),
                    Escape::Octal => output.extend_from_slice(format!("\\{b:03o}").as_bytes()),
                    Escape::Literal | Escape::Hex => {
                        output.extend_from_slice(format!("\\x{b:02x}").as_bytes())
                    }
                }
            }
            output.push(b'"');
            output
        })
        .boxed()
}

/// Bytes a quoted string may carry without an escape.
fn is_plain(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7e) && byte != b'"' && byte != b'\\'
}

fn concat<const N: usize>(parts: [&[u8]; N]) -> Vec<u8> {
    parts.concat()
}

#[cfg(test)]
mod test {
    use super::spellings;
    use crate::parser::{parse, parse_with, Options};
    use crate::printer::to_vec;
    use crate::value::Value;
    use proptest::prelude::*;

    fn value_and_spelling() -> impl Strategy<Value = (Value, Vec<u8>)> {
        any::<Value>().prop_flat_map(|value| {
            let text = spellings(&value);
            (Just(value), text)
        })
    }

    proptest! {
        #[test]
        fn parse_any_spelling((value, text) in value_and_spelling()) {
            let parsed = parse(&text).unwrap();
            prop_assert_eq!(&value, &parsed);
            prop_assert_eq!(to_vec(&value), to_vec(&parsed));
        }

        #[test]
        fn advisory_lengths_are_exact((value, text) in value_and_spelling()) {
            let options = Options::default().with_strict_lengths(true);
            prop_assert_eq!(&value, &parse_with(&text, options).unwrap());
        }
    }

    #[test]
    fn test_octal_escape_before_digit() {
        assert_eq!(Value::from("A7"), parse("\"\\1017\"").unwrap());
        assert_eq!(Value::from("A7"), parse("\"\\x417\"").unwrap());
    }
}
