use std::fmt::{self, Display};
use std::str::{FromStr, Utf8Error};

use proptest::arbitrary::Arbitrary;

use crate::error::ParseError;
use crate::printer::{Print, Printer};

/// A leaf of an s-expression: a byte string with an optional display hint.
///
/// The display hint is the `[hint]` prefix of the advanced transport syntax,
/// conventionally a MIME type. It is kept as metadata of the atom and takes
/// part in equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    hint: Option<Vec<u8>>,
    data: Vec<u8>,
}

impl Atom {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            hint: None,
            data: data.into(),
        }
    }

    pub fn with_hint(hint: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            hint: Some(hint.into()),
            data: data.into(),
        }
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn hint(&self) -> Option<&[u8]> {
        self.hint.as_deref()
    }

    /// The content as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// The content as text, failing on invalid UTF-8.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl Print for Atom {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.atom(self)
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&[u8]> for Atom {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for Atom {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

/// An s-expression represented as a recursive enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Atom(Atom),
    List(Vec<Value>),
}

impl Value {
    /// An atom without display hint.
    pub fn atom(data: impl Into<Vec<u8>>) -> Self {
        Self::Atom(Atom::new(data))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Value::Atom(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Value::Atom(atom) => Some(atom),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::Atom(_) => None,
            Value::List(items) => Some(items),
        }
    }
}

impl Print for Value {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        match self {
            Value::Atom(atom) => printer.atom(atom),
            Value::List(items) => printer.list(|printer| printer.print(items)),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::to_string(self))
    }
}

impl FromStr for Value {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse(s)
    }
}

impl From<Atom> for Value {
    fn from(value: Atom) -> Self {
        Self::Atom(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::atom(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::atom(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::atom(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::atom(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl Arbitrary for Atom {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        // Mix in token-shaped and textual content so every encoding is exercised.
        let data = prop_oneof![
            proptest::collection::vec(any::<u8>(), 0..64),
            "[a-z*/][a-z0-9./_:*+=-]{0,12}".prop_map(String::into_bytes),
            any::<String>().prop_map(String::into_bytes),
        ];
        let hint = proptest::option::weighted(
            0.2,
            "[a-z]{1,8}/[a-z0-9.+-]{1,12}".prop_map(String::into_bytes),
        );

        (hint, data)
            .prop_map(|(hint, data)| Atom { hint, data })
            .boxed()
    }
}

impl Arbitrary for Value {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        let leaf = any::<Atom>().prop_map(Value::Atom);
        leaf.prop_recursive(8, 256, 10, |inner| {
            proptest::collection::vec(inner, 0..10).prop_map(Value::List)
        })
        .boxed()
    }
}
