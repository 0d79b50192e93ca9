use serde::{Deserialize, Serialize};
use std::fmt;

/// A PDF name object, e.g. `/Type`.
///
/// The leading slash is syntax, not part of the name's value; it is
/// stripped on construction and re-added only by `Display`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PdfName(String);

impl PdfName {
    pub fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        match name.strip_prefix('/') {
            Some(bare) => PdfName(bare.to_string()),
            None => PdfName(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PdfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl From<&str> for PdfName {
    fn from(s: &str) -> Self {
        PdfName::new(s)
    }
}

impl From<String> for PdfName {
    fn from(s: String) -> Self {
        PdfName::new(s)
    }
}

impl PartialEq<str> for PdfName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PdfName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl AsRef<str> for PdfName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Names are stored slash-less, so they hash and compare exactly like
/// their bare text; dictionaries rely on this to probe with `&str` keys.
impl std::borrow::Borrow<str> for PdfName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A PDF string object.
///
/// PDF strings are 8-bit-clean byte payloads; they are never assumed to be
/// UTF-8. The variant records which written form produced the bytes, the
/// decoded payload is comparable either way.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub enum PdfString {
    Literal(Vec<u8>),
    Hexadecimal(Vec<u8>),
}

impl PdfString {
    pub fn new_literal<B: Into<Vec<u8>>>(bytes: B) -> Self {
        PdfString::Literal(bytes.into())
    }

    pub fn new_hex<B: Into<Vec<u8>>>(bytes: B) -> Self {
        PdfString::Hexadecimal(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PdfString::Literal(b) | PdfString::Hexadecimal(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Lossy text rendering, for diagnostics only.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

/// Equality is over the decoded payload; the written form does not matter.
impl PartialEq for PdfString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Display for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfString::Literal(bytes) => {
                write!(f, "({})", String::from_utf8_lossy(bytes))
            }
            PdfString::Hexadecimal(bytes) => {
                write!(f, "<")?;
                for byte in bytes {
                    write!(f, "{:02X}", byte)?;
                }
                write!(f, ">")
            }
        }
    }
}

impl From<&str> for PdfString {
    fn from(s: &str) -> Self {
        PdfString::new_literal(s.as_bytes())
    }
}

impl From<Vec<u8>> for PdfString {
    fn from(bytes: Vec<u8>) -> Self {
        PdfString::new_literal(bytes)
    }
}
