use crate::types::{PdfDictionary, PdfValue};
use std::fmt;

/// A stream object: a dictionary describing a raw byte payload.
///
/// The payload is the exact byte slice between the end-of-line after the
/// `stream` keyword and the `endstream` sentinel. No filter is applied;
/// decoding `/Filter` chains is a collaborator's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStream {
    pub dict: PdfDictionary,
    data: Vec<u8>,
}

impl PdfStream {
    pub fn new(dict: PdfDictionary, data: Vec<u8>) -> Self {
        PdfStream { dict, data }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The `/Length` entry, when present and a direct integer. An indirect
    /// `/Length` comes back as `None`; the parser falls back to the
    /// `endstream` sentinel scan for those.
    pub fn declared_length(&self) -> Option<i64> {
        self.dict.get("Length").and_then(PdfValue::as_integer)
    }

    /// The `/Filter` entry as written: a name, an array of names, absent.
    pub fn filter(&self) -> Option<&PdfValue> {
        self.dict.get("Filter")
    }
}

impl fmt::Display for PdfStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stream[{} bytes]", self.dict, self.data.len())
    }
}
