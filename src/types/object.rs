use crate::types::{PdfName, PdfValue};
use indexmap::map::{Iter, Keys};
use indexmap::IndexMap;
use std::fmt;
use std::ops::Deref;

/// An ordered sequence of objects. Order is significant.
///
/// Derefs to a slice, so indexing, iteration, `len` and the other slice
/// accessors all come from `[PdfValue]`; the wrapper only adds growth
/// and the PDF written form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfArray {
    elements: Vec<PdfValue>,
}

impl PdfArray {
    pub fn new() -> Self {
        PdfArray::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PdfArray {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: PdfValue) {
        self.elements.push(value);
    }

    pub fn as_slice(&self) -> &[PdfValue] {
        self
    }

    pub fn into_vec(self) -> Vec<PdfValue> {
        self.elements
    }
}

impl Deref for PdfArray {
    type Target = [PdfValue];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

impl From<Vec<PdfValue>> for PdfArray {
    fn from(elements: Vec<PdfValue>) -> Self {
        PdfArray { elements }
    }
}

impl fmt::Display for PdfArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let mut sep = "";
        for element in self.iter() {
            write!(f, "{}{}", sep, element)?;
            sep = " ";
        }
        f.write_str("]")
    }
}

/// A name-keyed mapping with insertion order preserved.
///
/// Keys are unique; writing through an existing key replaces the value,
/// which is how duplicate keys in a written dictionary collapse to the
/// last one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfDictionary {
    entries: IndexMap<PdfName, PdfValue>,
}

impl PdfDictionary {
    pub fn new() -> Self {
        PdfDictionary::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PdfDictionary {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, key: impl Into<PdfName>, value: PdfValue) -> Option<PdfValue> {
        self.entries.insert(key.into(), value)
    }

    /// Looks up by bare name; a leading slash on `key` is accepted and
    /// ignored. Names hash by their bare text, so no `PdfName` is built
    /// for the probe.
    pub fn get(&self, key: &str) -> Option<&PdfValue> {
        self.entries.get(key.strip_prefix('/').unwrap_or(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, PdfName, PdfValue> {
        self.entries.iter()
    }

    pub fn keys(&self) -> Keys<'_, PdfName, PdfValue> {
        self.entries.keys()
    }

    /// The `/Type` entry, when present and a name.
    pub fn type_name(&self) -> Option<&PdfName> {
        self.get("Type")?.as_name()
    }
}

impl fmt::Display for PdfDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<<")?;
        for (key, value) in self.iter() {
            write!(f, " {} {}", key, value)?;
        }
        f.write_str(" >>")
    }
}
