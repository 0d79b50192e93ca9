use crate::types::PdfValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an indirect object: object number plus generation.
///
/// Number 0 is reserved for the head of the xref free list; real objects
/// are numbered from 1. A freed and reused number comes back with a
/// bumped generation, so the pair is the table key, never the number
/// alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    pub number: u32,
    pub generation: u16,
}

impl ObjectId {
    pub fn new(number: u32, generation: u16) -> Self {
        ObjectId { number, generation }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.generation)
    }
}

/// A pointer into the object table, written `N G R` in the file.
///
/// The handle does not own its target and carries no liveness guarantee;
/// a dangling handle surfaces as an unknown-reference error at resolve
/// time, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PdfReference {
    pub object_number: u32,
    pub generation_number: u16,
}

impl PdfReference {
    pub fn new(object_number: u32, generation_number: u16) -> Self {
        PdfReference {
            object_number,
            generation_number,
        }
    }

    /// The table key this handle points at.
    pub fn id(self) -> ObjectId {
        self.into()
    }
}

impl fmt::Display for PdfReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} R", self.id())
    }
}

/// The single conversion path between handle and identity; `id()` and
/// the `Display` impls go through here.
impl From<PdfReference> for ObjectId {
    fn from(handle: PdfReference) -> Self {
        ObjectId {
            number: handle.object_number,
            generation: handle.generation_number,
        }
    }
}

impl From<ObjectId> for PdfReference {
    fn from(id: ObjectId) -> Self {
        PdfReference {
            object_number: id.number,
            generation_number: id.generation,
        }
    }
}

/// A named object: `N G obj ... endobj`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    pub id: ObjectId,
    pub value: PdfValue,
}

impl IndirectObject {
    pub fn new(id: ObjectId, value: PdfValue) -> Self {
        IndirectObject { id, value }
    }

    pub fn number(&self) -> u32 {
        self.id.number
    }

    pub fn generation(&self) -> u16 {
        self.id.generation
    }
}

impl fmt::Display for IndirectObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} obj {}", self.id, self.value)
    }
}
