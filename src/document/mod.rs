//! The parsed document: object table, trailers and version.

pub mod page;

use crate::constants::pdf_version;
use crate::error::{PdfError, PdfResult, StructuralErrorKind};
use crate::parser::resolver::ObjectResolver;
use crate::parser::xref::XRefTable;
use crate::types::{
    IndirectObject, ObjectId, PdfDictionary, PdfReference, PdfString, PdfValue,
};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use page::{Contents, Page, PageTreeBuilder, Rect, Resources};

/// The file header version, e.g. `1.7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl PdfVersion {
    pub fn new(major: u8, minor: u8) -> Self {
        PdfVersion { major, minor }
    }

    /// Parses `"M.N"`. Unparseable digits fall back to the default with a
    /// warning rather than failing the whole document.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.splitn(2, '.');
        let major = parts.next().and_then(|p| p.parse().ok());
        let minor = parts.next().and_then(|p| p.parse().ok());
        match (major, minor) {
            (Some(major), Some(minor)) => PdfVersion { major, minor },
            _ => {
                warn!("unparseable version {:?}, assuming default", text);
                PdfVersion {
                    major: pdf_version::DEFAULT_MAJOR,
                    minor: pdf_version::DEFAULT_MINOR,
                }
            }
        }
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// All indirect objects of the file, keyed by `(number, generation)`.
///
/// Append-only during parsing. A later definition with the same key
/// shadows the earlier one (incremental updates); definitions with a
/// different generation stay addressable by their exact key.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    entries: IndexMap<ObjectId, IndirectObject>,
}

impl ObjectTable {
    pub fn new() -> Self {
        ObjectTable {
            entries: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, object: IndirectObject) -> Option<IndirectObject> {
        let shadowed = self.entries.insert(object.id, object);
        if let Some(ref old) = shadowed {
            debug!("object {} shadowed by a later definition", old.id);
        }
        shadowed
    }

    pub fn get(&self, id: &ObjectId) -> Option<&IndirectObject> {
        self.entries.get(id)
    }

    pub fn get_pair(&self, number: u32, generation: u16) -> Option<&IndirectObject> {
        self.get(&ObjectId::new(number, generation))
    }

    /// The definition with the highest generation for an object number.
    pub fn latest(&self, number: u32) -> Option<&IndirectObject> {
        self.entries
            .values()
            .filter(|object| object.id.number == number)
            .max_by_key(|object| object.id.generation)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in file order of first definition.
    pub fn iter(&self) -> impl Iterator<Item = &IndirectObject> {
        self.entries.values()
    }
}

/// One trailer record, in file order. The last-written trailer is the
/// authoritative head; `prev` points backward through prior revisions.
#[derive(Debug, Clone)]
pub struct Trailer {
    pub size: u32,
    pub root: PdfReference,
    pub info: Option<PdfReference>,
    pub id: Option<[PdfString; 2]>,
    pub encrypt: Option<PdfValue>,
    pub prev: Option<u64>,
    /// The integer after `startxref`; diagnostic only.
    pub startxref: Option<u64>,
    pub raw: PdfDictionary,
}

impl Trailer {
    pub(crate) fn from_dict(raw: PdfDictionary, startxref: Option<u64>) -> PdfResult<Self> {
        let size = raw
            .get("Size")
            .and_then(PdfValue::as_integer)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                PdfError::structural(StructuralErrorKind::MissingTrailerKey("Size"))
            })?;
        let root = raw
            .get("Root")
            .and_then(PdfValue::as_reference)
            .copied()
            .ok_or_else(|| {
                PdfError::structural(StructuralErrorKind::MissingTrailerKey("Root"))
            })?;
        let info = raw.get("Info").and_then(PdfValue::as_reference).copied();
        let prev = raw
            .get("Prev")
            .and_then(PdfValue::as_integer)
            .and_then(|v| u64::try_from(v).ok());
        let encrypt = raw.get("Encrypt").cloned();
        let id = raw.get("ID").and_then(PdfValue::as_array).and_then(|array| {
            let first = array.get(0)?.as_string()?.clone();
            let second = array.get(1)?.as_string()?.clone();
            Some([first, second])
        });

        Ok(Trailer {
            size,
            root,
            info,
            id,
            encrypt,
            prev,
            startxref,
            raw,
        })
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypt.is_some()
    }
}

/// The result of a parse: everything the file declares, immutable.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    version: PdfVersion,
    objects: ObjectTable,
    xref: XRefTable,
    trailers: Vec<Trailer>,
}

impl PdfDocument {
    pub(crate) fn new(
        version: PdfVersion,
        objects: ObjectTable,
        xref: XRefTable,
        trailers: Vec<Trailer>,
    ) -> Self {
        debug_assert!(!trailers.is_empty());
        PdfDocument {
            version,
            objects,
            xref,
            trailers,
        }
    }

    /// The header version. The catalog may override it upward, see
    /// [`effective_version`](Self::effective_version).
    pub fn version(&self) -> PdfVersion {
        self.version
    }

    /// The authoritative head trailer (the last one written).
    pub fn trailer(&self) -> &Trailer {
        self.trailers
            .last()
            .expect("a parsed document always carries at least one trailer")
    }

    /// Every trailer, in file order.
    pub fn trailers(&self) -> &[Trailer] {
        &self.trailers
    }

    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    pub fn xref(&self) -> &XRefTable {
        &self.xref
    }

    /// A fresh resolver over this document's object table. Resolvers
    /// carry their own cache; make one per consumer.
    pub fn resolver(&self) -> ObjectResolver<'_> {
        ObjectResolver::new(&self.objects)
    }

    /// The catalog dictionary behind the head trailer's `Root`.
    pub fn catalog(&self, resolver: &mut ObjectResolver<'_>) -> PdfResult<PdfDictionary> {
        let root = self.trailer().root;
        let object = resolver.resolve_shallow(&root)?;
        object
            .value
            .as_dict()
            .cloned()
            .ok_or_else(|| PdfError::PageStructure("document root is not a dictionary".into()))
    }

    /// The document information dictionary, when the trailer names one.
    pub fn info_dict(
        &self,
        resolver: &mut ObjectResolver<'_>,
    ) -> PdfResult<Option<PdfDictionary>> {
        let Some(info) = self.trailer().info else {
            return Ok(None);
        };
        let object = resolver.resolve_shallow(&info)?;
        Ok(object.value.as_dict().cloned())
    }

    /// The header version, overridden by a later catalog `/Version`.
    pub fn effective_version(&self, resolver: &mut ObjectResolver<'_>) -> PdfVersion {
        let catalog_version = self
            .catalog(resolver)
            .ok()
            .and_then(|catalog| catalog.get("Version").and_then(|v| v.as_name().cloned()))
            .map(|name| PdfVersion::parse(name.as_str()));
        match catalog_version {
            Some(v) if (v.major, v.minor) > (self.version.major, self.version.minor) => v,
            _ => self.version,
        }
    }

    /// Walks the page tree into ordered page records.
    pub fn pages(&self) -> PdfResult<Vec<Page>> {
        let mut resolver = self.resolver();
        PageTreeBuilder::new(self, &mut resolver).build()
    }
}
