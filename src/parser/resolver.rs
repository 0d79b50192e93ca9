//! Reference resolution over the object table.
//!
//! The resolver is the only component that follows references. It holds a
//! non-owning view of the table plus a memo cache of deep resolutions; it
//! is deliberately not shareable across threads, make one per consumer.

use crate::document::ObjectTable;
use crate::error::{PdfError, PdfResult};
use crate::types::{
    IndirectObject, ObjectId, PdfArray, PdfDictionary, PdfReference, PdfStream, PdfValue,
};
use std::collections::{HashMap, HashSet};

/// How far to follow nested references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// The table entry verbatim; nested references stay handles.
    Shallow,
    /// Every reachable reference replaced by its resolved object.
    Deep,
}

/// What to do when deep resolution re-enters an object already on the
/// resolve stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnCycle {
    /// Break the cycle by placing the raw, not-further-resolved table
    /// entry in the tree.
    #[default]
    Silent,
    /// Raise `CircularReference` on the cycle's closing edge.
    Error,
}

#[derive(Debug, Clone)]
struct CachedResolution {
    object: IndirectObject,
    /// The cached tree contains a stub frontier somewhere, so it cannot
    /// answer an `OnCycle::Error` request.
    cyclic: bool,
}

pub struct ObjectResolver<'a> {
    table: &'a ObjectTable,
    cache: HashMap<ObjectId, CachedResolution>,
}

impl<'a> ObjectResolver<'a> {
    pub fn new(table: &'a ObjectTable) -> Self {
        ObjectResolver {
            table,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(
        &mut self,
        reference: &PdfReference,
        mode: ResolveMode,
        on_cycle: OnCycle,
    ) -> PdfResult<IndirectObject> {
        match mode {
            ResolveMode::Shallow => self.resolve_shallow(reference),
            ResolveMode::Deep => self.resolve_deep_with(reference, on_cycle),
        }
    }

    pub fn resolve_shallow(&self, reference: &PdfReference) -> PdfResult<IndirectObject> {
        let id = reference.id();
        self.table
            .get(&id)
            .cloned()
            .ok_or(PdfError::UnknownReference(id))
    }

    pub fn resolve_deep(&mut self, reference: &PdfReference) -> PdfResult<IndirectObject> {
        self.resolve_deep_with(reference, OnCycle::Silent)
    }

    fn resolve_deep_with(
        &mut self,
        reference: &PdfReference,
        on_cycle: OnCycle,
    ) -> PdfResult<IndirectObject> {
        let id = reference.id();
        if let Some(cached) = self.cache.get(&id) {
            if on_cycle == OnCycle::Silent || !cached.cyclic {
                return Ok(cached.object.clone());
            }
        }

        let raw = self.table.get(&id).ok_or(PdfError::UnknownReference(id))?;
        let mut visiting = HashSet::new();
        visiting.insert(id);
        let mut cyclic = false;
        let value = self.resolve_tree(&raw.value, &mut visiting, on_cycle, &mut cyclic)?;
        let object = IndirectObject::new(id, value);
        self.cache.insert(
            id,
            CachedResolution {
                object: object.clone(),
                cyclic,
            },
        );
        Ok(object)
    }

    /// Arrays resolve left to right and dictionaries in insertion order,
    /// so the cycle-breaking frontier is deterministic.
    fn resolve_tree(
        &mut self,
        value: &PdfValue,
        visiting: &mut HashSet<ObjectId>,
        on_cycle: OnCycle,
        cyclic: &mut bool,
    ) -> PdfResult<PdfValue> {
        match value {
            PdfValue::Reference(reference) => {
                let id = reference.id();
                if visiting.contains(&id) {
                    return match on_cycle {
                        OnCycle::Error => Err(PdfError::CircularReference(id)),
                        OnCycle::Silent => {
                            *cyclic = true;
                            let raw =
                                self.table.get(&id).ok_or(PdfError::UnknownReference(id))?;
                            Ok(PdfValue::Indirect(Box::new(raw.clone())))
                        }
                    };
                }

                if let Some(cached) = self.cache.get(&id) {
                    if on_cycle == OnCycle::Silent || !cached.cyclic {
                        *cyclic |= cached.cyclic;
                        return Ok(PdfValue::Indirect(Box::new(cached.object.clone())));
                    }
                }

                let raw = self.table.get(&id).ok_or(PdfError::UnknownReference(id))?;
                visiting.insert(id);
                let mut child_cyclic = false;
                let resolved =
                    self.resolve_tree(&raw.value, visiting, on_cycle, &mut child_cyclic)?;
                visiting.remove(&id);

                let object = IndirectObject::new(id, resolved);
                self.cache.insert(
                    id,
                    CachedResolution {
                        object: object.clone(),
                        cyclic: child_cyclic,
                    },
                );
                *cyclic |= child_cyclic;
                Ok(PdfValue::Indirect(Box::new(object)))
            }
            PdfValue::Array(array) => {
                let mut resolved = PdfArray::with_capacity(array.len());
                for element in array.iter() {
                    resolved.push(self.resolve_tree(element, visiting, on_cycle, cyclic)?);
                }
                Ok(PdfValue::Array(resolved))
            }
            PdfValue::Dictionary(dict) => {
                let resolved = self.resolve_dict(dict, visiting, on_cycle, cyclic)?;
                Ok(PdfValue::Dictionary(resolved))
            }
            PdfValue::Stream(stream) => {
                let dict = self.resolve_dict(&stream.dict, visiting, on_cycle, cyclic)?;
                Ok(PdfValue::Stream(PdfStream::new(
                    dict,
                    stream.data().to_vec(),
                )))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_dict(
        &mut self,
        dict: &PdfDictionary,
        visiting: &mut HashSet<ObjectId>,
        on_cycle: OnCycle,
        cyclic: &mut bool,
    ) -> PdfResult<PdfDictionary> {
        let mut resolved = PdfDictionary::with_capacity(dict.len());
        for (key, value) in dict.iter() {
            resolved.insert(
                key.clone(),
                self.resolve_tree(value, visiting, on_cycle, cyclic)?,
            );
        }
        Ok(resolved)
    }

    /// Looks through a single level of indirection: a reference comes back
    /// as its target's value, anything else as itself. Chains of
    /// reference-to-reference objects are followed with a cycle guard.
    pub fn resolve_if_reference(&mut self, value: &PdfValue) -> PdfResult<PdfValue> {
        let mut current = value.clone();
        let mut visited: HashSet<ObjectId> = HashSet::new();
        while let PdfValue::Reference(reference) = current {
            let id = reference.id();
            if !visited.insert(id) {
                return Err(PdfError::CircularReference(id));
            }
            current = self
                .table
                .get(&id)
                .ok_or(PdfError::UnknownReference(id))?
                .value
                .clone();
        }
        Ok(current)
    }
}
