//! The cross-reference table.
//!
//! Built eagerly while the bodies are parsed, so it is not needed for
//! object access; it is kept for diagnostics and for callers that want
//! random access by byte offset.

use crate::constants::FREE_LIST_HEAD_GENERATION;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One xref row: where an object lives and whether it is in use.
///
/// For a free entry the offset field carries the next free object number,
/// as written in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRefEntry {
    pub offset: u64,
    pub generation: u16,
    pub in_use: bool,
}

/// Cross-reference sections merged in file order; a later section shadows
/// earlier rows for the same object number, matching the latest-wins rule
/// of incremental updates.
#[derive(Debug, Clone, Default)]
pub struct XRefTable {
    entries: HashMap<u32, XRefEntry>,
}

impl XRefTable {
    pub fn new() -> Self {
        XRefTable {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, object_number: u32, entry: XRefEntry) -> Option<XRefEntry> {
        let shadowed = self.entries.insert(object_number, entry);
        if shadowed.is_some() {
            debug!("xref entry for object {} shadowed by a later section", object_number);
        }
        shadowed
    }

    pub fn get(&self, object_number: u32) -> Option<&XRefEntry> {
        self.entries.get(&object_number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &XRefEntry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn in_use_count(&self) -> usize {
        self.entries.values().filter(|e| e.in_use).count()
    }

    /// The reserved entry for object 0, the head of the free list.
    pub fn free_list_head(&self) -> Option<&XRefEntry> {
        self.get(0)
    }

    /// Whether object 0 is present as a free entry with generation 65535.
    /// Diagnostic only; a damaged free list does not affect reading.
    pub fn has_valid_free_list_head(&self) -> bool {
        self.free_list_head()
            .map_or(false, |e| !e.in_use && e.generation == FREE_LIST_HEAD_GENERATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_section_shadows() {
        let mut table = XRefTable::new();
        table.insert(
            3,
            XRefEntry {
                offset: 100,
                generation: 0,
                in_use: true,
            },
        );
        let shadowed = table.insert(
            3,
            XRefEntry {
                offset: 900,
                generation: 0,
                in_use: true,
            },
        );
        assert_eq!(shadowed.map(|e| e.offset), Some(100));
        assert_eq!(table.get(3).map(|e| e.offset), Some(900));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_free_list_head() {
        let mut table = XRefTable::new();
        assert!(!table.has_valid_free_list_head());
        table.insert(
            0,
            XRefEntry {
                offset: 0,
                generation: 65535,
                in_use: false,
            },
        );
        assert!(table.has_valid_free_list_head());
    }
}
