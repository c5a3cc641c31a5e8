//! Fixed-capacity set of open documents
//!
//! Documents are stored contiguously; removing one shifts the rest down. Callers hold
//! [`DocumentHandle`]s instead of raw indices: a handle carries the generation of the
//! document it was issued for, so after a removal moves documents around a stale handle
//! resolves to `None` instead of silently naming a different document.

use crate::model::document::Document;
use std::path::Path;

/// Default number of document slots
pub const MAX_FILE_SLOTS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Cannot open more than {capacity} files")]
    Full { capacity: usize },
}

/// Generation-checked reference to a registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle {
    index: usize,
    generation: u64,
}

impl DocumentHandle {
    /// Slot index at the time the handle was issued
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    document: Document,
}

#[derive(Debug)]
pub struct FileRegistry {
    slots: Vec<Slot>,
    capacity: usize,
    active: usize,
    next_generation: u64,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_FILE_SLOTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            active: 0,
            next_generation: 1,
        }
    }

    /// Append a document into the first free slot. The active document is unchanged.
    pub fn add(&mut self, document: Document) -> Result<DocumentHandle, RegistryError> {
        if self.is_full() {
            return Err(RegistryError::Full {
                capacity: self.capacity,
            });
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.slots.push(Slot {
            generation,
            document,
        });
        let index = self.slots.len() - 1;
        tracing::debug!("Registered document in slot {} ({} open)", index, self.slots.len());
        Ok(DocumentHandle { index, generation })
    }

    /// Remove the document at `index` and compact the slots.
    ///
    /// The active index is left as is; it may now be out of range or refer to a
    /// different document, so the caller must re-resolve it.
    pub fn remove(&mut self, index: usize) -> Option<Document> {
        if index >= self.slots.len() {
            return None;
        }
        let slot = self.slots.remove(index);
        tracing::debug!("Removed document from slot {} ({} open)", index, self.slots.len());
        Some(slot.document)
    }

    /// Make `index` the active document. Out-of-range indices are ignored.
    pub fn switch_to(&mut self, index: usize) {
        if index < self.slots.len() {
            self.active = index;
        }
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&Document> {
        self.slots.get(self.active).map(|slot| &slot.document)
    }

    pub fn active_mut(&mut self) -> Option<&mut Document> {
        self.slots.get_mut(self.active).map(|slot| &mut slot.document)
    }

    /// Handle for the document currently in slot `index`
    pub fn handle_at(&self, index: usize) -> Option<DocumentHandle> {
        self.slots.get(index).map(|slot| DocumentHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Current slot of the document a handle was issued for, or `None` if it is stale
    pub fn resolve(&self, handle: DocumentHandle) -> Option<usize> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .map(|_| handle.index)
    }

    pub fn get(&self, handle: DocumentHandle) -> Option<&Document> {
        let index = self.resolve(handle)?;
        Some(&self.slots[index].document)
    }

    pub fn get_mut(&mut self, handle: DocumentHandle) -> Option<&mut Document> {
        let index = self.resolve(handle)?;
        Some(&mut self.slots[index].document)
    }

    pub fn document(&self, index: usize) -> Option<&Document> {
        self.slots.get(index).map(|slot| &slot.document)
    }

    /// Slot of the document bound to `path`
    pub fn find_by_path(&self, path: &Path) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.document.path() == Some(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.slots.iter().map(|slot| &slot.document)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Document> {
        self.slots.iter_mut().map(|slot| &mut slot.document)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for FileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
