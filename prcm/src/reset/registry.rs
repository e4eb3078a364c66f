//! Reset-line registry owned by one controller.
//!
//! Descriptors live in an insertion-ordered arena indexed by id. New lines
//! are first collected in a [RegistryStage] and only enter the registry
//! through [ResetRegistry::commit], which inserts the whole stage or nothing.
use super::RegisterDescriptor;
use crate::ResetError;
use alloc::{
    collections::{btree_map::BTreeMap, btree_set::BTreeSet},
    vec::Vec,
};
use log::error;

#[derive(Debug, Default)]
pub struct ResetRegistry {
    entries: Vec<RegisterDescriptor>,
    index: BTreeMap<u32, usize>,
}

impl ResetRegistry {
    pub fn new() -> ResetRegistry {
        ResetRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisterDescriptor> {
        self.entries.iter()
    }

    pub fn find(&self, id: u32) -> Result<&RegisterDescriptor, ResetError> {
        let idx = *self.index.get(&id).ok_or(ResetError::NotFound { id })?;
        match self.entries.get(idx) {
            Some(entry) if entry.id == id => Ok(entry),
            _ => {
                error!("Reset registry entry #{} for id {:#x} is not valid.", idx, id);
                Err(ResetError::NotFound { id })
            }
        }
    }

    /// Insert every staged descriptor, or none of them if any id is already
    /// taken. Returns the number of descriptors inserted.
    pub fn commit(&mut self, stage: RegistryStage) -> Result<usize, ResetError> {
        let mut seen = BTreeSet::new();
        for entry in &stage.staged {
            if self.index.contains_key(&entry.id) || !seen.insert(entry.id) {
                return Err(ResetError::DuplicateId { id: entry.id });
            }
        }
        let count = stage.staged.len();
        for entry in stage.staged {
            self.index.insert(entry.id, self.entries.len());
            self.entries.push(entry);
        }
        Ok(count)
    }
}

/// Descriptors collected for one discovery batch; dropping it discards them.
#[derive(Debug, Default)]
pub struct RegistryStage {
    staged: Vec<RegisterDescriptor>,
}

impl RegistryStage {
    pub fn new() -> RegistryStage {
        RegistryStage::default()
    }

    pub fn push(&mut self, entry: RegisterDescriptor) {
        self.staged.push(entry);
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}
