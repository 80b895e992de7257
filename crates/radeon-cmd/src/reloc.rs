//! # Relocations
//!
//! Buffers referenced by a command buffer. The kernel patches each
//! relocation with the buffer's final GPU address and validates the domains.

use alloc::vec::Vec;

use hashbrown::HashMap;
use radeon_core::{Domain, Error, Result};
use radeon_mem::{Bo, BoId, WorkingSet};

/// A buffer reference with its access domains
#[derive(Debug, Clone)]
pub struct Relocation {
    /// Referenced buffer
    pub bo: Bo,
    /// Domains the GPU reads the buffer from
    pub read_domains: Domain,
    /// Domain the GPU writes the buffer in
    pub write_domain: Domain,
}

/// Deduplicated relocation list. A buffer referenced twice gets one entry
/// whose domains are the union of both references.
#[derive(Debug)]
pub struct RelocList {
    relocs: Vec<Relocation>,
    index: HashMap<BoId, u32>,
    max: u32,
}

impl RelocList {
    /// Create an empty list holding at most `max` buffers
    pub fn new(max: u32) -> Self {
        Self {
            relocs: Vec::new(),
            index: HashMap::new(),
            max,
        }
    }

    /// Reference `bo`, returning its relocation index
    pub fn add(&mut self, bo: &Bo, read_domains: Domain, write_domain: Domain) -> Result<u32> {
        if let Some(&idx) = self.index.get(&bo.id()) {
            let reloc = &mut self.relocs[idx as usize];
            reloc.read_domains |= read_domains;
            reloc.write_domain |= write_domain;
            return Ok(idx);
        }

        if self.relocs.len() as u32 >= self.max {
            log::warn!("relocation list full ({} buffers)", self.max);
            return Err(Error::RelocationOverflow);
        }

        let idx = self.relocs.len() as u32;
        self.relocs.push(Relocation {
            bo: bo.clone(),
            read_domains,
            write_domain,
        });
        self.index.insert(bo.id(), idx);
        Ok(idx)
    }

    /// Whether `bo` is already referenced
    pub fn contains(&self, id: BoId) -> bool {
        self.index.contains_key(&id)
    }

    /// Relocation at `idx`
    pub fn get(&self, idx: u32) -> Option<&Relocation> {
        self.relocs.get(idx as usize)
    }

    /// Number of distinct buffers
    pub fn len(&self) -> usize {
        self.relocs.len()
    }

    /// No buffers referenced
    pub fn is_empty(&self) -> bool {
        self.relocs.is_empty()
    }

    /// Iterate in index order
    pub fn iter(&self) -> impl Iterator<Item = &Relocation> {
        self.relocs.iter()
    }

    /// Working set of the referenced buffers
    pub fn working_set(&self) -> WorkingSet {
        let mut set = WorkingSet::new();
        for reloc in &self.relocs {
            set.add(&reloc.bo, reloc.read_domains, reloc.write_domain);
        }
        set
    }

    /// Forget all references
    pub fn clear(&mut self) {
        self.relocs.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radeon_mem::{BufferManager, HostBufferManager};

    #[test]
    fn test_dedup_merges_domains() {
        let mgr = HostBufferManager::new();
        let bo = mgr.alloc(64, 4, Domain::VRAM).unwrap();
        let mut list = RelocList::new(8);

        let a = list.add(&bo, Domain::GTT, Domain::empty()).unwrap();
        let b = list.add(&bo, Domain::empty(), Domain::VRAM).unwrap();
        assert_eq!(a, b);
        assert_eq!(list.len(), 1);

        let reloc = list.get(a).unwrap();
        assert_eq!(reloc.read_domains, Domain::GTT);
        assert_eq!(reloc.write_domain, Domain::VRAM);
    }

    #[test]
    fn test_overflow() {
        let mgr = HostBufferManager::new();
        let mut list = RelocList::new(1);
        let a = mgr.alloc(4, 4, Domain::GTT).unwrap();
        let b = mgr.alloc(4, 4, Domain::GTT).unwrap();

        list.add(&a, Domain::GTT, Domain::empty()).unwrap();
        assert_eq!(
            list.add(&b, Domain::GTT, Domain::empty()),
            Err(Error::RelocationOverflow)
        );
    }

    #[test]
    fn test_working_set() {
        let mgr = HostBufferManager::new();
        let mut list = RelocList::new(8);
        let vb = mgr.alloc(100, 4, Domain::GTT).unwrap();
        let rt = mgr.alloc(200, 4, Domain::VRAM).unwrap();

        list.add(&vb, Domain::GTT, Domain::empty()).unwrap();
        list.add(&rt, Domain::empty(), Domain::VRAM).unwrap();

        let set = list.working_set();
        assert_eq!(set.gtt_bytes(), 100);
        assert_eq!(set.vram_bytes(), 200);
    }
}
