//! # Command Buffer
//!
//! Fixed-capacity dword buffer plus the relocation list that goes with it.

use alloc::vec::Vec;

use radeon_core::{Error, Result};

use crate::reloc::RelocList;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Command buffer configuration
#[derive(Debug, Clone)]
pub struct CmdBufConfig {
    /// Capacity in dwords
    pub capacity_dwords: u32,
    /// Maximum distinct buffers referenced by one command buffer
    pub relocation_capacity: u32,
    /// Maximum submissions in flight before flushing waits
    pub max_pending: u32,
}

impl Default for CmdBufConfig {
    fn default() -> Self {
        Self {
            capacity_dwords: 16 * 1024,
            relocation_capacity: 1024,
            max_pending: 64,
        }
    }
}

// =============================================================================
// COMMAND BUFFER
// =============================================================================

/// Dwords accumulated for one submission
#[derive(Debug)]
pub struct CommandBuffer {
    words: Vec<u32>,
    capacity: u32,
    relocs: RelocList,
}

impl CommandBuffer {
    /// Create an empty buffer
    pub fn new(config: &CmdBufConfig) -> Self {
        Self {
            words: Vec::with_capacity(config.capacity_dwords as usize),
            capacity: config.capacity_dwords,
            relocs: RelocList::new(config.relocation_capacity),
        }
    }

    /// Capacity in dwords
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Dwords written
    pub fn used(&self) -> u32 {
        self.words.len() as u32
    }

    /// Dwords still free
    pub fn remaining(&self) -> u32 {
        self.capacity - self.used()
    }

    /// Nothing written since the last reset
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Append one dword
    pub fn push(&mut self, word: u32) -> Result<()> {
        if self.used() >= self.capacity {
            return Err(Error::ReservationTooLarge {
                requested: self.used() + 1,
                capacity: self.capacity,
            });
        }
        self.words.push(word);
        Ok(())
    }

    /// Written dwords
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Relocations referenced by the written dwords
    pub fn relocs(&self) -> &RelocList {
        &self.relocs
    }

    /// Mutable relocation list
    pub fn relocs_mut(&mut self) -> &mut RelocList {
        &mut self.relocs
    }

    /// Drop the last `count` dwords
    pub(crate) fn truncate_by(&mut self, count: u32) {
        let keep = self.words.len().saturating_sub(count as usize);
        self.words.truncate(keep);
    }

    /// Empty the buffer for the next submission
    pub fn reset(&mut self) {
        self.words.clear();
        self.relocs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut cb = CommandBuffer::new(&CmdBufConfig {
            capacity_dwords: 2,
            ..CmdBufConfig::default()
        });

        cb.push(1).unwrap();
        cb.push(2).unwrap();
        assert_eq!(cb.remaining(), 0);
        assert!(matches!(cb.push(3), Err(Error::ReservationTooLarge { .. })));
        assert_eq!(cb.words(), &[1, 2]);
    }

    #[test]
    fn test_reset() {
        let mut cb = CommandBuffer::new(&CmdBufConfig::default());
        cb.push(7).unwrap();
        cb.reset();
        assert!(cb.is_empty());
        assert_eq!(cb.remaining(), cb.capacity());
    }
}
