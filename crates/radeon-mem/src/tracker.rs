//! # Buffer Tracking
//!
//! Lifetime observation of buffer objects and the working-set space check
//! performed before a draw commits any hardware resources.

use alloc::sync::{Arc, Weak};

use hashbrown::HashMap;
use radeon_core::{ByteSize, Domain, Error, Result};

use crate::bo::{Bo, BoId, BufferObject};

// =============================================================================
// BUFFER TRACKER
// =============================================================================

/// Observes live buffer objects. Holds weak references only: the tracker
/// never keeps a buffer alive.
#[derive(Debug, Default)]
pub struct BoTracker {
    buffers: HashMap<BoId, Weak<BufferObject>>,
    stats: TrackerStats,
}

/// Tracker statistics
#[derive(Debug, Clone, Default)]
pub struct TrackerStats {
    /// Total buffers created
    pub total_created: u64,
    /// Total buffers observed as destroyed
    pub total_destroyed: u64,
    /// Bytes ever allocated
    pub bytes_allocated: u64,
}

impl BoTracker {
    /// Create new tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing a buffer
    pub fn register(&mut self, bo: &Bo) {
        self.buffers.insert(bo.id(), Arc::downgrade(bo));
        self.stats.total_created += 1;
        self.stats.bytes_allocated += bo.size() as u64;
    }

    /// Drop entries whose buffer has been released
    pub fn prune(&mut self) {
        let before = self.buffers.len();
        self.buffers.retain(|_, weak| weak.strong_count() > 0);
        self.stats.total_destroyed += (before - self.buffers.len()) as u64;
    }

    /// Number of observed buffers still alive
    pub fn live_count(&self) -> usize {
        self.buffers
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Bytes currently held by live buffers placed in `domain`
    pub fn resident_bytes(&self, domain: Domain) -> u64 {
        self.buffers
            .values()
            .filter_map(Weak::upgrade)
            .filter(|bo| bo.domain().intersects(domain))
            .map(|bo| bo.size() as u64)
            .sum()
    }

    /// Get statistics
    pub fn stats(&self) -> &TrackerStats {
        &self.stats
    }
}

// =============================================================================
// WORKING SET
// =============================================================================

/// Space available to one command buffer in each GPU domain
#[derive(Debug, Clone, Copy)]
pub struct MemoryLimits {
    /// Usable video memory
    pub vram: ByteSize,
    /// Usable GART aperture
    pub gtt: ByteSize,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            vram: ByteSize::from_mib(256),
            gtt: ByteSize::from_mib(512),
        }
    }
}

/// Distinct buffers referenced by one submission, summed per domain
#[derive(Debug, Default)]
pub struct WorkingSet {
    seen: HashMap<BoId, ()>,
    vram: u64,
    gtt: u64,
}

impl WorkingSet {
    /// Create an empty working set
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for `bo`; a buffer referenced twice counts once.
    ///
    /// Placement follows the write domain when there is one, otherwise the
    /// read domain.
    pub fn add(&mut self, bo: &BufferObject, read: Domain, write: Domain) {
        if self.seen.insert(bo.id(), ()).is_some() {
            return;
        }
        let placement = if write.is_empty() { read } else { write };
        let placement = if placement.is_empty() { bo.domain() } else { placement };

        if placement.contains(Domain::VRAM) {
            self.vram += bo.size() as u64;
        } else {
            self.gtt += bo.size() as u64;
        }
    }

    /// Bytes placed in VRAM
    pub fn vram_bytes(&self) -> u64 {
        self.vram
    }

    /// Bytes placed in GTT
    pub fn gtt_bytes(&self) -> u64 {
        self.gtt
    }

    /// Fail when the set cannot be resident at once
    pub fn check(&self, limits: &MemoryLimits) -> Result<()> {
        if self.vram > limits.vram.as_bytes() || self.gtt > limits.gtt.as_bytes() {
            log::debug!(
                "working set too large: vram {} / {:?}, gtt {} / {:?}",
                self.vram,
                limits.vram,
                self.gtt,
                limits.gtt
            );
            return Err(Error::WorkingSetTooLarge);
        }
        Ok(())
    }
}
