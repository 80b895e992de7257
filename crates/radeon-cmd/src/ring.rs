//! # Submit Ring
//!
//! Tracks command buffers in flight and hands out their fence values.

use alloc::collections::VecDeque;

use radeon_core::{Error, Result};

// =============================================================================
// RING ENTRY
// =============================================================================

/// A submitted command buffer the GPU has not retired yet
#[derive(Debug, Clone, Copy)]
pub struct RingEntry {
    /// Fence value signalled on completion
    pub fence_value: u64,
    /// Size of the command buffer in dwords
    pub dwords: u32,
    /// Buffers referenced
    pub relocs: u32,
}

// =============================================================================
// SUBMIT RING
// =============================================================================

/// In-flight submission tracker
#[derive(Debug)]
pub struct SubmitRing {
    /// Maximum pending submissions
    max_pending: u32,
    /// Next fence value
    next_fence: u64,
    /// Pending submissions, oldest first
    pending: VecDeque<RingEntry>,
    /// Statistics
    stats: RingStats,
}

/// Ring statistics
#[derive(Debug, Clone, Default)]
pub struct RingStats {
    /// Total submissions
    pub total_submissions: u64,
    /// Total completions
    pub total_completions: u64,
    /// Total dwords submitted
    pub total_dwords: u64,
    /// Stalls (ring full)
    pub stalls: u64,
}

impl SubmitRing {
    /// Create a ring allowing `max_pending` submissions in flight
    pub fn new(max_pending: u32) -> Self {
        Self {
            max_pending: max_pending.max(1),
            next_fence: 1,
            pending: VecDeque::new(),
            stats: RingStats::default(),
        }
    }

    /// Get number of pending submissions
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if ring has space for a submission
    pub fn has_space(&self) -> bool {
        self.pending.len() < self.max_pending as usize
    }

    /// Fence the next submission will carry
    pub fn next_fence_value(&self) -> u64 {
        self.next_fence
    }

    /// Fence of the oldest pending submission
    pub fn oldest_fence(&self) -> Option<u64> {
        self.pending.front().map(|entry| entry.fence_value)
    }

    /// Fence of the most recent submission, 0 before the first
    pub fn last_fence(&self) -> u64 {
        self.next_fence - 1
    }

    /// Record a submission accepted by the kernel
    pub fn record(&mut self, dwords: u32, relocs: u32) -> Result<u64> {
        if !self.has_space() {
            self.stats.stalls += 1;
            return Err(Error::OutOfMemory);
        }

        let fence_value = self.next_fence;
        self.next_fence += 1;

        self.pending.push_back(RingEntry {
            fence_value,
            dwords,
            relocs,
        });
        self.stats.total_submissions += 1;
        self.stats.total_dwords += dwords as u64;

        Ok(fence_value)
    }

    /// Note a stall: the caller had to wait for the GPU
    pub fn note_stall(&mut self) {
        self.stats.stalls += 1;
    }

    /// Update completion status based on fence value
    pub fn update_completions(&mut self, completed_fence: u64) {
        let before = self.pending.len();

        self.pending.retain(|entry| entry.fence_value > completed_fence);

        let completed = before - self.pending.len();
        self.stats.total_completions += completed as u64;
    }

    /// Get ring statistics
    pub fn stats(&self) -> &RingStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fences_increase() {
        let mut ring = SubmitRing::new(4);
        assert_eq!(ring.last_fence(), 0);
        assert_eq!(ring.record(10, 1).unwrap(), 1);
        assert_eq!(ring.record(20, 2).unwrap(), 2);
        assert_eq!(ring.oldest_fence(), Some(1));
        assert_eq!(ring.stats().total_dwords, 30);
    }

    #[test]
    fn test_full_ring_stalls() {
        let mut ring = SubmitRing::new(1);
        ring.record(1, 0).unwrap();
        assert_eq!(ring.record(1, 0), Err(Error::OutOfMemory));
        assert_eq!(ring.stats().stalls, 1);

        ring.update_completions(1);
        assert!(ring.has_space());
        assert_eq!(ring.stats().total_completions, 1);
    }
}
