//! # DMA Regions
//!
//! Rotating pool of GTT buffers carved into per-draw regions for vertex and
//! index data. Regions are bump-allocated from the current buffer; buffers
//! used by a submitted command buffer wait on its fence before reuse.

use alloc::sync::Arc;
use alloc::vec::Vec;

use radeon_core::{ByteSize, Domain, Error, Result};

use crate::bo::{Bo, BufferManager, MappedBo};

// =============================================================================
// DMA CONFIGURATION
// =============================================================================

/// DMA pool configuration
#[derive(Debug, Clone)]
pub struct DmaConfig {
    /// Size of each pooled buffer
    pub buffer_size: ByteSize,
    /// Alignment applied after every region
    pub min_alignment: u32,
    /// Buffers released before the command buffer should be flushed
    pub max_released_before_flush: u32,
    /// Domain pooled buffers live in
    pub domain: Domain,
}

impl Default for DmaConfig {
    fn default() -> Self {
        Self {
            buffer_size: ByteSize::from_kib(64),
            min_alignment: 8,
            max_released_before_flush: 4,
            domain: Domain::GTT,
        }
    }
}

// =============================================================================
// DMA REGION
// =============================================================================

/// A slice of a DMA buffer holding data for one draw
#[derive(Debug, Clone)]
pub struct DmaRegion {
    /// Backing buffer
    pub bo: Bo,
    /// Byte offset into `bo`
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
}

impl DmaRegion {
    /// Copy `data` into the start of the region
    pub fn write(&self, data: &[u8]) -> Result<()> {
        if data.len() > self.size as usize {
            return Err(Error::OutOfBounds);
        }
        self.bo.write(self.offset, data)
    }

    /// Map the region's bytes for in-place filling
    pub fn map(&self) -> RegionMap<'_> {
        RegionMap {
            map: self.bo.lock(),
            start: self.offset as usize,
            end: (self.offset + self.size) as usize,
        }
    }
}

/// Mapping of exactly one region
pub struct RegionMap<'a> {
    map: MappedBo<'a>,
    start: usize,
    end: usize,
}

impl core::ops::Deref for RegionMap<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.map[self.start..self.end]
    }
}

impl core::ops::DerefMut for RegionMap<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.map[self.start..self.end]
    }
}

// =============================================================================
// DMA MANAGER
// =============================================================================

/// Buffer currently being carved
#[derive(Debug)]
struct CurrentBuffer {
    bo: Bo,
    used: u32,
}

/// A buffer waiting for the GPU before it can be reused
#[derive(Debug)]
struct WaitingBuffer {
    bo: Bo,
    fence: u64,
}

/// DMA statistics
#[derive(Debug, Clone, Default)]
pub struct DmaStats {
    /// Regions handed out
    pub regions: u64,
    /// Buffers freshly allocated
    pub buffers_allocated: u64,
    /// Buffers recycled from the free list
    pub buffers_reused: u64,
    /// Bytes handed out
    pub bytes: u64,
}

/// Rotating DMA buffer pool
#[derive(Debug)]
pub struct DmaManager {
    config: DmaConfig,
    current: Option<CurrentBuffer>,
    /// Buffers referenced since the last flush
    reserved: Vec<Bo>,
    /// Buffers waiting on a fence
    wait: Vec<WaitingBuffer>,
    /// Idle buffers ready for reuse
    free: Vec<Bo>,
    released_since_flush: u32,
    stats: DmaStats,
}

impl DmaManager {
    /// Create an empty pool
    pub fn new(config: DmaConfig) -> Self {
        Self {
            config,
            current: None,
            reserved: Vec::new(),
            wait: Vec::new(),
            free: Vec::new(),
            released_since_flush: 0,
            stats: DmaStats::default(),
        }
    }

    /// Carve `size` bytes aligned to `alignment` out of the pool.
    ///
    /// Grabs a new buffer when the current one cannot fit the request; a
    /// request larger than the pool buffer size gets a dedicated buffer.
    pub fn alloc_region(
        &mut self,
        mgr: &dyn BufferManager,
        size: u32,
        alignment: u32,
    ) -> Result<DmaRegion> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(Error::InvalidAlignment);
        }
        if size == 0 {
            return Err(Error::InvalidParameter);
        }

        let fits = self.current.as_ref().is_some_and(|cur| {
            align(cur.used, alignment) as u64 + size as u64 <= cur.bo.size() as u64
        });
        if !fits {
            self.refill(mgr, size)?;
        }

        let cur = self.current.as_mut().ok_or(Error::OutOfMemory)?;
        let offset = align(cur.used, alignment);
        cur.used = align(offset + size, self.config.min_alignment);

        self.stats.regions += 1;
        self.stats.bytes += size as u64;

        Ok(DmaRegion {
            bo: Arc::clone(&cur.bo),
            offset,
            size,
        })
    }

    /// Replace the current buffer with one that can hold `size` bytes
    fn refill(&mut self, mgr: &dyn BufferManager, size: u32) -> Result<()> {
        if let Some(old) = self.current.take() {
            self.retire(old.bo);
        }

        self.reclaim(mgr.completed_fence());

        let want = (size as u64).max(self.config.buffer_size.as_bytes());
        let want = u32::try_from(want).map_err(|_| Error::AllocationTooLarge)?;

        let reuse = self.free.iter().position(|bo| bo.size() >= want);
        let bo = match reuse {
            Some(index) => {
                self.stats.buffers_reused += 1;
                self.free.swap_remove(index)
            }
            None => {
                self.stats.buffers_allocated += 1;
                mgr.alloc(want, 4096, self.config.domain)?
            }
        };

        log::trace!("dma refill: bo {} ({} bytes)", bo.id().id(), bo.size());
        self.current = Some(CurrentBuffer { bo, used: 0 });
        Ok(())
    }

    /// Park a used-up buffer until the next flush
    fn retire(&mut self, bo: Bo) {
        if !self.reserved.iter().any(|held| Arc::ptr_eq(held, &bo)) {
            self.reserved.push(bo);
        }
        self.released_since_flush += 1;
    }

    /// Too many buffers are parked; the caller should flush the command buffer
    pub fn wants_flush(&self) -> bool {
        self.released_since_flush > self.config.max_released_before_flush
    }

    /// A command buffer was submitted with `fence`: every buffer touched so
    /// far (including the current one) waits on it.
    pub fn release_on_flush(&mut self, fence: u64) {
        if let Some(cur) = self.current.take() {
            self.retire(cur.bo);
        }
        for bo in self.reserved.drain(..) {
            bo.mark_used(fence);
            self.wait.push(WaitingBuffer { bo, fence });
        }
        self.released_since_flush = 0;
    }

    /// Move buffers whose fence retired back to the free list
    pub fn reclaim(&mut self, completed_fence: u64) {
        let mut i = 0;
        while i < self.wait.len() {
            if self.wait[i].fence <= completed_fence {
                let done = self.wait.swap_remove(i);
                self.free.push(done.bo);
            } else {
                i += 1;
            }
        }
    }

    /// Number of buffers waiting on the GPU
    pub fn waiting_count(&self) -> usize {
        self.wait.len()
    }

    /// Number of idle pooled buffers
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Current buffer, if any
    pub fn current_bo(&self) -> Option<&Bo> {
        self.current.as_ref().map(|cur| &cur.bo)
    }

    /// Get statistics
    pub fn stats(&self) -> &DmaStats {
        &self.stats
    }
}

#[inline]
const fn align(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) & !(alignment - 1)
}
