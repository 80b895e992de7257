//! # Buffer Objects
//!
//! GPU-visible buffers shared between the state tracker, pending command
//! buffers and the kernel. Ownership is `Arc`-shared: a BO is released when
//! the last holder (a DMA region, a relocation, a vertex stream) drops it.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU64, Ordering};

use radeon_core::{Domain, Error, GpuAddr, Handle, Result};

use crate::tracker::BoTracker;

// =============================================================================
// BUFFER OBJECT
// =============================================================================

/// Buffer object ID
pub type BoId = Handle<BufferObject>;

/// Shared buffer object reference
pub type Bo = Arc<BufferObject>;

/// A GPU buffer object with CPU-visible backing
#[derive(Debug)]
pub struct BufferObject {
    /// Unique ID
    id: BoId,
    /// GPU offset assigned at creation
    addr: GpuAddr,
    /// Size in bytes
    size: u32,
    /// Preferred placement
    domain: Domain,
    /// Last fence that referenced this buffer
    last_use: AtomicU64,
    /// CPU mapping
    storage: spin::Mutex<Box<[u8]>>,
}

impl BufferObject {
    /// Create a buffer object with zeroed backing storage
    pub fn new(id: BoId, addr: GpuAddr, size: u32, domain: Domain) -> Self {
        Self {
            id,
            addr,
            size,
            domain,
            last_use: AtomicU64::new(0),
            storage: spin::Mutex::new(vec![0u8; size as usize].into_boxed_slice()),
        }
    }

    /// Get buffer ID
    pub fn id(&self) -> BoId {
        self.id
    }

    /// Get GPU offset
    pub fn addr(&self) -> GpuAddr {
        self.addr
    }

    /// Get size in bytes
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Get preferred domain
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Record that a submission with `fence` reads or writes this buffer
    pub fn mark_used(&self, fence: u64) {
        self.last_use.fetch_max(fence, Ordering::AcqRel);
    }

    /// Last fence that referenced this buffer
    pub fn last_use(&self) -> u64 {
        self.last_use.load(Ordering::Acquire)
    }

    /// True once the GPU has retired every submission using this buffer
    pub fn is_idle(&self, completed_fence: u64) -> bool {
        self.last_use() <= completed_fence
    }

    /// Lock the CPU mapping without waiting for the GPU.
    ///
    /// Use [`BufferManager::map`] unless the buffer is known to be idle.
    pub fn lock(&self) -> MappedBo<'_> {
        MappedBo {
            guard: self.storage.lock(),
        }
    }

    /// Copy `data` into the buffer at `offset`
    pub fn write(&self, offset: u32, data: &[u8]) -> Result<()> {
        let start = offset as usize;
        let end = start.checked_add(data.len()).ok_or(Error::OutOfBounds)?;
        if end > self.size as usize {
            return Err(Error::OutOfBounds);
        }
        self.lock()[start..end].copy_from_slice(data);
        Ok(())
    }
}

// =============================================================================
// SCOPED MAPPING
// =============================================================================

/// CPU mapping of a buffer object, unmapped on drop
pub struct MappedBo<'a> {
    guard: spin::MutexGuard<'a, Box<[u8]>>,
}

impl Deref for MappedBo<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.guard
    }
}

impl DerefMut for MappedBo<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.guard
    }
}

// =============================================================================
// BUFFER MANAGER
// =============================================================================

/// Kernel GEM interface: allocation, fencing and mapping
pub trait BufferManager {
    /// Allocate a buffer object
    fn alloc(&self, size: u32, alignment: u32, domain: Domain) -> Result<Bo>;

    /// Highest fence the GPU has retired
    fn completed_fence(&self) -> u64;

    /// Block until `fence` retires
    fn wait_fence(&self, fence: u64);

    /// Map a buffer for CPU access, blocking until the GPU is done with it
    fn map<'a>(&self, bo: &'a BufferObject) -> MappedBo<'a> {
        if !bo.is_idle(self.completed_fence()) {
            log::trace!("map of bo {} waits for fence {}", bo.id().id(), bo.last_use());
            self.wait_fence(bo.last_use());
        }
        bo.lock()
    }
}

// =============================================================================
// HOST BUFFER MANAGER
// =============================================================================

/// Buffer manager backed by host memory.
///
/// Fences retire when waited on, which matches a GPU that has drained.
#[derive(Debug)]
pub struct HostBufferManager {
    next_id: AtomicU64,
    next_addr: AtomicU64,
    completed: AtomicU64,
    tracker: spin::Mutex<BoTracker>,
}

impl HostBufferManager {
    /// Base of the fake GPU address range handed out to buffers
    const ADDR_BASE: u64 = 0x0010_0000;

    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            next_addr: AtomicU64::new(Self::ADDR_BASE),
            completed: AtomicU64::new(0),
            tracker: spin::Mutex::new(BoTracker::new()),
        }
    }

    /// Retire every submission up to `fence`
    pub fn signal(&self, fence: u64) {
        self.completed.fetch_max(fence, Ordering::AcqRel);
    }

    /// Number of buffer objects still alive
    pub fn live_buffers(&self) -> usize {
        let mut tracker = self.tracker.lock();
        tracker.prune();
        tracker.live_count()
    }

    /// Allocation statistics
    pub fn stats(&self) -> crate::tracker::TrackerStats {
        self.tracker.lock().stats().clone()
    }
}

impl Default for HostBufferManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferManager for HostBufferManager {
    fn alloc(&self, size: u32, alignment: u32, domain: Domain) -> Result<Bo> {
        if size == 0 {
            return Err(Error::InvalidParameter);
        }
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(Error::InvalidAlignment);
        }

        let id = BoId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let span = GpuAddr::new(size as u64).align_up(4096).raw();
        let addr = GpuAddr::new(self.next_addr.fetch_add(span, Ordering::Relaxed))
            .align_up(alignment as u64);

        let bo = Arc::new(BufferObject::new(id, addr, size, domain));
        self.tracker.lock().register(&bo);

        log::trace!("bo {} allocated: {} bytes in {:?}", id.id(), size, domain);
        Ok(bo)
    }

    fn completed_fence(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    fn wait_fence(&self, fence: u64) {
        self.signal(fence);
    }
}
