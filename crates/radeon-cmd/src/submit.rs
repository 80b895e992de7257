//! # Submission
//!
//! The boundary to the kernel command-submission interface.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use radeon_core::{Error, Result};

use crate::reloc::{RelocList, Relocation};

// =============================================================================
// SUBMITTER TRAIT
// =============================================================================

/// Kernel command submission
pub trait Submitter: Send {
    /// Submit a finished command buffer; the GPU signals `fence` when done
    fn submit(&mut self, fence: u64, words: &[u32], relocs: &RelocList) -> Result<()>;

    /// Highest fence the GPU has retired
    fn completed_fence(&self) -> u64;

    /// Block until `fence` retires
    fn wait_fence(&self, fence: u64);

    /// Get submitter name
    fn name(&self) -> &'static str;
}

// =============================================================================
// CAPTURE SUBMITTER
// =============================================================================

/// A submitted command buffer as the kernel saw it
#[derive(Debug, Clone)]
pub struct Submission {
    /// Fence signalled on completion
    pub fence: u64,
    /// Command dwords
    pub words: Vec<u32>,
    /// Relocations in index order
    pub relocs: Vec<Relocation>,
}

/// Shared log of captured submissions
pub type CaptureLog = Arc<spin::Mutex<Vec<Submission>>>;

/// Submitter that records command buffers instead of sending them to
/// hardware. Every submission completes immediately.
#[derive(Debug, Default)]
pub struct CaptureSubmitter {
    log: CaptureLog,
    completed: Arc<AtomicU64>,
    reject: bool,
}

impl CaptureSubmitter {
    /// Create a submitter with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a submitter that rejects every command buffer
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    /// Handle to the submission log, valid after the submitter is boxed
    pub fn log(&self) -> CaptureLog {
        Arc::clone(&self.log)
    }
}

impl Submitter for CaptureSubmitter {
    fn submit(&mut self, fence: u64, words: &[u32], relocs: &RelocList) -> Result<()> {
        if self.reject {
            return Err(Error::SubmissionFailed);
        }
        self.log.lock().push(Submission {
            fence,
            words: words.to_vec(),
            relocs: relocs.iter().cloned().collect(),
        });
        self.completed.fetch_max(fence, Ordering::AcqRel);
        Ok(())
    }

    fn completed_fence(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    fn wait_fence(&self, _fence: u64) {}

    fn name(&self) -> &'static str {
        "capture"
    }
}
