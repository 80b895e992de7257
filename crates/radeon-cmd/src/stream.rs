//! # Command Stream
//!
//! The command buffer being filled, its submission path and the batch
//! discipline every emitter follows: reserve N dwords, write exactly N.

use alloc::boxed::Box;

use radeon_core::{Domain, Error, Result};
use radeon_mem::Bo;

use crate::cmdbuf::{CmdBufConfig, CommandBuffer};
use crate::packet::{Opcode, RegSpace, packet3};
use crate::regs::cp;
use crate::reloc::RelocList;
use crate::ring::{RingStats, SubmitRing};
use crate::submit::Submitter;

/// Dwords taken by one relocation
pub const RELOC_DWORDS: u32 = 2;
/// Dwords taken by [`CommandStream::emit_wait_idle_clean`]
pub const WAIT_IDLE_CLEAN_DWORDS: u32 = 5;
/// Dwords taken by [`CommandStream::emit_surface_sync`]
pub const SURFACE_SYNC_DWORDS: u32 = 5 + RELOC_DWORDS;

/// Dwords needed to write `count` registers in one sequence
#[inline]
pub const fn reg_seq_dwords(count: u32) -> u32 {
    2 + count
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Stream statistics
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    /// Command buffers submitted
    pub flushes: u64,
    /// Flushes forced by a reservation that did not fit
    pub space_flushes: u64,
    /// Batches completed
    pub batches: u64,
    /// Batches rolled back for writing the wrong count
    pub mismatches: u64,
    /// Batches dropped without [`Batch::end`], rolled back
    pub abandoned: u64,
    /// Failed submissions
    pub failed_submissions: u64,
}

// =============================================================================
// COMMAND STREAM
// =============================================================================

/// Command buffer plus the path to the kernel
pub struct CommandStream {
    cb: CommandBuffer,
    ring: SubmitRing,
    submitter: Box<dyn Submitter>,
    stats: StreamStats,
}

impl core::fmt::Debug for CommandStream {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandStream")
            .field("used", &self.cb.used())
            .field("capacity", &self.cb.capacity())
            .field("relocs", &self.cb.relocs().len())
            .field("submitter", &self.submitter.name())
            .finish()
    }
}

impl CommandStream {
    /// Create a stream submitting through `submitter`
    pub fn new(config: &CmdBufConfig, submitter: Box<dyn Submitter>) -> Self {
        Self {
            cb: CommandBuffer::new(config),
            ring: SubmitRing::new(config.max_pending),
            submitter,
            stats: StreamStats::default(),
        }
    }

    /// Capacity in dwords
    pub fn capacity(&self) -> u32 {
        self.cb.capacity()
    }

    /// Dwords written to the current command buffer
    pub fn used(&self) -> u32 {
        self.cb.used()
    }

    /// Dwords still free in the current command buffer
    pub fn remaining(&self) -> u32 {
        self.cb.remaining()
    }

    /// Nothing written since the last flush
    pub fn is_empty(&self) -> bool {
        self.cb.is_empty()
    }

    /// Dwords written to the current command buffer
    pub fn words(&self) -> &[u32] {
        self.cb.words()
    }

    /// Relocations of the current command buffer
    pub fn relocs(&self) -> &RelocList {
        self.cb.relocs()
    }

    /// Make room for `words` dwords, flushing first if they do not fit.
    ///
    /// Returns whether a flush happened. An exact fit does not flush.
    pub fn ensure_space(&mut self, words: u32) -> Result<bool> {
        if words > self.cb.capacity() {
            return Err(Error::ReservationTooLarge {
                requested: words,
                capacity: self.cb.capacity(),
            });
        }
        if words <= self.cb.remaining() {
            return Ok(false);
        }

        log::debug!(
            "command buffer full ({} + {} > {}), flushing",
            self.cb.used(),
            words,
            self.cb.capacity()
        );
        self.stats.space_flushes += 1;
        self.flush()?;
        Ok(true)
    }

    /// Reserve exactly `words` dwords for one uninterrupted batch
    pub fn begin_batch(&mut self, words: u32) -> Result<Batch<'_>> {
        self.ensure_space(words)?;
        let start = self.cb.used();
        Ok(Batch {
            stream: self,
            start,
            reserved: words,
            open: true,
        })
    }

    /// Submit the current command buffer.
    ///
    /// Returns the fence of the submission, or `None` when there was
    /// nothing to submit.
    pub fn flush(&mut self) -> Result<Option<u64>> {
        if self.cb.is_empty() {
            return Ok(None);
        }

        self.ring.update_completions(self.submitter.completed_fence());
        if !self.ring.has_space() {
            if let Some(oldest) = self.ring.oldest_fence() {
                self.ring.note_stall();
                self.submitter.wait_fence(oldest);
                self.ring.update_completions(self.submitter.completed_fence());
            }
        }

        let fence = self.ring.next_fence_value();
        if let Err(err) = self.submitter.submit(fence, self.cb.words(), self.cb.relocs()) {
            log::error!(
                "{}: submission of {} dwords failed: {}",
                self.submitter.name(),
                self.cb.used(),
                err
            );
            self.stats.failed_submissions += 1;
            self.cb.reset();
            return Err(err);
        }

        let fence = self
            .ring
            .record(self.cb.used(), self.cb.relocs().len() as u32)?;
        for reloc in self.cb.relocs().iter() {
            reloc.bo.mark_used(fence);
        }

        log::trace!(
            "flushed {} dwords, {} relocs, fence {}",
            self.cb.used(),
            self.cb.relocs().len(),
            fence
        );
        self.stats.flushes += 1;
        self.cb.reset();
        Ok(Some(fence))
    }

    /// Flush and block until the GPU has executed everything submitted
    pub fn finish(&mut self) -> Result<()> {
        self.flush()?;
        let last = self.ring.last_fence();
        if last > self.submitter.completed_fence() {
            self.submitter.wait_fence(last);
        }
        self.ring.update_completions(self.submitter.completed_fence());
        Ok(())
    }

    /// Fence of the most recent submission
    pub fn last_fence(&self) -> u64 {
        self.ring.last_fence()
    }

    /// Highest fence the GPU has retired
    pub fn completed_fence(&self) -> u64 {
        self.submitter.completed_fence()
    }

    // =========================================================================
    // Synchronization packets
    // =========================================================================

    /// Flush the CB/DB caches and stall until the 3D engine is idle and clean
    pub fn emit_wait_idle_clean(&mut self) -> Result<()> {
        let mut batch = self.begin_batch(WAIT_IDLE_CLEAN_DWORDS)?;
        batch.write(packet3(Opcode::EventWrite, 0))?;
        batch.write(cp::CACHE_FLUSH_AND_INV_EVENT)?;
        batch.set_reg(cp::WAIT_UNTIL, cp::WAIT_3D_IDLE | cp::WAIT_3D_IDLECLEAN)?;
        batch.end()
    }

    /// Make writes through `action` to `bo` visible before later packets
    pub fn emit_surface_sync(
        &mut self,
        bo: &Bo,
        read_domains: Domain,
        write_domain: Domain,
        action: cp::SyncAction,
    ) -> Result<()> {
        let size = (bo.size() as u64 + 255) >> 8;
        let mut batch = self.begin_batch(SURFACE_SYNC_DWORDS)?;
        batch.write(packet3(Opcode::SurfaceSync, 3))?;
        batch.write(action.bits())?;
        batch.write(size as u32)?;
        batch.write(0)?;
        batch.write(cp::SYNC_POLL_INTERVAL)?;
        batch.write_reloc(bo, read_domains, write_domain)?;
        batch.end()
    }

    /// Get stream statistics
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Get submit ring statistics
    pub fn ring_stats(&self) -> &RingStats {
        self.ring.stats()
    }
}

// =============================================================================
// BATCH
// =============================================================================

/// An open reservation. Writing more than reserved fails immediately;
/// [`Batch::end`] fails and rolls the batch back when fewer were written.
/// A batch dropped without `end`, as when a write error is propagated,
/// is rolled back too.
#[derive(Debug)]
pub struct Batch<'a> {
    stream: &'a mut CommandStream,
    start: u32,
    reserved: u32,
    open: bool,
}

impl Batch<'_> {
    /// Dwords written so far
    pub fn written(&self) -> u32 {
        self.stream.cb.used() - self.start
    }

    /// Dwords reserved
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    /// Write one dword
    pub fn write(&mut self, word: u32) -> Result<()> {
        let written = self.written();
        if written >= self.reserved {
            return Err(Error::BatchMismatch {
                reserved: self.reserved,
                written: written + 1,
            });
        }
        self.stream.cb.push(word)
    }

    /// Write several dwords
    pub fn write_all(&mut self, words: &[u32]) -> Result<()> {
        words.iter().try_for_each(|&word| self.write(word))
    }

    /// Write a float as its bit pattern
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write(value.to_bits())
    }

    /// Write a relocation for `bo` (two dwords)
    pub fn write_reloc(&mut self, bo: &Bo, read_domains: Domain, write_domain: Domain) -> Result<()> {
        let idx = self
            .stream
            .cb
            .relocs_mut()
            .add(bo, read_domains, write_domain)?;
        self.write(packet3(Opcode::Nop, 0))?;
        self.write(idx * 4)
    }

    /// Write the header and offset for `count` registers starting at `reg`
    pub fn begin_reg_seq(&mut self, reg: u32, count: u32) -> Result<()> {
        let space = RegSpace::of(reg).ok_or(Error::InvalidParameter)?;
        if count == 0 || reg + count * 4 > space.end() {
            return Err(Error::InvalidParameter);
        }
        let [header, offset] = space.seq_header(reg, count);
        self.write(header)?;
        self.write(offset)
    }

    /// Write consecutive registers starting at `reg`
    pub fn set_regs(&mut self, reg: u32, values: &[u32]) -> Result<()> {
        self.begin_reg_seq(reg, values.len() as u32)?;
        self.write_all(values)
    }

    /// Write one register
    pub fn set_reg(&mut self, reg: u32, value: u32) -> Result<()> {
        self.set_regs(reg, &[value])
    }

    /// Close the batch, checking the reservation was filled exactly
    pub fn end(mut self) -> Result<()> {
        self.open = false;
        let written = self.written();
        if written != self.reserved {
            log::error!(
                "batch reserved {} dwords, wrote {}; rolling back",
                self.reserved,
                written
            );
            self.stream.cb.truncate_by(written);
            self.stream.stats.mismatches += 1;
            return Err(Error::BatchMismatch {
                reserved: self.reserved,
                written,
            });
        }
        self.stream.stats.batches += 1;
        Ok(())
    }
}

impl Drop for Batch<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        let written = self.written();
        log::warn!("batch of {} dwords dropped after {}; rolling back", self.reserved, written);
        self.stream.cb.truncate_by(written);
        self.stream.stats.abandoned += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet3;
    use crate::regs::cb;
    use crate::submit::CaptureSubmitter;
    use radeon_mem::{BufferManager, HostBufferManager};

    fn stream(capacity_dwords: u32) -> (CommandStream, crate::submit::CaptureLog) {
        let sub = CaptureSubmitter::new();
        let log = sub.log();
        let config = CmdBufConfig {
            capacity_dwords,
            ..CmdBufConfig::default()
        };
        (CommandStream::new(&config, Box::new(sub)), log)
    }

    #[test]
    fn test_exact_fit_does_not_flush() {
        let (mut cs, log) = stream(8);
        let mut batch = cs.begin_batch(4).unwrap();
        batch.write_all(&[0; 4]).unwrap();
        batch.end().unwrap();
        assert!(!cs.ensure_space(4).unwrap());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_overflow_flushes_first() {
        let (mut cs, log) = stream(8);
        let mut batch = cs.begin_batch(6).unwrap();
        batch.write_all(&[1; 6]).unwrap();
        batch.end().unwrap();

        assert!(cs.ensure_space(3).unwrap());
        assert_eq!(cs.used(), 0);
        assert_eq!(log.lock()[0].words.len(), 6);
        assert_eq!(cs.stats().space_flushes, 1);
    }

    #[test]
    fn test_reservation_too_large() {
        let (mut cs, _) = stream(8);
        assert_eq!(
            cs.ensure_space(9),
            Err(Error::ReservationTooLarge {
                requested: 9,
                capacity: 8
            })
        );
    }

    #[test]
    fn test_batch_overrun_rejected() {
        let (mut cs, _) = stream(8);
        let mut batch = cs.begin_batch(1).unwrap();
        batch.write(1).unwrap();
        assert!(matches!(batch.write(2), Err(Error::BatchMismatch { .. })));
        batch.end().unwrap();
        assert_eq!(cs.words(), &[1]);
    }

    #[test]
    fn test_short_batch_rolled_back() {
        let (mut cs, _) = stream(8);
        cs.begin_batch(1).unwrap().end().unwrap_err();

        let mut batch = cs.begin_batch(3).unwrap();
        batch.write(5).unwrap();
        assert_eq!(
            batch.end(),
            Err(Error::BatchMismatch {
                reserved: 3,
                written: 1
            })
        );
        assert!(cs.is_empty());
        assert_eq!(cs.stats().mismatches, 2);
    }

    #[test]
    fn test_dropped_batch_rolled_back() {
        let (mut cs, _) = stream(16);
        let mut batch = cs.begin_batch(2).unwrap();
        batch.write(7).unwrap();
        batch.end().unwrap_err();

        let mut batch = cs.begin_batch(4).unwrap();
        batch.write_all(&[1, 2]).unwrap();
        assert_eq!(batch.set_reg(0x10, 0), Err(Error::InvalidParameter));
        drop(batch);

        assert!(cs.is_empty());
        assert_eq!(cs.stats().abandoned, 1);
        assert_eq!(cs.stats().mismatches, 1);
    }

    #[test]
    fn test_reg_seq_encoding() {
        let (mut cs, _) = stream(16);
        let mut batch = cs.begin_batch(reg_seq_dwords(2)).unwrap();
        batch
            .set_regs(cb::CB_BLEND_RED, &[1.0f32.to_bits(), 0])
            .unwrap();
        batch.end().unwrap();

        let words = cs.words();
        let header = Packet3::parse(words[0]).unwrap();
        assert_eq!(header.opcode, Opcode::SetContextReg);
        assert_eq!(header.payload, 3);
        assert_eq!(words[1], (cb::CB_BLEND_RED - 0x28000) >> 2);
        assert_eq!(words[2], 0x3F80_0000);
    }

    #[test]
    fn test_reg_seq_outside_aperture() {
        let (mut cs, _) = stream(16);
        let mut batch = cs.begin_batch(3).unwrap();
        assert_eq!(batch.set_reg(0x10, 0), Err(Error::InvalidParameter));
    }

    #[test]
    fn test_flush_marks_buffers_used() {
        let mgr = HostBufferManager::new();
        let bo = mgr.alloc(512, 4, Domain::VRAM).unwrap();
        let (mut cs, log) = stream(64);

        cs.emit_surface_sync(&bo, Domain::empty(), Domain::VRAM, cp::SyncAction::CB_ACTION_ENA)
            .unwrap();
        let fence = cs.flush().unwrap().unwrap();

        assert_eq!(bo.last_use(), fence);
        let log = log.lock();
        let words = &log[0].words;
        assert_eq!(words.len(), SURFACE_SYNC_DWORDS as usize);
        assert_eq!(words[1], cp::SyncAction::CB_ACTION_ENA.bits());
        assert_eq!(words[2], 2);
        assert_eq!(words[4], 10);
        assert_eq!(words[5], packet3(Opcode::Nop, 0));
        assert_eq!(words[6], 0);
        assert_eq!(log[0].relocs.len(), 1);
    }

    #[test]
    fn test_wait_idle_clean() {
        let (mut cs, _) = stream(16);
        cs.emit_wait_idle_clean().unwrap();
        let words = cs.words();
        assert_eq!(words.len(), WAIT_IDLE_CLEAN_DWORDS as usize);
        assert_eq!(words[1], cp::CACHE_FLUSH_AND_INV_EVENT);
        assert_eq!(Packet3::parse(words[2]).unwrap().opcode, Opcode::SetConfigReg);
        assert_eq!(words[3], (cp::WAIT_UNTIL - 0x8000) >> 2);
        assert_eq!(words[4], (1 << 15) | (1 << 17));
    }

    #[test]
    fn test_empty_flush_is_noop() {
        let (mut cs, log) = stream(16);
        assert_eq!(cs.flush().unwrap(), None);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_failed_submission_discards_buffer() {
        let mut cs = CommandStream::new(
            &CmdBufConfig::default(),
            Box::new(CaptureSubmitter::rejecting()),
        );
        let mut batch = cs.begin_batch(1).unwrap();
        batch.write(0).unwrap();
        batch.end().unwrap();
        assert_eq!(cs.flush(), Err(Error::SubmissionFailed));
        assert!(cs.is_empty());
        assert_eq!(cs.stats().failed_submissions, 1);
    }
}
