//! # Rendering Context
//!
//! Everything one GL context owns on the hardware side: the GL state
//! mirror, the register cache, the command stream, the DMA pool and the
//! uploaded programs. All of it is driven from the thread owning the
//! context.

use alloc::boxed::Box;
use alloc::sync::Arc;

use radeon_cmd::{CommandStream, Submitter};
use radeon_core::Result;
use radeon_mem::{BufferManager, DmaManager};

use crate::atoms::StateCache;
use crate::config::DriverConfig;
use crate::program::ProgramId;
use crate::render::RenderStats;
use crate::state::{GlState, NewState};
use crate::tcl::TclState;
use crate::translate::{self, program::ProgramCache};
use crate::types::GLenum;

/// Hardware side of one GL context
pub struct R600Context {
    pub(crate) config: DriverConfig,
    pub(crate) gl: GlState,
    pub(crate) cache: StateCache,
    pub(crate) cs: CommandStream,
    pub(crate) dma: DmaManager,
    pub(crate) programs: ProgramCache,
    pub(crate) mgr: Arc<dyn BufferManager>,
    pub(crate) tcl: TclState,
    pub(crate) stats: RenderStats,
}

impl core::fmt::Debug for R600Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("R600Context")
            .field("chip", &self.config.chip)
            .field("tcl", &self.tcl.mode())
            .field("used", &self.cs.used())
            .field("programs", &self.programs.len())
            .finish_non_exhaustive()
    }
}

impl R600Context {
    /// Create a context with default GL state translated into the cache
    pub fn new(
        config: DriverConfig,
        mgr: Arc<dyn BufferManager>,
        submitter: Box<dyn Submitter>,
    ) -> Self {
        let gl = GlState::new(config.max_texture_units);
        let mut cache = StateCache::new(config.chip);
        translate::replay_all(&gl, &mut cache);

        log::info!(
            "{:?} context: {} dword command buffer, {} texture units",
            config.chip,
            config.cmdbuf.capacity_dwords,
            config.max_texture_units
        );

        Self {
            cs: CommandStream::new(&config.cmdbuf, submitter),
            dma: DmaManager::new(config.dma.clone()),
            gl,
            cache,
            programs: ProgramCache::new(),
            mgr,
            tcl: TclState::new(),
            stats: RenderStats::default(),
            config,
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The GL state mirror
    pub fn gl(&self) -> &GlState {
        &self.gl
    }

    /// Modify the GL state mirror, then re-translate `changed`
    pub fn update<R>(&mut self, changed: NewState, f: impl FnOnce(&mut GlState) -> R) -> R {
        let result = f(&mut self.gl);
        self.invalidate_state(changed);
        result
    }

    /// Re-translate the state categories in `changed`
    pub fn invalidate_state(&mut self, changed: NewState) {
        translate::invalidate(&self.gl, &mut self.cache, changed);
        self.tcl.notify_state_change(changed);
    }

    /// `glEnable`/`glDisable`
    pub fn enable(&mut self, cap: GLenum, on: bool) {
        translate::enable(&mut self.gl, &mut self.cache, cap, on);
    }

    /// Re-translate everything and mark every atom dirty, as after a GPU
    /// reset or when another client owned the hardware
    pub fn reset_hw_state(&mut self) {
        log::debug!("resetting hardware state");
        translate::replay_all(&self.gl, &mut self.cache);
        self.cache.reset_all_dirty();
    }

    /// Drop the uploaded code of a deleted program
    pub fn delete_program(&mut self, id: ProgramId) {
        if self.programs.evict(id) {
            log::trace!("evicted program {}", id.id());
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Submit the command buffer
    pub fn flush(&mut self) -> Result<()> {
        if self.cs.flush()?.is_some() {
            self.after_flush();
        }
        Ok(())
    }

    /// Submit and wait for the GPU to finish
    pub fn finish(&mut self) -> Result<()> {
        self.flush()?;
        self.cs.finish()?;
        self.dma.reclaim(self.cs.completed_fence());
        Ok(())
    }

    /// A command buffer was just submitted: retire DMA buffers on its fence
    /// and start the next one with full state
    pub(crate) fn after_flush(&mut self) {
        self.dma.release_on_flush(self.cs.last_fence());
        self.dma.reclaim(self.cs.completed_fence());
        self.cache.reset_all_dirty();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Register cache
    pub fn state_cache(&self) -> &StateCache {
        &self.cache
    }

    /// Command stream
    pub fn command_stream(&self) -> &CommandStream {
        &self.cs
    }

    /// DMA pool
    pub fn dma(&self) -> &DmaManager {
        &self.dma
    }

    /// Hardware TCL mode
    pub fn tcl(&self) -> &TclState {
        &self.tcl
    }

    /// Draw counters
    pub fn render_stats(&self) -> &RenderStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::AtomKind;
    use crate::enums::*;
    use crate::program::{ProgramIo, ProgramKind, ShaderProgram};
    use alloc::vec;
    use radeon_cmd::CaptureSubmitter;
    use radeon_cmd::regs::cb;
    use radeon_core::ChipFamily;
    use radeon_mem::HostBufferManager;

    fn context() -> R600Context {
        R600Context::new(
            DriverConfig::for_chip(ChipFamily::R700),
            Arc::new(HostBufferManager::new()),
            Box::new(CaptureSubmitter::new()),
        )
    }

    #[test]
    fn test_new_context_has_full_state_pending() {
        let ctx = context();
        assert!(ctx.state_cache().is_dirty(AtomKind::Sq));
        assert!(ctx.state_cache().is_dirty(AtomKind::Blend));
        assert!(ctx.command_stream().is_empty());
        assert_eq!(ctx.gl().textures.len(), 16);
        assert!(ctx.tcl().is_enabled());
    }

    #[test]
    fn test_update_re_translates() {
        let mut ctx = context();
        ctx.update(NewState::COLOR, |gl| gl.color.color_mask = [true, false, true, false]);
        let mask = ctx.state_cache().reg(AtomKind::ColorMask, cb::CB_TARGET_MASK);
        assert_eq!(mask, Some(0b0101));
    }

    #[test]
    fn test_program_change_re_enables_tcl() {
        let mut ctx = context();
        ctx.tcl.disable();
        ctx.invalidate_state(NewState::TEXTURE);
        assert!(!ctx.tcl().is_enabled());

        ctx.update(NewState::PROGRAM, |gl| {
            gl.fragment_program = Some(Arc::new(ShaderProgram::fragment(9, vec![0], ProgramIo::COL0)));
        });
        assert!(ctx.tcl().is_enabled());
    }

    #[test]
    fn test_flush_of_empty_stream_submits_nothing() {
        let mgr = Arc::new(HostBufferManager::new());
        let submitter = CaptureSubmitter::new();
        let log = submitter.log();
        let mut ctx = R600Context::new(DriverConfig::default(), mgr, Box::new(submitter));
        ctx.flush().unwrap();
        ctx.finish().unwrap();
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_reset_marks_everything_dirty() {
        let mut ctx = context();
        let mut cs = CommandStream::new(&ctx.config.cmdbuf, Box::new(CaptureSubmitter::new()));
        ctx.cache.emit_dirty(&mut cs).unwrap();
        assert!(!ctx.state_cache().any_dirty());

        ctx.reset_hw_state();
        assert!(AtomKind::ALL.iter().all(|kind| ctx.state_cache().is_dirty(*kind)));
    }

    #[test]
    fn test_enable_goes_through_translators() {
        let mut ctx = context();
        ctx.enable(GL_LINE_SMOOTH, true);
        assert!(ctx.gl().line.smooth);
        ctx.enable(GL_SCISSOR_TEST, true);
        assert!(ctx.gl().scissor.enabled);
    }

    #[test]
    fn test_delete_program_evicts_code() {
        let mut ctx = context();
        let fp = ShaderProgram::untranslated(7, ProgramKind::Fragment);
        ctx.programs.upload(&*ctx.mgr, &fp).unwrap();
        assert_eq!(ctx.programs.len(), 1);
        ctx.delete_program(fp.id);
        assert!(ctx.programs.is_empty());
    }
}
