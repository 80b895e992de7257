//! # Render Submission
//!
//! Draws a batch of primitives through the hardware path, or rejects it
//! for a software retry before anything is committed.
//!
//! ```text
//!   check ──▶ prepare ──▶ predict ──▶ flush state ──▶ emit ──▶ done
//!     │          │           │
//!     └──────────┴───────────┴──▶ rejected (caller draws in software)
//! ```
//!
//! - check: GL features the hardware lacks, TCL mode, stage limits
//! - prepare: programs, textures, routing, working-set space
//! - predict: reserve the whole batch so no flush can split it
//! - flush state: dirty atoms in declaration order
//! - emit: per-primitive packets from the generation's [`RenderStage`]
//! - done: idle wait, surface syncs, per-draw data released

use radeon_cmd::SyncAction;
use radeon_core::{Domain, Error, FallbackReason, Result, warn_once};
use radeon_mem::{BufferManager, WorkingSet};

use crate::atoms::{AtomKind, StateCache};
use crate::context::R600Context;
use crate::fallback::check_fallbacks;
use crate::prim::Primitive;
use crate::stage::{PacketCosts, RenderStage, stage_for};
use crate::translate::program::{update_fragment_program, update_vertex_program};
use crate::translate::texture::{texture_buffers, update_textures};
use crate::translate::{depth, raster, routing};
use crate::vertex::{IndexBuffer, VertexArray, setup_indices, setup_streams, vtx_dwords, vtx_seqs};

// =============================================================================
// DRAW REQUEST
// =============================================================================

/// One draw call: vertex arrays, primitive runs and optional indices
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// Enabled vertex arrays, one fetch resource each
    pub arrays: &'a [VertexArray<'a>],
    /// Primitive runs
    pub prims: &'a [Primitive],
    /// Index data of an indexed draw
    pub indices: Option<IndexBuffer<'a>>,
    /// Highest vertex referenced, when the caller already knows it
    pub max_index: Option<u32>,
}

impl<'a> DrawCall<'a> {
    /// Non-indexed draw of `prims` over `arrays`
    pub fn new(arrays: &'a [VertexArray<'a>], prims: &'a [Primitive]) -> Self {
        Self {
            arrays,
            prims,
            indices: None,
            max_index: None,
        }
    }

    /// Same draw, indexed through `indices`
    pub fn with_indices(mut self, indices: IndexBuffer<'a>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Set the highest vertex referenced instead of deriving it
    pub fn with_max_index(mut self, max_index: u32) -> Self {
        self.max_index = Some(max_index);
        self
    }

    /// Highest vertex referenced.
    ///
    /// Runs of an indexed draw address the index buffer, so the vertices
    /// come from the largest index value shifted by the largest base
    /// vertex. Runs of a non-indexed draw address vertices directly.
    pub fn highest_vertex(&self, mgr: &dyn BufferManager) -> Result<u32> {
        if let Some(max_index) = self.max_index {
            return Ok(max_index);
        }
        match &self.indices {
            Some(ib) => {
                let base = self.prims.iter().map(|prim| prim.base_vertex).max().unwrap_or(0);
                Ok(ib.max_value(mgr)?.saturating_add_signed(base.max(0)))
            }
            None => Ok(self
                .prims
                .iter()
                .map(|prim| prim.start.saturating_add(prim.count).saturating_sub(1))
                .max()
                .unwrap_or(0)),
        }
    }

    /// Vertices each array must provide
    pub fn vertex_count(&self, mgr: &dyn BufferManager) -> Result<u32> {
        Ok(self.highest_vertex(mgr)?.saturating_add(1))
    }

    fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// What a hardware draw did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawStats {
    /// Primitives drawn
    pub primitives: u32,
    /// Primitives skipped after trimming
    pub skipped: u32,
    /// Command dwords written
    pub dwords: u32,
}

/// Result of a draw request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The hardware drew the batch
    Drawn(DrawStats),
    /// Nothing was committed; the caller must draw in software
    Rejected(FallbackReason),
}

impl DrawOutcome {
    /// Whether the batch was drawn in hardware
    pub fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn(_))
    }
}

/// Counters across the lifetime of a context
#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    /// Batches drawn in hardware
    pub draws: u64,
    /// Batches rejected for software fallback
    pub fallbacks: u64,
    /// Primitives drawn
    pub primitives: u64,
    /// Primitives skipped after trimming
    pub skipped: u64,
    /// Draws that wrote more than predicted
    pub overruns: u64,
}

// =============================================================================
// DRAW PATH
// =============================================================================

macro_rules! reject {
    ($reason:expr) => {
        return Ok(DrawOutcome::Rejected($reason))
    };
}

/// Dwords a draw writes once its dirty state is known
fn predict(cache: &StateCache, costs: &PacketCosts, draw: &DrawCall<'_>) -> u32 {
    cache.emit_size(true)
        + vtx_dwords(cache.chip(), draw.arrays.len() as u32)
        + costs.primitives(draw.prims, draw.is_indexed())
        + costs.completion
}

impl R600Context {
    /// Draw `draw` in hardware, or reject it for a software retry.
    ///
    /// A rejection leaves the command stream untouched. Errors are reserved
    /// for real failures such as a refused submission.
    pub fn draw_prims(&mut self, draw: &DrawCall<'_>) -> Result<DrawOutcome> {
        let outcome = self.run_render(draw)?;
        match outcome {
            DrawOutcome::Drawn(stats) => {
                self.stats.draws += 1;
                self.stats.primitives += stats.primitives as u64;
                self.stats.skipped += stats.skipped as u64;
            }
            DrawOutcome::Rejected(reason) => {
                log::debug!("draw rejected: {}", reason);
                self.stats.fallbacks += 1;
            }
        }
        Ok(outcome)
    }

    fn run_render(&mut self, draw: &DrawCall<'_>) -> Result<DrawOutcome> {
        let stage = stage_for(self.config.chip);

        if !self.tcl.is_enabled() {
            reject!(FallbackReason::ShaderTranslation);
        }
        if let Some(reason) = check_fallbacks(&self.gl, self.config.low_impact_fallback) {
            reject!(reason);
        }
        if let Err(reason) = stage.check(draw) {
            reject!(reason);
        }

        let costs = stage.costs();
        let primitives = draw
            .prims
            .iter()
            .filter(|prim| costs.primitive(prim, draw.is_indexed()) > 0)
            .count() as u32;
        let skipped = draw.prims.len() as u32 - primitives;
        if primitives == 0 || draw.indices.is_some_and(|ib| ib.count == 0) {
            log::trace!("nothing to draw in {} primitives", draw.prims.len());
            return Ok(DrawOutcome::Drawn(DrawStats {
                primitives: 0,
                skipped: draw.prims.len() as u32,
                dwords: 0,
            }));
        }

        let vertex_count = draw.vertex_count(&*self.mgr)?;

        if let Some(reason) = self.prepare_state()? {
            reject!(reason);
        }
        let mut over_budget = self.check_working_set(draw);
        if over_budget.is_some() && !self.cs.is_empty() {
            // Buffers only earlier draws referenced leave the set once
            // their command buffer is submitted.
            log::debug!("working set over budget, flushing {} dwords", self.cs.used());
            self.flush()?;
            over_budget = self.check_working_set(draw);
        }
        if let Some(reason) = over_budget {
            reject!(reason);
        }

        // Reserve the whole batch. A flush here leaves an empty command
        // buffer with every atom dirty, so the prediction is redone.
        let predicted = match self.reserve(&costs, draw)? {
            Some(predicted) => predicted,
            None => reject!(FallbackReason::CommandBuffer),
        };
        let begin = self.cs.used();

        let indices = match &draw.indices {
            Some(ib) => setup_indices(&mut self.dma, &*self.mgr, ib)?,
            None => None,
        };
        let streams = setup_streams(&mut self.dma, &*self.mgr, draw.arrays, vertex_count)?;
        self.cache
            .get_atom(AtomKind::Vtx)
            .replace_seqs(vtx_seqs(self.config.chip, &streams));

        self.cache.emit_dirty(&mut self.cs)?;
        stage.run(&mut self.cs, indices.as_ref(), draw.prims)?;
        self.emit_completion()?;

        // Streams and DMA regions live until the command buffer retires;
        // the relocation list keeps the buffers alive.
        self.cache.get_atom(AtomKind::Vtx).release_payload();
        drop(streams);
        drop(indices);

        let dwords = self.cs.used().saturating_sub(begin);
        if dwords > predicted {
            warn_once!("{}: draw wrote {} dwords, predicted {}", stage.name(), dwords, predicted);
            self.stats.overruns += 1;
        }

        if self.dma.wants_flush() {
            self.flush()?;
        }

        Ok(DrawOutcome::Drawn(DrawStats {
            primitives,
            skipped,
            dwords,
        }))
    }

    /// Upload programs and refresh the state every draw depends on.
    /// Returns a fallback reason when a program failed to translate.
    fn prepare_state(&mut self) -> Result<Option<FallbackReason>> {
        let programs = update_vertex_program(&self.gl, &mut self.cache, &mut self.programs, &*self.mgr)
            .and_then(|()| {
                update_fragment_program(&self.gl, &mut self.cache, &mut self.programs, &*self.mgr)
            });
        match programs {
            Ok(()) => {}
            Err(Error::ShaderTranslationFailed) => {
                self.tcl.disable();
                self.reset_hw_state();
                return Ok(Some(FallbackReason::ShaderTranslation));
            }
            Err(err) => return Err(err),
        }

        depth::update_shader_control(&self.gl, &mut self.cache);
        update_textures(&self.gl, &mut self.cache);
        raster::update_color_target(&self.gl, &mut self.cache);
        depth::update_depth_target(&self.gl, &mut self.cache);
        raster::update_scissor(&self.gl, &mut self.cache);
        self.cache.mark_dirty(AtomKind::Cb);

        match routing::update_routing(&self.gl, &mut self.cache, self.config.interpolator_slots) {
            Ok(_) => Ok(None),
            Err(Error::RoutingOverflow { .. }) => Ok(Some(FallbackReason::RoutingOverflow)),
            Err(err) => Err(err),
        }
    }

    /// Whether every buffer the draw touches fits the GPU domains
    fn check_working_set(&self, draw: &DrawCall<'_>) -> Option<FallbackReason> {
        let mut set: WorkingSet = self.cs.relocs().working_set();
        for reloc in self.cache.relocs() {
            set.add(&reloc.bo, reloc.read, reloc.write);
        }
        for bo in texture_buffers(&self.gl, self.config.chip) {
            set.add(bo, Domain::GTT | Domain::VRAM, Domain::empty());
        }
        let named = draw
            .arrays
            .iter()
            .map(|array| array.source)
            .chain(draw.indices.map(|ib| ib.source));
        for source in named {
            if let crate::vertex::DataSource::Buffer { bo, .. } = source {
                set.add(bo, Domain::GTT, Domain::empty());
            }
        }
        if let Some(bo) = self.dma.current_bo() {
            set.add(bo, Domain::GTT, Domain::empty());
        }

        match set.check(&self.config.limits) {
            Ok(()) => None,
            Err(err) => {
                log::debug!("{}: vram {} gtt {}", err, set.vram_bytes(), set.gtt_bytes());
                Some(FallbackReason::WorkingSet)
            }
        }
    }

    /// Reserve space for the whole draw. Returns the prediction, or `None`
    /// when the draw can never fit a command buffer.
    fn reserve(&mut self, costs: &PacketCosts, draw: &DrawCall<'_>) -> Result<Option<u32>> {
        let mut predicted = predict(&self.cache, costs, draw);
        loop {
            match self.cs.ensure_space(predicted) {
                Ok(false) => return Ok(Some(predicted)),
                Ok(true) => {
                    self.after_flush();
                    let full = predict(&self.cache, costs, draw);
                    if full == predicted {
                        return Ok(Some(predicted));
                    }
                    predicted = full;
                }
                Err(Error::ReservationTooLarge { requested, capacity }) => {
                    log::debug!("draw needs {} dwords, command buffer holds {}", requested, capacity);
                    return Ok(None);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Make the draw's writes visible to later readers
    fn emit_completion(&mut self) -> Result<()> {
        self.cs.emit_wait_idle_clean()?;
        if let Some(bo) = &self.gl.framebuffer.color {
            self.cs.emit_surface_sync(
                bo,
                Domain::empty(),
                Domain::VRAM,
                SyncAction::CB_ACTION_ENA | SyncAction::CB0_DEST_BASE_ENA,
            )?;
        }
        if let Some(bo) = &self.gl.framebuffer.depth {
            self.cs.emit_surface_sync(
                bo,
                Domain::empty(),
                Domain::VRAM,
                SyncAction::DB_ACTION_ENA | SyncAction::DB_DEST_BASE_ENA,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use crate::enums::*;
    use crate::program::{ProgramIo, ProgramKind, ShaderProgram};
    use crate::state::NewState;
    use alloc::boxed::Box;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use radeon_cmd::{CaptureLog, CaptureSubmitter, Opcode, Packet3};
    use radeon_core::{ByteSize, ChipFamily};
    use radeon_mem::{BufferManager, HostBufferManager, MemoryLimits};

    static POSITIONS: [f32; 36] = [0.5; 36];

    fn bind_programs(ctx: &mut R600Context, vp_id: u64, fp: ShaderProgram) {
        ctx.update(NewState::PROGRAM, |gl| {
            let vp = ShaderProgram::vertex(vp_id, vec![0; 8], ProgramIo::COL0 | ProgramIo::COL1);
            gl.vertex_program = Some(Arc::new(vp));
            gl.fragment_program = Some(Arc::new(fp));
        });
    }

    fn setup(config: DriverConfig) -> (R600Context, CaptureLog, Arc<HostBufferManager>) {
        let mgr = Arc::new(HostBufferManager::new());
        let submitter = CaptureSubmitter::new();
        let log = submitter.log();
        let mut ctx = R600Context::new(config, mgr.clone(), Box::new(submitter));
        bind_programs(&mut ctx, 1, ShaderProgram::fragment(2, vec![0; 4], ProgramIo::COL0));
        (ctx, log, mgr)
    }

    fn context() -> (R600Context, CaptureLog, Arc<HostBufferManager>) {
        setup(DriverConfig::default())
    }

    fn arrays() -> [VertexArray<'static>; 1] {
        [VertexArray::client(bytemuck::cast_slice(&POSITIONS), 3, GL_FLOAT, 12)]
    }

    /// Split a command stream into packets
    fn packets(words: &[u32]) -> Vec<(Opcode, &[u32])> {
        let mut out = Vec::new();
        let mut at = 0;
        while at < words.len() {
            let header = Packet3::parse(words[at]).unwrap();
            out.push((header.opcode, &words[at + 1..at + header.len() as usize]));
            at += header.len() as usize;
        }
        out
    }

    fn draws(words: &[u32], opcode: Opcode) -> Vec<Vec<u32>> {
        packets(words)
            .into_iter()
            .filter(|(op, _)| *op == opcode)
            .map(|(_, payload)| payload.to_vec())
            .collect()
    }

    fn submitted(ctx: &mut R600Context, log: &CaptureLog) -> Vec<u32> {
        ctx.flush().unwrap();
        log.lock().last().unwrap().words.clone()
    }

    #[test]
    fn test_triangle_fan_single_draw() {
        let (mut ctx, log, _mgr) = context();
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLE_FAN, 0, 5)];

        let outcome = ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap();
        let DrawOutcome::Drawn(stats) = outcome else {
            panic!("draw rejected: {:?}", outcome);
        };
        assert_eq!(stats.primitives, 1);
        assert_eq!(stats.skipped, 0);

        let words = submitted(&mut ctx, &log);
        let auto = draws(&words, Opcode::DrawIndexAuto);
        assert_eq!(auto.len(), 1);
        assert_eq!(auto[0][0], 5);
        assert!(draws(&words, Opcode::DrawIndex).is_empty());
        assert_eq!(draws(&words, Opcode::EventWrite).len(), 1);
    }

    #[test]
    fn test_quads_trimmed() {
        let (mut ctx, log, _mgr) = context();
        let arrays = arrays();
        let prims = [Primitive::new(GL_QUADS, 0, 10)];
        assert!(ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap().is_drawn());

        let words = submitted(&mut ctx, &log);
        assert_eq!(draws(&words, Opcode::DrawIndexAuto)[0][0], 8);
    }

    #[test]
    fn test_zero_primitive_batch_emits_nothing() {
        let (mut ctx, _log, _mgr) = context();
        let arrays = arrays();

        let empty = ctx.draw_prims(&DrawCall::new(&arrays, &[])).unwrap();
        assert_eq!(empty, DrawOutcome::Drawn(DrawStats::default()));

        let short = [Primitive::new(GL_TRIANGLES, 0, 2)];
        let outcome = ctx.draw_prims(&DrawCall::new(&arrays, &short)).unwrap();
        assert_eq!(
            outcome,
            DrawOutcome::Drawn(DrawStats {
                primitives: 0,
                skipped: 1,
                dwords: 0
            })
        );
        assert!(ctx.command_stream().is_empty());
    }

    #[test]
    fn test_skipped_run_among_drawn() {
        let (mut ctx, log, _mgr) = context();
        let arrays = arrays();
        let prims = [
            Primitive::new(GL_TRIANGLES, 0, 6),
            Primitive::new(GL_TRIANGLES, 6, 2),
            Primitive::new(GL_LINES, 0, 4),
        ];
        let outcome = ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap();
        let DrawOutcome::Drawn(stats) = outcome else {
            panic!("draw rejected: {:?}", outcome);
        };
        assert_eq!((stats.primitives, stats.skipped), (2, 1));
        assert_eq!(draws(&submitted(&mut ctx, &log), Opcode::DrawIndexAuto).len(), 2);
    }

    #[test]
    fn test_fallback_commits_nothing() {
        let (mut ctx, log, _mgr) = context();
        ctx.update(NewState::POLYGON, |gl| gl.polygon.stipple = true);
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];

        let outcome = ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap();
        assert_eq!(outcome, DrawOutcome::Rejected(FallbackReason::PolygonStipple));
        assert!(ctx.command_stream().is_empty());
        assert_eq!(ctx.render_stats().fallbacks, 1);
        ctx.flush().unwrap();
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_translation_failure_disables_tcl() {
        let (mut ctx, _log, _mgr) = context();
        bind_programs(&mut ctx, 1, ShaderProgram::untranslated(3, ProgramKind::Fragment));
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];
        let draw = DrawCall::new(&arrays, &prims);

        let rejected = DrawOutcome::Rejected(FallbackReason::ShaderTranslation);
        assert_eq!(ctx.draw_prims(&draw).unwrap(), rejected);
        assert!(!ctx.tcl().is_enabled());
        assert!(ctx.command_stream().is_empty());

        ctx.update(NewState::COLOR, |gl| gl.color.blend_enabled = true);
        assert_eq!(ctx.draw_prims(&draw).unwrap(), rejected);

        bind_programs(&mut ctx, 1, ShaderProgram::fragment(4, vec![0; 4], ProgramIo::COL0));
        assert!(ctx.tcl().is_enabled());
        assert!(ctx.draw_prims(&draw).unwrap().is_drawn());
        assert_eq!(ctx.tcl().disable_count(), 1);
    }

    #[test]
    fn test_routing_overflow_rejects() {
        let config = DriverConfig {
            interpolator_slots: 1,
            ..DriverConfig::default()
        };
        let (mut ctx, _log, _mgr) = setup(config);
        let inputs = ProgramIo::COL0 | ProgramIo::COL1;
        bind_programs(&mut ctx, 1, ShaderProgram::fragment(5, vec![0; 4], inputs));
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];

        let outcome = ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap();
        assert_eq!(outcome, DrawOutcome::Rejected(FallbackReason::RoutingOverflow));
        assert!(ctx.command_stream().is_empty());
    }

    #[test]
    fn test_draw_larger_than_command_buffer() {
        let (mut ctx, _log, _mgr) = setup(DriverConfig::default().with_cmdbuf_capacity(64));
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];

        let outcome = ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap();
        assert_eq!(outcome, DrawOutcome::Rejected(FallbackReason::CommandBuffer));
        assert!(ctx.command_stream().is_empty());
    }

    #[test]
    fn test_working_set_limit_rejects() {
        let config = DriverConfig {
            limits: MemoryLimits {
                vram: ByteSize::from_kib(4),
                gtt: ByteSize::from_mib(64),
            },
            ..DriverConfig::default()
        };
        let (mut ctx, _log, mgr) = setup(config);
        let color = mgr.alloc(64 * 1024, 4096, Domain::VRAM).unwrap();
        ctx.update(NewState::BUFFERS, |gl| {
            gl.framebuffer.color = Some(color);
            gl.framebuffer.width = 128;
            gl.framebuffer.height = 128;
            gl.framebuffer.pitch = 128;
        });
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];

        let outcome = ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap();
        assert_eq!(outcome, DrawOutcome::Rejected(FallbackReason::WorkingSet));
    }

    #[test]
    fn test_working_set_flushes_before_rejecting() {
        let config = DriverConfig {
            limits: MemoryLimits {
                vram: ByteSize::from_kib(4),
                gtt: ByteSize::from_mib(64),
            },
            ..DriverConfig::default()
        };
        let (mut ctx, log, mgr) = setup(config);
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];
        let draw = DrawCall::new(&arrays, &prims);

        for _ in 0..2 {
            let color = mgr.alloc(3 * 1024, 4096, Domain::VRAM).unwrap();
            ctx.update(NewState::BUFFERS, |gl| {
                gl.framebuffer.color = Some(color);
                gl.framebuffer.width = 16;
                gl.framebuffer.height = 16;
                gl.framebuffer.pitch = 16;
            });
            assert!(ctx.draw_prims(&draw).unwrap().is_drawn());
        }
        // The second target only fit once the first draw was submitted.
        assert_eq!(log.lock().len(), 1);
        assert_eq!(ctx.render_stats().fallbacks, 0);
    }

    #[test]
    fn test_byte_indices_drawn_indexed() {
        let (mut ctx, log, _mgr) = context();
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];
        let ib = IndexBuffer::client(&[0, 1, 2], GL_UNSIGNED_BYTE, 3);
        let draw = DrawCall::new(&arrays, &prims).with_indices(ib).with_max_index(2);
        assert!(ctx.draw_prims(&draw).unwrap().is_drawn());

        let words = submitted(&mut ctx, &log);
        let indexed = draws(&words, Opcode::DrawIndex);
        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed[0][2], 3);
        assert_eq!(draws(&words, Opcode::IndexType)[0][0], 0);
    }

    #[test]
    fn test_indexed_draw_stages_every_referenced_vertex() {
        let (mut ctx, _log, mgr) = context();
        let arrays = [VertexArray::client(bytemuck::cast_slice(&POSITIONS[..30]), 3, GL_FLOAT, 12)];
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];
        let ib = IndexBuffer::client(&[7, 8, 9], GL_UNSIGNED_BYTE, 3);
        let draw = DrawCall::new(&arrays, &prims).with_indices(ib);
        assert_eq!(draw.vertex_count(&*mgr), Ok(10));

        assert!(ctx.draw_prims(&draw).unwrap().is_drawn());
        // Two index dwords, then ten 12-byte vertices.
        assert_eq!(ctx.dma().stats().bytes, 8 + 120);
    }

    #[test]
    fn test_base_vertex_extends_staged_range() {
        let (_ctx, _log, mgr) = context();
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3).with_base_vertex(4)];
        let ib = IndexBuffer::client(&[0, 1, 2], GL_UNSIGNED_BYTE, 3);
        let draw = DrawCall::new(&arrays, &prims).with_indices(ib);
        assert_eq!(draw.vertex_count(&*mgr), Ok(7));
        assert_eq!(draw.with_max_index(11).vertex_count(&*mgr), Ok(12));
    }

    #[test]
    fn test_run_past_index_buffer_rejected() {
        let (mut ctx, _log, _mgr) = context();
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 1, 3)];
        let ib = IndexBuffer::client(&[0, 1, 2], GL_UNSIGNED_BYTE, 3);
        let outcome = ctx.draw_prims(&DrawCall::new(&arrays, &prims).with_indices(ib)).unwrap();
        assert_eq!(outcome, DrawOutcome::Rejected(FallbackReason::PrimitiveRange));
        assert!(ctx.command_stream().is_empty());
    }

    #[test]
    fn test_empty_index_buffer_draws_nothing() {
        let (mut ctx, _log, _mgr) = context();
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];
        let ib = IndexBuffer::client(&[], GL_UNSIGNED_SHORT, 0);
        let outcome = ctx.draw_prims(&DrawCall::new(&arrays, &prims).with_indices(ib)).unwrap();
        assert!(outcome.is_drawn());
        assert!(ctx.command_stream().is_empty());
    }

    #[test]
    fn test_render_targets_synced_after_draw() {
        let (mut ctx, log, mgr) = context();
        let color = mgr.alloc(64 * 64 * 4, 4096, Domain::VRAM).unwrap();
        let depth = mgr.alloc(64 * 64 * 4, 4096, Domain::VRAM).unwrap();
        ctx.update(NewState::BUFFERS, |gl| {
            gl.framebuffer.color = Some(color.clone());
            gl.framebuffer.depth = Some(depth.clone());
            gl.framebuffer.depth_bits = 24;
            gl.framebuffer.width = 64;
            gl.framebuffer.height = 64;
            gl.framebuffer.pitch = 64;
        });
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];
        assert!(ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap().is_drawn());

        let words = submitted(&mut ctx, &log);
        let syncs = draws(&words, Opcode::SurfaceSync);
        assert_eq!(syncs.len(), 2);
        let cb = SyncAction::CB_ACTION_ENA | SyncAction::CB0_DEST_BASE_ENA;
        let db = SyncAction::DB_ACTION_ENA | SyncAction::DB_DEST_BASE_ENA;
        assert_eq!(syncs[0][0], cb.bits());
        assert_eq!(syncs[1][0], db.bits());

        let submission = log.lock().last().cloned().unwrap();
        assert!(submission.relocs.iter().any(|r| r.bo.id() == color.id()));
        assert!(submission.relocs.iter().any(|r| r.bo.id() == depth.id()));
    }

    #[test]
    fn test_clean_state_not_re_emitted() {
        let (mut ctx, _log, _mgr) = context();
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];
        let draw = DrawCall::new(&arrays, &prims);

        let DrawOutcome::Drawn(first) = ctx.draw_prims(&draw).unwrap() else {
            panic!("first draw rejected");
        };
        let DrawOutcome::Drawn(second) = ctx.draw_prims(&draw).unwrap() else {
            panic!("second draw rejected");
        };
        assert!(second.dwords < first.dwords);
        assert!(!ctx.state_cache().any_dirty());
        assert!(ctx.state_cache().atom(AtomKind::Vtx).seqs().is_empty());
        assert_eq!(ctx.render_stats().overruns, 0);
    }

    #[test]
    fn test_flush_mid_batch_re_emits_state() {
        let (mut sizing, _log, _mgr) = context();
        let arrays = arrays();
        let prims = [Primitive::new(GL_TRIANGLES, 0, 3)];
        let draw = DrawCall::new(&arrays, &prims);
        let DrawOutcome::Drawn(full) = sizing.draw_prims(&draw).unwrap() else {
            panic!("sizing draw rejected");
        };

        let config = DriverConfig::default().with_cmdbuf_capacity(full.dwords + 30);
        let (mut ctx, log, _mgr) = setup(config);
        assert!(ctx.draw_prims(&draw).unwrap().is_drawn());
        let DrawOutcome::Drawn(after_flush) = ctx.draw_prims(&draw).unwrap() else {
            panic!("draw after flush rejected");
        };

        assert_eq!(log.lock().len(), 1);
        assert_eq!(after_flush.dwords, full.dwords);
        assert_eq!(ctx.command_stream().used(), full.dwords);
    }

    #[test]
    fn test_prediction_covers_every_generation() {
        for chip in [ChipFamily::R600, ChipFamily::R700, ChipFamily::Evergreen] {
            let (mut ctx, _log, _mgr) = setup(DriverConfig::for_chip(chip));
            let arrays = arrays();
            let prims = [
                Primitive::new(GL_TRIANGLE_STRIP, 0, 12),
                Primitive::new(GL_POINTS, 3, 7),
                Primitive::new(GL_LINE_LOOP, 1, 1),
            ];
            let indices: Vec<u8> = (0..12u16).flat_map(|i| i.to_ne_bytes()).collect();
            let ib = IndexBuffer::client(&indices, GL_UNSIGNED_SHORT, 12);

            assert!(ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap().is_drawn());
            let indexed = DrawCall::new(&arrays, &prims).with_indices(ib);
            assert!(ctx.draw_prims(&indexed).unwrap().is_drawn());
            assert_eq!(ctx.render_stats().overruns, 0);
            assert_eq!(ctx.render_stats().draws, 2);
        }
    }

    #[test]
    fn test_named_vertex_buffer_relocated() {
        let (mut ctx, log, mgr) = context();
        let vbo = mgr.alloc(1024, 4, Domain::GTT).unwrap();
        let arrays = [VertexArray::buffer(&vbo, 0, 4, GL_FLOAT, 16)];
        let prims = [Primitive::new(GL_POINTS, 0, 4)];
        assert!(ctx.draw_prims(&DrawCall::new(&arrays, &prims)).unwrap().is_drawn());

        ctx.flush().unwrap();
        let submission = log.lock().last().cloned().unwrap();
        let reloc = submission.relocs.iter().find(|r| r.bo.id() == vbo.id()).unwrap();
        assert_eq!(reloc.read_domains, Domain::GTT);
    }
}
