//! # Render Stages
//!
//! The draw-packet half of the render engine, one stage per chip
//! generation. A stage checks that it can draw a request, then writes the
//! per-primitive packets once state has been emitted.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ per primitive                                          │
//! │   VGT_PRIMITIVE_TYPE                                   │
//! │   INDEX_TYPE           16 / 32 bit                     │
//! │   NUM_INSTANCES        1                               │
//! │   base vertex          VGT_INDX_OFFSET | SQ_VTX_BASE   │
//! │   DRAW_INDEX           + index buffer relocation       │
//! │ | DRAW_INDEX_IMMD      short runs past vertex 0        │
//! │ | DRAW_INDEX_AUTO      everything else                 │
//! └────────────────────────────────────────────────────────┘
//! ```

use radeon_cmd::regs::{sq, vgt};
use radeon_cmd::stream::{RELOC_DWORDS, SURFACE_SYNC_DWORDS, WAIT_IDLE_CLEAN_DWORDS, reg_seq_dwords};
use radeon_cmd::packet::MAX_PACKET_COUNT;
use radeon_cmd::{Batch, CommandStream, Opcode, packet3};
use radeon_core::{ChipFamily, Domain, FallbackReason, Result};

use crate::prim::Primitive;
use crate::render::DrawCall;
use crate::vertex::{IndexStream, fetch_format};

// =============================================================================
// PACKET COSTS
// =============================================================================

/// Dwords each kind of draw packet takes on one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketCosts {
    /// Indexed draw, relocation included
    pub indexed: u32,
    /// Non-indexed draw, excluding inline indices
    pub immediate: u32,
    /// Idle wait and surface syncs after the last primitive
    pub completion: u32,
}

impl PacketCosts {
    /// Cost table for `chip`
    pub const fn for_chip(chip: ChipFamily) -> Self {
        let base_vertex = if chip.has_base_vertex_ctl() {
            reg_seq_dwords(2)
        } else {
            reg_seq_dwords(1)
        };
        // Primitive type, index type and instance count.
        let prefix = reg_seq_dwords(1) + 2 + 2 + base_vertex;
        Self {
            indexed: prefix + 5 + RELOC_DWORDS,
            immediate: prefix + 3,
            completion: WAIT_IDLE_CLEAN_DWORDS + 2 * SURFACE_SYNC_DWORDS,
        }
    }

    /// Dwords `prim` takes; zero when it is skipped
    pub fn primitive(&self, prim: &Primitive, indexed: bool) -> u32 {
        let count = prim.drawable_count();
        if count == 0 || prim.hw_type().is_none() {
            return 0;
        }
        if indexed {
            self.indexed
        } else {
            self.immediate + immediate_index_words(prim.start, count)
        }
    }

    /// Dwords every primitive of `prims` takes
    pub fn primitives(&self, prims: &[Primitive], indexed: bool) -> u32 {
        prims.iter().map(|prim| self.primitive(prim, indexed)).sum()
    }
}

/// A non-indexed run past vertex 0 carries 16-bit indices inline when
/// they fit one packet and every index fits 16 bits. Other runs
/// auto-index from an index offset.
fn inline_indices(start: u32, count: u32) -> bool {
    let last = start.checked_add(count).map(|end| end.saturating_sub(1));
    start != 0
        && count.div_ceil(2) + 1 <= MAX_PACKET_COUNT
        && last.is_some_and(|last| last <= u16::MAX as u32)
}

/// Inline index dwords of a non-indexed draw
fn immediate_index_words(start: u32, count: u32) -> u32 {
    if inline_indices(start, count) {
        count.div_ceil(2)
    } else {
        0
    }
}

// =============================================================================
// STAGE INTERFACE
// =============================================================================

/// Result of running a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Nothing was drawn; later stages may handle the request
    Continue,
    /// The primitives were drawn
    Handled,
}

/// One hardware generation's draw path
pub trait RenderStage {
    /// Stage name for logs
    fn name(&self) -> &'static str;

    /// Generation this stage draws for
    fn chip(&self) -> ChipFamily;

    /// Packet cost table
    fn costs(&self) -> PacketCosts {
        PacketCosts::for_chip(self.chip())
    }

    /// Whether this stage can draw `draw`. Returns the number of vertex
    /// inputs it will fetch.
    fn check(&self, draw: &DrawCall<'_>) -> core::result::Result<usize, FallbackReason> {
        if draw.arrays.len() > sq::MAX_VERTEX_RESOURCES {
            log::debug!("{}: {} vertex arrays", self.name(), draw.arrays.len());
            return Err(FallbackReason::VertexFormat);
        }
        for array in draw.arrays {
            fetch_format(array)?;
        }
        if draw.indices.as_ref().is_some_and(|ib| !ib.is_supported()) {
            return Err(FallbackReason::VertexFormat);
        }
        if let Some(prim) = draw.prims.iter().find(|prim| prim.hw_type().is_none()) {
            log::debug!("{}: primitive mode 0x{:x}", self.name(), prim.mode);
            return Err(FallbackReason::UnsupportedPrimitive);
        }
        // An empty index buffer draws nothing whatever the runs say.
        let limit = match &draw.indices {
            Some(ib) if ib.count == 0 => None,
            Some(ib) => Some(ib.count),
            None => Some(u32::MAX),
        };
        if let Some(limit) = limit {
            let out_of_range = draw
                .prims
                .iter()
                .find(|prim| prim.start.checked_add(prim.count).is_none_or(|end| end > limit));
            if let Some(prim) = out_of_range {
                log::debug!("{}: primitive {}+{} past {}", self.name(), prim.start, prim.count, limit);
                return Err(FallbackReason::PrimitiveRange);
            }
        }
        Ok(draw.arrays.len())
    }

    /// Write the draw packets of `prims`
    fn run(
        &self,
        cs: &mut CommandStream,
        indices: Option<&IndexStream>,
        prims: &[Primitive],
    ) -> Result<StageStatus> {
        let costs = self.costs();
        let mut drawn = 0;
        for prim in prims {
            if emit_primitive(cs, self.chip(), &costs, indices, prim)? {
                drawn += 1;
            }
        }
        log::trace!("{}: {} of {} primitives drawn", self.name(), drawn, prims.len());
        Ok(if drawn == 0 {
            StageStatus::Continue
        } else {
            StageStatus::Handled
        })
    }
}

/// R600 family
#[derive(Debug, Clone, Copy, Default)]
pub struct R600Stage;

impl RenderStage for R600Stage {
    fn name(&self) -> &'static str {
        "r600"
    }

    fn chip(&self) -> ChipFamily {
        ChipFamily::R600
    }
}

/// R700 family
#[derive(Debug, Clone, Copy, Default)]
pub struct R700Stage;

impl RenderStage for R700Stage {
    fn name(&self) -> &'static str {
        "r700"
    }

    fn chip(&self) -> ChipFamily {
        ChipFamily::R700
    }
}

/// Evergreen family
#[derive(Debug, Clone, Copy, Default)]
pub struct EvergreenStage;

impl RenderStage for EvergreenStage {
    fn name(&self) -> &'static str {
        "evergreen"
    }

    fn chip(&self) -> ChipFamily {
        ChipFamily::Evergreen
    }
}

/// The stage drawing for `chip`
pub fn stage_for(chip: ChipFamily) -> &'static dyn RenderStage {
    match chip {
        ChipFamily::R600 => &R600Stage,
        ChipFamily::R700 => &R700Stage,
        ChipFamily::Evergreen => &EvergreenStage,
    }
}

// =============================================================================
// EMISSION
// =============================================================================

fn initiator(source: u32) -> u32 {
    vgt::MAJOR_MODE.set(vgt::SOURCE_SELECT.set(0, source), vgt::DI_MAJOR_MODE_0)
}

fn index_type(is_32bit: bool) -> u32 {
    let size = if is_32bit {
        vgt::DI_INDEX_SIZE_32_BIT
    } else {
        vgt::DI_INDEX_SIZE_16_BIT
    };
    vgt::SWAP_MODE.set(vgt::INDEX_TYPE.set(0, size), vgt::VGT_DMA_SWAP_NONE)
}

fn write_base_vertex(batch: &mut Batch<'_>, chip: ChipFamily, base_vertex: i32) -> Result<()> {
    if chip.has_base_vertex_ctl() {
        batch.set_regs(sq::SQ_VTX_BASE_VTX_LOC, &[base_vertex as u32, 0])
    } else {
        batch.set_reg(vgt::VGT_INDX_OFFSET, base_vertex as u32)
    }
}

/// Write one primitive. Returns `false` when it had nothing to draw.
fn emit_primitive(
    cs: &mut CommandStream,
    chip: ChipFamily,
    costs: &PacketCosts,
    indices: Option<&IndexStream>,
    prim: &Primitive,
) -> Result<bool> {
    let (Some(hw_type), count) = (prim.hw_type(), prim.drawable_count()) else {
        return Ok(false);
    };
    if count == 0 {
        log::trace!("primitive 0x{:x} with {} vertices skipped", prim.mode, prim.count);
        return Ok(false);
    }

    let inline = indices.is_none() && inline_indices(prim.start, count);
    let is_32bit = indices.is_some_and(|ib| ib.is_32bit);
    let base_vertex = match indices {
        Some(_) => prim.base_vertex,
        None if inline => 0,
        None => prim.start as i32,
    };

    let mut batch = cs.begin_batch(costs.primitive(prim, indices.is_some()))?;
    batch.set_reg(vgt::VGT_PRIMITIVE_TYPE, vgt::PRIM_TYPE.set(0, hw_type))?;
    batch.write(packet3(Opcode::IndexType, 0))?;
    batch.write(index_type(is_32bit))?;
    batch.write(packet3(Opcode::NumInstances, 0))?;
    batch.write(1)?;
    write_base_vertex(&mut batch, chip, base_vertex)?;

    match indices {
        Some(ib) => {
            let index_bytes = if ib.is_32bit { 4 } else { 2 };
            batch.write(packet3(Opcode::DrawIndex, 3))?;
            batch.write(ib.offset + prim.start * index_bytes)?;
            batch.write(0)?;
            batch.write(count)?;
            batch.write(initiator(vgt::DI_SRC_SEL_DMA))?;
            batch.write_reloc(&ib.bo, Domain::GTT, Domain::empty())?;
        }
        None if inline => {
            let end = prim.start + count;
            batch.write(packet3(Opcode::DrawIndexImmd, count.div_ceil(2) + 1))?;
            batch.write(count)?;
            batch.write(initiator(vgt::DI_SRC_SEL_IMMEDIATE))?;
            let mut index = prim.start;
            while index + 1 < end {
                batch.write(((index + 1) << 16) | index)?;
                index += 2;
            }
            if index < end {
                batch.write(index)?;
            }
        }
        None => {
            batch.write(packet3(Opcode::DrawIndexAuto, 1))?;
            batch.write(count)?;
            batch.write(initiator(vgt::DI_SRC_SEL_AUTO_INDEX))?;
        }
    }
    batch.end()?;
    Ok(true)
}
