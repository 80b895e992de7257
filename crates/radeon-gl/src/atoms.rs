//! # Hardware State Cache
//!
//! A mirror of every GPU register group ("atom") the tracker programs. Each
//! atom is a list of register sequences, each written by one SET_* packet,
//! and a dirty flag. Translators mutate atoms through address-keyed
//! accessors; the render engine emits the dirty ones in declaration order.
//!
//! ```text
//! Atom ─┬─ RegSeq { start: 0x28800, values: [..] }          ──▶ SET_CONTEXT_REG
//!       ├─ RegSeq { start: 0x2800C, values: [..], reloc }   ──▶ SET_CONTEXT_REG + NOP reloc
//!       └─ dirty
//! ```

use alloc::vec;
use alloc::vec::Vec;

use radeon_cmd::regs::{Field, cb, db, pa, spi, sq, sx, vgt};
use radeon_cmd::stream::{RELOC_DWORDS, reg_seq_dwords};
use radeon_cmd::CommandStream;
use radeon_core::{ChipFamily, Domain, Result, warn_once};
use radeon_mem::Bo;

// =============================================================================
// ATOM KINDS
// =============================================================================

/// Register groups, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AtomKind {
    /// Shader pipe configuration
    Sq,
    /// Vertex grouper index limits
    Vgt,
    /// Setup unit: face/cull/poly mode, point and line sizes
    Pa,
    /// Viewport transform and depth range
    Viewport,
    /// Scissor rectangles
    Scissor,
    /// Clip control and user clip planes
    Clip,
    /// Polygon offset
    Polygon,
    /// Alpha test
    Sx,
    /// Depth/stencil control, shader control, depth target
    Db,
    /// Color target
    Cb,
    /// Blend control
    Blend,
    /// Color control (ROP3, per-target blend enable)
    Logic,
    /// Color write mask
    ColorMask,
    /// Constant blend color
    BlendColor,
    /// Fragment input routing
    Spi,
    /// Vertex program
    Vs,
    /// Fragment program
    Ps,
    /// Vertex program constants
    VsConst,
    /// Fragment program constants
    PsConst,
    /// Texture resources and samplers
    Tx,
    /// Vertex fetch resources for the current draw
    Vtx,
}

impl AtomKind {
    /// Number of atom kinds
    pub const COUNT: usize = 21;

    /// All kinds in emission order
    pub const ALL: [AtomKind; Self::COUNT] = [
        Self::Sq,
        Self::Vgt,
        Self::Pa,
        Self::Viewport,
        Self::Scissor,
        Self::Clip,
        Self::Polygon,
        Self::Sx,
        Self::Db,
        Self::Cb,
        Self::Blend,
        Self::Logic,
        Self::ColorMask,
        Self::BlendColor,
        Self::Spi,
        Self::Vs,
        Self::Ps,
        Self::VsConst,
        Self::PsConst,
        Self::Tx,
        Self::Vtx,
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

// =============================================================================
// REGISTER SEQUENCES
// =============================================================================

/// Relocation attached to a register sequence
#[derive(Debug, Clone)]
pub struct SeqReloc {
    /// Referenced buffer
    pub bo: Bo,
    /// Read domains
    pub read: Domain,
    /// Write domain
    pub write: Domain,
}

impl SeqReloc {
    /// Buffer read by the GPU
    pub fn read(bo: &Bo, domain: Domain) -> Self {
        Self {
            bo: bo.clone(),
            read: domain,
            write: Domain::empty(),
        }
    }

    /// Buffer written by the GPU
    pub fn write(bo: &Bo, domain: Domain) -> Self {
        Self {
            bo: bo.clone(),
            read: Domain::empty(),
            write: domain,
        }
    }
}

/// Consecutive registers written by one packet
#[derive(Debug, Clone)]
pub struct RegSeq {
    start: u32,
    values: Vec<u32>,
    reloc: Option<SeqReloc>,
    needs_reloc: bool,
}

impl RegSeq {
    /// `count` zeroed registers starting at `start`
    pub fn new(start: u32, count: usize) -> Self {
        Self::with_values(start, vec![0; count])
    }

    /// Registers starting at `start` with initial `values`
    pub fn with_values(start: u32, values: Vec<u32>) -> Self {
        Self {
            start,
            values,
            reloc: None,
            needs_reloc: false,
        }
    }

    /// A sequence that addresses a buffer: it is only emitted while a
    /// relocation is attached
    pub fn relocated(start: u32, count: usize) -> Self {
        Self {
            needs_reloc: true,
            ..Self::new(start, count)
        }
    }

    /// Attach a relocation, making the sequence emit its buffer reference
    pub fn with_reloc(mut self, reloc: SeqReloc) -> Self {
        self.reloc = Some(reloc);
        self.needs_reloc = true;
        self
    }

    /// First register address
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Register values
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Attached relocation
    pub fn reloc(&self) -> Option<&SeqReloc> {
        self.reloc.as_ref()
    }

    fn slot(&self, reg: u32) -> Option<usize> {
        if reg < self.start || reg % 4 != 0 {
            return None;
        }
        let idx = ((reg - self.start) / 4) as usize;
        (idx < self.values.len()).then_some(idx)
    }

    /// Whether this sequence is written at emission
    fn emitted(&self) -> bool {
        !self.values.is_empty() && (!self.needs_reloc || self.reloc.is_some())
    }

    /// Dwords emitted for this sequence
    pub fn dwords(&self) -> u32 {
        if !self.emitted() {
            return 0;
        }
        let reloc = if self.reloc.is_some() { RELOC_DWORDS } else { 0 };
        reg_seq_dwords(self.values.len() as u32) + reloc
    }

    fn emit(&self, cs: &mut CommandStream) -> Result<()> {
        let mut batch = cs.begin_batch(self.dwords())?;
        batch.set_regs(self.start, &self.values)?;
        if let Some(reloc) = &self.reloc {
            batch.write_reloc(&reloc.bo, reloc.read, reloc.write)?;
        }
        batch.end()
    }
}

// =============================================================================
// ATOM
// =============================================================================

/// One dirty-tracked register group
#[derive(Debug, Clone)]
pub struct Atom {
    kind: AtomKind,
    seqs: Vec<RegSeq>,
    dirty: bool,
}

impl Atom {
    fn new(kind: AtomKind, seqs: Vec<RegSeq>) -> Self {
        Self {
            kind,
            seqs,
            dirty: true,
        }
    }

    /// Register group
    pub fn kind(&self) -> AtomKind {
        self.kind
    }

    /// Register sequences in emission order
    pub fn seqs(&self) -> &[RegSeq] {
        &self.seqs
    }

    /// Whether the atom must be re-emitted
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force re-emission
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn locate(&self, reg: u32) -> Option<(usize, usize)> {
        self.seqs
            .iter()
            .enumerate()
            .find_map(|(i, seq)| seq.slot(reg).map(|slot| (i, slot)))
    }

    /// Cached value of `reg`, `None` if the atom does not hold it
    pub fn reg(&self, reg: u32) -> Option<u32> {
        self.locate(reg).map(|(i, slot)| self.seqs[i].values[slot])
    }

    /// Write `reg`; the atom becomes dirty only when the value changes.
    ///
    /// Returns whether the value changed.
    pub fn set_reg(&mut self, reg: u32, value: u32) -> bool {
        let Some((i, slot)) = self.locate(reg) else {
            warn_once!("register 0x{:05x} is not part of atom {:?}", reg, self.kind);
            return false;
        };
        let cur = &mut self.seqs[i].values[slot];
        if *cur == value {
            return false;
        }
        *cur = value;
        self.dirty = true;
        true
    }

    /// Write `value` into `field` of `reg`
    pub fn set_field(&mut self, reg: u32, field: Field, value: u32) -> bool {
        let cur = self.reg(reg).unwrap_or(0);
        self.set_reg(reg, field.set(cur, value))
    }

    /// Set or clear `bit` of `reg`
    pub fn set_bit(&mut self, reg: u32, bit: u32, on: bool) -> bool {
        let cur = self.reg(reg).unwrap_or(0);
        self.set_reg(reg, radeon_cmd::regs::set_bit(cur, bit, on))
    }

    /// Write a float register as its bit pattern
    pub fn set_f32(&mut self, reg: u32, value: f32) -> bool {
        self.set_reg(reg, bytemuck::cast(value))
    }

    /// Attach (or drop) the relocation of the sequence holding `reg`
    pub fn set_reloc(&mut self, reg: u32, reloc: Option<SeqReloc>) {
        let Some((i, _)) = self.locate(reg) else {
            warn_once!("register 0x{:05x} is not part of atom {:?}", reg, self.kind);
            return;
        };
        let seq = &mut self.seqs[i];
        let same = match (&seq.reloc, &reloc) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                alloc::sync::Arc::ptr_eq(&a.bo, &b.bo) && a.read == b.read && a.write == b.write
            }
            _ => false,
        };
        if !same {
            seq.reloc = reloc;
            self.dirty = true;
        }
    }

    /// Replace the whole payload; used by atoms sized per draw
    pub fn replace_seqs(&mut self, seqs: Vec<RegSeq>) {
        self.seqs = seqs;
        self.dirty = true;
    }

    /// Drop a per-draw payload once the draw is emitted. The hardware
    /// keeps what was written, so the atom stays clean.
    pub fn release_payload(&mut self) {
        self.seqs.clear();
    }

    /// Dwords this atom emits
    pub fn emit_size(&self) -> u32 {
        self.seqs.iter().map(RegSeq::dwords).sum()
    }

    /// Number of packets this atom emits
    fn packet_count(&self) -> u32 {
        self.seqs.iter().filter(|seq| seq.emitted()).count() as u32
    }
}

// =============================================================================
// STATE CACHE
// =============================================================================

/// Every atom of one context, in emission order
#[derive(Debug, Clone)]
pub struct StateCache {
    chip: ChipFamily,
    atoms: [Atom; AtomKind::COUNT],
}

impl StateCache {
    /// Build the cache with the default payload for `chip`. Every atom
    /// starts dirty.
    pub fn new(chip: ChipFamily) -> Self {
        Self {
            chip,
            atoms: core::array::from_fn(|i| {
                let kind = AtomKind::ALL[i];
                Atom::new(kind, default_layout(kind, chip))
            }),
        }
    }

    /// Chip the register layout was built for
    pub fn chip(&self) -> ChipFamily {
        self.chip
    }

    /// Atom for `kind`
    pub fn atom(&self, kind: AtomKind) -> &Atom {
        &self.atoms[kind.index()]
    }

    /// Mutable atom for `kind`
    pub fn get_atom(&mut self, kind: AtomKind) -> &mut Atom {
        &mut self.atoms[kind.index()]
    }

    /// Cached value of `reg` in the atom for `kind`
    pub fn reg(&self, kind: AtomKind, reg: u32) -> Option<u32> {
        self.atom(kind).reg(reg)
    }

    /// Force re-emission of `kind`
    pub fn mark_dirty(&mut self, kind: AtomKind) {
        self.get_atom(kind).mark_dirty();
    }

    /// Whether `kind` is dirty
    pub fn is_dirty(&self, kind: AtomKind) -> bool {
        self.atom(kind).is_dirty()
    }

    /// Whether any atom is dirty
    pub fn any_dirty(&self) -> bool {
        self.atoms.iter().any(Atom::is_dirty)
    }

    /// Buffers the cached state references
    pub fn relocs(&self) -> impl Iterator<Item = &SeqReloc> {
        self.atoms
            .iter()
            .flat_map(|atom| atom.seqs.iter())
            .filter_map(RegSeq::reloc)
    }

    /// Mark every atom dirty, forcing complete re-emission
    pub fn reset_all_dirty(&mut self) {
        self.atoms.iter_mut().for_each(Atom::mark_dirty);
    }

    /// Dwords needed to emit the dirty atoms, or all atoms
    pub fn emit_size(&self, dirty_only: bool) -> u32 {
        self.atoms
            .iter()
            .filter(|atom| !dirty_only || atom.dirty)
            .map(Atom::emit_size)
            .sum()
    }

    /// Emit every dirty atom in declaration order and clear the flags.
    ///
    /// Space for the whole set is reserved up front; if that flushes, the
    /// new command buffer starts without state, so everything is emitted.
    /// Returns the number of register-write packets written.
    pub fn emit_dirty(&mut self, cs: &mut CommandStream) -> Result<u32> {
        let size = self.emit_size(true);
        if size == 0 {
            return Ok(0);
        }
        if cs.ensure_space(size)? {
            self.reset_all_dirty();
            cs.ensure_space(self.emit_size(true))?;
        }

        let mut packets = 0;
        for atom in self.atoms.iter_mut().filter(|atom| atom.dirty) {
            for seq in &atom.seqs {
                if seq.emitted() {
                    seq.emit(cs)?;
                }
            }
            packets += atom.packet_count();
            atom.dirty = false;
            log::trace!("emitted atom {:?} ({} dwords)", atom.kind, atom.emit_size());
        }
        Ok(packets)
    }
}

// =============================================================================
// DEFAULT LAYOUT
// =============================================================================

/// Register sequences of `kind` with their power-on values
fn default_layout(kind: AtomKind, chip: ChipFamily) -> Vec<RegSeq> {
    match kind {
        AtomKind::Sq => vec![RegSeq::with_values(
            sq::SQ_CONFIG,
            vec![sq::VC_ENABLE | sq::EXPORT_SRC_C | sq::DX9_CONSTS],
        )],
        AtomKind::Vgt => vec![RegSeq::with_values(vgt::VGT_MAX_VTX_INDX, vec![0x00FF_FFFF, 0, 0])],
        AtomKind::Pa => vec![
            RegSeq::new(pa::PA_SU_SC_MODE_CNTL, 1),
            RegSeq::with_values(pa::PA_CL_VTE_CNTL, vec![pa::VTE_DEFAULT]),
            RegSeq::new(pa::PA_SU_POINT_SIZE, 4),
            RegSeq::new(pa::PA_SC_MODE_CNTL, 1),
        ],
        AtomKind::Viewport => vec![
            RegSeq::new(pa::PA_SC_VPORT_ZMIN_0, 2),
            RegSeq::new(pa::PA_CL_VPORT_XSCALE_0, 6),
        ],
        AtomKind::Scissor => vec![
            RegSeq::new(pa::PA_SC_GENERIC_SCISSOR_TL, 2),
            RegSeq::new(pa::PA_SC_VPORT_SCISSOR_0_TL, 2),
        ],
        AtomKind::Clip => vec![
            RegSeq::with_values(pa::PA_CL_CLIP_CNTL, vec![pa::DX_CLIP_SPACE_DEF]),
            RegSeq::new(pa::PA_CL_UCP_0_X, pa::MAX_CLIP_PLANES * 4),
        ],
        AtomKind::Polygon => vec![RegSeq::new(pa::PA_SU_POLY_OFFSET_DB_FMT_CNTL, 6)],
        AtomKind::Sx => vec![
            RegSeq::new(sx::SX_ALPHA_TEST_CONTROL, 1),
            RegSeq::new(sx::SX_ALPHA_REF, 1),
        ],
        AtomKind::Db => vec![
            RegSeq::new(db::DB_DEPTH_CONTROL, 1),
            RegSeq::new(db::DB_STENCILREFMASK, 2),
            RegSeq::new(db::DB_SHADER_CONTROL, 1),
            RegSeq::new(db::DB_RENDER_CONTROL, 2),
            RegSeq::relocated(db::DB_DEPTH_BASE, 2),
        ],
        AtomKind::Cb => vec![
            RegSeq::relocated(cb::CB_COLOR0_BASE, 1),
            RegSeq::new(cb::CB_COLOR0_SIZE, 1),
            RegSeq::new(cb::CB_COLOR0_INFO, 1),
            RegSeq::with_values(cb::CB_SHADER_MASK, vec![0xF]),
        ],
        AtomKind::Blend => vec![RegSeq::new(blend_control_reg(chip), 1)],
        AtomKind::Logic => vec![RegSeq::with_values(
            cb::CB_COLOR_CONTROL,
            vec![cb::ROP3.set(0, cb::ROP3_COPY)],
        )],
        AtomKind::ColorMask => vec![RegSeq::with_values(cb::CB_TARGET_MASK, vec![0xF])],
        AtomKind::BlendColor => vec![RegSeq::new(cb::CB_BLEND_RED, 4)],
        AtomKind::Spi => vec![
            RegSeq::new(spi::SPI_VS_OUT_ID_0, 10),
            RegSeq::new(spi::SPI_VS_OUT_CONFIG, 1),
            RegSeq::new(spi::SPI_PS_INPUT_CNTL_0, spi::MAX_PS_INPUTS),
            RegSeq::new(spi::SPI_PS_IN_CONTROL_0, 3),
        ],
        AtomKind::Vs => vec![
            RegSeq::relocated(sq::SQ_PGM_START_VS, 1),
            RegSeq::new(sq::SQ_PGM_RESOURCES_VS, 1),
        ],
        AtomKind::Ps => vec![
            RegSeq::relocated(sq::SQ_PGM_START_PS, 1),
            RegSeq::new(sq::SQ_PGM_RESOURCES_PS, 2),
        ],
        AtomKind::VsConst | AtomKind::PsConst | AtomKind::Tx | AtomKind::Vtx => Vec::new(),
    }
}

/// Blend control register: one shared register on R600, per target later
pub const fn blend_control_reg(chip: ChipFamily) -> u32 {
    if chip.has_per_mrt_blend() {
        cb::CB_BLEND0_CONTROL
    } else {
        cb::CB_BLEND_CONTROL
    }
}
