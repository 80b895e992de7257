//! # Program Upload
//!
//! Vertex and fragment program state plus their ALU constants. Program
//! microcode lives in one GTT buffer per program, uploaded on first use and
//! kept until the program is evicted.

use alloc::vec::Vec;

use hashbrown::HashMap;
use radeon_cmd::regs::{cb, sq};
use radeon_core::{Domain, Error, Result};
use radeon_mem::{Bo, BufferManager};

use crate::atoms::{AtomKind, RegSeq, SeqReloc, StateCache};
use crate::program::{ProgramId, ShaderProgram};
use crate::state::GlState;

/// Alignment of program code in its buffer
const CODE_ALIGNMENT: u32 = 256;

// =============================================================================
// CODE CACHE
// =============================================================================

/// Uploaded program code, keyed by program identity
#[derive(Debug, Default)]
pub struct ProgramCache {
    code: HashMap<ProgramId, Bo>,
}

impl ProgramCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding the code of `program`, uploading it on first use
    pub fn upload(&mut self, mgr: &dyn BufferManager, program: &ShaderProgram) -> Result<Bo> {
        if let Some(bo) = self.code.get(&program.id) {
            return Ok(bo.clone());
        }
        let size = program.code_bytes().max(4);
        let bo = mgr.alloc(size, CODE_ALIGNMENT, Domain::GTT)?;
        bo.write(0, bytemuck::cast_slice(&program.code))?;
        log::debug!(
            "uploaded {:?} program {} ({} bytes)",
            program.kind,
            program.id.id(),
            program.code_bytes()
        );
        self.code.insert(program.id, bo.clone());
        Ok(bo)
    }

    /// Drop the code of a deleted program
    pub fn evict(&mut self, id: ProgramId) -> bool {
        self.code.remove(&id).is_some()
    }

    /// Programs with uploaded code
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether nothing is uploaded
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

// =============================================================================
// PROGRAM STATE
// =============================================================================

fn resources(program: &ShaderProgram, min_gprs: u32) -> u32 {
    let mut value = sq::NUM_GPRS.set(0, program.num_gprs.max(min_gprs));
    value = sq::STACK_SIZE.set(value, program.stack_size);
    value
}

fn translated(program: Option<&ShaderProgram>) -> Result<&ShaderProgram> {
    match program {
        Some(program) if program.translated => Ok(program),
        Some(program) => {
            log::debug!("{:?} program {} was not translated", program.kind, program.id.id());
            Err(Error::ShaderTranslationFailed)
        }
        None => Err(Error::ShaderTranslationFailed),
    }
}

/// Vertex program start and resources
pub fn update_vertex_program(
    gl: &GlState,
    cache: &mut StateCache,
    programs: &mut ProgramCache,
    mgr: &dyn BufferManager,
) -> Result<()> {
    let vp = translated(gl.vertex_program.as_deref())?;
    let bo = programs.upload(mgr, vp)?;

    let atom = cache.get_atom(AtomKind::Vs);
    atom.set_reg(sq::SQ_PGM_START_VS, 0);
    atom.set_reloc(sq::SQ_PGM_START_VS, Some(SeqReloc::read(&bo, Domain::GTT)));
    atom.set_reg(sq::SQ_PGM_RESOURCES_VS, resources(vp, 1));
    Ok(())
}

/// Fragment program start, resources and exports. Every fragment input
/// needs a register, so the register count covers the inputs.
pub fn update_fragment_program(
    gl: &GlState,
    cache: &mut StateCache,
    programs: &mut ProgramCache,
    mgr: &dyn BufferManager,
) -> Result<()> {
    let fp = translated(gl.fragment_program.as_deref())?;
    let bo = programs.upload(mgr, fp)?;

    let mut exports = sq::EXPORT_MODE.set(0, fp.color_exports);
    if fp.writes_depth {
        exports |= sq::EXPORT_Z;
    }

    let atom = cache.get_atom(AtomKind::Ps);
    atom.set_reg(sq::SQ_PGM_START_PS, 0);
    atom.set_reloc(sq::SQ_PGM_START_PS, Some(SeqReloc::read(&bo, Domain::GTT)));
    atom.set_reg(sq::SQ_PGM_RESOURCES_PS, resources(fp, fp.inputs.bits().count_ones()));
    atom.set_reg(sq::SQ_PGM_EXPORTS_PS, exports);

    // Four channels per exported color.
    let mask = match fp.color_exports.min(8) {
        8 => u32::MAX,
        n => (1 << (n * 4)) - 1,
    };
    cache.get_atom(AtomKind::Cb).set_reg(cb::CB_SHADER_MASK, mask);
    Ok(())
}

// =============================================================================
// CONSTANTS
// =============================================================================

fn upload_constants(cache: &mut StateCache, kind: AtomKind, base: u32, constants: &[[f32; 4]]) {
    let count = constants.len().min(sq::MAX_ALU_CONSTANTS);
    let values: Vec<u32> = constants[..count]
        .iter()
        .flat_map(|c| c.map(f32::to_bits))
        .collect();

    let atom = cache.get_atom(kind);
    let unchanged = match atom.seqs() {
        [] => values.is_empty(),
        [seq] => seq.values() == values.as_slice(),
        _ => false,
    };
    if unchanged {
        return;
    }
    let seqs = if values.is_empty() {
        Vec::new()
    } else {
        alloc::vec![RegSeq::with_values(base, values)]
    };
    atom.replace_seqs(seqs);
}

/// Vertex program constants
pub fn update_vs_constants(gl: &GlState, cache: &mut StateCache) {
    let constants = gl
        .vertex_program
        .as_ref()
        .map_or(&[][..], |vp| vp.constants.as_slice());
    upload_constants(cache, AtomKind::VsConst, sq::SQ_ALU_CONSTANT_VS_0, constants);
}

/// Fragment program constants
pub fn update_ps_constants(gl: &GlState, cache: &mut StateCache) {
    let constants = gl
        .fragment_program
        .as_ref()
        .map_or(&[][..], |fp| fp.constants.as_slice());
    upload_constants(cache, AtomKind::PsConst, sq::SQ_ALU_CONSTANT0_0, constants);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ProgramIo, ProgramKind};
    use alloc::sync::Arc;
    use alloc::vec;
    use radeon_core::ChipFamily;
    use radeon_mem::HostBufferManager;

    fn with_programs(gl: &mut GlState) {
        let mut vp = ShaderProgram::vertex(1, vec![0xDEAD_BEEF, 2, 3, 4], ProgramIo::COL0);
        vp.num_gprs = 3;
        vp.constants = vec![[1.0, 2.0, 3.0, 4.0], [0.5; 4]];
        let mut fp = ShaderProgram::fragment(2, vec![5, 6], ProgramIo::COL0 | ProgramIo::tex(0));
        fp.writes_depth = true;
        gl.vertex_program = Some(Arc::new(vp));
        gl.fragment_program = Some(Arc::new(fp));
    }

    #[test]
    fn test_code_uploaded_once() {
        let mgr = HostBufferManager::new();
        let mut programs = ProgramCache::new();
        let vp = ShaderProgram::vertex(7, vec![0x1234_5678], ProgramIo::COL0);

        let first = programs.upload(&mgr, &vp).unwrap();
        let second = programs.upload(&mgr, &vp).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(programs.len(), 1);
        assert_eq!(&first.lock()[..4], &0x1234_5678u32.to_ne_bytes());

        assert!(programs.evict(vp.id));
        assert!(programs.is_empty());
    }

    #[test]
    fn test_program_atoms() {
        let mgr = HostBufferManager::new();
        let mut programs = ProgramCache::new();
        let mut gl = GlState::default();
        with_programs(&mut gl);
        let mut cache = StateCache::new(ChipFamily::R700);

        update_vertex_program(&gl, &mut cache, &mut programs, &mgr).unwrap();
        update_fragment_program(&gl, &mut cache, &mut programs, &mgr).unwrap();

        let vs = cache.reg(AtomKind::Vs, sq::SQ_PGM_RESOURCES_VS).unwrap();
        assert_eq!(sq::NUM_GPRS.get(vs), 3);
        assert!(cache.atom(AtomKind::Vs).seqs()[0].reloc().is_some());

        let ps = cache.reg(AtomKind::Ps, sq::SQ_PGM_RESOURCES_PS).unwrap();
        assert_eq!(sq::NUM_GPRS.get(ps), 2);
        let exports = cache.reg(AtomKind::Ps, sq::SQ_PGM_EXPORTS_PS).unwrap();
        assert_eq!(sq::EXPORT_MODE.get(exports), 1);
        assert_ne!(exports & sq::EXPORT_Z, 0);
        assert_eq!(cache.reg(AtomKind::Cb, cb::CB_SHADER_MASK), Some(0xF));
        assert_eq!(programs.len(), 2);
    }

    #[test]
    fn test_untranslated_program_fails() {
        let mgr = HostBufferManager::new();
        let mut programs = ProgramCache::new();
        let mut gl = GlState::default();
        gl.vertex_program = Some(Arc::new(ShaderProgram::untranslated(3, ProgramKind::Vertex)));
        let mut cache = StateCache::new(ChipFamily::R600);

        assert_eq!(
            update_vertex_program(&gl, &mut cache, &mut programs, &mgr),
            Err(Error::ShaderTranslationFailed)
        );
        assert!(programs.is_empty());
        assert_eq!(
            update_fragment_program(&gl, &mut cache, &mut programs, &mgr),
            Err(Error::ShaderTranslationFailed)
        );
    }

    #[test]
    fn test_constants_as_float_bits() {
        let mut gl = GlState::default();
        with_programs(&mut gl);
        let mut cache = StateCache::new(ChipFamily::R700);
        update_vs_constants(&gl, &mut cache);
        update_ps_constants(&gl, &mut cache);

        let seqs = cache.atom(AtomKind::VsConst).seqs();
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].start(), 0x31000);
        assert_eq!(seqs[0].values()[1], 2.0f32.to_bits());
        assert_eq!(seqs[0].values().len(), 8);
        assert_eq!(cache.reg(AtomKind::VsConst, 0x31010), Some(0.5f32.to_bits()));
        assert!(cache.atom(AtomKind::PsConst).seqs().is_empty());
    }

    #[test]
    fn test_unchanged_constants_stay_clean() {
        let mut gl = GlState::default();
        with_programs(&mut gl);
        let mut cache = StateCache::new(ChipFamily::R700);
        update_vs_constants(&gl, &mut cache);
        let mut cs = radeon_cmd::CommandStream::new(
            &radeon_cmd::CmdBufConfig::default(),
            alloc::boxed::Box::new(radeon_cmd::CaptureSubmitter::new()),
        );
        cache.emit_dirty(&mut cs).unwrap();

        update_vs_constants(&gl, &mut cache);
        assert!(!cache.is_dirty(AtomKind::VsConst));
    }
}
