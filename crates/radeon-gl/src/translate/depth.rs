//! # Depth Block Translation
//!
//! Depth test, stencil, early-Z, fragment-shader interaction with the depth
//! block and the depth target itself.

use radeon_cmd::regs::{db, set_bit};
use radeon_core::Domain;

use crate::atoms::{AtomKind, SeqReloc, StateCache};
use crate::encode::{encode_compare_func, encode_stencil_op};
use crate::enums::GL_ALWAYS;
use crate::state::{GlState, StencilFace};

/// Whether the draw framebuffer has a depth buffer
fn has_depth(gl: &GlState) -> bool {
    gl.framebuffer.depth.is_some()
}

fn depth_control(cache: &StateCache) -> u32 {
    cache.reg(AtomKind::Db, db::DB_DEPTH_CONTROL).unwrap_or(0)
}

fn set_depth_control(cache: &mut StateCache, value: u32) {
    cache.get_atom(AtomKind::Db).set_reg(db::DB_DEPTH_CONTROL, value);
}

/// Depth test enable, write mask and compare function. The test is only
/// enabled when there is a depth buffer to test against.
pub fn update_depth(gl: &GlState, cache: &mut StateCache) {
    let mut control = depth_control(cache);
    if gl.depth.test && has_depth(gl) {
        control |= db::Z_ENABLE;
        control = set_bit(control, db::Z_WRITE_ENABLE, gl.depth.mask);
        control = db::ZFUNC.set(control, encode_compare_func(gl.depth.func));
    } else {
        control &= !(db::Z_ENABLE | db::Z_WRITE_ENABLE);
    }
    set_depth_control(cache, control);
}

// =============================================================================
// STENCIL
// =============================================================================

/// Stencil enable. Needs a depth buffer that carries stencil bits.
pub fn update_stencil_enable(gl: &GlState, cache: &mut StateCache) {
    let mut control = depth_control(cache);
    let available = gl.framebuffer.has_stencil && has_depth(gl);
    if gl.stencil.enabled && available {
        control |= db::STENCIL_ENABLE | db::BACKFACE_ENABLE;
    } else {
        control &= !(db::STENCIL_ENABLE | db::BACKFACE_ENABLE);
    }
    set_depth_control(cache, control);
}

fn stencil_ref(face: &StencilFace) -> u32 {
    face.reference.clamp(0, 0xFF) as u32
}

/// Stencil functions, references and compare masks, front and back
pub fn update_stencil_func(gl: &GlState, cache: &mut StateCache) {
    let front = &gl.stencil.front;
    let back = gl.stencil.back_face();

    let mut control = depth_control(cache);
    control = db::STENCILFUNC.set(control, encode_compare_func(front.func));
    control = db::STENCILFUNC_BF.set(control, encode_compare_func(back.func));
    set_depth_control(cache, control);

    let atom = cache.get_atom(AtomKind::Db);
    for (reg, face) in [(db::DB_STENCILREFMASK, front), (db::DB_STENCILREFMASK_BF, back)] {
        let mut value = atom.reg(reg).unwrap_or(0);
        value = db::STENCILREF.set(value, stencil_ref(face));
        value = db::STENCILMASK.set(value, face.value_mask);
        atom.set_reg(reg, value);
    }
}

/// Stencil write masks, front and back
pub fn update_stencil_mask(gl: &GlState, cache: &mut StateCache) {
    let front = gl.stencil.front.write_mask;
    let back = gl.stencil.back_face().write_mask;
    let atom = cache.get_atom(AtomKind::Db);
    atom.set_field(db::DB_STENCILREFMASK, db::STENCILWRITEMASK, front);
    atom.set_field(db::DB_STENCILREFMASK_BF, db::STENCILWRITEMASK, back);
}

/// Stencil fail, depth-fail and pass operations, front and back
pub fn update_stencil_op(gl: &GlState, cache: &mut StateCache) {
    let front = &gl.stencil.front;
    let back = gl.stencil.back_face();

    let mut control = depth_control(cache);
    control = db::STENCILFAIL.set(control, encode_stencil_op(front.fail));
    control = db::STENCILZFAIL.set(control, encode_stencil_op(front.zfail));
    control = db::STENCILZPASS.set(control, encode_stencil_op(front.zpass));
    control = db::STENCILFAIL_BF.set(control, encode_stencil_op(back.fail));
    control = db::STENCILZFAIL_BF.set(control, encode_stencil_op(back.zfail));
    control = db::STENCILZPASS_BF.set(control, encode_stencil_op(back.zpass));
    set_depth_control(cache, control);
}

// =============================================================================
// SHADER INTERACTION
// =============================================================================

/// Whether the depth test may run before the fragment program.
///
/// Not when the alpha test can discard fragments or the program writes
/// depth itself.
pub fn early_z_allowed(gl: &GlState) -> bool {
    if gl.color.alpha_enabled && gl.color.alpha_func != GL_ALWAYS {
        return false;
    }
    !gl
        .fragment_program
        .as_ref()
        .is_some_and(|fp| fp.writes_depth)
}

/// Depth test ordering relative to the fragment program
pub fn update_early_z(gl: &GlState, cache: &mut StateCache) {
    let order = if early_z_allowed(gl) {
        db::EARLY_Z_THEN_LATE_Z
    } else {
        db::LATE_Z
    };
    cache
        .get_atom(AtomKind::Db)
        .set_field(db::DB_SHADER_CONTROL, db::Z_ORDER, order);
}

/// Kill and depth export bits of the bound fragment program, plus the
/// hierarchical-Z override
pub fn update_shader_control(gl: &GlState, cache: &mut StateCache) {
    let (kill, export_z) = gl
        .fragment_program
        .as_ref()
        .map_or((false, false), |fp| (fp.uses_kill, fp.writes_depth));

    let atom = cache.get_atom(AtomKind::Db);
    atom.set_bit(db::DB_SHADER_CONTROL, db::KILL_ENABLE, kill);
    atom.set_bit(db::DB_SHADER_CONTROL, db::Z_EXPORT_ENABLE, export_z);
    atom.set_field(db::DB_RENDER_OVERRIDE, db::FORCE_HIZ_ENABLE, db::FORCE_DISABLE);

    update_early_z(gl, cache);
}

// =============================================================================
// DEPTH TARGET
// =============================================================================

/// Depth buffer base and format. Without a depth buffer the base sequence
/// is not emitted.
pub fn update_depth_target(gl: &GlState, cache: &mut StateCache) {
    let fb = &gl.framebuffer;
    let atom = cache.get_atom(AtomKind::Db);
    let Some(bo) = &fb.depth else {
        atom.set_reloc(db::DB_DEPTH_BASE, None);
        return;
    };

    let format = if fb.depth_bits == 16 {
        db::DEPTH_16
    } else {
        db::DEPTH_8_24
    };
    atom.set_reg(db::DB_DEPTH_BASE, 0);
    atom.set_field(db::DB_DEPTH_INFO, db::DEPTH_FORMAT, format);
    atom.set_reloc(db::DB_DEPTH_BASE, Some(SeqReloc::write(bo, Domain::VRAM)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::*;
    use crate::program::{ProgramIo, ShaderProgram};
    use alloc::sync::Arc;
    use alloc::vec;
    use radeon_core::ChipFamily;
    use radeon_mem::{BufferManager, HostBufferManager};

    fn with_depth(gl: &mut GlState, bits: u32, stencil: bool) {
        let mgr = HostBufferManager::new();
        gl.framebuffer.depth = Some(mgr.alloc(4096, 4096, Domain::VRAM).unwrap());
        gl.framebuffer.depth_bits = bits;
        gl.framebuffer.has_stencil = stencil;
    }

    fn control(cache: &StateCache) -> u32 {
        cache.reg(AtomKind::Db, db::DB_DEPTH_CONTROL).unwrap()
    }

    #[test]
    fn test_depth_requires_buffer() {
        let mut gl = GlState::default();
        gl.depth.test = true;
        gl.depth.func = GL_LEQUAL;
        let mut cache = StateCache::new(ChipFamily::R700);

        update_depth(&gl, &mut cache);
        assert_eq!(control(&cache) & db::Z_ENABLE, 0);

        with_depth(&mut gl, 24, false);
        update_depth(&gl, &mut cache);
        let value = control(&cache);
        assert_ne!(value & db::Z_ENABLE, 0);
        assert_ne!(value & db::Z_WRITE_ENABLE, 0);
        assert_eq!(db::ZFUNC.get(value), db::REF_LEQUAL);

        gl.depth.test = false;
        update_depth(&gl, &mut cache);
        assert_eq!(control(&cache) & (db::Z_ENABLE | db::Z_WRITE_ENABLE), 0);
    }

    #[test]
    fn test_stencil_needs_stencil_bits() {
        let mut gl = GlState::default();
        gl.stencil.enabled = true;
        with_depth(&mut gl, 24, false);
        let mut cache = StateCache::new(ChipFamily::R600);
        update_stencil_enable(&gl, &mut cache);
        assert_eq!(control(&cache) & db::STENCIL_ENABLE, 0);

        gl.framebuffer.has_stencil = true;
        update_stencil_enable(&gl, &mut cache);
        assert_ne!(control(&cache) & db::STENCIL_ENABLE, 0);
        assert_ne!(control(&cache) & db::BACKFACE_ENABLE, 0);

        gl.stencil.enabled = false;
        update_stencil_enable(&gl, &mut cache);
        assert_eq!(control(&cache) & (db::STENCIL_ENABLE | db::BACKFACE_ENABLE), 0);
    }

    #[test]
    fn test_two_sided_stencil() {
        let mut gl = GlState::default();
        gl.stencil.two_side = true;
        gl.stencil.front.func = GL_EQUAL;
        gl.stencil.front.reference = 3;
        gl.stencil.front.zpass = GL_INCR_WRAP;
        gl.stencil.back.func = GL_NOTEQUAL;
        gl.stencil.back.reference = 7;
        gl.stencil.back.write_mask = 0x0F;
        gl.stencil.back.fail = GL_INVERT;

        let mut cache = StateCache::new(ChipFamily::R700);
        update_stencil_func(&gl, &mut cache);
        update_stencil_mask(&gl, &mut cache);
        update_stencil_op(&gl, &mut cache);

        let value = control(&cache);
        assert_eq!(db::STENCILFUNC.get(value), db::REF_EQUAL);
        assert_eq!(db::STENCILFUNC_BF.get(value), db::REF_NOTEQUAL);
        assert_eq!(db::STENCILZPASS.get(value), db::STENCIL_INCR_WRAP);
        assert_eq!(db::STENCILFAIL_BF.get(value), db::STENCIL_INVERT);

        let front = cache.reg(AtomKind::Db, db::DB_STENCILREFMASK).unwrap();
        let back = cache.reg(AtomKind::Db, db::DB_STENCILREFMASK_BF).unwrap();
        assert_eq!(db::STENCILREF.get(front), 3);
        assert_eq!(db::STENCILREF.get(back), 7);
        assert_eq!(db::STENCILWRITEMASK.get(front), 0xFF);
        assert_eq!(db::STENCILWRITEMASK.get(back), 0x0F);
    }

    #[test]
    fn test_early_z_follows_depth_writes() {
        let mut gl = GlState::default();
        let mut cache = StateCache::new(ChipFamily::R700);
        let z_order = |cache: &StateCache| {
            db::Z_ORDER.get(cache.reg(AtomKind::Db, db::DB_SHADER_CONTROL).unwrap())
        };

        let mut fp = ShaderProgram::fragment(1, vec![0; 4], ProgramIo::COL0);
        fp.writes_depth = true;
        gl.fragment_program = Some(Arc::new(fp));
        update_shader_control(&gl, &mut cache);
        assert_eq!(z_order(&cache), db::LATE_Z);
        let shader = cache.reg(AtomKind::Db, db::DB_SHADER_CONTROL).unwrap();
        assert_ne!(shader & db::Z_EXPORT_ENABLE, 0);

        gl.fragment_program = Some(Arc::new(ShaderProgram::fragment(
            2,
            vec![0; 4],
            ProgramIo::COL0,
        )));
        update_shader_control(&gl, &mut cache);
        assert_eq!(z_order(&cache), db::EARLY_Z_THEN_LATE_Z);

        gl.color.alpha_enabled = true;
        gl.color.alpha_func = GL_LESS;
        update_early_z(&gl, &mut cache);
        assert_eq!(z_order(&cache), db::LATE_Z);
    }

    #[test]
    fn test_depth_target_format() {
        let mut gl = GlState::default();
        let mut cache = StateCache::new(ChipFamily::R700);
        update_depth_target(&gl, &mut cache);
        let base = &cache.atom(AtomKind::Db).seqs()[4];
        assert_eq!(base.dwords(), 0);

        with_depth(&mut gl, 16, false);
        update_depth_target(&gl, &mut cache);
        let info = cache.reg(AtomKind::Db, db::DB_DEPTH_INFO).unwrap();
        assert_eq!(db::DEPTH_FORMAT.get(info), db::DEPTH_16);
        let base = &cache.atom(AtomKind::Db).seqs()[4];
        assert_eq!(base.dwords(), 2 + 2 + 2);
    }
}
