//! # Texture Translation
//!
//! Builds one resource and one sampler per enabled texture unit into the
//! `Tx` atom. The atom is rebuilt wholesale but only marked dirty when the
//! result differs from what is cached.

use alloc::sync::Arc;
use alloc::vec::Vec;

use radeon_cmd::regs::sq;
use radeon_core::{ChipFamily, Domain};
use radeon_mem::Bo;

use crate::atoms::{AtomKind, RegSeq, SeqReloc, StateCache};
use crate::enums::*;
use crate::state::{GlState, TextureObject};
use crate::types::GLenum;

/// Resource dwords per unit on `chip`
pub const fn resource_dwords(chip: ChipFamily) -> u32 {
    match chip {
        ChipFamily::Evergreen => sq::EG_RESOURCE_DWORDS,
        _ => sq::RESOURCE_DWORDS,
    }
}

/// Address of texture resource `unit`
pub const fn resource_reg(chip: ChipFamily, unit: u32) -> u32 {
    sq::SQ_TEX_RESOURCE_WORD0_0 + unit * resource_dwords(chip) * 4
}

/// Address of sampler `unit`
pub const fn sampler_reg(unit: u32) -> u32 {
    sq::SQ_TEX_SAMPLER_WORD0_0 + unit * sq::SAMPLER_DWORDS * 4
}

// =============================================================================
// SAMPLER ENCODING
// =============================================================================

fn encode_wrap(wrap: GLenum) -> u32 {
    match wrap {
        GL_REPEAT => sq::SQ_TEX_WRAP,
        GL_MIRRORED_REPEAT => sq::SQ_TEX_MIRROR,
        GL_CLAMP_TO_EDGE => sq::SQ_TEX_CLAMP_LAST_TEXEL,
        GL_MIRROR_CLAMP_TO_EDGE_EXT => sq::SQ_TEX_MIRROR_ONCE_LAST_TEXEL,
        GL_CLAMP => sq::SQ_TEX_CLAMP_HALF_BORDER,
        GL_MIRROR_CLAMP_EXT => sq::SQ_TEX_MIRROR_ONCE_HALF_BORDER,
        GL_CLAMP_TO_BORDER => sq::SQ_TEX_CLAMP_BORDER,
        GL_MIRROR_CLAMP_TO_BORDER_EXT => sq::SQ_TEX_MIRROR_ONCE_BORDER,
        other => {
            log::debug!("unknown wrap mode 0x{:04x}, using repeat", other);
            sq::SQ_TEX_WRAP
        }
    }
}

fn encode_mag_filter(filter: GLenum) -> u32 {
    match filter {
        GL_NEAREST => sq::SQ_TEX_XY_FILTER_POINT,
        _ => sq::SQ_TEX_XY_FILTER_BILINEAR,
    }
}

/// Minification filter as (xy filter, mip filter)
fn encode_min_filter(filter: GLenum) -> (u32, u32) {
    match filter {
        GL_NEAREST => (sq::SQ_TEX_XY_FILTER_POINT, sq::SQ_TEX_Z_FILTER_NONE),
        GL_LINEAR => (sq::SQ_TEX_XY_FILTER_BILINEAR, sq::SQ_TEX_Z_FILTER_NONE),
        GL_NEAREST_MIPMAP_NEAREST => (sq::SQ_TEX_XY_FILTER_POINT, sq::SQ_TEX_Z_FILTER_POINT),
        GL_LINEAR_MIPMAP_NEAREST => (sq::SQ_TEX_XY_FILTER_BILINEAR, sq::SQ_TEX_Z_FILTER_POINT),
        GL_NEAREST_MIPMAP_LINEAR => (sq::SQ_TEX_XY_FILTER_POINT, sq::SQ_TEX_Z_FILTER_LINEAR),
        _ => (sq::SQ_TEX_XY_FILTER_BILINEAR, sq::SQ_TEX_Z_FILTER_LINEAR),
    }
}

/// Encoded sampling modes of one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerModes {
    /// Wrap modes for s, t, r
    pub wrap: [u32; 3],
    /// Magnification filter
    pub mag: u32,
    /// Minification filter
    pub min: u32,
    /// Mip filter
    pub mip: u32,
}

impl SamplerModes {
    /// Encode the GL sampling state of `tex`
    pub fn from_texture(tex: &TextureObject) -> Self {
        let (min, mip) = encode_min_filter(tex.min_filter);
        Self {
            wrap: tex.wrap.map(encode_wrap),
            mag: encode_mag_filter(tex.mag_filter),
            min,
            mip,
        }
    }
}

/// Clamp-to-half-border wraps are ignored by the sampler while either
/// filter is plain `GL_NEAREST`. Mipmapped minification never counts as
/// nearest here, whatever its per-level filter.
///
/// With exactly one nearest filter, that filter is promoted to bilinear.
/// With both nearest, the clamp wraps become clamp-to-edge, which
/// samples identically at texel centers.
pub fn fix_clamp_filter(modes: SamplerModes, min_filter: GLenum, mag_filter: GLenum) -> SamplerModes {
    let half_border = |w: u32| {
        w == sq::SQ_TEX_CLAMP_HALF_BORDER || w == sq::SQ_TEX_MIRROR_ONCE_HALF_BORDER
    };
    if !modes.wrap.iter().copied().any(half_border) {
        return modes;
    }

    let mut fixed = modes;
    match (mag_filter == GL_NEAREST, min_filter == GL_NEAREST) {
        (false, false) => {}
        (true, false) => fixed.mag = sq::SQ_TEX_XY_FILTER_BILINEAR,
        (false, true) => fixed.min = sq::SQ_TEX_XY_FILTER_BILINEAR,
        (true, true) => {
            for wrap in fixed.wrap.iter_mut() {
                *wrap = match *wrap {
                    sq::SQ_TEX_CLAMP_HALF_BORDER => sq::SQ_TEX_CLAMP_LAST_TEXEL,
                    sq::SQ_TEX_MIRROR_ONCE_HALF_BORDER => sq::SQ_TEX_MIRROR_ONCE_LAST_TEXEL,
                    other => other,
                };
            }
        }
    }
    fixed
}

/// LOD bias in 1/32 steps, clamped to the signed 12-bit field
pub fn encode_lod_bias(bias: f32) -> u32 {
    let steps = ((bias * 32.0) as i32).clamp(-512, 511);
    sq::LOD_BIAS.set(0, steps as u32)
}

/// LOD limit in 4.6 fixed point
fn encode_lod(lod: f32) -> u32 {
    (lod.clamp(0.0, 15.0) * 64.0) as u32
}

fn sampler_words(tex: &TextureObject, unit_bias: f32) -> [u32; 3] {
    let modes = fix_clamp_filter(SamplerModes::from_texture(tex), tex.min_filter, tex.mag_filter);

    let mut word0 = 0;
    word0 = sq::CLAMP_X.set(word0, modes.wrap[0]);
    word0 = sq::CLAMP_Y.set(word0, modes.wrap[1]);
    word0 = sq::CLAMP_Z.set(word0, modes.wrap[2]);
    word0 = sq::XY_MAG_FILTER.set(word0, modes.mag);
    word0 = sq::XY_MIN_FILTER.set(word0, modes.min);
    word0 = sq::MIP_FILTER.set(word0, modes.mip);

    let mut word1 = encode_lod_bias(tex.lod_bias + unit_bias);
    word1 = sq::MIN_LOD.set(word1, encode_lod(tex.min_lod));
    word1 = sq::MAX_LOD.set(word1, encode_lod(tex.max_lod));

    [word0, word1, 0]
}

// =============================================================================
// RESOURCE ENCODING
// =============================================================================

fn resource_words(chip: ChipFamily, tex: &TextureObject) -> Vec<u32> {
    let mut words = alloc::vec![0; resource_dwords(chip) as usize];

    let mut word0 = sq::TEX_DIM.set(0, sq::SQ_TEX_DIM_2D);
    word0 = sq::TEX_PITCH.set(word0, (tex.pitch / 8).max(1) - 1);
    word0 = sq::TEX_WIDTH.set(word0, tex.width.max(1) - 1);
    words[0] = word0;
    words[1] = sq::TEX_DATA_FORMAT.set(sq::TEX_HEIGHT.set(0, tex.height.max(1) - 1), tex.format);
    words[5] = sq::TEX_LAST_LEVEL.set(0, tex.last_level);

    let last = words.len() - 1;
    words[last] = sq::SQ_TEX_VTX_VALID_TEXTURE;
    words
}

/// Storage of every enabled unit's texture, for working-set validation
pub fn texture_buffers(gl: &GlState, chip: ChipFamily) -> impl Iterator<Item = &Bo> {
    (0..chip.max_texture_units().min(gl.textures.len()))
        .filter_map(move |unit| gl.active_texture(unit))
        .filter_map(|tex| tex.bo.as_ref())
}

fn same_payload(a: &[RegSeq], b: &[RegSeq]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(a, b)| {
            a.start() == b.start()
                && a.values() == b.values()
                && match (a.reloc(), b.reloc()) {
                    (None, None) => true,
                    (Some(x), Some(y)) => Arc::ptr_eq(&x.bo, &y.bo) && x.read == y.read,
                    _ => false,
                }
        })
}

/// Resources and samplers of every enabled unit. A unit whose texture has
/// no storage yet is skipped.
pub fn update_textures(gl: &GlState, cache: &mut StateCache) {
    let chip = cache.chip();
    let units = chip.max_texture_units().min(gl.textures.len());
    let mut seqs = Vec::new();

    for unit in 0..units {
        let Some(tex) = gl.active_texture(unit) else {
            continue;
        };
        let Some(bo) = &tex.bo else {
            log::debug!("texture unit {} has no storage, skipped", unit);
            continue;
        };
        let bias = gl.textures[unit].lod_bias;
        let reloc = SeqReloc::read(bo, Domain::GTT | Domain::VRAM);

        seqs.push(
            RegSeq::with_values(resource_reg(chip, unit as u32), resource_words(chip, tex))
                .with_reloc(reloc),
        );
        seqs.push(RegSeq::with_values(
            sampler_reg(unit as u32),
            sampler_words(tex, bias).to_vec(),
        ));
    }

    if !same_payload(cache.atom(AtomKind::Tx).seqs(), &seqs) {
        cache.get_atom(AtomKind::Tx).replace_seqs(seqs);
    }
}
