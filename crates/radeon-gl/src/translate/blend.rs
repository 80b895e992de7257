//! # Color Output Translation
//!
//! Alpha test, blending, blend constant, logic op and the channel write
//! mask.

use radeon_cmd::regs::{cb, sx};

use crate::atoms::{AtomKind, StateCache, blend_control_reg};
use crate::encode::{encode_blend_equation, encode_blend_factor, encode_compare_func, encode_logic_op};
use crate::enums::GL_ALWAYS;
use crate::state::GlState;

use super::depth;

/// Alpha test function, enable and reference. Early-Z depends on the
/// alpha test, so it is re-evaluated too.
pub fn update_alpha_test(gl: &GlState, cache: &mut StateCache) {
    let color = &gl.color;
    let sx_atom = cache.get_atom(AtomKind::Sx);

    let mut control = sx_atom.reg(sx::SX_ALPHA_TEST_CONTROL).unwrap_or(0);
    control = sx::ALPHA_FUNC.set(control, encode_compare_func(color.alpha_func));
    let enabled = color.alpha_enabled && color.alpha_func != GL_ALWAYS;
    control = radeon_cmd::regs::set_bit(control, sx::ALPHA_TEST_ENABLE, enabled);

    sx_atom.set_reg(sx::SX_ALPHA_TEST_CONTROL, control);
    sx_atom.set_f32(sx::SX_ALPHA_REF, color.alpha_ref.clamp(0.0, 1.0));

    depth::update_early_z(gl, cache);
}

/// Blend factors and equations for color target 0.
///
/// Disabled blending, or an active logic op, programs the pass-through
/// ONE/ZERO/ADD combination and turns the target's blend enable off.
pub fn update_blend(gl: &GlState, cache: &mut StateCache) {
    let chip = cache.chip();
    let reg = blend_control_reg(chip);
    let color = &gl.color;

    let blending = color.blend_enabled && !gl.logic_op_active();
    let control = if blending {
        blend_control(gl)
    } else {
        passthrough_blend()
    };
    cache.get_atom(AtomKind::Blend).set_reg(reg, control);

    let logic = cache.get_atom(AtomKind::Logic);
    let mut color_control = logic.reg(cb::CB_COLOR_CONTROL).unwrap_or(0);
    if blending && chip.has_per_mrt_blend() {
        color_control |= cb::PER_MRT_BLEND;
    }
    let targets = cb::TARGET_BLEND_ENABLE.get(color_control);
    let targets = if blending { targets | 1 } else { targets & !1 };
    color_control = cb::TARGET_BLEND_ENABLE.set(color_control, targets);
    logic.set_reg(cb::CB_COLOR_CONTROL, color_control);
}

fn passthrough_blend() -> u32 {
    let mut control = 0;
    control = cb::COLOR_SRCBLEND.set(control, cb::BLEND_ONE);
    control = cb::COLOR_DESTBLEND.set(control, cb::BLEND_ZERO);
    control = cb::COLOR_COMB_FCN.set(control, cb::COMB_DST_PLUS_SRC);
    control = cb::ALPHA_SRCBLEND.set(control, cb::BLEND_ONE);
    control = cb::ALPHA_DESTBLEND.set(control, cb::BLEND_ZERO);
    cb::ALPHA_COMB_FCN.set(control, cb::COMB_DST_PLUS_SRC)
}

fn blend_control(gl: &GlState) -> u32 {
    let blend = &gl.color.blend;
    let equation = &gl.color.equation;
    let mut control = 0;

    let rgb = encode_blend_equation(equation.rgb);
    let (src, dst) = if rgb.force_one {
        (cb::BLEND_ONE, cb::BLEND_ONE)
    } else {
        (
            encode_blend_factor(blend.src_rgb, true),
            encode_blend_factor(blend.dst_rgb, false),
        )
    };
    control = cb::COLOR_SRCBLEND.set(control, src);
    control = cb::COLOR_DESTBLEND.set(control, dst);
    control = cb::COLOR_COMB_FCN.set(control, rgb.func);

    let alpha = encode_blend_equation(equation.alpha);
    let (src, dst) = if alpha.force_one {
        (cb::BLEND_ONE, cb::BLEND_ONE)
    } else {
        (
            encode_blend_factor(blend.src_alpha, true),
            encode_blend_factor(blend.dst_alpha, false),
        )
    };
    control = cb::ALPHA_SRCBLEND.set(control, src);
    control = cb::ALPHA_DESTBLEND.set(control, dst);
    control = cb::ALPHA_COMB_FCN.set(control, alpha.func);

    control | cb::SEPARATE_ALPHA_BLEND
}

/// Constant blend color
pub fn update_blend_color(gl: &GlState, cache: &mut StateCache) {
    let atom = cache.get_atom(AtomKind::BlendColor);
    let [r, g, b, a] = gl.color.blend_color.map(|c| c.clamp(0.0, 1.0));
    atom.set_f32(cb::CB_BLEND_RED, r);
    atom.set_f32(cb::CB_BLEND_GREEN, g);
    atom.set_f32(cb::CB_BLEND_BLUE, b);
    atom.set_f32(cb::CB_BLEND_ALPHA, a);
}

/// Raster op. An inactive logic op is a plain copy.
pub fn update_logic_op(gl: &GlState, cache: &mut StateCache) {
    let rop = if gl.logic_op_active() {
        encode_logic_op(gl.color.logic_op)
    } else {
        cb::ROP3_COPY
    };
    cache
        .get_atom(AtomKind::Logic)
        .set_field(cb::CB_COLOR_CONTROL, cb::ROP3, rop);
}

/// Channel write mask of target 0
pub fn update_color_mask(gl: &GlState, cache: &mut StateCache) {
    let mask = gl
        .color
        .color_mask
        .iter()
        .enumerate()
        .filter(|(_, on)| **on)
        .fold(0, |mask, (bit, _)| mask | (1 << bit));
    cache
        .get_atom(AtomKind::ColorMask)
        .set_field(cb::CB_TARGET_MASK, cb::TARGET0_ENABLE, mask);
}
