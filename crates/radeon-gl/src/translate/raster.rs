//! # Rasterizer Translation
//!
//! Face culling, polygon mode and offset, point and line sizes, shading,
//! viewport, scissor, user clip planes and the color target.

use radeon_cmd::regs::{cb, pa, set_bit, spi};
use radeon_core::Domain;

use crate::atoms::{AtomKind, SeqReloc, StateCache};
use crate::enums::*;
use crate::state::GlState;
use crate::types::GLenum;

fn mode_cntl(cache: &StateCache) -> u32 {
    cache.reg(AtomKind::Pa, pa::PA_SU_SC_MODE_CNTL).unwrap_or(0)
}

fn set_mode_cntl(cache: &mut StateCache, value: u32) {
    cache.get_atom(AtomKind::Pa).set_reg(pa::PA_SU_SC_MODE_CNTL, value);
}

/// Register units for a GL size: fixed point, scaled by six
fn size_units(size: f32) -> u32 {
    (size * pa::SIZE_SCALE) as u32
}

// =============================================================================
// POLYGONS
// =============================================================================

/// Cull mode and front-face winding. Rendering to a user framebuffer
/// flips y, which inverts the winding.
pub fn update_cull(gl: &GlState, cache: &mut StateCache) {
    let polygon = &gl.polygon;
    let mut value = mode_cntl(cache) & !(pa::FACE | pa::CULL_FRONT | pa::CULL_BACK);

    if polygon.cull_enabled {
        value |= match polygon.cull_face {
            GL_FRONT => pa::CULL_FRONT,
            GL_BACK => pa::CULL_BACK,
            GL_FRONT_AND_BACK => pa::CULL_FRONT | pa::CULL_BACK,
            _ => 0,
        };
    }
    if polygon.front_face == GL_CW {
        value |= pa::FACE;
    }
    if gl.framebuffer.user_fbo {
        value ^= pa::FACE;
    }
    set_mode_cntl(cache, value);
}

fn fill_type(mode: GLenum) -> u32 {
    match mode {
        GL_LINE => pa::X_DRAW_LINES,
        GL_POINT => pa::X_DRAW_POINTS,
        _ => pa::X_DRAW_TRIANGLES,
    }
}

/// Dual polygon mode, only turned on when a face is not filled
pub fn update_polygon_mode(gl: &GlState, cache: &mut StateCache) {
    let polygon = &gl.polygon;
    let mut value = pa::POLY_MODE.set(mode_cntl(cache), 0);

    if polygon.front_mode != GL_FILL || polygon.back_mode != GL_FILL {
        value = pa::POLY_MODE.set(value, 1);
        value = pa::POLYMODE_FRONT_PTYPE.set(value, fill_type(polygon.front_mode));
        value = pa::POLYMODE_BACK_PTYPE.set(value, fill_type(polygon.back_mode));
    }
    set_mode_cntl(cache, value);
}

/// Polygon offset enables, per primitive class
pub fn update_polygon_offset_enable(gl: &GlState, cache: &mut StateCache) {
    let polygon = &gl.polygon;
    let mut value = mode_cntl(cache);
    value = set_bit(value, pa::POLY_OFFSET_FRONT_ENABLE, polygon.offset_fill);
    value = set_bit(value, pa::POLY_OFFSET_BACK_ENABLE, polygon.offset_fill);
    value = set_bit(
        value,
        pa::POLY_OFFSET_PARA_ENABLE,
        polygon.offset_line || polygon.offset_point,
    );
    set_mode_cntl(cache, value);
}

/// Polygon offset factor and units. Units are scaled to the depth
/// buffer's precision.
pub fn update_polygon_offset(gl: &GlState, cache: &mut StateCache) {
    let (units_scale, neg_db_bits) = match gl.framebuffer.depth_bits {
        16 => (4.0, -16i32),
        _ => (2.0, -24i32),
    };
    let factor = gl.polygon.offset_factor * 16.0;
    let units = gl.polygon.offset_units * units_scale;

    let atom = cache.get_atom(AtomKind::Polygon);
    atom.set_field(
        pa::PA_SU_POLY_OFFSET_DB_FMT_CNTL,
        pa::POLY_OFFSET_NEG_NUM_DB_BITS,
        neg_db_bits as u32,
    );
    atom.set_f32(pa::PA_SU_POLY_OFFSET_FRONT_SCALE, factor);
    atom.set_f32(pa::PA_SU_POLY_OFFSET_FRONT_OFFSET, units);
    atom.set_f32(pa::PA_SU_POLY_OFFSET_BACK_SCALE, factor);
    atom.set_f32(pa::PA_SU_POLY_OFFSET_BACK_OFFSET, units);
}

// =============================================================================
// POINTS AND LINES
// =============================================================================

/// Point size, clamped to the current limits
pub fn update_point_size(gl: &GlState, cache: &mut StateCache) {
    let point = &gl.point;
    let size = size_units(point.size.max(point.min_size).min(point.max_size));
    let mut value = 0;
    value = pa::POINT_HEIGHT.set(value, size);
    value = pa::POINT_WIDTH.set(value, size);
    cache.get_atom(AtomKind::Pa).set_reg(pa::PA_SU_POINT_SIZE, value);
}

/// Attenuated point size limits
pub fn update_point_minmax(gl: &GlState, cache: &mut StateCache) {
    let point = &gl.point;
    let mut value = 0;
    value = pa::MIN_SIZE.set(value, size_units(point.min_size));
    value = pa::MAX_SIZE.set(value, size_units(point.max_size));
    cache.get_atom(AtomKind::Pa).set_reg(pa::PA_SU_POINT_MINMAX, value);
}

/// Line width, with both pattern counters running
pub fn update_line_width(gl: &GlState, cache: &mut StateCache) {
    let point = &gl.point;
    let width = gl.line.width.max(1.0).min(point.max_size);
    let value = pa::LINE_WIDTH.set(pa::LINE_CNT_HO | pa::LINE_CNT_VE, size_units(width));
    cache.get_atom(AtomKind::Pa).set_reg(pa::PA_SU_LINE_CNTL, value);
}

/// Line stipple pattern and repeat, plus the stipple enable
pub fn update_line_stipple(gl: &GlState, cache: &mut StateCache) {
    let line = &gl.line;
    let repeat = (line.stipple_factor.clamp(1, 256) - 1) as u32;
    let mut value = 0;
    value = pa::LINE_PATTERN.set(value, line.stipple_pattern as u32);
    value = pa::REPEAT_COUNT.set(value, repeat);
    value = pa::AUTO_RESET_CNTL.set(value, 1);

    let atom = cache.get_atom(AtomKind::Pa);
    atom.set_reg(pa::PA_SC_LINE_STIPPLE, value);
    atom.set_bit(pa::PA_SC_MODE_CNTL, pa::LINE_STIPPLE_ENABLE, line.stipple_enabled);
}

// =============================================================================
// SHADING
// =============================================================================

/// Flat or smooth interpolation
pub fn update_shade_model(gl: &GlState, cache: &mut StateCache) {
    cache.get_atom(AtomKind::Spi).set_bit(
        spi::SPI_INTERP_CONTROL_0,
        spi::FLAT_SHADE_ENA,
        gl.shade_model == GL_FLAT,
    );
}

/// Which vertex of a primitive provides flat-shaded attributes
pub fn update_provoking_vertex(gl: &GlState, cache: &mut StateCache) {
    let value = set_bit(mode_cntl(cache), pa::PROVOKING_VTX_LAST, gl.provoking_vertex_last);
    set_mode_cntl(cache, value);
}

// =============================================================================
// VIEWPORT / SCISSOR / CLIP
// =============================================================================

/// Viewport transform and depth range.
///
/// The window system's origin is top-left, so window rendering flips y
/// around the framebuffer height; user framebuffers are not flipped.
pub fn update_viewport(gl: &GlState, cache: &mut StateCache) {
    let vp = &gl.viewport;
    let (y_scale, y_bias) = if gl.framebuffer.user_fbo {
        (1.0, 0.0)
    } else {
        (-1.0, gl.framebuffer.height as f32)
    };

    let sx = vp.width * 0.5;
    let tx = vp.x + sx;
    let sy = vp.height * 0.5 * y_scale;
    let ty = (vp.y + vp.height * 0.5) * y_scale + y_bias;
    let sz = (vp.far - vp.near) * 0.5;
    let tz = (vp.far + vp.near) * 0.5;

    let (zmin, zmax) = if gl.depth.clamp {
        (vp.near.min(vp.far), vp.near.max(vp.far))
    } else {
        (0.0, 1.0)
    };

    let atom = cache.get_atom(AtomKind::Viewport);
    atom.set_f32(pa::PA_SC_VPORT_ZMIN_0, zmin);
    atom.set_f32(pa::PA_SC_VPORT_ZMAX_0, zmax);
    atom.set_f32(pa::PA_CL_VPORT_XSCALE_0, sx);
    atom.set_f32(pa::PA_CL_VPORT_XOFFSET_0, tx);
    atom.set_f32(pa::PA_CL_VPORT_YSCALE_0, sy);
    atom.set_f32(pa::PA_CL_VPORT_YOFFSET_0, ty);
    atom.set_f32(pa::PA_CL_VPORT_ZSCALE_0, sz);
    atom.set_f32(pa::PA_CL_VPORT_ZOFFSET_0, tz);
}

/// Scissor rectangle in hardware coordinates, bottom-right exclusive
fn scissor_rect(gl: &GlState) -> (u32, u32, u32, u32) {
    let fb = &gl.framebuffer;
    if !gl.scissor.enabled {
        return (0, 0, fb.width, fb.height);
    }

    let rect = &gl.scissor.rect;
    let x1 = rect.x.max(0) as u32;
    let x2 = (rect.x + rect.width as i32).max(0) as u32;
    let (y1, y2) = if fb.user_fbo {
        (rect.y.max(0), rect.y + rect.height as i32)
    } else {
        let height = fb.height as i32;
        (height - (rect.y + rect.height as i32), height - rect.y)
    };
    (x1, y1.max(0) as u32, x2, y2.max(0) as u32)
}

/// Generic and viewport scissors. Nothing to clip against without a
/// color buffer.
pub fn update_scissor(gl: &GlState, cache: &mut StateCache) {
    if gl.framebuffer.color.is_none() {
        return;
    }
    let (x1, y1, x2, y2) = scissor_rect(gl);
    let tl = pa::SCISSOR_Y.set(pa::SCISSOR_X.set(pa::WINDOW_OFFSET_DISABLE, x1), y1);
    let br = pa::SCISSOR_Y.set(pa::SCISSOR_X.set(0, x2), y2);

    let atom = cache.get_atom(AtomKind::Scissor);
    atom.set_reg(pa::PA_SC_GENERIC_SCISSOR_TL, tl);
    atom.set_reg(pa::PA_SC_GENERIC_SCISSOR_BR, br);
    atom.set_reg(pa::PA_SC_VPORT_SCISSOR_0_TL, tl);
    atom.set_reg(pa::PA_SC_VPORT_SCISSOR_0_BR, br);
}

/// User clip plane `plane`: enable bit and equation
pub fn update_clip_plane(gl: &GlState, cache: &mut StateCache, plane: usize) {
    if plane >= pa::MAX_CLIP_PLANES {
        return;
    }
    let atom = cache.get_atom(AtomKind::Clip);
    let enables = pa::UCP_ENA.get(atom.reg(pa::PA_CL_CLIP_CNTL).unwrap_or(0));
    let enables = if gl.clip.enabled[plane] {
        enables | (1 << plane)
    } else {
        enables & !(1 << plane)
    };
    atom.set_field(pa::PA_CL_CLIP_CNTL, pa::UCP_ENA, enables);

    let base = pa::PA_CL_UCP_0_X + plane as u32 * pa::UCP_STRIDE;
    for (i, &coef) in gl.clip.planes[plane].iter().enumerate() {
        atom.set_f32(base + i as u32 * 4, coef);
    }
}

/// Every user clip plane
pub fn update_clip_planes(gl: &GlState, cache: &mut StateCache) {
    for plane in 0..pa::MAX_CLIP_PLANES {
        update_clip_plane(gl, cache, plane);
    }
}

// =============================================================================
// COLOR TARGET
// =============================================================================

/// Color buffer base, size and format
pub fn update_color_target(gl: &GlState, cache: &mut StateCache) {
    let fb = &gl.framebuffer;
    let atom = cache.get_atom(AtomKind::Cb);
    let Some(bo) = &fb.color else {
        atom.set_reloc(cb::CB_COLOR0_BASE, None);
        return;
    };

    let pitch_tiles = (fb.pitch / 8).max(1) - 1;
    let slice_tiles = (fb.pitch * fb.height / 64).max(1) - 1;
    let mut size = 0;
    size = cb::PITCH_TILE_MAX.set(size, pitch_tiles);
    size = cb::SLICE_TILE_MAX.set(size, slice_tiles);

    atom.set_reg(cb::CB_COLOR0_BASE, 0);
    atom.set_reg(cb::CB_COLOR0_SIZE, size);
    atom.set_reg(cb::CB_COLOR0_INFO, fb.color_info);
    atom.set_reloc(cb::CB_COLOR0_BASE, Some(SeqReloc::write(bo, Domain::VRAM)));
}
