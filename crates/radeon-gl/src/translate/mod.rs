//! # GL State Translators
//!
//! One function per GL state category. Each reads the mirrored GL state and
//! writes the registers it owns into the [`StateCache`]; an atom turns dirty
//! only when a register value actually changes. Translators never fail:
//! unknown enums are substituted and logged.
//!
//! ```text
//! glBlendFunc ─▶ GlState ─▶ blend::update_blend ─▶ Atom(Blend) ─▶ dirty
//! ```
//!
//! Program upload and input routing run per draw and can reject the draw;
//! they live here too but return [`radeon_core::Result`].

pub mod blend;
pub mod depth;
pub mod program;
pub mod raster;
pub mod routing;
pub mod texture;

use crate::atoms::StateCache;
use crate::enums::*;
use crate::state::{GlState, NewState};
use crate::types::GLenum;

/// Re-run every state translator from `gl`
pub fn replay_all(gl: &GlState, cache: &mut StateCache) {
    invalidate(gl, cache, NewState::ALL);
}

/// Re-translate the categories in `changed`
pub fn invalidate(gl: &GlState, cache: &mut StateCache, changed: NewState) {
    if changed.contains(NewState::COLOR) {
        blend::update_alpha_test(gl, cache);
        blend::update_blend(gl, cache);
        blend::update_blend_color(gl, cache);
        blend::update_logic_op(gl, cache);
        blend::update_color_mask(gl, cache);
    }
    if changed.contains(NewState::DEPTH) {
        depth::update_depth(gl, cache);
    }
    if changed.contains(NewState::STENCIL) {
        depth::update_stencil_enable(gl, cache);
        depth::update_stencil_func(gl, cache);
        depth::update_stencil_mask(gl, cache);
        depth::update_stencil_op(gl, cache);
    }
    if changed.contains(NewState::POLYGON) {
        raster::update_cull(gl, cache);
        raster::update_polygon_mode(gl, cache);
        raster::update_polygon_offset_enable(gl, cache);
        raster::update_polygon_offset(gl, cache);
    }
    if changed.contains(NewState::LINE) {
        raster::update_line_width(gl, cache);
        raster::update_line_stipple(gl, cache);
    }
    if changed.contains(NewState::POINT) {
        raster::update_point_size(gl, cache);
        raster::update_point_minmax(gl, cache);
    }
    if changed.contains(NewState::LIGHT) {
        raster::update_shade_model(gl, cache);
        raster::update_provoking_vertex(gl, cache);
    }
    if changed.contains(NewState::VIEWPORT) {
        raster::update_viewport(gl, cache);
    }
    if changed.contains(NewState::SCISSOR) {
        raster::update_scissor(gl, cache);
    }
    if changed.contains(NewState::TRANSFORM) {
        raster::update_clip_planes(gl, cache);
    }
    if changed.contains(NewState::TEXTURE) {
        texture::update_textures(gl, cache);
    }
    if changed.contains(NewState::PROGRAM) {
        depth::update_shader_control(gl, cache);
    }
    if changed.intersects(NewState::PROGRAM | NewState::PROGRAM_CONSTANTS) {
        program::update_vs_constants(gl, cache);
        program::update_ps_constants(gl, cache);
    }
    if changed.contains(NewState::BUFFERS) {
        // The framebuffer drives depth enables, winding, viewport flip and
        // the polygon offset scale.
        raster::update_color_target(gl, cache);
        depth::update_depth_target(gl, cache);
        depth::update_depth(gl, cache);
        depth::update_stencil_enable(gl, cache);
        raster::update_cull(gl, cache);
        raster::update_viewport(gl, cache);
        raster::update_scissor(gl, cache);
        raster::update_polygon_offset(gl, cache);
    }
}

/// Record `glEnable`/`glDisable` of `cap` in the mirror and re-translate
/// the state it affects.
///
/// Capabilities with no register of their own (smoothing, sprites,
/// stipple, multisample, fog) only update the mirror; the draw path checks
/// them for fallbacks.
pub fn enable(gl: &mut GlState, cache: &mut StateCache, cap: GLenum, on: bool) {
    match cap {
        GL_ALPHA_TEST => {
            gl.color.alpha_enabled = on;
            blend::update_alpha_test(gl, cache);
        }
        GL_BLEND => {
            gl.color.blend_enabled = on;
            blend::update_blend(gl, cache);
        }
        GL_COLOR_LOGIC_OP => {
            gl.color.logic_op_enabled = on;
            blend::update_logic_op(gl, cache);
            blend::update_blend(gl, cache);
        }
        GL_DEPTH_TEST => {
            gl.depth.test = on;
            depth::update_depth(gl, cache);
        }
        GL_DEPTH_CLAMP => {
            gl.depth.clamp = on;
            raster::update_viewport(gl, cache);
        }
        GL_STENCIL_TEST => {
            gl.stencil.enabled = on;
            depth::update_stencil_enable(gl, cache);
        }
        GL_CULL_FACE => {
            gl.polygon.cull_enabled = on;
            raster::update_cull(gl, cache);
        }
        GL_POLYGON_OFFSET_FILL => {
            gl.polygon.offset_fill = on;
            raster::update_polygon_offset_enable(gl, cache);
        }
        GL_POLYGON_OFFSET_LINE => {
            gl.polygon.offset_line = on;
            raster::update_polygon_offset_enable(gl, cache);
        }
        GL_POLYGON_OFFSET_POINT => {
            gl.polygon.offset_point = on;
            raster::update_polygon_offset_enable(gl, cache);
        }
        GL_SCISSOR_TEST => {
            gl.scissor.enabled = on;
            raster::update_scissor(gl, cache);
        }
        GL_LINE_STIPPLE => {
            gl.line.stipple_enabled = on;
            raster::update_line_stipple(gl, cache);
        }
        GL_CLIP_PLANE0..=GL_CLIP_PLANE5 => {
            let plane = (cap - GL_CLIP_PLANE0) as usize;
            gl.clip.enabled[plane] = on;
            raster::update_clip_plane(gl, cache, plane);
        }
        GL_LINE_SMOOTH => gl.line.smooth = on,
        GL_POINT_SMOOTH => gl.point.smooth = on,
        GL_POINT_SPRITE => gl.point.sprite = on,
        GL_POLYGON_STIPPLE => gl.polygon.stipple = on,
        GL_MULTISAMPLE => gl.multisample = on,
        GL_FOG => gl.fog = on,
        other => log::trace!("enable of 0x{:04x} ignored", other),
    }
}
