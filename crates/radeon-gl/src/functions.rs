//! # Driver Entry Points
//!
//! The calls the GL core makes into the driver when an API function
//! changes state or draws. Each records the new value in the GL state
//! mirror and re-runs only the translators that read it.

use alloc::sync::Arc;
use alloc::vec::Vec;

use radeon_core::Result;

use crate::context::R600Context;
use crate::enums::*;
use crate::program::{ProgramKind, ShaderProgram};
use crate::render::{DrawCall, DrawOutcome};
use crate::state::{Framebuffer, NewState, ScissorRect, StencilFace, TextureObject};
use crate::translate::{blend, depth, raster, texture};
use crate::types::GLenum;

/// State-change and draw entry points of a GL driver
pub trait DriverFunctions {
    /// `glAlphaFunc`
    fn alpha_func(&mut self, func: GLenum, reference: f32);
    /// `glBlendColor`
    fn blend_color(&mut self, color: [f32; 4]);
    /// `glBlendEquationSeparate`
    fn blend_equation_separate(&mut self, rgb: GLenum, alpha: GLenum);
    /// `glBlendFuncSeparate`
    fn blend_func_separate(&mut self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum);
    /// `glColorMask`
    fn color_mask(&mut self, mask: [bool; 4]);
    /// `glLogicOp`
    fn logic_op(&mut self, op: GLenum);

    /// `glDepthFunc`
    fn depth_func(&mut self, func: GLenum);
    /// `glDepthMask`
    fn depth_mask(&mut self, on: bool);
    /// `glStencilFuncSeparate`
    fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: i32, mask: u32);
    /// `glStencilMaskSeparate`
    fn stencil_mask_separate(&mut self, face: GLenum, mask: u32);
    /// `glStencilOpSeparate`
    fn stencil_op_separate(&mut self, face: GLenum, fail: GLenum, zfail: GLenum, zpass: GLenum);

    /// `glCullFace`
    fn cull_face(&mut self, face: GLenum);
    /// `glFrontFace`
    fn front_face(&mut self, winding: GLenum);
    /// `glPolygonMode`
    fn polygon_mode(&mut self, face: GLenum, mode: GLenum);
    /// `glPolygonOffset`
    fn polygon_offset(&mut self, factor: f32, units: f32);
    /// `glLineWidth`
    fn line_width(&mut self, width: f32);
    /// `glLineStipple`
    fn line_stipple(&mut self, factor: i32, pattern: u16);
    /// `glPointSize`
    fn point_size(&mut self, size: f32);
    /// `glPointParameter` size range
    fn point_size_range(&mut self, min: f32, max: f32);
    /// `glShadeModel`
    fn shade_model(&mut self, mode: GLenum);
    /// `glProvokingVertex`
    fn provoking_vertex(&mut self, convention: GLenum);

    /// `glViewport`
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    /// `glDepthRange`
    fn depth_range(&mut self, near: f32, far: f32);
    /// `glScissor`
    fn scissor(&mut self, x: i32, y: i32, width: u32, height: u32);
    /// `glClipPlane`, equation in eye space
    fn clip_plane(&mut self, plane: GLenum, equation: [f32; 4]);
    /// `glEnable` / `glDisable`
    fn enable(&mut self, cap: GLenum, on: bool);
    /// `glRenderMode`
    fn render_mode(&mut self, mode: GLenum);

    /// Texture binding or parameter change on `unit`
    fn bind_texture(&mut self, unit: usize, texture: Option<Arc<TextureObject>>, enabled: bool);
    /// `GL_TEXTURE_LOD_BIAS` of the texture environment of `unit`
    fn texture_unit_lod_bias(&mut self, unit: usize, bias: f32);
    /// Program binding
    fn use_program(&mut self, vertex: Option<Arc<ShaderProgram>>, fragment: Option<Arc<ShaderProgram>>);
    /// Local parameters of the bound `kind` program changed
    fn program_constants(&mut self, kind: ProgramKind, constants: Vec<[f32; 4]>);
    /// Draw framebuffer or one of its attachments changed
    fn draw_buffer(&mut self, framebuffer: Framebuffer);

    /// Draw primitives; a rejected draw must be drawn in software
    fn draw_prims(&mut self, draw: &DrawCall<'_>) -> Result<DrawOutcome>;
    /// `glFlush`
    fn flush(&mut self) -> Result<()>;
    /// `glFinish`
    fn finish(&mut self) -> Result<()>;
}

/// Stencil faces addressed by `face`: (front, back)
fn stencil_faces(face: GLenum) -> (bool, bool) {
    match face {
        GL_FRONT => (true, false),
        GL_BACK => (false, true),
        _ => (true, true),
    }
}

impl R600Context {
    fn update_stencil_face(&mut self, face: GLenum, f: impl Fn(&mut StencilFace)) {
        let (front, back) = stencil_faces(face);
        let stencil = &mut self.gl.stencil;
        if front {
            f(&mut stencil.front);
        }
        if back {
            f(&mut stencil.back);
        }
        stencil.two_side = stencil.front != stencil.back;
    }
}

impl DriverFunctions for R600Context {
    fn alpha_func(&mut self, func: GLenum, reference: f32) {
        self.gl.color.alpha_func = func;
        self.gl.color.alpha_ref = reference.clamp(0.0, 1.0);
        blend::update_alpha_test(&self.gl, &mut self.cache);
    }

    fn blend_color(&mut self, color: [f32; 4]) {
        self.gl.color.blend_color = color;
        blend::update_blend_color(&self.gl, &mut self.cache);
    }

    fn blend_equation_separate(&mut self, rgb: GLenum, alpha: GLenum) {
        self.gl.color.equation.rgb = rgb;
        self.gl.color.equation.alpha = alpha;
        blend::update_blend(&self.gl, &mut self.cache);
    }

    fn blend_func_separate(&mut self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) {
        let factors = &mut self.gl.color.blend;
        factors.src_rgb = src_rgb;
        factors.dst_rgb = dst_rgb;
        factors.src_alpha = src_alpha;
        factors.dst_alpha = dst_alpha;
        blend::update_blend(&self.gl, &mut self.cache);
    }

    fn color_mask(&mut self, mask: [bool; 4]) {
        self.gl.color.color_mask = mask;
        blend::update_color_mask(&self.gl, &mut self.cache);
    }

    fn logic_op(&mut self, op: GLenum) {
        self.gl.color.logic_op = op;
        blend::update_logic_op(&self.gl, &mut self.cache);
    }

    fn depth_func(&mut self, func: GLenum) {
        self.gl.depth.func = func;
        depth::update_depth(&self.gl, &mut self.cache);
    }

    fn depth_mask(&mut self, on: bool) {
        self.gl.depth.mask = on;
        depth::update_depth(&self.gl, &mut self.cache);
    }

    fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: i32, mask: u32) {
        self.update_stencil_face(face, |s| {
            s.func = func;
            s.reference = reference;
            s.value_mask = mask;
        });
        depth::update_stencil_func(&self.gl, &mut self.cache);
    }

    fn stencil_mask_separate(&mut self, face: GLenum, mask: u32) {
        self.update_stencil_face(face, |s| s.write_mask = mask);
        depth::update_stencil_mask(&self.gl, &mut self.cache);
    }

    fn stencil_op_separate(&mut self, face: GLenum, fail: GLenum, zfail: GLenum, zpass: GLenum) {
        self.update_stencil_face(face, |s| {
            s.fail = fail;
            s.zfail = zfail;
            s.zpass = zpass;
        });
        depth::update_stencil_op(&self.gl, &mut self.cache);
    }

    fn cull_face(&mut self, face: GLenum) {
        self.gl.polygon.cull_face = face;
        raster::update_cull(&self.gl, &mut self.cache);
    }

    fn front_face(&mut self, winding: GLenum) {
        self.gl.polygon.front_face = winding;
        raster::update_cull(&self.gl, &mut self.cache);
    }

    fn polygon_mode(&mut self, face: GLenum, mode: GLenum) {
        let polygon = &mut self.gl.polygon;
        if face != GL_BACK {
            polygon.front_mode = mode;
        }
        if face != GL_FRONT {
            polygon.back_mode = mode;
        }
        raster::update_polygon_mode(&self.gl, &mut self.cache);
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.gl.polygon.offset_factor = factor;
        self.gl.polygon.offset_units = units;
        raster::update_polygon_offset(&self.gl, &mut self.cache);
    }

    fn line_width(&mut self, width: f32) {
        self.gl.line.width = width;
        raster::update_line_width(&self.gl, &mut self.cache);
    }

    fn line_stipple(&mut self, factor: i32, pattern: u16) {
        self.gl.line.stipple_factor = factor;
        self.gl.line.stipple_pattern = pattern;
        raster::update_line_stipple(&self.gl, &mut self.cache);
    }

    fn point_size(&mut self, size: f32) {
        self.gl.point.size = size;
        raster::update_point_size(&self.gl, &mut self.cache);
    }

    fn point_size_range(&mut self, min: f32, max: f32) {
        self.gl.point.min_size = min;
        self.gl.point.max_size = max;
        raster::update_point_minmax(&self.gl, &mut self.cache);
    }

    fn shade_model(&mut self, mode: GLenum) {
        self.gl.shade_model = mode;
        raster::update_shade_model(&self.gl, &mut self.cache);
    }

    fn provoking_vertex(&mut self, convention: GLenum) {
        self.gl.provoking_vertex_last = convention == GL_LAST_VERTEX_CONVENTION;
        raster::update_provoking_vertex(&self.gl, &mut self.cache);
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let vp = &mut self.gl.viewport;
        vp.x = x as f32;
        vp.y = y as f32;
        vp.width = width as f32;
        vp.height = height as f32;
        raster::update_viewport(&self.gl, &mut self.cache);
    }

    fn depth_range(&mut self, near: f32, far: f32) {
        self.gl.viewport.near = near.clamp(0.0, 1.0);
        self.gl.viewport.far = far.clamp(0.0, 1.0);
        raster::update_viewport(&self.gl, &mut self.cache);
    }

    fn scissor(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.gl.scissor.rect = ScissorRect { x, y, width, height };
        raster::update_scissor(&self.gl, &mut self.cache);
    }

    fn clip_plane(&mut self, plane: GLenum, equation: [f32; 4]) {
        if !(GL_CLIP_PLANE0..=GL_CLIP_PLANE5).contains(&plane) {
            log::trace!("clip plane 0x{:04x} ignored", plane);
            return;
        }
        let index = (plane - GL_CLIP_PLANE0) as usize;
        self.gl.clip.planes[index] = equation;
        raster::update_clip_plane(&self.gl, &mut self.cache, index);
    }

    fn enable(&mut self, cap: GLenum, on: bool) {
        R600Context::enable(self, cap, on);
    }

    fn render_mode(&mut self, mode: GLenum) {
        self.gl.render_mode = mode;
    }

    fn bind_texture(&mut self, unit: usize, texture: Option<Arc<TextureObject>>, enabled: bool) {
        let Some(slot) = self.gl.textures.get_mut(unit) else {
            log::trace!("texture unit {} out of range", unit);
            return;
        };
        slot.texture = texture;
        slot.enabled = enabled;
        texture::update_textures(&self.gl, &mut self.cache);
    }

    fn texture_unit_lod_bias(&mut self, unit: usize, bias: f32) {
        if let Some(slot) = self.gl.textures.get_mut(unit) {
            slot.lod_bias = bias;
            texture::update_textures(&self.gl, &mut self.cache);
        }
    }

    fn use_program(&mut self, vertex: Option<Arc<ShaderProgram>>, fragment: Option<Arc<ShaderProgram>>) {
        self.update(NewState::PROGRAM, |gl| {
            gl.vertex_program = vertex;
            gl.fragment_program = fragment;
        });
    }

    fn program_constants(&mut self, kind: ProgramKind, constants: Vec<[f32; 4]>) {
        let bound = match kind {
            ProgramKind::Vertex => &mut self.gl.vertex_program,
            ProgramKind::Fragment => &mut self.gl.fragment_program,
        };
        let Some(program) = bound else {
            return;
        };
        Arc::make_mut(program).constants = constants;
        self.invalidate_state(NewState::PROGRAM_CONSTANTS);
    }

    fn draw_buffer(&mut self, framebuffer: Framebuffer) {
        self.update(NewState::BUFFERS, |gl| gl.framebuffer = framebuffer);
    }

    fn draw_prims(&mut self, draw: &DrawCall<'_>) -> Result<DrawOutcome> {
        R600Context::draw_prims(self, draw)
    }

    fn flush(&mut self) -> Result<()> {
        R600Context::flush(self)
    }

    fn finish(&mut self) -> Result<()> {
        R600Context::finish(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::AtomKind;
    use crate::config::DriverConfig;
    use alloc::boxed::Box;
    use alloc::vec;
    use radeon_cmd::CaptureSubmitter;
    use radeon_cmd::regs::{cb, pa, sq};
    use radeon_core::FallbackReason;
    use radeon_mem::HostBufferManager;

    fn context() -> R600Context {
        R600Context::new(
            DriverConfig::default(),
            Arc::new(HostBufferManager::new()),
            Box::new(CaptureSubmitter::new()),
        )
    }

    #[test]
    fn test_stencil_faces_track_two_side() {
        let mut ctx = context();
        ctx.stencil_func_separate(GL_FRONT_AND_BACK, GL_EQUAL, 3, 0xFF);
        assert!(!ctx.gl().stencil.two_side);
        assert_eq!(ctx.gl().stencil.back.reference, 3);

        ctx.stencil_op_separate(GL_BACK, GL_KEEP, GL_INCR, GL_REPLACE);
        assert!(ctx.gl().stencil.two_side);
        assert_eq!(ctx.gl().stencil.front.zpass, GL_KEEP);
        assert_eq!(ctx.gl().stencil.back.zpass, GL_REPLACE);

        ctx.stencil_op_separate(GL_FRONT, GL_KEEP, GL_INCR, GL_REPLACE);
        assert!(!ctx.gl().stencil.two_side);
    }

    #[test]
    fn test_two_sided_refs_fall_back() {
        let mut ctx = context();
        ctx.enable(GL_STENCIL_TEST, true);
        ctx.stencil_func_separate(GL_FRONT, GL_ALWAYS, 1, 0xFF);
        ctx.stencil_func_separate(GL_BACK, GL_ALWAYS, 2, 0xFF);
        assert_eq!(
            crate::fallback::check_fallbacks(ctx.gl(), false),
            Some(FallbackReason::StencilTwoSideRefs)
        );
    }

    #[test]
    fn test_blend_func_updates_blend_atom() {
        let mut ctx = context();
        ctx.enable(GL_BLEND, true);
        ctx.blend_func_separate(GL_SRC_ALPHA, GL_ONE_MINUS_SRC_ALPHA, GL_SRC_ALPHA, GL_ONE_MINUS_SRC_ALPHA);
        let reg = crate::atoms::blend_control_reg(ctx.config().chip);
        let control = ctx.state_cache().reg(AtomKind::Blend, reg).unwrap();
        assert_eq!(cb::COLOR_SRCBLEND.get(control), cb::BLEND_SRC_ALPHA);
        assert_eq!(cb::COLOR_DESTBLEND.get(control), cb::BLEND_ONE_MINUS_SRC_ALPHA);
        assert!(ctx.state_cache().is_dirty(AtomKind::Blend));
    }

    #[test]
    fn test_depth_range_clamped() {
        let mut ctx = context();
        ctx.depth_range(-1.0, 2.0);
        assert_eq!((ctx.gl().viewport.near, ctx.gl().viewport.far), (0.0, 1.0));
    }

    #[test]
    fn test_polygon_mode_per_face() {
        let mut ctx = context();
        ctx.polygon_mode(GL_BACK, GL_LINE);
        assert_eq!(ctx.gl().polygon.front_mode, GL_FILL);
        assert_eq!(ctx.gl().polygon.back_mode, GL_LINE);
        ctx.polygon_mode(GL_FRONT_AND_BACK, GL_POINT);
        assert_eq!(ctx.gl().polygon.front_mode, GL_POINT);
        assert_eq!(ctx.gl().polygon.back_mode, GL_POINT);
    }

    #[test]
    fn test_clip_plane_out_of_range_ignored() {
        let mut ctx = context();
        ctx.clip_plane(GL_CLIP_PLANE0 + 6, [1.0; 4]);
        ctx.clip_plane(GL_CLIP_PLANE0 + 1, [0.0, 1.0, 0.0, 2.0]);
        assert_eq!(ctx.gl().clip.planes[1], [0.0, 1.0, 0.0, 2.0]);
        let y = ctx.state_cache().reg(AtomKind::Clip, pa::PA_CL_UCP_0_X + 16 + 4).unwrap();
        assert_eq!(f32::from_bits(y), 1.0);
    }

    #[test]
    fn test_program_constants_copy_on_write() {
        let mut ctx = context();
        let fp = Arc::new(ShaderProgram::fragment(3, vec![0], crate::program::ProgramIo::COL0));
        ctx.use_program(None, Some(fp.clone()));

        ctx.program_constants(ProgramKind::Fragment, vec![[1.0, 0.0, 0.0, 1.0]]);
        assert!(fp.constants.is_empty());
        let bound = ctx.gl().fragment_program.as_ref().unwrap();
        assert_eq!(bound.constants.len(), 1);
        assert_eq!(bound.id, fp.id);
        let red = ctx.state_cache().reg(AtomKind::PsConst, sq::SQ_ALU_CONSTANT0_0);
        assert_eq!(red, Some(1.0f32.to_bits()));
    }

    #[test]
    fn test_draw_buffer_moves_depth_target() {
        use radeon_mem::BufferManager;

        let mgr = HostBufferManager::new();
        let mut ctx = context();
        let depth = mgr.alloc(32 * 32 * 4, 4096, radeon_core::Domain::VRAM).unwrap();
        ctx.draw_buffer(Framebuffer {
            width: 32,
            height: 32,
            pitch: 32,
            depth: Some(depth.clone()),
            depth_bits: 24,
            ..Framebuffer::default()
        });
        assert!(ctx.state_cache().relocs().any(|r| r.bo.id() == depth.id()));

        ctx.draw_buffer(Framebuffer::default());
        assert!(!ctx.state_cache().relocs().any(|r| r.bo.id() == depth.id()));
    }

    #[test]
    fn test_render_mode_only_mirrored() {
        let mut ctx = context();
        ctx.render_mode(GL_SELECT);
        assert_eq!(ctx.gl().render_mode, GL_SELECT);
    }
}
