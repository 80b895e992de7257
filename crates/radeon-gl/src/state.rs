//! # OpenGL State Mirror
//!
//! The slice of GL context state the hardware translators read. The GL
//! core owns the authoritative copy; the driver mirrors it here as each
//! state-change entry point runs.

use alloc::sync::Arc;
use alloc::vec::Vec;

use bitflags::bitflags;
use radeon_mem::Bo;

use crate::enums::*;
use crate::program::ShaderProgram;
use crate::types::*;

// =============================================================================
// NEW-STATE FLAGS
// =============================================================================

bitflags! {
    /// GL state categories changed since the last validation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NewState: u32 {
        /// Alpha test, blend, logic op, color mask
        const COLOR = 1 << 0;
        /// Depth test and mask
        const DEPTH = 1 << 1;
        /// Stencil test
        const STENCIL = 1 << 2;
        /// Cull, winding, polygon mode and offset
        const POLYGON = 1 << 3;
        /// Line width and stipple
        const LINE = 1 << 4;
        /// Point size
        const POINT = 1 << 5;
        /// Shade model and provoking vertex
        const LIGHT = 1 << 6;
        /// Viewport and depth range
        const VIEWPORT = 1 << 7;
        /// Scissor
        const SCISSOR = 1 << 8;
        /// User clip planes
        const TRANSFORM = 1 << 9;
        /// Texture bindings and parameters
        const TEXTURE = 1 << 10;
        /// Bound programs
        const PROGRAM = 1 << 11;
        /// Program constants
        const PROGRAM_CONSTANTS = 1 << 12;
        /// Draw framebuffer and its attachments
        const BUFFERS = 1 << 13;
        /// Multisample enable
        const MULTISAMPLE = 1 << 14;
        /// Render mode
        const RENDER_MODE = 1 << 15;
        /// Everything
        const ALL = u32::MAX;
    }
}

// =============================================================================
// COLOR STATE
// =============================================================================

/// Blend factors for RGB and alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFactor {
    /// Source RGB factor
    pub src_rgb: GLenum,
    /// Destination RGB factor
    pub dst_rgb: GLenum,
    /// Source alpha factor
    pub src_alpha: GLenum,
    /// Destination alpha factor
    pub dst_alpha: GLenum,
}

impl Default for BlendFactor {
    fn default() -> Self {
        Self {
            src_rgb: GL_ONE,
            dst_rgb: GL_ZERO,
            src_alpha: GL_ONE,
            dst_alpha: GL_ZERO,
        }
    }
}

/// Blend equations for RGB and alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendEquation {
    /// RGB equation
    pub rgb: GLenum,
    /// Alpha equation
    pub alpha: GLenum,
}

impl Default for BlendEquation {
    fn default() -> Self {
        Self {
            rgb: GL_FUNC_ADD,
            alpha: GL_FUNC_ADD,
        }
    }
}

/// Fragment color state
#[derive(Debug, Clone, PartialEq)]
pub struct ColorState {
    /// Alpha test enabled
    pub alpha_enabled: bool,
    /// Alpha test function
    pub alpha_func: GLenum,
    /// Alpha test reference, clamped to [0, 1]
    pub alpha_ref: f32,
    /// Blending enabled
    pub blend_enabled: bool,
    /// Blend factors
    pub blend: BlendFactor,
    /// Blend equations
    pub equation: BlendEquation,
    /// Constant blend color
    pub blend_color: [f32; 4],
    /// RGBA logic op enabled
    pub logic_op_enabled: bool,
    /// Logic op
    pub logic_op: GLenum,
    /// Color write mask (r, g, b, a)
    pub color_mask: [bool; 4],
}

impl Default for ColorState {
    fn default() -> Self {
        Self {
            alpha_enabled: false,
            alpha_func: GL_ALWAYS,
            alpha_ref: 0.0,
            blend_enabled: false,
            blend: BlendFactor::default(),
            equation: BlendEquation::default(),
            blend_color: [0.0; 4],
            logic_op_enabled: false,
            logic_op: GL_COPY,
            color_mask: [true; 4],
        }
    }
}

// =============================================================================
// DEPTH / STENCIL STATE
// =============================================================================

/// Depth test state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthState {
    /// Depth test enabled
    pub test: bool,
    /// Compare function
    pub func: GLenum,
    /// Depth writes enabled
    pub mask: bool,
    /// Depth clamp instead of near/far clipping
    pub clamp: bool,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test: false,
            func: GL_LESS,
            mask: true,
            clamp: false,
        }
    }
}

/// Stencil state of one face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFace {
    /// Compare function
    pub func: GLenum,
    /// Reference value
    pub reference: i32,
    /// Compare mask
    pub value_mask: u32,
    /// Write mask
    pub write_mask: u32,
    /// Op on stencil fail
    pub fail: GLenum,
    /// Op on depth fail
    pub zfail: GLenum,
    /// Op on depth pass
    pub zpass: GLenum,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            func: GL_ALWAYS,
            reference: 0,
            value_mask: 0xFF,
            write_mask: 0xFF,
            fail: GL_KEEP,
            zfail: GL_KEEP,
            zpass: GL_KEEP,
        }
    }
}

/// Stencil test state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StencilState {
    /// Stencil test enabled
    pub enabled: bool,
    /// Separate back-face state in use
    pub two_side: bool,
    /// Front face
    pub front: StencilFace,
    /// Back face
    pub back: StencilFace,
}

impl StencilState {
    /// State applied to back faces
    pub fn back_face(&self) -> &StencilFace {
        if self.two_side { &self.back } else { &self.front }
    }
}

// =============================================================================
// RASTER STATE
// =============================================================================

/// Polygon rasterization state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonState {
    /// Face culling enabled
    pub cull_enabled: bool,
    /// Culled face
    pub cull_face: GLenum,
    /// Front-face winding
    pub front_face: GLenum,
    /// Front polygon mode
    pub front_mode: GLenum,
    /// Back polygon mode
    pub back_mode: GLenum,
    /// Polygon offset for filled polygons
    pub offset_fill: bool,
    /// Polygon offset for lines
    pub offset_line: bool,
    /// Polygon offset for points
    pub offset_point: bool,
    /// Offset slope factor
    pub offset_factor: f32,
    /// Offset constant units
    pub offset_units: f32,
    /// Polygon stipple enabled
    pub stipple: bool,
}

impl Default for PolygonState {
    fn default() -> Self {
        Self {
            cull_enabled: false,
            cull_face: GL_BACK,
            front_face: GL_CCW,
            front_mode: GL_FILL,
            back_mode: GL_FILL,
            offset_fill: false,
            offset_line: false,
            offset_point: false,
            offset_factor: 0.0,
            offset_units: 0.0,
            stipple: false,
        }
    }
}

/// Line state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineState {
    /// Width in pixels
    pub width: f32,
    /// Antialiasing enabled
    pub smooth: bool,
    /// Stipple enabled
    pub stipple_enabled: bool,
    /// Stipple repeat factor
    pub stipple_factor: i32,
    /// Stipple pattern
    pub stipple_pattern: u16,
}

impl Default for LineState {
    fn default() -> Self {
        Self {
            width: 1.0,
            smooth: false,
            stipple_enabled: false,
            stipple_factor: 1,
            stipple_pattern: 0xFFFF,
        }
    }
}

/// Point state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointState {
    /// Size in pixels
    pub size: f32,
    /// Minimum attenuated size
    pub min_size: f32,
    /// Maximum attenuated size
    pub max_size: f32,
    /// Antialiasing enabled
    pub smooth: bool,
    /// Point sprites enabled
    pub sprite: bool,
}

impl Default for PointState {
    fn default() -> Self {
        Self {
            size: 1.0,
            min_size: 0.0,
            max_size: 8191.0,
            smooth: false,
            sprite: false,
        }
    }
}

// =============================================================================
// VIEWPORT / SCISSOR / CLIP
// =============================================================================

/// Viewport and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Near depth
    pub near: f32,
    /// Far depth
    pub far: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            near: 0.0,
            far: 1.0,
        }
    }
}

/// Scissor rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScissorRect {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

/// Scissor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScissorState {
    /// Scissor test enabled
    pub enabled: bool,
    /// Rectangle in window coordinates
    pub rect: ScissorRect,
}

/// User clip planes, in eye space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipState {
    /// Per-plane enables
    pub enabled: [bool; 6],
    /// Plane equations
    pub planes: [[f32; 4]; 6],
}

// =============================================================================
// TEXTURES
// =============================================================================

/// A texture object as the driver sees it
#[derive(Debug, Clone)]
pub struct TextureObject {
    /// Storage; `None` until the image is uploaded
    pub bo: Option<Bo>,
    /// Width of level 0
    pub width: u32,
    /// Height of level 0
    pub height: u32,
    /// Row pitch in texels
    pub pitch: u32,
    /// Hardware data format
    pub format: u32,
    /// Last mip level
    pub last_level: u32,
    /// Minification filter
    pub min_filter: GLenum,
    /// Magnification filter
    pub mag_filter: GLenum,
    /// Wrap modes for s, t, r
    pub wrap: [GLenum; 3],
    /// Per-object LOD bias
    pub lod_bias: f32,
    /// Minimum LOD
    pub min_lod: f32,
    /// Maximum LOD
    pub max_lod: f32,
}

impl TextureObject {
    /// A `width` x `height` texture in `format` with GL default sampling
    pub fn new(bo: Option<Bo>, width: u32, height: u32, format: u32) -> Self {
        Self {
            bo,
            width,
            height,
            pitch: width,
            format,
            last_level: 0,
            min_filter: GL_NEAREST_MIPMAP_LINEAR,
            mag_filter: GL_LINEAR,
            wrap: [GL_REPEAT; 3],
            lod_bias: 0.0,
            min_lod: -1000.0,
            max_lod: 1000.0,
        }
    }
}

/// One texture unit
#[derive(Debug, Clone, Default)]
pub struct TextureUnit {
    /// Any texture target enabled
    pub enabled: bool,
    /// Bound texture
    pub texture: Option<Arc<TextureObject>>,
    /// Unit LOD bias, added to the object's
    pub lod_bias: f32,
}

// =============================================================================
// FRAMEBUFFER
// =============================================================================

/// The draw framebuffer
#[derive(Debug, Clone, Default)]
pub struct Framebuffer {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pitch of the color buffer in pixels
    pub pitch: u32,
    /// A user framebuffer object rather than the window
    pub user_fbo: bool,
    /// Color buffer storage
    pub color: Option<Bo>,
    /// Hardware color format (CB_COLOR0_INFO)
    pub color_info: u32,
    /// Depth buffer storage
    pub depth: Option<Bo>,
    /// Depth bits: 0, 16 or 24
    pub depth_bits: u32,
    /// Depth buffer carries stencil
    pub has_stencil: bool,
}

// =============================================================================
// GL STATE
// =============================================================================

/// The GL state the driver translates
#[derive(Debug, Clone)]
pub struct GlState {
    /// Color state
    pub color: ColorState,
    /// Depth state
    pub depth: DepthState,
    /// Stencil state
    pub stencil: StencilState,
    /// Polygon state
    pub polygon: PolygonState,
    /// Line state
    pub line: LineState,
    /// Point state
    pub point: PointState,
    /// GL_FLAT or GL_SMOOTH
    pub shade_model: GLenum,
    /// Last vertex provokes flat-shaded attributes
    pub provoking_vertex_last: bool,
    /// Viewport
    pub viewport: Viewport,
    /// Scissor
    pub scissor: ScissorState,
    /// User clip planes
    pub clip: ClipState,
    /// Multisample enabled
    pub multisample: bool,
    /// Fog enabled
    pub fog: bool,
    /// GL_RENDER, GL_SELECT or GL_FEEDBACK
    pub render_mode: GLenum,
    /// Texture units
    pub textures: Vec<TextureUnit>,
    /// Bound vertex program
    pub vertex_program: Option<Arc<ShaderProgram>>,
    /// Bound fragment program
    pub fragment_program: Option<Arc<ShaderProgram>>,
    /// Draw framebuffer
    pub framebuffer: Framebuffer,
}

impl GlState {
    /// Default GL state with `texture_units` units
    pub fn new(texture_units: usize) -> Self {
        let mut textures = Vec::with_capacity(texture_units);
        textures.resize_with(texture_units, TextureUnit::default);
        Self {
            color: ColorState::default(),
            depth: DepthState::default(),
            stencil: StencilState::default(),
            polygon: PolygonState::default(),
            line: LineState::default(),
            point: PointState::default(),
            shade_model: GL_SMOOTH,
            provoking_vertex_last: true,
            viewport: Viewport::default(),
            scissor: ScissorState::default(),
            clip: ClipState::default(),
            multisample: false,
            fog: false,
            render_mode: GL_RENDER,
            textures,
            vertex_program: None,
            fragment_program: None,
            framebuffer: Framebuffer::default(),
        }
    }

    /// Logic op replaces blending
    pub fn logic_op_active(&self) -> bool {
        self.color.logic_op_enabled
    }

    /// Bound texture of `unit` when the unit is enabled
    pub fn active_texture(&self, unit: usize) -> Option<&Arc<TextureObject>> {
        self.textures
            .get(unit)
            .filter(|u| u.enabled)
            .and_then(|u| u.texture.as_ref())
    }
}

impl Default for GlState {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gl() {
        let gl = GlState::default();
        assert_eq!(gl.color.blend.src_rgb, GL_ONE);
        assert_eq!(gl.color.blend.dst_rgb, GL_ZERO);
        assert_eq!(gl.depth.func, GL_LESS);
        assert_eq!(gl.polygon.front_face, GL_CCW);
        assert_eq!(gl.render_mode, GL_RENDER);
        assert_eq!(gl.textures.len(), 16);
    }

    #[test]
    fn test_back_face_follows_two_side() {
        let mut stencil = StencilState::default();
        stencil.back.reference = 3;
        assert_eq!(stencil.back_face().reference, 0);
        stencil.two_side = true;
        assert_eq!(stencil.back_face().reference, 3);
    }

    #[test]
    fn test_active_texture_requires_enable() {
        let mut gl = GlState::new(2);
        gl.textures[1].texture = Some(Arc::new(TextureObject::new(None, 4, 4, 0)));
        assert!(gl.active_texture(1).is_none());
        gl.textures[1].enabled = true;
        assert!(gl.active_texture(1).is_some());
        assert!(gl.active_texture(5).is_none());
    }
}
