//! # OpenGL Enumerants
//!
//! The subset of GL enum values the state tracker translates.

use crate::types::GLenum;

// =============================================================================
// BASIC
// =============================================================================

/// Zero / no bits
pub const GL_ZERO: GLenum = 0;
/// One
pub const GL_ONE: GLenum = 1;

// =============================================================================
// PRIMITIVES
// =============================================================================

/// Points
pub const GL_POINTS: GLenum = 0x0000;
/// Independent lines
pub const GL_LINES: GLenum = 0x0001;
/// Closed line strip
pub const GL_LINE_LOOP: GLenum = 0x0002;
/// Line strip
pub const GL_LINE_STRIP: GLenum = 0x0003;
/// Independent triangles
pub const GL_TRIANGLES: GLenum = 0x0004;
/// Triangle strip
pub const GL_TRIANGLE_STRIP: GLenum = 0x0005;
/// Triangle fan
pub const GL_TRIANGLE_FAN: GLenum = 0x0006;
/// Independent quads
pub const GL_QUADS: GLenum = 0x0007;
/// Quad strip
pub const GL_QUAD_STRIP: GLenum = 0x0008;
/// Convex polygon
pub const GL_POLYGON: GLenum = 0x0009;

// =============================================================================
// COMPARISON FUNCTIONS
// =============================================================================

/// Never passes
pub const GL_NEVER: GLenum = 0x0200;
/// Passes if less
pub const GL_LESS: GLenum = 0x0201;
/// Passes if equal
pub const GL_EQUAL: GLenum = 0x0202;
/// Passes if less or equal
pub const GL_LEQUAL: GLenum = 0x0203;
/// Passes if greater
pub const GL_GREATER: GLenum = 0x0204;
/// Passes if not equal
pub const GL_NOTEQUAL: GLenum = 0x0205;
/// Passes if greater or equal
pub const GL_GEQUAL: GLenum = 0x0206;
/// Always passes
pub const GL_ALWAYS: GLenum = 0x0207;

// =============================================================================
// BLENDING
// =============================================================================

/// Source color
pub const GL_SRC_COLOR: GLenum = 0x0300;
/// One minus source color
pub const GL_ONE_MINUS_SRC_COLOR: GLenum = 0x0301;
/// Source alpha
pub const GL_SRC_ALPHA: GLenum = 0x0302;
/// One minus source alpha
pub const GL_ONE_MINUS_SRC_ALPHA: GLenum = 0x0303;
/// Destination alpha
pub const GL_DST_ALPHA: GLenum = 0x0304;
/// One minus destination alpha
pub const GL_ONE_MINUS_DST_ALPHA: GLenum = 0x0305;
/// Destination color
pub const GL_DST_COLOR: GLenum = 0x0306;
/// One minus destination color
pub const GL_ONE_MINUS_DST_COLOR: GLenum = 0x0307;
/// Source alpha saturate
pub const GL_SRC_ALPHA_SATURATE: GLenum = 0x0308;
/// Constant color
pub const GL_CONSTANT_COLOR: GLenum = 0x8001;
/// One minus constant color
pub const GL_ONE_MINUS_CONSTANT_COLOR: GLenum = 0x8002;
/// Constant alpha
pub const GL_CONSTANT_ALPHA: GLenum = 0x8003;
/// One minus constant alpha
pub const GL_ONE_MINUS_CONSTANT_ALPHA: GLenum = 0x8004;

/// Add
pub const GL_FUNC_ADD: GLenum = 0x8006;
/// Minimum
pub const GL_MIN: GLenum = 0x8007;
/// Maximum
pub const GL_MAX: GLenum = 0x8008;
/// Subtract
pub const GL_FUNC_SUBTRACT: GLenum = 0x800A;
/// Reverse subtract
pub const GL_FUNC_REVERSE_SUBTRACT: GLenum = 0x800B;

// =============================================================================
// LOGIC OPS
// =============================================================================

/// 0
pub const GL_CLEAR: GLenum = 0x1500;
/// s & d
pub const GL_AND: GLenum = 0x1501;
/// s & !d
pub const GL_AND_REVERSE: GLenum = 0x1502;
/// s
pub const GL_COPY: GLenum = 0x1503;
/// !s & d
pub const GL_AND_INVERTED: GLenum = 0x1504;
/// d
pub const GL_NOOP: GLenum = 0x1505;
/// s ^ d
pub const GL_XOR: GLenum = 0x1506;
/// s | d
pub const GL_OR: GLenum = 0x1507;
/// !(s | d)
pub const GL_NOR: GLenum = 0x1508;
/// !(s ^ d)
pub const GL_EQUIV: GLenum = 0x1509;
/// !d (also the stencil invert op)
pub const GL_INVERT: GLenum = 0x150A;
/// s | !d
pub const GL_OR_REVERSE: GLenum = 0x150B;
/// !s
pub const GL_COPY_INVERTED: GLenum = 0x150C;
/// !s | d
pub const GL_OR_INVERTED: GLenum = 0x150D;
/// !(s & d)
pub const GL_NAND: GLenum = 0x150E;
/// 1
pub const GL_SET: GLenum = 0x150F;

// =============================================================================
// STENCIL OPS
// =============================================================================

/// Keep the current value
pub const GL_KEEP: GLenum = 0x1E00;
/// Replace with the reference
pub const GL_REPLACE: GLenum = 0x1E01;
/// Increment, clamping
pub const GL_INCR: GLenum = 0x1E02;
/// Decrement, clamping
pub const GL_DECR: GLenum = 0x1E03;
/// Increment, wrapping
pub const GL_INCR_WRAP: GLenum = 0x8507;
/// Decrement, wrapping
pub const GL_DECR_WRAP: GLenum = 0x8508;

// =============================================================================
// FACES / POLYGONS
// =============================================================================

/// Front face
pub const GL_FRONT: GLenum = 0x0404;
/// Back face
pub const GL_BACK: GLenum = 0x0405;
/// Both faces
pub const GL_FRONT_AND_BACK: GLenum = 0x0408;
/// Clockwise winding
pub const GL_CW: GLenum = 0x0900;
/// Counter-clockwise winding
pub const GL_CCW: GLenum = 0x0901;
/// Rasterize polygon vertices
pub const GL_POINT: GLenum = 0x1B00;
/// Rasterize polygon edges
pub const GL_LINE: GLenum = 0x1B01;
/// Rasterize polygon interiors
pub const GL_FILL: GLenum = 0x1B02;
/// Flat shading
pub const GL_FLAT: GLenum = 0x1D00;
/// Smooth shading
pub const GL_SMOOTH: GLenum = 0x1D01;
/// First vertex provokes flat-shaded attributes
pub const GL_FIRST_VERTEX_CONVENTION: GLenum = 0x8E4D;
/// Last vertex provokes flat-shaded attributes
pub const GL_LAST_VERTEX_CONVENTION: GLenum = 0x8E4E;

/// Normal rendering
pub const GL_RENDER: GLenum = 0x1C00;
/// Feedback mode
pub const GL_FEEDBACK: GLenum = 0x1C01;
/// Selection mode
pub const GL_SELECT: GLenum = 0x1C02;

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Point smoothing
pub const GL_POINT_SMOOTH: GLenum = 0x0B10;
/// Line smoothing
pub const GL_LINE_SMOOTH: GLenum = 0x0B20;
/// Line stipple
pub const GL_LINE_STIPPLE: GLenum = 0x0B24;
/// Polygon stipple
pub const GL_POLYGON_STIPPLE: GLenum = 0x0B42;
/// Face culling
pub const GL_CULL_FACE: GLenum = 0x0B44;
/// Fog
pub const GL_FOG: GLenum = 0x0B60;
/// Depth test
pub const GL_DEPTH_TEST: GLenum = 0x0B71;
/// Stencil test
pub const GL_STENCIL_TEST: GLenum = 0x0B90;
/// Alpha test
pub const GL_ALPHA_TEST: GLenum = 0x0BC0;
/// Blending
pub const GL_BLEND: GLenum = 0x0BE2;
/// RGBA logic op
pub const GL_COLOR_LOGIC_OP: GLenum = 0x0BF2;
/// Scissor test
pub const GL_SCISSOR_TEST: GLenum = 0x0C11;
/// 1D texturing
pub const GL_TEXTURE_1D: GLenum = 0x0DE0;
/// 2D texturing
pub const GL_TEXTURE_2D: GLenum = 0x0DE1;
/// Polygon offset for points
pub const GL_POLYGON_OFFSET_POINT: GLenum = 0x2A01;
/// Polygon offset for lines
pub const GL_POLYGON_OFFSET_LINE: GLenum = 0x2A02;
/// First user clip plane
pub const GL_CLIP_PLANE0: GLenum = 0x3000;
/// Last user clip plane
pub const GL_CLIP_PLANE5: GLenum = 0x3005;
/// 3D texturing
pub const GL_TEXTURE_3D: GLenum = 0x806F;
/// Polygon offset for fill
pub const GL_POLYGON_OFFSET_FILL: GLenum = 0x8037;
/// Multisampling
pub const GL_MULTISAMPLE: GLenum = 0x809D;
/// Depth clamping
pub const GL_DEPTH_CLAMP: GLenum = 0x864F;
/// Point sprites
pub const GL_POINT_SPRITE: GLenum = 0x8861;

// =============================================================================
// DATA TYPES
// =============================================================================

/// Signed byte
pub const GL_BYTE: GLenum = 0x1400;
/// Unsigned byte
pub const GL_UNSIGNED_BYTE: GLenum = 0x1401;
/// Signed short
pub const GL_SHORT: GLenum = 0x1402;
/// Unsigned short
pub const GL_UNSIGNED_SHORT: GLenum = 0x1403;
/// Signed int
pub const GL_INT: GLenum = 0x1404;
/// Unsigned int
pub const GL_UNSIGNED_INT: GLenum = 0x1405;
/// Float
pub const GL_FLOAT: GLenum = 0x1406;
/// Double
pub const GL_DOUBLE: GLenum = 0x140A;

// =============================================================================
// TEXTURES
// =============================================================================

/// Nearest texel
pub const GL_NEAREST: GLenum = 0x2600;
/// Linear filtering
pub const GL_LINEAR: GLenum = 0x2601;
/// Nearest texel, nearest mip
pub const GL_NEAREST_MIPMAP_NEAREST: GLenum = 0x2700;
/// Linear filtering, nearest mip
pub const GL_LINEAR_MIPMAP_NEAREST: GLenum = 0x2701;
/// Nearest texel, blended mips
pub const GL_NEAREST_MIPMAP_LINEAR: GLenum = 0x2702;
/// Trilinear
pub const GL_LINEAR_MIPMAP_LINEAR: GLenum = 0x2703;

/// Legacy clamp
pub const GL_CLAMP: GLenum = 0x2900;
/// Repeat
pub const GL_REPEAT: GLenum = 0x2901;
/// Clamp to border
pub const GL_CLAMP_TO_BORDER: GLenum = 0x812D;
/// Clamp to edge
pub const GL_CLAMP_TO_EDGE: GLenum = 0x812F;
/// Mirrored repeat
pub const GL_MIRRORED_REPEAT: GLenum = 0x8370;
/// Mirror once, legacy clamp
pub const GL_MIRROR_CLAMP_EXT: GLenum = 0x8742;
/// Mirror once, clamp to edge
pub const GL_MIRROR_CLAMP_TO_EDGE_EXT: GLenum = 0x8743;
/// Mirror once, clamp to border
pub const GL_MIRROR_CLAMP_TO_BORDER_EXT: GLenum = 0x8912;
